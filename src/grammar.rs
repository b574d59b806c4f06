//! Stochastic grammar expansion.
//!
//! A [`RuleSet`] maps predecessor symbols to weighted successor strings.
//! [`expand`] rewrites an axiom for a number of generations, drawing one
//! successor per symbol occurrence from the applicable rules. Symbols with no
//! rule are copied through unchanged.

use std::collections::BTreeMap;

use bevy::platform::collections::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{FloraError, Result};

/// A weighted rewrite `predecessor -> successor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRule {
    pub predecessor: char,
    pub successor: String,
    pub probability: f32,
}

impl ProductionRule {
    pub fn new(predecessor: char, successor: impl Into<String>, probability: f32) -> Self {
        Self {
            predecessor,
            successor: successor.into(),
            probability,
        }
    }

    /// A rule that always fires when it is the only one for its predecessor.
    pub fn certain(predecessor: char, successor: impl Into<String>) -> Self {
        Self::new(predecessor, successor, 1.0)
    }
}

/// A named, ordered collection of production rules together with the axiom,
/// turn angle (degrees) and generation count they were authored for.
///
/// Rule sets are only ever read during expansion; the `with_*` methods return
/// a modified copy rather than editing one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    name: String,
    axiom: String,
    angle: f32,
    iterations: u32,
    rules: Vec<ProductionRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            axiom: "F".to_string(),
            angle: 25.0,
            iterations: 2,
            rules: Vec::new(),
        }
    }
}

impl RuleSet {
    pub fn new(name: impl Into<String>, axiom: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            axiom: axiom.into(),
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: ProductionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = ProductionRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_axiom(mut self, axiom: impl Into<String>) -> Self {
        self.axiom = axiom.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn rules(&self) -> &[ProductionRule] {
        &self.rules
    }

    /// Rules whose predecessor is `symbol`, in definition order.
    pub fn rules_for(&self, symbol: char) -> impl Iterator<Item = &ProductionRule> {
        self.rules.iter().filter(move |r| r.predecessor == symbol)
    }

    /// Rejects non-finite or negative weights and a non-finite angle.
    ///
    /// Zero weights are accepted; expansion guards an all-zero group.
    pub fn validate(&self) -> Result<()> {
        if !self.angle.is_finite() {
            return Err(FloraError::NonFinite {
                name: "angle",
                value: self.angle,
            });
        }
        for rule in &self.rules {
            if !rule.probability.is_finite() || rule.probability < 0.0 {
                return Err(FloraError::InvalidProbability {
                    predecessor: rule.predecessor,
                    successor: rule.successor.clone(),
                    probability: rule.probability,
                });
            }
        }
        Ok(())
    }

    /// Expands this rule set's own axiom for its own iteration count.
    pub fn expand<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        expand(&self.axiom, self.iterations, self, rng)
    }

    /// Parses the declarative rule document:
    ///
    /// ```json
    /// { "axiom": "F", "angle": 25, "iterations": 3,
    ///   "rules": { "F": [ { "result": "F[+F]F", "probability": 0.6 } ] } }
    /// ```
    #[cfg(feature = "json")]
    pub fn from_json(text: &str) -> Result<Self> {
        let document: RuleSetDocument = serde_json::from_str(text)?;
        Self::try_from(document)
    }
}

/// Serialized shape of a rule set. Predecessors map to their weighted
/// successors; keys are visited in sorted order so loading is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetDocument {
    #[serde(default)]
    pub name: Option<String>,
    pub axiom: String,
    pub angle: f32,
    pub iterations: u32,
    #[serde(default)]
    pub rules: BTreeMap<String, Vec<WeightedSuccessor>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedSuccessor {
    pub result: String,
    #[serde(default = "default_probability")]
    pub probability: f32,
}

fn default_probability() -> f32 {
    1.0
}

impl TryFrom<RuleSetDocument> for RuleSet {
    type Error = FloraError;

    fn try_from(document: RuleSetDocument) -> Result<Self> {
        let mut rules = Vec::new();
        for (key, successors) in document.rules {
            let mut chars = key.chars();
            let (Some(predecessor), None) = (chars.next(), chars.next()) else {
                return Err(FloraError::InvalidPredecessor { key });
            };
            rules.extend(
                successors
                    .into_iter()
                    .map(|s| ProductionRule::new(predecessor, s.result, s.probability)),
            );
        }

        let rule_set = RuleSet {
            name: document.name.unwrap_or_else(|| "custom".to_string()),
            axiom: document.axiom,
            angle: document.angle,
            iterations: document.iterations,
            rules,
        };
        rule_set.validate()?;
        Ok(rule_set)
    }
}

impl From<&RuleSet> for RuleSetDocument {
    fn from(rule_set: &RuleSet) -> Self {
        let mut rules: BTreeMap<String, Vec<WeightedSuccessor>> = BTreeMap::new();
        for rule in &rule_set.rules {
            rules
                .entry(rule.predecessor.to_string())
                .or_default()
                .push(WeightedSuccessor {
                    result: rule.successor.clone(),
                    probability: rule.probability,
                });
        }
        Self {
            name: Some(rule_set.name.clone()),
            axiom: rule_set.axiom.clone(),
            angle: rule_set.angle,
            iterations: rule_set.iterations,
            rules,
        }
    }
}

/// Rewrites `axiom` for `iterations` generations.
///
/// Every generation is a full pass over the previous generation's output.
/// Each symbol with applicable rules is replaced by the successor of one rule
/// picked by [`choose_rule`]; every other symbol is copied unchanged.
pub fn expand<R: Rng + ?Sized>(
    axiom: &str,
    iterations: u32,
    rule_set: &RuleSet,
    rng: &mut R,
) -> String {
    // Group once per call; the lookup is reused by every generation.
    let mut table: HashMap<char, Vec<&ProductionRule>> = HashMap::new();
    for rule in &rule_set.rules {
        table.entry(rule.predecessor).or_default().push(rule);
    }

    let mut current = axiom.to_string();
    for _ in 0..iterations {
        let mut next = String::with_capacity(current.len() * 2);
        for symbol in current.chars() {
            match table.get(&symbol) {
                Some(candidates) => next.push_str(&choose_rule(candidates, rng).successor),
                None => next.push(symbol),
            }
        }
        current = next;
    }
    current
}

/// Picks one rule from a non-empty candidate list by weighted draw.
///
/// The draw is uniform in `[0, total)` where `total` is the weight sum, with
/// an all-zero group treated as `total = 1`.
///
/// # Panics
///
/// Panics if `candidates` is empty.
pub fn choose_rule<'a, R: Rng + ?Sized>(
    candidates: &[&'a ProductionRule],
    rng: &mut R,
) -> &'a ProductionRule {
    let mut total: f32 = candidates.iter().map(|r| r.probability).sum();
    if total <= 0.0 || !total.is_finite() {
        total = 1.0;
    }
    let draw = rng.gen_range(0.0..total);
    select_by_draw(candidates, draw)
}

/// Walks `candidates` accumulating weights and returns the first rule whose
/// running sum reaches `draw`. When rounding leaves `draw` above every running
/// sum, the last candidate wins.
///
/// # Panics
///
/// Panics if `candidates` is empty.
pub fn select_by_draw<'a>(candidates: &[&'a ProductionRule], draw: f32) -> &'a ProductionRule {
    let mut running = 0.0;
    for rule in candidates {
        running += rule.probability;
        if draw <= running {
            return rule;
        }
    }
    candidates[candidates.len() - 1]
}
