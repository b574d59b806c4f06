//! Plant configuration and the bundled JSON document.

use serde::{Deserialize, Serialize};

use crate::error::{FloraError, Result};
use crate::grammar::{RuleSet, RuleSetDocument};
use crate::turtle::{Alphabet, LengthJitter};
use crate::wind::WindSettings;

/// Default cap on expansion generations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 8;

/// Geometry and decoration settings shared by every plant a generator makes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Base segment length.
    pub length: f32,
    /// How far above the origin the turtle may still grow.
    pub growth_limit: f32,
    pub length_jitter: Option<LengthJitter>,
    pub flower_probability: f32,
    /// Turn each plant by a random angle about its up axis before growing.
    pub random_heading: bool,
    /// Rule set iteration counts above this are clamped.
    pub max_iterations: u32,
    pub alphabet: Alphabet,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            length: 0.4,
            growth_limit: 1.2,
            length_jitter: None,
            flower_probability: 0.3,
            random_heading: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            alphabet: Alphabet::default(),
        }
    }
}

impl PlantConfig {
    pub fn with_length(mut self, length: f32) -> Self {
        self.length = length;
        self
    }

    pub fn with_growth_limit(mut self, growth_limit: f32) -> Self {
        self.growth_limit = growth_limit;
        self
    }

    pub fn with_length_jitter(mut self, jitter: LengthJitter) -> Self {
        self.length_jitter = Some(jitter);
        self
    }

    pub fn with_flower_probability(mut self, probability: f32) -> Self {
        self.flower_probability = probability;
        self
    }

    pub fn with_random_heading(mut self, random_heading: bool) -> Self {
        self.random_heading = random_heading;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.length.is_finite() {
            return Err(FloraError::NonFinite {
                name: "length",
                value: self.length,
            });
        }
        if self.growth_limit.is_nan() {
            return Err(FloraError::NonFinite {
                name: "growth_limit",
                value: self.growth_limit,
            });
        }
        if !self.flower_probability.is_finite() {
            return Err(FloraError::NonFinite {
                name: "flower_probability",
                value: self.flower_probability,
            });
        }
        if let Some(jitter) = &self.length_jitter {
            jitter.validate()?;
        }
        Ok(())
    }
}

/// Everything a scene needs to grow and animate plants, in one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FloraConfig {
    pub plant: PlantConfig,
    pub wind: WindSettings,
    /// Empty means the built-in library.
    pub rule_sets: Vec<RuleSetDocument>,
}

impl FloraConfig {
    #[cfg(feature = "json")]
    pub fn from_json(text: &str) -> Result<Self> {
        let config: FloraConfig = serde_json::from_str(text)?;
        config.plant.validate()?;
        config.wind.validate()?;
        Ok(config)
    }

    /// Converts the rule set documents, falling back to the built-in library.
    pub fn library(&self) -> Result<Vec<RuleSet>> {
        if self.rule_sets.is_empty() {
            return Ok(crate::presets::default_library());
        }
        self.rule_sets
            .iter()
            .cloned()
            .map(RuleSet::try_from)
            .collect()
    }
}
