//! Plant instances and the generator that grows them.
//!
//! A [`PlantGenerator`] runs the whole pipeline once per plant: pick a rule
//! set, expand it, interpret the result, decorate the tips and hook up the
//! wind animator. Regrowing a plant means replacing its [`PlantInstance`];
//! nothing is shared between the old and the new one.

use std::f32::consts::TAU;

use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use rand::Rng;

use crate::config::PlantConfig;
use crate::decoration::{Decoration, DecorationKind, PrefabId, attach_decorations};
use crate::error::{FloraError, Result};
use crate::grammar::{RuleSet, expand};
use crate::presets;
use crate::tree::{BranchId, PlantTree};
use crate::turtle::{TurtleInterpreter, TurtleParams};
use crate::wind::{WindAnimator, WindSettings};

/// One grown plant: its rule set, expanded string, tree, decorations and
/// wind state.
#[derive(Debug, Clone)]
pub struct PlantInstance {
    rule_set: RuleSet,
    symbols: String,
    tree: PlantTree,
    decorations: Vec<Decoration>,
    animator: WindAnimator,
    pose: Vec<Transform>,
}

impl PlantInstance {
    pub fn new(
        rule_set: RuleSet,
        symbols: String,
        tree: PlantTree,
        decorations: Vec<Decoration>,
    ) -> Self {
        let animator = WindAnimator::attach(&tree);
        let pose = tree.pose();
        Self {
            rule_set,
            symbols,
            tree,
            decorations,
            animator,
            pose,
        }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// The expanded string the tree was built from.
    pub fn symbols(&self) -> &str {
        &self.symbols
    }

    pub fn tree(&self) -> &PlantTree {
        &self.tree
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn leaf_count(&self) -> usize {
        self.count(DecorationKind::Leaf)
    }

    pub fn flower_count(&self) -> usize {
        self.count(DecorationKind::Flower)
    }

    fn count(&self, kind: DecorationKind) -> usize {
        self.decorations.iter().filter(|d| d.kind == kind).count()
    }

    pub fn animator(&self) -> &WindAnimator {
        &self.animator
    }

    pub fn trunk(&self) -> Option<BranchId> {
        self.animator.trunk()
    }

    pub fn terminals(&self) -> &[BranchId] {
        self.animator.terminals()
    }

    pub fn is_terminal(&self, id: BranchId) -> bool {
        self.tree.is_terminal(id)
    }

    pub fn max_height(&self) -> Option<f32> {
        self.tree.max_height()
    }

    pub fn nearest_terminal(&self, point: Vec3) -> Option<BranchId> {
        self.tree.nearest_terminal(point)
    }

    /// Current pivot transforms, indexed by [`BranchId::index`].
    pub fn pose(&self) -> &[Transform] {
        &self.pose
    }

    /// Advances wind by one frame and refreshes the pose.
    pub fn animate(&mut self, settings: &WindSettings, elapsed: f32, delta: f32) {
        if !settings.enabled {
            return;
        }
        self.animator.tick(&mut self.tree, settings, elapsed, delta);
        self.pose = self.tree.pose();
    }

    pub fn reset_wind(&mut self) {
        self.animator.reset(&mut self.tree);
        self.pose = self.tree.pose();
    }
}

/// Grows plants from a library of rule sets.
#[derive(Debug, Clone)]
pub struct PlantGenerator {
    library: Vec<RuleSet>,
    config: PlantConfig,
    leaf_prefabs: Vec<PrefabId>,
    flower_prefabs: Vec<PrefabId>,
}

impl Default for PlantGenerator {
    fn default() -> Self {
        Self {
            library: presets::default_library(),
            config: PlantConfig::default(),
            leaf_prefabs: Vec::new(),
            flower_prefabs: Vec::new(),
        }
    }
}

impl PlantGenerator {
    pub fn new(library: Vec<RuleSet>, config: PlantConfig) -> Result<Self> {
        if library.is_empty() {
            return Err(FloraError::EmptyLibrary);
        }
        for rule_set in &library {
            rule_set.validate()?;
        }
        config.validate()?;
        Ok(Self {
            library,
            config,
            leaf_prefabs: Vec::new(),
            flower_prefabs: Vec::new(),
        })
    }

    pub fn with_leaf_prefabs(mut self, prefabs: impl IntoIterator<Item = PrefabId>) -> Self {
        self.leaf_prefabs = prefabs.into_iter().collect();
        self
    }

    pub fn with_flower_prefabs(mut self, prefabs: impl IntoIterator<Item = PrefabId>) -> Self {
        self.flower_prefabs = prefabs.into_iter().collect();
        self
    }

    pub fn library(&self) -> &[RuleSet] {
        &self.library
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    /// Draws one rule set uniformly from the library.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> &RuleSet {
        &self.library[rng.gen_range(0..self.library.len())]
    }

    /// Grows a plant from a randomly selected rule set.
    pub fn generate<R: Rng + ?Sized>(&self, origin: Transform, rng: &mut R) -> PlantInstance {
        let rule_set = self.select(rng).clone();
        self.generate_with(rule_set, origin, rng)
    }

    /// Grows a plant from `rule_set`, starting at `origin`. With
    /// [`PlantConfig::random_heading`] set, the origin is first turned by a
    /// random angle about its local up axis.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rule_set: RuleSet,
        mut origin: Transform,
        rng: &mut R,
    ) -> PlantInstance {
        let config = &self.config;

        let mut iterations = rule_set.iterations();
        if iterations > config.max_iterations {
            warn!(
                "Rule set '{}' asks for {} iterations, clamping to {}",
                rule_set.name(),
                iterations,
                config.max_iterations
            );
            iterations = config.max_iterations;
        }

        let symbols = expand(rule_set.axiom(), iterations, &rule_set, rng);
        debug!("Expanded '{}': {}", rule_set.name(), symbols);

        if config.random_heading {
            origin.rotation *= Quat::from_rotation_y(rng.gen_range(0.0..TAU));
        }

        let params = TurtleParams {
            length: config.length,
            angle_step: rule_set.angle(),
            max_height: origin.translation.y + config.growth_limit,
            length_jitter: config.length_jitter,
            origin,
        };
        let tree = TurtleInterpreter::new(params)
            .with_alphabet(config.alphabet.clone())
            .build(&symbols, rng);

        if tree.is_empty() {
            warn!(
                "Rule set '{}' produced no branches; wind has no trunk to sway",
                rule_set.name()
            );
        }
        if self.leaf_prefabs.is_empty() {
            warn!("No leaf prefabs configured, skipping leaves and flowers");
        } else if self.flower_prefabs.is_empty() && config.flower_probability > 0.0 {
            warn!("No flower prefabs configured, keeping all leaves");
        }

        let decorations = attach_decorations(
            &tree,
            &self.leaf_prefabs,
            &self.flower_prefabs,
            config.flower_probability,
            rng,
        );

        let plant = PlantInstance::new(rule_set, symbols, tree, decorations);
        info!(
            "Grew '{}': {} symbols, {} branches, {} leaves, {} flowers",
            plant.rule_set().name(),
            plant.symbols().len(),
            plant.tree().len(),
            plant.leaf_count(),
            plant.flower_count()
        );
        plant
    }
}
