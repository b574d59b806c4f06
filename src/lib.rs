//! Stochastic L-System plant growth for Bevy.
//!
//! This crate grows branching plants from weighted rewrite rules, interprets
//! the result with a 3D turtle into an explicit branch tree, decorates the
//! branch tips with leaves and flowers, and sways the tree in the wind.
//!
//! # Features
//!
//! - **Grammar expansion**: weighted, context-free rewriting via [`grammar::expand`]
//!   and [`RuleSet`], plus a library of built-in bushes in [`presets`].
//! - **Turtle interpretation**: single-pass, stack-based construction of a
//!   [`PlantTree`] with a height limit and optional length jitter via
//!   [`TurtleInterpreter`].
//! - **Decorations**: leaves on terminal branches, a share of them swapped for
//!   flowers, via [`decoration::attach_decorations`].
//! - **Wind**: trunk sway and per-tip flutter via [`WindAnimator`], posed down
//!   the hierarchy by [`PlantTree::pose`].
//! - **Bevy integration**: [`FloraPlugin`] with pivot entities kept in sync
//!   with the posed tree.
//!
//! # Feature Flags
//!
//! - `json` (default): enables [`RuleSet::from_json`] and
//!   [`config::FloraConfig::from_json`].
//!
//! # Example
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_flora::prelude::*;
//!
//! fn setup(app: &mut App) {
//!     app.add_plugins(FloraPlugin::seeded(7))
//!        .add_systems(Startup, grow_plant);
//! }
//!
//! fn grow_plant(mut commands: Commands, mut rng: ResMut<PlantRng>) {
//!     let generator = PlantGenerator::default()
//!         .with_leaf_prefabs([PrefabId(0)])
//!         .with_flower_prefabs([PrefabId(1)]);
//!     let plant = generator.generate(Transform::IDENTITY, &mut rng.0);
//!     spawn_plant(&mut commands, plant, Transform::from_xyz(0.0, 0.5, 0.0));
//! }
//! ```

pub mod config;
pub mod decoration;
pub mod error;
pub mod grammar;
pub mod plant;
pub mod plugin;
pub mod presets;
pub mod tree;
pub mod turtle;
pub mod wind;

pub use error::{FloraError, Result};
pub use grammar::{ProductionRule, RuleSet};
pub use plant::{PlantGenerator, PlantInstance};
pub use plugin::FloraPlugin;
pub use tree::{BranchId, BranchNode, PlantTree};
pub use turtle::{TurtleInterpreter, TurtleParams};
pub use wind::{WindAnimator, WindSettings};

pub mod prelude {
    pub use crate::config::{FloraConfig, PlantConfig};
    pub use crate::decoration::{Decoration, DecorationKind, PrefabId};
    pub use crate::grammar::{ProductionRule, RuleSet};
    pub use crate::plant::{PlantGenerator, PlantInstance};
    pub use crate::plugin::{
        BranchPivot, DecorationMarker, FloraPlugin, Plant, PlantRng, PlantWind,
        regenerate_plant, spawn_plant,
    };
    pub use crate::tree::{BranchId, PlantTree};
    pub use crate::turtle::{LengthJitter, TurtleInterpreter, TurtleParams};
    pub use crate::wind::{WindAnimator, WindSettings};
}
