//! Per-frame wind sway over a built tree.
//!
//! The trunk swings slowly along the wind direction; every terminal node
//! flutters faster and with its own phase. Only the sway rotation of existing
//! nodes is touched, never positions or links.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FloraError, Result};
use crate::tree::{BranchId, PlantTree};

/// Upper bound on the depth gain applied to flutter amplitude.
pub const MAX_DEPTH_GAIN: f32 = 4.0;

/// Wind parameters. Angles are degrees, rates are per second.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindSettings {
    pub enabled: bool,
    pub speed: f32,
    pub strength: f32,
    pub flutter_speed: f32,
    pub flutter_strength: f32,
    /// Horizontal direction as `[x, z]`; normalized on use.
    pub direction: [f32; 2],
    pub trunk_smoothing: f32,
    pub flutter_smoothing: f32,
    /// Flutter gain per level of depth, capped at [`MAX_DEPTH_GAIN`].
    pub depth_amplification: f32,
}

impl Default for WindSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 1.0,
            strength: 5.0,
            flutter_speed: 2.0,
            flutter_strength: 2.0,
            direction: [0.5, 0.5],
            trunk_smoothing: 5.0,
            flutter_smoothing: 10.0,
            depth_amplification: 1.333,
        }
    }
}

impl WindSettings {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_direction(mut self, x: f32, z: f32) -> Self {
        self.direction = [x, z];
        self
    }

    pub fn with_strength(mut self, strength: f32, flutter_strength: f32) -> Self {
        self.strength = strength;
        self.flutter_strength = flutter_strength;
        self
    }

    pub fn direction(&self) -> Vec2 {
        Vec2::from_array(self.direction).normalize_or_zero()
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("speed", self.speed),
            ("strength", self.strength),
            ("flutter_speed", self.flutter_speed),
            ("flutter_strength", self.flutter_strength),
            ("direction.x", self.direction[0]),
            ("direction.z", self.direction[1]),
            ("trunk_smoothing", self.trunk_smoothing),
            ("flutter_smoothing", self.flutter_smoothing),
            ("depth_amplification", self.depth_amplification),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(FloraError::NonFinite { name, value });
            }
        }
        Ok(())
    }

    /// Trunk rotation the sway eases toward at time `elapsed`.
    pub fn trunk_target(&self, elapsed: f32) -> Quat {
        let sway = (elapsed * self.speed).sin() * self.strength;
        let dir = self.direction();
        Quat::from_euler(
            EulerRot::XYZ,
            (dir.x * sway).to_radians(),
            0.0,
            (dir.y * sway).to_radians(),
        )
    }

    /// Flutter rotation about the local up axis for a node at `depth` with
    /// the given phase offset.
    pub fn flutter_target(&self, elapsed: f32, phase: f32, depth: u32) -> Quat {
        let gain = self
            .depth_amplification
            .abs()
            .powi(depth.min(64) as i32)
            .min(MAX_DEPTH_GAIN);
        let flutter = (elapsed * self.flutter_speed + phase).sin() * self.flutter_strength * gain;
        Quat::from_rotation_y(flutter.to_radians())
    }
}

/// Eases `current` toward `target` by `delta * rate`, clamped to a full step.
fn approach(current: Quat, target: Quat, delta: f32, rate: f32) -> Quat {
    let t = (delta * rate).clamp(0.0, 1.0);
    current.slerp(target, t).normalize()
}

/// Drives the sway of one tree. Holds the trunk and the terminal nodes as
/// they were when the tree finished building.
#[derive(Debug, Clone, Default)]
pub struct WindAnimator {
    trunk: Option<BranchId>,
    terminals: Vec<BranchId>,
}

impl WindAnimator {
    pub fn attach(tree: &PlantTree) -> Self {
        Self {
            trunk: tree.trunk(),
            terminals: tree.terminals(),
        }
    }

    pub fn trunk(&self) -> Option<BranchId> {
        self.trunk
    }

    pub fn terminals(&self) -> &[BranchId] {
        &self.terminals
    }

    /// Advances sway by one frame. Does nothing while wind is disabled, so
    /// nodes hold whatever rotation they last reached.
    ///
    /// The trunk only follows the trunk sway, even when it has no children
    /// and so is also listed among the terminals.
    pub fn tick(&self, tree: &mut PlantTree, settings: &WindSettings, elapsed: f32, delta: f32) {
        if !settings.enabled {
            return;
        }

        if let Some(trunk) = self.trunk
            && let Some(node) = tree.get(trunk)
        {
            let target = settings.trunk_target(elapsed);
            let next = approach(node.sway(), target, delta, settings.trunk_smoothing);
            tree.set_sway(trunk, next);
        }

        // A childless trunk is also a terminal; it keeps the trunk sway.
        for &id in self.terminals.iter().filter(|id| Some(**id) != self.trunk) {
            let Some(node) = tree.get(id) else {
                continue;
            };
            // Node ids are stable per tree, so siblings never share a phase.
            let target = settings.flutter_target(elapsed, id.0 as f32, node.depth());
            let next = approach(node.sway(), target, delta, settings.flutter_smoothing);
            tree.set_sway(id, next);
        }
    }

    /// Returns every animated node to its rest rotation.
    pub fn reset(&self, tree: &mut PlantTree) {
        for id in self.trunk.iter().chain(&self.terminals) {
            tree.set_sway(*id, Quat::IDENTITY);
        }
    }
}
