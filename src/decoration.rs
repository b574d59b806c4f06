//! Leaf and flower placement on terminal branches.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tree::{BranchId, PlantTree};

/// Opaque asset token chosen by the caller. The crate only hands it back on
/// the decorations it places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrefabId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Leaf,
    Flower,
}

/// One leaf or flower bound to a branch tip.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub prefab: PrefabId,
    pub node: BranchId,
    /// At the node's tip, oriented with the node.
    pub anchor: Transform,
}

/// Places one leaf on every terminal node, then replaces
/// `round(leaves * flower_probability)` of them with flowers.
///
/// A single leaf prefab and a single flower prefab are drawn for the whole
/// plant. Flowers are picked without replacement and take the replaced leaf's
/// slot and anchor. With no leaf prefabs nothing is placed; with no flower
/// prefabs the leaves are kept as they are.
pub fn attach_decorations<R: Rng + ?Sized>(
    tree: &PlantTree,
    leaf_prefabs: &[PrefabId],
    flower_prefabs: &[PrefabId],
    flower_probability: f32,
    rng: &mut R,
) -> Vec<Decoration> {
    if leaf_prefabs.is_empty() {
        return Vec::new();
    }
    let leaf = leaf_prefabs[rng.gen_range(0..leaf_prefabs.len())];

    let mut decorations: Vec<Decoration> = tree
        .nodes()
        .iter()
        .filter(|n| n.is_terminal())
        .map(|n| Decoration {
            kind: DecorationKind::Leaf,
            prefab: leaf,
            node: n.id(),
            anchor: Transform::from_translation(n.tip()).with_rotation(n.orientation()),
        })
        .collect();

    if decorations.is_empty() || flower_prefabs.is_empty() {
        return decorations;
    }
    let flower = flower_prefabs[rng.gen_range(0..flower_prefabs.len())];

    let to_convert = flower_count(decorations.len(), flower_probability);
    let mut pool: Vec<usize> = (0..decorations.len()).collect();
    for _ in 0..to_convert {
        let picked = pool.remove(rng.gen_range(0..pool.len()));
        let replaced = &decorations[picked];
        decorations[picked] = Decoration {
            kind: DecorationKind::Flower,
            prefab: flower,
            node: replaced.node,
            anchor: replaced.anchor,
        };
    }

    decorations
}

/// `round(leaves * probability)` with the probability clamped to `[0, 1]`.
pub fn flower_count(leaves: usize, probability: f32) -> usize {
    let probability = if probability.is_nan() {
        0.0
    } else {
        f64::from(probability).clamp(0.0, 1.0)
    };
    ((leaves as f64 * probability).round() as usize).min(leaves)
}
