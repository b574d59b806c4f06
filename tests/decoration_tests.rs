use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use bevy_flora::decoration::{DecorationKind, PrefabId, attach_decorations, flower_count};
use bevy_flora::{PlantTree, TurtleInterpreter, TurtleParams};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

const LEAF: PrefabId = PrefabId(10);
const FLOWER: PrefabId = PrefabId(20);

fn rng(seed: u64) -> Xoshiro256StarStar {
    Xoshiro256StarStar::seed_from_u64(seed)
}

/// A fan of `n` terminal branches on a single trunk.
fn fan(n: usize) -> PlantTree {
    let symbols = format!("F{}", "[+&F]".repeat(n));
    let params = TurtleParams {
        length: 1.0,
        angle_step: 30.0,
        ..default()
    };
    TurtleInterpreter::new(params).build(&symbols, &mut rng(0))
}

#[test]
fn test_one_leaf_per_terminal() {
    let tree = fan(6);
    let decorations = attach_decorations(&tree, &[LEAF], &[], 0.5, &mut rng(1));

    assert_eq!(decorations.len(), 6);
    assert!(decorations.iter().all(|d| d.kind == DecorationKind::Leaf));
    for d in &decorations {
        assert!(tree.is_terminal(d.node));
        let node = tree.get(d.node).unwrap();
        assert!(d.anchor.translation.distance(node.tip()) < 1e-6);
        assert!(d.anchor.rotation.angle_between(node.orientation()) < 1e-4);
    }
}

#[test]
fn test_flower_replacement_count() {
    let tree = fan(10);
    for (probability, expected) in [(0.0, 0), (0.3, 3), (0.25, 3), (0.5, 5), (1.0, 10)] {
        let decorations = attach_decorations(&tree, &[LEAF], &[FLOWER], probability, &mut rng(2));
        let flowers = decorations
            .iter()
            .filter(|d| d.kind == DecorationKind::Flower)
            .count();
        assert_eq!(flowers, expected, "probability {probability}");
        assert_eq!(decorations.len(), 10, "Replacement never adds or drops decorations");
    }
}

#[test]
fn test_flowers_replace_distinct_leaves() {
    let tree = fan(12);
    let decorations = attach_decorations(&tree, &[LEAF], &[FLOWER], 0.5, &mut rng(3));

    let nodes: HashSet<_> = decorations.iter().map(|d| d.node).collect();
    assert_eq!(nodes.len(), 12, "Each terminal carries exactly one decoration");

    for d in &decorations {
        match d.kind {
            DecorationKind::Leaf => assert_eq!(d.prefab, LEAF),
            DecorationKind::Flower => assert_eq!(d.prefab, FLOWER),
        }
    }
}

#[test]
fn test_probability_above_one_converts_everything() {
    let tree = fan(4);
    let decorations = attach_decorations(&tree, &[LEAF], &[FLOWER], 3.0, &mut rng(4));
    assert!(decorations.iter().all(|d| d.kind == DecorationKind::Flower));
}

#[test]
fn test_empty_leaf_set_places_nothing() {
    let tree = fan(4);
    let decorations = attach_decorations(&tree, &[], &[FLOWER], 1.0, &mut rng(5));
    assert!(decorations.is_empty());
}

#[test]
fn test_empty_tree_places_nothing() {
    let tree = PlantTree::default();
    let decorations = attach_decorations(&tree, &[LEAF], &[FLOWER], 1.0, &mut rng(6));
    assert!(decorations.is_empty());
}

#[test]
fn test_one_prefab_per_category_per_plant() {
    let tree = fan(8);
    let leaves = [PrefabId(1), PrefabId(2), PrefabId(3)];
    let decorations = attach_decorations(&tree, &leaves, &[FLOWER], 0.0, &mut rng(7));

    let first = decorations[0].prefab;
    assert!(leaves.contains(&first));
    assert!(decorations.iter().all(|d| d.prefab == first));
}

#[test]
fn test_selection_is_deterministic_under_seed() {
    let tree = fan(16);
    let a = attach_decorations(&tree, &[LEAF], &[FLOWER], 0.4, &mut rng(8));
    let b = attach_decorations(&tree, &[LEAF], &[FLOWER], 0.4, &mut rng(8));
    assert_eq!(a, b);
}

#[test]
fn test_flower_count_rounds_half_away_from_zero() {
    assert_eq!(flower_count(5, 0.5), 3);
    assert_eq!(flower_count(3, 0.5), 2);
    assert_eq!(flower_count(4, 0.1), 0);
    assert_eq!(flower_count(0, 1.0), 0);
    assert_eq!(flower_count(7, -1.0), 0);
    assert_eq!(flower_count(7, f32::NAN), 0);
}

#[test]
fn test_flower_count_exact_for_large_plants() {
    let leaves = (1 << 24) + 1;
    assert_eq!(flower_count(leaves, 1.0), leaves, "Every leaf becomes a flower");
    assert_eq!(flower_count(2 * leaves, 0.5), leaves);
}
