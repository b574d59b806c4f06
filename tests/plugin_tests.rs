use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_flora::config::PlantConfig;
use bevy_flora::prelude::*;
use bevy_flora::presets;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

fn generator() -> PlantGenerator {
    PlantGenerator::default()
        .with_leaf_prefabs([PrefabId(0)])
        .with_flower_prefabs([PrefabId(1)])
}

fn grow(mut commands: Commands, mut rng: ResMut<PlantRng>) {
    let plant = generator().generate(Transform::IDENTITY, &mut rng.0);
    spawn_plant(&mut commands, plant, Transform::from_xyz(1.0, 0.0, 0.0));
}

fn app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, FloraPlugin::seeded(3)))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .add_systems(Startup, grow);
    app.update();
    app
}

fn plant_entity(app: &mut App) -> Entity {
    let world = app.world_mut();
    let mut query = world.query_filtered::<Entity, With<Plant>>();
    query.single(world).expect("exactly one plant")
}

fn pivot_transforms(app: &mut App) -> Vec<(BranchId, Transform)> {
    let world = app.world_mut();
    let mut query = world.query::<(&BranchPivot, &Transform)>();
    let mut pivots: Vec<_> = query.iter(world).map(|(p, t)| (p.node, *t)).collect();
    pivots.sort_by_key(|(id, _)| *id);
    pivots
}

#[test]
fn test_plugin_inserts_resources() {
    let app = app();
    assert!(app.world().contains_resource::<WindSettings>());
    assert!(app.world().contains_resource::<PlantRng>());
}

#[test]
fn test_spawn_creates_one_pivot_per_node() {
    let mut app = app();
    let entity = plant_entity(&mut app);

    let world = app.world_mut();
    let plant = world.get::<Plant>(entity).expect("plant component");
    let nodes = plant.tree().len();
    let decorations = plant.decorations().len();
    assert!(nodes > 0);

    let mut pivots = world.query::<(&BranchPivot, &ChildOf)>();
    let pivot_parents: Vec<Entity> = pivots.iter(world).map(|(_, c)| c.parent()).collect();
    assert_eq!(pivot_parents.len(), nodes);
    assert!(pivot_parents.iter().all(|p| *p == entity));

    let mut markers = world.query::<&DecorationMarker>();
    assert_eq!(markers.iter(world).count(), decorations);
}

#[test]
fn test_decorations_sit_at_branch_tips() {
    let mut app = app();
    let world = app.world_mut();

    let mut markers = world.query::<(&DecorationMarker, &ChildOf, &Transform)>();
    let found: Vec<_> = markers
        .iter(world)
        .map(|(m, c, t)| (*m, c.parent(), *t))
        .collect();
    assert!(!found.is_empty());

    for (marker, pivot_entity, local) in found {
        let pivot = world.get::<BranchPivot>(pivot_entity).expect("parented to a pivot");
        assert_eq!(pivot.node, marker.node);
        assert_eq!(local.rotation, Quat::IDENTITY);
        assert!(local.translation.y > 0.0);
    }
}

#[test]
fn test_pivots_follow_the_posed_tree() {
    let mut app = app();
    for _ in 0..10 {
        app.update();
    }
    let entity = plant_entity(&mut app);

    let pose: Vec<Transform> = app
        .world()
        .get::<Plant>(entity)
        .expect("plant")
        .pose()
        .to_vec();
    let pivots = pivot_transforms(&mut app);
    for (id, transform) in &pivots {
        assert_eq!(*transform, pose[id.index()]);
    }

    let plant = app.world().get::<Plant>(entity).unwrap();
    let trunk = plant.trunk().expect("trunk");
    let rest = plant.tree().get(trunk).unwrap().orientation();
    assert!(
        pose[trunk.index()].rotation.angle_between(rest) > 1e-4,
        "Wind should have moved the trunk after a second"
    );
}

#[test]
fn test_disabled_wind_freezes_pivots() {
    let mut app = app();
    for _ in 0..5 {
        app.update();
    }
    app.world_mut().resource_mut::<WindSettings>().enabled = false;
    app.update();
    let frozen = pivot_transforms(&mut app);

    for _ in 0..5 {
        app.update();
    }
    assert_eq!(pivot_transforms(&mut app), frozen);
}

#[test]
fn test_regenerate_replaces_children() {
    let mut app = app();
    let entity = plant_entity(&mut app);

    let config = PlantConfig::default()
        .with_length(1.0)
        .with_growth_limit(f32::INFINITY);
    let binary = PlantGenerator::new(vec![presets::binary_plant()], config)
        .expect("valid generator")
        .with_leaf_prefabs([PrefabId(5)]);
    let instance = binary.generate(
        Transform::IDENTITY,
        &mut Xoshiro256StarStar::seed_from_u64(0),
    );

    {
        let mut commands = app.world_mut().commands();
        regenerate_plant(&mut commands, entity, instance);
    }
    app.world_mut().flush();
    app.update();

    let pivots = pivot_transforms(&mut app);
    assert_eq!(pivots.len(), 25, "Old pivots are gone, new ones spawned");

    let world = app.world_mut();
    let mut markers = world.query::<&DecorationMarker>();
    let markers: Vec<_> = markers.iter(world).copied().collect();
    assert_eq!(markers.len(), 13);
    assert!(markers.iter().all(|m| m.prefab == PrefabId(5)));

    let plant = world.get::<Plant>(entity).unwrap();
    assert_eq!(plant.rule_set().name(), "BinaryPlant");
}

#[test]
fn test_reset_wind_system_returns_to_rest() {
    let mut app = app();
    for _ in 0..10 {
        app.update();
    }
    app.world_mut().resource_mut::<WindSettings>().enabled = false;
    app.world_mut()
        .run_system_cached(bevy_flora::plugin::reset_wind)
        .expect("reset runs");

    let entity = plant_entity(&mut app);
    let plant = app.world().get::<Plant>(entity).unwrap();
    assert!(plant.tree().nodes().iter().all(|n| n.sway() == Quat::IDENTITY));
}

#[derive(Component)]
struct Calm;

fn grow_pair(mut commands: Commands, mut rng: ResMut<PlantRng>) {
    let generator = generator();
    let windy = generator.generate(Transform::IDENTITY, &mut rng.0);
    spawn_plant(&mut commands, windy, Transform::IDENTITY);

    let calm = generator.generate(Transform::IDENTITY, &mut rng.0);
    let entity = spawn_plant(&mut commands, calm, Transform::from_xyz(2.0, 0.0, 0.0));
    commands.entity(entity).insert((
        Calm,
        PlantWind(WindSettings::default().with_enabled(false)),
    ));
}

fn pivots_of(app: &mut App, calm: bool) -> Vec<(BranchId, Transform)> {
    let world = app.world_mut();
    let mut query = world.query::<(&BranchPivot, &ChildOf, &Transform)>();
    let found: Vec<_> = query
        .iter(world)
        .map(|(p, c, t)| (p.node, c.parent(), *t))
        .collect();
    let mut pivots: Vec<_> = found
        .into_iter()
        .filter(|(_, parent, _)| world.get::<Calm>(*parent).is_some() == calm)
        .map(|(node, _, t)| (node, t))
        .collect();
    pivots.sort_by_key(|(id, _)| *id);
    pivots
}

#[test]
fn test_plant_wind_overrides_global_settings() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, FloraPlugin::seeded(5)))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .add_systems(Startup, grow_pair);
    app.update();

    let calm_before = pivots_of(&mut app, true);
    let windy_before = pivots_of(&mut app, false);
    assert!(!calm_before.is_empty());
    assert!(!windy_before.is_empty());

    for _ in 0..10 {
        app.update();
    }
    assert_eq!(pivots_of(&mut app, true), calm_before, "Calm plant holds still");
    assert_ne!(pivots_of(&mut app, false), windy_before, "Other plants keep swaying");
}

#[test]
fn test_decorations_are_named_by_kind() {
    let mut app = app();
    let world = app.world_mut();

    let mut markers = world.query::<(&DecorationMarker, &Name)>();
    let mut count = 0;
    for (marker, name) in markers.iter(world) {
        let label = match marker.kind {
            DecorationKind::Leaf => "Leaf",
            DecorationKind::Flower => "Flower",
        };
        assert_eq!(name.as_str(), format!("{label} {}", marker.node.index()));
        count += 1;
    }
    assert!(count > 0);
}
