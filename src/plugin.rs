//! Bevy ECS integration.
//!
//! A plant lives on one entity holding a [`Plant`] component. Every branch
//! node gets a child entity tagged [`BranchPivot`] whose `Transform` is kept
//! in sync with the plant's posed tree, and every leaf or flower gets a
//! [`DecorationMarker`] entity parented to its pivot at the branch tip.
//! Attach your own meshes or scenes to those entities; this crate does not
//! render anything.
//!
//! # Workflow
//!
//! 1. Add [`FloraPlugin`]. It inserts [`WindSettings`] and a seeded
//!    [`PlantRng`], and schedules [`animate_wind`] then
//!    [`sync_branch_transforms`] in `Update`.
//! 2. Grow a [`PlantInstance`] with a [`PlantGenerator`](crate::plant::PlantGenerator) and
//!    [`PlantRng`], then call [`spawn_plant`].
//! 3. Insert a [`PlantWind`] next to a [`Plant`] to give that plant its own
//!    wind, for example to calm one plant while the rest keep swaying.
//! 4. To regrow, call [`regenerate_plant`]; the previous pivots and
//!    decorations are despawned before the new ones are created.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::decoration::{DecorationKind, PrefabId};
use crate::plant::PlantInstance;
use crate::tree::BranchId;
use crate::wind::WindSettings;

/// Registers wind resources and per-frame systems.
#[derive(Debug, Clone, Default)]
pub struct FloraPlugin {
    /// Seed for [`PlantRng`]; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl FloraPlugin {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl Plugin for FloraPlugin {
    fn build(&self, app: &mut App) {
        let rng = match self.seed {
            Some(seed) => Xoshiro256StarStar::seed_from_u64(seed),
            None => Xoshiro256StarStar::from_entropy(),
        };
        app.init_resource::<WindSettings>()
            .insert_resource(PlantRng(rng))
            .add_systems(Update, (animate_wind, sync_branch_transforms).chain());
    }
}

/// Random source for plant generation.
#[derive(Resource, Deref, DerefMut)]
pub struct PlantRng(pub Xoshiro256StarStar);

/// The plant grown on this entity.
#[derive(Component, Deref, DerefMut)]
#[require(Transform, Visibility)]
pub struct Plant(pub PlantInstance);

/// Per-plant wind that takes the place of the global [`WindSettings`]
/// resource for the plant on the same entity.
#[derive(Component, Debug, Clone, Default, Deref, DerefMut)]
pub struct PlantWind(pub WindSettings);

/// Child entity standing for one branch node of the parent [`Plant`].
#[derive(Component, Debug, Clone, Copy)]
#[require(Transform, Visibility)]
pub struct BranchPivot {
    pub node: BranchId,
}

/// Leaf or flower entity, parented to its branch pivot at the tip.
#[derive(Component, Debug, Clone, Copy)]
#[require(Transform, Visibility)]
pub struct DecorationMarker {
    pub kind: DecorationKind,
    pub prefab: PrefabId,
    pub node: BranchId,
}

/// Spawns a plant entity at `transform` with its pivots and decorations.
pub fn spawn_plant(
    commands: &mut Commands,
    instance: PlantInstance,
    transform: Transform,
) -> Entity {
    let plant = commands.spawn(transform).id();
    spawn_children(commands, plant, &instance);
    commands.entity(plant).insert(Plant(instance));
    plant
}

/// Replaces the plant on `plant` with `instance`, despawning the old pivots
/// and decorations first.
pub fn regenerate_plant(commands: &mut Commands, plant: Entity, instance: PlantInstance) {
    commands.entity(plant).despawn_related::<Children>();
    spawn_children(commands, plant, &instance);
    commands.entity(plant).insert(Plant(instance));
}

fn spawn_children(commands: &mut Commands, plant: Entity, instance: &PlantInstance) {
    let pose = instance.pose();
    let pivots: Vec<Entity> = instance
        .tree()
        .nodes()
        .iter()
        .map(|node| {
            commands
                .spawn((
                    Name::new(format!("Branch {}", node.id().index())),
                    BranchPivot { node: node.id() },
                    pose[node.id().index()],
                    ChildOf(plant),
                ))
                .id()
        })
        .collect();

    for decoration in instance.decorations() {
        let Some(node) = instance.tree().get(decoration.node) else {
            continue;
        };
        let label = match decoration.kind {
            DecorationKind::Leaf => "Leaf",
            DecorationKind::Flower => "Flower",
        };
        commands.spawn((
            Name::new(format!("{label} {}", decoration.node.index())),
            DecorationMarker {
                kind: decoration.kind,
                prefab: decoration.prefab,
                node: decoration.node,
            },
            Transform::from_xyz(0.0, node.length(), 0.0),
            ChildOf(pivots[decoration.node.index()]),
        ));
    }
}

/// Ticks wind on every plant, using its [`PlantWind`] when present and the
/// global [`WindSettings`] otherwise.
pub fn animate_wind(
    time: Res<Time>,
    global: Res<WindSettings>,
    mut plants: Query<(&mut Plant, Option<&PlantWind>)>,
) {
    let elapsed = time.elapsed_secs();
    let delta = time.delta_secs();
    for (mut plant, wind) in &mut plants {
        let settings = wind.map_or(&*global, |w| &w.0);
        if !settings.enabled {
            continue;
        }
        plant.animate(settings, elapsed, delta);
    }
}

/// Copies posed transforms from changed plants onto their pivot entities.
pub fn sync_branch_transforms(
    plants: Query<&Plant, Changed<Plant>>,
    mut pivots: Query<(&BranchPivot, &ChildOf, &mut Transform)>,
) {
    for (pivot, child_of, mut transform) in &mut pivots {
        let Ok(plant) = plants.get(child_of.parent()) else {
            continue;
        };
        if let Some(posed) = plant.pose().get(pivot.node.index()) {
            transform.set_if_neq(*posed);
        }
    }
}

/// Returns every plant's branches to rest. Wind keeps running unless
/// [`WindSettings::enabled`] is also cleared.
pub fn reset_wind(mut plants: Query<&mut Plant>) {
    for mut plant in &mut plants {
        plant.reset_wind();
    }
}
