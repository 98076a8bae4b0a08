//! Slot transform propagation.
//!
//! Composes each slot entity's `LocalTransform` with its parent chain and
//! writes the resulting world `Position` and `Rotation`. Runs once per tick
//! before anything reads turret world positions.

use glam::{DQuat, DVec3};
use hecs::{Entity, World};

use rampart_core::components::LocalTransform;
use rampart_core::types::{Position, Rotation};

use crate::relations::Parent;

/// Parent chains deeper than this are treated as broken.
const MAX_SLOT_DEPTH: usize = 8;

/// Recompute world transforms for every slot entity.
pub fn run(world: &mut World) {
    let mut updates = Vec::new();
    for (entity, (_parent, _local)) in world.query::<(&Parent, &LocalTransform)>().iter() {
        if let Some(transform) = compose(world, entity) {
            updates.push((entity, transform));
        }
    }

    for (entity, (translation, yaw)) in updates {
        if let Ok(mut pos) = world.get::<&mut Position>(entity) {
            *pos = Position::from(translation);
        }
        if let Ok(mut rot) = world.get::<&mut Rotation>(entity) {
            *rot = Rotation::yaw(yaw);
        }
    }
}

/// World translation and yaw of `entity`, walking up to the root.
/// Returns `None` when the chain is broken (dead parent, cycle).
pub fn compose(world: &World, entity: Entity) -> Option<(DVec3, f64)> {
    let mut chain: Vec<LocalTransform> = Vec::new();
    let mut current = entity;

    while let Ok(parent) = world.get::<&Parent>(current).map(|p| p.entity) {
        let local = world.get::<&LocalTransform>(current).ok().map(|l| *l)?;
        chain.push(local);
        if chain.len() > MAX_SLOT_DEPTH {
            return None;
        }
        current = parent;
    }

    let mut translation = world.get::<&Position>(current).ok()?.as_dvec3();
    let mut yaw = world.get::<&Rotation>(current).map(|r| r.y).unwrap_or(0.0);

    for local in chain.iter().rev() {
        translation += DQuat::from_rotation_y(yaw) * local.translation.as_dvec3();
        yaw += local.rotation.y;
    }
    Some((translation, yaw))
}
