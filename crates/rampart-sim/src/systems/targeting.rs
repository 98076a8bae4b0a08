//! Target acquisition and aim.
//!
//! Three passes per tick, in order: `clear` drops dead or out-of-range
//! targets, `find` picks the nearest enemy for idle turrets, `aim` slews
//! each turret head towards its (lead-corrected) aim point and updates lock.

use hecs::{Entity, World};

use rampart_core::components::{LocalTransform, Turret};
use rampart_core::enums::{Population, WeaponKind};
use rampart_core::tuning::Tuning;
use rampart_core::types::Position;

use crate::geometry::{look_at, rotate_to};
use crate::relations::{Target, TurretSlots};
use crate::spatial::{QueryScratch, SpatialHit, SpatialIndex};

/// Release targets that died or moved beyond `range`.
pub fn clear(world: &World, range: f64) {
    for (_entity, (target, pos)) in world.query::<(&mut Target, &Position)>().iter() {
        let Some(enemy) = target.enemy else {
            continue;
        };
        let in_range = match world.get::<&Position>(enemy) {
            Ok(enemy_pos) => pos.distance_to(&enemy_pos) <= range,
            Err(_) => false,
        };
        if !in_range {
            target.enemy = None;
            target.lock = false;
        }
    }
}

/// Acquire the nearest enemy within `range` for every turret without one.
/// Ties go to the first candidate returned by the index.
pub fn find(world: &World, index: &impl SpatialIndex, scratch: &mut QueryScratch, range: f64) {
    for (entity, (_turret, target, pos)) in world.query::<(&Turret, &mut Target, &Position)>().iter() {
        if target.enemy.is_some() {
            continue;
        }

        let hits = scratch.buffer(entity, Population::Enemies);
        index.find_nearby_into(pos, range, Population::Enemies, hits);

        if let Some((enemy, enemy_pos, distance)) = nearest_live(world, pos, hits.as_slice(), range) {
            target.enemy = Some(enemy);
            target.distance = distance;
            target.prev_position = enemy_pos;
            target.lock = false;
        }
    }
}

/// Closest candidate that is still alive, measured at its current position.
fn nearest_live(
    world: &World,
    origin: &Position,
    candidates: &[SpatialHit],
    range: f64,
) -> Option<(Entity, Position, f64)> {
    let mut best: Option<(Entity, Position, f64)> = None;
    for hit in candidates {
        let Ok(enemy_pos) = world.get::<&Position>(hit.entity).map(|p| *p) else {
            continue;
        };
        let distance = origin.distance_to(&enemy_pos);
        if distance > range {
            continue;
        }
        if best.map_or(true, |(_, _, d)| distance < d) {
            best = Some((hit.entity, enemy_pos, distance));
        }
    }
    best
}

/// Slew turret heads towards their targets and re-evaluate lock.
pub fn aim(world: &World, tuning: &Tuning, dt: f64) {
    for (_entity, (turret, target, pos, slots)) in
        world.query::<(&Turret, &mut Target, &Position, &TurretSlots)>().iter()
    {
        let Some(enemy) = target.enemy else {
            continue;
        };
        let Ok(enemy_pos) = world.get::<&Position>(enemy).map(|p| *p) else {
            continue;
        };

        let delta = enemy_pos.as_dvec3() - target.prev_position.as_dvec3();
        target.prev_position = enemy_pos;
        let distance = pos.distance_to(&enemy_pos);

        // Beams hit instantly, so only ballistic weapons lead the target.
        let mut aim_point = enemy_pos.as_dvec3();
        if turret.weapon == WeaponKind::Cannon {
            aim_point += delta * distance * tuning.lead_prediction_factor;
        }
        target.aim_position = Position::from(aim_point);

        let angle = look_at(pos, &target.aim_position);
        let Ok(mut head) = world.get::<&mut LocalTransform>(slots.head) else {
            continue;
        };
        head.rotation.y = rotate_to(head.rotation.y, angle, tuning.turret_rotate_speed * dt);

        target.angle = angle;
        target.distance = distance;
        target.lock = head.rotation.y == angle && distance < tuning.turret_range;
    }
}
