//! Snapshot system: queries the ECS world and builds a complete SimSnapshot.
//!
//! Read-only: it never modifies the world.

use hecs::World;

use rampart_core::components::*;
use rampart_core::enums::SimPhase;
use rampart_core::events::SimEvent;
use rampart_core::state::*;
use rampart_core::types::*;

use crate::relations::{Target, TurretSlots};
use crate::stats::SimStats;

/// Build a complete SimSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: SimPhase,
    events: Vec<SimEvent>,
    stats: &SimStats,
) -> SimSnapshot {
    SimSnapshot {
        time: *time,
        phase,
        renderables: build_renderables(world),
        enemies: build_enemies(world),
        turrets: build_turrets(world),
        particle_count: world.query::<&Particle>().iter().count() as u32,
        events,
        stats: stats.view(),
    }
}

/// Every visible box. Disabled beams are skipped.
fn build_renderables(world: &World) -> Vec<RenderableView> {
    world
        .query::<(
            &Position,
            &BoundingBox,
            &Color,
            Option<&Rotation>,
            Option<&Emissive>,
            Option<&Specular>,
            Option<&Beam>,
        )>()
        .iter()
        .filter(|(_, (.., beam))| beam.map_or(true, |b| b.enabled))
        .map(|(_, (pos, size, color, rotation, emissive, specular, _))| RenderableView {
            position: *pos,
            rotation: rotation.copied().unwrap_or_default(),
            size: *size,
            color: *color,
            emissive: emissive.copied(),
            specular: specular.copied(),
        })
        .collect()
}

/// Build EnemyView list from all live enemies.
fn build_enemies(world: &World) -> Vec<EnemyView> {
    world
        .query::<(&Enemy, &Position, &Health, &Direction)>()
        .iter()
        .map(|(_, (_, pos, health, direction))| EnemyView {
            position: *pos,
            health: health.value,
            direction: direction.index,
        })
        .collect()
}

/// Build TurretView list, reading head yaw and beam state from the slots.
fn build_turrets(world: &World) -> Vec<TurretView> {
    world
        .query::<(&Turret, &Target, &Position, &TurretSlots)>()
        .iter()
        .map(|(_, (turret, target, pos, slots))| {
            let head_angle = world
                .get::<&LocalTransform>(slots.head)
                .map(|l| l.rotation.y)
                .unwrap_or(0.0);
            let beam_active = slots
                .beam
                .and_then(|beam| world.get::<&Beam>(beam).ok().map(|b| b.enabled))
                .unwrap_or(false);
            TurretView {
                position: *pos,
                weapon: turret.weapon,
                head_angle,
                has_target: target.enemy.is_some(),
                lock: target.lock,
                beam_active,
            }
        })
        .collect()
}
