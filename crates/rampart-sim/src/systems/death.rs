//! Death cascade: enemies out of health explode and are removed.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use rampart_core::components::{Enemy, Health};
use rampart_core::events::SimEvent;
use rampart_core::types::Position;

use crate::stats::SimStats;
use crate::world_setup;

/// Despawn every enemy at or below zero health and spawn its explosion.
/// Both happen in this pass, so no enemy survives a tick with health <= 0.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<SimEvent>,
    stats: &mut SimStats,
) {
    despawn_buffer.clear();

    let mut blasts = Vec::new();
    for (entity, (_enemy, health, pos)) in world.query_mut::<(&Enemy, &Health, &Position)>() {
        if health.value <= 0.0 {
            despawn_buffer.push(entity);
            blasts.push(*pos);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    for position in blasts {
        log::debug!("enemy destroyed at ({:.2}, {:.2})", position.x, position.z);
        world_setup::spawn_explosion(world, rng, &position);
        stats.enemies_destroyed += 1;
        events.push(SimEvent::EnemyDestroyed { position });
    }
}
