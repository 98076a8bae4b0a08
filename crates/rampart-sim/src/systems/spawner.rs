//! Enemy spawner: emits one enemy at the level's spawn point per interval.

use hecs::World;

use rampart_core::events::SimEvent;
use rampart_core::types::Position;
use rampart_level::Level;

use crate::stats::SimStats;
use crate::world_setup;

/// Accumulated simulation time since the last spawn.
#[derive(Debug, Clone, Default)]
pub struct SpawnTimer {
    pub elapsed: f64,
}

/// Advance the timer and spawn at most one enemy when the interval elapses.
pub fn run(
    world: &mut World,
    level: &Level,
    timer: &mut SpawnTimer,
    interval: f64,
    dt: f64,
    events: &mut Vec<SimEvent>,
    stats: &mut SimStats,
) {
    timer.elapsed += dt;
    if timer.elapsed < interval {
        return;
    }
    timer.elapsed -= interval;

    let (x, z) = level.spawn_point();
    let entity = world_setup::spawn_enemy(world, x, z);
    let position = world
        .get::<&Position>(entity)
        .map(|p| *p)
        .unwrap_or_default();

    stats.enemies_spawned += 1;
    events.push(SimEvent::EnemySpawned { position });
}
