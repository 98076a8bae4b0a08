//! Path following: walks enemies along the level grid.
//!
//! Direction decisions happen only near tile centers. An enemy never turns
//! back the way it came; if no forward, left or right neighbour is walkable
//! it has reached the end of the path and is removed without exploding.

use hecs::{Entity, World};

use rampart_core::components::{Direction, Enemy};
use rampart_core::constants::DIRECTIONS;
use rampart_core::events::SimEvent;
use rampart_core::types::Position;
use rampart_level::{PathGrid, TileProjection};

use crate::stats::SimStats;

/// Outcome of a steering decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    /// Keep moving along the (possibly updated) direction.
    Continue,
    /// No walkable neighbour: the path ends here.
    Finished,
}

/// Decide the next direction for an enemy at `pos`.
///
/// Away from a tile center the direction is left untouched. At a center the
/// current direction is kept if its neighbour is walkable; otherwise the
/// remaining non-backward directions are tried in order.
pub fn find_path(pos: &Position, direction: &mut Direction, grid: &PathGrid, projection: &TileProjection) -> Steer {
    let (tile, centered) = projection.locate(pos);
    if !centered {
        return Steer::Continue;
    }

    let backward = (direction.index + 2) % DIRECTIONS.len();
    for _ in 0..3 {
        if grid.is_walkable(tile.step(direction.index)) {
            return Steer::Continue;
        }
        direction.index = next_direction(direction.index, backward);
    }
    Steer::Finished
}

fn next_direction(current: usize, backward: usize) -> usize {
    let mut next = (current + 1) % DIRECTIONS.len();
    if next == backward {
        next = (next + 1) % DIRECTIONS.len();
    }
    next
}

/// Steer and advance every enemy. Enemies that reach the end of the path are
/// despawned at the end of the pass.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    grid: &PathGrid,
    projection: &TileProjection,
    speed: f64,
    dt: f64,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<SimEvent>,
    stats: &mut SimStats,
) {
    despawn_buffer.clear();

    for (entity, (_enemy, pos, direction)) in world.query_mut::<(&Enemy, &mut Position, &mut Direction)>() {
        match find_path(pos, direction, grid, projection) {
            Steer::Finished => {
                despawn_buffer.push(entity);
                events.push(SimEvent::EnemyEscaped { position: *pos });
            }
            Steer::Continue => {
                let (dx, dz) = DIRECTIONS[direction.index];
                pos.x += dx as f64 * speed * dt;
                pos.z += dz as f64 * speed * dt;
            }
        }
    }

    for entity in despawn_buffer.drain(..) {
        log::debug!("enemy {entity:?} reached the end of the path");
        stats.enemies_escaped += 1;
        let _ = world.despawn(entity);
    }
}

