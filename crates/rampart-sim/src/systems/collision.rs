//! Hit test: bullets striking enemies.

use hecs::{Entity, World};

use rampart_core::components::{Bullet, Enemy, Health};
use rampart_core::enums::Population;
use rampart_core::types::{BoundingBox, Position};

use crate::spatial::{QueryScratch, SpatialIndex};

/// Destroy every bullet inside an enemy's hit radius and apply its damage.
///
/// The hit radius is half the enemy's width plus half the struck bullet's
/// width. Each bullet counts once even when it lies inside two enemies' radii,
/// and several bullets on one enemy each deal damage.
pub fn run(world: &mut World, index: &impl SpatialIndex, scratch: &mut QueryScratch, damage: f64) {
    let widest_bullet = world
        .query::<(&Bullet, &BoundingBox)>()
        .iter()
        .map(|(_entity, (_bullet, size))| size.width)
        .fold(0.0, f64::max);

    let enemies: Vec<(Entity, Position, f64)> = world
        .query::<(&Enemy, &Position, &BoundingBox)>()
        .iter()
        .map(|(entity, (_enemy, pos, size))| (entity, *pos, size.width / 2.0))
        .collect();

    for (enemy, pos, half_width) in enemies {
        let hits = scratch.buffer(enemy, Population::Bullets);
        index.find_nearby_into(&pos, half_width + widest_bullet / 2.0, Population::Bullets, hits);

        let mut struck = 0u32;
        for hit in hits.iter() {
            let bullet_half = world
                .get::<&BoundingBox>(hit.entity)
                .map(|size| size.width / 2.0)
                .unwrap_or(0.0);
            if pos.distance_to(&hit.position) > half_width + bullet_half {
                continue;
            }
            // Bullets are removed immediately so a later enemy cannot reuse them.
            if world.despawn(hit.entity).is_ok() {
                struck += 1;
            }
        }

        if struck > 0 {
            if let Ok(mut health) = world.get::<&mut Health>(enemy) {
                health.value -= damage * struck as f64;
            }
        }
    }
}
