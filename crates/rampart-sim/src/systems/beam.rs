//! Beam control: keeps open railgun beams on target and applies their damage.

use hecs::World;
use rand_chacha::ChaCha8Rng;

use rampart_core::components::{Beam, Health, LocalTransform};
use rampart_core::constants::{BEAM_THICKNESS, ION_JITTER, ION_MIN_DISTANCE, TRAVEL_HEIGHT};
use rampart_core::enums::ParticleKind;
use rampart_core::tuning::Tuning;
use rampart_core::types::{BoundingBox, Position, Velocity};

use crate::geometry::randf;
use crate::relations::{Target, TurretSlots};
use crate::world_setup::particle_prefab;

/// For every locked turret with an enabled beam: stretch the beam to the
/// target, drain its health and maybe shed an ion particle along the beam.
pub fn run(world: &mut World, tuning: &Tuning, rng: &mut ChaCha8Rng, dt: f64) {
    let mut ions = Vec::new();

    for (_entity, (target, pos, slots)) in world.query::<(&Target, &Position, &TurretSlots)>().iter() {
        let Some(beam) = slots.beam else {
            continue;
        };
        if !target.lock || !beam_enabled(world, beam) {
            continue;
        }
        let Some(enemy) = target.enemy else {
            continue;
        };
        let Ok(enemy_pos) = world.get::<&Position>(enemy).map(|p| *p) else {
            continue;
        };

        let distance = pos.distance_to(&enemy_pos);
        if let Ok(mut local) = world.get::<&mut LocalTransform>(beam) {
            local.translation = Position::new(distance / 2.0, 0.0, 0.0);
        }
        if let Ok(mut size) = world.get::<&mut BoundingBox>(beam) {
            *size = BoundingBox::new(BEAM_THICKNESS, BEAM_THICKNESS, distance);
        }
        if let Ok(mut health) = world.get::<&mut Health>(enemy) {
            health.value -= tuning.beam_damage * dt;
        }

        if randf(rng, 1.0) < tuning.ion_spawn_chance {
            let v = (pos.as_dvec3() - enemy_pos.as_dvec3()).normalize_or_zero();
            let along = randf(rng, distance - ION_MIN_DISTANCE) + ION_MIN_DISTANCE;
            let position = Position::new(pos.x - along * v.x, TRAVEL_HEIGHT, pos.z - along * v.z);
            let velocity = Velocity::new(
                randf(rng, ION_JITTER),
                randf(rng, ION_JITTER),
                randf(rng, ION_JITTER),
            );
            ions.push((position, velocity));
        }
    }

    for (position, velocity) in ions {
        let mut ion = particle_prefab(ParticleKind::Ion);
        ion.add(position).add(velocity);
        world.spawn(ion.build());
    }
}

fn beam_enabled(world: &World, beam: hecs::Entity) -> bool {
    world.get::<&Beam>(beam).map(|b| b.enabled).unwrap_or(false)
}
