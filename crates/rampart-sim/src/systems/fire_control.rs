//! Fire control: weapon timing and discharge for both turret archetypes.
//!
//! Cannons fire one bullet per interval from alternating barrels while
//! locked. Railguns hold a beam open for a fixed duration; the beam closes
//! early if lock is lost.

use hecs::World;

use rampart_core::components::{Beam, Turret};
use rampart_core::constants::*;
use rampart_core::enums::{ParticleKind, WeaponKind};
use rampart_core::events::SimEvent;
use rampart_core::tuning::Tuning;
use rampart_core::types::{Position, Rotation, Velocity};

use crate::relations::{Target, TurretSlots};
use crate::stats::SimStats;
use crate::world_setup::particle_prefab;

/// A discharge decided during the turret pass and spawned after it.
#[derive(Debug, Clone, Copy)]
enum Shot {
    Cannon {
        position: Position,
        velocity: Velocity,
        angle: f64,
    },
    Railgun {
        position: Position,
        angle: f64,
    },
}

/// Enable or disable a turret's beam visual, if it has one.
pub fn set_beam(world: &World, slots: &TurretSlots, enabled: bool) {
    if let Some(beam) = slots.beam {
        if let Ok(mut b) = world.get::<&mut Beam>(beam) {
            b.enabled = enabled;
        }
    }
}

/// Advance cooldowns and close beams whose time ran out or whose lock
/// dropped.
pub fn countdown(world: &World, dt: f64) {
    for (_entity, (turret, target, slots)) in world.query::<(&mut Turret, &Target, &TurretSlots)>().iter() {
        turret.t_since_fire += dt;
        if turret.beam_countdown > 0.0 {
            turret.beam_countdown -= dt;
            if turret.beam_countdown <= 0.0 || !target.lock {
                set_beam(world, slots, false);
                turret.t_since_fire = 0.0;
                turret.beam_countdown = 0.0;
            }
        }
    }
}

/// Fire every turret whose cooldown has elapsed and whose target is locked.
pub fn fire(world: &mut World, tuning: &Tuning, events: &mut Vec<SimEvent>, stats: &mut SimStats) {
    let mut shots = Vec::new();

    for (_entity, (turret, target, pos, slots)) in
        world.query::<(&mut Turret, &Target, &Position, &TurretSlots)>().iter()
    {
        if turret.t_since_fire < turret.fire_interval {
            continue;
        }
        if target.enemy.is_none() || !target.lock {
            continue;
        }

        // Unit vector from the aim point back to the turret.
        let v = (pos.as_dvec3() - target.aim_position.as_dvec3()).normalize_or_zero();
        let angle = target.angle;
        let mut muzzle = *pos;

        match turret.weapon {
            WeaponKind::Cannon => {
                let reach = BULLET_MUZZLE_LENGTHS * TURRET_CANNON_LENGTH;
                muzzle.x += reach * -v.x + angle.sin() * TURRET_CANNON_OFFSET * turret.barrel_sign;
                muzzle.y = TRAVEL_HEIGHT;
                muzzle.z += reach * -v.z + angle.cos() * TURRET_CANNON_OFFSET * turret.barrel_sign;
                turret.barrel_sign = -turret.barrel_sign;

                shots.push(Shot::Cannon {
                    position: muzzle,
                    velocity: Velocity::new(-v.x * tuning.bullet_speed, 0.0, -v.z * tuning.bullet_speed),
                    angle,
                });
            }
            WeaponKind::Railgun => {
                if turret.beam_countdown <= 0.0 {
                    set_beam(world, slots, true);
                    turret.beam_countdown = tuning.beam_duration;

                    muzzle.x += BOLT_MUZZLE_DISTANCE * -v.x;
                    muzzle.y = TRAVEL_HEIGHT;
                    muzzle.z += BOLT_MUZZLE_DISTANCE * -v.z;
                    shots.push(Shot::Railgun {
                        position: muzzle,
                        angle,
                    });
                }
            }
        }

        turret.t_since_fire = 0.0;
    }

    for shot in shots {
        match shot {
            Shot::Cannon {
                position,
                velocity,
                angle,
            } => {
                let mut bullet = particle_prefab(ParticleKind::Bullet);
                bullet.add(position).add(velocity);
                world.spawn(bullet.build());

                let mut flash = particle_prefab(ParticleKind::Fireball);
                flash.add(position).add(Rotation::yaw(angle));
                world.spawn(flash.build());

                record(WeaponKind::Cannon, position, events, stats);
            }
            Shot::Railgun { position, angle } => {
                let mut bolt = particle_prefab(ParticleKind::Bolt);
                bolt.add(position).add(Rotation::yaw(angle));
                world.spawn(bolt.build());

                record(WeaponKind::Railgun, position, events, stats);
            }
        }
    }
}

fn record(weapon: WeaponKind, position: Position, events: &mut Vec<SimEvent>, stats: &mut SimStats) {
    log::trace!("{weapon:?} fired from ({:.2}, {:.2})", position.x, position.z);
    stats.record_shot(weapon);
    events.push(SimEvent::WeaponFired { weapon, position });
}
