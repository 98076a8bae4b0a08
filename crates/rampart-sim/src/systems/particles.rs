//! Particle engine: exponential decay and lifespan expiry.
//!
//! Size, color and velocity are optional; whichever are present decay by
//! `rate^dt` using the shared template for the particle's kind. Lifespan
//! always advances and expired instances are despawned at the end of the
//! pass.

use hecs::{Entity, World};

use rampart_core::components::{Particle, ParticleLifespan};
use rampart_core::tuning::ParticleTemplates;
use rampart_core::types::{BoundingBox, Color, Velocity};

/// Decay and age every particle.
pub fn run(world: &mut World, templates: &ParticleTemplates, dt: f64, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, (particle, lifespan, size, color, velocity)) in world.query_mut::<(
        &Particle,
        &mut ParticleLifespan,
        Option<&mut BoundingBox>,
        Option<&mut Color>,
        Option<&mut Velocity>,
    )>() {
        let template = templates.get(particle.kind);

        if let Some(size) = size {
            let k = template.size_decay.powf(dt);
            size.width *= k;
            size.height *= k;
            size.depth *= k;
        }
        if let Some(color) = color {
            let k = template.color_decay.powf(dt);
            color.r *= k;
            color.g *= k;
            color.b *= k;
        }
        if let Some(velocity) = velocity {
            let k = template.velocity_decay.powf(dt);
            velocity.x *= k;
            velocity.y *= k;
            velocity.z *= k;
        }

        lifespan.t += dt;
        if lifespan.t > template.lifespan {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
