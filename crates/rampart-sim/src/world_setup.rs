//! Entity prefabs and level population.
//!
//! Prefabs are `EntityBuilder`s preloaded with default components. Callers
//! override per-instance values with `add`, which replaces a component of
//! the same type, then spawn the built bundle.

use std::f64::consts::{FRAC_PI_2, TAU};

use hecs::{Entity, EntityBuilder, World};
use rand_chacha::ChaCha8Rng;

use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::{ParticleKind, WeaponKind};
use rampart_core::tuning::Tuning;
use rampart_core::types::*;
use rampart_level::Level;

use crate::geometry::randf;
use crate::relations::{Parent, Target, TurretSlots};

/// Surface appearance shared by several prefabs.
#[derive(Debug, Clone, Copy)]
struct Material {
    color: Color,
    emissive: Option<Emissive>,
    specular: Option<Specular>,
}

impl Material {
    fn apply(&self, builder: &mut EntityBuilder) {
        builder.add(self.color);
        if let Some(emissive) = self.emissive {
            builder.add(emissive);
        }
        if let Some(specular) = self.specular {
            builder.add(specular);
        }
    }
}

const METAL: Material = Material {
    color: Color { r: 0.1, g: 0.1, b: 0.1 },
    emissive: None,
    specular: Some(Specular {
        specular_power: 1.5,
        shininess: 128.0,
    }),
};

const CANNON_HEAD: Material = Material {
    color: Color { r: 0.35, g: 0.4, b: 0.3 },
    emissive: None,
    specular: Some(Specular {
        specular_power: 0.5,
        shininess: 25.0,
    }),
};

const RAILGUN_LIGHT: Material = Material {
    color: Color { r: 0.1, g: 0.3, b: 1.0 },
    emissive: Some(Emissive { intensity: 3.0 }),
    specular: None,
};

const BEAM: Material = Material {
    color: Color { r: 0.1, g: 0.4, b: 1.0 },
    emissive: Some(Emissive { intensity: 9.0 }),
    specular: None,
};

/// Place a turret on every buildable tile, leaving some empty as scenery.
/// Returns the number of turrets spawned.
pub fn populate_level(world: &mut World, rng: &mut ChaCha8Rng, level: &Level, tuning: &Tuning) -> usize {
    let projection = level.projection();
    let mut count = 0;

    for tile in level.grid().buildable_tiles() {
        if randf(rng, 1.0) < SCENERY_CHANCE {
            continue;
        }
        let weapon = if randf(rng, 1.0) < CANNON_CHANCE {
            WeaponKind::Cannon
        } else {
            WeaponKind::Railgun
        };
        let (x, z) = projection.tile_to_world(tile);
        spawn_turret(world, weapon, Position::new(x, -TILE_HEIGHT / 2.0, z), tuning);
        count += 1;
    }
    count
}

/// Spawn an enemy at world (x, z), facing `DIRECTIONS[0]`, at full health.
pub fn spawn_enemy(world: &mut World, x: f64, z: f64) -> Entity {
    world.spawn((
        Enemy,
        Position::new(x, TRAVEL_HEIGHT, z),
        Direction::default(),
        Health::default(),
        BoundingBox::cube(ENEMY_SIZE),
        Color::new(0.1, 0.0, 0.18),
        Specular {
            specular_power: 4.0,
            shininess: 512.0,
        },
    ))
}

/// Spawn a turret with its base, head and weapon slots.
pub fn spawn_turret(world: &mut World, weapon: WeaponKind, position: Position, tuning: &Tuning) -> Entity {
    let fire_interval = match weapon {
        WeaponKind::Cannon => tuning.cannon_fire_interval,
        WeaponKind::Railgun => tuning.railgun_fire_interval,
    };

    let root = world.spawn((
        Turret {
            weapon,
            fire_interval,
            t_since_fire: 0.0,
            beam_countdown: 0.0,
            barrel_sign: 1.0,
        },
        Target::default(),
        position,
        Rotation::default(),
    ));

    // Base
    spawn_slot(world, root, Position::new(0.0, -0.1, 0.0), BoundingBox::new(0.6, 0.2, 0.6), METAL);
    spawn_slot(world, root, Position::new(0.0, -0.3, 0.0), BoundingBox::new(0.4, 0.6, 0.4), METAL);

    let head_offset = Position::new(0.0, TURRET_HEAD_HEIGHT, 0.0);
    let slots = match weapon {
        WeaponKind::Cannon => {
            let head = spawn_slot(world, root, head_offset, BoundingBox::new(0.8, 0.4, 0.8), CANNON_HEAD);
            let barrel = BoundingBox::new(0.8, 0.14, 0.14);
            for side in [-1.0, 1.0] {
                let offset = Position::new(TURRET_CANNON_LENGTH, 0.0, side * TURRET_CANNON_OFFSET);
                spawn_slot(world, head, offset, barrel, METAL);
            }
            TurretSlots { head, beam: None }
        }
        WeaponKind::Railgun => {
            let head = spawn_pivot(world, root, head_offset);
            let parts = [
                (Position::new(0.1, 0.0, -0.3), BoundingBox::new(0.9, 0.3, 0.16), METAL),
                (Position::new(0.1, 0.0, 0.3), BoundingBox::new(0.9, 0.3, 0.16), METAL),
                (Position::new(0.1, 0.0, -0.2), BoundingBox::new(0.8, 0.2, 0.1), RAILGUN_LIGHT),
                (Position::new(0.1, 0.0, 0.2), BoundingBox::new(0.8, 0.2, 0.1), RAILGUN_LIGHT),
                (Position::new(0.24, 0.0, 0.0), BoundingBox::new(1.6, 0.5, 0.3), METAL),
                (Position::new(0.8, -0.1, 0.0), BoundingBox::new(1.0, 0.16, 0.16), METAL),
            ];
            for (offset, size, material) in parts {
                spawn_slot(world, head, offset, size, material);
            }
            let beam = spawn_beam(world, head);
            TurretSlots {
                head,
                beam: Some(beam),
            }
        }
    };

    // Slots need the root id, so they are attached after it exists.
    let _ = world.insert_one(root, slots);
    root
}

/// Visible child box positioned relative to `parent`.
fn spawn_slot(world: &mut World, parent: Entity, offset: Position, size: BoundingBox, material: Material) -> Entity {
    let mut builder = slot_builder(parent, offset, 0.0);
    builder.add(size);
    material.apply(&mut builder);
    world.spawn(builder.build())
}

/// Invisible child used only to carry a transform.
fn spawn_pivot(world: &mut World, parent: Entity, offset: Position) -> Entity {
    world.spawn(slot_builder(parent, offset, 0.0).build())
}

/// Railgun beam, lying along the head's +x axis and disabled until fired.
fn spawn_beam(world: &mut World, head: Entity) -> Entity {
    let mut builder = slot_builder(head, Position::new(2.0, 0.0, 0.0), FRAC_PI_2);
    builder.add(BoundingBox::cube(BEAM_SIZE));
    builder.add(Beam { enabled: false });
    BEAM.apply(&mut builder);
    world.spawn(builder.build())
}

fn slot_builder(parent: Entity, offset: Position, yaw: f64) -> EntityBuilder {
    let mut builder = EntityBuilder::new();
    builder
        .add(Parent { entity: parent })
        .add(LocalTransform {
            translation: offset,
            rotation: Rotation::yaw(yaw),
        })
        .add(Position::default())
        .add(Rotation::default());
    builder
}

/// Default components for a particle of `kind`.
///
/// Every instance gets its own lifespan accumulator, box and color so decay
/// is per instance; the decay rates themselves stay in the shared template.
pub fn particle_prefab(kind: ParticleKind) -> EntityBuilder {
    let mut builder = EntityBuilder::new();
    builder
        .add(Particle { kind })
        .add(ParticleLifespan::default())
        .add(Position::default())
        .add(Rotation::default());

    let (size, material) = match kind {
        ParticleKind::Bullet => {
            builder.add(Bullet);
            (BULLET_SIZE, plain(Color::new(0.0, 0.0, 0.0)))
        }
        ParticleKind::Fireball => (FIREBALL_SIZE, glowing(Color::new(1.0, 0.5, 0.3), 5.0)),
        ParticleKind::Smoke => {
            builder.add(Velocity::new(0.0, SMOKE_RISE_SPEED, 0.0));
            (SMOKE_SIZE, glowing(Color::new(0.0, 0.0, 0.0), 12.0))
        }
        ParticleKind::Spark => (SPARK_SIZE, glowing(Color::new(1.0, 0.5, 0.5), 5.0)),
        ParticleKind::Ion => (ION_SIZE, BEAM),
        ParticleKind::Bolt => (BOLT_SIZE, BEAM),
    };
    builder.add(BoundingBox::cube(size));
    material.apply(&mut builder);
    builder
}

fn plain(color: Color) -> Material {
    Material {
        color,
        emissive: None,
        specular: None,
    }
}

fn glowing(color: Color, intensity: f64) -> Material {
    Material {
        color,
        emissive: Some(Emissive { intensity }),
        specular: None,
    }
}

/// Spawn the smoke and spark burst of a destroyed enemy.
pub fn spawn_explosion(world: &mut World, rng: &mut ChaCha8Rng, at: &Position) {
    for _ in 0..EXPLOSION_SMOKE_COUNT {
        let red = randf(rng, 0.5) + 0.7;
        let green = randf(rng, 0.5).min(red);
        let blue = randf(rng, 0.3).min(green);
        let size = SMOKE_SIZE * randf(rng, 1.0);
        let half = SMOKE_RADIUS / 2.0;
        let position = Position::new(
            at.x + randf(rng, SMOKE_RADIUS) - half,
            at.y + randf(rng, SMOKE_RADIUS) - half,
            at.z + randf(rng, SMOKE_RADIUS) - half,
        );

        let mut smoke = particle_prefab(ParticleKind::Smoke);
        smoke
            .add(position)
            .add(BoundingBox::cube(size))
            .add(Color::new(red, green, blue));
        world.spawn(smoke.build());
    }

    for _ in 0..EXPLOSION_SPARK_COUNT {
        let x_r = randf(rng, TAU);
        let y_r = randf(rng, TAU);
        let z_r = randf(rng, TAU);
        let speed = randf(rng, SPARK_INITIAL_VELOCITY) + SPARK_MIN_VELOCITY;

        let mut spark = particle_prefab(ParticleKind::Spark);
        spark
            .add(*at)
            .add(Velocity::new(x_r.cos() * speed, y_r.cos() * speed, z_r.cos() * speed));
        world.spawn(spark.build());
    }
}
