//! Tests for the simulation engine, path following, fire control, particles
//! and the death cascade.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rampart_core::commands::SimCommand;
use rampart_core::components::*;
use rampart_core::constants::{DIRECTIONS, ION_JITTER, ION_MIN_DISTANCE, TRAVEL_HEIGHT};
use rampart_core::enums::*;
use rampart_core::events::SimEvent;
use rampart_core::tuning::Tuning;
use rampart_core::types::*;
use rampart_level::{GameContext, Level, PathGrid, TilePos, TileProjection};

use crate::engine::{SimConfig, SimulationEngine};
use crate::geometry::look_at;
use crate::relations::{Parent, Target, TurretSlots};
use crate::spatial::{QueryScratch, SpatialGrid};
use crate::stats::SimStats;
use crate::systems::path_mover::{self, Steer};
use crate::systems::{beam, collision, color, death, fire_control, particles, snapshot, spawner, targeting, transform};
use crate::world_setup::{self, particle_prefab};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn bare_config() -> SimConfig {
    SimConfig {
        populate_turrets: false,
        ..Default::default()
    }
}

fn test_context() -> GameContext {
    GameContext {
        center: Position::new(0.0, 0.0, 0.0),
        size: 40.0,
    }
}

/// A point just past the center of `tile`, inside the steering window.
fn near_center(projection: &TileProjection, tile: TilePos) -> Position {
    let (x, z) = projection.tile_to_world(tile);
    Position::new(x + 0.01, -1.2, z + 0.01)
}

const TURRET_AT: Position = Position {
    x: 0.0,
    y: -0.25,
    z: 0.0,
};

/// Spawn a turret at `TURRET_AT` already locked onto a fresh enemy at (x, z).
fn locked_turret(world: &mut World, weapon: WeaponKind, x: f64, z: f64) -> (Entity, Entity) {
    let turret = world_setup::spawn_turret(world, weapon, TURRET_AT, &Tuning::default());
    let enemy = world_setup::spawn_enemy(world, x, z);
    let enemy_pos = *world.get::<&Position>(enemy).unwrap();
    {
        let mut target = world.get::<&mut Target>(turret).unwrap();
        target.enemy = Some(enemy);
        target.prev_position = enemy_pos;
        target.aim_position = enemy_pos;
        target.angle = look_at(&TURRET_AT, &enemy_pos);
        target.distance = TURRET_AT.distance_to(&enemy_pos);
        target.lock = true;
    }
    (turret, enemy)
}

fn count_particles(world: &World, kind: ParticleKind) -> usize {
    world
        .query::<&Particle>()
        .iter()
        .filter(|(_, p)| p.kind == kind)
        .count()
}

fn slots_of(world: &World, turret: Entity) -> TurretSlots {
    *world.get::<&TurretSlots>(turret).unwrap()
}

fn beam_enabled(world: &World, turret: Entity) -> bool {
    let beam = slots_of(world, turret).beam.expect("railgun has a beam");
    world.get::<&Beam>(beam).unwrap().enabled
}

// ---- Path following ----

#[test]
fn test_walkable_neighbour_keeps_direction() {
    #[rustfmt::skip]
    let grid = PathGrid::from_rows(&[
        "...",
        "##.",
        "...",
    ]);
    let projection = TileProjection::new(3.0, 0.0, grid.width());
    let pos = near_center(&projection, TilePos::new(0, 1));
    let mut direction = Direction { index: 2 };

    let steer = path_mover::find_path(&pos, &mut direction, &grid, &projection);
    assert_eq!(steer, Steer::Continue);
    assert_eq!(direction.index, 2, "walkable neighbour ahead must not cause a turn");
}

#[test]
fn test_turns_at_corner_without_reversing() {
    #[rustfmt::skip]
    let grid = PathGrid::from_rows(&[
        "...",
        "##.",
        ".#.",
    ]);
    let projection = TileProjection::new(3.0, 0.0, grid.width());
    let pos = near_center(&projection, TilePos::new(1, 1));
    let mut direction = Direction { index: 2 };

    let steer = path_mover::find_path(&pos, &mut direction, &grid, &projection);
    assert_eq!(steer, Steer::Continue);
    assert_eq!(direction.index, 3, "should turn towards the walkable tile (1, 2)");
}

#[test]
fn test_no_decision_away_from_tile_center() {
    let grid = PathGrid::from_rows(&["#.."]);
    let projection = TileProjection::new(3.0, 0.0, grid.width());
    let (x, z) = projection.tile_to_world(TilePos::new(0, 0));
    let pos = Position::new(x + 1.5, -1.2, z + 0.01);
    let mut direction = Direction { index: 2 };

    assert_eq!(path_mover::find_path(&pos, &mut direction, &grid, &projection), Steer::Continue);
    assert_eq!(direction.index, 2);
}

#[test]
fn test_dead_end_removes_enemy_without_explosion() {
    #[rustfmt::skip]
    let grid = PathGrid::from_rows(&[
        "...",
        "##.",
        "...",
    ]);
    let projection = TileProjection::new(3.0, 0.0, grid.width());
    let pos = near_center(&projection, TilePos::new(1, 1));

    let mut world = World::new();
    let enemy = world_setup::spawn_enemy(&mut world, pos.x, pos.z);
    world.get::<&mut Direction>(enemy).unwrap().index = 2;

    let mut buffer = Vec::new();
    let mut events = Vec::new();
    let mut stats = SimStats::default();
    path_mover::run(&mut world, &grid, &projection, 5.0, 1.0 / 30.0, &mut buffer, &mut events, &mut stats);

    assert!(!world.contains(enemy), "enemy at a dead end should be removed");
    assert_eq!(world.query::<&Particle>().iter().count(), 0, "no explosion on escape");
    assert_eq!(stats.enemies_escaped, 1);
    assert!(matches!(events.as_slice(), [SimEvent::EnemyEscaped { .. }]));
}

#[test]
fn test_enemies_never_reverse_on_default_level() {
    let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
    let mut previous: HashMap<Entity, usize> = HashMap::new();

    for _ in 0..900 {
        engine.tick();
        let mut current = HashMap::new();
        for (entity, (_enemy, direction)) in engine.world().query::<(&Enemy, &Direction)>().iter() {
            assert!(direction.index < DIRECTIONS.len());
            if let Some(&before) = previous.get(&entity) {
                assert_ne!(direction.index, (before + 2) % 4, "enemy {entity:?} reversed direction");
            }
            current.insert(entity, direction.index);
        }
        previous = current;
    }
}

#[test]
fn test_enemies_walk_the_default_path_to_the_end() {
    let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
    let mut escaped_events = 0;

    for _ in 0..1200 {
        let snap = engine.tick();
        escaped_events += snap
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::EnemyEscaped { .. }))
            .count();
    }

    let stats = engine.stats();
    assert!(stats.enemies_escaped > 0, "no enemy reached the end of the path");
    assert_eq!(stats.enemies_escaped as usize, escaped_events);
    assert_eq!(stats.enemies_destroyed, 0, "nothing can destroy enemies without turrets");
}

#[test]
fn test_enemies_stay_on_path_at_high_time_scale() {
    for scale in [2.0, 4.0] {
        let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
        engine.queue_command(SimCommand::SetTimeScale { scale });

        for _ in 0..900 {
            engine.tick();
            let level = engine.level();
            for (_entity, (_enemy, pos)) in engine.world().query::<(&Enemy, &Position)>().iter() {
                let (tx, tz) = level.projection().world_to_tile(pos);
                let tile = TilePos::new(tx.round() as i32, tz.round() as i32);
                assert!(
                    level.grid().is_walkable(tile),
                    "enemy left the path at {tile:?} with time scale {scale}"
                );
            }
        }

        let stats = engine.stats();
        assert!(stats.enemies_escaped > 0, "no enemy finished the path at scale {scale}");
        // The default path takes about 25 s to walk, so nothing escapes in
        // the first 20 s and at most one enemy per interval afterwards.
        let interval = engine.tuning().enemy_spawn_interval;
        let max_escapes = ((engine.time().elapsed_secs - 20.0) / interval) as u32 + 1;
        assert!(
            stats.enemies_escaped <= max_escapes,
            "too many escapes at scale {scale}: {} (at most {max_escapes})",
            stats.enemies_escaped
        );
    }
}

#[test]
fn test_scaled_tick_splits_into_short_passes() {
    let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
    assert!(approx(engine.max_pass_dt(), 1.0 / 30.0));

    engine.queue_command(SimCommand::SetTimeScale { scale: 4.0 });
    let snap = engine.tick();
    assert!(approx(snap.time.elapsed_secs, 4.0 / 30.0));
    assert_eq!(snap.time.tick, 1, "one tick regardless of pass count");
}

// ---- Target acquisition & aim ----

#[test]
fn test_find_picks_nearest_enemy_in_range() {
    let mut world = World::new();
    let turret = world_setup::spawn_turret(&mut world, WeaponKind::Cannon, TURRET_AT, &Tuning::default());
    let far = world_setup::spawn_enemy(&mut world, 4.0, 0.0);
    let near = world_setup::spawn_enemy(&mut world, 0.0, 2.0);
    world_setup::spawn_enemy(&mut world, 6.0, 0.0);

    let mut grid = SpatialGrid::new(&test_context(), 5.0);
    grid.rebuild(&world);
    let mut scratch = QueryScratch::default();
    targeting::find(&world, &grid, &mut scratch, 5.0);

    let target = *world.get::<&Target>(turret).unwrap();
    assert_eq!(target.enemy, Some(near), "should pick the closest enemy, not {far:?}");
    assert!(!target.lock, "a fresh target is not locked");
    assert_eq!(target.prev_position, *world.get::<&Position>(near).unwrap());
    assert_eq!(scratch.len(), 1);
}

#[test]
fn test_find_ignores_enemies_out_of_range() {
    let mut world = World::new();
    let turret = world_setup::spawn_turret(&mut world, WeaponKind::Cannon, TURRET_AT, &Tuning::default());
    world_setup::spawn_enemy(&mut world, 6.0, 0.0);

    let mut grid = SpatialGrid::new(&test_context(), 5.0);
    grid.rebuild(&world);
    targeting::find(&world, &grid, &mut QueryScratch::default(), 5.0);

    assert!(world.get::<&Target>(turret).unwrap().enemy.is_none());
}

#[test]
fn test_clear_drops_dead_and_distant_targets() {
    let mut world = World::new();
    let (turret, enemy) = locked_turret(&mut world, WeaponKind::Cannon, 3.0, 0.0);

    world.get::<&mut Position>(enemy).unwrap().x = 10.0;
    targeting::clear(&world, 5.0);
    let target = *world.get::<&Target>(turret).unwrap();
    assert!(target.enemy.is_none() && !target.lock, "out-of-range target kept");

    let (turret, enemy) = locked_turret(&mut world, WeaponKind::Cannon, 3.0, 0.0);
    world.despawn(enemy).unwrap();
    targeting::clear(&world, 5.0);
    let target = *world.get::<&Target>(turret).unwrap();
    assert!(target.enemy.is_none() && !target.lock, "dead target kept");
}

#[test]
fn test_aim_slews_then_locks() {
    let mut world = World::new();
    let tuning = Tuning::default();
    let dt = 1.0 / 30.0;
    let (turret, _enemy) = locked_turret(&mut world, WeaponKind::Railgun, 0.0, -3.0);
    world.get::<&mut Target>(turret).unwrap().lock = false;
    let head = slots_of(&world, turret).head;

    let mut last_yaw = 0.0;
    let mut locked_after = None;
    for step in 1..=20 {
        targeting::aim(&world, &tuning, dt);
        let yaw = world.get::<&LocalTransform>(head).unwrap().rotation.y;
        assert!((yaw - last_yaw).abs() <= tuning.turret_rotate_speed * dt + 1e-12, "head slewed too fast");
        last_yaw = yaw;

        let target = *world.get::<&Target>(turret).unwrap();
        assert_eq!(target.lock, yaw == target.angle && target.distance < tuning.turret_range);
        if target.lock && locked_after.is_none() {
            locked_after = Some(step);
        }
    }

    assert!(approx(last_yaw, FRAC_PI_2));
    assert_eq!(locked_after, Some(12), "lock expected once the head reached pi/2");
}

#[test]
fn test_cannon_leads_but_railgun_does_not() {
    let tuning = Tuning::default();
    for weapon in [WeaponKind::Cannon, WeaponKind::Railgun] {
        let mut world = World::new();
        let (turret, enemy) = locked_turret(&mut world, weapon, 3.0, 0.0);
        world.get::<&mut Target>(turret).unwrap().prev_position.z = -0.1;

        targeting::aim(&world, &tuning, 1.0 / 30.0);

        let target = *world.get::<&Target>(turret).unwrap();
        let enemy_pos = *world.get::<&Position>(enemy).unwrap();
        let distance = TURRET_AT.distance_to(&enemy_pos);
        let expected_z = match weapon {
            WeaponKind::Cannon => 0.1 * distance * tuning.lead_prediction_factor,
            WeaponKind::Railgun => 0.0,
        };
        assert!(approx(target.aim_position.z, expected_z), "{weapon:?} aimed at z={}", target.aim_position.z);
        assert_eq!(target.prev_position, enemy_pos);
    }
}

#[test]
fn test_lock_invariant_holds_in_full_game() {
    let mut engine = SimulationEngine::new(SimConfig::default(), Level::default_level());
    let range = engine.tuning().turret_range;
    let mut seen_lock = false;

    for _ in 0..600 {
        engine.tick();
        let world = engine.world();
        for (_entity, (_turret, target, slots)) in world.query::<(&Turret, &Target, &TurretSlots)>().iter() {
            if !target.lock {
                continue;
            }
            seen_lock = true;
            let yaw = world.get::<&LocalTransform>(slots.head).unwrap().rotation.y;
            assert_eq!(yaw, target.angle, "locked turret is not facing its aim angle");
            assert!(target.distance < range, "locked turret target out of range");
        }
    }
    assert!(seen_lock, "no turret ever locked on");
}

// ---- Fire control ----

#[test]
fn test_cannon_fires_once_and_resets_cooldown() {
    let mut world = World::new();
    let tuning = Tuning::default();
    let (turret, _enemy) = locked_turret(&mut world, WeaponKind::Cannon, 3.0, 0.0);
    {
        let mut t = world.get::<&mut Turret>(turret).unwrap();
        t.fire_interval = 0.1;
        t.t_since_fire = 0.1001;
    }

    let mut events = Vec::new();
    let mut stats = SimStats::default();
    fire_control::fire(&mut world, &tuning, &mut events, &mut stats);

    assert_eq!(count_particles(&world, ParticleKind::Bullet), 1);
    assert_eq!(count_particles(&world, ParticleKind::Fireball), 1);
    let t = (*world.get::<&Turret>(turret).unwrap()).clone();
    assert_eq!(t.t_since_fire, 0.0);
    assert_eq!(t.barrel_sign, -1.0, "barrels should alternate");
    assert_eq!(stats.cannon_shots, 1);
    assert!(matches!(
        events.as_slice(),
        [SimEvent::WeaponFired { weapon: WeaponKind::Cannon, .. }]
    ));

    for (_entity, (_bullet, vel, pos)) in world.query::<(&Bullet, &Velocity, &Position)>().iter() {
        assert!(vel.x > 0.0, "bullet should fly towards the enemy");
        assert!(approx(vel.y, 0.0) && approx(vel.z, 0.0));
        assert!(approx(pos.y, -1.2));
    }

    // Cooldown just reset: nothing more this tick.
    fire_control::fire(&mut world, &tuning, &mut events, &mut stats);
    assert_eq!(count_particles(&world, ParticleKind::Bullet), 1);
}

#[test]
fn test_cannon_holds_fire_without_lock() {
    let mut world = World::new();
    let (turret, _enemy) = locked_turret(&mut world, WeaponKind::Cannon, 3.0, 0.0);
    world.get::<&mut Target>(turret).unwrap().lock = false;
    world.get::<&mut Turret>(turret).unwrap().t_since_fire = 1.0;

    fire_control::fire(&mut world, &Tuning::default(), &mut Vec::new(), &mut SimStats::default());
    assert_eq!(count_particles(&world, ParticleKind::Bullet), 0);
}

#[test]
fn test_beam_expires_while_locked() {
    let mut world = World::new();
    let tuning = Tuning::default();
    let (turret, _enemy) = locked_turret(&mut world, WeaponKind::Railgun, 3.0, 0.0);
    world.get::<&mut Turret>(turret).unwrap().t_since_fire = 0.2;

    let mut stats = SimStats::default();
    fire_control::fire(&mut world, &tuning, &mut Vec::new(), &mut stats);
    assert!(beam_enabled(&world, turret));
    assert_eq!(world.get::<&Turret>(turret).unwrap().beam_countdown, 1.0);
    assert_eq!(count_particles(&world, ParticleKind::Bolt), 1);
    assert_eq!(stats.railgun_shots, 1);

    let mut closed_at = None;
    for step in 1..=12 {
        fire_control::countdown(&world, 0.1);
        if closed_at.is_none() && !beam_enabled(&world, turret) {
            closed_at = Some(step);
            let t = world.get::<&Turret>(turret).unwrap();
            assert_eq!(t.t_since_fire, 0.0, "cooldown must reset when the beam closes");
            assert!(t.beam_countdown <= 0.0);
        }
    }
    assert!(closed_at.is_some(), "beam still open after 1.2 s");
    assert!(world.get::<&Target>(turret).unwrap().lock, "lock itself is untouched");
}

#[test]
fn test_beam_closes_on_lock_loss() {
    let mut world = World::new();
    let (turret, _enemy) = locked_turret(&mut world, WeaponKind::Railgun, 3.0, 0.0);
    world.get::<&mut Turret>(turret).unwrap().t_since_fire = 0.2;
    fire_control::fire(&mut world, &Tuning::default(), &mut Vec::new(), &mut SimStats::default());

    world.get::<&mut Target>(turret).unwrap().lock = false;
    fire_control::countdown(&world, 1.0 / 30.0);

    assert!(!beam_enabled(&world, turret));
    let t = world.get::<&Turret>(turret).unwrap();
    assert_eq!(t.t_since_fire, 0.0);
    assert_eq!(t.beam_countdown, 0.0);
}

#[test]
fn test_railgun_does_not_restart_open_beam() {
    let mut world = World::new();
    let tuning = Tuning::default();
    let (turret, _enemy) = locked_turret(&mut world, WeaponKind::Railgun, 3.0, 0.0);
    world.get::<&mut Turret>(turret).unwrap().t_since_fire = 0.2;
    fire_control::fire(&mut world, &tuning, &mut Vec::new(), &mut SimStats::default());

    world.get::<&mut Turret>(turret).unwrap().t_since_fire = 0.2;
    let mut stats = SimStats::default();
    fire_control::fire(&mut world, &tuning, &mut Vec::new(), &mut stats);

    assert_eq!(stats.railgun_shots, 0);
    assert_eq!(count_particles(&world, ParticleKind::Bolt), 1);
}

// ---- Beam and death cascade ----

#[test]
fn test_beam_kill_spawns_one_explosion() {
    let mut world = World::new();
    let tuning = Tuning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let (turret, enemy) = locked_turret(&mut world, WeaponKind::Railgun, 3.0, 0.0);
    fire_control::set_beam(&world, &slots_of(&world, turret), true);
    world.get::<&mut Health>(enemy).unwrap().value = 0.02;

    beam::run(&mut world, &tuning, &mut rng, 0.1);
    assert!(world.get::<&Health>(enemy).unwrap().value <= 0.0);

    let beam = slots_of(&world, turret).beam.unwrap();
    let size = *world.get::<&BoundingBox>(beam).unwrap();
    let distance = TURRET_AT.distance_to(&world.get::<&Position>(enemy).unwrap());
    assert!(approx(size.depth, distance), "beam should span turret to enemy");

    let mut buffer = Vec::new();
    let mut events = Vec::new();
    let mut stats = SimStats::default();
    death::run(&mut world, &mut rng, &mut buffer, &mut events, &mut stats);

    assert!(!world.contains(enemy));
    assert_eq!(count_particles(&world, ParticleKind::Smoke), 25);
    assert_eq!(count_particles(&world, ParticleKind::Spark), 15);
    assert_eq!(stats.enemies_destroyed, 1);

    // A second pass must not explode the same enemy again.
    death::run(&mut world, &mut rng, &mut buffer, &mut events, &mut stats);
    assert_eq!(count_particles(&world, ParticleKind::Smoke), 25);
    assert_eq!(events.len(), 1);
}

#[test]
fn test_locked_beam_sheds_one_ion_per_pass() {
    let mut world = World::new();
    let tuning = Tuning {
        ion_spawn_chance: 1.0,
        ..Default::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let (turret, enemy) = locked_turret(&mut world, WeaponKind::Railgun, 3.0, 0.0);
    fire_control::set_beam(&world, &slots_of(&world, turret), true);
    let enemy_pos = *world.get::<&Position>(enemy).unwrap();
    let distance = TURRET_AT.distance_to(&enemy_pos);

    for pass in 1..=5 {
        beam::run(&mut world, &tuning, &mut rng, 1.0 / 30.0);
        assert_eq!(count_particles(&world, ParticleKind::Ion), pass);
    }

    for (_entity, (particle, pos, vel)) in world.query::<(&Particle, &Position, &Velocity)>().iter() {
        if particle.kind != ParticleKind::Ion {
            continue;
        }
        assert!(approx(pos.y, TRAVEL_HEIGHT));
        assert!(approx(pos.z, 0.0), "ion should lie on the turret-to-enemy line");
        // Distance along the 3D beam direction, recovered from the planar offset.
        let along = pos.x * distance / enemy_pos.x;
        assert!(
            (ION_MIN_DISTANCE - 1e-9..distance + 1e-9).contains(&along),
            "ion {along} outside the beam"
        );
        for v in [vel.x, vel.y, vel.z] {
            assert!((0.0..ION_JITTER).contains(&v), "ion jitter {v} out of range");
        }
    }
}

#[test]
fn test_beam_without_ion_chance_sheds_nothing() {
    let mut world = World::new();
    let tuning = Tuning {
        ion_spawn_chance: 0.0,
        ..Default::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let (turret, _enemy) = locked_turret(&mut world, WeaponKind::Railgun, 3.0, 0.0);
    fire_control::set_beam(&world, &slots_of(&world, turret), true);

    for _ in 0..10 {
        beam::run(&mut world, &tuning, &mut rng, 1.0 / 30.0);
    }
    assert_eq!(count_particles(&world, ParticleKind::Ion), 0);
}

#[test]
fn test_explosion_palette_is_capped() {
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    world_setup::spawn_explosion(&mut world, &mut rng, &Position::new(0.0, -1.2, 0.0));

    for (_entity, (particle, color, size)) in world.query::<(&Particle, &Color, &BoundingBox)>().iter() {
        if particle.kind != ParticleKind::Smoke {
            continue;
        }
        assert!((0.7..1.2).contains(&color.r));
        assert!(color.g <= color.r && color.b <= color.g);
        assert!(size.width < 1.5);
    }
    for (_entity, (particle, vel)) in world.query::<(&Particle, &Velocity)>().iter() {
        if particle.kind == ParticleKind::Spark {
            assert!(vel.speed() < 8.0 * 3f64.sqrt());
        }
    }
}

#[test]
fn test_enemy_color_tracks_health() {
    let full = color::damage_color(1.0);
    assert_eq!(full, Color::new(0.0, 0.0, 0.0));
    let hurt = color::damage_color(0.3);
    assert!(approx(hurt.r, 0.35) && approx(hurt.g, 0.14) && approx(hurt.b, 0.1));

    let mut world = World::new();
    let enemy = world_setup::spawn_enemy(&mut world, 0.0, 0.0);
    world.get::<&mut Health>(enemy).unwrap().value = 0.3;
    color::run(&mut world);
    color::run(&mut world);
    assert_eq!(*world.get::<&Color>(enemy).unwrap(), hurt, "color must not accumulate");
}

// ---- Collision ----

#[test]
fn test_multiple_bullet_hits_each_deal_damage() {
    let mut world = World::new();
    let enemy = world_setup::spawn_enemy(&mut world, 0.0, 0.0);
    for dx in [0.0, 0.1, -0.1] {
        let mut bullet = particle_prefab(ParticleKind::Bullet);
        bullet.add(Position::new(dx, -1.2, 0.0));
        world.spawn(bullet.build());
    }
    // Outside the hit radius.
    let mut stray = particle_prefab(ParticleKind::Bullet);
    stray.add(Position::new(2.0, -1.2, 0.0));
    world.spawn(stray.build());

    let mut grid = SpatialGrid::new(&test_context(), 5.0);
    grid.rebuild(&world);
    collision::run(&mut world, &grid, &mut QueryScratch::default(), 0.007);

    let health = world.get::<&Health>(enemy).unwrap().value;
    assert!(approx(health, 1.0 - 3.0 * 0.007), "health was {health}");
    assert_eq!(count_particles(&world, ParticleKind::Bullet), 1);
}

#[test]
fn test_shared_bullet_counts_once() {
    let mut world = World::new();
    let a = world_setup::spawn_enemy(&mut world, 0.0, 0.0);
    let b = world_setup::spawn_enemy(&mut world, 0.6, 0.0);
    let mut bullet = particle_prefab(ParticleKind::Bullet);
    bullet.add(Position::new(0.3, -1.2, 0.0));
    world.spawn(bullet.build());

    let mut grid = SpatialGrid::new(&test_context(), 5.0);
    grid.rebuild(&world);
    collision::run(&mut world, &grid, &mut QueryScratch::default(), 0.007);

    let total = world.get::<&Health>(a).unwrap().value + world.get::<&Health>(b).unwrap().value;
    assert!(approx(total, 2.0 - 0.007));
}

#[test]
fn test_hit_radius_follows_bullet_box() {
    let mut world = World::new();
    let near = world_setup::spawn_enemy(&mut world, 0.0, 0.0);
    let far = world_setup::spawn_enemy(&mut world, 10.0, 0.0);

    // 0.38 is inside 0.35 + 0.05 but outside 0.35 + 0.01.
    let mut regular = particle_prefab(ParticleKind::Bullet);
    regular.add(Position::new(0.38, -1.2, 0.0));
    world.spawn(regular.build());
    let mut shrunk = particle_prefab(ParticleKind::Bullet);
    shrunk.add(Position::new(10.38, -1.2, 0.0)).add(BoundingBox::cube(0.02));
    world.spawn(shrunk.build());

    let mut grid = SpatialGrid::new(&test_context(), 5.0);
    grid.rebuild(&world);
    collision::run(&mut world, &grid, &mut QueryScratch::default(), 0.007);

    assert!(approx(world.get::<&Health>(near).unwrap().value, 1.0 - 0.007));
    assert_eq!(world.get::<&Health>(far).unwrap().value, 1.0, "small bullet should miss");
    assert_eq!(count_particles(&world, ParticleKind::Bullet), 1);
}

// ---- Particles ----

#[test]
fn test_expired_particle_destroyed_exactly_once() {
    let mut world = World::new();
    let templates = Tuning::default().particles;
    let mut fireball = particle_prefab(ParticleKind::Fireball);
    fireball.add(ParticleLifespan { t: 0.25 });
    let entity = world.spawn(fireball.build());

    let mut buffer = Vec::new();
    particles::run(&mut world, &templates, 1.0 / 30.0, &mut buffer);
    assert!(!world.contains(entity));
    particles::run(&mut world, &templates, 1.0 / 30.0, &mut buffer);
    assert_eq!(world.query::<&Particle>().iter().count(), 0);
}

#[test]
fn test_particle_without_optional_attributes_still_expires() {
    let mut world = World::new();
    let templates = Tuning::default().particles;
    let bare = world.spawn((Particle { kind: ParticleKind::Spark }, ParticleLifespan::default()));
    let moving = world.spawn((
        Particle { kind: ParticleKind::Spark },
        ParticleLifespan::default(),
        Velocity::new(1.0, 0.0, 0.0),
    ));

    let mut buffer = Vec::new();
    particles::run(&mut world, &templates, 0.2, &mut buffer);
    particles::run(&mut world, &templates, 0.2, &mut buffer);
    assert!(world.contains(bare));
    let vx = world.get::<&Velocity>(moving).unwrap().x;
    assert!(approx(vx, templates.spark.velocity_decay.powf(0.4)), "velocity was {vx}");

    particles::run(&mut world, &templates, 0.2, &mut buffer);
    assert!(!world.contains(bare) && !world.contains(moving));
}

#[test]
fn test_particle_decay_is_frame_rate_independent() {
    let templates = Tuning::default().particles;
    let mut coarse = World::new();
    let mut fine = World::new();
    let a = coarse.spawn(particle_prefab(ParticleKind::Smoke).build());
    let b = fine.spawn(particle_prefab(ParticleKind::Smoke).build());

    let mut buffer = Vec::new();
    particles::run(&mut coarse, &templates, 0.5, &mut buffer);
    for _ in 0..5 {
        particles::run(&mut fine, &templates, 0.1, &mut buffer);
    }

    let size_a = coarse.get::<&BoundingBox>(a).unwrap().width;
    let size_b = fine.get::<&BoundingBox>(b).unwrap().width;
    assert!((size_a - size_b).abs() < 1e-9);
    let expected = 1.5 * templates.smoke.size_decay.powf(0.5);
    assert!((size_a - expected).abs() < 1e-9);
}

// ---- Transforms and snapshot ----

#[test]
fn test_slot_transform_follows_head_yaw() {
    let mut world = World::new();
    let origin = Position::new(10.0, -0.25, 5.0);
    let turret = world_setup::spawn_turret(&mut world, WeaponKind::Cannon, origin, &Tuning::default());
    let head = slots_of(&world, turret).head;
    world.get::<&mut LocalTransform>(head).unwrap().rotation.y = FRAC_PI_2;

    transform::run(&mut world);

    let head_pos = *world.get::<&Position>(head).unwrap();
    assert!(approx(head_pos.x, 10.0) && approx(head_pos.y, -1.05) && approx(head_pos.z, 5.0));

    let barrel = world
        .query::<(&Parent, &LocalTransform, &Position)>()
        .iter()
        .find(|(_, (parent, local, _))| parent.entity == head && local.translation.z > 0.0)
        .map(|(_, (_, _, pos))| *pos)
        .expect("right barrel");
    assert!(approx(barrel.x, 10.2), "barrel x {}", barrel.x);
    assert!(approx(barrel.y, -1.05));
    assert!(approx(barrel.z, 4.4), "barrel z {}", barrel.z);
    assert!(approx(world.get::<&Rotation>(head).unwrap().y, FRAC_PI_2));
}

#[test]
fn test_snapshot_hides_disabled_beam() {
    let mut world = World::new();
    let turret = world_setup::spawn_turret(&mut world, WeaponKind::Railgun, TURRET_AT, &Tuning::default());

    let snap = snapshot::build_snapshot(&world, &SimTime::default(), SimPhase::Running, Vec::new(), &SimStats::default());
    assert_eq!(snap.renderables.len(), 8);
    assert_eq!(snap.turrets.len(), 1);
    assert!(!snap.turrets[0].beam_active);

    fire_control::set_beam(&world, &slots_of(&world, turret), true);
    let snap = snapshot::build_snapshot(&world, &SimTime::default(), SimPhase::Running, Vec::new(), &SimStats::default());
    assert_eq!(snap.renderables.len(), 9);
    assert!(snap.turrets[0].beam_active);
}

// ---- Engine ----

#[test]
fn test_spawner_fires_at_most_once_per_pass() {
    let level = Level::default_level();
    let mut world = World::new();
    let mut timer = spawner::SpawnTimer::default();
    let mut events = Vec::new();
    let mut stats = SimStats::default();

    spawner::run(&mut world, &level, &mut timer, 0.25, 1.0, &mut events, &mut stats);
    assert_eq!(stats.enemies_spawned, 1);
    assert_eq!(world.query::<&Enemy>().iter().count(), 1);
    assert!(matches!(events.as_slice(), [SimEvent::EnemySpawned { .. }]));
    assert!(approx(timer.elapsed, 0.75), "leftover time carries into later passes");
}

#[test]
fn test_spawner_follows_interval() {
    let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
    for _ in 0..20 {
        engine.step(0.1);
    }
    let spawned = engine.stats().enemies_spawned;
    assert!((7..=8).contains(&spawned), "spawned {spawned} enemies in 2 s");
}

#[test]
fn test_spawned_enemy_starts_at_spawn_point() {
    let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
    let snap = engine.step(0.25);
    let (x, z) = engine.level().spawn_point();
    let enemy = &snap.enemies[0];
    assert_eq!(enemy.direction, 0);
    assert!((enemy.position.z - z).abs() < 1e-9);
    assert!(enemy.position.x < x && enemy.position.x > x - 2.0, "moved one step along -x");
    assert!(approx(enemy.position.y, -1.2));
}

#[test]
fn test_pause_and_resume() {
    let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
    engine.queue_command(SimCommand::Pause);
    for _ in 0..30 {
        let snap = engine.tick();
        assert_eq!(snap.phase, SimPhase::Paused);
        assert_eq!(snap.time.tick, 0);
        assert!(snap.enemies.is_empty());
    }

    engine.queue_command(SimCommand::Resume);
    let snap = engine.tick();
    assert_eq!(snap.phase, SimPhase::Running);
    assert_eq!(snap.time.tick, 1);
}

#[test]
fn test_time_scale_is_clamped() {
    let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
    engine.queue_commands([SimCommand::SetTimeScale { scale: 10.0 }]);
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);

    engine.queue_command(SimCommand::SetTimeScale { scale: -1.0 });
    let snap = engine.tick();
    assert_eq!(engine.time_scale(), 0.0);
    assert_eq!(snap.time.tick, 1, "zero time scale should not advance");
}

#[test]
fn test_level_population_places_turrets_off_path() {
    let engine = SimulationEngine::new(SimConfig::default(), Level::default_level());
    let level = engine.level();
    let buildable = level.grid().buildable_tiles().count();

    let mut turrets = 0;
    for (_entity, (_turret, pos)) in engine.world().query::<(&Turret, &Position)>().iter() {
        turrets += 1;
        let (tile, _) = level.projection().locate(&Position::new(pos.x + 0.01, pos.y, pos.z + 0.01));
        assert!(!level.grid().is_walkable(tile), "turret placed on the path at {tile:?}");
        assert!(approx(pos.y, -0.25));
    }
    assert!(turrets > 0 && turrets <= buildable);
}

#[test]
fn test_scratch_buffers_released_with_owners() {
    let mut engine = SimulationEngine::new(bare_config(), Level::default_level());
    let turret = world_setup::spawn_turret(
        engine.world_mut(),
        WeaponKind::Cannon,
        Position::new(0.0, -0.25, 0.0),
        &Tuning::default(),
    );
    engine.tick();
    assert_eq!(engine.scratch_len(), 1, "idle turret should own one enemy buffer");

    engine.world_mut().despawn(turret).unwrap();
    engine.tick();
    assert_eq!(engine.scratch_len(), 0);
}

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = SimulationEngine::new(SimConfig { seed: 12345, ..Default::default() }, Level::default_level());
    let mut engine_b = SimulationEngine::new(SimConfig { seed: 12345, ..Default::default() }, Level::default_level());

    for _ in 0..300 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_full_game_destroys_enemies() {
    let mut engine = SimulationEngine::new(SimConfig::default(), Level::default_level());
    for _ in 0..3600 {
        engine.tick();
    }

    let stats = engine.stats();
    assert!(stats.cannon_shots + stats.railgun_shots > 0, "no turret ever fired");
    assert!(stats.enemies_destroyed > 0, "no enemy destroyed in two minutes");
}
