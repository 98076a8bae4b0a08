//! Simulation engine. Owns the world and drives every system pass.
//!
//! `SimulationEngine` owns the hecs ECS world, processes control commands,
//! runs all systems in a fixed order, and produces `SimSnapshot`s.
//! Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rampart_core::commands::SimCommand;
use rampart_core::constants::{TICK_RATE, TILE_CENTER_EPSILON, TURRET_RANGE};
use rampart_core::enums::{Population, SimPhase};
use rampart_core::events::SimEvent;
use rampart_core::state::SimSnapshot;
use rampart_core::tuning::Tuning;
use rampart_core::types::SimTime;
use rampart_level::{GameContext, Level};

use crate::spatial::{QueryScratch, SpatialGrid};
use crate::stats::SimStats;
use crate::systems;
use crate::systems::spawner::SpawnTimer;
use crate::world_setup;

/// Upper bound accepted by `SimCommand::SetTimeScale`.
const MAX_TIME_SCALE: f64 = 4.0;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Ticks per simulated second at time scale 1.0.
    pub tick_rate: u32,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    pub tuning: Tuning,
    /// Place turrets on the level's buildable tiles at startup.
    pub populate_turrets: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: TICK_RATE,
            time_scale: 1.0,
            tuning: Tuning::default(),
            populate_turrets: true,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    level: Level,
    context: GameContext,
    time: SimTime,
    phase: SimPhase,
    tick_rate: u32,
    time_scale: f64,
    /// Longest dt a single system pass may consume.
    max_pass_dt: f64,
    rng: ChaCha8Rng,
    tuning: Tuning,
    spatial: SpatialGrid,
    scratch: QueryScratch,
    spawn_timer: SpawnTimer,
    command_queue: VecDeque<SimCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<SimEvent>,
    stats: SimStats,
}

impl SimulationEngine {
    /// Create a new simulation engine for `level` with the given config.
    pub fn new(config: SimConfig, level: Level) -> Self {
        let context = level.game_context();
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let turrets = if config.populate_turrets {
            world_setup::populate_level(&mut world, &mut rng, &level, &config.tuning)
        } else {
            0
        };
        let tick_rate = config.tick_rate.max(1);
        let max_pass_dt = max_pass_dt(tick_rate, &level, config.tuning.enemy_speed);
        log::info!(
            "simulation ready: seed={}, {}x{} tiles, {} turrets",
            config.seed,
            level.grid().width(),
            level.grid().height(),
            turrets
        );

        Self {
            world,
            spatial: SpatialGrid::new(&context, config.tuning.turret_range.max(TURRET_RANGE)),
            level,
            context,
            time: SimTime::default(),
            phase: SimPhase::default(),
            tick_rate,
            time_scale: config.time_scale.clamp(0.0, MAX_TIME_SCALE),
            max_pass_dt,
            rng,
            tuning: config.tuning,
            scratch: QueryScratch::default(),
            spawn_timer: SpawnTimer::default(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            stats: SimStats::default(),
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance by one nominal tick (`time_scale / tick_rate` seconds) and
    /// return the resulting snapshot.
    /// Commands are applied first so a new time scale takes effect at once.
    pub fn tick(&mut self) -> SimSnapshot {
        self.process_commands();
        let dt = self.time_scale / self.tick_rate as f64;
        self.step(dt)
    }

    /// Advance by `dt` simulated seconds and return the resulting snapshot.
    /// Paused engines process commands but advance no time.
    ///
    /// `dt` is split into equal passes no longer than `max_pass_dt`, so an
    /// enemy can never step over the steering window of a tile center.
    pub fn step(&mut self, dt: f64) -> SimSnapshot {
        self.process_commands();

        if self.phase == SimPhase::Running && dt > 0.0 {
            let passes = pass_count(dt, self.max_pass_dt);
            let pass_dt = dt / passes as f64;
            for _ in 0..passes {
                self.run_systems(pass_dt);
            }
            self.time.advance(dt);
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, self.phase, events, &self.stats)
    }

    /// Get the current run state.
    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn context(&self) -> &GameContext {
        &self.context
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for arranging test scenarios.
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Longest dt a single system pass may consume.
    #[cfg(test)]
    pub fn max_pass_dt(&self) -> f64 {
        self.max_pass_dt
    }

    /// Number of per-owner spatial result buffers currently held.
    #[cfg(test)]
    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single control command.
    fn handle_command(&mut self, command: SimCommand) {
        match command {
            SimCommand::Pause => {
                if self.phase == SimPhase::Running {
                    log::info!("simulation paused at t={:.2}s", self.time.elapsed_secs);
                    self.phase = SimPhase::Paused;
                }
            }
            SimCommand::Resume => {
                if self.phase == SimPhase::Paused {
                    log::info!("simulation resumed");
                    self.phase = SimPhase::Running;
                }
            }
            SimCommand::SetTimeScale { scale } => {
                self.time_scale = if scale.is_finite() {
                    scale.clamp(0.0, MAX_TIME_SCALE)
                } else {
                    1.0
                };
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        // 1. Spatial index rebuild, drop buffers of dead owners
        self.spatial.rebuild(&self.world);
        self.scratch.prune(&self.world);
        // 2. Enemy spawning
        systems::spawner::run(
            &mut self.world,
            &self.level,
            &mut self.spawn_timer,
            self.tuning.enemy_spawn_interval,
            dt,
            &mut self.events,
            &mut self.stats,
        );
        // 3. Path following
        systems::path_mover::run(
            &mut self.world,
            self.level.grid(),
            self.level.projection(),
            self.tuning.enemy_speed,
            dt,
            &mut self.despawn_buffer,
            &mut self.events,
            &mut self.stats,
        );
        // 4. Slot transforms
        systems::transform::run(&mut self.world);
        // 5. Target acquisition and aim
        systems::targeting::clear(&self.world, self.tuning.turret_range);
        systems::targeting::find(&self.world, &self.spatial, &mut self.scratch, self.tuning.turret_range);
        systems::targeting::aim(&self.world, &self.tuning, dt);
        // 6. Weapon cooldowns and beam expiry
        systems::fire_control::countdown(&self.world, dt);
        // 7. Beam damage and ion trail
        systems::beam::run(&mut self.world, &self.tuning, &mut self.rng, dt);
        // 8. Discharge
        systems::fire_control::fire(&mut self.world, &self.tuning, &mut self.events, &mut self.stats);
        // 9. Particle decay and expiry
        systems::particles::run(&mut self.world, &self.tuning.particles, dt, &mut self.despawn_buffer);
        // 10. Movement integration
        systems::movement::run(&mut self.world, dt);
        // 11. Hit test against this tick's bullet positions
        self.spatial.rebuild_population(&self.world, Population::Bullets);
        systems::collision::run(
            &mut self.world,
            &self.spatial,
            &mut self.scratch,
            self.tuning.bullet_damage,
        );
        // 12. Death cascade
        systems::death::run(
            &mut self.world,
            &mut self.rng,
            &mut self.despawn_buffer,
            &mut self.events,
            &mut self.stats,
        );
        // 13. Damage tint
        systems::color::run(&mut self.world);
    }
}

/// One nominal tick, shortened further if an enemy would otherwise move more
/// than the steering window (`TILE_CENTER_EPSILON` of a tile) in one pass.
fn max_pass_dt(tick_rate: u32, level: &Level, enemy_speed: f64) -> f64 {
    let nominal = 1.0 / tick_rate as f64;
    let window = TILE_CENTER_EPSILON * level.projection().pitch();
    if enemy_speed > 0.0 {
        nominal.min(window / enemy_speed)
    } else {
        nominal
    }
}

fn pass_count(dt: f64, max_pass_dt: f64) -> u32 {
    // Exact multiples must not round up to an extra pass.
    ((dt / max_pass_dt) - 1e-9).ceil().max(1.0) as u32
}
