//! Simulation constants and tuning defaults.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Unit steps for each `Direction` index, as (dx, dz) in tile space.
/// Path-following cycles through this table clockwise when it has to turn.
pub const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

// --- Level geometry ---

pub const TILE_SIZE: f64 = 3.0;
pub const TILE_HEIGHT: f64 = 0.5;
pub const TILE_SPACING: f64 = 0.0;
pub const TILE_COUNT_X: usize = 10;
pub const TILE_COUNT_Z: usize = 10;

/// Fractional tile offset below which an entity counts as centered on a tile.
pub const TILE_CENTER_EPSILON: f64 = 0.1;

/// Height at which enemies and projectiles travel.
pub const TRAVEL_HEIGHT: f64 = -1.2;

/// Extra margin added to the level extent when sizing the spatial index.
pub const WORLD_MARGIN: f64 = 2.0;

// --- Enemies ---

pub const ENEMY_SIZE: f64 = 0.7;
/// World units per second.
pub const ENEMY_SPEED: f64 = 5.0;
/// Seconds between enemy spawns.
pub const ENEMY_SPAWN_INTERVAL: f64 = 0.25;

// --- Turrets ---

/// Maximum head slew rate (radians per second).
pub const TURRET_ROTATE_SPEED: f64 = 4.0;
/// Seconds between cannon shots.
pub const TURRET_FIRE_INTERVAL: f64 = 0.1;
/// Weapon range in world units.
pub const TURRET_RANGE: f64 = 5.0;
/// Lateral offset of each cannon barrel from the head axis.
pub const TURRET_CANNON_OFFSET: f64 = 0.2;
pub const TURRET_CANNON_LENGTH: f64 = 0.6;
/// Lead prediction multiplier applied to `delta × distance` for ballistic aim.
pub const LEAD_PREDICTION_FACTOR: f64 = 5.0;
/// Local height of a turret head above its base.
pub const TURRET_HEAD_HEIGHT: f64 = -0.8;

// --- Projectiles ---

pub const BULLET_SIZE: f64 = 0.1;
pub const BULLET_SPEED: f64 = 24.0;
pub const BULLET_LIFESPAN: f64 = 0.5;
pub const BULLET_DAMAGE: f64 = 0.007;
/// Bullets leave the muzzle this many barrel lengths ahead of the turret.
pub const BULLET_MUZZLE_LENGTHS: f64 = 1.8;

// --- Railgun ---

pub const BEAM_FIRE_INTERVAL: f64 = 0.1;
/// Health per second removed while the beam is on target.
pub const BEAM_DAMAGE: f64 = 0.5;
pub const BEAM_SIZE: f64 = 0.2;
/// Cross-section of the stretched beam while firing.
pub const BEAM_THICKNESS: f64 = 0.06;
/// Seconds a single beam shot lasts.
pub const BEAM_DURATION: f64 = 1.0;
/// Distance ahead of the turret at which the firing bolt appears.
pub const BOLT_MUZZLE_DISTANCE: f64 = 1.2;
/// Per-tick probability of spawning an ion along an active beam.
pub const ION_SPAWN_CHANCE: f64 = 0.7;
/// Ions never spawn closer to the turret than this.
pub const ION_MIN_DISTANCE: f64 = 0.7;
/// Maximum magnitude of each random ion velocity component.
pub const ION_JITTER: f64 = 0.05;

// --- Particles ---

pub const ION_SIZE: f64 = 0.07;
pub const ION_LIFESPAN: f64 = 1.5;
pub const ION_DECAY: f64 = 0.1;

pub const FIREBALL_SIZE: f64 = 0.3;
pub const FIREBALL_SIZE_DECAY: f64 = 0.0001;
pub const FIREBALL_LIFESPAN: f64 = 0.2;

pub const BOLT_SIZE: f64 = 0.6;
pub const BOLT_SIZE_DECAY: f64 = 0.01;
pub const BOLT_LIFESPAN: f64 = 5.3;

pub const SMOKE_SIZE: f64 = 1.5;
pub const SMOKE_RADIUS: f64 = 1.2;
pub const SMOKE_SIZE_DECAY: f64 = 0.4;
pub const SMOKE_COLOR_DECAY: f64 = 0.01;
pub const SMOKE_LIFESPAN: f64 = 4.0;
/// Smoke drifts at this vertical speed.
pub const SMOKE_RISE_SPEED: f64 = 0.3;

pub const SPARK_SIZE: f64 = 0.20;
pub const SPARK_LIFESPAN: f64 = 0.5;
pub const SPARK_SIZE_DECAY: f64 = 0.05;
pub const SPARK_VELOCITY_DECAY: f64 = 0.05;
pub const SPARK_INITIAL_VELOCITY: f64 = 6.0;
/// Speed added to every spark on top of the random component.
pub const SPARK_MIN_VELOCITY: f64 = 2.0;

// --- Explosions ---

pub const EXPLOSION_SMOKE_COUNT: usize = 25;
pub const EXPLOSION_SPARK_COUNT: usize = 15;

// --- Level population ---

/// Chance that a buildable tile is left as scenery.
pub const SCENERY_CHANCE: f64 = 0.1;
/// Chance that a turret tile gets a cannon rather than a railgun.
pub const CANNON_CHANCE: f64 = 0.7;
