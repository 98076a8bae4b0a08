//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.
//! Components that refer to other entities live in `rampart-sim`.

use serde::{Deserialize, Serialize};

use crate::enums::{ParticleKind, WeaponKind};
use crate::types::{Position, Rotation};

/// Marks an entity as an enemy walking the path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy;

/// Marks an entity as a cannon projectile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bullet;

/// Index into `constants::DIRECTIONS`. Always in `0..4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    pub index: usize,
}

/// Remaining hit points. An enemy at or below zero is destroyed that tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub value: f64,
}

impl Default for Health {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

/// Weapon timing state for a turret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turret {
    pub weapon: WeaponKind,
    /// Minimum seconds between shots.
    pub fire_interval: f64,
    /// Seconds accumulated since the last shot.
    pub t_since_fire: f64,
    /// Seconds of beam remaining (railgun only).
    pub beam_countdown: f64,
    /// Barrel side for the next cannon shot, +1 or -1.
    pub barrel_sign: f64,
}

/// Shared, read-only tuning for one effect archetype.
/// Decay rates are per-second multiplicative factors; 1.0 means no decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleTemplate {
    pub size_decay: f64,
    pub color_decay: f64,
    pub velocity_decay: f64,
    /// Seconds before the instance is destroyed.
    pub lifespan: f64,
}

/// Per-instance reference to a shared particle template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
}

/// Per-instance age accumulator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParticleLifespan {
    pub t: f64,
}

/// Railgun beam visual. Disabled beams are not rendered and deal no damage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Beam {
    pub enabled: bool,
}

/// Transform of a slot entity relative to its parent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LocalTransform {
    pub translation: Position,
    pub rotation: Rotation,
}
