//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Turret weapon archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Rapid-fire ballistic cannon with alternating barrels and lead prediction.
    #[default]
    Cannon,
    /// Continuous-beam railgun; aims at the true position, damages over time.
    Railgun,
}

/// Transient effect archetypes driven by the particle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Cannon projectile. Also a hit-test population member.
    Bullet,
    /// Cannon muzzle flash.
    Fireball,
    /// Explosion smoke puff.
    Smoke,
    /// Explosion spark.
    Spark,
    /// Railgun beam ion trail.
    Ion,
    /// Railgun firing flash.
    Bolt,
}

/// Population tag partitioning the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Population {
    Enemies,
    Bullets,
}

/// Engine run state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    #[default]
    Running,
    Paused,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 6] = [
        ParticleKind::Bullet,
        ParticleKind::Fireball,
        ParticleKind::Smoke,
        ParticleKind::Spark,
        ParticleKind::Ion,
        ParticleKind::Bolt,
    ];
}
