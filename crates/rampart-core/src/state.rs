//! Simulation snapshot: the read-only state handed to renderers each tick.

use serde::{Deserialize, Serialize};

use crate::enums::{SimPhase, WeaponKind};
use crate::events::SimEvent;
use crate::types::{BoundingBox, Color, Emissive, Position, Rotation, SimTime, Specular};

/// Complete visible state after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub phase: SimPhase,
    pub renderables: Vec<RenderableView>,
    pub enemies: Vec<EnemyView>,
    pub turrets: Vec<TurretView>,
    pub particle_count: u32,
    pub events: Vec<SimEvent>,
    pub stats: StatsView,
}

/// Everything a renderer needs to draw one box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderableView {
    pub position: Position,
    pub rotation: Rotation,
    pub size: BoundingBox,
    pub color: Color,
    pub emissive: Option<Emissive>,
    pub specular: Option<Specular>,
}

/// A live enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub position: Position,
    pub health: f64,
    pub direction: usize,
}

/// A turret and its fire-control status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurretView {
    pub position: Position,
    pub weapon: WeaponKind,
    /// Current head yaw (radians).
    pub head_angle: f64,
    pub has_target: bool,
    pub lock: bool,
    pub beam_active: bool,
}

/// Cumulative counters since the engine was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsView {
    pub enemies_spawned: u32,
    pub enemies_destroyed: u32,
    pub enemies_escaped: u32,
    pub cannon_shots: u32,
    pub railgun_shots: u32,
}
