//! Components that refer to other entities.
//!
//! Entity references are plain identifiers. They never keep the referenced
//! entity alive and must be checked with `World::get`/`World::contains`
//! before every use.

use hecs::Entity;

use rampart_core::types::Position;

/// A turret's tracking state.
///
/// `lock` holds only while the head yaw equals `angle` and `distance` is
/// inside weapon range. It is recomputed every aim pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target {
    /// Tracked enemy, if any. May be stale until the next clear pass.
    pub enemy: Option<Entity>,
    /// Enemy position observed on the previous aim pass.
    pub prev_position: Position,
    /// Point the head is slewing towards (lead-corrected for cannons).
    pub aim_position: Position,
    /// Yaw towards `aim_position`.
    pub angle: f64,
    /// Last measured turret-to-enemy distance.
    pub distance: f64,
    pub lock: bool,
}

/// Slot entity attached to a parent; its world transform is derived from
/// the parent's each tick.
#[derive(Debug, Clone, Copy)]
pub struct Parent {
    pub entity: Entity,
}

/// Named sub-entities of a turret.
#[derive(Debug, Clone, Copy)]
pub struct TurretSlots {
    /// Rotating head. Its local yaw is the turret's aim.
    pub head: Entity,
    /// Beam visual, railguns only.
    pub beam: Option<Entity>,
}
