//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are plain functions that take `&mut World` (or `&World` when they
//! only touch existing components). They do not own state; all state lives
//! in components or is passed in by the engine.

pub mod beam;
pub mod collision;
pub mod color;
pub mod death;
pub mod fire_control;
pub mod movement;
pub mod particles;
pub mod path_mover;
pub mod snapshot;
pub mod spawner;
pub mod targeting;
pub mod transform;
