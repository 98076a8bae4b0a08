//! Simulation engine for RAMPART.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces SimSnapshots for renderers.

pub mod engine;
pub mod geometry;
pub mod relations;
pub mod spatial;
pub mod stats;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use rampart_core as core;
pub use rampart_level as level;

#[cfg(test)]
mod tests;
