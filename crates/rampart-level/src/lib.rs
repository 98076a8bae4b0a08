//! Level data for RAMPART.
//!
//! Walkable path grid, tile/world projection, level definition,
//! validation and loading.

pub use rampart_core as core;

pub mod grid;
pub mod level;
pub mod projection;

// Re-export key types for convenience.
pub use grid::{PathGrid, TilePos};
pub use level::{default_spec, load_level, parse_level, GameContext, Level, LevelError, LevelSpec};
pub use projection::TileProjection;
