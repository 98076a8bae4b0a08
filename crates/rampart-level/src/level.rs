//! Level definition: path grid plus spawn point, with JSON loading.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rampart_core::constants::{TILE_COUNT_X, TILE_COUNT_Z, TILE_SIZE, TILE_SPACING, WORLD_MARGIN};
use rampart_core::types::Position;

use crate::grid::{PathGrid, TilePos};
use crate::projection::TileProjection;

/// Configuration defects detected while building a level.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("level file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("path tile ({x}, {y}) lies outside the {width}x{height} grid")]
    PathOutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
    #[error("spawn tile ({x}, {y}) is not a walkable path tile")]
    SpawnNotOnPath { x: i32, y: i32 },
}

/// On-disk level description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub width: usize,
    pub height: usize,
    /// Walkable tiles as `[x, y]` pairs.
    pub path: Vec<[i32; 2]>,
    /// Tile where enemies enter.
    pub spawn: [i32; 2],
}

/// World bounds shared by every system that needs them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameContext {
    pub center: Position,
    /// Edge length of the square region covering the level.
    pub size: f64,
}

/// A validated, immutable level.
#[derive(Debug, Clone)]
pub struct Level {
    grid: PathGrid,
    spawn_tile: TilePos,
    projection: TileProjection,
}

impl Level {
    /// Build a level from a grid and spawn tile.
    /// Fails if the grid is empty or the spawn tile is not on the path.
    pub fn new(grid: PathGrid, spawn_tile: TilePos) -> Result<Self, LevelError> {
        if grid.width() == 0 || grid.height() == 0 {
            return Err(LevelError::EmptyGrid {
                width: grid.width(),
                height: grid.height(),
            });
        }
        if !grid.is_walkable(spawn_tile) {
            return Err(LevelError::SpawnNotOnPath {
                x: spawn_tile.x,
                y: spawn_tile.y,
            });
        }

        Ok(Self::assemble(grid, spawn_tile))
    }

    fn assemble(grid: PathGrid, spawn_tile: TilePos) -> Self {
        let projection = TileProjection::new(TILE_SIZE, TILE_SPACING, grid.width());
        Self {
            grid,
            spawn_tile,
            projection,
        }
    }

    /// Build a level from its file description.
    pub fn from_spec(spec: &LevelSpec) -> Result<Self, LevelError> {
        let mut grid = PathGrid::new(spec.width, spec.height);
        for &[x, y] in &spec.path {
            let tile = TilePos::new(x, y);
            if !grid.contains(tile) {
                return Err(LevelError::PathOutOfBounds {
                    x,
                    y,
                    width: spec.width,
                    height: spec.height,
                });
            }
            grid.set_walkable(tile, true);
        }
        Self::new(grid, TilePos::new(spec.spawn[0], spec.spawn[1]))
    }

    /// The built-in serpentine level from the top-right corner to tile (0, 1).
    pub fn default_level() -> Self {
        let spec = default_spec();
        let mut grid = PathGrid::new(spec.width, spec.height);
        for &[x, y] in &spec.path {
            grid.set_walkable(TilePos::new(x, y), true);
        }
        Self::assemble(grid, TilePos::new(spec.spawn[0], spec.spawn[1]))
    }

    pub fn grid(&self) -> &PathGrid {
        &self.grid
    }

    pub fn projection(&self) -> &TileProjection {
        &self.projection
    }

    pub fn spawn_tile(&self) -> TilePos {
        self.spawn_tile
    }

    /// World (x, z) of the spawn tile.
    pub fn spawn_point(&self) -> (f64, f64) {
        self.projection.tile_to_world(self.spawn_tile)
    }

    /// World center and extent, used to size spatial indexing.
    pub fn game_context(&self) -> GameContext {
        let p = &self.projection;
        let center = Position::new(
            p.to_x((self.grid.width() / 2) as f64),
            0.0,
            p.to_z((self.grid.height() / 2) as f64),
        );
        let tiles = self.grid.width().max(self.grid.height()) as f64;
        GameContext {
            center,
            size: tiles * p.pitch() + WORLD_MARGIN,
        }
    }
}

/// Load and validate a level from a JSON file.
pub fn load_level(path: &Path) -> Result<Level, LevelError> {
    let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&json)
}

/// Parse and validate a level from JSON text.
pub fn parse_level(json: &str) -> Result<Level, LevelError> {
    let spec: LevelSpec = serde_json::from_str(json)?;
    Level::from_spec(&spec)
}

/// Description of the built-in level.
pub fn default_spec() -> LevelSpec {
    #[rustfmt::skip]
    let path = vec![
        [0, 1], [1, 1], [2, 1], [3, 1], [4, 1], [5, 1], [6, 1], [7, 1], [8, 1],
        [8, 2], [8, 3], [7, 3], [6, 3], [5, 3], [4, 3], [3, 3], [2, 3], [1, 3],
        [1, 4], [1, 5], [1, 6], [1, 7], [1, 8], [2, 8], [3, 8], [4, 8], [4, 7],
        [4, 6], [4, 5], [5, 5], [6, 5], [7, 5], [8, 5], [8, 6], [8, 7], [7, 7],
        [6, 7], [6, 8], [6, 9], [7, 9], [8, 9], [9, 9],
    ];
    LevelSpec {
        width: TILE_COUNT_X,
        height: TILE_COUNT_Z,
        path,
        spawn: [TILE_COUNT_X as i32 - 1, TILE_COUNT_Z as i32 - 1],
    }
}
