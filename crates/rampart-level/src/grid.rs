//! PathGrid: static walkable/buildable tile map.

use rampart_core::constants::DIRECTIONS;
use serde::{Deserialize, Serialize};

/// Integer tile coordinate. May be negative or past the edge; the grid
/// treats such tiles as not walkable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring tile one step along `DIRECTIONS[direction]`.
    pub fn step(self, direction: usize) -> TilePos {
        let (dx, dy) = DIRECTIONS[direction % DIRECTIONS.len()];
        TilePos::new(self.x + dx, self.y + dy)
    }
}

/// Row-major boolean grid: `true` = path (walkable), `false` = buildable tile.
/// Immutable once a level has been built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl PathGrid {
    /// Create an all-buildable grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build a grid from text rows. `#` marks path, anything else is buildable.
    /// Row `y` of the grid is `rows[y]`; shorter rows are padded as buildable.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    grid.cells[y * width + x] = true;
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, tile: TilePos) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as usize) < self.width && (tile.y as usize) < self.height
    }

    /// Mark a tile walkable. Out-of-bounds tiles are ignored.
    pub fn set_walkable(&mut self, tile: TilePos, walkable: bool) {
        if self.contains(tile) {
            let idx = tile.y as usize * self.width + tile.x as usize;
            self.cells[idx] = walkable;
        }
    }

    /// Whether `tile` is on the grid and part of the path.
    pub fn is_walkable(&self, tile: TilePos) -> bool {
        self.contains(tile) && self.cells[tile.y as usize * self.width + tile.x as usize]
    }

    /// All path tiles in row-major order.
    pub fn path_tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.tiles().filter(|t| self.is_walkable(*t))
    }

    /// All buildable (non-path) tiles in row-major order.
    pub fn buildable_tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.tiles().filter(|t| !self.is_walkable(*t))
    }

    fn tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| TilePos::new(x as i32, y as i32)))
    }
}
