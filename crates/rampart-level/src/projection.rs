//! Tile projection: converts between tile coordinates and world space.
//!
//! Tiles lie in the x/z plane. Columns are centered on the world origin
//! along x; rows start at the origin along z.

use rampart_core::constants::{TILE_CENTER_EPSILON, TILE_COUNT_X, TILE_SIZE, TILE_SPACING};
use rampart_core::types::Position;

use crate::grid::TilePos;

/// Tile layout anchored so that the grid is centered on x = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileProjection {
    pub tile_size: f64,
    pub tile_spacing: f64,
    /// Number of columns, used to center the grid along x.
    pub count_x: usize,
}

impl Default for TileProjection {
    fn default() -> Self {
        Self::new(TILE_SIZE, TILE_SPACING, TILE_COUNT_X)
    }
}

impl TileProjection {
    pub fn new(tile_size: f64, tile_spacing: f64, count_x: usize) -> Self {
        Self {
            tile_size,
            tile_spacing,
            count_x,
        }
    }

    /// Distance between adjacent tile centers.
    pub fn pitch(&self) -> f64 {
        self.tile_spacing + self.tile_size
    }

    fn to_coord(&self, t: f64) -> f64 {
        t * self.pitch() - self.tile_size / 2.0
    }

    fn from_coord(&self, v: f64) -> f64 {
        (v + self.tile_size / 2.0) / self.pitch()
    }

    /// World x of tile column `t` (fractional columns allowed).
    pub fn to_x(&self, t: f64) -> f64 {
        self.to_coord(t + 0.5) - self.to_coord(self.count_x as f64 / 2.0)
    }

    /// World z of tile row `t`.
    pub fn to_z(&self, t: f64) -> f64 {
        self.to_coord(t)
    }

    /// Fractional tile column of world x.
    pub fn from_x(&self, x: f64) -> f64 {
        self.from_coord(x + self.to_coord(self.count_x as f64 / 2.0)) - 0.5
    }

    /// Fractional tile row of world z.
    pub fn from_z(&self, z: f64) -> f64 {
        self.from_coord(z)
    }

    /// World (x, z) of a tile center.
    pub fn tile_to_world(&self, tile: TilePos) -> (f64, f64) {
        (self.to_x(tile.x as f64), self.to_z(tile.y as f64))
    }

    /// Fractional tile coordinates of a world position.
    pub fn world_to_tile(&self, pos: &Position) -> (f64, f64) {
        (self.from_x(pos.x), self.from_z(pos.z))
    }

    /// Tile containing `pos` and whether `pos` is close enough to that tile's
    /// center to make a steering decision.
    /// The tile is picked by truncation and the tolerance is one-sided.
    pub fn locate(&self, pos: &Position) -> (TilePos, bool) {
        let (tx, tz) = self.world_to_tile(pos);
        let ix = tx as i32;
        let iz = tz as i32;
        let fx = tx - ix as f64;
        let fz = tz - iz as f64;
        let centered = fx < TILE_CENTER_EPSILON && fz < TILE_CENTER_EPSILON;
        (TilePos::new(ix, iz), centered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_to_world_inverts() {
        let proj = TileProjection::default();
        for t in [0.0, 1.0, 4.5, 9.0] {
            assert!((proj.from_x(proj.to_x(t)) - t).abs() < 1e-12);
            assert!((proj.from_z(proj.to_z(t)) - t).abs() < 1e-12);
        }
    }

    #[test]
    fn test_default_layout_values() {
        let proj = TileProjection::default();
        // Column 0 sits half the grid to the left of the origin.
        assert!((proj.to_x(0.0) - -13.5).abs() < 1e-12);
        assert!((proj.to_z(0.0) - -1.5).abs() < 1e-12);
        assert!((proj.to_z(9.0) - 25.5).abs() < 1e-12);
    }

    #[test]
    fn test_locate_tile_center_tolerance() {
        let proj = TileProjection::default();
        let (x, z) = proj.tile_to_world(TilePos::new(3, 4));
        let (tile, centered) = proj.locate(&Position::new(x, -1.2, z));
        assert_eq!(tile, TilePos::new(3, 4));
        assert!(centered);

        // Half a tile along x is not a center.
        let off = Position::new(x + proj.pitch() * 0.5, -1.2, z);
        let (tile, centered) = proj.locate(&off);
        assert_eq!(tile, TilePos::new(3, 4));
        assert!(!centered);

        // Within the tolerance window.
        let near = Position::new(x + proj.pitch() * 0.05, -1.2, z + proj.pitch() * 0.05);
        assert!(proj.locate(&near).1);
    }
}
