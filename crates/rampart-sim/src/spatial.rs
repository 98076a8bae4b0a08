//! Spatial index over enemies and bullets.
//!
//! A uniform grid of buckets in the x/z plane, sized from the level's
//! `GameContext` and rebuilt from the world at the start of every tick.
//! Populations are kept apart so an enemy search never returns bullets.

use std::collections::HashMap;

use hecs::{Entity, World};

use rampart_core::components::{Bullet, Enemy};
use rampart_core::enums::Population;
use rampart_core::types::Position;
use rampart_level::GameContext;

/// One query result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialHit {
    pub entity: Entity,
    /// Position when the index was last rebuilt.
    pub position: Position,
}

/// Radius search partitioned by population.
pub trait SpatialIndex {
    /// Append every member of `population` within `radius` of `center` to
    /// `out`. `out` is cleared first.
    fn find_nearby_into(
        &self,
        center: &Position,
        radius: f64,
        population: Population,
        out: &mut Vec<SpatialHit>,
    );

    fn find_nearby(&self, center: &Position, radius: f64, population: Population) -> Vec<SpatialHit> {
        let mut out = Vec::new();
        self.find_nearby_into(center, radius, population, &mut out);
        out
    }
}

/// Uniform bucket grid. Entries outside the covered region are clamped into
/// the border buckets, so nothing is ever dropped.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    min_x: f64,
    min_z: f64,
    cell_size: f64,
    cols: usize,
    rows: usize,
    enemies: Vec<Vec<SpatialHit>>,
    bullets: Vec<Vec<SpatialHit>>,
}

impl SpatialGrid {
    /// Cover the square region described by `context` with cells of
    /// `cell_size` world units.
    pub fn new(context: &GameContext, cell_size: f64) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let half = context.size / 2.0;
        let cells = ((context.size / cell_size).ceil() as usize).max(1);
        Self {
            min_x: context.center.x - half,
            min_z: context.center.z - half,
            cell_size,
            cols: cells,
            rows: cells,
            enemies: vec![Vec::new(); cells * cells],
            bullets: vec![Vec::new(); cells * cells],
        }
    }

    /// Re-index both populations from the current world.
    pub fn rebuild(&mut self, world: &World) {
        self.rebuild_population(world, Population::Enemies);
        self.rebuild_population(world, Population::Bullets);
    }

    /// Re-index a single population.
    pub fn rebuild_population(&mut self, world: &World, population: Population) {
        for bucket in self.buckets_mut(population).iter_mut() {
            bucket.clear();
        }

        let mut entries = Vec::new();
        match population {
            Population::Enemies => {
                for (entity, (_enemy, pos)) in world.query::<(&Enemy, &Position)>().iter() {
                    entries.push(SpatialHit {
                        entity,
                        position: *pos,
                    });
                }
            }
            Population::Bullets => {
                for (entity, (_bullet, pos)) in world.query::<(&Bullet, &Position)>().iter() {
                    entries.push(SpatialHit {
                        entity,
                        position: *pos,
                    });
                }
            }
        }

        for hit in entries {
            let idx = self.cell_index(self.col_of(hit.position.x), self.row_of(hit.position.z));
            self.buckets_mut(population)[idx].push(hit);
        }
    }

    /// Number of indexed members of `population`.
    pub fn len(&self, population: Population) -> usize {
        self.buckets(population).iter().map(Vec::len).sum()
    }

    fn buckets(&self, population: Population) -> &[Vec<SpatialHit>] {
        match population {
            Population::Enemies => &self.enemies,
            Population::Bullets => &self.bullets,
        }
    }

    fn buckets_mut(&mut self, population: Population) -> &mut Vec<Vec<SpatialHit>> {
        match population {
            Population::Enemies => &mut self.enemies,
            Population::Bullets => &mut self.bullets,
        }
    }

    fn col_of(&self, x: f64) -> usize {
        clamp_cell((x - self.min_x) / self.cell_size, self.cols)
    }

    fn row_of(&self, z: f64) -> usize {
        clamp_cell((z - self.min_z) / self.cell_size, self.rows)
    }

    fn cell_index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }
}

fn clamp_cell(t: f64, count: usize) -> usize {
    if t.is_nan() || t < 0.0 {
        0
    } else {
        (t as usize).min(count - 1)
    }
}

impl SpatialIndex for SpatialGrid {
    fn find_nearby_into(
        &self,
        center: &Position,
        radius: f64,
        population: Population,
        out: &mut Vec<SpatialHit>,
    ) {
        out.clear();
        if radius < 0.0 {
            return;
        }

        let buckets = self.buckets(population);
        let (c0, c1) = (self.col_of(center.x - radius), self.col_of(center.x + radius));
        let (r0, r1) = (self.row_of(center.z - radius), self.row_of(center.z + radius));

        for row in r0..=r1 {
            for col in c0..=c1 {
                for hit in &buckets[self.cell_index(col, row)] {
                    if center.distance_to(&hit.position) <= radius {
                        out.push(*hit);
                    }
                }
            }
        }
    }
}

/// Reusable result buffers keyed by (owner, population).
///
/// Each querying entity keeps its own buffer so repeated searches do not
/// allocate. Buffers of despawned owners are dropped by `prune`.
#[derive(Debug, Default)]
pub struct QueryScratch {
    buffers: HashMap<(Entity, Population), Vec<SpatialHit>>,
}

impl QueryScratch {
    /// Borrow the owner's buffer for `population`, creating it on first use.
    pub fn buffer(&mut self, owner: Entity, population: Population) -> &mut Vec<SpatialHit> {
        self.buffers.entry((owner, population)).or_default()
    }

    /// Drop buffers whose owner no longer exists.
    pub fn prune(&mut self, world: &World) {
        self.buffers.retain(|(owner, _), _| world.contains(*owner));
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
