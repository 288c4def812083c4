//! Spatial indexing for cutoff-based neighbor search.
//!
//! Particles are binned into cells in fractional box coordinates. Along a
//! periodic axis the cells wrap around and are at least one cutoff wide
//! (measured perpendicular to the box face); along a non-periodic axis they
//! simply tile the occupied range. Every neighbor of a particle therefore
//! lies in the 3×3×3 block of cells around its own.

use std::collections::HashMap;

use super::linalg::{Vec3, norm_sq};
use super::pbc::Metric;

type CellKey = (i64, i64, i64);

/// Largest cell coordinate along any axis. Particles beyond it share the
/// last cell, which keeps every stencil offset within `i64`.
const MAX_CELL: i64 = i64::MAX / 4;

/// Cell list over one frame's positions.
#[derive(Debug)]
pub struct SpatialGrid {
    /// Map from cell coordinates to particle indices (ascending).
    cells: HashMap<CellKey, Vec<usize>>,
    /// Cell of each particle.
    particle_cells: Vec<CellKey>,
    /// Number of cells along each periodic axis.
    dims: [i64; 3],
    periodic: [bool; 3],
    /// Fractional size of one cell per axis.
    cell_frac: [f64; 3],
    /// Fractional origin of the cell grid along non-periodic axes.
    origin: [f64; 3],
}

impl SpatialGrid {
    /// Bins `positions` into cells sized for `cutoff`.
    ///
    /// # Arguments
    ///
    /// * `positions`: Particle positions
    /// * `metric`: Validated box geometry
    /// * `cutoff`: Neighbor search radius (must be positive)
    pub fn new(positions: &[Vec3], metric: &Metric, cutoff: f64) -> Self {
        let periodic = metric.periodic();
        let widths = metric.widths();

        let mut dims = [1i64; 3];
        let mut cell_frac = [0.0f64; 3];
        for k in 0..3 {
            if periodic[k] {
                let n = (widths[k] / cutoff).floor().clamp(1.0, MAX_CELL as f64) as i64;
                dims[k] = n;
                cell_frac[k] = 1.0 / n as f64;
            } else {
                cell_frac[k] = cutoff / widths[k];
            }
        }

        let fractional: Vec<Vec3> = positions.iter().map(|&x| metric.fractional(x)).collect();

        let mut origin = [0.0f64; 3];
        for k in 0..3 {
            if !periodic[k] {
                origin[k] = fractional
                    .iter()
                    .map(|s| s[k])
                    .min_by(f64::total_cmp)
                    .unwrap_or(0.0);
            }
        }

        let mut grid = Self {
            cells: HashMap::new(),
            particle_cells: Vec::with_capacity(positions.len()),
            dims,
            periodic,
            cell_frac,
            origin,
        };

        for (idx, s) in fractional.iter().enumerate() {
            let cell = grid.cell_coords(*s);
            grid.particle_cells.push(cell);
            grid.cells.entry(cell).or_default().push(idx);
        }

        grid
    }

    /// Computes the cell coordinates for a fractional position.
    fn cell_coords(&self, s: Vec3) -> CellKey {
        let axis = |k: usize| -> i64 {
            if self.periodic[k] {
                let wrapped = s[k] - s[k].floor();
                let c = (wrapped / self.cell_frac[k]).floor() as i64;
                c.clamp(0, self.dims[k] - 1)
            } else {
                let c = ((s[k] - self.origin[k]) / self.cell_frac[k]).floor();
                c.clamp(0.0, MAX_CELL as f64) as i64
            }
        };
        (axis(0), axis(1), axis(2))
    }

    /// Cells to search around `cell`, wrapped and deduplicated.
    fn stencil(&self, cell: CellKey) -> Vec<CellKey> {
        let center = [cell.0, cell.1, cell.2];
        let offsets = |k: usize| -> Vec<i64> {
            let mut values: Vec<i64> = (-1..=1)
                .map(|d| {
                    if self.periodic[k] {
                        (center[k] + d).rem_euclid(self.dims[k])
                    } else {
                        center[k] + d
                    }
                })
                .collect();
            values.sort_unstable();
            values.dedup();
            values
        };

        let (xs, ys, zs) = (offsets(0), offsets(1), offsets(2));
        let mut cells = Vec::with_capacity(xs.len() * ys.len() * zs.len());
        for &x in &xs {
            for &y in &ys {
                for &z in &zs {
                    cells.push((x, y, z));
                }
            }
        }
        cells
    }

    /// Finds all particle indices within `cutoff` of particle `query`.
    ///
    /// The particle itself is excluded. The result is sorted ascending.
    pub fn query_particle(
        &self,
        query: usize,
        positions: &[Vec3],
        metric: &Metric,
        cutoff: f64,
    ) -> Vec<usize> {
        let cutoff_sq = cutoff * cutoff;
        let mut results = Vec::new();
        for cell in self.stencil(self.particle_cells[query]) {
            if let Some(indices) = self.cells.get(&cell) {
                for &idx in indices {
                    if idx != query
                        && norm_sq(metric.pair_vector(positions, query, idx)) <= cutoff_sq
                    {
                        results.push(idx);
                    }
                }
            }
        }
        results.sort_unstable();
        results
    }
}

/// One entry of an adjacency list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Neighbor particle index.
    pub index: usize,
    /// Minimum-image vector from the owning particle to the neighbor.
    pub offset: Vec3,
}

/// Undirected neighbor graph: edge (i, j) iff distance ≤ cutoff.
#[derive(Debug, Clone, Default)]
pub struct NeighborGraph {
    adjacency: Vec<Vec<Neighbor>>,
}

impl NeighborGraph {
    /// Builds the neighbor graph of `positions` with an inclusive cutoff.
    pub fn build(positions: &[Vec3], metric: &Metric, cutoff: f64) -> Self {
        let mut adjacency: Vec<Vec<Neighbor>> = vec![Vec::new(); positions.len()];
        if positions.is_empty() {
            return Self { adjacency };
        }

        let grid = SpatialGrid::new(positions, metric, cutoff);
        let cutoff_sq = cutoff * cutoff;

        let mut cache: HashMap<CellKey, Vec<CellKey>> = HashMap::new();
        for i in 0..positions.len() {
            let cell = grid.particle_cells[i];
            let stencil = cache.entry(cell).or_insert_with(|| grid.stencil(cell));
            for neighbor_cell in stencil.iter() {
                let Some(indices) = grid.cells.get(neighbor_cell) else {
                    continue;
                };
                for &j in indices {
                    if j <= i {
                        continue;
                    }
                    let offset = metric.pair_vector(positions, i, j);
                    if norm_sq(offset) <= cutoff_sq {
                        adjacency[i].push(Neighbor { index: j, offset });
                        adjacency[j].push(Neighbor {
                            index: i,
                            offset: [-offset[0], -offset[1], -offset[2]],
                        });
                    }
                }
            }
        }

        for list in &mut adjacency {
            list.sort_unstable_by_key(|n| n.index);
        }

        Self { adjacency }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Neighbors of `i`, sorted by index.
    #[inline]
    pub fn neighbors(&self, i: usize) -> &[Neighbor] {
        &self.adjacency[i]
    }

    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }
}
