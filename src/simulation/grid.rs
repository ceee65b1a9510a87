//! Uniform spatial grid for SPH neighbor search.
//!
//! Particles are bucketed by the cell containing their position. A neighbor
//! query scans the 3x3x3 block of cells around the query particle (broad
//! phase) and keeps only the particles within the neighbor radius (narrow
//! phase). The grid is rebuilt from scratch for every state it serves.

use tracing::warn;

use crate::simulation::params::GridConfig;
use crate::simulation::states::{NVec3, StateVector};

/// Neighbor of a particle together with its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    config: GridConfig,
    dims: [usize; 3],
    /// Cell id -> particle indices.
    cells: Vec<Vec<usize>>,
    /// Particles outside the grid bounds at the last rebuild.
    dropped: Vec<usize>,
}

impl SpatialGrid {
    pub fn new(config: GridConfig) -> Self {
        let dims = config.dims();
        let cells = vec![Vec::new(); dims[0] * dims[1] * dims[2]];
        Self {
            config,
            dims,
            cells,
            dropped: Vec::new(),
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Integer cell coordinate of a position (may be outside the grid).
    pub fn cell_coord(&self, position: NVec3) -> [i64; 3] {
        let rel = (position - self.config.min_corner()) / self.config.cell_size;
        [rel.x.floor() as i64, rel.y.floor() as i64, rel.z.floor() as i64]
    }

    /// Linear cell id for a coordinate, `None` when outside the grid.
    pub fn cell_id(&self, coord: [i64; 3]) -> Option<usize> {
        for axis in 0..3 {
            if coord[axis] < 0 || coord[axis] >= self.dims[axis] as i64 {
                return None;
            }
        }
        let [x, y, z] = coord.map(|c| c as usize);
        Some((x * self.dims[1] + y) * self.dims[2] + z)
    }

    /// Cell id containing `position`, `None` when outside the grid.
    pub fn cell_of(&self, position: NVec3) -> Option<usize> {
        self.cell_id(self.cell_coord(position))
    }

    /// Particle indices bucketed in cell `id`.
    pub fn bucket(&self, id: usize) -> &[usize] {
        &self.cells[id]
    }

    /// Particles left out of the last rebuild.
    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    /// Clear every bucket and re-bucket all particles of `state`
    pub fn rebuild(&mut self, state: &StateVector) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.dropped.clear();

        for (i, x) in state.positions().enumerate() {
            match self.cell_of(x) {
                Some(id) => self.cells[id].push(i),
                None => self.dropped.push(i),
            }
        }

        if !self.dropped.is_empty() {
            warn!(
                dropped = self.dropped.len(),
                first = self.dropped[0],
                "particles outside grid bounds are excluded from neighbor search"
            );
        }
    }

    /// Particles within `radius` of particle `i`, excluding `i` itself
    ///
    /// `radius` must not exceed the cell size, otherwise the 3x3x3 scan
    /// misses neighbors. A particle dropped from the grid has no neighbors.
    pub fn neighbors(&self, state: &StateVector, i: usize, radius: f64) -> Vec<Neighbor> {
        let xi = state.position_at(i);
        let center = self.cell_coord(xi);
        if self.cell_id(center).is_none() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let coord = [center[0] + dx, center[1] + dy, center[2] + dz];
                    let Some(id) = self.cell_id(coord) else {
                        continue;
                    };
                    for &j in &self.cells[id] {
                        if j == i {
                            continue;
                        }
                        let distance = (state.position_at(j) - xi).norm();
                        if distance <= radius {
                            out.push(Neighbor { index: j, distance });
                        }
                    }
                }
            }
        }
        out
    }
}

/// All-pairs reference for the grid query.
pub fn brute_force_neighbors(state: &StateVector, i: usize, radius: f64) -> Vec<Neighbor> {
    let xi = state.position_at(i);
    state
        .positions()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(j, xj)| Neighbor {
            index: j,
            distance: (xj - xi).norm(),
        })
        .filter(|n| n.distance <= radius)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> SpatialGrid {
        SpatialGrid::new(GridConfig {
            min: [-5.0, -5.0, -5.0],
            max: [5.0, 5.0, 5.0],
            cell_size: 1.0,
        })
    }

    #[test]
    fn test_cell_of() {
        let grid = unit_grid();
        assert_eq!(grid.dims(), [10, 10, 10]);
        assert_eq!(grid.cell_coord(NVec3::new(0.5, 0.5, 0.5)), [5, 5, 5]);
        assert_eq!(grid.cell_coord(NVec3::new(-4.5, 0.5, 0.5)), [0, 5, 5]);
        assert!(grid.cell_of(NVec3::new(5.5, 0.0, 0.0)).is_none());
        assert!(grid.cell_of(NVec3::new(0.0, -5.01, 0.0)).is_none());
    }

    #[test]
    fn test_rebuild_buckets_every_particle_once() {
        let mut grid = unit_grid();
        let state = StateVector::at_rest(vec![
            NVec3::new(0.0, 0.0, 0.0),
            NVec3::new(0.1, 0.1, 0.1),
            NVec3::new(3.0, 3.0, 3.0),
        ]);
        grid.rebuild(&state);

        let total: usize = (0..grid.cell_count()).map(|id| grid.bucket(id).len()).sum();
        assert_eq!(total, 3);
        let id = grid.cell_of(NVec3::zeros()).unwrap();
        assert_eq!(grid.bucket(id), &[0, 1]);
        assert!(grid.dropped().is_empty());
    }

    #[test]
    fn test_out_of_bounds_particle_dropped() {
        let mut grid = unit_grid();
        let state = StateVector::at_rest(vec![NVec3::zeros(), NVec3::new(50.0, 0.0, 0.0)]);
        grid.rebuild(&state);
        assert_eq!(grid.dropped(), &[1]);
        assert!(grid.neighbors(&state, 1, 1.0).is_empty());
    }

    #[test]
    fn test_neighbors_exclude_self_and_far() {
        let mut grid = unit_grid();
        let state = StateVector::at_rest(vec![
            NVec3::new(0.0, 0.0, 0.0),
            NVec3::new(0.5, 0.0, 0.0),
            NVec3::new(0.0, 0.9, 0.0),
            NVec3::new(0.9, 0.9, 0.0),
        ]);
        grid.rebuild(&state);
        let mut found: Vec<usize> = grid.neighbors(&state, 0, 1.0).iter().map(|n| n.index).collect();
        found.sort_unstable();
        assert_eq!(found, vec![1, 2]);
    }
}
