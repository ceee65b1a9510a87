//! Smoothed particle hydrodynamics fluid
//!
//! Each evaluation rebuilds a [`SpatialGrid`] from the given state, gathers
//! neighbors for every particle, then runs two passes:
//! 1. density: `rho_i = floor + sum_j m * Poly6(r_ij)`
//! 2. forces: pressure, viscosity, gravity and an external placeholder
//!
//! The force pass reads the densities of all particles, so the passes cannot
//! be fused.

use std::f64::consts::PI;

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::simulation::forces::MIN_SEPARATION;
use crate::simulation::grid::{Neighbor, SpatialGrid};
use crate::simulation::kernels::Kernel;
use crate::simulation::params::WaterParams;
use crate::simulation::states::{DerivativeVector, NVec3, StateVector};
use crate::simulation::system::{ensure_particle_count, ParticleSystem};
use crate::visualization::renderer::{draw_particles, Renderer};

const WATER_COLOR: [f64; 3] = [0.2, 0.45, 0.95];

pub struct WaterSystem {
    params: WaterParams,
    state: StateVector,
}

/// Number of lattice sites in `[start, end)` with the given spacing
fn lattice_count(start: f64, end: f64, spacing: f64) -> usize {
    if end <= start {
        return 0;
    }
    ((end - start) / spacing - 1e-9).ceil() as usize
}

impl WaterSystem {
    /// Block of particles at rest on a lattice filling `[tank_min, tank_max)`.
    pub fn new(params: WaterParams) -> SimResult<Self> {
        params.validate()?;
        let s = params.particle_spacing;
        let min = NVec3::from(params.tank_min);
        let counts: Vec<usize> = (0..3)
            .map(|a| lattice_count(params.tank_min[a], params.tank_max[a], s))
            .collect();

        let mut positions = Vec::with_capacity(counts.iter().product());
        for ix in 0..counts[0] {
            for iy in 0..counts[1] {
                for iz in 0..counts[2] {
                    positions.push(min + s * NVec3::new(ix as f64, iy as f64, iz as f64));
                }
            }
        }

        debug!(particles = positions.len(), "filled water tank");
        Self::with_state(params, StateVector::at_rest(positions))
    }

    pub fn with_state(params: WaterParams, state: StateVector) -> SimResult<Self> {
        params.validate()?;
        Ok(Self { params, state })
    }

    pub fn params(&self) -> &WaterParams {
        &self.params
    }

    /// Grid bucketing the particles of `state`.
    pub fn build_grid(&self, state: &StateVector) -> SpatialGrid {
        let mut grid = SpatialGrid::new(self.params.grid);
        grid.rebuild(state);
        grid
    }

    /// Neighbors of particle `i` in `state`, self excluded.
    pub fn neighbors(&self, state: &StateVector, i: usize) -> SimResult<Vec<Neighbor>> {
        state.particle(i)?;
        let grid = self.build_grid(state);
        Ok(grid.neighbors(state, i, self.params.neighbor_radius))
    }

    /// Density of every particle in `state`.
    pub fn densities(&self, state: &StateVector) -> SimResult<Vec<f64>> {
        let grid = self.build_grid(state);
        let neighbors = self.gather_neighbors(&grid, state);
        self.density_pass(&neighbors)
    }

    fn gather_neighbors(&self, grid: &SpatialGrid, state: &StateVector) -> Vec<Vec<Neighbor>> {
        (0..state.particle_count())
            .map(|i| grid.neighbors(state, i, self.params.neighbor_radius))
            .collect()
    }

    fn density_pass(&self, neighbors: &[Vec<Neighbor>]) -> SimResult<Vec<f64>> {
        let p = &self.params;
        neighbors
            .iter()
            .map(|list| {
                list.iter().try_fold(p.density_floor, |rho, n| -> SimResult<f64> {
                    Ok(rho + p.mass * Kernel::Poly6.evaluate(n.distance, p.kernel_radius)?)
                })
            })
            .collect()
    }

    fn pressure_force(
        &self,
        state: &StateVector,
        i: usize,
        neighbors: &[Neighbor],
        density: &[f64],
    ) -> SimResult<NVec3> {
        let p = &self.params;
        let h = p.kernel_radius;
        let xi = state.position_at(i);
        let mut force = NVec3::zeros();

        for n in neighbors {
            if n.distance <= MIN_SEPARATION {
                return Err(SimError::DegenerateGeometry { first: i, second: n.index });
            }
            let j = n.index;
            let r_ij = xi - state.position_at(j);
            let q = n.distance / h;
            let pressure = density[i] + density[j] - 2.0 * p.rest_density;
            force += p.mass * pressure * (1.0 - q).powi(2) * r_ij / (density[j] * q);
        }

        Ok(force * 15.0 * p.gas_constant / (PI * h.powi(4)) * p.pressure_scale)
    }

    fn viscosity_force(&self, state: &StateVector, i: usize, neighbors: &[Neighbor], density: &[f64]) -> NVec3 {
        let p = &self.params;
        let h = p.kernel_radius;
        let vi = state.velocity_at(i);
        let mut force = NVec3::zeros();

        for n in neighbors {
            let j = n.index;
            let q = n.distance / h;
            // pulls v_i toward v_j
            force += p.mass * (state.velocity_at(j) - vi) * (1.0 - q) / density[j];
        }

        force * 40.0 * p.viscosity / (PI * h.powi(4))
    }

    /// Extension point for scripted forces; currently none.
    fn external_force(&self, _i: usize) -> NVec3 {
        NVec3::zeros()
    }
}

impl ParticleSystem for WaterSystem {
    fn state(&self) -> &StateVector {
        &self.state
    }

    fn set_state(&mut self, state: StateVector) -> SimResult<()> {
        ensure_particle_count(&state, self.state.particle_count())?;
        self.state = state;
        Ok(())
    }

    fn eval_f(&self, state: &StateVector) -> SimResult<DerivativeVector> {
        let p = &self.params;
        let grid = self.build_grid(state);
        let neighbors = self.gather_neighbors(&grid, state);

        // first pass
        let density = self.density_pass(&neighbors)?;

        // second pass
        let gravity = NVec3::new(0.0, p.mass * p.gravity, 0.0);
        let mut derivative = Vec::with_capacity(state.len());
        for (i, list) in neighbors.iter().enumerate() {
            let total = self.pressure_force(state, i, list, &density)?
                + self.viscosity_force(state, i, list, &density)
                + gravity
                + self.external_force(i);
            let acceleration = total / p.mass * p.acceleration_scale;
            derivative.push(state.velocity_at(i));
            derivative.push(acceleration);
        }

        StateVector::from_interleaved(derivative)
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        draw_particles(renderer, self.state.positions(), NVec3::from(WATER_COLOR), 0.075, 10);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_tank_size() {
        let water = WaterSystem::new(WaterParams::default()).unwrap();
        // 8 x 4 x 8 lattice
        assert_eq!(water.state().particle_count(), 256);
    }

    #[test]
    fn test_isolated_particle_free_falls() {
        let params = WaterParams::default();
        let state = StateVector::at_rest(vec![NVec3::zeros()]);
        let water = WaterSystem::with_state(params.clone(), state).unwrap();
        let f = water.eval_f(water.state()).unwrap();
        assert_relative_eq!(f.velocity_at(0).y, params.gravity * params.acceleration_scale, epsilon = 1e-12);
        assert_eq!(f.velocity_at(0).x, 0.0);
    }

    #[test]
    fn test_pair_density_is_symmetric() {
        let params = WaterParams::default();
        let state = StateVector::at_rest(vec![NVec3::zeros(), NVec3::new(0.2, 0.0, 0.0)]);
        let water = WaterSystem::with_state(params.clone(), state.clone()).unwrap();
        let rho = water.densities(&state).unwrap();
        let expected = params.density_floor + params.mass * Kernel::Poly6.evaluate(0.2, params.kernel_radius).unwrap();
        assert_relative_eq!(rho[0], expected, epsilon = 1e-12);
        assert_relative_eq!(rho[1], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_pressure_pair_is_antisymmetric() {
        let params = WaterParams { gravity: 0.0, ..Default::default() };
        let state = StateVector::at_rest(vec![NVec3::zeros(), NVec3::new(0.0, 0.2, 0.1)]);
        let water = WaterSystem::with_state(params, state.clone()).unwrap();
        let f = water.eval_f(&state).unwrap();
        assert!((f.velocity_at(0) + f.velocity_at(1)).norm() < 1e-9);
    }

    #[test]
    fn test_viscosity_damps_relative_motion() {
        let params = WaterParams { gravity: 0.0, pressure_scale: 0.0, ..Default::default() };
        let state = StateVector::from_pairs(vec![
            (NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0)),
            (NVec3::new(0.0, 0.2, 0.0), NVec3::zeros()),
        ]);
        let water = WaterSystem::with_state(params, state.clone()).unwrap();
        let f = water.eval_f(&state).unwrap();
        assert!(f.velocity_at(0).x < 0.0);
        assert!(f.velocity_at(1).x > 0.0);
    }

    #[test]
    fn test_coincident_particles_are_degenerate() {
        let state = StateVector::at_rest(vec![NVec3::zeros(), NVec3::zeros()]);
        let water = WaterSystem::with_state(WaterParams::default(), state.clone()).unwrap();
        assert_eq!(
            water.eval_f(&state).unwrap_err(),
            SimError::DegenerateGeometry { first: 0, second: 1 }
        );
    }
}
