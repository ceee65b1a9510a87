//! Cloth sheet as a W x H mass-spring grid.
//!
//! Springs come in three categories (structural, shear, flexion) derived from
//! grid offsets on every evaluation. The two top-row corners are pinned.

use tracing::debug;

use crate::error::SimResult;
use crate::simulation::forces::{ForceSet, GridSprings, LinearDrag, Spring, UniformGravity};
use crate::simulation::params::ClothParams;
use crate::simulation::states::{DerivativeVector, NVec3, StateVector};
use crate::simulation::system::{ensure_particle_count, ParticleSystem};
use crate::visualization::renderer::{draw_particles, Renderer};

const CLOTH_COLOR: [f64; 3] = [0.9, 0.9, 0.9];

pub struct ClothSystem {
    params: ClothParams,
    mesh: GridSprings,
    forces: ForceSet,
    state: StateVector,
}

impl ClothSystem {
    /// Flat sheet hanging in the xy-plane: row `r` sits `r * spacing` below
    /// `origin`, column `c` sits `c * spacing` to its right.
    pub fn new(params: ClothParams) -> SimResult<Self> {
        params.validate()?;
        let origin = NVec3::from(params.origin);
        let s = params.spacing;
        let positions: Vec<NVec3> = (0..params.height)
            .flat_map(|r| {
                (0..params.width)
                    .map(move |c| origin + NVec3::new(c as f64 * s, -(r as f64) * s, 0.0))
            })
            .collect();
        Self::with_state(params, StateVector::at_rest(positions))
    }

    pub fn with_state(params: ClothParams, state: StateVector) -> SimResult<Self> {
        params.validate()?;
        ensure_particle_count(&state, params.width * params.height)?;

        let grid_springs = || GridSprings {
            width: params.width,
            height: params.height,
            constants: params.springs,
            rest_lengths: params.rest_lengths(),
        };
        let forces = ForceSet::new()
            .with(UniformGravity { mass: params.mass, g: params.gravity })
            .with(LinearDrag { k: params.drag })
            .with(grid_springs());
        let mesh = grid_springs();

        debug!(
            width = params.width,
            height = params.height,
            springs = mesh.springs().count(),
            "built cloth mesh"
        );
        Ok(Self { params, mesh, forces, state })
    }

    pub fn params(&self) -> &ClothParams {
        &self.params
    }

    /// Particle index of grid cell (column, row).
    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.params.width + col
    }

    /// The two top-row corners.
    pub fn pinned(&self) -> [usize; 2] {
        [0, self.params.width - 1]
    }

    /// Every spring of the mesh, regenerated from the topology on each call.
    /// For visualization only.
    pub fn springs(&self) -> Vec<Spring> {
        self.mesh.springs().collect()
    }

    /// Spring force on `i` from `j` at `state`, `None` if not connected
    pub fn spring_force(&self, state: &StateVector, i: usize, j: usize) -> SimResult<Option<NVec3>> {
        self.mesh.force_between(state, i, j)
    }
}

impl ParticleSystem for ClothSystem {
    fn state(&self) -> &StateVector {
        &self.state
    }

    fn set_state(&mut self, state: StateVector) -> SimResult<()> {
        ensure_particle_count(&state, self.params.width * self.params.height)?;
        self.state = state;
        Ok(())
    }

    fn eval_f(&self, state: &StateVector) -> SimResult<DerivativeVector> {
        ensure_particle_count(state, self.params.width * self.params.height)?;

        let n = state.particle_count();
        let mut forces = vec![NVec3::zeros(); n];
        self.forces.accumulate_forces(state, &mut forces)?;

        let pinned = self.pinned();
        Ok(StateVector::from_pairs((0..n).map(|i| {
            if pinned.contains(&i) {
                (NVec3::zeros(), NVec3::zeros())
            } else {
                (state.velocity_at(i), forces[i] / self.params.mass)
            }
        })))
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let color = NVec3::from(CLOTH_COLOR);
        draw_particles(renderer, self.state.positions(), color, 0.04, 8);

        for s in self.mesh.springs() {
            renderer.record_line(self.state.position_at(s.a), self.state.position_at(s.b), color);
        }
        renderer.draw_lines();
    }
}
