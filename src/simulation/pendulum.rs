//! Hanging spring chain.
//!
//! Particle 0 is the anchor; every other particle feels gravity, linear drag
//! and Hooke springs toward its chain neighbors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::SimResult;
use crate::simulation::forces::{ChainSprings, ForceSet, LinearDrag, UniformGravity};
use crate::simulation::params::PendulumParams;
use crate::simulation::states::{DerivativeVector, NVec3, StateVector};
use crate::simulation::system::{ensure_particle_count, ParticleSystem};
use crate::visualization::renderer::{draw_particles, Renderer};

const PENDULUM_COLOR: [f64; 3] = [0.73, 0.0, 0.83];

pub struct PendulumSystem {
    params: PendulumParams,
    forces: ForceSet,
    state: StateVector,
}

impl PendulumSystem {
    /// Chain starting at `params.anchor`, each next particle offset by a
    /// uniform random jitter drawn from an RNG seeded with `seed`.
    pub fn new(params: PendulumParams, seed: u64) -> SimResult<Self> {
        params.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut x = NVec3::from(params.anchor);
        let mut positions = Vec::with_capacity(params.particle_count);
        for _ in 0..params.particle_count {
            positions.push(x);
            if params.jitter > 0.0 {
                x += NVec3::from_fn(|_, _| rng.random_range(-params.jitter..=params.jitter));
            }
        }

        debug!(particles = params.particle_count, seed, "built pendulum chain");
        Self::with_state(params, StateVector::at_rest(positions))
    }

    /// Chain with an explicit initial state; particle 0 is the anchor.
    pub fn with_state(params: PendulumParams, state: StateVector) -> SimResult<Self> {
        params.validate()?;
        ensure_particle_count(&state, params.particle_count)?;

        let forces = ForceSet::new()
            .with(UniformGravity { mass: params.mass, g: params.gravity })
            .with(LinearDrag { k: params.drag })
            .with(ChainSprings {
                k: params.spring_constant,
                rest_length: params.rest_length,
            });

        Ok(Self { params, forces, state })
    }

    pub fn params(&self) -> &PendulumParams {
        &self.params
    }

    pub const ANCHOR: usize = 0;
}

impl ParticleSystem for PendulumSystem {
    fn state(&self) -> &StateVector {
        &self.state
    }

    fn set_state(&mut self, state: StateVector) -> SimResult<()> {
        ensure_particle_count(&state, self.params.particle_count)?;
        self.state = state;
        Ok(())
    }

    fn eval_f(&self, state: &StateVector) -> SimResult<DerivativeVector> {
        ensure_particle_count(state, self.params.particle_count)?;

        let n = state.particle_count();
        let mut forces = vec![NVec3::zeros(); n];
        self.forces.accumulate_forces(state, &mut forces)?;

        Ok(StateVector::from_pairs((0..n).map(|i| {
            if i == Self::ANCHOR {
                (NVec3::zeros(), NVec3::zeros())
            } else {
                (state.velocity_at(i), forces[i] / self.params.mass)
            }
        })))
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        draw_particles(renderer, self.state.positions(), NVec3::from(PENDULUM_COLOR), 0.075, 10);
    }
}
