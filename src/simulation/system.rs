//! Shared particle system contract and the closed set of systems
//!
//! Every system owns one [`StateVector`] and maps any state to its time
//! derivative through `eval_f`. Integrators only see this trait.
//! [`Simulation`] selects one of the four concrete systems at construction.

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::cloth::ClothSystem;
use crate::simulation::pendulum::PendulumSystem;
use crate::simulation::simple::SimpleSystem;
use crate::simulation::states::{DerivativeVector, StateVector};
use crate::simulation::water::WaterSystem;
use crate::visualization::renderer::Renderer;

pub trait ParticleSystem {
    /// Current state.
    fn state(&self) -> &StateVector;

    /// Replace the whole state; the particle count must not change.
    fn set_state(&mut self, state: StateVector) -> SimResult<()>;

    /// Time derivative at an arbitrary `state` (not necessarily the stored one).
    fn eval_f(&self, state: &StateVector) -> SimResult<DerivativeVector>;

    /// Render the current state.
    fn draw(&self, renderer: &mut dyn Renderer);

    fn particle_count(&self) -> usize {
        self.state().particle_count()
    }
}

/// Reject a state whose particle count differs from `expected`
pub(crate) fn ensure_particle_count(state: &StateVector, expected: usize) -> SimResult<()> {
    if state.particle_count() != expected {
        return Err(SimError::ShapeMismatch {
            expected: 2 * expected,
            found: state.len(),
        });
    }
    Ok(())
}

/// Which system a scenario simulates
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemKind {
    #[serde(rename = "simple")]
    Simple,
    #[serde(rename = "pendulum")]
    Pendulum,
    #[serde(rename = "cloth")]
    Cloth,
    #[serde(rename = "water")]
    Water,
}

/// One of the supported particle systems
pub enum Simulation {
    Simple(SimpleSystem),
    Pendulum(PendulumSystem),
    Cloth(ClothSystem),
    Water(WaterSystem),
}

impl Simulation {
    pub fn kind(&self) -> SystemKind {
        match self {
            Simulation::Simple(_) => SystemKind::Simple,
            Simulation::Pendulum(_) => SystemKind::Pendulum,
            Simulation::Cloth(_) => SystemKind::Cloth,
            Simulation::Water(_) => SystemKind::Water,
        }
    }

    fn inner(&self) -> &dyn ParticleSystem {
        match self {
            Simulation::Simple(s) => s,
            Simulation::Pendulum(s) => s,
            Simulation::Cloth(s) => s,
            Simulation::Water(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ParticleSystem {
        match self {
            Simulation::Simple(s) => s,
            Simulation::Pendulum(s) => s,
            Simulation::Cloth(s) => s,
            Simulation::Water(s) => s,
        }
    }
}

impl ParticleSystem for Simulation {
    fn state(&self) -> &StateVector {
        self.inner().state()
    }

    fn set_state(&mut self, state: StateVector) -> SimResult<()> {
        self.inner_mut().set_state(state)
    }

    fn eval_f(&self, state: &StateVector) -> SimResult<DerivativeVector> {
        self.inner().eval_f(state)
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        self.inner().draw(renderer)
    }
}
