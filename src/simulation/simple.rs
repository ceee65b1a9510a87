//! Single-particle rotation field `(x, v)' = (-v, x)`.
//!
//! Not a physical model: the exact solution is a circle in phase space,
//! which makes it the reference fixture for integrator accuracy.

use crate::error::SimResult;
use crate::simulation::params::SimpleParams;
use crate::simulation::states::{DerivativeVector, NVec3, StateVector};
use crate::simulation::system::{ensure_particle_count, ParticleSystem};
use crate::visualization::renderer::{draw_particles, Renderer};

const PARTICLE_COLOR: [f64; 3] = [0.4, 0.7, 1.0];

#[derive(Debug, Clone)]
pub struct SimpleSystem {
    state: StateVector,
}

impl Default for SimpleSystem {
    fn default() -> Self {
        Self::from_params(&SimpleParams::default())
    }
}

impl SimpleSystem {
    pub fn new(params: SimpleParams) -> SimResult<Self> {
        params.validate()?;
        Ok(Self::from_params(&params))
    }

    fn from_params(params: &SimpleParams) -> Self {
        let state = StateVector::from_pairs(vec![(
            NVec3::from(params.position),
            NVec3::from(params.velocity),
        )]);
        Self { state }
    }

    /// Exact state at time `t` starting from `initial`.
    pub fn analytic_state(initial: &StateVector, t: f64) -> StateVector {
        let (c, s) = (t.cos(), t.sin());
        StateVector::from_pairs((0..initial.particle_count()).map(|i| {
            let x = initial.position_at(i);
            let v = initial.velocity_at(i);
            (c * x - s * v, c * v + s * x)
        }))
    }
}

impl ParticleSystem for SimpleSystem {
    fn state(&self) -> &StateVector {
        &self.state
    }

    fn set_state(&mut self, state: StateVector) -> SimResult<()> {
        ensure_particle_count(&state, 1)?;
        self.state = state;
        Ok(())
    }

    fn eval_f(&self, state: &StateVector) -> SimResult<DerivativeVector> {
        Ok(StateVector::from_pairs(
            (0..state.particle_count()).map(|i| (-state.velocity_at(i), state.position_at(i))),
        ))
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        draw_particles(renderer, self.state.positions(), NVec3::from(PARTICLE_COLOR), 0.075, 10);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_derivative_is_rotation() {
        let sys = SimpleSystem::default();
        let f = sys.eval_f(sys.state()).unwrap();
        assert_eq!(f.position_at(0), NVec3::new(0.0, 0.5, 0.0));
        assert_eq!(f.velocity_at(0), NVec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_eval_does_not_touch_stored_state() {
        let sys = SimpleSystem::default();
        let before = sys.state().clone();
        let other = StateVector::from_pairs(vec![(NVec3::x(), NVec3::y())]);
        sys.eval_f(&other).unwrap();
        assert_eq!(sys.state(), &before);
    }

    #[test]
    fn test_analytic_state_period() {
        let sys = SimpleSystem::default();
        let back = SimpleSystem::analytic_state(sys.state(), 2.0 * std::f64::consts::PI);
        assert!(back.max_deviation(sys.state()).unwrap() < 1e-12);
    }

    #[test]
    fn test_new_validates_params() {
        let sys = SimpleSystem::new(SimpleParams::default()).unwrap();
        assert_eq!(sys.state(), SimpleSystem::default().state());

        let bad = SimpleParams { position: [f64::NAN, 0.0, 0.0], ..Default::default() };
        assert!(matches!(SimpleSystem::new(bad), Err(SimError::InvalidParameter(_))));
    }

    #[test]
    fn test_set_state_rejects_wrong_count() {
        let mut sys = SimpleSystem::default();
        assert!(sys.set_state(StateVector::zeros(2)).is_err());
    }
}
