//! Fixed-step time integrators for particle systems
//!
//! Provides forward Euler, trapezoidal (Heun) and classic RK4. They only use
//! `state`, `eval_f` and `set_state` from [`ParticleSystem`], so any system
//! works with any integrator.
//!
//! Every step rejects a non-positive or non-finite `dt`, and refuses to commit
//! a state containing NaN or infinity; in both cases the system keeps its
//! previous state.

use tracing::trace;

use crate::configuration::config::IntegratorConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::states::StateVector;
use crate::simulation::system::ParticleSystem;

fn check_step(dt: f64) -> SimResult<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidStep(dt))
    }
}

fn commit<S: ParticleSystem + ?Sized>(sys: &mut S, new_state: StateVector) -> SimResult<()> {
    if !new_state.is_finite() {
        return Err(SimError::NonFiniteState);
    }
    sys.set_state(new_state)
}

/// Advance by one forward Euler step
/// x_n+1 = x_n + dt f(x_n)
pub fn forward_euler_step<S: ParticleSystem + ?Sized>(sys: &mut S, dt: f64) -> SimResult<()> {
    check_step(dt)?;
    let x0 = sys.state().clone();
    let f0 = sys.eval_f(&x0)?;
    let x1 = x0.combine(&[(dt, &f0)])?;
    commit(sys, x1)
}

/// Advance by one trapezoidal (Heun) step, two evaluations
pub fn trapezoidal_step<S: ParticleSystem + ?Sized>(sys: &mut S, dt: f64) -> SimResult<()> {
    check_step(dt)?;
    let x0 = sys.state().clone();

    // f0 at the start of the step
    let f0 = sys.eval_f(&x0)?;

    // Euler predictor: x~ = x_n + dt f0
    let predicted = x0.combine(&[(dt, &f0)])?;
    let f1 = sys.eval_f(&predicted)?;

    // x_n+1 = x_n + dt/2 (f0 + f1)
    let half_dt = 0.5 * dt;
    let x1 = x0.combine(&[(half_dt, &f0), (half_dt, &f1)])?;
    commit(sys, x1)
}

/// Advance by one classic fourth-order Runge-Kutta step, four evaluations
pub fn rk4_step<S: ParticleSystem + ?Sized>(sys: &mut S, dt: f64) -> SimResult<()> {
    check_step(dt)?;
    let x0 = sys.state().clone();
    let half_dt = 0.5 * dt;

    let k1 = sys.eval_f(&x0)?;
    let k2 = sys.eval_f(&x0.combine(&[(half_dt, &k1)])?)?;
    let k3 = sys.eval_f(&x0.combine(&[(half_dt, &k2)])?)?;
    let k4 = sys.eval_f(&x0.combine(&[(dt, &k3)])?)?;

    // x_n+1 = x_n + dt/6 (k1 + 2 k2 + 2 k3 + k4)
    let x1 = x0.combine(&[
        (dt / 6.0, &k1),
        (dt / 3.0, &k2),
        (dt / 3.0, &k3),
        (dt / 6.0, &k4),
    ])?;
    commit(sys, x1)
}

impl IntegratorConfig {
    /// Advance `sys` by one step of size `dt` with this method
    pub fn take_step<S: ParticleSystem + ?Sized>(&self, sys: &mut S, dt: f64) -> SimResult<()> {
        trace!(method = ?self, dt, "take_step");
        match self {
            IntegratorConfig::ForwardEuler => forward_euler_step(sys, dt),
            IntegratorConfig::Trapezoidal => trapezoidal_step(sys, dt),
            IntegratorConfig::Rk4 => rk4_step(sys, dt),
        }
    }

    /// Derivative evaluations per step.
    pub fn evaluations(&self) -> usize {
        match self {
            IntegratorConfig::ForwardEuler => 1,
            IntegratorConfig::Trapezoidal => 2,
            IntegratorConfig::Rk4 => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::simple::SimpleSystem;
    use crate::simulation::states::{DerivativeVector, NVec3};
    use crate::visualization::renderer::Renderer;

    /// Constant unit acceleration along x, one particle
    struct ConstantAccel {
        state: StateVector,
    }

    impl ParticleSystem for ConstantAccel {
        fn state(&self) -> &StateVector {
            &self.state
        }
        fn set_state(&mut self, state: StateVector) -> SimResult<()> {
            self.state = state;
            Ok(())
        }
        fn eval_f(&self, state: &StateVector) -> SimResult<DerivativeVector> {
            Ok(StateVector::from_pairs(vec![(state.velocity_at(0), NVec3::x())]))
        }
        fn draw(&self, _renderer: &mut dyn Renderer) {}
    }

    /// eval_f returns the wrong number of vectors
    struct Broken {
        state: StateVector,
    }

    impl ParticleSystem for Broken {
        fn state(&self) -> &StateVector {
            &self.state
        }
        fn set_state(&mut self, state: StateVector) -> SimResult<()> {
            self.state = state;
            Ok(())
        }
        fn eval_f(&self, _state: &StateVector) -> SimResult<DerivativeVector> {
            Ok(StateVector::zeros(3))
        }
        fn draw(&self, _renderer: &mut dyn Renderer) {}
    }

    #[test]
    fn test_euler_single_step() {
        let mut sys = SimpleSystem::default();
        forward_euler_step(&mut sys, 0.1).unwrap();
        assert!((sys.state().position_at(0) - NVec3::new(0.5, 0.05, 0.0)).norm() < 1e-12);
        assert!((sys.state().velocity_at(0) - NVec3::new(0.05, -0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_second_order_methods_exact_for_constant_acceleration() {
        // x(t) = t^2 / 2 is integrated exactly by trapezoidal and RK4
        for method in [IntegratorConfig::Trapezoidal, IntegratorConfig::Rk4] {
            let mut sys = ConstantAccel { state: StateVector::zeros(1) };
            for _ in 0..10 {
                method.take_step(&mut sys, 0.1).unwrap();
            }
            assert!((sys.state().position_at(0).x - 0.5).abs() < 1e-12, "{method:?}");
            assert!((sys.state().velocity_at(0).x - 1.0).abs() < 1e-12, "{method:?}");
        }
    }

    #[test]
    fn test_invalid_step_rejected() {
        let mut sys = SimpleSystem::default();
        let before = sys.state().clone();
        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(rk4_step(&mut sys, dt), Err(SimError::InvalidStep(_))));
        }
        assert_eq!(sys.state(), &before);
    }

    #[test]
    fn test_shape_mismatch_fails_fast() {
        let mut sys = Broken { state: StateVector::zeros(1) };
        assert_eq!(
            forward_euler_step(&mut sys, 0.1).unwrap_err(),
            SimError::ShapeMismatch { expected: 2, found: 6 }
        );
    }

    #[test]
    fn test_non_finite_state_not_committed() {
        let mut sys = ConstantAccel {
            state: StateVector::from_pairs(vec![(NVec3::zeros(), NVec3::new(f64::MAX, 0.0, 0.0))]),
        };
        let before = sys.state().clone();
        assert_eq!(
            forward_euler_step(&mut sys, 1e308).unwrap_err(),
            SimError::NonFiniteState
        );
        assert_eq!(sys.state(), &before);
    }

    #[test]
    fn test_evaluation_counts() {
        assert_eq!(IntegratorConfig::ForwardEuler.evaluations(), 1);
        assert_eq!(IntegratorConfig::Trapezoidal.evaluations(), 2);
        assert_eq!(IntegratorConfig::Rk4.evaluations(), 4);
    }
}
