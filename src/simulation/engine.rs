//! High-level runtime engine settings
//!
//! Selects the particle system, integrator, fixed step and end time
//! used when building and running a `Scenario`

use crate::configuration::config::{EngineConfig, IntegratorConfig};
use crate::error::{SimError, SimResult};
use crate::simulation::system::SystemKind;

#[derive(Debug, Clone)]
pub struct Engine {
    pub system: SystemKind,           // simple, pendulum, cloth or water
    pub integrator: IntegratorConfig, // euler, trapezoidal or rk4
    pub h0: f64,                      // step size
    pub t_end: f64,                   // time end
    pub seed: u64,                    // construction-time randomness
}

impl Engine {
    pub fn from_config(cfg: &EngineConfig) -> SimResult<Self> {
        if !(cfg.h0.is_finite() && cfg.h0 > 0.0) {
            return Err(SimError::InvalidStep(cfg.h0));
        }
        if !(cfg.t_end.is_finite() && cfg.t_end >= 0.0) {
            return Err(SimError::invalid_parameter(format!(
                "t_end must be finite and non-negative, got {}",
                cfg.t_end
            )));
        }
        Ok(Self {
            system: cfg.system,
            integrator: cfg.integrator,
            h0: cfg.h0,
            t_end: cfg.t_end,
            seed: cfg.seed,
        })
    }

    /// Number of fixed steps needed to reach `t_end`.
    pub fn total_steps(&self) -> usize {
        (self.t_end / self.h0 - 1e-9).ceil().max(0.0) as usize
    }
}
