//! SPH smoothing kernels.
//!
//! All kernels have compact support `[0, h]` and evaluate to zero outside it.

use std::f64::consts::PI;

use crate::error::{SimError, SimResult};
use crate::simulation::forces::MIN_SEPARATION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// `315 / (64 pi h^9) * (h^2 - r^2)^3`, used for density.
    Poly6,
    /// `15 / (pi h^6) * (h - r)^3`
    Spiky,
    /// `15 / (2 pi h^3) * (-r^3 / (2 h^3) + r^2 / h^2 + h / (2 r) - 1)`
    Viscosity,
}

impl Kernel {
    pub fn name(self) -> &'static str {
        match self {
            Kernel::Poly6 => "poly6",
            Kernel::Spiky => "spiky",
            Kernel::Viscosity => "viscosity",
        }
    }

    /// Kernel value at distance `r` with smoothing radius `h`.
    ///
    /// The viscosity kernel has an `h / 2r` term and is singular at `r = 0`.
    pub fn evaluate(self, r: f64, h: f64) -> SimResult<f64> {
        if r < 0.0 || r > h {
            return Ok(0.0);
        }
        let value = match self {
            Kernel::Poly6 => {
                let diff = h * h - r * r;
                315.0 * diff.powi(3) / (64.0 * PI * h.powi(9))
            }
            Kernel::Spiky => 15.0 * (h - r).powi(3) / (PI * h.powi(6)),
            Kernel::Viscosity => {
                if r <= MIN_SEPARATION {
                    return Err(SimError::SingularKernel { kernel: self.name(), r });
                }
                let term1 = -r.powi(3) / (2.0 * h.powi(3));
                let term2 = r * r / (h * h);
                let term3 = h / (2.0 * r);
                15.0 * (term1 + term2 + term3 - 1.0) / (2.0 * PI * h.powi(3))
            }
        };
        Ok(value)
    }
}
