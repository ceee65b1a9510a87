//! Error types for particle system evaluation and integration.

use thiserror::Error;

/// Errors raised while building, evaluating, or stepping a particle system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A state vector must hold (position, velocity) pairs.
    #[error("State vector length {0} is odd; expected (position, velocity) pairs")]
    OddStateLength(usize),

    /// A state or derivative vector does not match the expected shape.
    #[error("Shape mismatch: expected {expected} vectors, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Particle index outside `[0, count)`.
    #[error("Particle index {index} out of range for {count} particles")]
    ParticleIndexOutOfRange { index: usize, count: usize },

    /// Two particles are (numerically) coincident where a direction is needed.
    #[error("Degenerate geometry: particles {first} and {second} are coincident")]
    DegenerateGeometry { first: usize, second: usize },

    /// A smoothing kernel was evaluated at a singular point.
    #[error("Kernel {kernel} is singular at r = {r}")]
    SingularKernel { kernel: &'static str, r: f64 },

    /// Step size must be finite and positive.
    #[error("Invalid step size: {0}")]
    InvalidStep(f64),

    /// The integrated state contains NaN or infinite components.
    #[error("Step produced a non-finite state")]
    NonFiniteState,

    /// A configuration value is out of its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl SimError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

/// Result type for simulation operations.
pub type SimResult<T> = std::result::Result<T, SimError>;
