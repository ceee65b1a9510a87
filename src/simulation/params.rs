//! Physical parameters for each particle system
//!
//! Every system is constructed from an explicit parameter value:
//! - `SimpleParams`: initial condition of the oscillator fixture
//! - `PendulumParams`: chain length, spring, drag, initial jitter
//! - `ClothParams`: grid size, spacing, per-category springs
//! - `WaterParams`: SPH constants, tank and grid bounds
//!
//! All structs deserialize from YAML with every field optional; missing
//! fields fall back to the documented defaults. `validate` rejects values the
//! force models cannot handle.

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::states::NVec3;

fn require_positive(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid_parameter(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

fn require_non_negative(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid_parameter(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

fn require_finite(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid_parameter(format!("{name} must be finite")))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimpleParams {
    pub position: [f64; 3], // initial position
    pub velocity: [f64; 3], // initial velocity
}

impl Default for SimpleParams {
    fn default() -> Self {
        Self {
            position: [0.5, 0.0, 0.0],
            velocity: [0.0, -0.5, 0.0],
        }
    }
}

impl SimpleParams {
    pub fn validate(&self) -> SimResult<()> {
        for c in self.position.iter().chain(self.velocity.iter()) {
            require_finite("simple initial state", *c)?;
        }
        Ok(())
    }
}

/// Spring chain hanging from a fixed first particle.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PendulumParams {
    pub particle_count: usize, // including the anchor
    pub mass: f64,             // per particle
    pub gravity: f64,          // acceleration along y
    pub drag: f64,             // linear viscous drag coefficient
    pub spring_constant: f64,
    pub rest_length: f64,
    pub anchor: [f64; 3], // position of particle 0
    pub jitter: f64,      // half-width of the uniform offset between consecutive particles
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            particle_count: 5,
            mass: 1.0,
            gravity: -9.8,
            drag: 0.5,
            spring_constant: 30.0,
            rest_length: 0.1,
            anchor: [-0.5, 1.0, 0.0],
            jitter: 0.5,
        }
    }
}

impl PendulumParams {
    pub fn validate(&self) -> SimResult<()> {
        if self.particle_count == 0 {
            return Err(SimError::invalid_parameter(
                "pendulum needs at least one particle",
            ));
        }
        require_positive("pendulum mass", self.mass)?;
        require_finite("pendulum gravity", self.gravity)?;
        require_non_negative("pendulum drag", self.drag)?;
        require_non_negative("pendulum spring constant", self.spring_constant)?;
        require_non_negative("pendulum rest length", self.rest_length)?;
        require_non_negative("pendulum jitter", self.jitter)?;
        for c in self.anchor {
            require_finite("pendulum anchor", c)?;
        }
        Ok(())
    }
}

/// Spring constants per cloth spring category.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SpringConstants {
    pub structural: f64,
    pub shear: f64,
    pub flexion: f64,
}

impl Default for SpringConstants {
    fn default() -> Self {
        Self {
            structural: 50.0,
            shear: 50.0,
            flexion: 50.0,
        }
    }
}

/// Rest lengths per cloth spring category.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RestLengths {
    pub structural: f64,
    pub shear: f64,
    pub flexion: f64,
}

impl RestLengths {
    /// Rest lengths of an undeformed grid with the given spacing:
    /// one cell edge, one cell diagonal, two cell edges.
    pub fn from_spacing(spacing: f64) -> Self {
        Self {
            structural: spacing,
            shear: spacing * std::f64::consts::SQRT_2,
            flexion: 2.0 * spacing,
        }
    }
}

/// W x H cloth sheet pinned at its two top corners.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClothParams {
    pub width: usize,  // particles per row (W)
    pub height: usize, // rows (H)
    pub spacing: f64,  // initial distance between adjacent particles
    pub origin: [f64; 3], // top-left particle
    pub mass: f64,
    pub gravity: f64,
    pub drag: f64,
    pub springs: SpringConstants,
    /// Derived from `spacing` when omitted.
    pub rest_lengths: Option<RestLengths>,
}

impl Default for ClothParams {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            spacing: 0.2,
            origin: [0.4, 1.0, 0.0],
            mass: 0.1,
            gravity: -9.8,
            drag: 0.5,
            springs: SpringConstants::default(),
            rest_lengths: None,
        }
    }
}

impl ClothParams {
    pub fn rest_lengths(&self) -> RestLengths {
        self.rest_lengths
            .unwrap_or_else(|| RestLengths::from_spacing(self.spacing))
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.width < 2 || self.height < 1 {
            return Err(SimError::invalid_parameter(format!(
                "cloth grid must be at least 2x1, got {}x{}",
                self.width, self.height
            )));
        }
        require_positive("cloth spacing", self.spacing)?;
        require_positive("cloth mass", self.mass)?;
        require_finite("cloth gravity", self.gravity)?;
        require_non_negative("cloth drag", self.drag)?;
        require_non_negative("structural spring constant", self.springs.structural)?;
        require_non_negative("shear spring constant", self.springs.shear)?;
        require_non_negative("flexion spring constant", self.springs.flexion)?;
        let rest = self.rest_lengths();
        require_non_negative("structural rest length", rest.structural)?;
        require_non_negative("shear rest length", rest.shear)?;
        require_non_negative("flexion rest length", rest.flexion)?;
        for c in self.origin {
            require_finite("cloth origin", c)?;
        }
        Ok(())
    }
}

/// Axis-aligned uniform grid used for the SPH neighbor search.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub min: [f64; 3], // minimum corner
    pub max: [f64; 3], // maximum corner
    pub cell_size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min: [-1.0, -1.0, -1.0],
            max: [1.0, 1.0, 1.0],
            cell_size: 0.25,
        }
    }
}

impl GridConfig {
    /// Number of cells along each axis.
    pub fn dims(&self) -> [usize; 3] {
        let mut dims = [0; 3];
        for (axis, d) in dims.iter_mut().enumerate() {
            let extent = self.max[axis] - self.min[axis];
            // tolerate float noise when the extent is a multiple of the cell size
            *d = ((extent / self.cell_size) - 1e-9).ceil().max(0.0) as usize;
        }
        dims
    }

    pub fn min_corner(&self) -> NVec3 {
        NVec3::from(self.min)
    }

    pub fn validate(&self) -> SimResult<()> {
        require_positive("grid cell size", self.cell_size)?;
        for axis in 0..3 {
            require_finite("grid bounds", self.min[axis])?;
            require_finite("grid bounds", self.max[axis])?;
            if self.max[axis] <= self.min[axis] {
                return Err(SimError::invalid_parameter(format!(
                    "grid bounds are empty along axis {axis}"
                )));
            }
        }
        Ok(())
    }
}

/// Smoothed particle hydrodynamics constants.
///
/// `pressure_scale` and `acceleration_scale` are empirically tuned for the
/// default tank and do not carry over to other parameter regimes.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WaterParams {
    pub mass: f64,
    pub gravity: f64,
    pub kernel_radius: f64,    // h
    pub gas_constant: f64,     // k
    pub viscosity: f64,        // mu
    pub rest_density: f64,     // rho_0
    pub density_floor: f64,    // added to every density
    pub pressure_scale: f64,
    pub acceleration_scale: f64,
    pub neighbor_radius: f64,
    pub particle_spacing: f64, // initial lattice spacing
    pub tank_min: [f64; 3],    // initial block, inclusive
    pub tank_max: [f64; 3],    // initial block, exclusive
    pub grid: GridConfig,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            mass: 0.1,
            gravity: -9.8,
            kernel_radius: 1.0,
            gas_constant: 1.0,
            viscosity: 1.0,
            rest_density: 1.0,
            density_floor: 1e-3,
            pressure_scale: 1000.0,
            acceleration_scale: 0.1,
            neighbor_radius: 0.25,
            particle_spacing: 0.25,
            tank_min: [-1.0, -1.0, -1.0],
            tank_max: [1.0, 0.0, 1.0],
            grid: GridConfig::default(),
        }
    }
}

impl WaterParams {
    pub fn validate(&self) -> SimResult<()> {
        require_positive("water mass", self.mass)?;
        require_finite("water gravity", self.gravity)?;
        require_positive("kernel radius", self.kernel_radius)?;
        require_non_negative("gas constant", self.gas_constant)?;
        require_non_negative("viscosity", self.viscosity)?;
        require_non_negative("rest density", self.rest_density)?;
        require_positive("density floor", self.density_floor)?;
        require_finite("pressure scale", self.pressure_scale)?;
        require_finite("acceleration scale", self.acceleration_scale)?;
        require_positive("neighbor radius", self.neighbor_radius)?;
        require_positive("particle spacing", self.particle_spacing)?;
        self.grid.validate()?;

        // the 3x3x3 cell scan only covers one cell in every direction
        if self.neighbor_radius > self.grid.cell_size {
            return Err(SimError::invalid_parameter(format!(
                "neighbor radius {} exceeds grid cell size {}",
                self.neighbor_radius, self.grid.cell_size
            )));
        }
        // kernels vanish beyond h, so every neighbor must lie inside it
        if self.neighbor_radius > self.kernel_radius {
            return Err(SimError::invalid_parameter(format!(
                "neighbor radius {} exceeds kernel radius {}",
                self.neighbor_radius, self.kernel_radius
            )));
        }
        for axis in 0..3 {
            require_finite("tank bounds", self.tank_min[axis])?;
            require_finite("tank bounds", self.tank_max[axis])?;
        }
        Ok(())
    }
}
