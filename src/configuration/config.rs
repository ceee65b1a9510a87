//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines the `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – which system, which integrator, step size, end time
//! - [`ParametersConfig`] – optional per-system physical parameters
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A cloth scenario with a stiffer structural spring; every omitted value
//! falls back to its default:
//!
//! ```yaml
//! engine:
//!   system: "cloth"         # simple | pendulum | cloth | water
//!   integrator: "rk4"       # euler | trapezoidal | rk4
//!   h0: 0.005               # fixed step size
//!   t_end: 5.0              # total simulation time
//!   seed: 42                # seeds construction-time jitter
//!
//! parameters:
//!   cloth:
//!     width: 10
//!     height: 10
//!     springs:
//!       structural: 80.0
//! ```
//!
//! The scenario builder maps this configuration into the runtime
//! [`Scenario`](crate::simulation::scenario::Scenario).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::simulation::params::{ClothParams, PendulumParams, SimpleParams, WaterParams};
use crate::simulation::system::SystemKind;

/// Which integrator method used by the engine
/// `integrator: "euler"`, `"trapezoidal"` or `"rk4"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // Forward Euler, one evaluation per step, first order
    ForwardEuler,

    #[serde(rename = "trapezoidal")] // Heun's method, two evaluations per step, second order
    Trapezoidal,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta, four evaluations per step
    Rk4,
}

fn default_seed() -> u64 {
    42
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub system: SystemKind,           // particle system to simulate
    pub integrator: IntegratorConfig, // time integrator advancing the state
    pub h0: f64,                      // fixed time step
    pub t_end: f64,                   // simulated time to run
    #[serde(default = "default_seed")]
    pub seed: u64, // deterministic seed for initial jitter
}

/// Physical parameters, one optional section per system
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ParametersConfig {
    pub simple: SimpleParams,
    pub pendulum: PendulumParams,
    pub cloth: ClothParams,
    pub water: WaterParams,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // system, integrator, timing
    #[serde(default)]
    pub parameters: ParametersConfig, // physical constants for the selected system
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("failed to parse scenario YAML")
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).with_context(|| format!("cannot parse {}", path.display()))
    }
}
