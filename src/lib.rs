pub mod error;
pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use error::{SimError, SimResult};

pub use simulation::states::{StateVector, DerivativeVector, NVec3};
pub use simulation::system::{ParticleSystem, Simulation, SystemKind};
pub use simulation::simple::SimpleSystem;
pub use simulation::pendulum::PendulumSystem;
pub use simulation::cloth::ClothSystem;
pub use simulation::water::WaterSystem;
pub use simulation::kernels::Kernel;
pub use simulation::grid::{SpatialGrid, Neighbor};
pub use simulation::forces::{ForceSet, ForceTerm, Spring, SpringKind};
pub use simulation::params::{SimpleParams, PendulumParams, ClothParams, WaterParams, GridConfig, SpringConstants, RestLengths};
pub use simulation::integrator::{forward_euler_step, trapezoidal_step, rk4_step};
pub use simulation::scenario::Scenario;

pub use configuration::config::{IntegratorConfig, EngineConfig, ParametersConfig, ScenarioConfig};

pub use visualization::renderer::{Renderer, DrawRecorder, DrawCall};

pub use benchmark::benchmark::{bench_water_eval, bench_neighbor_search, bench_integrator_drift};
