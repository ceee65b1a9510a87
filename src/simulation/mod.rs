pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod scenario;
pub mod system;
pub mod simple;
pub mod pendulum;
pub mod cloth;
pub mod kernels;
pub mod grid;
pub mod water;
