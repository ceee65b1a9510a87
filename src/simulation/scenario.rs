//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - the selected particle system (`Simulation`) at t = 0
//! - the simulation clock
//!
//! The driver calls `step` repeatedly (or `run` once) and reads the state
//! back through `draw` or `system.state()`.

use tracing::{debug, info};

use crate::configuration::config::ScenarioConfig;
use crate::error::SimResult;
use crate::simulation::cloth::ClothSystem;
use crate::simulation::engine::Engine;
use crate::simulation::pendulum::PendulumSystem;
use crate::simulation::simple::SimpleSystem;
use crate::simulation::system::{ParticleSystem, Simulation, SystemKind};
use crate::simulation::water::WaterSystem;
use crate::visualization::renderer::Renderer;

pub struct Scenario {
    pub engine: Engine,
    pub system: Simulation,
    pub t: f64,     // simulated time
    pub steps: u64, // steps taken
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        let engine = Engine::from_config(&cfg.engine)?;
        let params = cfg.parameters;

        // Only the selected system's parameter section is read
        let system = match engine.system {
            SystemKind::Simple => Simulation::Simple(SimpleSystem::new(params.simple)?),
            SystemKind::Pendulum => Simulation::Pendulum(PendulumSystem::new(params.pendulum, engine.seed)?),
            SystemKind::Cloth => Simulation::Cloth(ClothSystem::new(params.cloth)?),
            SystemKind::Water => Simulation::Water(WaterSystem::new(params.water)?),
        };

        info!(
            system = ?engine.system,
            integrator = ?engine.integrator,
            particles = system.particle_count(),
            h0 = engine.h0,
            "built scenario"
        );

        Ok(Self {
            engine,
            system,
            t: 0.0,
            steps: 0,
        })
    }

    /// Advance one fixed step of `engine.h0`
    pub fn step(&mut self) -> SimResult<()> {
        self.engine.integrator.take_step(&mut self.system, self.engine.h0)?;
        self.steps += 1;
        // from the step count, so rounding does not accumulate
        self.t = self.steps as f64 * self.engine.h0;
        Ok(())
    }

    /// Take `n` steps
    pub fn advance(&mut self, n: usize) -> SimResult<()> {
        for _ in 0..n {
            self.step()?;
        }
        debug!(t = self.t, steps = self.steps, "advanced");
        Ok(())
    }

    /// Run until `engine.t_end`, returns the number of steps taken
    pub fn run(&mut self) -> SimResult<usize> {
        let n = self.engine.total_steps();
        self.advance(n)?;
        info!(t = self.t, steps = n, "run finished");
        Ok(n)
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        self.system.draw(renderer);
    }
}
