use std::time::Instant;

use crate::configuration::config::IntegratorConfig;
use crate::error::SimResult;
use crate::simulation::grid::{brute_force_neighbors, SpatialGrid};
use crate::simulation::params::{GridConfig, WaterParams};
use crate::simulation::simple::SimpleSystem;
use crate::simulation::system::ParticleSystem;
use crate::simulation::water::WaterSystem;

/// Water tank of side `2 * half` filled at `spacing`, with a grid covering it
fn water_tank(half: f64, spacing: f64) -> SimResult<WaterSystem> {
    let params = WaterParams {
        particle_spacing: spacing,
        neighbor_radius: spacing,
        tank_min: [-half, -half, -half],
        tank_max: [half, 0.0, half],
        grid: GridConfig {
            min: [-half, -half, -half],
            max: [half, half, half],
            cell_size: spacing,
        },
        ..Default::default()
    };
    WaterSystem::new(params)
}

/// Time one water `eval_f` for growing particle counts
pub fn bench_water_eval() -> SimResult<()> {
    // Different lattice spacings to test
    let spacings = [0.25, 0.2, 0.125, 0.1, 0.0625];

    println!("N,eval_ms");
    for spacing in spacings {
        let water = water_tank(1.0, spacing)?;
        let n = water.particle_count();

        // Warm up
        water.eval_f(water.state())?;

        let steps = if n <= 2000 { 5 } else { 1 };
        let t0 = Instant::now();
        for _ in 0..steps {
            water.eval_f(water.state())?;
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6}", n, ms);
    }
    Ok(())
}

/// Compare grid neighbor search against the all-pairs scan
pub fn bench_neighbor_search() -> SimResult<()> {
    let spacings = [0.25, 0.125, 0.1];

    for spacing in spacings {
        let water = water_tank(1.0, spacing)?;
        let state = water.state();
        let n = state.particle_count();
        let radius = water.params().neighbor_radius;

        // Time grid: rebuild + every query
        let t0 = Instant::now();
        let mut grid = SpatialGrid::new(water.params().grid);
        grid.rebuild(state);
        let mut grid_pairs = 0;
        for i in 0..n {
            grid_pairs += grid.neighbors(state, i, radius).len();
        }
        let dt_grid = t0.elapsed().as_secs_f64();

        // Time brute force
        let t1 = Instant::now();
        let mut brute_pairs = 0;
        for i in 0..n {
            brute_pairs += brute_force_neighbors(state, i, radius).len();
        }
        let dt_brute = t1.elapsed().as_secs_f64();

        println!(
            "N = {n:5}, grid = {:8.6} s, brute = {:8.6} s, pairs {} / {}",
            dt_grid, dt_brute, grid_pairs, brute_pairs
        );
    }
    Ok(())
}

/// Phase error of each integrator on the simple system after one period
pub fn bench_integrator_drift() -> SimResult<()> {
    let methods = [
        IntegratorConfig::ForwardEuler,
        IntegratorConfig::Trapezoidal,
        IntegratorConfig::Rk4,
    ];
    let period = 2.0 * std::f64::consts::PI;

    println!("dt,method,error");
    for dt in [0.1, 0.05, 0.01] {
        let steps = (period / dt).round() as usize;
        for method in methods {
            let mut sys = SimpleSystem::default();
            let initial = sys.state().clone();
            for _ in 0..steps {
                method.take_step(&mut sys, dt)?;
            }
            let exact = SimpleSystem::analytic_state(&initial, steps as f64 * dt);
            let err = sys.state().max_deviation(&exact)?;
            println!("{},{:?},{:.3e}", dt, method, err);
        }
    }
    Ok(())
}
