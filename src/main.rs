use psim::{ScenarioConfig, Scenario, ParticleSystem, DrawRecorder};
use psim::{bench_water_eval, bench_neighbor_search, bench_integrator_drift};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, looked up under `scenarios/` unless it exists as given
    #[arg(short, default_value = "cloth.yaml")]
    file_name: String,

    /// Override the number of steps derived from `t_end`
    #[arg(long)]
    steps: Option<usize>,

    /// Run the benchmark reports instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };
    ScenarioConfig::from_yaml_file(&config_path)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.bench {
        bench_integrator_drift()?;
        bench_neighbor_search()?;
        bench_water_eval()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;

    match args.steps {
        Some(n) => scenario.advance(n)?,
        None => {
            scenario.run()?;
        }
    }

    // headless frame: record what a renderer would draw
    let mut recorder = DrawRecorder::new();
    scenario.draw(&mut recorder);
    info!(
        t = scenario.t,
        spheres = recorder.sphere_count(),
        lines = recorder.line_count(),
        "final frame"
    );

    println!("i,x,y,z");
    for (i, x) in scenario.system.state().positions().enumerate() {
        println!("{},{:.6},{:.6},{:.6}", i, x.x, x.y, x.z);
    }

    Ok(())
}
