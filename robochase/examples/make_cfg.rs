use anyhow::Result;
use clap::Parser;
use robochase_env::{CenteringShape, IrLayout, RewardConfig, RoboboEnvConfig};
use std::path::Path;

/// Writes environment configurations of the chase task.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Output directory
    #[arg(long, default_value_t = String::from("./robochase/examples/config"))]
    dir: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let dir = Path::new(&args.dir);
    std::fs::create_dir_all(dir)?;

    // Banded centering, all six infrared channels.
    let config = RoboboEnvConfig::default()
        .steps_per_episode(50)
        .velocity_bounds(-2.0, 2.0);
    config.save(dir.join("env_banded.yaml"))?;

    // Gaussian centering on front and back sensors only.
    let reward = RewardConfig {
        centering: CenteringShape::Gaussian { width: 200.0 },
        gate_on_visibility: false,
        ..RewardConfig::default()
    };
    let config = RoboboEnvConfig::default()
        .steps_per_episode(50)
        .velocity_bounds(-2.0, 2.0)
        .ir_layout(IrLayout::Axial)
        .reward(reward);
    config.save(dir.join("env_gaussian_axial.yaml"))?;

    log::info!("Configurations written in {:?}", dir);
    Ok(())
}
