//! Helpers shared by the examples.
use anyhow::Result;
use log::info;
use robochase_env::{History, KinematicWorld, KinematicWorldConfig, RoboboEnv, RoboboEnvConfig};
use std::path::Path;

/// Builds a [`RoboboEnv`] on a fresh [`KinematicWorld`].
///
/// The world handle is returned so that callers can inspect the scene.
pub fn simulated_env(
    config: RoboboEnvConfig,
    world_config: KinematicWorldConfig,
    seed: u64,
) -> Result<(RoboboEnv, KinematicWorld)> {
    let world = KinematicWorld::new(world_config);
    let env = RoboboEnv::new(config, world.ports(), seed)?;
    Ok((env, world))
}

/// Logs the return statistics of `history` and writes it to `dir/history.csv`.
pub fn save_history(history: &History, dir: impl AsRef<Path>) -> Result<()> {
    match history.summary() {
        Some(s) => info!(
            "{} episodes, mean return = {:.2}, std = {:.2}, max = {:.2}, min = {:.2}",
            s.returns.len(),
            s.mean,
            s.std,
            s.max,
            s.min
        ),
        None => info!("No episode recorded"),
    }

    std::fs::create_dir_all(dir.as_ref())?;
    let path = dir.as_ref().join("history.csv");
    history.write_csv(&path)?;
    info!("History saved in {:?}", path);
    Ok(())
}
