use anyhow::Result;
use robochase_core::{record::BufferedRecorder, util, Policy};
use robochase_env::{
    KinematicWorld, KinematicWorldConfig, RoboboAct, RoboboEnv, RoboboEnvConfig, RoboboObs,
};
use std::path::Path;

const N_EPISODES: usize = 5;
const STEPS_PER_EPISODE: usize = 30;
const MODEL_DIR: &str = "./robochase-env/examples/model/random_walk_sim";

/// Random increments, with a bias to turn towards the last seen target.
struct RandomPolicy {
    rng: fastrand::Rng,
}

impl Policy<RoboboEnv> for RandomPolicy {
    fn sample(&mut self, obs: &RoboboObs) -> RoboboAct {
        let turn = match obs.target_xy[0] {
            x if x < 0 => -1.0,
            x if x > 100 => 1.0,
            x => (x - 50) as f32 / 50.0,
        };
        let forward = self.rng.f32() * 2.0 - 0.5;
        RoboboAct::new(forward, turn + 0.5 * (self.rng.f32() - 0.5))
    }
}

fn run(n_episodes: usize, model_dir: impl AsRef<Path>) -> Result<()> {
    let world = KinematicWorld::new(KinematicWorldConfig::default());
    let config = RoboboEnvConfig::default()
        .steps_per_episode(STEPS_PER_EPISODE)
        .velocity_bounds(-5.0, 5.0)
        .target_walk_speed(2.0)
        .settle_millis(0);
    let mut env = RoboboEnv::new(config, world.ports(), 42)?;
    let mut policy = RandomPolicy {
        rng: fastrand::Rng::with_seed(42),
    };
    let mut recorder = BufferedRecorder::new();

    util::eval_with_recorder(&mut env, &mut policy, n_episodes, &mut recorder)?;

    let history = env.into_history();
    if let Some(summary) = history.summary() {
        log::info!(
            "{} episodes, mean return = {:.2}, std = {:.2}, max = {:.2}, min = {:.2}",
            summary.returns.len(),
            summary.mean,
            summary.std,
            summary.max,
            summary.min
        );
    }

    std::fs::create_dir_all(model_dir.as_ref())?;
    history.write_csv(model_dir.as_ref().join("history.csv"))?;

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run(N_EPISODES, MODEL_DIR)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use robochase_env::History;
    use tempdir::TempDir;

    #[test]
    fn test_random_walk_sim() -> Result<()> {
        let model_dir = TempDir::new("random_walk_sim")?;
        run(2, model_dir.path())?;

        let history = History::read_csv(model_dir.path().join("history.csv"))?;
        assert_eq!(history.len(), 2);
        assert!(history.rewards().all(|r| r.len() == STEPS_PER_EPISODE));

        Ok(())
    }
}
