use anyhow::Result;
use clap::Parser;
use robochase::util;
use robochase_core::{record::BufferedRecorder, Configurable, Policy};
use robochase_env::{KinematicWorldConfig, RoboboAct, RoboboEnv, RoboboEnvConfig, RoboboObs};
use robochase_policy::MlpPolicy;

const MODEL_DIR: &str = "./robochase/examples/model/chase_sim";

/// Runs episodes of the chase task in the kinematic simulator.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of episodes
    #[arg(long, default_value_t = 5)]
    episodes: usize,

    /// Environment configuration in YAML, defaults are used if not given
    #[arg(long)]
    config: Option<String>,

    /// MLP policy configuration in YAML, a steering heuristic is used if not given
    #[arg(long)]
    policy: Option<String>,

    /// Directory where the history is written
    #[arg(long, default_value_t = MODEL_DIR.to_string())]
    out: String,

    /// Seed of the target random walk
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Log the reward breakdown of every step
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

/// Turns towards the target, or towards the side it left by, and creeps forward.
struct SeekPolicy;

impl Policy<RoboboEnv> for SeekPolicy {
    fn sample(&mut self, obs: &RoboboObs) -> RoboboAct {
        let v = obs.wheel_velocity;
        let turn = match obs.target_xy[0] {
            x if x < 0 => -0.5,
            x if x > 100 => 0.5,
            x => (x - 50) as f32 / 100.0,
        };
        // Damp the current turn rate before adding the new one.
        let damp = -0.25 * (v[0] - v[1]);
        let forward = if obs.is_target_visible() { 0.5 } else { 0.0 };
        RoboboAct::new(forward, turn + damp)
    }
}

fn env_config(args: &Args) -> Result<RoboboEnvConfig> {
    let config = match &args.config {
        Some(path) => RoboboEnvConfig::load(path)?,
        None => RoboboEnvConfig::default()
            .steps_per_episode(50)
            .velocity_bounds(-2.0, 2.0)
            .target_walk_speed(5.0),
    };
    Ok(config.settle_millis(0).verbose(args.verbose))
}

/// Number of recorded steps where the target was out of sight.
fn lost_steps(recorder: &BufferedRecorder) -> usize {
    recorder
        .iter()
        .filter(|r| r.get_scalar("reward_lost").is_ok_and(|v| v < 0.0))
        .count()
}

fn run(args: &Args) -> Result<BufferedRecorder> {
    let (mut env, _world) =
        util::simulated_env(env_config(args)?, KinematicWorldConfig::default(), args.seed)?;
    let mut recorder = BufferedRecorder::new();

    let returns = match &args.policy {
        Some(path) => {
            let mut policy = MlpPolicy::build_from_path(path)?;
            robochase_core::util::eval_with_recorder(
                &mut env,
                &mut policy,
                args.episodes,
                &mut recorder,
            )?
        }
        None => robochase_core::util::eval_with_recorder(
            &mut env,
            &mut SeekPolicy,
            args.episodes,
            &mut recorder,
        )?,
    };
    log::info!("Returns: {:?}", returns);

    log::info!(
        "Target out of sight in {} of {} steps",
        lost_steps(&recorder),
        recorder.len()
    );

    util::save_history(&env.into_history(), &args.out)?;
    Ok(recorder)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    run(&args)?;
    Ok(())
}
