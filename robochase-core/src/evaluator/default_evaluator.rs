//! Default implementation of the [`Evaluator`] trait.
//!
//! This module provides a simple evaluator that runs a fixed number of episodes
//! and calculates the average return across all episodes. The average return
//! is the fitness of a controller when comparing candidates.
use super::Evaluator;
use crate::{
    record::{Record, RecordValue},
    Env, Policy,
};
use anyhow::Result;
use log::info;

/// A default implementation of the [`Evaluator`] trait.
///
/// This evaluator runs a specified number of episodes and calculates the average
/// return (cumulative reward) across all episodes.
///
/// # Examples
///
/// ```ignore
/// let env = RoboboEnv::new(config, ports, 0)?;
/// let mut evaluator = DefaultEvaluator::new(env, 10);
///
/// let record = evaluator.evaluate(&mut policy)?;
/// println!("Average return: {}", record.get_scalar("Episode return")?);
/// ```
pub struct DefaultEvaluator<E: Env> {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// The environment instance used for evaluation.
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    /// Evaluates a policy by running multiple episodes and calculating the average return.
    ///
    /// Each episode is reset with its own index, runs until the environment reports
    /// termination or truncation, and contributes its total reward to the average.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment fails to reset or to step.
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>,
    {
        let mut returns = Vec::with_capacity(self.n_episodes);

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut r_total = 0f32;

            loop {
                let act = policy.sample(&prev_obs);
                let (step, _) = self.env.step(&act)?;
                r_total += step.reward;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }

            info!("Episode {}, return = {}", ix, r_total);
            returns.push(r_total);
        }

        let n = returns.len().max(1) as f32;
        let mean = returns.iter().sum::<f32>() / n;
        let max = returns.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let mut record = Record::from_scalar("Episode return", mean);
        record.insert("Episode return (max)", RecordValue::Scalar(max));
        Ok(record)
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`] around an environment.
    pub fn new(env: E, n_episodes: usize) -> Self {
        Self { n_episodes, env }
    }

    /// Returns a reference to the environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Returns the environment, consuming the evaluator.
    pub fn into_env(self) -> E {
        self.env
    }
}
