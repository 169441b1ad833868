//! Fitness evaluation of a [`Policy`].
use crate::{record::Record, Env, Policy};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Scores a [`Policy`] by running it on an environment.
pub trait Evaluator<E: Env> {
    /// Runs `policy` for the configured number of episodes and returns the
    /// statistics of the episode returns.
    ///
    /// Any internal state of `policy` is left to the caller.
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>;
}
