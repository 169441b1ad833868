#![warn(missing_docs)]
//! Core abstractions of robochase.
//!
//! This crate defines the contract between environments and their consumers
//! (training loops, evaluators, hand-written controllers):
//!
//! * [`Env`] - an episodic environment with `reset`/`step`.
//! * [`Step`] - the outcome of a single environment step.
//! * [`Policy`] - a mapping from observations to actions.
//! * [`record`] - a free-form key-value channel used for diagnostics.
//! * [`Evaluator`] - runs episodes with a policy and summarises the returns.
//!
//! The robot environment itself lives in `robochase-env`.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Configurable, Env, Info, Obs, Policy, Step};
pub use error::CoreError;

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};
