//! A target-chasing environment for wheeled robots.
//!
//! Robochase consists of the following crates:
//!
//! * [robochase-core](robochase_core) provides the traits shared by
//!   environments and policies (`Env`, `Policy`, `Step`), a key-value
//!   [`Record`](robochase_core::record::Record) channel for diagnostics and
//!   an evaluator computing the fitness of a policy.
//! * [robochase-env](robochase_env) implements the Robobo chase task: sensor
//!   normalization, target memory, reward shaping, fixed-length episodes and
//!   the episode history. The robot is reached through narrow ports, with a
//!   kinematic simulator included.
//! * [robochase-policy](robochase_policy) includes policies that do not need a
//!   deep learning backend: a feed-forward network and gesture teleoperation.
//! * `robochase` re-exports the above and carries runnable examples.
pub use robochase_core as core;
pub use robochase_env as env;
pub use robochase_policy as policy;

pub mod util;
