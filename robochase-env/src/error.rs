//! Errors of the environment.
use thiserror::Error;

/// Failure reported by a robot or simulator port.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("transport failure in {operation}: {message}")]
pub struct TransportError {
    /// The port operation that failed, e.g. `move_wheels`.
    pub operation: &'static str,

    /// Message given by the port.
    pub message: String,
}

impl TransportError {
    /// Constructs a [`TransportError`].
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Errors of [`RoboboEnv`](crate::RoboboEnv).
///
/// Sensor dropouts never show up here. They are replaced by sentinel values
/// in the observation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    /// The configuration is inconsistent; raised at construction.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The robot could not be commanded. The current episode is aborted.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// `step()` was called before the first `reset()`.
    #[error("step() called before reset()")]
    NotReset,

    /// `step()` was called after the episode reached its last step.
    #[error("episode finished after {0} steps, call reset() before stepping again")]
    EpisodeFinished(usize),

    /// The action contains non-finite components.
    #[error("invalid action: {0}")]
    InvalidAction(String),
}
