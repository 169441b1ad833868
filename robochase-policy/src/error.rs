//! Errors of the policies.
use thiserror::Error;

/// Errors raised when building a policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// Matrix shapes do not fit together.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// The network input does not match the observation.
    #[error("the network expects {expected} inputs, the observation has {actual} features")]
    InputSize {
        /// Inputs of the first layer.
        expected: usize,

        /// Features of the observation.
        actual: usize,
    },

    /// The network does not output one value per action component.
    #[error("the network has {0} outputs, 2 are required")]
    OutputSize(usize),
}
