//! Outcome of a single environment transition.
use super::Env;

/// Per-step diagnostics attached to a [`Step`], beyond observation and reward.
pub trait Info {}

impl Info for () {}

/// What an environment returns from [`Env::step`]: the commanded action, the
/// observation read after it, the reward of that observation and the episode
/// end flags.
///
/// Fixed-length episodes raise both flags together on their last step.
pub struct Step<E: Env> {
    /// Observation read after the action settled.
    pub obs: E::Obs,

    /// Action that produced this step.
    pub act: E::Act,

    /// Scalar reward computed from `obs`.
    pub reward: f32,

    /// The episode reached a terminal state.
    pub is_terminated: bool,

    /// The episode was cut by its step limit.
    pub is_truncated: bool,

    /// Environment-specific diagnostics.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Bundles the outcome of one transition.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Self {
            obs,
            act,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    /// `true` when no further step may be taken without a reset.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}
