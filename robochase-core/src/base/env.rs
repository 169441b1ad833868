//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an episodic environment, typically an MDP.
///
/// The environment is not reentrant. Calls to [`Env::reset`] and [`Env::step`]
/// are expected to be serialized by the caller.
pub trait Env {
    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Starts a new episode and returns the initial observation.
    ///
    /// `seed` re-seeds any randomness owned by the environment. The returned
    /// [`Record`] is a free-form diagnostic channel, not a stable API.
    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Obs, Record)>;

    /// Performs an environment step.
    ///
    /// An `Err` means the step could not be carried out, for example because the
    /// robot could not be commanded. Data recorded by earlier steps is not affected.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Resets the environment with a given index.
    ///
    /// The index is used as a random seed, which makes evaluation runs reproducible.
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        let (obs, _) = self.reset(Some(ix as u64))?;
        Ok(obs)
    }
}
