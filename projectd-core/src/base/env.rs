//! Environment.
use super::{Act, Info, Obs, Step};
use crate::{record::Record, BoxSpace};
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// Interaction with an environment is strictly sequential: every method takes
/// `&mut self`, so two `step` or `reset` calls can never interleave.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns the initial observation with an info mapping.
    fn reset(&mut self) -> Result<(Self::Obs, Record)>;

    /// Resets the environment with a given index.
    ///
    /// The index is used in an arbitrary way, typically as an episode seed
    /// during evaluation. The default implementation ignores it.
    fn reset_with_index(&mut self, _ix: usize) -> Result<(Self::Obs, Record)> {
        self.reset()
    }

    /// Performs an environment step.
    ///
    /// The returned [`Record`] holds values worth logging for this step
    /// (e.g., the raw observation and action).
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Bounds of the observation vector.
    fn observation_space(&self) -> BoxSpace;

    /// Bounds of the action vector.
    fn action_space(&self) -> BoxSpace;

    /// Releases resources held by the environment. Calling it twice is a no-op.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
