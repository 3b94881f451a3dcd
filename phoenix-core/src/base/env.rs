//! Environment.
use super::{Act, Info, Obs, Step};
use anyhow::Result;

/// Represents a simulated environment, typically an MDP.
///
/// The rollout engine is the only reader and writer of an environment:
/// every call runs to completion on the caller's thread and state
/// transitions are strictly sequential.
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

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Renders the current state of the environment.
    fn render(&mut self) -> Result<()>;

    /// Shape of the observation space.
    ///
    /// The last element is the dimensionality checked against the scaling
    /// parameters of a loaded checkpoint.
    fn observation_shape(&self) -> &[usize];
}
