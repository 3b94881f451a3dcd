//! Policy.
use super::Env;
use crate::ScalingParameters;
use anyhow::Result;
use std::path::Path;

/// A policy on an environment.
///
/// Policy is a mapping from a normalized observation to an action.
/// The mapping can be either of deterministic or stochastic; stochastic
/// action selection is only allowed in training mode.
pub trait Policy<E: Env> {
    /// Sample an action given a normalized observation.
    ///
    /// Inference has no learning side effects.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act>;

    /// Set the policy to training mode, enabling stochastic action selection.
    fn train(&mut self);

    /// Set the policy to evaluation mode, disabling exploration noise.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;
}

/// A policy that can be loaded from a checkpoint file together with the
/// observation statistics it was trained with.
pub trait LoadPolicy<E: Env>: Policy<E> + Sized {
    /// Loads the policy and its scaling parameters from `path`.
    ///
    /// Both are returned together or not at all.
    fn load(path: impl AsRef<Path>) -> Result<(Self, ScalingParameters)>;
}
