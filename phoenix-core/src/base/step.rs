//! Environment step.
use super::Env;

/// Additional information returned with each environment step.
pub trait Info {
    /// Safety cost incurred by the step, if the environment reports one.
    fn cost(&self) -> Option<f64> {
        None
    }
}

impl Info for () {}

/// Represents an observation and reward pair `(o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits a [`Step`] object at every interaction step.
pub struct Step<E: Env> {
    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f64,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,

    /// Information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        reward: f64,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }

    /// Cost of the step, `0` when the environment does not report one.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.info.cost().unwrap_or(0.0)
    }
}
