#![warn(missing_docs)]
//! Rollout engine for evaluating trained control policies in simulated environments.
//!
//! A [`TrajectoryGenerator`] owns an environment implementing [`Env`] and,
//! once loaded, a policy implementing [`Policy`] together with the
//! observation statistics ([`RunningMeanStd`]) the policy was trained with.
//! Raw observations are standardized, fed to the policy, and the resulting
//! actions step the environment. Episode statistics (return, length, cost)
//! are aggregated by the generator.
pub mod dummy;
pub mod error;
pub mod record;

mod base;
pub use base::{Act, Env, Info, LoadPolicy, Obs, Policy, Step};

mod running_mean_std;
pub use running_mean_std::{RunningMeanStd, ScalingParameters, DEFAULT_BOUND, DEFAULT_EPSILON};

mod generator;
pub use generator::{
    get_generator, Batch, FramePacer, TrajectoryGenerator, TrajectoryGeneratorConfig,
    DEFAULT_POLICY_FILE, TARGET_FPS,
};
