//! Rollouts of a loaded policy in an environment.
mod batch;
mod config;
mod pacing;
pub use batch::Batch;
pub use config::{TrajectoryGeneratorConfig, DEFAULT_POLICY_FILE};
pub use pacing::{FramePacer, TARGET_FPS};

use crate::{
    error::RolloutError,
    record::{NullRecorder, Record, RecordValue, Recorder},
    Env, LoadPolicy, Obs, Policy, RunningMeanStd, ScalingParameters,
};
use anyhow::Result;
use chrono::Local;
use log::{debug, info, trace};
use std::{path::Path, time::Instant};

/// A policy together with the observation statistics it was trained with.
struct Loaded<P> {
    policy: P,
    obs_rms: RunningMeanStd,
}

/// Standardizes `obs` and computes an action from it.
///
/// Returns the standardized observation and the action.
fn act<E, P>(loaded: &mut Loaded<P>, obs: &E::Obs) -> Result<(E::Obs, E::Act)>
where
    E: Env,
    P: Policy<E>,
{
    let x: E::Obs = loaded.obs_rms.forward(obs.view())?.into();
    let act = loaded.policy.sample(&x)?;
    Ok((x, act))
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs a loaded policy in an environment.
///
/// # Rollout
///
/// At every environment step, objects interact as shown below:
///
/// ```mermaid
/// graph LR
///     A[Env]-->|raw Env::Obs|B[RunningMeanStd]
///     B -->|standardized Env::Obs|C[Policy]
///     C -->|Env::Act|A
///     A -->|"reward, done, cost"|D[episode statistics]
/// ```
///
/// The generator owns exactly one environment. A policy and its observation
/// statistics are installed together with [`TrajectoryGenerator::load`] or
/// [`TrajectoryGenerator::load_file_from_disk`]; every rollout method fails
/// with [`RolloutError::NotReady`] before that, without touching the
/// environment.
///
/// All rollouts are sequential: the environment is reset and stepped in place
/// on the caller's thread. Only rendered rollouts are paced in real time, see
/// [`FramePacer`].
pub struct TrajectoryGenerator<E, P>
where
    E: Env,
    P: Policy<E>,
{
    env: E,
    loaded: Option<Loaded<P>>,
    pacer: FramePacer,
    config: TrajectoryGeneratorConfig,
}

impl<E, P> TrajectoryGenerator<E, P>
where
    E: Env,
    P: Policy<E>,
{
    /// Constructs a generator on `env` with the default configuration.
    pub fn new(env: E) -> Self {
        Self {
            env,
            loaded: None,
            pacer: FramePacer::default(),
            config: TrajectoryGeneratorConfig::default(),
        }
    }

    /// Constructs a generator on `env`.
    ///
    /// Fails with [`RolloutError::InvalidArgument`] if `config` is invalid,
    /// see [`TrajectoryGeneratorConfig::validate`].
    pub fn with_config(env: E, config: TrajectoryGeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            env,
            loaded: None,
            pacer: FramePacer::from_fps(config.target_fps)?,
            config,
        })
    }

    /// Builds the environment from `env_config` with the seed in `config`.
    ///
    /// `config` is validated before the environment is built.
    pub fn build(env_config: &E::Config, config: TrajectoryGeneratorConfig) -> Result<Self> {
        config.validate()?;
        let env = E::build(env_config, config.seed)?;
        Self::with_config(env, config)
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The environment, mutably.
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// The loaded policy.
    pub fn policy(&self) -> Option<&P> {
        self.loaded.as_ref().map(|l| &l.policy)
    }

    /// The loaded observation statistics.
    pub fn obs_rms(&self) -> Option<&RunningMeanStd> {
        self.loaded.as_ref().map(|l| &l.obs_rms)
    }

    /// Returns `true` if a policy and its observation statistics are loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Configuration.
    pub fn config(&self) -> &TrajectoryGeneratorConfig {
        &self.config
    }

    /// Installs `policy` and the observation statistics `params`.
    ///
    /// The dimensionality of `params` must match the last axis of the
    /// environment's observation space. On error nothing is installed and a
    /// previously loaded policy stays in place.
    pub fn load(&mut self, policy: P, params: ScalingParameters) -> Result<()> {
        let dim = match self.env.observation_shape().last() {
            Some(dim) => *dim,
            None => {
                return Err(RolloutError::ShapeMismatch {
                    expected: params.dim(),
                    got: vec![],
                }
                .into())
            }
        };
        let mut obs_rms = RunningMeanStd::new(dim)
            .epsilon(self.config.epsilon)
            .bound(self.config.clip_bound);
        obs_rms.load(params)?;

        info!("{}", "=".repeat(55));
        info!("obs.mean: {}", obs_rms.mean());
        info!("obs.std: {}", obs_rms.std());

        self.loaded = Some(Loaded { policy, obs_rms });
        Ok(())
    }

    /// Loads a policy and its observation statistics from a checkpoint file.
    pub fn load_file_from_disk(&mut self, path: impl AsRef<Path>) -> Result<()>
    where
        P: LoadPolicy<E>,
    {
        let path = path.as_ref();
        info!("Load policy from {:?}", path);
        let (policy, params) = P::load(path)?;
        self.load(policy, params)
    }

    /// Runs one episode and returns its return and length.
    ///
    /// If `render` is `true`, the environment is rendered at every step and
    /// the loop is paced at [`TrajectoryGeneratorConfig::target_fps`].
    /// The accumulated cost of the episode is logged but not returned, see
    /// [`TrajectoryGenerator::evaluate_once_with_recorder`].
    pub fn evaluate_once(&mut self, render: bool) -> Result<(f64, usize)> {
        self.evaluate_once_with_recorder(render, &mut NullRecorder::default())
    }

    /// Runs one episode and writes its statistics to `recorder`.
    ///
    /// The written [`Record`] has `Episode return`, `Episode length`,
    /// `Episode cost` and `Timestamp`.
    pub fn evaluate_once_with_recorder<R: Recorder>(
        &mut self,
        render: bool,
        recorder: &mut R,
    ) -> Result<(f64, usize)> {
        let Self {
            env, loaded, pacer, ..
        } = self;
        let loaded = loaded.as_mut().ok_or(RolloutError::NotReady)?;

        let mut x = env.reset()?;
        let mut ret = 0.0;
        let mut costs = 0.0;
        let mut episode_length = 0;

        loop {
            let frame_start = Instant::now();
            if render {
                env.render()?;
            }
            let (_, a) = act::<E, P>(loaded, &x)?;
            let step = env.step(&a)?;
            trace!("Action={:?}", a);

            costs += step.cost();
            ret += step.reward;
            episode_length += 1;

            if render {
                pacer.wait(frame_start);
            }

            let done = step.is_done();
            x = step.obs;
            if done {
                break;
            }
        }

        if render {
            info!(
                "Return: {}\t Length: {}\t Costs:{}",
                ret, episode_length, costs
            );
        } else {
            debug!(
                "Return: {}\t Length: {}\t Costs:{}",
                ret, episode_length, costs
            );
        }

        recorder.write(Record::from_slice(&[
            ("Episode return", RecordValue::Scalar(ret)),
            ("Episode length", RecordValue::Scalar(episode_length as f64)),
            ("Episode cost", RecordValue::Scalar(costs)),
            ("Timestamp", RecordValue::DateTime(Local::now())),
        ]));

        Ok((ret, episode_length))
    }

    /// Runs `num_trajectories` episodes one after another and returns the mean return.
    ///
    /// The policy is put in evaluation mode before the first episode.
    pub fn evaluate(&mut self, num_trajectories: usize) -> Result<f64> {
        self.evaluate_with_recorder(num_trajectories, &mut NullRecorder::default())
    }

    /// Same as [`TrajectoryGenerator::evaluate`], writing one record per episode to `recorder`.
    pub fn evaluate_with_recorder<R: Recorder>(
        &mut self,
        num_trajectories: usize,
        recorder: &mut R,
    ) -> Result<f64> {
        if num_trajectories == 0 {
            return Err(RolloutError::InvalidArgument(
                "num_trajectories must be at least 1".to_string(),
            )
            .into());
        }
        let loaded = self.loaded.as_mut().ok_or(RolloutError::NotReady)?;
        loaded.policy.eval();

        let mut returns = Vec::with_capacity(num_trajectories);
        for ix in 0..num_trajectories {
            let (ret, trajectory_length) = self.evaluate_once_with_recorder(false, recorder)?;
            debug!(
                "Episode {}: return = {}, length = {}",
                ix, ret, trajectory_length
            );
            returns.push(ret);
        }

        Ok(returns.iter().sum::<f64>() / num_trajectories as f64)
    }

    /// Collects `n` transitions with the current policy.
    ///
    /// The environment is reset once at the beginning and again whenever an
    /// episode ends; the count of collected transitions carries over resets.
    /// See [`Batch`] for the convention of standardized `x` and raw `y`.
    ///
    /// An error from the environment or the policy aborts the collection and
    /// no partial batch is returned.
    pub fn get_batch(&mut self, n: usize) -> Result<Batch<E::Obs>> {
        if n == 0 {
            return Err(
                RolloutError::InvalidArgument("batch size must be at least 1".to_string()).into(),
            );
        }
        let Self { env, loaded, .. } = self;
        let loaded = loaded.as_mut().ok_or(RolloutError::NotReady)?;

        let mut batch = Batch::with_capacity(n);
        let mut obs = env.reset()?;
        while batch.len() < n {
            let (x, a) = act::<E, P>(loaded, &obs)?;
            let step = env.step(&a)?;
            let done = step.is_done();
            let y = step.obs;

            // The next input is the observation just pushed to `y`, unless the episode ended.
            obs = if done {
                trace!("Episode ended after {} samples, reset", batch.len() + 1);
                env.reset()?
            } else {
                y.clone()
            };
            batch.push(x, y);
        }

        Ok(batch)
    }

    /// Renders the policy in the environment, episode after episode, forever.
    ///
    /// If `noise` is `false`, the policy is put in evaluation mode first so that
    /// actions are deterministic. Otherwise the mode of the policy is left
    /// as it is. The method only returns on an error.
    pub fn play_policy(&mut self, noise: bool) -> Result<()> {
        self.play_episodes(noise, None)
    }

    /// Same as [`TrajectoryGenerator::play_policy`], stopping after
    /// `max_episodes` episodes if given.
    pub fn play_episodes(&mut self, noise: bool, max_episodes: Option<usize>) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(RolloutError::NotReady)?;
        if !noise {
            loaded.policy.eval();
        }

        let mut episodes = 0;
        while max_episodes.map_or(true, |n| episodes < n) {
            self.env.render()?;
            self.evaluate_once(true)?;
            episodes += 1;
        }
        Ok(())
    }
}

/// Builds a generator and loads the policy file given in `config`.
///
/// The policy file is `config.policy_dir/config.policy_file`, by default
/// `data/policies/model_500_500_tanh_DroneHoverPWMBullet.json`.
pub fn get_generator<E, P>(
    env_config: &E::Config,
    config: TrajectoryGeneratorConfig,
) -> Result<TrajectoryGenerator<E, P>>
where
    E: Env,
    P: LoadPolicy<E>,
{
    let path = config.policy_path();
    let mut generator = TrajectoryGenerator::build(env_config, config)?;
    generator.load_file_from_disk(path)?;
    Ok(generator)
}
