//! Deterministic environment and policy used for tests.
use crate::{Env, Info, Policy, Step};
use anyhow::{bail, Result};
use ndarray::{ArrayD, IxDyn};

/// Configuration of [`ScriptedEnv`].
#[derive(Clone, Debug)]
pub struct ScriptedEnvConfig {
    /// Dimensionality of observations.
    pub dim: usize,

    /// Number of steps after which every episode is done.
    pub episode_length: usize,

    /// Reward of every step in the first episode.
    pub reward: f64,

    /// Increase of the per-step reward from one episode to the next.
    pub reward_increment: f64,

    /// Cost reported in the step information, if any.
    pub cost: Option<f64>,

    /// Fails the step with this global index (counted from 0 over all episodes).
    pub fail_at_step: Option<usize>,
}

impl Default for ScriptedEnvConfig {
    fn default() -> Self {
        Self {
            dim: 4,
            episode_length: 3,
            reward: 1.0,
            reward_increment: 0.0,
            cost: None,
            fail_at_step: None,
        }
    }
}

/// Step information of [`ScriptedEnv`].
#[derive(Clone, Debug)]
pub struct ScriptedInfo {
    cost: Option<f64>,
}

impl Info for ScriptedInfo {
    fn cost(&self) -> Option<f64> {
        self.cost
    }
}

/// An environment following a fixed script.
///
/// Every element of the observation at step `t` of episode `k` (the first
/// episode after the first reset is `k = 1`) equals `100 k + t + 0.1 i`,
/// where `i` is the element index. The environment also counts calls to
/// its methods.
#[derive(Debug)]
pub struct ScriptedEnv {
    config: ScriptedEnvConfig,
    shape: Vec<usize>,
    episode: usize,
    t: usize,
    total_steps: usize,

    /// Number of calls to [`Env::reset`].
    pub n_resets: usize,

    /// Number of calls to [`Env::render`].
    pub n_renders: usize,
}

impl ScriptedEnv {
    /// Observation at step `t` of episode `episode`.
    pub fn obs_at(dim: usize, episode: usize, t: usize) -> ArrayD<f64> {
        ArrayD::from_shape_fn(IxDyn(&[dim]), |ix| {
            100.0 * episode as f64 + t as f64 + 0.1 * ix[0] as f64
        })
    }

    /// Total number of steps over all episodes.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }
}

impl Env for ScriptedEnv {
    type Config = ScriptedEnvConfig;
    type Obs = ArrayD<f64>;
    type Act = ArrayD<f64>;
    type Info = ScriptedInfo;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            shape: vec![config.dim],
            episode: 0,
            t: 0,
            total_steps: 0,
            n_resets: 0,
            n_renders: 0,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.n_resets += 1;
        self.episode += 1;
        self.t = 0;
        Ok(Self::obs_at(self.config.dim, self.episode, 0))
    }

    fn step(&mut self, _a: &Self::Act) -> Result<Step<Self>> {
        if self.episode == 0 {
            bail!("step() called before reset()");
        }
        if Some(self.total_steps) == self.config.fail_at_step {
            bail!("Simulation fault at step {}", self.total_steps);
        }
        self.t += 1;
        self.total_steps += 1;

        let reward =
            self.config.reward + self.config.reward_increment * (self.episode - 1) as f64;
        let obs = Self::obs_at(self.config.dim, self.episode, self.t);
        let is_terminated = self.t >= self.config.episode_length;
        let info = ScriptedInfo {
            cost: self.config.cost,
        };
        Ok(Step::new(obs, reward, is_terminated, false, info))
    }

    fn render(&mut self) -> Result<()> {
        self.n_renders += 1;
        Ok(())
    }

    fn observation_shape(&self) -> &[usize] {
        &self.shape
    }
}

/// A policy returning its input as action and remembering every input.
#[derive(Debug)]
pub struct EchoPolicy {
    /// Observations given to [`Policy::sample`], in order.
    pub inputs: Vec<ArrayD<f64>>,
    train: bool,
}

impl Default for EchoPolicy {
    fn default() -> Self {
        Self {
            inputs: vec![],
            train: true,
        }
    }
}

impl Policy<ScriptedEnv> for EchoPolicy {
    fn sample(&mut self, obs: &ArrayD<f64>) -> Result<ArrayD<f64>> {
        self.inputs.push(obs.clone());
        Ok(obs.clone())
    }

    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }
}
