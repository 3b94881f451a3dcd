//! Configuration of [`TrajectoryGenerator`](super::TrajectoryGenerator).
use super::pacing::TARGET_FPS;
use crate::{
    error::RolloutError,
    running_mean_std::{DEFAULT_BOUND, DEFAULT_EPSILON},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Default name of the policy file loaded by [`get_generator`](super::get_generator).
pub const DEFAULT_POLICY_FILE: &str = "model_500_500_tanh_DroneHoverPWMBullet.json";

/// Configuration of [`TrajectoryGenerator`](super::TrajectoryGenerator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrajectoryGeneratorConfig {
    /// Random seed given to the environment when it is built.
    pub seed: i64,

    /// Frame rate of rendered rollouts.
    pub target_fps: f64,

    /// Stability constant added to the standard deviation of observations.
    pub epsilon: f64,

    /// Clip bound of standardized observations.
    pub clip_bound: f64,

    /// Directory holding policy files.
    pub policy_dir: PathBuf,

    /// Name of the policy file in `policy_dir`.
    pub policy_file: String,
}

impl Default for TrajectoryGeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            target_fps: TARGET_FPS,
            epsilon: DEFAULT_EPSILON,
            clip_bound: DEFAULT_BOUND,
            policy_dir: PathBuf::from("data/policies"),
            policy_file: DEFAULT_POLICY_FILE.to_string(),
        }
    }
}

impl TrajectoryGeneratorConfig {
    /// Sets the random seed of the environment.
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the frame rate of rendered rollouts.
    pub fn target_fps(mut self, v: f64) -> Self {
        self.target_fps = v;
        self
    }

    /// Sets the stability constant of the standardizer.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the clip bound of the standardizer.
    pub fn clip_bound(mut self, v: f64) -> Self {
        self.clip_bound = v;
        self
    }

    /// Sets the directory of policy files.
    pub fn policy_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.policy_dir = v.into();
        self
    }

    /// Sets the name of the policy file.
    pub fn policy_file(mut self, v: impl Into<String>) -> Self {
        self.policy_file = v.into();
        self
    }

    /// Full path of the policy file.
    pub fn policy_path(&self) -> PathBuf {
        self.policy_dir.join(&self.policy_file)
    }

    /// Constructs [`TrajectoryGeneratorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let rdr = BufReader::new(file);
        let b: Self = serde_yaml::from_reader(rdr)?;
        b.validate()?;
        Ok(b)
    }

    /// Checks the numeric parameters.
    ///
    /// `target_fps` must be positive and finite, `epsilon` and `clip_bound`
    /// non-negative and finite.
    pub fn validate(&self) -> Result<(), RolloutError> {
        if !(self.target_fps > 0.0 && self.target_fps.is_finite()) {
            return Err(RolloutError::InvalidArgument(format!(
                "target_fps must be positive and finite, got {}",
                self.target_fps
            )));
        }
        for (name, v) in [("epsilon", self.epsilon), ("clip_bound", self.clip_bound)].iter() {
            if !(*v >= 0.0 && v.is_finite()) {
                return Err(RolloutError::InvalidArgument(format!(
                    "{} must be non-negative and finite, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }

    /// Saves [`TrajectoryGeneratorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
