//! Configuration of [`GymEnv`](super::GymEnv).
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
/// Configuration of [`GymEnv`](super::GymEnv).
pub struct GymEnvConfig {
    /// Name of the environment given to `gym.make()`.
    pub name: String,

    /// Python modules imported before the environment is made.
    ///
    /// Importing a module registers the environments it defines,
    /// e.g., `phoenix_drone_simulation`.
    pub modules: Vec<String>,

    /// Render mode given to `gym.make()`.
    ///
    /// If `None`, the environment is rendered with `env.render("human")`.
    pub render_mode: Option<String>,

    /// Maximum number of steps in an episode.
    ///
    /// The episode is truncated when it reaches this number of steps.
    pub max_steps: Option<usize>,
}

impl GymEnvConfig {
    /// Set the name of the environment.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a Python module imported before making the environment.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.modules.push(module.into());
        self
    }

    /// Set the render mode.
    pub fn render_mode(mut self, render_mode: Option<String>) -> Self {
        self.render_mode = render_mode;
        self
    }

    /// Set the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Constructs [`GymEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GymEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
