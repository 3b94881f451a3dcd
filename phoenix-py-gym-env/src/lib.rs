//! A wrapper of [Gymnasium](https://gymnasium.farama.org) environments on Python.
//!
//! [`GymEnv`] is a wrapper of Gymnasium, or the older OpenAI gym, based on
//! [`PyO3`](https://github.com/PyO3/pyo3). It implements [`phoenix_core::Env`], so
//! the environment can be driven by a [`TrajectoryGenerator`].
//!
//! Observations are converted from Python objects to [`ndarray::ArrayD<f64>`]
//! with `numpy.asarray()`, and actions are passed to Python as `float64`
//! numpy arrays. If the `info` dict returned by `step()` has a `"cost"`
//! entry, it is available through [`GymInfo::cost`] and summed into the
//! episode cost by the generator.
//!
//! Environments registered by a Python package, like the drone environments
//! of `phoenix_drone_simulation`, are made available by listing the package
//! in [`GymEnvConfig::modules`].
//!
//! [`TrajectoryGenerator`]: phoenix_core::TrajectoryGenerator
mod base;
mod config;
pub mod util;
pub use base::{GymEnv, GymInfo};
pub use config::GymEnvConfig;
