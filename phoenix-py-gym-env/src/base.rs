//! Wrapper of gym environments implemented in Python.
use crate::{
    util::{arrayd_to_pyobj, pyobj_to_arrayd},
    GymEnvConfig,
};
use anyhow::{bail, Result};
use log::{info, trace};
use ndarray::ArrayD;
use phoenix_core::{Env, Info, Step};
use pyo3::{
    types::{IntoPyDict, PyDict, PyTuple},
    PyAny, PyObject, Python,
};

/// Information given at every step of the interaction with the environment.
#[derive(Clone, Debug, Default)]
pub struct GymInfo {
    /// `info["cost"]` of the step, if the environment reports it.
    pub cost: Option<f64>,
}

impl Info for GymInfo {
    fn cost(&self) -> Option<f64> {
        self.cost
    }
}

impl GymInfo {
    fn from_py(info: &PyAny) -> Result<Self> {
        let cost = match info.downcast::<PyDict>() {
            Ok(dict) => match dict.get_item("cost") {
                Some(cost) => Some(cost.extract::<f64>()?),
                None => None,
            },
            Err(_) => None,
        };
        Ok(Self { cost })
    }
}

/// An environment in [Gymnasium](https://gymnasium.farama.org) or the older
/// [OpenAI gym](https://github.com/openai/gym).
///
/// Both the old step API returning `(obs, reward, done, info)` and the new
/// one returning `(obs, reward, terminated, truncated, info)` are supported.
/// Observations and actions are `float64` arrays.
#[derive(Debug)]
pub struct GymEnv {
    env: PyObject,

    render_mode: Option<String>,

    observation_shape: Vec<usize>,

    count_steps: usize,

    max_steps: Option<usize>,

    /// Initial seed.
    ///
    /// This value will be used at the first call of the reset method.
    initial_seed: Option<i64>,
}

impl GymEnv {
    /// Number of steps in the current episode.
    pub fn count_steps(&self) -> usize {
        self.count_steps
    }

    fn reset_py(&mut self, py: Python<'_>) -> Result<PyObject> {
        let env = self.env.as_ref(py);
        let ret = match self.initial_seed.take() {
            // Old gym API
            Some(seed) if env.hasattr("seed")? => {
                env.call_method1("seed", (seed,))?;
                env.call_method0("reset")?
            }
            Some(seed) => {
                let kwargs = vec![("seed", seed)].into_py_dict(py);
                env.call_method("reset", (), Some(kwargs))?
            }
            None => env.call_method0("reset")?,
        };

        // The new API returns (obs, info)
        let obs = match ret.downcast::<PyTuple>() {
            Ok(t) if t.len() == 2 => t.get_item(0),
            _ => ret,
        };
        Ok(obs.into())
    }
}

impl Env for GymEnv {
    type Config = GymEnvConfig;
    type Obs = ArrayD<f64>;
    type Act = ArrayD<f64>;
    type Info = GymInfo;

    /// Constructs [`GymEnv`].
    ///
    /// * `seed` - The seed value of the random number generator.
    ///   This value will be used at the first call of the reset method.
    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Python::with_gil(|py| {
            // sys.argv is used by pyglet library, which is responsible for rendering.
            // Depending on the python interpreter, however, sys.argv can be empty.
            // See https://github.com/PyO3/pyo3/issues/1241#issuecomment-715952517
            let locals = [("sys", py.import("sys")?)].into_py_dict(py);
            let _ = py.eval("sys.argv.insert(0, 'GymEnv')", None, Some(locals))?;
            let ver = py.eval("sys.version", None, Some(locals))?;
            info!("Initialize GymEnv");
            info!("Python version = {}", ver);

            for module in config.modules.iter() {
                py.import(module.as_str())?;
                info!("Imported {}", module);
            }

            let gym = match py.import("gymnasium") {
                Ok(gym) => gym,
                Err(_) => py.import("gym")?,
            };
            let kwargs = config
                .render_mode
                .as_ref()
                .map(|render_mode| vec![("render_mode", render_mode.as_str())].into_py_dict(py));
            let env = gym
                .getattr("make")?
                .call((config.name.as_str(),), kwargs)?;

            let observation_space = env.getattr("observation_space")?;
            info!("Observation space = {}", observation_space);
            let observation_shape: Vec<usize> = observation_space.getattr("shape")?.extract()?;
            if observation_shape.is_empty() {
                bail!(
                    "Observation space of {} has no dimensions",
                    config.name.as_str()
                );
            }

            Ok(GymEnv {
                env: env.into(),
                render_mode: config.render_mode.clone(),
                observation_shape,
                count_steps: 0,
                max_steps: config.max_steps,
                initial_seed: Some(seed),
            })
        })
    }

    /// Resets the environment and returns an observation.
    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("GymEnv::reset()");
        self.count_steps = 0;
        Python::with_gil(|py| {
            let obs = self.reset_py(py)?;
            pyobj_to_arrayd(py, obs.as_ref(py))
        })
    }

    /// Runs a step of the environment's dynamics.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>> {
        trace!("GymEnv::step()");
        Python::with_gil(|py| {
            let a_py = arrayd_to_pyobj(py, a);
            let ret = self.env.call_method1(py, "step", (a_py,))?;
            let step: &PyTuple = ret.extract(py)?;

            let (is_terminated, mut is_truncated, info) = match step.len() {
                5 => (
                    step.get_item(2).is_true()?,
                    step.get_item(3).is_true()?,
                    step.get_item(4),
                ),
                4 => (step.get_item(2).is_true()?, false, step.get_item(3)),
                n => bail!("step() returned a tuple of {} elements", n),
            };
            let obs = pyobj_to_arrayd(py, step.get_item(0))?;
            let reward: f64 = step.get_item(1).extract()?;
            let info = GymInfo::from_py(info)?;

            self.count_steps += 1;
            if let Some(max_steps) = self.max_steps {
                if self.count_steps >= max_steps {
                    is_truncated = true;
                }
            }

            Ok(Step::new(obs, reward, is_terminated, is_truncated, info))
        })
    }

    /// Renders the environment.
    ///
    /// Environments made with a render mode are rendered with `env.render()`,
    /// others with `env.render("human")`.
    fn render(&mut self) -> Result<()> {
        Python::with_gil(|py| {
            match self.render_mode {
                Some(_) => self.env.call_method0(py, "render")?,
                None => self.env.call_method1(py, "render", ("human",))?,
            };
            Ok(())
        })
    }

    fn observation_shape(&self) -> &[usize] {
        &self.observation_shape
    }
}
