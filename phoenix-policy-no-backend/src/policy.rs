use crate::{Checkpoint, Mat, Mlp};
use anyhow::{bail, Result};
use log::info;
use ndarray::{ArrayD, Axis, IxDyn};
use phoenix_core::{Env, LoadPolicy, Obs, Policy, ScalingParameters};
use std::path::Path;

/// Policy computing actions with an [`Mlp`] on the CPU.
///
/// In training mode, Gaussian noise with standard deviation `exp(log_std)`
/// is added to the output of the network if the policy has `log_std`.
/// In evaluation mode the output of the network is the action.
pub struct MlpPolicy {
    mlp: Mlp,
    log_std: Option<Vec<f32>>,
    train: bool,
    rng: fastrand::Rng,
}

impl MlpPolicy {
    /// Constructs a policy in training mode.
    pub fn new(mlp: Mlp, log_std: Option<Vec<f32>>) -> Self {
        Self {
            mlp,
            log_std,
            train: true,
            rng: fastrand::Rng::new(),
        }
    }

    /// Sets the seed of the random number generator for exploration noise.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Constructs a policy and returns it with the scaling parameters of the checkpoint.
    pub fn from_checkpoint(checkpoint: Checkpoint) -> (Self, ScalingParameters) {
        let Checkpoint {
            mlp,
            scaling_parameters,
            log_std,
        } = checkpoint;
        (Self::new(mlp, log_std), scaling_parameters)
    }

    /// The network.
    pub fn mlp(&self) -> &Mlp {
        &self.mlp
    }

    /// Computes actions for each lane of `obs` along its last axis.
    ///
    /// The returned array has the shape of `obs` with the last axis
    /// replaced by the number of outputs of the network.
    pub fn act(&mut self, obs: &ArrayD<f64>) -> Result<ArrayD<f64>> {
        let shape = obs.shape();
        let dim = match shape.last() {
            Some(dim) => *dim,
            None => bail!("Observation must have at least one axis"),
        };
        if dim != self.mlp.input_dim() {
            bail!(
                "Policy expects observations of dimension {}, got shape {:?}",
                self.mlp.input_dim(),
                shape
            );
        }

        let last = Axis(shape.len() - 1);
        let mut out_shape = shape.to_vec();
        out_shape[last.index()] = self.mlp.output_dim();
        let mut out = ArrayD::<f64>::zeros(IxDyn(&out_shape));

        for (lane, mut out_lane) in obs.lanes(last).into_iter().zip(out.lanes_mut(last)) {
            let x: Mat = lane.iter().map(|v| *v as f32).collect::<Vec<_>>().into();
            let y = self.mlp.forward(&x)?;
            for (i, (o, v)) in out_lane.iter_mut().zip(y.data.iter()).enumerate() {
                *o = (*v + self.noise(i)) as f64;
            }
        }
        Ok(out)
    }

    fn noise(&mut self, i: usize) -> f32 {
        match (self.train, self.log_std.as_ref()) {
            (true, Some(log_std)) => match log_std.get(i) {
                Some(log_std) => log_std.exp() * self.standard_normal(),
                None => 0.0,
            },
            _ => 0.0,
        }
    }

    // Box-Muller transform.
    fn standard_normal(&mut self) -> f32 {
        let u1 = 1.0 - self.rng.f32();
        let u2 = self.rng.f32();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
    }
}

impl<E> Policy<E> for MlpPolicy
where
    E: Env,
    E::Act: From<ArrayD<f64>>,
{
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let obs = obs.view().to_owned();
        Ok(self.act(&obs)?.into())
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

impl<E> LoadPolicy<E> for MlpPolicy
where
    E: Env,
    E::Act: From<ArrayD<f64>>,
{
    fn load(path: impl AsRef<Path>) -> Result<(Self, ScalingParameters)> {
        let path = path.as_ref();
        let checkpoint = Checkpoint::from_json_path(path)?;
        info!("Loaded policy from {}", path.display());
        info!("{}", checkpoint.mlp);
        Ok(Self::from_checkpoint(checkpoint))
    }
}
