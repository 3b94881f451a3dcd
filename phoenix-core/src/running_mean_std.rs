//! Standardization of observations with fixed statistics.
//!
//! [`RunningMeanStd`] holds the per-dimension mean and standard deviation of
//! observations seen while the policy was trained. At runtime the statistics
//! do not change: they are overwritten in bulk from a checkpoint with
//! [`RunningMeanStd::load`] and only read afterwards.
use crate::error::RolloutError;
use ndarray::{Array1, ArrayD, ArrayViewD, Axis};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Stability constant added to the standard deviation.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Magnitude of the symmetric clamp applied by [`RunningMeanStd::transform`].
pub const DEFAULT_BOUND: f64 = 10.0;

/// Observation statistics stored in a checkpoint.
///
/// In checkpoint files they are a `2 x D` array where row 0 is the mean
/// vector and row 1 the standard deviation vector. Deserialization rejects
/// vectors of different lengths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScalingParameters")]
pub struct ScalingParameters {
    /// Mean of observations.
    pub mean: Vec<f64>,

    /// Standard deviation of observations.
    pub std: Vec<f64>,
}

impl ScalingParameters {
    /// Constructs scaling parameters, checking that both vectors have the same length.
    pub fn new(mean: Vec<f64>, std: Vec<f64>) -> Result<Self, RolloutError> {
        if mean.len() != std.len() {
            return Err(RolloutError::InvalidScalingParameters(format!(
                "mean has {} elements but std has {}",
                mean.len(),
                std.len()
            )));
        }
        Ok(Self { mean, std })
    }

    /// Dimensionality of the observations.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }
}

#[derive(Deserialize)]
struct RawScalingParameters {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl TryFrom<RawScalingParameters> for ScalingParameters {
    type Error = RolloutError;

    fn try_from(raw: RawScalingParameters) -> Result<Self, Self::Error> {
        Self::new(raw.mean, raw.std)
    }
}

impl TryFrom<Vec<Vec<f64>>> for ScalingParameters {
    type Error = RolloutError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        if rows.len() != 2 {
            return Err(RolloutError::InvalidScalingParameters(format!(
                "expected 2 rows (mean, std), got {}",
                rows.len()
            )));
        }
        let mut rows = rows.into_iter();
        match (rows.next(), rows.next()) {
            (Some(mean), Some(std)) => Self::new(mean, std),
            _ => unreachable!(),
        }
    }
}

/// Make observations average free and scale them to unit standard deviation.
#[derive(Clone, Debug, PartialEq)]
pub struct RunningMeanStd {
    mean: Array1<f64>,
    std: Array1<f64>,
    eps: f64,
    bound: f64,
}

impl RunningMeanStd {
    /// Constructs statistics of dimension `dim` with `mean = 0` and `std = 1`.
    pub fn new(dim: usize) -> Self {
        Self {
            mean: Array1::zeros(dim),
            std: Array1::ones(dim),
            eps: DEFAULT_EPSILON,
            bound: DEFAULT_BOUND,
        }
    }

    /// Sets the stability constant added to the standard deviation.
    pub fn epsilon(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Sets the clip bound.
    ///
    /// A negative or NaN bound makes [`RunningMeanStd::transform`] fail when clipping.
    pub fn bound(mut self, bound: f64) -> Self {
        self.bound = bound;
        self
    }

    /// Dimensionality of observations.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Mean of observations.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Standard deviation of observations.
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    /// Variance of observations.
    pub fn var(&self) -> Array1<f64> {
        self.std.mapv(|s| s * s)
    }

    /// Replaces mean and standard deviation with the given parameters.
    ///
    /// Parameters are validated before anything is assigned, so on error the
    /// statistics are left as they were.
    pub fn load(&mut self, params: ScalingParameters) -> Result<(), RolloutError> {
        if params.mean.len() != self.dim() {
            return Err(RolloutError::ShapeMismatch {
                expected: self.dim(),
                got: vec![params.mean.len()],
            });
        }
        if params.std.len() != self.dim() {
            return Err(RolloutError::ShapeMismatch {
                expected: self.dim(),
                got: vec![params.std.len()],
            });
        }
        if let Some(i) = params
            .std
            .iter()
            .position(|s| !(s + self.eps > 0.0) || !s.is_finite())
        {
            return Err(RolloutError::InvalidScalingParameters(format!(
                "std[{}] = {} is not a valid divisor",
                i, params.std[i]
            )));
        }
        if params.mean.iter().any(|m| !m.is_finite()) {
            return Err(RolloutError::InvalidScalingParameters(
                "mean contains non-finite values".to_string(),
            ));
        }

        let ScalingParameters { mean, std } = params;
        *self = Self {
            mean: Array1::from(mean),
            std: Array1::from(std),
            ..*self
        };
        Ok(())
    }

    /// Standardizes `x` along its last axis.
    ///
    /// * `subtract_mean` - If `false`, `x` is only divided by `std + eps`.
    /// * `clip` - Clamps every output element into `[-bound, bound]`.
    ///
    /// `x` may have leading axes (e.g. a batch of observations); its last axis
    /// must have the dimensionality of the statistics. Nothing is broadcast.
    pub fn transform(
        &self,
        x: ArrayViewD<'_, f64>,
        subtract_mean: bool,
        clip: bool,
    ) -> Result<ArrayD<f64>, RolloutError> {
        if x.ndim() == 0 || x.shape()[x.ndim() - 1] != self.dim() {
            return Err(RolloutError::ShapeMismatch {
                expected: self.dim(),
                got: x.shape().to_vec(),
            });
        }
        if clip && !(self.bound >= 0.0) {
            return Err(RolloutError::InvalidArgument(format!(
                "clip bound must be non-negative, got {}",
                self.bound
            )));
        }

        let axis = Axis(x.ndim() - 1);
        let mut out = x.to_owned();
        for mut lane in out.lanes_mut(axis) {
            for (i, v) in lane.iter_mut().enumerate() {
                let centered = if subtract_mean { *v - self.mean[i] } else { *v };
                let y = centered / (self.std[i] + self.eps);
                *v = if clip { y.clamp(-self.bound, self.bound) } else { y };
            }
        }
        Ok(out)
    }

    /// Standardizes `x` with the default mode: mean subtracted, no clipping.
    pub fn forward(&self, x: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>, RolloutError> {
        self.transform(x, true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, ArrayD, Ix2, IxDyn};

    fn inputs() -> Vec<ArrayD<f64>> {
        (0..16)
            .map(|k| {
                let k = k as f64;
                arr1(&[k * 3.7 - 20.0, -k * k, 0.5 * k, 1e3 - k * 150.0]).into_dyn()
            })
            .collect()
    }

    fn loaded() -> RunningMeanStd {
        let mut rms = RunningMeanStd::new(4);
        rms.load(ScalingParameters::new(vec![1.0, -2.0, 0.5, 30.0], vec![0.1, 2.0, 0.01, 7.5]).unwrap())
            .unwrap();
        rms
    }

    #[test]
    fn test_default_statistics() {
        let rms = RunningMeanStd::new(4);
        let x = arr1(&[1.0, 2.0, 3.0, 4.0]).into_dyn();
        let y = rms.forward(x.view()).unwrap();
        let expected = [0.99999, 1.99998, 2.99997, 3.99996];
        for (y, e) in y.iter().zip(expected.iter()) {
            assert!((y - e).abs() < 1e-5, "{} vs {}", y, e);
        }
        for x in inputs() {
            let y = rms.transform(x.view(), true, false).unwrap();
            for (y, x) in y.iter().zip(x.iter()) {
                assert!((y - x / (1.0 + DEFAULT_EPSILON)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_without_mean_ignores_mean() {
        let rms = loaded();
        for x in inputs() {
            let y = rms.transform(x.view(), false, false).unwrap().into_raw_vec();
            let x = x.into_raw_vec();
            for i in 0..4 {
                let expected = x[i] / (rms.std()[i] + DEFAULT_EPSILON);
                assert_eq!(y[i], expected);
            }
        }
    }

    #[test]
    fn test_subtract_mean() {
        let rms = loaded();
        let x = arr1(&[1.0, 0.0, 0.5, 45.0]).into_dyn();
        let y = rms.forward(x.view()).unwrap().into_raw_vec();
        assert_eq!(y[0], 0.0);
        assert!((y[1] - 2.0 / (2.0 + DEFAULT_EPSILON)).abs() < 1e-12);
        assert_eq!(y[2], 0.0);
        assert!((y[3] - 15.0 / (7.5 + DEFAULT_EPSILON)).abs() < 1e-12);
    }

    #[test]
    fn test_clip_bounds_output() {
        let rms = loaded();
        let mut saw_clipped = false;
        for x in inputs() {
            let y = rms.transform(x.view(), true, true).unwrap();
            let unclipped = rms.transform(x.view(), true, false).unwrap();
            for (y, u) in y.iter().zip(unclipped.iter()) {
                assert!(*y >= -DEFAULT_BOUND && *y <= DEFAULT_BOUND);
                saw_clipped |= u.abs() > DEFAULT_BOUND;
            }
        }
        assert!(saw_clipped);
    }

    #[test]
    fn test_invalid_bound_is_an_error() {
        let x = arr1(&[1.0, -3.0]).into_dyn();
        for bound in [-1.0, f64::NAN].iter() {
            let rms = RunningMeanStd::new(2).bound(*bound);
            assert!(matches!(
                rms.transform(x.view(), true, true),
                Err(RolloutError::InvalidArgument(_))
            ));
            // Without clipping the bound is not used.
            assert!(rms.transform(x.view(), true, false).is_ok());
        }
    }

    #[test]
    fn test_batch_of_observations() {
        let rms = loaded();
        let xs = arr2(&[[1.0, 0.0, 0.5, 45.0], [2.0, -2.0, 0.5, 30.0]]).into_dyn();
        let ys = rms.forward(xs.view()).unwrap();
        assert_eq!(ys.shape(), &[2, 4]);
        let ys = ys.into_dimensionality::<Ix2>().unwrap();
        assert!((ys[[1, 0]] - 1.0 / (0.1 + DEFAULT_EPSILON)).abs() < 1e-9);
        assert_eq!(ys[[1, 1]], 0.0);
        assert_eq!(ys[[1, 3]], 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let rms = RunningMeanStd::new(4);
        let x = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));
        assert_eq!(
            rms.forward(x.view()),
            Err(RolloutError::ShapeMismatch {
                expected: 4,
                got: vec![2, 3]
            })
        );
        let x = ArrayD::<f64>::zeros(IxDyn(&[5]));
        assert!(rms.forward(x.view()).is_err());
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let mut rms = loaded();
        let before = rms.clone();

        let bad_dim = ScalingParameters::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        assert!(rms.load(bad_dim).is_err());
        assert_eq!(rms, before);

        let bad_std = ScalingParameters::new(vec![0.0; 4], vec![1.0, -1.0, 1.0, 1.0]).unwrap();
        assert!(matches!(
            rms.load(bad_std),
            Err(RolloutError::InvalidScalingParameters(_))
        ));
        assert_eq!(rms, before);

        // Fields are public, so lengths may disagree without going through `new`.
        let short_std = ScalingParameters {
            mean: vec![0.0; 4],
            std: vec![1.0; 3],
        };
        assert_eq!(
            rms.load(short_std),
            Err(RolloutError::ShapeMismatch {
                expected: 4,
                got: vec![3]
            })
        );
        assert_eq!(rms, before);
        let x = arr1(&[1.0, 2.0, 3.0, 4.0]).into_dyn();
        assert!(rms.forward(x.view()).is_ok());
    }

    #[test]
    fn test_deserialize_rejects_unequal_lengths() {
        let params: ScalingParameters =
            serde_yaml::from_str("mean: [0.0, 1.0]\nstd: [1.0, 2.0]\n").unwrap();
        assert_eq!(params.dim(), 2);

        let res: Result<ScalingParameters, _> =
            serde_yaml::from_str("mean: [0.0, 0.0, 0.0, 0.0]\nstd: [1.0, 1.0, 1.0]\n");
        assert!(res.is_err());
    }

    #[test]
    fn test_scaling_parameters_from_rows() {
        let params = ScalingParameters::try_from(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(params.mean, vec![1.0, 2.0]);
        assert_eq!(params.std, vec![3.0, 4.0]);
        assert_eq!(params.dim(), 2);

        assert!(ScalingParameters::try_from(vec![vec![1.0, 2.0]]).is_err());
        assert!(ScalingParameters::try_from(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn test_var() {
        let rms = loaded();
        assert_eq!(rms.var(), arr1(&[0.1 * 0.1, 4.0, 0.01 * 0.01, 56.25]));
    }
}
