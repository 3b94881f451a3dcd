//! Batches of state transitions collected with the current policy.
use crate::{error::RolloutError, Obs};
use anyhow::Result;
use ndarray::{Array2, ArrayView1, Axis};

/// Pairs `(x_t, y_t)` collected by
/// [`TrajectoryGenerator::get_batch`](super::TrajectoryGenerator::get_batch).
///
/// **The two sequences live in different spaces.** `x[i]` is the
/// *standardized* observation fed to the policy, while `y[i]` is the *raw*
/// observation the environment returned after applying the resulting action.
/// Downstream models are trained on this convention; do not standardize `y`
/// or de-standardize `x`.
#[derive(Clone, Debug)]
pub struct Batch<O: Obs> {
    /// Standardized observations, in collection order.
    pub x: Vec<O>,

    /// Raw next observations, in collection order.
    pub y: Vec<O>,
}

impl<O: Obs> Batch<O> {
    pub(super) fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
        }
    }

    pub(super) fn push(&mut self, x: O, y: O) {
        self.x.push(x);
        self.y.push(y);
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns `true` if the batch holds no transitions.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Splits the batch into `(x, y)`.
    pub fn unpack(self) -> (Vec<O>, Vec<O>) {
        (self.x, self.y)
    }

    /// Stacks the batch into two `N x D` matrices `(X, Y)`.
    ///
    /// Observations are flattened, so every observation must have the same
    /// number of elements.
    pub fn into_arrays(self) -> Result<(Array2<f64>, Array2<f64>)> {
        Ok((stack(&self.x)?, stack(&self.y)?))
    }
}

fn stack<O: Obs>(obs: &[O]) -> Result<Array2<f64>> {
    let d = obs.first().map(|o| o.len()).unwrap_or(0);
    let mut out = Array2::zeros((obs.len(), d));
    for (mut row, o) in out.axis_iter_mut(Axis(0)).zip(obs.iter()) {
        let view = o.view();
        if view.len() != d {
            return Err(RolloutError::ShapeMismatch {
                expected: d,
                got: view.shape().to_vec(),
            }
            .into());
        }
        let flat: Vec<f64> = view.iter().cloned().collect();
        row.assign(&ArrayView1::from(&flat[..]));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, ArrayD};

    #[test]
    fn test_into_arrays() -> Result<()> {
        let mut batch = Batch::<ArrayD<f64>>::with_capacity(2);
        batch.push(arr1(&[0.0, 1.0]).into_dyn(), arr1(&[2.0, 3.0]).into_dyn());
        batch.push(arr1(&[4.0, 5.0]).into_dyn(), arr1(&[6.0, 7.0]).into_dyn());
        assert_eq!(batch.len(), 2);

        let (x, y) = batch.into_arrays()?;
        assert_eq!(x, arr2(&[[0.0, 1.0], [4.0, 5.0]]));
        assert_eq!(y, arr2(&[[2.0, 3.0], [6.0, 7.0]]));
        Ok(())
    }

    #[test]
    fn test_into_arrays_rejects_ragged() {
        let mut batch = Batch::<ArrayD<f64>>::with_capacity(2);
        batch.push(arr1(&[0.0, 1.0]).into_dyn(), arr1(&[2.0, 3.0]).into_dyn());
        batch.push(arr1(&[4.0]).into_dyn(), arr1(&[6.0, 7.0]).into_dyn());
        assert!(batch.into_arrays().is_err());
    }
}
