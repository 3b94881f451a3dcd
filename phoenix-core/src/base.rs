//! Core abstractions of the rollout engine.
mod env;
mod policy;
mod step;
pub use env::Env;
pub use policy::{LoadPolicy, Policy};
pub use step::{Info, Step};

use ndarray::{ArrayBase, ArrayD, ArrayViewD};
use std::fmt::Debug;

/// An observation of an environment.
///
/// Observations are real-valued arrays whose last axis has the dimensionality
/// of the observation space. The rollout engine reads them through
/// [`Obs::view`] and builds normalized observations with [`From`]`<ArrayD<f64>>`.
pub trait Obs: Clone + Debug + From<ArrayD<f64>> {
    /// Returns a view of the underlying array.
    fn view(&self) -> ArrayViewD<'_, f64>;

    /// Returns the number of elements in the observation.
    fn len(&self) -> usize {
        self.view().len()
    }
}

impl Obs for ArrayD<f64> {
    fn view(&self) -> ArrayViewD<'_, f64> {
        ArrayBase::view(self)
    }
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of elements in the action.
    fn len(&self) -> usize;
}

impl Act for ArrayD<f64> {
    fn len(&self) -> usize {
        ArrayBase::len(self)
    }
}
