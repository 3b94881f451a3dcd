//! Policy with an MLP running on the CPU without a deep learning framework.
//!
//! The network and the observation statistics are read from a JSON
//! [`Checkpoint`]. [`MlpPolicy`] implements [`phoenix_core::LoadPolicy`], so a
//! checkpoint can be passed directly to [`phoenix_core::get_generator`].
#![warn(missing_docs)]
mod checkpoint;
mod mat;
mod mlp;
mod policy;
pub use checkpoint::{Checkpoint, LayerRecord};
pub use mat::Mat;
pub use mlp::{Activation, Mlp};
pub use policy::MlpPolicy;
