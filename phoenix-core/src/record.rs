//! Records of rollout statistics.
//!
//! The rollout engine writes one [`Record`] per episode (return, length,
//! cost and a timestamp) to a [`Recorder`]. [`NullRecorder`] discards them,
//! [`BufferedRecorder`] keeps them in memory and can summarize them with
//! [`RecordStorage`].
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use storage::RecordStorage;
