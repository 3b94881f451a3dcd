//! Real-time pacing of rendered rollouts.
use crate::error::RolloutError;
use std::time::{Duration, Instant};

/// Frame rate of rendered rollouts.
pub const TARGET_FPS: f64 = 100.0;

/// Keeps a loop at or below a target frame rate.
///
/// The time to wait is a pure function of the elapsed time of an iteration
/// and the frame period, see [`FramePacer::wait_time`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePacer {
    period: Duration,
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(1.0 / TARGET_FPS))
    }
}

impl FramePacer {
    /// Constructs a pacer with the given frame period.
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Constructs a pacer running at `fps` frames per second.
    ///
    /// `fps` must be positive and finite.
    pub fn from_fps(fps: f64) -> Result<Self, RolloutError> {
        if !(fps > 0.0 && fps.is_finite()) {
            return Err(RolloutError::InvalidArgument(format!(
                "target fps must be positive and finite, got {}",
                fps
            )));
        }
        Ok(Self::new(Duration::from_secs_f64(1.0 / fps)))
    }

    /// Frame period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Remaining part of the frame budget after `elapsed`, zero if the frame overran.
    pub fn wait_time(&self, elapsed: Duration) -> Duration {
        self.period.saturating_sub(elapsed)
    }

    /// Sleeps for the rest of the frame started at `frame_start`.
    pub fn wait(&self, frame_start: Instant) {
        let wait = self.wait_time(frame_start.elapsed());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}
