use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and pattern parameters of the acquisition loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionParams {
    /// How long a single trigger poll may block while the live view runs.
    pub poll_interval_ms: u64,
    /// Wait between submitting a pattern and grabbing its frame.
    pub settle_delay_ms: u64,
    /// Phase shifts per fringe set.
    pub fringe_count: usize,
    /// Short and long fringe pitch in projector pixels.
    pub pitches: [f32; 2],
    /// Frames averaged per projected pattern.
    pub frames_per_pattern: usize,
    /// Light the board with a white image before detecting markers.
    pub project_white_for_detection: bool,
}

impl Default for AcquisitionParams {
    fn default() -> Self {
        Self {
            poll_interval_ms: 15,
            settle_delay_ms: 0,
            fringe_count: 5,
            pitches: [70.0, 75.0],
            frames_per_pattern: 1,
            project_white_for_detection: true,
        }
    }
}

impl AcquisitionParams {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
