// src/detection/watchdog.rs
//
// No-signal watchdog. Prolonged sensor silence while a session is open is
// treated as an abandoned operator; the engine consumes the latch as a
// forced stop.

use crate::types::DetectionConfig;
use tracing::warn;

pub struct NoHandWatchdog {
    /// Consecutive zero-hand frames since the last hand or latch.
    counter: u32,
    /// Set when the counter reaches the limit; cleared only when a hand
    /// reappears.
    latched: bool,
    frame_limit: u32,
}

impl NoHandWatchdog {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            counter: 0,
            latched: false,
            frame_limit: config.no_hand_frame_limit,
        }
    }

    /// A frame with at least one tracked hand.
    pub fn observe_hand(&mut self) {
        self.counter = 0;
        self.latched = false;
    }

    /// A frame with zero tracked hands.
    pub fn observe_absence(&mut self) {
        self.counter += 1;
        if self.counter >= self.frame_limit {
            warn!("no hand tracked for {} frames", self.frame_limit);
            self.latched = true;
            self.counter = 0;
        }
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }
}
