// src/detection/extractor.rs

use crate::types::{HandSample, SensorFrame};

/// Select the authoritative hand for this cycle: the first tracked hand in
/// acquisition order. Any other hands are ignored entirely. Zero hands is a
/// normal input (the watchdog's concern), not an error.
pub fn primary_hand(frame: &SensorFrame) -> Option<&HandSample> {
    frame.hands.first()
}
