// src/detection/classifier.rs
//
// Palm-tilt gesture classification. Two tilt angles are derived from the
// palm normal: around the sensor's lateral axis (X) and around its
// vertical axis (Z). The lateral tilt takes strict priority; the two are
// never combined.

use crate::types::{CommandKind, DetectionConfig, Vec3};
use std::f32::consts::FRAC_PI_2;
use tracing::debug;

pub struct TiltClassifier {
    threshold_rad: f32,
}

impl TiltClassifier {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            threshold_rad: config.tilt_threshold_rad,
        }
    }

    /// Classify one frame's palm normal, or nothing if neither tilt
    /// crosses the threshold. Degenerate inputs never escape as a crash:
    /// they classify as "no gesture on that axis".
    pub fn classify(&self, palm_normal: Vec3) -> Option<CommandKind> {
        if let Some(angle_x) = tilt_angle(palm_normal.z, palm_normal.y) {
            if angle_x.abs() > self.threshold_rad {
                debug!("tilt around lateral axis: {:.3} rad", angle_x);
                return Some(direction_command(angle_x));
            }
        }
        if let Some(angle_z) = tilt_angle(palm_normal.x, palm_normal.y) {
            if angle_z.abs() > self.threshold_rad {
                debug!("tilt around vertical axis: {:.3} rad", angle_z);
                return Some(direction_command(angle_z));
            }
        }
        None
    }
}

fn direction_command(angle: f32) -> CommandKind {
    if angle < 0.0 {
        CommandKind::WalkRectDecrement
    } else {
        CommandKind::WalkRectIncrement
    }
}

/// atan(num / den) with the degenerate cases pinned down: a zero
/// denominator under a nonzero numerator is the atan limit (±π/2, sign of
/// the numerator); 0/0 and non-finite components yield no angle.
fn tilt_angle(num: f32, den: f32) -> Option<f32> {
    if !num.is_finite() || !den.is_finite() {
        return None;
    }
    if den == 0.0 {
        if num == 0.0 {
            return None;
        }
        return Some(FRAC_PI_2.copysign(num));
    }
    Some((num / den).atan())
}
