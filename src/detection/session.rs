// src/detection/session.rs
//
// Session framing: the operator opens a session with a deliberate
// open→close→open hand sequence and closes it with a sustained pinch.
// Commands are only interpreted inside an open session.

use crate::types::{CommandKind, DetectionConfig, HandSample, Vec3};
use tracing::{debug, info};

// Sensor-saturated grab extremes. Exact equality is intentional: the
// sensor clamps a fully-open palm to 0.0 and a full fist to 1.0, and any
// intermediate value must not advance the start sequence.
const GRAB_OPEN: f32 = 0.0;
const GRAB_CLOSED: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// `step` counts completed sub-gestures of the start sequence:
    /// 1 after the first open palm, 2 after the closed fist.
    AwaitingStart { step: u8 },
    Active,
}

pub struct SessionTracker {
    phase: SessionPhase,
    /// Qualifying-pinch frames since the last reset. Cumulative: frames at
    /// or below the threshold leave it untouched.
    pinch_counter: u32,
    /// Palm position captured when the session became active. Cleared on
    /// stop. Read by no gesture decision.
    reference_position: Option<Vec3>,
    pinch_threshold: f32,
    stop_count: u32,
}

impl SessionTracker {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            phase: SessionPhase::Idle,
            pinch_counter: 0,
            reference_position: None,
            pinch_threshold: config.pinch_strength_threshold,
            stop_count: config.pinch_stop_count,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn pinch_counter(&self) -> u32 {
        self.pinch_counter
    }

    pub fn reference_position(&self) -> Option<Vec3> {
        self.reference_position
    }

    /// Advance the start sub-machine by one frame. Call only while the
    /// session is not active. A reached step never regresses; a partial
    /// sequence persists until completed or reset by a stop.
    pub fn check_start(&mut self, hand: &HandSample) -> Option<CommandKind> {
        match self.phase {
            SessionPhase::Idle if hand.grab_strength == GRAB_OPEN => {
                self.phase = SessionPhase::AwaitingStart { step: 1 };
                debug!("start sequence: open palm");
                None
            }
            SessionPhase::AwaitingStart { step: 1 } if hand.grab_strength == GRAB_CLOSED => {
                self.phase = SessionPhase::AwaitingStart { step: 2 };
                debug!("start sequence: closed fist");
                None
            }
            SessionPhase::AwaitingStart { step: 2 } if hand.grab_strength == GRAB_OPEN => {
                Some(self.activate(hand))
            }
            _ => None,
        }
    }

    fn activate(&mut self, hand: &HandSample) -> CommandKind {
        self.phase = SessionPhase::Active;
        self.pinch_counter = 0;
        self.reference_position = Some(hand.palm_position);
        info!(
            "session active, reference palm position ({:.1}, {:.1}, {:.1})",
            hand.palm_position.x, hand.palm_position.y, hand.palm_position.z
        );
        CommandKind::StartSession
    }

    /// Advance the stop sub-machine by one frame. Call only while the
    /// session is active.
    pub fn check_stop(&mut self, hand: &HandSample) -> Option<CommandKind> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        if hand.pinch_strength > self.pinch_threshold {
            self.pinch_counter += 1;
        }
        if self.pinch_counter > self.stop_count {
            self.deactivate();
            info!("session stopped by pinch gesture");
            return Some(CommandKind::StopSession);
        }
        None
    }

    /// Watchdog-forced stop. Same field resets as the pinch-stop path.
    pub fn force_stop(&mut self) {
        self.deactivate();
    }

    fn deactivate(&mut self) {
        self.phase = SessionPhase::Idle;
        self.pinch_counter = 0;
        self.reference_position = None;
    }
}
