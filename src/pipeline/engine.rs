// src/pipeline/engine.rs
//
// Per-frame orchestration. The engine owns every piece of mutable state
// and is driven by one event at a time: sensor frames, manual commands,
// and lockout expiries all arrive through the same queue, so no state is
// ever observed mid-transition.

use crate::debug_log::DebugLog;
use crate::detection::{primary_hand, NoHandWatchdog, SessionPhase, SessionTracker, TiltClassifier};
use crate::pipeline::arbiter::{CommandArbiter, Emission};
use crate::pipeline::metrics::PipelineMetrics;
use crate::types::{CommandKind, Config, SensorFrame};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum EngineEvent {
    Frame(SensorFrame),
    Manual(CommandKind),
    LockoutExpired(u64),
}

pub struct GestureEngine {
    session: SessionTracker,
    classifier: TiltClassifier,
    watchdog: NoHandWatchdog,
    arbiter: CommandArbiter,
    debug_log: DebugLog,
    metrics: PipelineMetrics,
}

impl GestureEngine {
    pub fn new(config: &Config, debug_log: DebugLog, metrics: PipelineMetrics) -> Self {
        Self {
            session: SessionTracker::new(&config.detection),
            classifier: TiltClassifier::new(&config.detection),
            watchdog: NoHandWatchdog::new(&config.detection),
            arbiter: CommandArbiter::new(),
            debug_log,
            metrics,
        }
    }

    /// Single entry point for the event loop. Returns the command the
    /// runtime must transmit and schedule a lockout expiry for, if any.
    pub fn handle(&mut self, event: EngineEvent) -> Option<Emission> {
        match event {
            EngineEvent::Frame(frame) => self.process_frame(&frame),
            EngineEvent::Manual(command) => self.manual_command(command),
            EngineEvent::LockoutExpired(token) => {
                self.arbiter.lockout_expired(token);
                None
            }
        }
    }

    /// One state-machine step per sensor frame, processed to completion.
    /// Extractor and watchdog bookkeeping always run; everything else is
    /// suspended while the lockout holds.
    pub fn process_frame(&mut self, frame: &SensorFrame) -> Option<Emission> {
        self.metrics.inc(&self.metrics.total_frames);

        let hand = primary_hand(frame);
        match hand {
            Some(hand) => {
                self.metrics.inc(&self.metrics.frames_with_hand);
                self.watchdog.observe_hand();
                debug!(
                    "frame {}: hand {} grab={:.2} pinch={:.2} normal=({:.2}, {:.2}, {:.2})",
                    frame.id,
                    hand.id,
                    hand.grab_strength,
                    hand.pinch_strength,
                    hand.palm_normal.x,
                    hand.palm_normal.y,
                    hand.palm_normal.z
                );
            }
            None => {
                self.metrics.inc(&self.metrics.frames_without_hand);
                self.watchdog.observe_absence();
            }
        }

        if self.arbiter.is_locked() {
            return None;
        }

        if let Some(hand) = hand {
            if self.session.is_active() {
                if let Some(command) = self.session.check_stop(hand) {
                    self.metrics.inc(&self.metrics.sessions_stopped);
                    self.debug_log.push("stop sequence recognized");
                    self.arbiter.set_pending(command);
                }
            }
            // A stop above re-opens the start sub-machine in the same frame.
            if !self.session.is_active() {
                if let Some(command) = self.session.check_start(hand) {
                    self.metrics.inc(&self.metrics.sessions_started);
                    self.debug_log.push("start sequence recognized");
                    self.arbiter.set_pending(command);
                }
            }
            if self.session.is_active() && !self.arbiter.has_pending() {
                if let Some(command) = self.classifier.classify(hand.palm_normal) {
                    self.arbiter.set_pending(command);
                }
            }
        }

        // Prolonged sensor silence while a session is open ends it.
        if !self.arbiter.has_pending() && self.session.is_active() && self.watchdog.is_latched() {
            self.session.force_stop();
            self.metrics.inc(&self.metrics.sessions_stopped);
            self.metrics.inc(&self.metrics.watchdog_stops);
            warn!("frame {}: watchdog forced session stop", frame.id);
            self.debug_log.push("watchdog forced stop");
            self.arbiter.set_pending(CommandKind::StopSession);
        }

        self.emit()
    }

    /// Manual-surface commands pass through the same lockout gate as
    /// gestures but do not touch session state: they forward tokens, the
    /// way the physical button panel does.
    pub fn manual_command(&mut self, command: CommandKind) -> Option<Emission> {
        if self.arbiter.is_locked() {
            self.metrics.inc(&self.metrics.manual_dropped_locked);
            debug!("manual {:?} dropped while locked", command);
            return None;
        }
        self.metrics.inc(&self.metrics.manual_commands);
        self.arbiter.set_pending(command);
        self.emit()
    }

    fn emit(&mut self) -> Option<Emission> {
        let emission = self.arbiter.try_emit()?;
        self.metrics.inc(&self.metrics.commands_emitted);
        info!(
            "emitting {:?} as \"{}\"",
            emission.command,
            emission.command.wire_token()
        );
        self.debug_log
            .push(&format!("send {}", emission.command.wire_token()));
        Some(emission)
    }

    pub fn session_phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn debug_log(&self) -> &DebugLog {
        &self.debug_log
    }

    #[cfg(test)]
    fn session(&self) -> &SessionTracker {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HandSample, Vec3};

    fn engine() -> GestureEngine {
        let config = Config::default();
        GestureEngine::new(&config, DebugLog::new(20), PipelineMetrics::new())
    }

    fn frame(id: u64, hands: Vec<HandSample>) -> SensorFrame {
        SensorFrame { id, hands }
    }

    fn hand(grab: f32, pinch: f32, normal: Vec3) -> HandSample {
        HandSample {
            id: 1,
            grab_strength: grab,
            pinch_strength: pinch,
            palm_position: Vec3::new(5.0, 180.0, 0.0),
            palm_normal: normal,
        }
    }

    fn flat_hand(grab: f32) -> HandSample {
        hand(grab, 0.0, Vec3::new(0.0, -1.0, 0.0))
    }

    /// Run the open→close→open start sequence and return the emission of
    /// the activating frame.
    fn start_session(engine: &mut GestureEngine, first_id: u64) -> Option<Emission> {
        let mut last = None;
        for (i, grab) in [0.0, 1.0, 0.0].into_iter().enumerate() {
            last = engine.process_frame(&frame(first_id + i as u64, vec![flat_hand(grab)]));
        }
        last
    }

    fn unlock(engine: &mut GestureEngine, emission: Emission) {
        engine.handle(EngineEvent::LockoutExpired(emission.token));
    }

    #[test]
    fn scenario_a_start_sequence_emits_start_mode3() {
        let mut e = engine();
        let emission = start_session(&mut e, 1).unwrap();
        assert_eq!(emission.command, CommandKind::StartSession);
        assert_eq!(emission.command.wire_token(), "start_mode3");
        assert_eq!(e.session_phase(), SessionPhase::Active);
    }

    #[test]
    fn scenario_b_sustained_pinch_emits_stop() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        unlock(&mut e, start);

        let pinching = hand(0.5, 0.95, Vec3::new(0.0, -1.0, 0.0));
        let mut emission = None;
        for i in 0..11 {
            emission = e.process_frame(&frame(10 + i, vec![pinching]));
            if i < 10 {
                assert!(emission.is_none(), "stopped early on frame {}", i);
            }
        }
        let emission = emission.unwrap();
        assert_eq!(emission.command, CommandKind::StopSession);
        assert_eq!(emission.command.wire_token(), "stop");
        assert_eq!(e.session_phase(), SessionPhase::Idle);
    }

    #[test]
    fn scenario_c_forward_tilt_emits_gorectp_p() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        unlock(&mut e, start);

        let tilted = hand(0.5, 0.0, Vec3::new(0.0, 1.0, 0.7));
        let emission = e.process_frame(&frame(10, vec![tilted])).unwrap();
        assert_eq!(emission.command, CommandKind::WalkRectIncrement);
        assert_eq!(emission.command.wire_token(), "gorectp_p");
        assert_eq!(e.session_phase(), SessionPhase::Active);
    }

    #[test]
    fn scenario_d_sensor_silence_forces_stop() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        unlock(&mut e, start);

        let mut emission = None;
        for i in 0..80 {
            emission = e.process_frame(&frame(10 + i, vec![]));
            if i < 79 {
                assert!(emission.is_none(), "forced stop early on frame {}", i);
            }
        }
        let emission = emission.unwrap();
        assert_eq!(emission.command, CommandKind::StopSession);
        assert_eq!(e.session_phase(), SessionPhase::Idle);
        assert_eq!(
            e.metrics().summary().watchdog_stops,
            1
        );
    }

    #[test]
    fn locked_frames_suspend_everything_but_watchdog_bookkeeping() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        // Still locked from the start emission.
        let pinching = hand(0.5, 0.95, Vec3::new(0.0, -1.0, 0.0));
        for i in 0..30 {
            assert!(e.process_frame(&frame(10 + i, vec![pinching])).is_none());
        }
        assert_eq!(e.session_phase(), SessionPhase::Active);
        assert_eq!(e.session().pinch_counter(), 0);

        // Tilt gestures are suspended too.
        let tilted = hand(0.5, 0.0, Vec3::new(0.0, 1.0, 0.9));
        assert!(e.process_frame(&frame(50, vec![tilted])).is_none());

        // After expiry the same input classifies again.
        unlock(&mut e, start);
        let emission = e.process_frame(&frame(51, vec![tilted])).unwrap();
        assert_eq!(emission.command, CommandKind::WalkRectIncrement);
    }

    #[test]
    fn no_second_command_before_lockout_expiry() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        unlock(&mut e, start);

        let tilted = hand(0.5, 0.0, Vec3::new(0.0, 1.0, 0.7));
        let first = e.process_frame(&frame(10, vec![tilted])).unwrap();
        // Same physical gesture held across frames produces exactly one
        // command until the lockout expires.
        for i in 11..20 {
            assert!(e.process_frame(&frame(i, vec![tilted])).is_none());
        }
        unlock(&mut e, first);
        assert!(e.process_frame(&frame(20, vec![tilted])).is_some());
    }

    #[test]
    fn watchdog_counts_during_lockout() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        // 79 handless frames under lockout, then expiry: the 80th frame
        // latches and forces the stop.
        for i in 0..79 {
            assert!(e.process_frame(&frame(10 + i, vec![])).is_none());
        }
        unlock(&mut e, start);
        let emission = e.process_frame(&frame(89, vec![])).unwrap();
        assert_eq!(emission.command, CommandKind::StopSession);
    }

    #[test]
    fn no_gesture_commands_outside_a_session() {
        let mut e = engine();
        let tilted = hand(0.5, 0.0, Vec3::new(0.0, 1.0, 0.9));
        // Tilt before any session: grab 0.5 never advances the start
        // sequence and classification is session-gated.
        for i in 0..20 {
            assert!(e.process_frame(&frame(i, vec![tilted])).is_none());
        }
        assert_eq!(e.session_phase(), SessionPhase::Idle);
    }

    #[test]
    fn watchdog_latch_without_session_is_inert() {
        let mut e = engine();
        for i in 0..200 {
            assert!(e.process_frame(&frame(i, vec![])).is_none());
        }
        assert_eq!(e.session_phase(), SessionPhase::Idle);
    }

    #[test]
    fn round_trip_returns_to_pristine_state() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        unlock(&mut e, start);
        let pinching = hand(0.5, 0.95, Vec3::new(0.0, -1.0, 0.0));
        let mut stop = None;
        for i in 0..11 {
            stop = e.process_frame(&frame(10 + i, vec![pinching]));
        }
        unlock(&mut e, stop.unwrap());

        assert_eq!(e.session_phase(), SessionPhase::Idle);
        assert_eq!(e.session().pinch_counter(), 0);
        assert_eq!(e.session().reference_position(), None);
        assert!(!e.arbiter.is_locked());
        assert!(!e.arbiter.has_pending());

        // A fresh start sequence works exactly as the first one did.
        let again = start_session(&mut e, 100).unwrap();
        assert_eq!(again.command, CommandKind::StartSession);
    }

    #[test]
    fn stop_frame_reopens_start_sequence_same_frame() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        unlock(&mut e, start);

        // Ten qualifying pinch frames, then an eleventh that also shows an
        // open palm: the stop fires and the next start sequence reaches
        // step 1 within the same frame.
        let pinching = hand(0.5, 0.95, Vec3::new(0.0, -1.0, 0.0));
        for i in 0..10 {
            e.process_frame(&frame(10 + i, vec![pinching]));
        }
        let open_pinching = hand(0.0, 0.95, Vec3::new(0.0, -1.0, 0.0));
        let emission = e.process_frame(&frame(20, vec![open_pinching])).unwrap();
        assert_eq!(emission.command, CommandKind::StopSession);
        assert_eq!(e.session_phase(), SessionPhase::AwaitingStart { step: 1 });
    }

    #[test]
    fn manual_commands_respect_the_lockout_gate() {
        let mut e = engine();
        let emission = e.manual_command(CommandKind::WalkRectIncrement).unwrap();
        assert_eq!(emission.command.wire_token(), "gorectp_p");

        // Locked now: the next manual command is dropped, not queued.
        assert!(e.manual_command(CommandKind::StopSession).is_none());
        unlock(&mut e, emission);
        assert!(e.manual_command(CommandKind::StopSession).is_some());
        assert_eq!(e.metrics().summary().manual_dropped_locked, 1);
    }

    #[test]
    fn manual_commands_leave_session_state_alone() {
        let mut e = engine();
        let emission = e.manual_command(CommandKind::StartSession).unwrap();
        assert_eq!(e.session_phase(), SessionPhase::Idle);
        unlock(&mut e, emission);
        let emission = e.manual_command(CommandKind::StopSession).unwrap();
        assert_eq!(e.session_phase(), SessionPhase::Idle);
        unlock(&mut e, emission);
    }

    #[test]
    fn start_emission_locks_out_immediate_tilt() {
        let mut e = engine();
        start_session(&mut e, 1).unwrap();
        // Session just became active but the start emission holds the
        // lock; a tilted palm on the very next frame must wait.
        let tilted = hand(0.5, 0.0, Vec3::new(0.0, 1.0, 0.9));
        assert!(e.process_frame(&frame(4, vec![tilted])).is_none());
    }

    #[test]
    fn second_hand_is_ignored() {
        let mut e = engine();
        let start = start_session(&mut e, 1).unwrap();
        unlock(&mut e, start);

        // Hand 0 is flat; hand 1 is tilted hard. No command may result.
        let flat = hand(0.5, 0.0, Vec3::new(0.0, -1.0, 0.0));
        let tilted = hand(0.5, 0.0, Vec3::new(0.0, 1.0, 0.9));
        assert!(e
            .process_frame(&frame(10, vec![flat, tilted]))
            .is_none());
    }
}
