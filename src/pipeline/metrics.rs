// src/pipeline/metrics.rs
//
// Observability counters for the bridge. Shared by the engine, the sensor
// reader, and the robot sink; exported as periodic log summaries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub frames_with_hand: Arc<AtomicU64>,
    pub frames_without_hand: Arc<AtomicU64>,
    pub malformed_frames: Arc<AtomicU64>,
    pub sessions_started: Arc<AtomicU64>,
    pub sessions_stopped: Arc<AtomicU64>,
    pub watchdog_stops: Arc<AtomicU64>,
    pub commands_emitted: Arc<AtomicU64>,
    pub manual_commands: Arc<AtomicU64>,
    pub manual_dropped_locked: Arc<AtomicU64>,
    pub send_failures: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            frames_with_hand: Arc::new(AtomicU64::new(0)),
            frames_without_hand: Arc::new(AtomicU64::new(0)),
            malformed_frames: Arc::new(AtomicU64::new(0)),
            sessions_started: Arc::new(AtomicU64::new(0)),
            sessions_stopped: Arc::new(AtomicU64::new(0)),
            watchdog_stops: Arc::new(AtomicU64::new(0)),
            commands_emitted: Arc::new(AtomicU64::new(0)),
            manual_commands: Arc::new(AtomicU64::new(0)),
            manual_dropped_locked: Arc::new(AtomicU64::new(0)),
            send_failures: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            fps: self.fps(),
            frames_with_hand: self.frames_with_hand.load(Ordering::Relaxed),
            frames_without_hand: self.frames_without_hand.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_stopped: self.sessions_stopped.load(Ordering::Relaxed),
            watchdog_stops: self.watchdog_stops.load(Ordering::Relaxed),
            commands_emitted: self.commands_emitted.load(Ordering::Relaxed),
            manual_commands: self.manual_commands.load(Ordering::Relaxed),
            manual_dropped_locked: self.manual_dropped_locked.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub frames_with_hand: u64,
    pub frames_without_hand: u64,
    pub malformed_frames: u64,
    pub sessions_started: u64,
    pub sessions_stopped: u64,
    pub watchdog_stops: u64,
    pub commands_emitted: u64,
    pub manual_commands: u64,
    pub manual_dropped_locked: u64,
    pub send_failures: u64,
    pub elapsed_secs: f64,
}
