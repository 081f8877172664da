// src/main.rs

mod config;
mod debug_log;
mod detection;
mod pipeline;
mod robot;
mod sensor;
mod types;

use anyhow::Result;
use debug_log::DebugLog;
use pipeline::engine::{EngineEvent, GestureEngine};
use pipeline::metrics::PipelineMetrics;
use robot::RobotClient;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use types::{CommandKind, Config};

const EVENT_QUEUE_DEPTH: usize = 64;
const SUMMARY_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.clone())
        .init();

    info!("🤖 Gesture Bridge Starting");
    info!(
        "Detection thresholds: pinch={:.2}, stop_count={}, tilt={:.4} rad, no_hand_frames={}",
        config.detection.pinch_strength_threshold,
        config.detection.pinch_stop_count,
        config.detection.tilt_threshold_rad,
        config.detection.no_hand_frame_limit
    );
    info!("Command lockout: {} ms", config.arbiter.lockout_ms);

    let metrics = PipelineMetrics::new();
    let robot = RobotClient::new(&config.robot, metrics.clone());
    let mut engine = GestureEngine::new(
        &config,
        DebugLog::new(config.debug_log.capacity),
        metrics.clone(),
    );
    info!("✓ Engine ready");

    let (tx, mut rx) = mpsc::channel::<EngineEvent>(EVENT_QUEUE_DEPTH);

    tokio::spawn(sensor::run(config.sensor.clone(), tx.clone(), metrics.clone()));
    tokio::spawn(manual_input(tx.clone()));

    let lockout = Duration::from_millis(config.arbiter.lockout_ms);
    let summary_period = Duration::from_secs(SUMMARY_INTERVAL_SECS);
    let mut summary_interval =
        tokio::time::interval_at(tokio::time::Instant::now() + summary_period, summary_period);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if let Some(emission) = engine.handle(event) {
                    dispatch(emission, &robot, &tx, lockout);
                }
            }
            _ = summary_interval.tick() => {
                let summary = engine.metrics().summary();
                info!(
                    "frames={} ({:.1}/s) sessions={}/{} commands={} send_failures={}",
                    summary.total_frames,
                    summary.fps,
                    summary.sessions_started,
                    summary.sessions_stopped,
                    summary.commands_emitted,
                    summary.send_failures
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }

    let summary = engine.metrics().summary();
    info!(
        "✓ Done. frames={} with_hand={} sessions={}/{} (watchdog {}) commands={} manual={}",
        summary.total_frames,
        summary.frames_with_hand,
        summary.sessions_started,
        summary.sessions_stopped,
        summary.watchdog_stops,
        summary.commands_emitted,
        summary.manual_commands
    );
    if !engine.debug_log().is_empty() {
        info!("Debug trail:\n{}", engine.debug_log().render());
    }
    Ok(())
}

/// Hand an emission to the runtime: transmit the command without awaiting
/// the outcome, and schedule the lockout expiry that re-arms the arbiter.
fn dispatch(
    emission: pipeline::arbiter::Emission,
    robot: &RobotClient,
    tx: &mpsc::Sender<EngineEvent>,
    lockout: Duration,
) {
    let robot = robot.clone();
    let command = emission.command;
    tokio::spawn(async move {
        robot.send(command).await;
    });

    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(lockout).await;
        let _ = tx.send(EngineEvent::LockoutExpired(emission.token)).await;
    });
}

/// Manual command surface: the four wire tokens (plus aliases) typed on
/// stdin, forwarded into the same event queue as sensor frames.
async fn manual_input(tx: mpsc::Sender<EngineEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match CommandKind::from_manual_input(input) {
            Some(command) => {
                if tx.send(EngineEvent::Manual(command)).await.is_err() {
                    return;
                }
            }
            None => warn!("unknown manual command: {:?}", input),
        }
    }
}
