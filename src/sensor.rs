// src/sensor.rs
//
// Sensor frame source. Connects to the motion-sensor daemon over TCP and
// forwards newline-delimited JSON frames into the engine's event queue.
// Malformed lines are counted and skipped; a dropped connection is retried
// with a fixed delay. Frames are never buffered across reconnects.

use crate::pipeline::engine::EngineEvent;
use crate::pipeline::metrics::PipelineMetrics;
use crate::types::{SensorConfig, SensorFrame};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};

pub async fn run(config: SensorConfig, tx: Sender<EngineEvent>, metrics: PipelineMetrics) {
    let addr = format!("{}:{}", config.host, config.port);
    loop {
        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                info!("sensor connected at {}", addr);
                read_frames(stream, &tx, &metrics).await;
                warn!("sensor stream ended, reconnecting");
            }
            Err(e) => {
                warn!("sensor connect to {} failed: {}", addr, e);
            }
        }
        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(Duration::from_secs(config.reconnect_delay_secs)).await;
    }
}

async fn read_frames(stream: TcpStream, tx: &Sender<EngineEvent>, metrics: &PipelineMetrics) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<SensorFrame>(line) {
                    Ok(frame) => {
                        if tx.send(EngineEvent::Frame(frame)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        metrics.inc(&metrics.malformed_frames);
                        debug!("skipping malformed sensor line: {}", e);
                    }
                }
            }
            Ok(None) => return,
            Err(e) => {
                warn!("sensor read error: {}", e);
                return;
            }
        }
    }
}
