// src/robot.rs
//
// Robot command sink. Wraps the skill transport: a JSON POST of
// { skillID, data } to the robot bridge endpoint. Transmission is
// fire-and-forget; a failure is logged and never reaches the state
// machine. With no endpoint configured, a log-only stand-in is used so
// the detection logic runs identically without hardware.

use crate::pipeline::metrics::PipelineMetrics;
use crate::types::{CommandKind, RobotConfig};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Serialize)]
struct CommandPayload<'a> {
    #[serde(rename = "skillID")]
    skill_id: &'a str,
    data: &'a str,
}

#[derive(Clone)]
pub struct RobotClient {
    skill_id: String,
    transport: Transport,
    metrics: PipelineMetrics,
}

#[derive(Clone)]
enum Transport {
    Http {
        client: reqwest::Client,
        endpoint: String,
    },
    LogOnly,
}

impl RobotClient {
    pub fn new(config: &RobotConfig, metrics: PipelineMetrics) -> Self {
        let transport = if config.endpoint.is_empty() {
            warn!("no robot endpoint configured, using log-only sink");
            Transport::LogOnly
        } else {
            match reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
            {
                Ok(client) => Transport::Http {
                    client,
                    endpoint: config.endpoint.clone(),
                },
                Err(e) => {
                    error!("robot client build failed, using log-only sink: {}", e);
                    Transport::LogOnly
                }
            }
        };
        Self {
            skill_id: config.skill_id.clone(),
            transport,
            metrics,
        }
    }

    pub async fn send(&self, command: CommandKind) {
        self.send_raw(command.wire_token()).await;
    }

    /// Lowest send layer. Transmission is skipped entirely for an empty
    /// token; no outcome is ever surfaced to the caller.
    pub async fn send_raw(&self, data: &str) {
        if data.is_empty() {
            return;
        }
        match &self.transport {
            Transport::LogOnly => {
                info!("robot (log-only) {} <- \"{}\"", self.skill_id, data);
            }
            Transport::Http { client, endpoint } => {
                let payload = CommandPayload {
                    skill_id: &self.skill_id,
                    data,
                };
                match client.post(endpoint).json(&payload).send().await {
                    Ok(resp) if resp.status().is_success() => {
                        info!("robot {} <- \"{}\" ({})", self.skill_id, data, resp.status());
                    }
                    Ok(resp) => {
                        self.metrics.inc(&self.metrics.send_failures);
                        warn!("robot rejected \"{}\": HTTP {}", data, resp.status());
                    }
                    Err(e) => {
                        self.metrics.inc(&self.metrics.send_failures);
                        error!("robot unreachable, dropping \"{}\": {}", data, e);
                    }
                }
            }
        }
    }
}
