use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub arbiter: ArbiterConfig,
    #[serde(default)]
    pub debug_log: DebugLogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub host: String,
    pub port: u16,
    pub reconnect_delay_secs: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6437,
            reconnect_delay_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Empty endpoint means "no robot": the log-only sink is used.
    pub endpoint: String,
    pub skill_id: String,
    pub request_timeout_secs: u64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            skill_id: "MultiHexaLeapMotSkill".to_string(),
            request_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub pinch_strength_threshold: f32,
    /// Stop fires once the pinch counter exceeds this value.
    pub pinch_stop_count: u32,
    pub tilt_threshold_rad: f32,
    pub no_hand_frame_limit: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            pinch_strength_threshold: 0.80,
            pinch_stop_count: 10,
            tilt_threshold_rad: 0.5236, // 30 degrees
            no_hand_frame_limit: 80,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbiterConfig {
    /// Assumed robot execution time per command.
    pub lockout_ms: u64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self { lockout_ms: 2500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugLogConfig {
    pub capacity: usize,
}

impl Default for DebugLogConfig {
    fn default() -> Self {
        Self { capacity: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "gesture_bridge=info".to_string(),
        }
    }
}

/// Millimeter-scale position or unit direction vector in sensor space.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One tracked hand as reported by the sensor for a single frame.
/// Strengths are sensor-normalized to [0, 1] with saturated extremes.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandSample {
    #[serde(default)]
    pub id: i32,
    pub grab_strength: f32,
    pub pinch_strength: f32,
    pub palm_position: Vec3,
    pub palm_normal: Vec3,
}

/// One sensor frame: zero or more tracked hands in acquisition order.
/// Unknown wire fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorFrame {
    pub id: u64,
    #[serde(default)]
    pub hands: Vec<HandSample>,
}

/// Closed command vocabulary. Serialized to wire tokens only at the
/// robot sink boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    StartSession,
    StopSession,
    WalkRectIncrement,
    WalkRectDecrement,
}

impl CommandKind {
    pub fn wire_token(self) -> &'static str {
        match self {
            CommandKind::StartSession => "start_mode3",
            CommandKind::StopSession => "stop",
            CommandKind::WalkRectIncrement => "gorectp_p",
            CommandKind::WalkRectDecrement => "gorectp_n",
        }
    }

    /// Manual-surface input: wire tokens plus human aliases.
    pub fn from_manual_input(input: &str) -> Option<Self> {
        match input.trim() {
            "start" | "start_mode3" => Some(CommandKind::StartSession),
            "stop" => Some(CommandKind::StopSession),
            "inc" | "faster" | "gorectp_p" => Some(CommandKind::WalkRectIncrement),
            "dec" | "slower" | "gorectp_n" => Some(CommandKind::WalkRectDecrement),
            _ => None,
        }
    }
}
