// src/pipeline/mod.rs

pub mod arbiter;
pub mod engine;
pub mod metrics;

pub use arbiter::{CommandArbiter, Emission};
pub use engine::{EngineEvent, GestureEngine};
pub use metrics::PipelineMetrics;
