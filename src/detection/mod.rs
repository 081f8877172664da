// src/detection/mod.rs
//
// Per-frame detectors.
//
// Signal flow:
//   SensorFrame → extractor ─┬→ session (start/stop sequences) ─┐
//                            ├→ watchdog (no-hand latch)        ├→ arbiter
//                            └→ classifier (palm tilt)        ──┘

mod classifier;
mod extractor;
mod session;
mod watchdog;

// Re-export public APIs
pub use classifier::TiltClassifier;
pub use extractor::primary_hand;
pub use session::{SessionPhase, SessionTracker};
pub use watchdog::NoHandWatchdog;
