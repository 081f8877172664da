// src/debug_log.rs
//
// Fixed-capacity ring of timestamped debug messages, injected into the
// engine and rendered oldest-to-newest. Purely observational: nothing
// reads it back into a decision.

use std::collections::VecDeque;

pub struct DebugLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl DebugLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Stamp and store a message, evicting the oldest entry once full.
    pub fn push(&mut self, message: &str) {
        if self.capacity == 0 {
            return;
        }
        let stamped = format!(
            "{}: {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            message
        );
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(stamped);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Join entries oldest-to-newest for display.
    pub fn render(&self) -> String {
        let lines: Vec<&str> = self.entries.iter().map(String::as_str).collect();
        lines.join("\n")
    }
}
