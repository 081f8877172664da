// src/pipeline/arbiter.rs
//
// Single serialization point for outbound commands. At most one command is
// pending per frame, and a fixed lockout window follows every emission:
// the robot is assumed busy until the window expires, and nothing else may
// be considered in the meantime.

use crate::types::CommandKind;
use tracing::{debug, warn};

/// An emitted command plus the token identifying the lockout window it
/// opened. Only the expiry carrying this token may clear the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emission {
    pub command: CommandKind,
    pub token: u64,
}

pub struct CommandArbiter {
    locked: bool,
    lock_token: u64,
    pending: Option<CommandKind>,
}

impl CommandArbiter {
    pub fn new() -> Self {
        Self {
            locked: false,
            lock_token: 0,
            pending: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the frame's command. Detectors are mutually exclusive, so a
    /// second set within one frame indicates a policy violation upstream;
    /// the first command wins.
    pub fn set_pending(&mut self, command: CommandKind) {
        if let Some(existing) = self.pending {
            warn!(
                "pending command {:?} already set, dropping {:?}",
                existing, command
            );
            return;
        }
        self.pending = Some(command);
    }

    /// Consume the pending command if the lockout allows it. Locking and
    /// emission are one step: `locked` transitions false→true exactly when
    /// an emission is returned.
    pub fn try_emit(&mut self) -> Option<Emission> {
        if self.locked {
            return None;
        }
        let command = self.pending.take()?;
        self.locked = true;
        self.lock_token = self.lock_token.wrapping_add(1);
        Some(Emission {
            command,
            token: self.lock_token,
        })
    }

    /// Lockout timer expiry. A stale token (from an older emission) is
    /// ignored; nothing else may clear the lock early.
    pub fn lockout_expired(&mut self, token: u64) {
        if self.locked && token == self.lock_token {
            self.locked = false;
            debug!("lockout cleared");
        } else {
            debug!("ignoring stale lockout token {}", token);
        }
    }
}
