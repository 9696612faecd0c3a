//! Session configuration and lifecycle state machine.

use std::time::Duration;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for a session instance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a session may sit without a successful move before it is
    /// torn down and both participants are notified.
    pub inactivity_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(600),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// ```text
/// Active ──(winning/drawing move)──→ Finished ──→ (destroyed)
///    │
///    └──(disconnect | inactivity)──→ Aborted ───→ (destroyed)
/// ```
///
/// - **Active**: moves are being accepted; the turn pointer says whose.
/// - **Finished**: a winner or draw has been recorded. The turn pointer is
///   `GameOver`; no further moves are accepted.
/// - **Aborted**: torn down before a result (a participant disconnected
///   or the inactivity limit elapsed). No result is recorded.
///
/// There is no transition out of `Finished` or `Aborted` except destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Finished,
    Aborted,
}

impl SessionPhase {
    /// Returns `true` while the session accepts moves.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` once the session has ended, one way or the other.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Aborted)
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Active, Self::Finished) | (Self::Active, Self::Aborted)
        )
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Finished => write!(f, "Finished"),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}
