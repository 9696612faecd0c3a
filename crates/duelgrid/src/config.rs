//! Engine configuration.

use std::time::Duration;

/// Tunables for the matchmaking and session lifecycle.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum skill-level difference the default pairing policy accepts.
    /// Ignored when a custom [`MatchPolicy`](duelgrid_queue::MatchPolicy)
    /// is installed.
    pub skill_tolerance: i32,

    /// How long a player may wait unmatched before being dropped from the
    /// queue and notified.
    pub queue_timeout: Duration,

    /// How long a session may sit without a successful move before it is
    /// aborted and both participants are notified.
    pub session_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            skill_tolerance: 2,
            queue_timeout: Duration::from_secs(30),
            session_timeout: Duration::from_secs(600),
        }
    }
}
