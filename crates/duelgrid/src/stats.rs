//! The stats/history collaborator seam.
//!
//! The engine does not own persistence. When a session ends with a result,
//! it hands the outcome to a [`StatsStore`] (a database, an HTTP service,
//! an in-memory test double) and does not care whether the write lands:
//! a failure is logged and swallowed, never rolled back into the session.

use std::fmt;

/// A match outcome as recorded against the history store, relative to
/// player 1 (the first-mover): `Win` means player 1 won, `Loss` means
/// player 2 did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Win => write!(f, "win"),
            MatchResult::Loss => write!(f, "loss"),
            MatchResult::Draw => write!(f, "draw"),
        }
    }
}

/// A failure reported by a [`StatsStore`] implementation.
///
/// Deliberately opaque: the engine only logs it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("stats store error: {0}")]
pub struct StatsError(pub String);

/// Records finished matches: win/loss/draw counters per username plus a
/// completed-match record.
///
/// Called exactly once per terminal session, from a spawned task, so
/// implementations may take their time without delaying teardown. Aborted
/// sessions (disconnect, inactivity) are never recorded.
pub trait StatsStore: Send + Sync + 'static {
    /// Records one finished match.
    ///
    /// - `winner` — the winning username, or `None` for a draw
    /// - `player1` / `player2` — usernames in seat order
    /// - `outcome` — the result relative to `player1`
    fn record_result(
        &self,
        winner: Option<&str>,
        player1: &str,
        player2: &str,
        outcome: MatchResult,
    ) -> impl std::future::Future<Output = Result<(), StatsError>> + Send;
}
