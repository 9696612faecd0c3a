//! Error types for the session layer.

use duelgrid_protocol::{ConnectionId, SessionId};
use duelgrid_rules::MoveError;

/// Errors that can occur while operating on sessions.
///
/// All of these are recoverable and reported back to the caller as typed
/// outcomes; none of them corrupt the session or its neighbors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// No session exists under this id. Also returned when the session's
    /// actor has already stopped; a torn-down session is
    /// indistinguishable from one that never existed, and it never
    /// comes back.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The connection is not one of the session's two participants.
    #[error("connection {0} is not a participant in session {1}")]
    WrongSession(ConnectionId, SessionId),

    /// The acting seat does not hold the turn.
    #[error("not your turn")]
    NotYourTurn,

    /// A move arrived after the session reached game over.
    #[error("session {0} has already ended")]
    AlreadyTerminal(SessionId),

    /// The ruleset rejected the move.
    #[error(transparent)]
    IllegalMove(#[from] MoveError),
}
