//! Unified error type for the engine's boundary commands.

use duelgrid_queue::QueueError;
use duelgrid_session::SessionError;

/// Top-level error returned by [`Engine`](crate::Engine) commands.
///
/// Wraps the sub-crate errors with `#[from]`, so `?` converts them
/// automatically. Every variant is local and recoverable: the boundary
/// layer maps it to an error event for the offending client and moves on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The join payload is malformed: the named field is missing/blank.
    #[error("invalid player payload: missing {0}")]
    InvalidPlayer(&'static str),

    /// A queue-level error (duplicate connection).
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// A session-level error (not found, wrong session, not your turn,
    /// illegal move, already terminal).
    #[error(transparent)]
    Session(#[from] SessionError),
}
