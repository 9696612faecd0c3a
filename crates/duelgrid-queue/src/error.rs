//! Error types for the matchmaking queue.

use duelgrid_protocol::ConnectionId;

/// Errors that can occur while mutating the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The connection already has a waiting entry. One entry per
    /// connection is the queue's core invariant.
    #[error("connection {0} is already waiting in the queue")]
    DuplicateConnection(ConnectionId),
}
