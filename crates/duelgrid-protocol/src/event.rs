//! Outbound events and the transport seam.
//!
//! The engine never talks to sockets. It hands [`Event`]s to a [`Notifier`]
//! (whatever the embedding server uses for delivery: a WebSocket hub, a
//! test recorder, an in-process channel) and moves on without waiting for
//! delivery confirmation.

use serde::{Deserialize, Serialize};

use crate::{ConnectionId, Player, Seat, SessionId, Turn};

/// Everything the engine can tell a connected client.
///
/// `#[serde(tag = "type", rename_all = "kebab-case")]` produces internally
/// tagged JSON with event names clients switch on:
/// `{ "type": "match-found", "session_id": "...", ... }`.
///
/// Board snapshots travel as opaque [`serde_json::Value`]s: the engine is
/// generic over the ruleset, so the board's shape is the ruleset's business
/// and the client's; everything in between just passes it through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    /// You have been paired. Sent to both participants at session creation.
    MatchFound {
        session_id: SessionId,
        seat: Seat,
        opponent: Player,
    },

    /// A legal move was applied. Sent to both participants.
    BoardUpdated {
        session_id: SessionId,
        board: serde_json::Value,
        next_turn: Turn,
    },

    /// The session reached a terminal outcome. `winner` is a username;
    /// `None` means a draw.
    GameOver {
        session_id: SessionId,
        winner: Option<String>,
    },

    /// You waited in the queue past the inactivity limit and were removed.
    QueueTimeout,

    /// The session went inactive past its limit and was torn down.
    /// Sent to both participants.
    SessionTimeout { session_id: SessionId },

    /// Your opponent's connection went away; the session is gone.
    OpponentDisconnected { session_id: SessionId },
}

/// Delivers engine events to connected clients.
///
/// Implemented by the boundary layer. Both methods are fire-and-forget:
/// delivery is assumed reliable and ordered per connection, and the engine
/// never blocks on it; implementations should enqueue and return (the
/// usual shape is an unbounded channel per connection).
pub trait Notifier: Send + Sync + 'static {
    /// Delivers one event to one connection.
    fn notify(&self, connection: ConnectionId, event: Event);

    /// Delivers the same event to every listed connection.
    fn broadcast(&self, connections: &[ConnectionId], event: Event) {
        for &connection in connections {
            self.notify(connection, event.clone());
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
