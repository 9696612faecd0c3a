//! Identity types shared by the queue, the session layer, and the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque handle to a transport endpoint.
///
/// This is the identity used for matching and routing: a username may
/// reconnect under a new `ConnectionId`, but a `ConnectionId` belongs to
/// exactly one live connection. The transport layer assigns these; the
/// engine only compares and routes on them.
///
/// `#[serde(transparent)]` makes `ConnectionId(42)` serialize as `42`, not
/// `{ "0": 42 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A unique identifier for one match between two players.
///
/// Minted as a fresh random token when the session is created, stable for
/// the session's lifetime, and the key under which both participants route
/// their moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an already-minted token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player as submitted on join.
///
/// Usernames are not required to be unique across the system; uniqueness
/// within a queue or session is enforced on `connection`, not `username`.
/// Once a player is matched, the session holds its own copy of this record;
/// the queue entry is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name; also the key the stats collaborator records under.
    pub username: String,
    /// Skill rating used by the pairing policy.
    pub skill_level: i32,
    /// Region token; only same-region players are paired.
    pub region: String,
    /// The transport endpoint this player is reachable on.
    pub connection: ConnectionId,
}

// ---------------------------------------------------------------------------
// Seat / Turn
// ---------------------------------------------------------------------------

/// Which side of the board a participant occupies.
///
/// Seat order is arrival order at match time: the earlier queue entry gets
/// `First` and moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// The opposing seat.
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// The turn value during which this seat may move.
    pub fn turn(self) -> Turn {
        match self {
            Seat::First => Turn::First,
            Seat::Second => Turn::Second,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::First => write!(f, "first"),
            Seat::Second => write!(f, "second"),
        }
    }
}

/// The turn pointer of a session.
///
/// `GameOver` is set exactly when a winner or a draw has been recorded;
/// once set, no further moves are accepted and the only remaining
/// transition is destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    First,
    Second,
    GameOver,
}

impl Turn {
    /// `Some(seat)` while the game is live, `None` once it's over.
    pub fn seat(self) -> Option<Seat> {
        match self {
            Turn::First => Some(Seat::First),
            Turn::Second => Some(Seat::Second),
            Turn::GameOver => None,
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Turn::First => write!(f, "first"),
            Turn::Second => write!(f, "second"),
            Turn::GameOver => write!(f, "game-over"),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
