//! The `RuleSet` trait, the extension point for alternative games.

use duelgrid_protocol::Seat;
use serde::{Serialize, de::DeserializeOwned};

use crate::MoveError;

/// The contract a game implements to be hosted by the session engine.
///
/// `apply` is a pure function of `(board, seat, move)`: it never mutates its
/// input and holds no state between calls. That purity is what makes the
/// "rejection leaves the session untouched" guarantee trivial: on `Err`,
/// the caller simply keeps the board it already had.
pub trait RuleSet: Send + Sync + 'static {
    /// The full board state. Serializable so the engine can snapshot it
    /// into outbound events.
    type Board: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// A move as submitted by a player.
    type Move: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// The board a fresh session starts from.
    fn initial() -> Self::Board;

    /// Attempts to apply `mv` for the player in `seat`.
    ///
    /// Returns the successor board and a [`Verdict`], or a [`MoveError`]
    /// if the move is illegal against the current board.
    fn apply(
        board: &Self::Board,
        seat: Seat,
        mv: &Self::Move,
    ) -> Result<Applied<Self::Board>, MoveError>;
}

/// A legal move's outcome: the successor board plus the terminal check.
#[derive(Debug, Clone)]
pub struct Applied<B> {
    /// The board after the move.
    pub board: B,
    /// Whether the move ended the game.
    pub verdict: Verdict,
}

/// Terminal-state classification after a legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The game continues; the turn passes to the other seat.
    Continue,
    /// The acting seat won.
    Win,
    /// The board is exhausted with no winner.
    Draw,
}
