//! Rejection reasons for illegal moves.

/// Why a ruleset refused to apply a move.
///
/// Turn order is not checked here; the session layer rejects
/// out-of-turn moves before the ruleset ever sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The targeted cell lies outside the board.
    #[error("cell ({row}, {col}) is out of bounds")]
    OutOfBounds { row: usize, col: usize },

    /// The targeted cell already carries a mark.
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },
}
