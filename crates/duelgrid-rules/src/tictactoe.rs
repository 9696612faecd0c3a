//! The reference ruleset: a 3×3 marking board.
//!
//! First seat marks `X`, second seat marks `O`. Three equal marks in any
//! row, column, or diagonal win; a full board with no line is a draw.

use duelgrid_protocol::Seat;
use serde::{Deserialize, Serialize};

use crate::{Applied, MoveError, RuleSet, Verdict};

/// One cell of the board. Serialized as `"-"`, `"X"`, `"O"` so a board
/// snapshot reads as the familiar three-row grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[serde(rename = "-")]
    Empty,
    X,
    O,
}

impl Cell {
    /// The mark the given seat places.
    pub fn for_seat(seat: Seat) -> Cell {
        match seat {
            Seat::First => Cell::X,
            Seat::Second => Cell::O,
        }
    }
}

/// The 3×3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; 3]; 3],
}

impl Board {
    /// An all-empty board.
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; 3]; 3],
        }
    }

    /// The mark at `(row, col)`. Panics on out-of-range indices, which the
    /// ruleset has already rejected by the time it reads the board.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// `true` once no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|c| *c != Cell::Empty))
    }

    /// Whether `mark` owns a completed line.
    ///
    /// Scans all 8 lines: 3 rows, 3 columns, 2 diagonals. A single move
    /// can complete two lines at once (a row and a column, say), but they
    /// necessarily belong to the same mover, so "any line" is the whole
    /// answer.
    fn has_line(&self, mark: Cell) -> bool {
        let b = &self.cells;
        (0..3).any(|i| (0..3).all(|j| b[i][j] == mark))
            || (0..3).any(|j| (0..3).all(|i| b[i][j] == mark))
            || (0..3).all(|i| b[i][i] == mark)
            || (0..3).all(|i| b[i][2 - i] == mark)
    }
}

/// A move: mark the cell at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub row: usize,
    pub col: usize,
}

/// The reference game.
pub struct TicTacToe;

impl RuleSet for TicTacToe {
    type Board = Board;
    type Move = Place;

    fn initial() -> Board {
        Board::empty()
    }

    fn apply(
        board: &Board,
        seat: Seat,
        mv: &Place,
    ) -> Result<Applied<Board>, MoveError> {
        if mv.row >= 3 || mv.col >= 3 {
            return Err(MoveError::OutOfBounds {
                row: mv.row,
                col: mv.col,
            });
        }
        if board.cells[mv.row][mv.col] != Cell::Empty {
            return Err(MoveError::Occupied {
                row: mv.row,
                col: mv.col,
            });
        }

        let mark = Cell::for_seat(seat);
        let mut next = *board;
        next.cells[mv.row][mv.col] = mark;

        let verdict = if next.has_line(mark) {
            Verdict::Win
        } else if next.is_full() {
            Verdict::Draw
        } else {
            Verdict::Continue
        };

        Ok(Applied {
            board: next,
            verdict,
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
