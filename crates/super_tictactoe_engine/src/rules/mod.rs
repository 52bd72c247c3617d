//! Game rules for Super Tic-Tac-Toe.
//!
//! Pure functions over a 3x3 grid of marks. The same rules judge a
//! sub-board (grid of cells) and the winner-board (grid of sub-board
//! outcomes), so they are written against [`LineMark`] rather than a
//! concrete board type.

pub mod draw;
pub mod resolve;
pub mod win;

pub use draw::is_draw_inevitable;
pub use resolve::resolve;
pub use win::check_winner;

use crate::{Cell, Player, Position, Resolution};

/// The 8 lines of a 3x3 grid: rows, then columns, then diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// What a single grid entry contributes to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// Nobody holds it yet.
    Open,
    /// Held by a player.
    Owned(Player),
    /// Held by nobody and never will be (a drawn sub-board).
    Dead,
}

/// A grid entry the line rules can judge.
pub trait LineMark: Copy {
    /// Claim this entry places on its lines.
    fn claim(self) -> Claim;
}

impl LineMark for Cell {
    fn claim(self) -> Claim {
        match self {
            Cell::Empty => Claim::Open,
            Cell::Occupied(player) => Claim::Owned(player),
        }
    }
}

impl LineMark for Resolution {
    fn claim(self) -> Claim {
        match self {
            Resolution::Undecided => Claim::Open,
            Resolution::Won(player) => Claim::Owned(player),
            Resolution::Draw => Claim::Dead,
        }
    }
}

/// Claims of the three entries of `line`.
pub(crate) fn line_claims<T: LineMark>(cells: &[T; 9], line: &[Position; 3]) -> [Claim; 3] {
    line.map(|pos| cells[pos.to_index()].claim())
}
