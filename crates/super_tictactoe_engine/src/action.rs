//! First-class action types for Super Tic-Tac-Toe.
//!
//! A move is a player's intent: which sub-board and which cell. It is
//! validated against the current state before anything is applied.

use crate::{PlayerId, Position};
use serde::{Deserialize, Serialize};

/// A proposed move, as submitted by a participant.
///
/// Indices are raw so an out-of-range submission can be reported as
/// such instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The participant making the move.
    pub player: PlayerId,
    /// Sub-board index (0-8).
    pub board: usize,
    /// Cell index within the sub-board (0-8).
    pub cell: usize,
}

impl Move {
    /// Creates a new move.
    pub fn new(player: impl Into<PlayerId>, board: usize, cell: usize) -> Self {
        Self {
            player: player.into(),
            board,
            cell,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> board {}, cell {}", self.player, self.board, self.cell)
    }
}

/// Why a transition was rejected.
///
/// The display text is the short message shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The acting identity is neither host nor guest.
    #[display("You are not a player in this match")]
    NotAParticipant(PlayerId),

    /// One identity is seated as both host and guest.
    #[display("{} cannot hold both seats", _0)]
    SharedSeat(PlayerId),

    /// The acting identity does not hold the turn.
    #[display("It's not your turn")]
    NotYourTurn,

    /// The match has ended.
    #[display("The game is already over")]
    GameAlreadyOver,

    /// The guest seat is still empty.
    #[display("Waiting for an opponent to join")]
    WaitingForOpponent,

    /// Board or cell index outside 0-8.
    #[display("Board {} / cell {} is off the board", board, cell)]
    OutOfRange {
        /// Submitted board index.
        board: usize,
        /// Submitted cell index.
        cell: usize,
    },

    /// The target cell already holds a mark.
    #[display("That cell is already taken")]
    CellOccupied {
        /// Sub-board of the cell.
        board: Position,
        /// Cell within the sub-board.
        cell: Position,
    },

    /// The move ignores the active-board constraint.
    #[display("You must play in the {} board", required)]
    WrongActiveBoard {
        /// The sub-board the mover is routed to.
        required: Position,
    },

    /// The target sub-board is already won or drawn.
    #[display("The {} board is already decided", _0)]
    BoardAlreadyDecided(Position),

    /// A rematch was requested before the match ended.
    #[display("The game is still in progress")]
    GameNotFinished,

    /// A transition broke a game invariant (programming error).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}
