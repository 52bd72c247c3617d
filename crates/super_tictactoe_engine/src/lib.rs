//! Pure Super Tic-Tac-Toe rule engine.
//!
//! Nine tic-tac-toe boards arranged in a 3x3 grid. Winning a small board
//! claims its slot on the winner-board; three slots in a row win the
//! match. The cell a player picks decides which small board the opponent
//! must play in next.
//!
//! # Architecture
//!
//! - **Rules**: line-winner evaluation, early draw detection and grid
//!   resolution, shared by sub-boards and the winner-board
//! - **Routing**: which sub-board the next mover is sent to
//! - **Engine**: pure transitions (`apply_move`, `start`, `forfeit`,
//!   `rematch`) from one immutable [`GameState`] to the next
//! - **Contracts / invariants**: ordered preconditions and checked
//!   postconditions
//! - **Wire**: the JSON record exchanged with a state store
//!
//! # Example
//!
//! ```
//! use super_tictactoe_engine::{apply_move, start, ActiveBoard, GameState, Position, Roster};
//!
//! let roster = Roster::paired("alice", "bob");
//! let game = start(&GameState::new(&roster), &roster)?;
//! let game = apply_move(&game, &roster, "alice", 0, 4)?;
//! assert_eq!(game.active_board(), ActiveBoard::Only(Position::Center));
//! # Ok::<(), super_tictactoe_engine::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod engine;
mod position;
mod state;
mod types;

pub mod contracts;
pub mod invariants;
pub mod routing;
pub mod rules;
pub mod wire;

pub use action::{Move, MoveError};
pub use board::{BigBoard, SubBoard, WinnerBoard};
pub use engine::{apply_move, forfeit, rematch, replay, start};
pub use invariants::{audit, InvariantViolation};
pub use position::Position;
pub use state::GameState;
pub use types::{ActiveBoard, Cell, GameStatus, Player, PlayerId, Resolution, Roster, Score};
pub use wire::{GameRecord, WireError};
