//! Settled boards invariant: the winner-board agrees with the cells.

use super::Invariant;
use crate::{GameState, Position};

/// Invariant: every winner-board entry equals what the resolver says
/// about the matching sub-board.
///
/// Sub-boards resolve on the move that decides them and are never
/// played again, so the stored outcome and a fresh resolution agree.
pub struct SettledBoardsInvariant;

impl Invariant<GameState> for SettledBoardsInvariant {
    fn holds(state: &GameState) -> bool {
        Position::ALL.iter().all(|&pos| {
            state.winners().get(pos) == state.big_board().board(pos).resolve()
        })
    }

    fn description() -> &'static str {
        "Winner-board matches the resolved sub-boards"
    }
}
