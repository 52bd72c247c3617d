//! Active-board invariant: a constraint never names a decided board.

use super::Invariant;
use crate::{ActiveBoard, GameState};

/// Invariant: the active board is `Any` or an undecided sub-board.
pub struct ActiveBoardInvariant;

impl Invariant<GameState> for ActiveBoardInvariant {
    fn holds(state: &GameState) -> bool {
        match state.active_board() {
            ActiveBoard::Any => true,
            ActiveBoard::Only(pos) => !state.winners().is_decided(pos),
        }
    }

    fn description() -> &'static str {
        "Active board is normalized (never a decided sub-board)"
    }
}
