//! Alternating marks invariant: X moves first, then strictly alternates.

use super::Invariant;
use crate::{GameState, Player};

/// Invariant: the count of X marks minus O marks is 0 or 1.
pub struct AlternatingMarksInvariant;

impl Invariant<GameState> for AlternatingMarksInvariant {
    fn holds(state: &GameState) -> bool {
        let x = state.big_board().count(Player::X);
        let o = state.big_board().count(Player::O);
        x == o || x == o + 1
    }

    fn description() -> &'static str {
        "Players alternate turns (X count minus O count is 0 or 1)"
    }
}
