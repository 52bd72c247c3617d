//! Status/outcome coupling: a match has a winner iff it is over.

use super::Invariant;
use crate::{GameState, GameStatus, Resolution};

/// Invariant: `Win` pairs with a winning player, `Tie` with a draw, and
/// non-terminal statuses with an undecided match.
pub struct OutcomeCouplingInvariant;

impl Invariant<GameState> for OutcomeCouplingInvariant {
    fn holds(state: &GameState) -> bool {
        matches!(
            (state.status(), state.match_winner()),
            (GameStatus::Waiting | GameStatus::Playing, Resolution::Undecided)
                | (GameStatus::Win, Resolution::Won(_))
                | (GameStatus::Tie, Resolution::Draw)
        )
    }

    fn description() -> &'static str {
        "Match winner is set exactly when the game is over"
    }
}
