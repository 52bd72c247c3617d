//! Monotonic board invariants: marks and outcomes never change once set.

use super::TransitionInvariant;
use crate::{Cell, GameState, Position};

/// Invariant: an occupied cell keeps its mark.
pub struct MonotonicBoardInvariant;

impl TransitionInvariant<GameState> for MonotonicBoardInvariant {
    fn holds(before: &GameState, after: &GameState) -> bool {
        Position::ALL.iter().all(|&board| {
            Position::ALL.iter().all(|&cell| {
                let was = before.big_board().cell(board, cell);
                was == Cell::Empty || was == after.big_board().cell(board, cell)
            })
        })
    }

    fn description() -> &'static str {
        "Board cells are monotonic (never overwritten)"
    }
}

/// Invariant: a decided sub-board keeps its outcome and its cells.
pub struct FrozenOutcomesInvariant;

impl TransitionInvariant<GameState> for FrozenOutcomesInvariant {
    fn holds(before: &GameState, after: &GameState) -> bool {
        Position::ALL.iter().all(|&pos| {
            !before.winners().is_decided(pos)
                || (before.winners().get(pos) == after.winners().get(pos)
                    && before.big_board().board(pos) == after.big_board().board(pos))
        })
    }

    fn description() -> &'static str {
        "Decided sub-boards never change"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Player, Roster};

    #[test]
    fn test_new_mark_holds() {
        let before = GameState::new(&Roster::new("host"));
        let mut after = before.clone();
        after
            .big_board
            .board_mut(Position::Center)
            .set(Position::Center, Cell::Occupied(Player::X));
        assert!(MonotonicBoardInvariant::holds(&before, &after));
        assert!(FrozenOutcomesInvariant::holds(&before, &after));
    }

    #[test]
    fn test_overwrite_violates() {
        let mut before = GameState::new(&Roster::new("host"));
        before
            .big_board
            .board_mut(Position::Center)
            .set(Position::Center, Cell::Occupied(Player::X));
        let mut after = before.clone();
        after
            .big_board
            .board_mut(Position::Center)
            .set(Position::Center, Cell::Occupied(Player::O));
        assert!(!MonotonicBoardInvariant::holds(&before, &after));
    }
}
