//! Turn routing: which sub-board the next mover must play in.

use crate::{ActiveBoard, Position, WinnerBoard};
use tracing::instrument;

/// Computes the active board after a move into `cell`.
///
/// The cell just played names the sub-board the opponent must play in.
/// If that sub-board is already decided the constraint is waived.
#[instrument(skip(winners))]
pub fn next_active_board(cell: Position, winners: &WinnerBoard) -> ActiveBoard {
    if winners.is_decided(cell) {
        ActiveBoard::Any
    } else {
        ActiveBoard::Only(cell)
    }
}

/// Normalizes a stored constraint: a constraint naming a decided board
/// is no constraint at all.
pub fn normalize(active: ActiveBoard, winners: &WinnerBoard) -> ActiveBoard {
    match active {
        ActiveBoard::Only(pos) if winners.is_decided(pos) => ActiveBoard::Any,
        other => other,
    }
}

/// Sub-boards the next mover may play in.
pub fn playable_boards(active: ActiveBoard, winners: &WinnerBoard) -> Vec<Position> {
    match normalize(active, winners) {
        ActiveBoard::Only(pos) => vec![pos],
        ActiveBoard::Any => Position::ALL
            .iter()
            .copied()
            .filter(|pos| !winners.is_decided(*pos))
            .collect(),
    }
}
