//! Line-winner evaluation.

use super::{line_claims, Claim, LineMark, LINES};
use crate::Player;
use tracing::instrument;

/// Checks if any line is held entirely by one player.
///
/// Returns the player owning the first complete line in canonical order
/// (rows, columns, diagonals). A grid where both players hold a line
/// cannot arise in play; it still gets a definite answer.
#[instrument(skip(cells))]
pub fn check_winner<T: LineMark>(cells: &[T; 9]) -> Option<Player> {
    LINES.iter().find_map(|line| match line_claims(cells, line) {
        [Claim::Owned(a), Claim::Owned(b), Claim::Owned(c)] if a == b && b == c => Some(a),
        _ => None,
    })
}
