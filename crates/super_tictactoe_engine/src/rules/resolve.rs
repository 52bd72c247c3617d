//! Grid resolution: winner first, then inevitable draw.

use super::{check_winner, is_draw_inevitable, LineMark};
use crate::Resolution;
use tracing::{debug, instrument};

/// Resolves a grid to its outcome.
///
/// Serves both the sub-board resolver (grid of cells) and the
/// meta-board resolver (grid of sub-board outcomes).
#[instrument(skip(cells))]
pub fn resolve<T: LineMark>(cells: &[T; 9]) -> Resolution {
    if let Some(winner) = check_winner(cells) {
        debug!(?winner, "Grid won");
        return Resolution::Won(winner);
    }
    if is_draw_inevitable(cells) {
        debug!("Grid drawn");
        return Resolution::Draw;
    }
    Resolution::Undecided
}
