//! Early draw detection.

use super::{line_claims, Claim, LineMark, LINES};
use crate::Player;
use tracing::instrument;

/// True if `player` can still complete this line.
///
/// A line stays open for a player while it holds nothing but that
/// player's marks and open entries.
fn line_open_for(claims: &[Claim; 3], player: Player) -> bool {
    claims
        .iter()
        .all(|claim| matches!(claim, Claim::Open) || *claim == Claim::Owned(player))
}

/// Checks if a draw is already guaranteed.
///
/// Returns true when every line contains marks of both players (or a
/// dead entry), so neither player can ever complete one. Open entries
/// may remain; a full grid without a winner is the degenerate case.
#[instrument(skip(cells))]
pub fn is_draw_inevitable<T: LineMark>(cells: &[T; 9]) -> bool {
    !LINES.iter().any(|line| {
        let claims = line_claims(cells, line);
        line_open_for(&claims, Player::X) || line_open_for(&claims, Player::O)
    })
}

#[cfg(test)]
mod tests {
    use super::super::check_winner;
    use super::*;
    use crate::{Cell, Resolution};

    const E: Cell = Cell::Empty;
    const X: Cell = Cell::Occupied(Player::X);
    const O: Cell = Cell::Occupied(Player::O);

    /// Every way to fill the empty cells with X or O.
    fn fillings(cells: &[Cell; 9]) -> Vec<[Cell; 9]> {
        let empties: Vec<usize> = (0..9).filter(|&i| cells[i] == E).collect();
        (0..1u32 << empties.len())
            .map(|mask| {
                let mut filled = *cells;
                for (bit, &idx) in empties.iter().enumerate() {
                    filled[idx] = if mask & (1 << bit) == 0 { X } else { O };
                }
                filled
            })
            .collect()
    }

    fn some_filling_wins(cells: &[Cell; 9]) -> bool {
        fillings(cells).iter().any(|f| check_winner(f).is_some())
    }

    #[test]
    fn test_empty_board_not_draw() {
        assert!(!is_draw_inevitable(&[E; 9]));
    }

    #[test]
    fn test_full_board_without_winner() {
        // X O X / O X X / O X O
        let cells = [X, O, X, O, X, X, O, X, O];
        assert!(is_draw_inevitable(&cells));
    }

    #[test]
    fn test_draw_detected_before_board_is_full() {
        // X O X / X O O / O X _ : bottom-right can complete nothing.
        let cells = [X, O, X, X, O, O, O, X, E];
        assert!(is_draw_inevitable(&cells));
    }

    #[test]
    fn test_open_line_prevents_draw() {
        // X O X / O X O / _ _ _ : the main diagonal is still open for X.
        let cells = [X, O, X, O, X, O, E, E, E];
        assert!(!is_draw_inevitable(&cells));
    }

    #[test]
    fn test_winner_board_draw_entries_block_lines() {
        let x = Resolution::Won(Player::X);
        let o = Resolution::Won(Player::O);
        let d = Resolution::Draw;
        assert!(is_draw_inevitable(&[x, o, d, o, x, d, d, x, o]));

        let u = Resolution::Undecided;
        assert!(!is_draw_inevitable(&[x, o, d, o, u, d, d, x, u]));
        assert!(is_draw_inevitable(&[d, d, d, d, u, d, d, d, d]));
    }

    #[test]
    fn test_soundness_on_fixed_patterns() {
        let patterns = [
            [X, O, X, X, O, O, O, X, E],
            [X, O, X, O, X, O, E, E, E],
            [X, O, E, O, X, E, E, E, O],
            [X, O, X, O, O, X, E, X, E],
            [O, X, O, X, X, O, E, O, E],
            [E, E, E, E, E, E, E, E, E],
            [X, E, O, E, E, E, O, E, X],
        ];
        for cells in patterns {
            assert_eq!(
                is_draw_inevitable(&cells),
                !some_filling_wins(&cells),
                "pattern {:?}",
                cells
            );
        }
    }

    #[test]
    fn test_agrees_with_best_case_filling_on_every_grid() {
        // For each undecided grid, a player can complete a line iff filling
        // every empty cell with that player's mark completes one.
        for code in 0..3u32.pow(9) {
            let mut cells = [E; 9];
            let mut rest = code;
            for cell in cells.iter_mut() {
                *cell = match rest % 3 {
                    0 => E,
                    1 => X,
                    _ => O,
                };
                rest /= 3;
            }
            if check_winner(&cells).is_some() {
                continue;
            }
            let open_for = |mark: Cell| {
                let filled = cells.map(|c| if c == E { mark } else { c });
                check_winner(&filled).is_some()
            };
            assert_eq!(
                is_draw_inevitable(&cells),
                !(open_for(X) || open_for(O)),
                "grid {:?}",
                cells
            );
        }
    }
}
