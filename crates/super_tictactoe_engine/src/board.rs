//! Sub-boards, the big board and the winner-board.

use crate::rules;
use crate::{Cell, Player, Position, Resolution};

/// One of the nine inner 3x3 boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubBoard {
    /// Cells in row-major order (0-8).
    cells: [Cell; 9],
}

impl SubBoard {
    /// Creates an empty sub-board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sub-board from its cells.
    pub fn from_cells(cells: [Cell; 9]) -> Self {
        Self { cells }
    }

    /// Gets the cell at a position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.to_index()]
    }

    /// Sets the cell at a position.
    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.to_index()] = cell;
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// All cells.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Number of cells holding `player`'s mark.
    pub fn count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == Cell::Occupied(player))
            .count()
    }

    /// Resolves this sub-board.
    pub fn resolve(&self) -> Resolution {
        rules::resolve(&self.cells)
    }
}

/// The full 9x9 playing surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BigBoard {
    boards: [SubBoard; 9],
}

impl BigBoard {
    /// Creates an empty big board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a big board from its sub-boards.
    pub fn from_boards(boards: [SubBoard; 9]) -> Self {
        Self { boards }
    }

    /// Gets a sub-board.
    pub fn board(&self, pos: Position) -> &SubBoard {
        &self.boards[pos.to_index()]
    }

    pub(crate) fn board_mut(&mut self, pos: Position) -> &mut SubBoard {
        &mut self.boards[pos.to_index()]
    }

    /// Gets a cell by sub-board and cell position.
    pub fn cell(&self, board: Position, cell: Position) -> Cell {
        self.board(board).get(cell)
    }

    /// All sub-boards.
    pub fn boards(&self) -> &[SubBoard; 9] {
        &self.boards
    }

    /// Number of cells holding `player`'s mark across all sub-boards.
    pub fn count(&self, player: Player) -> usize {
        self.boards.iter().map(|b| b.count(player)).sum()
    }

    /// Formats the board as a 9x9 grid.
    ///
    /// Decided sub-boards keep their cells; `winners` is only used to
    /// mark them in the trailing legend.
    pub fn display(&self, winners: &WinnerBoard) -> String {
        let mut result = String::new();
        for band in 0..3 {
            for row in 0..3 {
                for stack in 0..3 {
                    let board = &self.boards[band * 3 + stack];
                    for col in 0..3 {
                        let symbol = match board.cells[row * 3 + col] {
                            Cell::Empty => '.',
                            Cell::Occupied(Player::X) => 'X',
                            Cell::Occupied(Player::O) => 'O',
                        };
                        result.push(symbol);
                    }
                    if stack < 2 {
                        result.push_str(" | ");
                    }
                }
                result.push('\n');
            }
            if band < 2 {
                result.push_str("----+-----+----\n");
            }
        }
        for pos in Position::ALL {
            let outcome = winners.get(pos);
            if outcome.is_decided() {
                result.push_str(&format!("{}: {}\n", pos, outcome));
            }
        }
        result
    }
}

/// Board of sub-board outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WinnerBoard {
    entries: [Resolution; 9],
}

impl WinnerBoard {
    /// Creates an all-undecided winner-board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a winner-board from its entries.
    pub fn from_entries(entries: [Resolution; 9]) -> Self {
        Self { entries }
    }

    /// Outcome of one sub-board.
    pub fn get(&self, pos: Position) -> Resolution {
        self.entries[pos.to_index()]
    }

    pub(crate) fn set(&mut self, pos: Position, outcome: Resolution) {
        self.entries[pos.to_index()] = outcome;
    }

    /// True if the sub-board at `pos` is won or drawn.
    pub fn is_decided(&self, pos: Position) -> bool {
        self.get(pos).is_decided()
    }

    /// All entries.
    pub fn entries(&self) -> &[Resolution; 9] {
        &self.entries
    }

    /// Resolves the match from the sub-board outcomes.
    pub fn resolve(&self) -> Resolution {
        rules::resolve(&self.entries)
    }
}
