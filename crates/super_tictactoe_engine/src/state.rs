//! Complete match state.

use crate::routing;
use crate::wire::GameRecord;
use crate::{
    ActiveBoard, BigBoard, GameStatus, Player, PlayerId, Position, Resolution, Roster, Score,
    WinnerBoard,
};
use serde::{Deserialize, Serialize};

/// Everything a participant or renderer needs to know about a match.
///
/// Values are immutable from the outside; new states come only from the
/// engine's transitions. Serializes to the shared JSON record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameRecord", into = "GameRecord")]
pub struct GameState {
    pub(crate) big_board: BigBoard,
    pub(crate) winners: WinnerBoard,
    pub(crate) turn: PlayerId,
    pub(crate) status: GameStatus,
    pub(crate) active: ActiveBoard,
    pub(crate) score: Score,
    pub(crate) match_winner: Resolution,
}

impl GameState {
    /// Creates the state of a fresh match: empty boards, `Waiting`, host to move.
    pub fn new(roster: &Roster) -> Self {
        Self::with_score(roster, Score::default())
    }

    /// Fresh boards carrying an existing score.
    pub(crate) fn with_score(roster: &Roster, score: Score) -> Self {
        Self {
            big_board: BigBoard::new(),
            winners: WinnerBoard::new(),
            turn: roster.host().to_string(),
            status: GameStatus::Waiting,
            active: ActiveBoard::Any,
            score,
            match_winner: Resolution::Undecided,
        }
    }

    /// Assembles a state from parts without checking invariants.
    ///
    /// Intended for decoders and tests; use [`crate::audit`] to check the
    /// result.
    pub fn from_parts(
        big_board: BigBoard,
        winners: WinnerBoard,
        turn: PlayerId,
        status: GameStatus,
        active: ActiveBoard,
        score: Score,
        match_winner: Resolution,
    ) -> Self {
        Self {
            big_board,
            winners,
            turn,
            status,
            active,
            score,
            match_winner,
        }
    }

    /// The 9x9 surface.
    pub fn big_board(&self) -> &BigBoard {
        &self.big_board
    }

    /// Sub-board outcomes.
    pub fn winners(&self) -> &WinnerBoard {
        &self.winners
    }

    /// Identity allowed to move next.
    pub fn turn(&self) -> &str {
        &self.turn
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Active-board constraint as stored.
    pub fn active_board(&self) -> ActiveBoard {
        self.active
    }

    /// Match score.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Outcome of the whole match.
    pub fn match_winner(&self) -> Resolution {
        self.match_winner
    }

    /// Symbol that moves next under strict alternation.
    pub fn symbol_to_move(&self) -> Player {
        if self.big_board.count(Player::X) > self.big_board.count(Player::O) {
            Player::O
        } else {
            Player::X
        }
    }

    /// Total marks on the big board.
    pub fn moves_played(&self) -> usize {
        self.big_board.count(Player::X) + self.big_board.count(Player::O)
    }

    /// Sub-boards the next mover may play in; empty once terminal.
    pub fn playable_boards(&self) -> Vec<Position> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        routing::playable_boards(self.active, &self.winners)
    }

    /// Every legal `(board, cell)` pair for the next mover.
    pub fn legal_moves(&self) -> Vec<(Position, Position)> {
        self.playable_boards()
            .into_iter()
            .flat_map(|board| {
                let sub = self.big_board.board(board);
                Position::ALL
                    .into_iter()
                    .filter(move |cell| sub.is_empty(*cell))
                    .map(move |cell| (board, cell))
            })
            .collect()
    }

    /// Formats the board and a status line.
    pub fn display(&self) -> String {
        let mut text = self.big_board.display(&self.winners);
        let active = match routing::normalize(self.active, &self.winners) {
            ActiveBoard::Any => "any".to_string(),
            ActiveBoard::Only(pos) => pos.label().to_string(),
        };
        text.push_str(&format!(
            "status: {:?} | turn: {} ({}) | active: {} | score X {} - O {}",
            self.status,
            self.turn,
            self.symbol_to_move(),
            active,
            self.score.of(Player::X),
            self.score.of(Player::O),
        ));
        if self.match_winner.is_decided() {
            text.push_str(&format!(" | result: {}", self.match_winner));
        }
        text.push('\n');
        text
    }
}
