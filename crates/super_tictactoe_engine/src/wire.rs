//! JSON record shared with the state store.
//!
//! The record mirrors the in-memory model field for field. Decoding is
//! where loosely typed JSON becomes closed enums: unknown symbols and
//! wrong array lengths fail in serde, range and coupling checks fail
//! here with a [`WireError`].

use crate::routing;
use crate::{
    ActiveBoard, BigBoard, Cell, GameState, GameStatus, Player, PlayerId, Resolution, Score,
    SubBoard, WinnerBoard,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Outcome entry as stored: `"X"`, `"O"` or `"draw"`; `null` is undecided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum WireOutcome {
    /// Won by X.
    X,
    /// Won by O.
    O,
    /// Drawn.
    #[serde(rename = "draw")]
    Draw,
}

impl WireOutcome {
    fn encode(outcome: Resolution) -> Option<Self> {
        match outcome {
            Resolution::Undecided => None,
            Resolution::Won(Player::X) => Some(WireOutcome::X),
            Resolution::Won(Player::O) => Some(WireOutcome::O),
            Resolution::Draw => Some(WireOutcome::Draw),
        }
    }

    fn decode(entry: Option<Self>) -> Resolution {
        match entry {
            None => Resolution::Undecided,
            Some(WireOutcome::X) => Resolution::Won(Player::X),
            Some(WireOutcome::O) => Resolution::Won(Player::O),
            Some(WireOutcome::Draw) => Resolution::Draw,
        }
    }
}

/// Persisted match state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// 9 sub-boards of 9 cells; `null` is empty.
    pub big_board: [[Option<Player>; 9]; 9],
    /// Outcome of each sub-board.
    pub winner_board: [Option<WireOutcome>; 9],
    /// Identity allowed to move next.
    pub turn: PlayerId,
    /// Lifecycle status.
    pub game_status: GameStatus,
    /// `-1` for any board, otherwise 0-8.
    pub active_board: i64,
    /// `[x_wins, o_wins]`.
    pub score: [u32; 2],
    /// Outcome of the match.
    pub whole_game_winner: Option<WireOutcome>,
}

/// A record that parsed but cannot be a match state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum WireError {
    /// `activeBoard` outside `[-1, 8]`.
    #[display("activeBoard {} is outside [-1, 8]", _0)]
    ActiveBoardOutOfRange(i64),

    /// Status and match winner disagree.
    #[display("gameStatus {:?} does not match wholeGameWinner {}", status, winner)]
    OutcomeMismatch {
        /// Stored status.
        status: GameStatus,
        /// Stored match winner.
        winner: Resolution,
    },
}

impl std::error::Error for WireError {}

impl From<GameState> for GameRecord {
    fn from(state: GameState) -> Self {
        let boards = *state.big_board.boards();
        let entries = *state.winners.entries();
        Self {
            big_board: boards.map(|board| (*board.cells()).map(Cell::player)),
            winner_board: entries.map(WireOutcome::encode),
            turn: state.turn,
            game_status: state.status,
            active_board: i64::from(state.active.to_wire()),
            score: state.score.to_pair(),
            whole_game_winner: WireOutcome::encode(state.match_winner),
        }
    }
}

impl TryFrom<GameRecord> for GameState {
    type Error = WireError;

    #[instrument(skip(record), fields(status = ?record.game_status))]
    fn try_from(record: GameRecord) -> Result<Self, Self::Error> {
        let big_board = BigBoard::from_boards(record.big_board.map(|cells| {
            SubBoard::from_cells(cells.map(|cell| cell.map_or(Cell::Empty, Cell::Occupied)))
        }));
        let winners = WinnerBoard::from_entries(record.winner_board.map(WireOutcome::decode));

        let stored = ActiveBoard::from_wire(record.active_board)
            .ok_or(WireError::ActiveBoardOutOfRange(record.active_board))?;
        let active = routing::normalize(stored, &winners);
        if active != stored {
            debug!(stored = record.active_board, "Normalized active board naming a decided sub-board");
        }

        let match_winner = WireOutcome::decode(record.whole_game_winner);
        let coupled = matches!(
            (record.game_status, match_winner),
            (GameStatus::Waiting | GameStatus::Playing, Resolution::Undecided)
                | (GameStatus::Win, Resolution::Won(_))
                | (GameStatus::Tie, Resolution::Draw)
        );
        if !coupled {
            return Err(WireError::OutcomeMismatch {
                status: record.game_status,
                winner: match_winner,
            });
        }

        let [x, o] = record.score;
        Ok(GameState::from_parts(
            big_board,
            winners,
            record.turn,
            record.game_status,
            active,
            Score::new(x, o),
            match_winner,
        ))
    }
}

/// Encodes a state as its JSON record.
pub fn to_json(state: &GameState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Decodes a state from its JSON record.
pub fn from_json(json: &str) -> Result<GameState, serde_json::Error> {
    serde_json::from_str(json)
}

/// JSON Schema of [`GameRecord`].
pub fn record_schema() -> schemars::Schema {
    schemars::schema_for!(GameRecord)
}
