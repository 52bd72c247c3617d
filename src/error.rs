//! Session-layer errors.

use crate::store::StoreError;
use derive_more::{Display, Error, From};
use super_tictactoe_engine::{MoveError, WireError};

/// Why a session operation failed.
#[derive(Debug, Display, Error, From)]
pub enum SessionError {
    /// The engine rejected the transition.
    #[display("{}", _0)]
    #[from]
    Move(MoveError),

    /// The store failed.
    #[display("{}", _0)]
    #[from]
    Store(StoreError),

    /// A persisted record was malformed.
    #[display("{}", _0)]
    #[from]
    Wire(WireError),

    /// No signed-in player.
    #[display("You must be signed in")]
    NotAuthenticated,

    /// No match under the id.
    #[display("Game {} not found", game_id)]
    GameNotFound {
        /// The requested id.
        game_id: String,
    },

    /// Both seats are taken by other players.
    #[display("Game {} already has two players", game_id)]
    RoomFull {
        /// The requested id.
        game_id: String,
    },

    /// The player is moving faster than allowed.
    #[display("Slow down: try again in {} ms", retry_after_ms)]
    Throttled {
        /// Milliseconds until the next move would be admitted.
        retry_after_ms: i64,
    },

    /// The turn deadline has not passed yet.
    #[display("The current turn has {} seconds left", remaining_secs)]
    DeadlineNotReached {
        /// Seconds until the deadline.
        remaining_secs: i64,
    },

    /// Concurrent writers kept winning the compare-and-set.
    #[display("Game {} kept changing; gave up after {} attempts", game_id, attempts)]
    Conflict {
        /// The contested id.
        game_id: String,
        /// Attempts made.
        attempts: u32,
    },
}

impl SessionError {
    /// Maps a store miss to [`SessionError::GameNotFound`].
    pub(crate) fn from_read(game_id: &str, err: StoreError) -> Self {
        if err.kind == crate::store::StoreErrorKind::NotFound {
            Self::GameNotFound {
                game_id: game_id.to_string(),
            }
        } else {
            Self::Store(err)
        }
    }
}
