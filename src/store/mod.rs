//! Persistence for match snapshots.
//!
//! A store keeps the latest [`MatchRecord`] per game and guards writes
//! with a per-game version number: a write names the version it was
//! derived from and fails with a conflict if someone else wrote first.
//! Every successful write is broadcast to subscribers.

mod error;
mod file;
mod memory;

pub use error::{StoreError, StoreErrorKind};
pub use file::FileStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use super_tictactoe_engine::{GameState, Roster};
use tokio::sync::broadcast;

/// Identifier of a stored match.
pub type GameId = String;

/// Monotonic per-match write counter.
pub type Version = u64;

/// Updates buffered per subscriber before the slowest starts lagging.
pub(crate) const UPDATE_CAPACITY: usize = 64;

/// A match as persisted: who plays it, where it stands, and when it last moved.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Match id.
    game_id: GameId,
    /// Seated participants.
    roster: Roster,
    /// Engine state.
    state: GameState,
    /// Write counter; starts at 0 on creation.
    version: Version,
    /// Time of the last write, which is when the current turn began.
    updated_at: DateTime<Utc>,
}

impl MatchRecord {
    /// A freshly created match at version 0.
    pub fn new(game_id: impl Into<GameId>, roster: Roster, state: GameState, now: DateTime<Utc>) -> Self {
        Self {
            game_id: game_id.into(),
            roster,
            state,
            version: 0,
            updated_at: now,
        }
    }

    /// The successor record after a write.
    pub fn advanced(&self, roster: Roster, state: GameState, now: DateTime<Utc>) -> Self {
        Self {
            game_id: self.game_id.clone(),
            roster,
            state,
            version: self.version + 1,
            updated_at: now,
        }
    }
}

/// Versioned storage for match records.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Stores a new match; fails if the id is taken.
    async fn create(&self, record: MatchRecord) -> Result<MatchRecord, StoreError>;

    /// Reads the latest snapshot of a match.
    async fn read(&self, game_id: &str) -> Result<MatchRecord, StoreError>;

    /// Replaces a match if its stored version still equals `expected`.
    ///
    /// `record` must carry version `expected + 1`.
    async fn write(&self, record: MatchRecord, expected: Version) -> Result<MatchRecord, StoreError>;

    /// Ids of every stored match.
    async fn list(&self) -> Result<Vec<GameId>, StoreError>;

    /// Receives every record this store writes from now on.
    fn subscribe(&self) -> broadcast::Receiver<MatchRecord>;
}

/// Checks the write precondition shared by every store.
#[track_caller]
pub(crate) fn check_version(
    current: &MatchRecord,
    record: &MatchRecord,
    expected: Version,
) -> Result<(), StoreError> {
    if current.version != expected {
        return Err(StoreError::conflict(&current.game_id, expected, current.version));
    }
    if record.version != expected + 1 {
        return Err(StoreError::new(
            StoreErrorKind::Backend,
            format!(
                "record for game {} carries version {}, expected {}",
                record.game_id,
                record.version,
                expected + 1
            ),
        ));
    }
    Ok(())
}
