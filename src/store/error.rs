//! State store error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StoreErrorKind {
    /// The stored version moved on since it was read.
    #[display("version conflict")]
    VersionConflict,
    /// No match is stored under the id.
    #[display("not found")]
    NotFound,
    /// A match is already stored under the id.
    #[display("already exists")]
    AlreadyExists,
    /// The id cannot name a stored match.
    #[display("invalid id")]
    InvalidId,
    /// I/O, encoding or lock failure.
    #[display("backend")]
    Backend,
}

/// Store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error ({}): {} at {}:{}", kind, message, file, line)]
pub struct StoreError {
    /// Error category.
    pub kind: StoreErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The stored version differs from the one the writer read.
    #[track_caller]
    pub fn conflict(game_id: &str, expected: u64, actual: u64) -> Self {
        Self::new(
            StoreErrorKind::VersionConflict,
            format!("game {} is at version {}, expected {}", game_id, actual, expected),
        )
    }

    /// No match under `game_id`.
    #[track_caller]
    pub fn not_found(game_id: &str) -> Self {
        Self::new(StoreErrorKind::NotFound, format!("game {} does not exist", game_id))
    }

    /// A mutex guarding store state was poisoned.
    #[track_caller]
    pub fn poisoned() -> Self {
        Self::new(StoreErrorKind::Backend, "store lock poisoned")
    }

    /// True for a compare-and-set conflict.
    pub fn is_conflict(&self) -> bool {
        self.kind == StoreErrorKind::VersionConflict
    }
}

impl From<std::io::Error> for StoreError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(StoreErrorKind::Backend, format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(StoreErrorKind::Backend, format!("Malformed record: {}", err))
    }
}
