//! Super Tic-Tac-Toe sessions - multiplayer matches on a shared store
//!
//! The rules live in [`super_tictactoe_engine`]; this crate runs matches
//! between two players on top of a versioned state store.
//!
//! # Architecture
//!
//! - **Controller**: reads a snapshot, applies an engine transition,
//!   writes it back with compare-and-set
//! - **Store**: in-memory and JSON-file backends with update broadcast
//! - **Auth**: who is acting
//! - **Throttle**: optional per-player move rate limit
//! - **Config**: TOML session settings
//!
//! # Example
//!
//! ```no_run
//! use super_tictactoe::{InMemoryStore, SessionConfig, SessionController};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let controller = SessionController::new(InMemoryStore::new(), SessionConfig::default());
//! controller.create_match("g1", "alice").await?;
//! controller.join("g1", "bob").await?;
//! let record = controller.play("g1", "alice", 0, 4).await?;
//! println!("{}", record.state().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod auth;
mod config;
mod controller;
mod error;
mod store;
mod throttle;

// Crate-level exports - Identity
pub use auth::{AuthService, PLAYER_ENV, StaticIdentity};

// Crate-level exports - Configuration
pub use config::{ConfigError, SessionConfig};

// Crate-level exports - Session control
pub use controller::{MatchUpdates, SessionController};
pub use error::SessionError;
pub use throttle::MoveThrottle;

// Crate-level exports - Storage
pub use store::{
    FileStore, GameId, InMemoryStore, MatchRecord, StateStore, StoreError, StoreErrorKind, Version,
};

// Crate-level exports - Engine
pub use super_tictactoe_engine as engine;
