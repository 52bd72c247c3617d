//! Who is acting.
//!
//! The engine takes player identities as given. An [`AuthService`] is the
//! seam where a real identity provider plugs in; the CLI uses a static
//! identity from a flag or the environment.

use crate::error::SessionError;
use derive_new::new;
use super_tictactoe_engine::PlayerId;
use tracing::{debug, instrument};

/// Environment variable naming the local player.
pub const PLAYER_ENV: &str = "SUPER_TICTACTOE_PLAYER";

/// Supplies the acting player's identity.
pub trait AuthService: Send + Sync {
    /// The signed-in player, if any.
    fn current_player(&self) -> Option<PlayerId>;

    /// The signed-in player, or [`SessionError::NotAuthenticated`].
    fn authenticate(&self) -> Result<PlayerId, SessionError> {
        self.current_player()
            .filter(|id| !id.trim().is_empty())
            .ok_or(SessionError::NotAuthenticated)
    }
}

/// A fixed identity.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StaticIdentity {
    player: Option<PlayerId>,
}

impl StaticIdentity {
    /// Uses `explicit` if given, otherwise [`PLAYER_ENV`].
    #[instrument]
    pub fn from_flag_or_env(explicit: Option<String>) -> Self {
        let player = explicit.or_else(|| std::env::var(PLAYER_ENV).ok());
        debug!(found = player.is_some(), "Resolved local identity");
        Self { player }
    }

    /// An identity that is never signed in.
    pub fn anonymous() -> Self {
        Self { player: None }
    }
}

impl AuthService for StaticIdentity {
    fn current_player(&self) -> Option<PlayerId> {
        self.player.clone()
    }
}
