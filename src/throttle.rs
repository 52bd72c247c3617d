//! Per-player move throttle.
//!
//! Admits at most `max_per_minute` moves in any rolling minute and
//! enforces a minimum gap between consecutive moves. Only accepted moves
//! count against the budget.

use crate::error::SessionError;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use super_tictactoe_engine::PlayerId;
use tracing::{debug, instrument, warn};

/// Rolling-window rate limiter keyed by player.
#[derive(Debug, Clone)]
pub struct MoveThrottle {
    max_per_minute: usize,
    min_interval: Duration,
    history: Arc<Mutex<HashMap<PlayerId, VecDeque<DateTime<Utc>>>>>,
}

impl MoveThrottle {
    /// Creates a throttle with empty history.
    pub fn new(max_per_minute: usize, min_interval: Duration) -> Self {
        Self {
            max_per_minute,
            min_interval,
            history: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Checks whether `player` may move at `now`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Throttled`] with the wait until the move would pass.
    #[instrument(skip(self))]
    pub fn check_at(&self, player: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        let mut history = self.history.lock().map_err(|_| poisoned())?;
        let Some(moves) = history.get_mut(player) else {
            return Ok(());
        };
        prune(moves, now);
        if moves.is_empty() {
            history.remove(player);
            return Ok(());
        }
        let window = Duration::minutes(1);

        if moves.len() >= self.max_per_minute {
            if let Some(oldest) = moves.front() {
                let retry_after = window - (now - *oldest);
                warn!(recent = moves.len(), "Too many moves in the last minute");
                return Err(SessionError::Throttled {
                    retry_after_ms: retry_after.num_milliseconds(),
                });
            }
        }

        if let Some(last) = moves.back() {
            let since = now - *last;
            if since < self.min_interval {
                debug!(since_ms = since.num_milliseconds(), "Move too soon after previous move");
                return Err(SessionError::Throttled {
                    retry_after_ms: (self.min_interval - since).num_milliseconds(),
                });
            }
        }
        Ok(())
    }

    /// Counts an accepted move by `player` at `now`.
    #[instrument(skip(self))]
    pub fn record_at(&self, player: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        let mut history = self.history.lock().map_err(|_| poisoned())?;
        history.entry(player.to_string()).or_default().push_back(now);
        history.retain(|_, moves| {
            prune(moves, now);
            !moves.is_empty()
        });
        Ok(())
    }

    /// Players with moves inside the current window.
    pub fn tracked_players(&self) -> Result<usize, SessionError> {
        Ok(self.history.lock().map_err(|_| poisoned())?.len())
    }
}

/// Drops moves older than the rolling minute.
fn prune(moves: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
    let window = Duration::minutes(1);
    while moves.front().is_some_and(|at| now - *at >= window) {
        moves.pop_front();
    }
}

fn poisoned() -> SessionError {
    SessionError::Store(crate::store::StoreError::poisoned())
}
