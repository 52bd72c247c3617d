//! Session controller: the only component that mutates stored matches.
//!
//! Each operation reads the latest snapshot, runs a pure engine
//! transition, and writes the result back with compare-and-set. A lost
//! race re-reads and re-validates from scratch; nothing is merged.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::store::{GameId, MatchRecord, StateStore};
use crate::throttle::MoveThrottle;
use chrono::{DateTime, Utc};
use super_tictactoe_engine::{
    apply_move, forfeit, rematch, start, GameState, GameStatus, MoveError, Roster,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, instrument, warn};

/// Runs matches on top of a [`StateStore`].
#[derive(Debug, Clone)]
pub struct SessionController<S> {
    store: S,
    config: SessionConfig,
    throttle: Option<MoveThrottle>,
}

impl<S: StateStore> SessionController<S> {
    /// Creates a controller over `store`.
    #[instrument(skip(store))]
    pub fn new(store: S, config: SessionConfig) -> Self {
        let throttle = config
            .throttle_enabled()
            .then(|| MoveThrottle::new(*config.max_moves_per_minute(), config.min_move_interval()));
        info!(throttled = throttle.is_some(), "Creating session controller");
        Self {
            store,
            config,
            throttle,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Opens a match hosted by `host`, who plays X.
    #[instrument(skip(self))]
    pub async fn create_match(&self, game_id: &str, host: &str) -> Result<MatchRecord, SessionError> {
        let roster = Roster::new(host);
        let state = GameState::new(&roster);
        let record = self
            .store
            .create(MatchRecord::new(game_id, roster, state, Utc::now()))
            .await?;
        info!("Match created");
        Ok(record)
    }

    /// Seats `player` as the guest and starts the match.
    ///
    /// Re-joining a seat already held is a no-op.
    ///
    /// # Errors
    ///
    /// [`SessionError::RoomFull`] if another player holds the guest seat.
    #[instrument(skip(self))]
    pub async fn join(&self, game_id: &str, player: &str) -> Result<MatchRecord, SessionError> {
        self.update(game_id, Utc::now(), |current| {
            let roster = current.roster();
            if roster.symbol_of(player).is_some() {
                debug!("Already seated");
                return Ok(None);
            }
            if roster.is_full() {
                warn!("Both seats taken");
                return Err(SessionError::RoomFull {
                    game_id: game_id.to_string(),
                });
            }
            let roster = roster.with_guest(player);
            let state = start(current.state(), &roster)?;
            info!(guest = player, "Guest joined");
            Ok(Some((roster, state)))
        })
        .await
    }

    /// Submits a move now.
    pub async fn play(
        &self,
        game_id: &str,
        player: &str,
        board: usize,
        cell: usize,
    ) -> Result<MatchRecord, SessionError> {
        self.play_at(game_id, player, board, cell, Utc::now()).await
    }

    /// Submits a move at the given time.
    ///
    /// # Errors
    ///
    /// Engine rejections as [`SessionError::Move`], plus
    /// [`SessionError::Throttled`] and [`SessionError::Conflict`].
    #[instrument(skip(self))]
    pub async fn play_at(
        &self,
        game_id: &str,
        player: &str,
        board: usize,
        cell: usize,
        now: DateTime<Utc>,
    ) -> Result<MatchRecord, SessionError> {
        if let Some(throttle) = &self.throttle {
            throttle.check_at(player, now)?;
        }

        let record = self
            .update(game_id, now, |current| {
                let state = apply_move(current.state(), current.roster(), player, board, cell)?;
                Ok(Some((current.roster().clone(), state)))
            })
            .await?;

        if let Some(throttle) = &self.throttle {
            throttle.record_at(player, now)?;
        }
        info!(version = record.version(), status = ?record.state().status(), "Move stored");
        Ok(record)
    }

    /// Concedes the match on behalf of `player`.
    #[instrument(skip(self))]
    pub async fn forfeit(&self, game_id: &str, player: &str) -> Result<MatchRecord, SessionError> {
        self.update(game_id, Utc::now(), |current| {
            let state = forfeit(current.state(), current.roster(), player)?;
            Ok(Some((current.roster().clone(), state)))
        })
        .await
    }

    /// Forfeits the player holding the turn if their deadline has passed.
    pub async fn expire_turn(&self, game_id: &str) -> Result<MatchRecord, SessionError> {
        self.expire_turn_at(game_id, Utc::now()).await
    }

    /// Forfeits the player holding the turn if their deadline passed before `now`.
    ///
    /// # Errors
    ///
    /// [`SessionError::DeadlineNotReached`] while the turn is still live;
    /// [`MoveError::WaitingForOpponent`] before the match starts;
    /// [`MoveError::GameAlreadyOver`] once it ended.
    #[instrument(skip(self))]
    pub async fn expire_turn_at(&self, game_id: &str, now: DateTime<Utc>) -> Result<MatchRecord, SessionError> {
        let timeout = self.config.move_timeout();
        self.update(game_id, now, |current| {
            let state = current.state();
            match state.status() {
                GameStatus::Playing => {}
                GameStatus::Waiting => return Err(MoveError::WaitingForOpponent.into()),
                GameStatus::Win | GameStatus::Tie => return Err(MoveError::GameAlreadyOver.into()),
            }

            let deadline = *current.updated_at() + timeout;
            if now < deadline {
                return Err(SessionError::DeadlineNotReached {
                    remaining_secs: (deadline - now).num_seconds(),
                });
            }
            warn!(player = state.turn(), %deadline, "Turn timed out");
            let state = forfeit(state, current.roster(), state.turn())?;
            Ok(Some((current.roster().clone(), state)))
        })
        .await
    }

    /// Starts the next match on fresh boards, keeping the score.
    #[instrument(skip(self))]
    pub async fn rematch(&self, game_id: &str, player: &str) -> Result<MatchRecord, SessionError> {
        self.update(game_id, Utc::now(), |current| {
            let roster = current.roster();
            if roster.symbol_of(player).is_none() {
                return Err(MoveError::NotAParticipant(player.to_string()).into());
            }
            let state = rematch(current.state(), roster)?;
            Ok(Some((roster.clone(), state)))
        })
        .await
    }

    /// Latest stored snapshot.
    #[instrument(skip(self))]
    pub async fn snapshot(&self, game_id: &str) -> Result<MatchRecord, SessionError> {
        self.store
            .read(game_id)
            .await
            .map_err(|e| SessionError::from_read(game_id, e))
    }

    /// Ids of every stored match.
    pub async fn games(&self) -> Result<Vec<GameId>, SessionError> {
        Ok(self.store.list().await?)
    }

    /// Follows every future write to one match.
    pub fn subscribe(&self, game_id: &str) -> MatchUpdates {
        MatchUpdates {
            game_id: game_id.to_string(),
            updates: self.store.subscribe(),
        }
    }

    /// Read, transition, compare-and-set; repeated on conflict.
    ///
    /// `transition` returns `None` when there is nothing to write.
    async fn update<F>(&self, game_id: &str, now: DateTime<Utc>, mut transition: F) -> Result<MatchRecord, SessionError>
    where
        F: FnMut(&MatchRecord) -> Result<Option<(Roster, GameState)>, SessionError>,
    {
        let attempts = *self.config.write_retries();
        for attempt in 1..=attempts {
            let current = self.snapshot(game_id).await?;
            let Some((roster, state)) = transition(&current)? else {
                return Ok(current);
            };
            let next = current.advanced(roster, state, now);
            match self.store.write(next, *current.version()).await {
                Ok(written) => return Ok(written),
                Err(e) if e.is_conflict() => {
                    warn!(attempt, attempts, error = %e, "Lost write race, re-reading");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(SessionError::Conflict {
            game_id: game_id.to_string(),
            attempts,
        })
    }
}

/// Stream of snapshots for one match.
#[derive(Debug)]
pub struct MatchUpdates {
    game_id: GameId,
    updates: broadcast::Receiver<MatchRecord>,
}

impl MatchUpdates {
    /// Waits for the next write to the match.
    ///
    /// Returns `None` once the store is gone. Skipped updates are logged;
    /// the next delivered snapshot is complete, so nothing is lost but
    /// intermediate states.
    pub async fn next(&mut self) -> Option<MatchRecord> {
        loop {
            match self.updates.recv().await {
                Ok(record) if record.game_id() == &self.game_id => return Some(record),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(game_id = %self.game_id, skipped, "Subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
