//! In-process store, shared by cloning.

use super::{check_version, GameId, MatchRecord, StateStore, StoreError, StoreErrorKind, Version, UPDATE_CAPACITY};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Keeps every match in a mutex-guarded map.
///
/// Clones share the same map and update channel.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    records: Arc<Mutex<HashMap<GameId, MatchRecord>>>,
    updates: broadcast::Sender<MatchRecord>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory store");
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            updates,
        }
    }

    fn publish(&self, record: &MatchRecord) {
        // No subscribers is not an error
        let receivers = self.updates.send(record.clone()).unwrap_or(0);
        debug!(game_id = %record.game_id(), receivers, "Published update");
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    #[instrument(skip(self, record), fields(game_id = %record.game_id()))]
    async fn create(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        {
            let mut records = self.records.lock().map_err(|_| StoreError::poisoned())?;
            if records.contains_key(record.game_id()) {
                warn!("Game already exists");
                return Err(StoreError::new(
                    StoreErrorKind::AlreadyExists,
                    format!("game {} already exists", record.game_id()),
                ));
            }
            records.insert(record.game_id().clone(), record.clone());
        }
        info!("Created game");
        self.publish(&record);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn read(&self, game_id: &str) -> Result<MatchRecord, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::poisoned())?;
        records.get(game_id).cloned().ok_or_else(|| {
            debug!("Game not found");
            StoreError::not_found(game_id)
        })
    }

    #[instrument(skip(self, record), fields(game_id = %record.game_id()))]
    async fn write(&self, record: MatchRecord, expected: Version) -> Result<MatchRecord, StoreError> {
        {
            let mut records = self.records.lock().map_err(|_| StoreError::poisoned())?;
            let current = records
                .get(record.game_id())
                .ok_or_else(|| StoreError::not_found(record.game_id()))?;
            check_version(current, &record, expected)?;
            records.insert(record.game_id().clone(), record.clone());
        }
        debug!(version = record.version(), "Wrote game");
        self.publish(&record);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<GameId>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::poisoned())?;
        let mut ids: Vec<_> = records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn subscribe(&self) -> broadcast::Receiver<MatchRecord> {
        self.updates.subscribe()
    }
}
