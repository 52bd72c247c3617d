//! JSON file store: one `<game_id>.json` per match in a directory.
//!
//! Writes go to a temporary file that is renamed over the target, so a
//! reader never sees a half-written record. Compare-and-set is enforced
//! for writers sharing one `FileStore`; separate processes pointed at the
//! same directory are not coordinated.

use super::{check_version, GameId, MatchRecord, StateStore, StoreError, StoreErrorKind, Version, UPDATE_CAPACITY};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, instrument, warn};

/// Stores matches as pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
    updates: broadcast::Sender<MatchRecord>,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        info!("Opened file store");
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Ok(Self {
            dir,
            write_lock: Arc::new(Mutex::new(())),
            updates,
        })
    }

    /// Directory holding the match files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[track_caller]
    fn path_of(&self, game_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !game_id.is_empty()
            && game_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::new(
                StoreErrorKind::InvalidId,
                format!("{:?} may only contain letters, digits, '-' and '_'", game_id),
            ));
        }
        Ok(self.dir.join(format!("{}.json", game_id)))
    }

    async fn load(&self, game_id: &str) -> Result<MatchRecord, StoreError> {
        let path = self.path_of(game_id)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(game_id));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    async fn save(&self, record: &MatchRecord) -> Result<(), StoreError> {
        let path = self.path_of(record.game_id())?;
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn publish(&self, record: &MatchRecord) {
        let receivers = self.updates.send(record.clone()).unwrap_or(0);
        debug!(game_id = %record.game_id(), receivers, "Published update");
    }
}

#[async_trait]
impl StateStore for FileStore {
    #[instrument(skip(self, record), fields(game_id = %record.game_id()))]
    async fn create(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_of(record.game_id())?;
        if tokio::fs::try_exists(&path).await? {
            warn!("Game already exists");
            return Err(StoreError::new(
                StoreErrorKind::AlreadyExists,
                format!("game {} already exists", record.game_id()),
            ));
        }
        self.save(&record).await?;
        info!(path = %path.display(), "Created game");
        self.publish(&record);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn read(&self, game_id: &str) -> Result<MatchRecord, StoreError> {
        self.load(game_id).await
    }

    #[instrument(skip(self, record), fields(game_id = %record.game_id()))]
    async fn write(&self, record: MatchRecord, expected: Version) -> Result<MatchRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let current = self.load(record.game_id()).await?;
        check_version(&current, &record, expected)?;
        self.save(&record).await?;
        debug!(version = record.version(), "Wrote game");
        self.publish(&record);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<GameId>, StoreError> {
        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn subscribe(&self) -> broadcast::Receiver<MatchRecord> {
        self.updates.subscribe()
    }
}
