//! Daily completion tracking: "did this player already finish today's game?"

use std::{
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use thiserror::Error;
use time::{Date, Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::domain::{CompletionData, format_date};

/// Prefix of every completion storage key.
pub const COMPLETION_KEY_PREFIX: &str = "futquiz_completion_";

/// Storage key holding the completion record of `game_id`.
pub fn completion_key(game_id: &str) -> String {
    format!("{COMPLETION_KEY_PREFIX}{game_id}")
}

/// Failures writing completion records.
#[derive(Debug, Error)]
pub enum CompletionStoreError {
    /// The backend could not read or write `key`.
    #[error("failed to access completion record `{key}`")]
    Io {
        /// Storage key involved.
        key: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The record could not be encoded.
    #[error("failed to serialize completion record")]
    Serialize(#[from] serde_json::Error),
}

/// Source of the current time, so day rollover can be simulated.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> OffsetDateTime;

    /// Current calendar day.
    fn today(&self) -> Date {
        self.now().date()
    }
}

/// Wall clock in the local offset, UTC when the offset cannot be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    /// Clock frozen at `now`.
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: OffsetDateTime) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.set(self.now() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Minimal keyed string storage the completion records live in.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> BoxFuture<'static, Result<Option<String>, CompletionStoreError>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> BoxFuture<'static, Result<(), CompletionStoreError>>;
    /// Delete `key`; missing keys are not an error.
    fn remove(&self, key: &str) -> BoxFuture<'static, Result<(), CompletionStoreError>>;
}

/// Process-local storage; records vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> BoxFuture<'static, Result<Option<String>, CompletionStoreError>> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(value) })
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'static, Result<(), CompletionStoreError>> {
        self.entries.insert(key.to_owned(), value);
        Box::pin(async { Ok(()) })
    }

    fn remove(&self, key: &str) -> BoxFuture<'static, Result<(), CompletionStoreError>> {
        self.entries.remove(key);
        Box::pin(async { Ok(()) })
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the record files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> BoxFuture<'static, Result<Option<String>, CompletionStoreError>> {
        let path = self.path_for(key);
        let key = key.to_owned();
        Box::pin(async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(source) => Err(CompletionStoreError::Io { key, source }),
            }
        })
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'static, Result<(), CompletionStoreError>> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let key = key.to_owned();
        Box::pin(async move {
            let io_err = |source| CompletionStoreError::Io {
                key: key.clone(),
                source,
            };
            tokio::fs::create_dir_all(&dir).await.map_err(io_err)?;
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, value).await.map_err(io_err)?;
            tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'static, Result<(), CompletionStoreError>> {
        let path = self.path_for(key);
        let key = key.to_owned();
        Box::pin(async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(CompletionStoreError::Io { key, source }),
            }
        })
    }
}

/// Per-game record of today's result, keyed by [`completion_key`].
///
/// Reads fail open: a missing, unreadable or malformed record counts as "not played".
#[derive(Clone)]
pub struct CompletionStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl CompletionStore {
    /// Store over any backend.
    pub fn new(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Ephemeral store for tests and throwaway sessions.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()), clock)
    }

    /// File-backed store under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(FileKeyValueStore::new(dir)), clock)
    }

    /// Clock deciding what today is.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Whether `game_id` has a record dated today.
    pub async fn has_completed_today(&self, game_id: &str) -> bool {
        self.today_completion(game_id).await.is_some()
    }

    /// Today's record for `game_id`, if any.
    pub async fn today_completion(&self, game_id: &str) -> Option<CompletionData> {
        let key = completion_key(game_id);
        let raw = match self.backend.get(&key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(%key, error = %err, "failed to read completion record; treating as not played");
                return None;
            }
        };

        let record: CompletionData = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                warn!(%key, error = %err, "malformed completion record; treating as not played");
                return None;
            }
        };

        let today = format_date(self.clock.today());
        if record.date == today {
            Some(record)
        } else {
            debug!(%key, stored = %record.date, %today, "completion record is from another day");
            None
        }
    }

    /// Store `data` as the record of `game_id`, replacing any previous one.
    pub async fn mark_completed(
        &self,
        game_id: &str,
        data: &CompletionData,
    ) -> Result<(), CompletionStoreError> {
        let key = completion_key(game_id);
        let raw = serde_json::to_string(data)?;
        self.backend.set(&key, raw).await?;
        debug!(%key, score = data.score, total = data.total_questions, "stored completion record");
        Ok(())
    }

    /// Forget the record of `game_id`.
    pub async fn clear_completion(&self, game_id: &str) -> Result<(), CompletionStoreError> {
        self.backend.remove(&completion_key(game_id)).await
    }
}
