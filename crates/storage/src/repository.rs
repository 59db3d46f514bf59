use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::model::{ProgressLedger, SessionLog};
use thiserror::Error;
use tracing::warn;

use crate::snapshot;

/// Key holding the serialized progress ledger.
pub const PROGRESS_KEY: &str = "progress";

/// Key holding the serialized study session log.
pub const SESSIONS_KEY: &str = "study_sessions";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value contract for whole-blob persistence.
///
/// Every write replaces the full value stored under the key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the blob under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Repository contract for the progress ledger blob.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the ledger. A missing or undecodable blob yields an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    async fn load_ledger(&self) -> Result<ProgressLedger, StorageError>;

    /// Persist the full ledger.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the ledger cannot be encoded or stored.
    async fn save_ledger(&self, ledger: &ProgressLedger) -> Result<(), StorageError>;

    /// Delete the persisted ledger.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_ledger(&self) -> Result<(), StorageError>;
}

/// Repository contract for the study session log blob.
#[async_trait]
pub trait SessionLogRepository: Send + Sync {
    /// Load the log. A missing or undecodable blob yields an empty log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    async fn load_log(&self) -> Result<SessionLog, StorageError>;

    /// Persist the full log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be encoded or stored.
    async fn save_log(&self, log: &SessionLog) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: BlobStore + ?Sized> ProgressRepository for T {
    async fn load_ledger(&self) -> Result<ProgressLedger, StorageError> {
        let Some(raw) = self.get(PROGRESS_KEY).await? else {
            return Ok(ProgressLedger::new());
        };
        Ok(snapshot::decode_ledger(&raw).unwrap_or_else(|err| {
            warn!(key = PROGRESS_KEY, error = %err, "discarding unreadable progress blob");
            ProgressLedger::new()
        }))
    }

    async fn save_ledger(&self, ledger: &ProgressLedger) -> Result<(), StorageError> {
        let raw = snapshot::encode_ledger(ledger)?;
        self.put(PROGRESS_KEY, &raw).await
    }

    async fn clear_ledger(&self) -> Result<(), StorageError> {
        self.remove(PROGRESS_KEY).await
    }
}

#[async_trait]
impl<T: BlobStore + ?Sized> SessionLogRepository for T {
    async fn load_log(&self) -> Result<SessionLog, StorageError> {
        let Some(raw) = self.get(SESSIONS_KEY).await? else {
            return Ok(SessionLog::new());
        };
        Ok(snapshot::decode_log(&raw).unwrap_or_else(|err| {
            warn!(key = SESSIONS_KEY, error = %err, "discarding unreadable session blob");
            SessionLog::new()
        }))
    }

    async fn save_log(&self, log: &SessionLog) -> Result<(), StorageError> {
        let raw = snapshot::encode_log(log)?;
        self.put(SESSIONS_KEY, &raw).await
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates the per-blob repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub blobs: Arc<dyn BlobStore>,
    pub progress: Arc<dyn ProgressRepository>,
    pub sessions: Arc<dyn SessionLogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryRepository::new())
    }

    /// Wire every repository to the same backing store.
    #[must_use]
    pub fn from_store<S>(store: S) -> Self
    where
        S: BlobStore + Clone + 'static,
    {
        let blobs: Arc<dyn BlobStore> = Arc::new(store.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(store.clone());
        let sessions: Arc<dyn SessionLogRepository> = Arc::new(store);
        Self {
            blobs,
            progress,
            sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use study_core::model::{ExerciseId, SessionDraft, TopicCatalog, TopicId};

    #[tokio::test]
    async fn missing_blobs_load_as_empty() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_ledger().await.unwrap().is_empty());
        assert!(repo.load_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_blobs_load_as_empty() {
        let repo = InMemoryRepository::new();
        repo.put(PROGRESS_KEY, "{not json").await.unwrap();
        repo.put(SESSIONS_KEY, "{\"id\": 1}").await.unwrap();

        assert!(repo.load_ledger().await.unwrap().is_empty());
        assert!(repo.load_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn round_trips_ledger_and_log() {
        let repo = InMemoryRepository::new();

        let mut ledger = ProgressLedger::new();
        ledger.record_outcome(TopicId::new("negation"), ExerciseId::new("1"), true);
        ledger.record_outcome(TopicId::new("negation"), ExerciseId::new("2"), false);
        repo.save_ledger(&ledger).await.unwrap();

        let mut log = SessionLog::new();
        log.add(
            SessionDraft::new(NaiveDate::from_ymd_opt(2024, 2, 1), "imparfait", 75, "verbs"),
            &TopicCatalog::french_grammar(),
            1_700_000_000_000,
        )
        .unwrap();
        repo.save_log(&log).await.unwrap();

        assert_eq!(repo.load_ledger().await.unwrap(), ledger);
        assert_eq!(repo.load_log().await.unwrap(), log);
    }

    #[tokio::test]
    async fn clear_ledger_removes_blob_and_is_idempotent() {
        let repo = InMemoryRepository::new();
        repo.save_ledger(&ProgressLedger::new()).await.unwrap();
        repo.clear_ledger().await.unwrap();
        repo.clear_ledger().await.unwrap();
        assert_eq!(repo.get(PROGRESS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn storage_handles_share_one_store() {
        let storage = Storage::in_memory();
        let mut ledger = ProgressLedger::new();
        ledger.record_outcome(TopicId::new("negation"), ExerciseId::new("1"), true);
        storage.progress.save_ledger(&ledger).await.unwrap();

        let raw = storage.blobs.get(PROGRESS_KEY).await.unwrap();
        assert_eq!(raw.as_deref(), Some(r#"{"negation":{"1":true}}"#));
    }
}
