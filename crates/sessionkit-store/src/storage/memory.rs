//! In-memory session storage.

use std::sync::RwLock;

use async_trait::async_trait;
use sessionkit_core::{SessionRecord, SessionStorage, StorageError};

/// In-memory storage implementation.
///
/// Useful for tests and embedders that manage persistence themselves.
/// Data is lost on restart.
pub struct MemoryStorage {
    record: RwLock<Option<SessionRecord>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            record: RwLock::new(None),
        }
    }

    /// Create a storage that already holds `record`.
    #[must_use]
    pub const fn with_record(record: SessionRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
        Ok(self
            .record
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .clone())
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
        *self
            .record
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))? = Some(record.clone());
        Ok(())
    }

    async fn erase(&self) -> Result<(), StorageError> {
        self.record
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(token: &str) -> SessionRecord {
        SessionRecord {
            token: token.to_string(),
            user: r#"{"name":"Ann","email":"a@x.com","is_authenticated":true}"#.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_replaces_whole_record() {
        let storage = MemoryStorage::with_record(record("old"));
        storage.save(&record("new")).await.unwrap();

        let loaded = storage.load().await.unwrap().unwrap();
        assert_eq!(loaded, record("new"));
    }

    #[tokio::test]
    async fn test_erase_is_idempotent() {
        let storage = MemoryStorage::with_record(record("t1"));
        storage.erase().await.unwrap();
        storage.erase().await.unwrap();
        assert!(storage.load().await.unwrap().is_none());
    }
}
