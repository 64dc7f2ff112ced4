//! Storage port for session persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::SessionRecord;

/// Storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),
    #[error("Session is not storable: {0}")]
    Invalid(String),
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Trait for session storage backends.
///
/// A backend holds at most one [`SessionRecord`]. Both of its keys are
/// written by a single `save` and removed by a single `erase`; a backend must
/// never expose a token from one record paired with the user of another.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load the stored record, if any.
    async fn load(&self) -> Result<Option<SessionRecord>, StorageError>;

    /// Replace the stored record.
    async fn save(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Remove the stored record. Erasing an empty storage is not an error.
    async fn erase(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl<T> SessionStorage for std::sync::Arc<T>
where
    T: SessionStorage + ?Sized,
{
    async fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
        (**self).load().await
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
        (**self).save(record).await
    }

    async fn erase(&self) -> Result<(), StorageError> {
        (**self).erase().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio_test::block_on;

    use super::*;

    #[derive(Default)]
    struct Slot(Mutex<Option<SessionRecord>>);

    #[async_trait]
    impl SessionStorage for Slot {
        async fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
            Ok(self.0.lock().unwrap().clone())
        }

        async fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
            *self.0.lock().unwrap() = Some(record.clone());
            Ok(())
        }

        async fn erase(&self) -> Result<(), StorageError> {
            self.0.lock().unwrap().take();
            Ok(())
        }
    }

    fn save_then_erase<S: SessionStorage>(storage: &S, record: &SessionRecord) {
        block_on(storage.save(record)).unwrap();
        assert_eq!(block_on(storage.load()).unwrap().as_ref(), Some(record));
        block_on(storage.erase()).unwrap();
        block_on(storage.erase()).unwrap();
    }

    #[test]
    fn test_arc_forwards_to_backend() {
        let slot = Arc::new(Slot::default());
        let record = SessionRecord {
            token: "t1".to_string(),
            user: "{}".to_string(),
        };

        save_then_erase(&Arc::clone(&slot), &record);
        assert!(slot.0.lock().unwrap().is_none());

        block_on(Arc::clone(&slot).save(&record)).unwrap();
        assert_eq!(slot.0.lock().unwrap().as_ref(), Some(&record));
    }
}
