//! Session store over a pluggable storage backend.

use sessionkit_core::{
    ClearReason, Session, SessionEvent, SessionFeed, SessionStorage, StorageError,
};
use tokio::sync::{Mutex, broadcast};

/// Holder of the current session.
///
/// Owns the single stored session and is the only writer of its backend.
/// Callers get snapshots; the stored value only changes through
/// [`set`](Self::set), [`update`](Self::update) and [`clear`](Self::clear).
pub struct SessionStore<S>
where
    S: SessionStorage,
{
    storage: S,
    feed: SessionFeed,
    write_lock: Mutex<()>,
}

impl<S> SessionStore<S>
where
    S: SessionStorage,
{
    /// Create a store over `storage`. Whatever the backend already holds
    /// becomes the current session.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            feed: SessionFeed::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Underlying backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Current session snapshot.
    ///
    /// Never fails: an unreadable or corrupt backend reads as logged out.
    pub async fn get(&self) -> Option<Session> {
        match self.load().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session: {e}");
                None
            }
        }
    }

    /// Replace the stored session, token and profile together.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written.
    pub async fn set(&self, session: Session) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let had_session = self.load().await.ok().flatten().is_some();
        self.write(session, had_session).await
    }

    /// Read-modify-write of the stored session.
    ///
    /// `f` sees the current session and returns its replacement, or `None`
    /// to leave it alone. Runs under the write lock so a concurrent `clear`
    /// cannot slip in between. Returns the written session, or `None` when
    /// nothing was stored or `f` declined.
    ///
    /// # Errors
    /// Returns error if the backend cannot be read or written.
    pub async fn update<F>(&self, f: F) -> Result<Option<Session>, StorageError>
    where
        F: FnOnce(&Session) -> Option<Session> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let Some(current) = self.load().await? else {
            return Ok(None);
        };
        let Some(next) = f(&current) else {
            return Ok(None);
        };
        self.write(next.clone(), true).await?;
        Ok(Some(next))
    }

    /// Remove the stored session. Clearing an empty store is a no-op.
    ///
    /// # Errors
    /// Returns error if the backend cannot be erased.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.clear_with(ClearReason::Reset).await.map(|_| ())
    }

    /// Remove the stored session, tagging the change with `reason`.
    ///
    /// Returns whether a session was removed; a `Cleared` event is published
    /// only in that case.
    ///
    /// # Errors
    /// Returns error if the backend cannot be erased.
    pub async fn clear_with(&self, reason: ClearReason) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        let existed = !matches!(self.storage.load().await, Ok(None));
        self.storage.erase().await?;

        if existed {
            tracing::info!(?reason, "Session cleared");
            self.feed.publish(SessionEvent::Cleared { reason });
        }
        Ok(existed)
    }

    /// Receiver for live session changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.feed.get_receiver()
    }

    /// Stream of the current session followed by live changes.
    pub async fn changes(&self) -> futures::stream::BoxStream<'static, SessionEvent> {
        let rx = self.feed.get_receiver();
        let current = self.get().await;
        SessionFeed::snapshot_plus_stream(current, rx)
    }

    async fn load(&self) -> Result<Option<Session>, StorageError> {
        self.storage
            .load()
            .await?
            .map(Session::try_from)
            .transpose()
    }

    async fn write(&self, session: Session, had_session: bool) -> Result<(), StorageError> {
        let record = session.to_record()?;
        self.storage.save(&record).await?;

        if had_session {
            tracing::debug!("Session updated");
            self.feed.publish(SessionEvent::Updated { session });
        } else {
            tracing::info!("Session established");
            self.feed.publish(SessionEvent::Established { session });
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use std::sync::Arc;

    use futures::StreamExt;
    use sessionkit_core::{SessionRecord, UserProfile};
    use tokio_test::{assert_ok, block_on};

    use super::*;
    use crate::storage::MemoryStorage;

    fn ann() -> Session {
        Session::new("t1", UserProfile::new("Ann", "a@x.com", true))
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = SessionStore::new(MemoryStorage::new());
        assert!(store.get().await.is_none());

        assert_ok!(store.set(ann()).await);
        assert_eq!(store.get().await, Some(ann()));
    }

    #[tokio::test]
    async fn test_set_overwrites_token_and_profile() {
        let store = SessionStore::new(MemoryStorage::new());
        store.set(ann()).await.unwrap();

        let bob = Session::new("t2", UserProfile::new("Bob", "b@x.com", true));
        store.set(bob.clone()).await.unwrap();
        assert_eq!(store.get().await, Some(bob));
    }

    #[tokio::test]
    async fn test_clear_twice() {
        let store = SessionStore::new(MemoryStorage::new());
        store.set(ann()).await.unwrap();

        assert!(store.clear_with(ClearReason::Logout).await.unwrap());
        assert!(store.get().await.is_none());
        assert!(!store.clear_with(ClearReason::Logout).await.unwrap());
        assert_ok!(store.clear().await);
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_under_lock() {
        let store = SessionStore::new(MemoryStorage::new());
        store.set(ann()).await.unwrap();

        let updated = store
            .update(|s| Some(Session::new(s.token.clone(), s.profile.renamed("Bob"))))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.profile.name, "Bob");
        assert_eq!(store.get().await.unwrap().profile.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_update_without_session() {
        let store = SessionStore::new(MemoryStorage::new());
        let result = store.update(|s| Some(s.clone())).await.unwrap();
        assert!(result.is_none());
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_update_declined() {
        let store = SessionStore::new(MemoryStorage::new());
        store.set(ann()).await.unwrap();
        let mut rx = store.subscribe();

        let result = store.update(|_| None).await.unwrap();
        assert!(result.is_none());
        assert_eq!(store.get().await, Some(ann()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_set_rejects_blank_name() {
        let store = SessionStore::new(MemoryStorage::new());
        store.set(ann()).await.unwrap();
        let mut rx = store.subscribe();

        let blank = Session::new("t1", UserProfile::new(" ", "a@x.com", true));
        let result = store.set(blank).await;

        assert!(matches!(result, Err(StorageError::Invalid(_))));
        assert_eq!(store.get().await, Some(ann()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let store = SessionStore::new(MemoryStorage::new());
        store.set(ann()).await.unwrap();

        let result = store
            .update(|s| Some(Session::new(s.token.clone(), s.profile.renamed(""))))
            .await;

        assert!(matches!(result, Err(StorageError::Invalid(_))));
        assert_eq!(store.get().await, Some(ann()));
    }

    #[tokio::test]
    async fn test_events() {
        let store = SessionStore::new(MemoryStorage::new());
        let mut rx = store.subscribe();

        store.set(ann()).await.unwrap();
        store.set(ann()).await.unwrap();
        store.clear_with(ClearReason::Expired).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::Established { session: ann() });
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::Updated { session: ann() });
        assert!(rx.recv().await.unwrap().is_expiry());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_changes_starts_with_snapshot() {
        let store = SessionStore::new(MemoryStorage::new());
        store.set(ann()).await.unwrap();

        let mut changes = store.changes().await;
        store.clear_with(ClearReason::Logout).await.unwrap();

        assert_eq!(
            changes.next().await,
            Some(SessionEvent::Snapshot {
                session: Some(ann())
            })
        );
        assert_eq!(
            changes.next().await,
            Some(SessionEvent::Cleared {
                reason: ClearReason::Logout
            })
        );
    }

    #[test]
    fn test_corrupt_backend_reads_as_absent() {
        let storage = MemoryStorage::with_record(SessionRecord {
            token: "t1".to_string(),
            user: "{".to_string(),
        });
        let store = SessionStore::new(storage);
        assert!(block_on(store.get()).is_none());
    }

    #[tokio::test]
    async fn test_shared_backend() {
        let storage = Arc::new(MemoryStorage::new());
        let first = SessionStore::new(Arc::clone(&storage));
        first.set(ann()).await.unwrap();

        let second = SessionStore::new(storage);
        assert_eq!(second.get().await, Some(ann()));
    }
}
