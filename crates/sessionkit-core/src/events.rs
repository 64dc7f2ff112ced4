//! Broadcast feed of session changes.

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};

use crate::Session;

/// Default number of undelivered events kept per subscriber.
const FEED_CAPACITY: usize = 64;

/// Why a session was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// The user logged out.
    Logout,
    /// The server rejected the token.
    Expired,
    /// Cleared directly through the store.
    Reset,
}

/// Change to the stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// State at subscription time (`None` = logged out).
    Snapshot { session: Option<Session> },
    /// A session was stored where none existed.
    Established { session: Session },
    /// The stored session was replaced.
    Updated { session: Session },
    /// The stored session was removed.
    Cleared { reason: ClearReason },
}

impl SessionEvent {
    /// Session carried by this event, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Snapshot { session } => session.as_ref(),
            Self::Established { session } | Self::Updated { session } => Some(session),
            Self::Cleared { .. } => None,
        }
    }

    /// Whether the session ended because the token expired.
    #[must_use]
    pub const fn is_expiry(&self) -> bool {
        matches!(
            self,
            Self::Cleared {
                reason: ClearReason::Expired
            }
        )
    }
}

/// Session change feed.
///
/// Subscribers that only care about the latest state can start from
/// [`SessionFeed::snapshot_plus_stream`], which yields the state at
/// subscription time followed by live changes.
pub struct SessionFeed {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFeed {
    /// Create a new feed.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Publish an event to live listeners. Events with no listener are dropped.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }

    /// Get a receiver for live updates.
    #[must_use]
    pub fn get_receiver(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Stream that yields `current` as a snapshot, then the events seen by `rx`.
    ///
    /// Take `rx` before reading `current` so no change falls between the two.
    #[must_use]
    pub fn snapshot_plus_stream(
        current: Option<Session>,
        rx: broadcast::Receiver<SessionEvent>,
    ) -> futures::stream::BoxStream<'static, SessionEvent> {
        let snapshot = futures::stream::once(async move { SessionEvent::Snapshot { session: current } });
        let live = BroadcastStream::new(rx).filter_map(|res| async move {
            match res {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Session feed subscriber lagged");
                    None
                }
            }
        });

        Box::pin(snapshot.chain(live))
    }
}
