//! Core abstractions for client-side authentication sessions.
//!
//! This crate provides the fundamental building blocks:
//! - `UserProfile` / `Session` - The data model held by a session store
//! - `SessionRecord` - The persisted two-key layout (`token`, `user`)
//! - `SessionStorage` - Storage port implemented by backends
//! - `SessionEvent` / `SessionFeed` - Change notifications

pub mod events;
pub mod session;
pub mod traits;

pub use events::{ClearReason, SessionEvent, SessionFeed};
pub use session::{Session, SessionRecord, UserProfile};
pub use traits::{SessionStorage, StorageError};
