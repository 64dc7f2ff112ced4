//! Session store and storage backends.
//!
//! Provides:
//! - `SessionStore` - get/set/clear of the current session over a storage port
//! - Storage implementations (memory, file)

pub mod storage;
pub mod store;

pub use store::SessionStore;
