//! Remote API plumbing.

pub mod client;
pub mod config;
pub mod schema;

pub use client::{ApiClient, ApiReply, HttpError};
pub use config::ApiConfig;
