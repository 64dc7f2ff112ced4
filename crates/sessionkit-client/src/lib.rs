//! Authentication and profile clients for a remote auth API.
//!
//! Provides:
//! - `AuthClient` - register, login and logout, storing the session
//! - `ProfileClient` - bearer-authenticated profile edits with expiry detection
//! - `ApiClient` / `ApiConfig` - HTTP plumbing and configuration
//! - Caller-side form validation

pub mod api;
pub mod auth;
pub mod error;
pub mod profile;
pub mod validate;

pub use api::{ApiClient, ApiConfig, HttpError};
pub use auth::{AuthClient, AuthMode, AuthRequest, Authenticated, LoginFields, RegisterFields};
pub use error::{AuthError, ProfileError};
pub use profile::ProfileClient;
pub use validate::ValidationError;
