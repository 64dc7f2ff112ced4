//! Error taxonomy returned to the presentation layer.
//!
//! Every variant displays as a message fit to show a user.

use sessionkit_core::StorageError;
use thiserror::Error;

use crate::{api::HttpError, auth::AuthMode, validate::ValidationError};

/// Shown when a rejected auth request carries no detail.
pub const AUTH_REJECTED_FALLBACK: &str = "Authentication failed!";
/// Shown when a rejected profile update carries no detail.
pub const PROFILE_REJECTED_FALLBACK: &str = "Failed to update profile";
/// Shown when a token is refused and the server gives no detail.
pub const SESSION_EXPIRED_FALLBACK: &str = "Session expired. Please log in again.";

/// Failure of a register, login or logout call.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server refused the request.
    #[error("{0}")]
    Rejected(String),
    /// The server reported success with a body that does not fit the schema.
    #[error("{} failed due to incomplete response.", .mode.title())]
    MalformedResponse { mode: AuthMode, reason: String },
    /// The request did not complete.
    #[error("{0}")]
    Transport(String),
    /// The session could not be persisted.
    #[error("Could not save session: {0}")]
    Storage(#[from] StorageError),
}

impl From<HttpError> for AuthError {
    fn from(err: HttpError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Failure of a profile update.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// No session is stored; nothing was sent.
    #[error("Authentication required. Please log in again.")]
    Unauthenticated,
    /// The new value fails a field rule; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The server refused the token. The stored session has been cleared.
    #[error("{0}")]
    SessionExpired(String),
    /// The server refused the update.
    #[error("{0}")]
    Rejected(String),
    /// The request did not complete.
    #[error("{0}")]
    Transport(String),
    /// The updated session could not be persisted.
    #[error("Could not save session: {0}")]
    Storage(#[from] StorageError),
}

impl From<HttpError> for ProfileError {
    fn from(err: HttpError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl ProfileError {
    /// Whether the presentation layer should send the user back to login.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::SessionExpired(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AuthError::MalformedResponse {
            mode: AuthMode::Register,
            reason: "missing field `token`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Registration failed due to incomplete response."
        );
        assert_eq!(
            AuthError::Rejected("bad credentials".to_string()).to_string(),
            "bad credentials"
        );
        assert_eq!(
            ProfileError::Unauthenticated.to_string(),
            "Authentication required. Please log in again."
        );
    }

    #[test]
    fn test_requires_login() {
        assert!(ProfileError::Unauthenticated.requires_login());
        assert!(ProfileError::SessionExpired(SESSION_EXPIRED_FALLBACK.to_string()).requires_login());
        assert!(!ProfileError::Rejected("no".to_string()).requires_login());
        assert!(!ProfileError::from(ValidationError::MissingName).requires_login());
    }

    #[test]
    fn test_http_error_is_transport() {
        let err: AuthError = HttpError::Transport("Request timed out. Please try again.".to_string()).into();
        assert!(matches!(err, AuthError::Transport(ref m) if m.contains("timed out")));
    }
}
