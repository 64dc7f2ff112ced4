//! Session data model and its persisted layout.

use serde::{Deserialize, Serialize};

use crate::StorageError;

/// Profile of the signed-in user.
///
/// Keys are snake_case on the wire and in storage (`is_authenticated`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Server-side authentication flag.
    pub is_authenticated: bool,
}

impl UserProfile {
    /// Create a profile.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, is_authenticated: bool) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            is_authenticated,
        }
    }

    /// Return a copy with `name` replaced, keeping email and auth flag.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Whether both identity fields are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }
}

/// Authenticated state: a bearer token paired with the user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Profile the token belongs to.
    pub profile: UserProfile,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub fn new(token: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            token: token.into(),
            profile,
        }
    }

    /// Value for an `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Encode into the persisted layout.
    ///
    /// # Errors
    /// Returns `StorageError::Invalid` if the token, name or email is blank.
    pub fn to_record(&self) -> Result<SessionRecord, StorageError> {
        if self.token.trim().is_empty() {
            return Err(StorageError::Invalid("empty token".to_string()));
        }
        if !self.profile.is_complete() {
            return Err(StorageError::Invalid(
                "profile is missing name or email".to_string(),
            ));
        }
        let user = serde_json::to_string(&self.profile)
            .map_err(|e| StorageError::Internal(format!("encode user: {e}")))?;
        Ok(SessionRecord {
            token: self.token.clone(),
            user,
        })
    }
}

/// Persisted form of a [`Session`].
///
/// Mirrors the two storage keys: `token` holds the raw token string and
/// `user` holds the profile as JSON text. Backends always write and erase
/// both keys together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user: String,
}

impl SessionRecord {
    /// Decode back into a [`Session`].
    ///
    /// # Errors
    /// Returns `StorageError::Corrupt` if `user` is not a profile object, or if
    /// the token, name or email is empty.
    pub fn into_session(self) -> Result<Session, StorageError> {
        if self.token.trim().is_empty() {
            return Err(StorageError::Corrupt("empty token".to_string()));
        }
        let profile: UserProfile = serde_json::from_str(&self.user)
            .map_err(|e| StorageError::Corrupt(format!("user: {e}")))?;
        if !profile.is_complete() {
            return Err(StorageError::Corrupt(
                "user is missing name or email".to_string(),
            ));
        }
        Ok(Session {
            token: self.token,
            profile,
        })
    }
}

impl TryFrom<&Session> for SessionRecord {
    type Error = StorageError;

    fn try_from(session: &Session) -> Result<Self, Self::Error> {
        session.to_record()
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = StorageError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        record.into_session()
    }
}
