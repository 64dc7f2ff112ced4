//! Typed schemas for authentication responses.
//!
//! Success bodies are validated by deserializing into these types instead of
//! probing for fields; anything that does not fit is a [`SchemaError`].

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use sessionkit_core::{Session, UserProfile};

/// Schema validation error.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("response does not match schema: {0}")]
    Shape(String),
    #[error("response field `{0}` is empty")]
    EmptyField(&'static str),
}

/// Body of a successful `POST /register/`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub name: String,
    pub email: String,
    pub is_authenticated: bool,
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a successful `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    #[serde(default)]
    pub message: Option<String>,
}

/// `user` object of a login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub token: String,
    pub name: String,
    pub email: String,
    pub is_authenticated: bool,
}

/// Session plus the server's optional success message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Established {
    pub session: Session,
    pub message: Option<String>,
}

/// A response schema that carries a new session.
pub trait SessionResponse: DeserializeOwned {
    /// Convert into the session it describes.
    fn into_established(self) -> Established;
}

impl SessionResponse for RegisterResponse {
    fn into_established(self) -> Established {
        Established {
            session: Session::new(
                self.token,
                UserProfile::new(self.name, self.email, self.is_authenticated),
            ),
            message: self.message,
        }
    }
}

impl SessionResponse for LoginResponse {
    fn into_established(self) -> Established {
        let user = self.user;
        Established {
            session: Session::new(
                user.token,
                UserProfile::new(user.name, user.email, user.is_authenticated),
            ),
            message: self.message,
        }
    }
}

/// Validate `body` against schema `T`.
///
/// # Errors
/// Returns error if a required field is missing or mistyped, or if the
/// token, name or email is empty.
pub fn validate<T: SessionResponse>(body: Value) -> Result<Established, SchemaError> {
    let parsed: T = serde_json::from_value(body).map_err(|e| SchemaError::Shape(e.to_string()))?;
    let established = parsed.into_established();

    let session = &established.session;
    if session.token.trim().is_empty() {
        return Err(SchemaError::EmptyField("token"));
    }
    if session.profile.name.trim().is_empty() {
        return Err(SchemaError::EmptyField("name"));
    }
    if session.profile.email.trim().is_empty() {
        return Err(SchemaError::EmptyField("email"));
    }
    Ok(established)
}
