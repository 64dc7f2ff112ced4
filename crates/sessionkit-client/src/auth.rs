//! Registration, login and logout.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sessionkit_core::{ClearReason, Session, SessionStorage};
use sessionkit_store::SessionStore;

use crate::{
    api::{
        ApiClient, ApiReply,
        client::success_message,
        schema::{self, Established, LoginResponse, RegisterResponse, SessionResponse},
    },
    error::{AUTH_REJECTED_FALLBACK, AuthError},
    validate::{self, ValidationError},
};

const REGISTER_PATH: &str = "/register/";
const LOGIN_PATH: &str = "/login";
const LOGOUT_PATH: &str = "/logout";

/// Which authentication endpoint a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    Register,
    Login,
}

impl AuthMode {
    /// Endpoint path.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Register => REGISTER_PATH,
            Self::Login => LOGIN_PATH,
        }
    }

    /// Human-readable name of the operation.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Register => "Registration",
            Self::Login => "Login",
        }
    }

    /// Message shown on success when the server sends none.
    #[must_use]
    pub const fn default_success_message(self) -> &'static str {
        match self {
            Self::Register => "Registration successful! Please login.",
            Self::Login => "Login successful!",
        }
    }

    /// The other mode, for toggling a sign-up/login form.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Register => Self::Login,
            Self::Login => Self::Register,
        }
    }
}

/// Sign-up form values.
#[derive(Debug)]
pub struct RegisterFields {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl RegisterFields {
    /// Create sign-up values.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Run the sign-up form rules.
    ///
    /// # Errors
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::validate_name(&self.name)?;
        validate::validate_email(&self.email)?;
        validate::validate_password(self.password.expose_secret())
    }
}

/// Login form values.
#[derive(Debug)]
pub struct LoginFields {
    pub email: String,
    pub password: SecretString,
}

impl LoginFields {
    /// Create login values.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Run the login form rules.
    ///
    /// # Errors
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::validate_email(&self.email)?;
        validate::validate_password(self.password.expose_secret())
    }
}

/// Register or login request with its fields.
#[derive(Debug)]
pub enum AuthRequest {
    Register(RegisterFields),
    Login(LoginFields),
}

impl AuthRequest {
    /// Mode of this request.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        match self {
            Self::Register(_) => AuthMode::Register,
            Self::Login(_) => AuthMode::Login,
        }
    }

    /// Run the form rules for this mode.
    ///
    /// # Errors
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Register(fields) => fields.validate(),
            Self::Login(fields) => fields.validate(),
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Register(f) => json!({
                "name": f.name,
                "email": f.email,
                "password": f.password.expose_secret(),
            }),
            Self::Login(f) => json!({
                "email": f.email,
                "password": f.password.expose_secret(),
            }),
        }
    }
}

impl From<RegisterFields> for AuthRequest {
    fn from(fields: RegisterFields) -> Self {
        Self::Register(fields)
    }
}

impl From<LoginFields> for AuthRequest {
    fn from(fields: LoginFields) -> Self {
        Self::Login(fields)
    }
}

/// Established session with the message to show for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub session: Session,
    pub message: String,
}

/// Client for the register/login/logout endpoints.
///
/// Both register and login go through one "establish session" path: a
/// well-formed success response is written to the store either way.
pub struct AuthClient<S>
where
    S: SessionStorage,
{
    api: ApiClient,
    store: Arc<SessionStore<S>>,
}

impl<S> AuthClient<S>
where
    S: SessionStorage,
{
    /// Create a client writing sessions into `store`.
    #[must_use]
    pub const fn new(api: ApiClient, store: Arc<SessionStore<S>>) -> Self {
        Self { api, store }
    }

    /// Store this client writes to.
    #[must_use]
    pub const fn store(&self) -> &Arc<SessionStore<S>> {
        &self.store
    }

    /// Register or log in and store the resulting session.
    ///
    /// Field validation is the caller's job (see [`AuthRequest::validate`]).
    ///
    /// # Errors
    /// - `Rejected` on a non-success status; the store is untouched.
    /// - `MalformedResponse` if a success body does not fit the schema; the
    ///   store is untouched.
    /// - `Transport` if the request fails or the body is not JSON.
    /// - `Storage` if the session cannot be written.
    pub async fn authenticate(&self, request: AuthRequest) -> Result<Session, AuthError> {
        self.authenticate_verbose(request)
            .await
            .map(|authenticated| authenticated.session)
    }

    /// Like [`authenticate`](Self::authenticate), also returning the message
    /// to show: the server's `message`, or a default per mode.
    ///
    /// # Errors
    /// Same as [`authenticate`](Self::authenticate).
    pub async fn authenticate_verbose(
        &self,
        request: AuthRequest,
    ) -> Result<Authenticated, AuthError> {
        let mode = request.mode();
        tracing::debug!(?mode, "Authenticating");

        let reply = self
            .api
            .post_json(mode.endpoint(), &request.body(), None)
            .await?;
        drop(request);

        if !reply.is_success() {
            let detail = reply
                .detail()
                .unwrap_or_else(|| AUTH_REJECTED_FALLBACK.to_string());
            tracing::warn!(?mode, status = %reply.status, "Authentication rejected");
            return Err(AuthError::Rejected(detail));
        }

        let established = match mode {
            AuthMode::Register => parse::<RegisterResponse>(mode, &reply)?,
            AuthMode::Login => parse::<LoginResponse>(mode, &reply)?,
        };
        self.establish(mode, established).await
    }

    /// Log out the stored user.
    ///
    /// Notifies the server (`POST /logout`) and then clears the store. The
    /// store is cleared even when the server call fails; that failure is
    /// returned afterwards. Without a session this does nothing.
    ///
    /// # Errors
    /// Returns `Storage` if the store cannot be cleared, otherwise the
    /// server call's `Rejected`/`Transport` failure.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let Some(session) = self.store.get().await else {
            return Ok(());
        };

        let remote = self
            .api
            .post_json(
                LOGOUT_PATH,
                &json!({ "email": session.profile.email }),
                Some(&session.token),
            )
            .await
            .map_err(AuthError::from)
            .and_then(|reply| {
                if reply.is_success() {
                    Ok(())
                } else {
                    Err(AuthError::Rejected(
                        reply.detail().unwrap_or_else(|| "Logout failed".to_string()),
                    ))
                }
            });

        self.store.clear_with(ClearReason::Logout).await?;

        if let Err(e) = &remote {
            tracing::warn!("Server logout failed: {e}");
        }
        remote
    }

    async fn establish(
        &self,
        mode: AuthMode,
        established: Established,
    ) -> Result<Authenticated, AuthError> {
        let Established { session, message } = established;
        self.store.set(session.clone()).await?;
        tracing::info!(?mode, "Session established");

        Ok(Authenticated {
            session,
            message: message.unwrap_or_else(|| mode.default_success_message().to_string()),
        })
    }
}

fn parse<T: SessionResponse>(mode: AuthMode, reply: &ApiReply) -> Result<Established, AuthError> {
    let body = reply.json()?;
    let message = success_message(&body);

    let established = schema::validate::<T>(body).map_err(|e| {
        tracing::warn!(?mode, "Malformed response: {e}");
        AuthError::MalformedResponse {
            mode,
            reason: e.to_string(),
        }
    })?;
    Ok(Established {
        message,
        ..established
    })
}
