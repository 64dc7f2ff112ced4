//! JSON-over-HTTP client for the authentication API.

use reqwest::{StatusCode, header::ACCEPT};
use serde::Serialize;
use serde_json::Value;

use super::ApiConfig;

/// Maximum number of server-supplied detail characters surfaced to callers.
const MAX_DETAIL_CHARS: usize = 200;

/// HTTP-level error.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Transport(String),
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiReply {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    /// Returns `HttpError::Transport` if the body is not JSON.
    pub fn json(&self) -> Result<Value, HttpError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            HttpError::Transport(format!(
                "Invalid response from server ({}): {e}",
                self.status
            ))
        })
    }

    /// Server-supplied error detail, if the body carries one.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        self.json().ok().as_ref().and_then(error_detail)
    }
}

/// Extract a human-readable error detail from an API error body.
///
/// Understands `{"detail": "..."}` and validation errors shaped as
/// `{"detail": [{"msg": "..."}, ...]}`, whose messages are joined with `; `.
#[must_use]
pub fn error_detail(body: &Value) -> Option<String> {
    let detail = match body.get("detail")? {
        Value::String(text) => text.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };

    if detail.is_empty() {
        None
    } else {
        Some(detail.chars().take(MAX_DETAIL_CHARS).collect())
    }
}

/// Optional success `message` of an API body.
#[must_use]
pub fn success_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Thin wrapper over a shared `reqwest::Client`.
///
/// Makes exactly one attempt per call; retry policy belongs to callers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HttpError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// POST `body` as JSON to `path`, with an optional bearer token.
    ///
    /// Any HTTP status is a successful reply; only transport failures are
    /// errors.
    ///
    /// # Errors
    /// Returns `HttpError::Transport` if the request cannot be sent or the
    /// response body cannot be read.
    pub async fn post_json<B>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<ApiReply, HttpError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.config.endpoint(path)?;
        let mut request = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        tracing::debug!(path, authenticated = bearer.is_some(), "Sending API request");
        let response = request.send().await.map_err(map_request_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_request_error)?;
        tracing::debug!(path, %status, bytes = body.len(), "API response received");

        Ok(ApiReply {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_request_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Transport("Request timed out. Please try again.".to_string())
    } else {
        HttpError::Transport(format!("Unable to reach the server: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(status: u16, body: &str) -> ApiReply {
        ApiReply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_string_detail() {
        let r = reply(401, r#"{"detail":"bad credentials"}"#);
        assert_eq!(r.detail().as_deref(), Some("bad credentials"));
        assert!(!r.is_success());
    }

    #[test]
    fn test_validation_detail_list() {
        let body = json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "field required"},
                {"loc": ["body", "password"], "msg": "field required"}
            ]
        });
        assert_eq!(
            error_detail(&body).as_deref(),
            Some("field required; field required")
        );
    }

    #[test]
    fn test_missing_or_blank_detail() {
        assert!(error_detail(&json!({"error": "x"})).is_none());
        assert!(error_detail(&json!({"detail": "   "})).is_none());
        assert!(error_detail(&json!({"detail": 42})).is_none());
        assert!(reply(500, "Internal Server Error").detail().is_none());
    }

    #[test]
    fn test_detail_truncated() {
        let long = "x".repeat(500);
        let detail = error_detail(&json!({ "detail": long })).unwrap();
        assert_eq!(detail.chars().count(), MAX_DETAIL_CHARS);
    }

    #[test]
    fn test_non_json_body() {
        let r = reply(200, "<html>");
        assert!(matches!(r.json(), Err(HttpError::Transport(_))));
    }

    #[test]
    fn test_success_message() {
        assert_eq!(
            success_message(&json!({"message": "Login successful"})).as_deref(),
            Some("Login successful")
        );
        assert!(success_message(&json!({"message": ""})).is_none());
        assert!(success_message(&json!({})).is_none());
    }
}
