//! API endpoint configuration.

use std::time::Duration;

use url::Url;

use super::HttpError;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding the base URL.
pub const ENV_API_URL: &str = "SESSIONKIT_API_URL";
/// Environment variable overriding the timeout, in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "SESSIONKIT_TIMEOUT_SECS";

/// Where and how to reach the authentication API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it.
    pub base_url: Url,
    /// Per-request timeout covering connect and body.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ApiConfig {
    /// Local API with the default timeout.
    ///
    /// # Panics
    /// Never in practice: [`DEFAULT_BASE_URL`] is a valid constant URL.
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("sessionkit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Create a config for `base_url` with default timeout and user agent.
    ///
    /// # Errors
    /// Returns error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Read `SESSIONKIT_API_URL` and `SESSIONKIT_TIMEOUT_SECS`, falling back
    /// to defaults for unset variables.
    ///
    /// # Errors
    /// Returns error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, HttpError> {
        let mut config = match std::env::var(ENV_API_URL) {
            Ok(url) => Self::new(&url)?,
            Err(_) => Self::default(),
        };
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                HttpError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Absolute URL for an endpoint path.
    ///
    /// The path is appended to the base, so a base of `https://host/api`
    /// and a path of `/login` give `https://host/api/login`. Trailing slashes
    /// on the path are kept (`/register/`).
    ///
    /// # Errors
    /// Returns error if the joined URL does not parse.
    pub fn endpoint(&self, path: &str) -> Result<Url, HttpError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = format!("{base}/{}", path.trim().trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| HttpError::InvalidUrl(format!("{joined}: {e}")))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, HttpError> {
    let url = Url::parse(raw.trim()).map_err(|e| HttpError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpError::InvalidUrl(format!(
            "{raw}: unsupported scheme `{other}`"
        ))),
    }
}
