use std::time::Duration;

use url::Url;

use crate::error::{JetnetError, Result};
use crate::session::Credentials;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://customer.jetnetconnect.com";

/// Proactive refresh threshold. Tokens live for roughly an hour; refreshing
/// at 50 minutes keeps long workflows from failing midway.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const EMAIL_ENV: &str = "JETNET_EMAIL";
pub const PASSWORD_ENV: &str = "JETNET_PASSWORD";
pub const BASE_URL_ENV: &str = "JETNET_BASE_URL";
pub const TOKEN_TTL_ENV: &str = "JETNET_TOKEN_TTL_SECS";
pub const TIMEOUT_ENV: &str = "JETNET_TIMEOUT_SECS";

/// Configuration for the Jetnet client.
#[derive(Debug, Clone)]
pub struct JetnetConfig {
    /// API root (e.g. `https://customer.jetnetconnect.com`).
    pub base_url: String,
    /// Login credentials, kept for re-authentication.
    pub credentials: Credentials,
    /// Age after which a token pair is refreshed before use.
    pub token_ttl: Duration,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
    /// Whether `ensure_valid` probes a fresh-looking session.
    pub validate_on_ensure: bool,
}

impl JetnetConfig {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::new(email, password),
            token_ttl: DEFAULT_TOKEN_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            validate_on_ensure: true,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_validate_on_ensure(mut self, validate: bool) -> Self {
        self.validate_on_ensure = validate;
        self
    }

    /// Build a config from `JETNET_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `JetnetError::Config` if credentials are missing, a numeric
    /// override does not parse, or the result fails [`validate`](Self::validate).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let email = non_empty(EMAIL_ENV)
            .ok_or_else(|| JetnetError::Config(format!("{EMAIL_ENV} is not set")))?;
        let password = non_empty(PASSWORD_ENV)
            .ok_or_else(|| JetnetError::Config(format!("{PASSWORD_ENV} is not set")))?;

        let mut config = Self::new(email, password);
        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(secs) = non_empty(TOKEN_TTL_ENV) {
            config.token_ttl = Duration::from_secs(parse_secs(TOKEN_TTL_ENV, &secs)?);
        }
        if let Some(secs) = non_empty(TIMEOUT_ENV) {
            config.request_timeout = Duration::from_secs(parse_secs(TIMEOUT_ENV, &secs)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the config before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.email().trim().is_empty() {
            return Err(JetnetError::Config("email is empty".into()));
        }
        if self.credentials.password().is_empty() {
            return Err(JetnetError::Config("password is empty".into()));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| JetnetError::Config(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(JetnetError::Config(format!(
                "base URL must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.token_ttl.is_zero() {
            return Err(JetnetError::Config("token TTL must be positive".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(JetnetError::Config("request timeout must be positive".into()));
        }
        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| JetnetError::Config(format!("{key}={value:?} is not a number of seconds: {e}")))
}
