//! Session state: credentials, the current token pair and its timestamps.
//!
//! A [`Session`] is owned by one [`Jetnet`](crate::Jetnet) client and mutated
//! in place on every login. The bearer token and the API token are always
//! issued together, so they live in one `Option<TokenPair>`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{JetnetError, Result};

/// Literal placeholder substituted with the API token in request paths.
pub const API_TOKEN_PLACEHOLDER: &str = "{apiToken}";

/// Account credentials used for (re-)login only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token (Authorization header) and API token (URL path), issued
/// together by one login.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub bearer_token: String,
    pub api_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("bearer_token", &redact(&self.bearer_token))
            .field("api_token", &redact(&self.api_token))
            .finish()
    }
}

/// First 8 characters of a secret, for logs.
pub fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(8).collect();
    format!("{prefix}...")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub base_url: String,
    pub credentials: Credentials,
    tokens: Option<TokenPair>,
    issued_at: Option<DateTime<Utc>>,
    last_validated_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl Session {
    /// A session that has not logged in yet.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            tokens: None,
            issued_at: None,
            last_validated_at: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.tokens.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn last_validated_at(&self) -> Option<DateTime<Utc>> {
        self.last_validated_at
    }

    /// Number of successful logins so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the token pair after a successful login.
    ///
    /// `issued_at` never moves backwards, even if `now` does.
    pub fn install(&mut self, tokens: TokenPair, now: DateTime<Utc>) {
        let issued_at = match self.issued_at {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.tokens = Some(tokens);
        self.issued_at = Some(issued_at);
        self.last_validated_at = Some(issued_at);
        self.generation += 1;
    }

    /// Drop the token pair; the next call logs in again.
    pub fn invalidate(&mut self) {
        self.tokens = None;
    }

    pub fn mark_validated(&mut self, now: DateTime<Utc>) {
        self.last_validated_at = Some(now);
    }

    /// True when the pair is older than `ttl`, or there is no pair at all.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.is_stale_at(Utc::now(), ttl)
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let (Some(_), Some(issued_at)) = (&self.tokens, self.issued_at) else {
            return true;
        };
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(issued_at) > ttl
    }

    /// Substitute the API token into `path`.
    ///
    /// # Errors
    ///
    /// Returns `JetnetError::Auth` if the session has no token pair.
    pub fn resolve_path(&self, path: &str) -> Result<String> {
        let tokens = self
            .tokens
            .as_ref()
            .ok_or_else(|| JetnetError::Auth("session is not authenticated".into()))?;
        Ok(substitute_api_token(path, &tokens.api_token))
    }
}

/// Replace every `{apiToken}` in `path` with `api_token`.
pub fn substitute_api_token(path: &str, api_token: &str) -> String {
    path.replace(API_TOKEN_PLACEHOLDER, api_token)
}
