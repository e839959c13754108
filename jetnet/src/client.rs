use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::JetnetConfig;
use crate::error::{JetnetError, Result};
use crate::rest::endpoints::ACCOUNT_INFO_PATH;
use crate::rest::JetnetHttpClient;
use crate::session::{redact, substitute_api_token, Session, TokenPair};

/// Refresh-and-retry rounds allowed per logical call.
pub const MAX_AUTH_RETRIES: u32 = 1;

/// Main Jetnet client: owns the session and keeps its token pair valid.
///
/// Session state sits behind an async mutex and logins run while it is held,
/// so callers racing on an expired pair trigger a single login. Share one
/// client across tasks with `Arc<Jetnet>`.
#[derive(Debug)]
pub struct Jetnet {
    http_client: JetnetHttpClient,
    session: Mutex<Session>,
    token_ttl: Duration,
    validate_on_ensure: bool,
}

impl Jetnet {
    /// Create an unauthenticated client. The first call logs in.
    pub fn new(config: JetnetConfig) -> Result<Self> {
        config.validate()?;
        let http_client = JetnetHttpClient::new(&config.base_url, config.request_timeout)?;
        let session = Session::new(http_client.base_url(), config.credentials);

        Ok(Self {
            http_client,
            session: Mutex::new(session),
            token_ttl: config.token_ttl,
            validate_on_ensure: config.validate_on_ensure,
        })
    }

    /// Create a client and log in immediately.
    pub async fn connect(config: JetnetConfig) -> Result<Self> {
        let client = Self::new(config)?;
        client.login().await?;
        Ok(client)
    }

    /// Resume from a token pair issued earlier, without logging in.
    pub fn with_tokens(
        config: JetnetConfig,
        tokens: TokenPair,
        issued_at: DateTime<Utc>,
    ) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.session.get_mut().install(tokens, issued_at);
        Ok(client)
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub fn http_client(&self) -> &JetnetHttpClient {
        &self.http_client
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// True when the current pair is older than the configured TTL.
    pub async fn is_stale(&self) -> bool {
        self.session.lock().await.is_stale(self.token_ttl)
    }

    // --- Token lifecycle ---

    /// Log in unconditionally and install the new pair.
    pub async fn login(&self) -> Result<TokenPair> {
        let mut session = self.session.lock().await;
        self.login_locked(&mut session).await
    }

    /// Return a pair that is fresh and, if configured, proven by a probe.
    ///
    /// A stale pair is replaced by a login with no probe. A fresh pair that
    /// fails the probe is replaced once; if the new pair also fails, the
    /// session is cleared and `Auth` is returned.
    pub async fn ensure_valid(&self) -> Result<TokenPair> {
        let mut session = self.session.lock().await;

        if session.is_stale(self.token_ttl) {
            debug!(generation = session.generation(), "session stale, logging in");
            return self.login_locked(&mut session).await;
        }

        let tokens = match session.tokens() {
            Some(tokens) => tokens.clone(),
            None => return self.login_locked(&mut session).await,
        };
        if !self.validate_on_ensure {
            return Ok(tokens);
        }

        if let Err(e) = self.probe_with(&tokens).await {
            warn!(error = %e, "validation probe failed, logging in again");
            let fresh = self.login_locked(&mut session).await?;
            if let Err(e) = self.probe_with(&fresh).await {
                session.invalidate();
                return Err(JetnetError::Auth(format!(
                    "session still invalid after re-login: {e}"
                )));
            }
            session.mark_validated(Utc::now());
            return Ok(fresh);
        }

        session.mark_validated(Utc::now());
        Ok(tokens)
    }

    /// Call the account-info probe once with the current pair. No refresh,
    /// no retry.
    pub async fn probe_account_info(&self) -> Result<Value> {
        let tokens = self
            .session
            .lock()
            .await
            .tokens()
            .cloned()
            .ok_or_else(|| JetnetError::Auth("session is not authenticated".into()))?;
        self.probe_with(&tokens).await
    }

    async fn probe_with(&self, tokens: &TokenPair) -> Result<Value> {
        let path = substitute_api_token(ACCOUNT_INFO_PATH, &tokens.api_token);
        self.http_client
            .send(Method::GET, &path, Some(&tokens.bearer_token), None)
            .await
    }

    async fn login_locked(&self, session: &mut Session) -> Result<TokenPair> {
        match self.http_client.login(&session.credentials).await {
            Ok(tokens) => {
                session.install(tokens.clone(), Utc::now());
                info!(
                    generation = session.generation(),
                    api_token = %redact(&tokens.api_token),
                    "login succeeded"
                );
                Ok(tokens)
            }
            Err(e) => {
                session.invalidate();
                Err(e)
            }
        }
    }

    /// Current pair and its generation, logging in first when there is no
    /// pair or it is stale.
    async fn current_tokens(&self) -> Result<(TokenPair, u64)> {
        let mut session = self.session.lock().await;
        let tokens = match session.tokens() {
            Some(tokens) if !session.is_stale(self.token_ttl) => tokens.clone(),
            _ => self.login_locked(&mut session).await?,
        };
        Ok((tokens, session.generation()))
    }

    /// Log in again unless another caller already replaced the pair seen at
    /// `seen_generation`.
    async fn refresh_after(&self, seen_generation: u64) -> Result<(TokenPair, u64)> {
        let mut session = self.session.lock().await;
        let tokens = match session.tokens() {
            Some(tokens) if session.generation() != seen_generation => {
                debug!(
                    seen_generation,
                    generation = session.generation(),
                    "token pair already refreshed"
                );
                tokens.clone()
            }
            _ => self.login_locked(&mut session).await?,
        };
        Ok((tokens, session.generation()))
    }

    // --- Authenticated requests ---

    /// Send an authenticated request.
    ///
    /// `{apiToken}` in `path` is replaced by the API token and the bearer
    /// token goes in the Authorization header. On `Auth` the pair is
    /// refreshed and the request replayed, at most [`MAX_AUTH_RETRIES`] times.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let (mut tokens, mut generation) = self.current_tokens().await?;
        let mut attempt = 0;

        loop {
            let resolved = substitute_api_token(path, &tokens.api_token);
            let result = self
                .http_client
                .send(method.clone(), &resolved, Some(&tokens.bearer_token), body)
                .await;

            match result {
                Err(e) if e.is_auth() && attempt < MAX_AUTH_RETRIES => {
                    attempt += 1;
                    warn!(path, attempt, error = %e, "token rejected, re-authenticating");
                    (tokens, generation) = self.refresh_after(generation).await?;
                }
                other => return other,
            }
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    // --- REST delegates ---

    /// GET /api/Admin/getAccountInfo - account metadata.
    pub async fn account_info(&self) -> Result<Value> {
        self.get(ACCOUNT_INFO_PATH).await
    }
}
