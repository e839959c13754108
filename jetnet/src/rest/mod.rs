pub mod endpoints;

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::Value;

use crate::classify::classify;
use crate::error::{JetnetError, Result};
use crate::session::{Credentials, TokenPair};
use crate::types::{LoginRequest, LoginResponse};

use self::endpoints::LOGIN_PATH;

/// HTTP client wrapper for the Jetnet REST API.
///
/// One call per method, no retries. Every response goes through
/// [`classify`] before it is returned.
#[derive(Debug, Clone)]
pub struct JetnetHttpClient {
    client: Client,
    base_url: String,
}

impl JetnetHttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST credentials to the login endpoint and resolve the token pair.
    ///
    /// # Errors
    ///
    /// Every failure, transport included, is reported as `JetnetError::Auth`.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        let body = serde_json::to_value(LoginRequest::from(credentials))?;
        let response = self
            .send(Method::POST, LOGIN_PATH, None, Some(&body))
            .await
            .map_err(|e| match e {
                JetnetError::Auth(_) => e,
                other => JetnetError::Auth(format!("login failed: {other}")),
            })?;

        let response: LoginResponse = serde_json::from_value(response)
            .map_err(|e| JetnetError::Auth(format!("unreadable login response: {e}")))?;
        response.into_token_pair()
    }

    /// Send one request to an already-resolved path.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        bearer_token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(token) = bearer_token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(v) => v,
            Err(_) if status >= 400 => Value::String(text),
            Err(e) => return Err(JetnetError::Json(e)),
        };

        classify(status, &body)?;
        Ok(body)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
