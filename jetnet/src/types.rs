use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JetnetError, Result};
use crate::session::{Credentials, TokenPair};

/// Body of `POST /api/Admin/APILogin`.
///
/// The server only accepts `emailAddress` with a capital A; other spellings
/// get a 200 with an error body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "emailAddress")]
    pub email_address: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            email_address: credentials.email(),
            password: credentials.password(),
        }
    }
}

/// Login response. The API token has been seen under two names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub bearer_token: Option<String>,
    pub api_token: Option<String>,
    pub security_token: Option<String>,
}

impl LoginResponse {
    /// Resolve the token pair: `apiToken` first, `securityToken` otherwise.
    /// Empty strings count as missing.
    ///
    /// # Errors
    ///
    /// Returns `JetnetError::Auth` if either token cannot be resolved.
    pub fn into_token_pair(self) -> Result<TokenPair> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        let bearer_token = non_empty(self.bearer_token);
        let api_token = non_empty(self.api_token).or_else(|| non_empty(self.security_token));

        match (bearer_token, api_token) {
            (Some(bearer_token), Some(api_token)) => Ok(TokenPair {
                bearer_token,
                api_token,
            }),
            _ => Err(JetnetError::Auth(
                "login succeeded but bearerToken or apiToken missing from response".into(),
            )),
        }
    }
}

/// Aircraft record plus its owner/operator relationships and pictures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftProfile {
    pub aircraft: Value,
    pub relationships: Vec<Value>,
    pub pictures: Vec<Value>,
}

impl AircraftProfile {
    pub fn aircraft_id(&self) -> Option<u64> {
        aircraft_id(&self.aircraft)
    }
}

/// `aircraftid` of an aircraft record; some endpoints send it as a string.
pub fn aircraft_id(aircraft: &Value) -> Option<u64> {
    let id = match aircraft.get("aircraftid")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id != 0)
}
