//! Response classification.
//!
//! The provider reports most failures inside a 200 body, either as a
//! `responsestatus` string starting with `ERROR` or as a problem-details
//! object. [`classify`] turns a decoded body plus its HTTP status into
//! success or a typed [`JetnetError`]. It has no side effects.

use serde_json::{Map, Value};

use crate::error::{JetnetError, Result};

/// Name of the status field carried by most provider responses.
pub const STATUS_FIELD: &str = "responsestatus";

const ERROR_MARKER: &str = "ERROR";
const INVALID_TOKEN_MARKER: &str = "INVALID SECURITY TOKEN";

/// Longest body excerpt attached to an HTTP error.
const MAX_ERROR_BODY: usize = 512;

/// Classify a response.
///
/// # Errors
///
/// - `Http` when `status >= 400`, regardless of body content.
/// - `Auth` when the status field reports an invalid security token, or a
///   problem-details body carries status 401/403.
/// - `Api` for every other error the body reports.
pub fn classify(status: u16, body: &Value) -> Result<()> {
    if status >= 400 {
        return Err(JetnetError::Http {
            status,
            message: excerpt(body),
        });
    }

    let Some(obj) = body.as_object() else {
        return Ok(());
    };

    if let Some(response_status) = response_status(obj) {
        let upper = response_status.to_uppercase();
        if upper.contains(ERROR_MARKER) {
            if upper.contains(INVALID_TOKEN_MARKER) {
                return Err(JetnetError::Auth(response_status.to_string()));
            }
            return Err(JetnetError::Api(response_status.to_string()));
        }
    }

    if let Some(problem) = Problem::from_object(obj) {
        let message = problem.message();
        return match problem.status {
            Some(401 | 403) => Err(JetnetError::Auth(message)),
            _ => Err(JetnetError::Api(message)),
        };
    }

    Ok(())
}

/// The `responsestatus` value, with the key matched case-insensitively.
pub fn response_status(obj: &Map<String, Value>) -> Option<&str> {
    obj.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(STATUS_FIELD))
        .and_then(|(_, value)| value.as_str())
}

/// RFC 7807-style error body: `type`, `title` and `status` all present.
struct Problem<'a> {
    title: &'a str,
    detail: &'a str,
    raw_status: &'a Value,
    status: Option<u64>,
}

impl<'a> Problem<'a> {
    fn from_object(obj: &'a Map<String, Value>) -> Option<Self> {
        if !(obj.contains_key("type") && obj.contains_key("title")) {
            return None;
        }
        let raw_status = obj.get("status")?;
        let status = match raw_status {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        Some(Self {
            title: obj
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error"),
            detail: obj.get("detail").and_then(Value::as_str).unwrap_or(""),
            raw_status,
            status,
        })
    }

    fn message(&self) -> String {
        let status = match self.raw_status {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let mut msg = format!("{} (status={status})", self.title);
        if !self.detail.is_empty() {
            msg.push_str(": ");
            msg.push_str(self.detail);
        }
        msg
    }
}

fn excerpt(body: &Value) -> String {
    let text = match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() <= MAX_ERROR_BODY {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_ERROR_BODY).collect();
    cut.push_str("...");
    cut
}
