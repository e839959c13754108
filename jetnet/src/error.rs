use thiserror::Error;

/// Coarse failure category, for callers that branch on how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// HTTP failure or a body that could not be decoded. Never retried.
    Transport,
    /// Login failed or the token pair was rejected.
    Auth,
    /// The provider rejected the request itself (bad parameters, quota, ...).
    Api,
    /// The call was never attempted: bad configuration or arguments.
    Usage,
}

#[derive(Error, Debug)]
pub enum JetnetError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl JetnetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JetnetError::Http { .. } | JetnetError::Request(_) | JetnetError::Json(_) => {
                ErrorKind::Transport
            }
            JetnetError::Auth(_) => ErrorKind::Auth,
            JetnetError::Api(_) => ErrorKind::Api,
            JetnetError::Config(_) | JetnetError::Validation(_) => ErrorKind::Usage,
        }
    }

    /// True for errors that warrant a fresh login before retrying.
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

pub type Result<T> = std::result::Result<T, JetnetError>;
