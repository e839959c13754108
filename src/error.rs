use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Jetnet(#[from] jetnet::JetnetError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),

    #[error("aircraft not found: {0}")]
    NotFound(String),

    #[error("probe aborted: {0}")]
    ProbeAborted(String),

    #[error("cancelled")]
    Cancelled,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::ProbeAborted(_) => 2,
            CliError::Jetnet(e) if e.kind() == jetnet::ErrorKind::Usage => 2,
            CliError::Cancelled => 130,
            _ => 1,
        }
    }
}
