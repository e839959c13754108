use std::time::Duration;

use chrono::{DateTime, Utc};
use jetnet::{ErrorKind, Jetnet, JetnetError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CliError;
use crate::output::write_json;

pub const MAX_CONSECUTIVE_TRANSPORT_ERRORS: u32 = 3;

/// Measured token lifetime.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeReport {
    pub issued_at: DateTime<Utc>,
    pub last_ok_at: DateTime<Utc>,
    pub rejected_at: DateTime<Utc>,
    pub checks: u32,
    /// Time from login to the first rejected probe.
    pub lifetime_secs: i64,
    /// Refresh this long after login to stay one interval ahead of expiry.
    pub recommended_refresh_secs: i64,
}

#[derive(Debug, PartialEq)]
pub enum ProbeStep {
    Continue,
    Rejected(ProbeReport),
    Abort(String),
}

/// Folds probe outcomes into a lifetime measurement.
#[derive(Debug)]
pub struct ProbeTracker {
    issued_at: DateTime<Utc>,
    last_ok_at: DateTime<Utc>,
    interval: Duration,
    checks: u32,
    transport_errors: u32,
}

impl ProbeTracker {
    pub fn new(issued_at: DateTime<Utc>, interval: Duration) -> Self {
        Self {
            issued_at,
            last_ok_at: issued_at,
            interval,
            checks: 0,
            transport_errors: 0,
        }
    }

    pub fn observe(&mut self, outcome: Result<(), &JetnetError>, at: DateTime<Utc>) -> ProbeStep {
        self.checks += 1;
        match outcome {
            Ok(()) => {
                self.transport_errors = 0;
                self.last_ok_at = at;
                ProbeStep::Continue
            }
            Err(e) if e.kind() == ErrorKind::Transport => {
                self.transport_errors += 1;
                if self.transport_errors >= MAX_CONSECUTIVE_TRANSPORT_ERRORS {
                    ProbeStep::Abort(format!(
                        "{} consecutive transport errors, last: {e}",
                        self.transport_errors
                    ))
                } else {
                    ProbeStep::Continue
                }
            }
            Err(_) => ProbeStep::Rejected(self.report(at)),
        }
    }

    fn report(&self, rejected_at: DateTime<Utc>) -> ProbeReport {
        let lifetime_secs = (rejected_at - self.issued_at).num_seconds();
        let interval = i64::try_from(self.interval.as_secs()).unwrap_or(i64::MAX);
        ProbeReport {
            issued_at: self.issued_at,
            last_ok_at: self.last_ok_at,
            rejected_at,
            checks: self.checks,
            lifetime_secs,
            recommended_refresh_secs: lifetime_secs.saturating_sub(interval).max(0),
        }
    }
}

/// Log in, then probe every `interval` until the token is rejected.
pub async fn run_probe(
    client: &Jetnet,
    interval: Duration,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    if interval.is_zero() {
        return Err(CliError::Usage("--interval must be at least 1 second".into()));
    }

    client.login().await?;
    let issued_at = client
        .session()
        .await
        .issued_at()
        .unwrap_or_else(Utc::now);
    info!(%issued_at, interval_secs = interval.as_secs(), "token issued, probing");

    let mut tracker = ProbeTracker::new(issued_at, interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Err(CliError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }

        let outcome = client.probe_account_info().await;
        let at = Utc::now();
        if let Err(e) = &outcome {
            warn!(error = %e, "probe failed");
        }
        match tracker.observe(outcome.as_ref().map(|_| ()), at) {
            ProbeStep::Continue => {
                debug!(elapsed_secs = (at - issued_at).num_seconds(), "token still valid");
            }
            ProbeStep::Rejected(report) => {
                info!(
                    lifetime_secs = report.lifetime_secs,
                    recommended_refresh_secs = report.recommended_refresh_secs,
                    "token rejected"
                );
                return write_json(&mut std::io::stdout().lock(), &report);
            }
            ProbeStep::Abort(reason) => return Err(CliError::ProbeAborted(reason)),
        }
    }
}
