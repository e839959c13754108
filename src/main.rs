mod account;
mod cli;
mod error;
mod export;
mod lookup;
mod output;
mod probe;

use std::time::Duration;

use clap::Parser;
use cli::Command;
use error::CliError;
use jetnet::{Jetnet, JetnetConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv(); // load .env if present

    let cancel = setup_signal_handlers();

    if let Err(e) = run(cli.command, cancel).await {
        error!(error = %e, "jetnet failed");
        std::process::exit(e.exit_code());
    }
}

async fn run(command: Command, cancel: CancellationToken) -> Result<(), CliError> {
    let config = JetnetConfig::from_env()?;
    info!(base_url = %config.base_url, email = config.credentials.email(), "jetnet starting");
    let client = Jetnet::new(config)?;

    match command {
        Command::Account => account::run_account(&client).await,
        Command::Lookup(args) => lookup::run_lookup(&client, &args.registration).await,
        Command::Export(args) => export::run_export(&client, &args, cancel).await,
        Command::Probe(args) => {
            probe::run_probe(&client, Duration::from_secs(args.interval), cancel).await
        }
    }
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("received SIGTERM, shutting down");
                    cancel_clone.cancel();
                }
                Err(e) => warn!(error = %e, "failed to register SIGTERM handler"),
            }
        });
    }

    cancel
}
