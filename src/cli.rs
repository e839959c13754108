use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line client for the JETNET aviation data API.
///
/// Credentials come from JETNET_EMAIL / JETNET_PASSWORD (a `.env` file is
/// loaded if present); JETNET_BASE_URL overrides the API root.
#[derive(Parser, Debug)]
#[command(name = "jetnet", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and print account info
    Account,

    /// Look up an aircraft by tail number with relationships and pictures
    Lookup(LookupArgs),

    /// Fetch every page of a paged endpoint as newline-delimited JSON
    Export(ExportArgs),

    /// Measure how long a token stays valid
    Probe(ProbeArgs),
}

/// Arguments for the `lookup` subcommand.
#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Registration / tail number (e.g. N1KE)
    pub registration: String,
}

/// Arguments for the `export` subcommand.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Endpoint name (history, flight-data, events, bulk-export, companies,
    /// contacts, fractional) or a raw path starting with `/`
    pub endpoint: String,

    /// JSON request body file; `-` reads stdin. Defaults to `{}`
    #[arg(long)]
    pub body: Option<PathBuf>,

    /// Records per page (defaults to the endpoint's usual size)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Stop after this many pages
    #[arg(long, default_value = "50")]
    pub max_pages: u32,
}

/// Arguments for the `probe` subcommand.
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Seconds between validation calls
    #[arg(long, default_value = "60")]
    pub interval: u64,
}
