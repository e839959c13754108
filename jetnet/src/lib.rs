pub mod aircraft;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod paginate;
pub mod rest;
pub mod session;
pub mod types;

// ---- Top-level re-exports for ergonomic usage ----

// Client + config
pub use client::{Jetnet, MAX_AUTH_RETRIES};
pub use config::JetnetConfig;
pub use error::{ErrorKind, JetnetError, Result};

// REST client
pub use reqwest::Method;
pub use rest::endpoints::PagedEndpoint;
pub use rest::JetnetHttpClient;

// Session
pub use session::{Credentials, Session, SessionState, TokenPair, API_TOKEN_PLACEHOLDER};

// Classification
pub use classify::classify;

// Pagination
pub use paginate::{FetchSummary, PageOptions, PageRequest, PageResult};

// Wire types
pub use types::{AircraftProfile, LoginResponse};
