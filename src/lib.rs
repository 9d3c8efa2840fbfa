//! # Energy Agent Library
//!
//! Polls the getfresh.energy readings api with an OAuth2 password grant,
//! resumes from the last pagination link across restarts and forwards
//! readings to InfluxDB.
//!
//! Modules:
//! - `sources`: token manager and paginated readings client
//! - `state`: token, cursor and the state file
//! - `sinks`: InfluxDB line protocol sink
//! - `executor`: poll loop driving client and sink
//! - `config`: YAML service configuration

pub mod config;
pub mod error;
pub mod executor;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sinks;
pub mod sources;
pub mod state;
pub mod tests;
pub mod utils;

pub use crate::config::service::ServiceConfig;
pub use crate::error::{AuthError, FetchError, PersistenceError};
