use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::settings::HttpConfig;

/// Shared client for upstream and sink requests. Built once, cloned into
/// every component so connections are pooled.
pub fn build_http_client(cfg: &HttpConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
        .timeout(Duration::from_millis(cfg.request_timeout_ms))
        .build()
        .context("failed to build HTTP client")
}
