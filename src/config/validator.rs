use anyhow::{bail, Context, Result};
use tracing::error;
use url::Url;

use crate::config::service::{EnergyConfig, InfluxConfig, ServiceConfig};
use crate::config::settings::SettingsConfig;

pub fn validate_service_config(config: &ServiceConfig) -> Result<()> {
    validate_energy(&config.energy)
        .and_then(|_| validate_influx(&config.influx))
        .and_then(|_| validate_settings(&config.settings))
        .inspect_err(|e| error!("config validation failed: {:#}", e))
}

fn validate_energy(energy: &EnergyConfig) -> Result<()> {
    validate_http_url("energy.api", &energy.api)?;
    if energy.username.trim().is_empty() {
        bail!("energy.username must not be empty");
    }
    if energy.customer.trim().is_empty() {
        bail!("energy.customer must not be empty");
    }
    if energy.client_id.trim().is_empty() {
        bail!("energy.client_id must not be empty");
    }
    Ok(())
}

fn validate_influx(influx: &InfluxConfig) -> Result<()> {
    validate_http_url("influx.address", &influx.address)?;
    if influx.database.trim().is_empty() {
        bail!("influx.database must not be empty");
    }
    if influx.measurement.trim().is_empty() {
        bail!("influx.measurement must not be empty");
    }
    Ok(())
}

fn validate_settings(settings: &SettingsConfig) -> Result<()> {
    if settings.work_dir.trim().is_empty() {
        bail!("settings.work_dir must not be empty");
    }
    if settings.http.connect_timeout_ms == 0 || settings.http.request_timeout_ms == 0 {
        bail!("settings.http timeouts must be greater than zero");
    }
    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        bail!("settings.metrics.path must start with '/', got '{}'", settings.metrics.path);
    }
    if settings.metrics.is_enabled {
        settings
            .server
            .port
            .parse::<u16>()
            .with_context(|| format!("settings.server.port '{}' is not a port", settings.server.port))?;
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("{} '{}' is not a valid url", field, value))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => bail!("{} must use http or https, got '{}'", field, scheme),
    }
}
