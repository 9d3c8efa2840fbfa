use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::{DEFAULT_API_BASE, DEFAULT_CLIENT_ID};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub energy: EnergyConfig,
    pub influx: InfluxConfig,
}

/// ================================
/// Upstream readings api
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct EnergyConfig {
    #[serde(default = "default_api")]
    pub api: String,
    pub username: String,
    pub password: String,
    pub customer: String,
    /// public oauth client, authenticated with an empty secret
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

/// ================================
/// Downstream InfluxDB (1.x http api)
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    #[serde(default = "default_influx_address")]
    pub address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    /// optional location of the smart meter, written as `meter` tag
    #[serde(default)]
    pub tag_meter: String,
}

fn default_api() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_influx_address() -> String {
    "http://127.0.0.1:8086".to_string()
}

fn default_database() -> String {
    "freshenergy".to_string()
}

fn default_measurement() -> String {
    "energy".to_string()
}
