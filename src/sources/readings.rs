use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::state::cursor::Links;

/// One measurement from the readings endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub date_time: DateTime<Utc>,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub power_phase1: f64,
    #[serde(default)]
    pub power_phase2: f64,
    #[serde(default)]
    pub power_phase3: f64,
    #[serde(default)]
    pub energy_reading: f64,
}

/// Body of a readings response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingsPage {
    #[serde(default)]
    pub readings: Option<Vec<Reading>>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl ReadingsPage {
    pub fn into_parts(self) -> (Vec<Reading>, Links) {
        (self.readings.unwrap_or_default(), self.links)
    }
}
