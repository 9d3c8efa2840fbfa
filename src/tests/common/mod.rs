// src/tests/common/mod.rs
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::service::InfluxConfig;
use crate::sinks::point::Point;
use crate::sinks::ReadingSink;
use crate::sources::energy_client::EnergyClient;
use crate::sources::Credentials;
use crate::utils::constants::DEFAULT_CLIENT_ID;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "s3cret";
pub const CUSTOMER: &str = "4711";

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn credentials(api_base: &str) -> Credentials {
    Credentials::new(USERNAME, PASSWORD, CUSTOMER, api_base, DEFAULT_CLIENT_ID).expect("credentials")
}

pub fn energy_client(server: &MockServer) -> EnergyClient {
    EnergyClient::new(credentials(&server.base_url()), build_reqwest_client())
}

/// `Authorization` header of the public web client with empty secret.
pub fn client_basic_auth() -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", DEFAULT_CLIENT_ID)))
}

pub fn token_body(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "scope": "x",
        "jti": "1"
    })
}

pub async fn mock_token<'a>(server: &'a MockServer, access_token: &str) -> Mock<'a> {
    let body = token_body(access_token);
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

pub fn readings_body(next: Option<&str>) -> Value {
    let links = match next {
        Some(href) => json!({ "next": { "href": href }, "self": { "href": "https://x/self" } }),
        None => json!({ "next": { "href": "" }, "self": { "href": "https://x/self" } }),
    };
    json!({
        "readings": [{
            "dateTime": "2024-01-01T00:00:00Z",
            "power": 1.5,
            "powerPhase1": 0.5,
            "powerPhase2": 0.5,
            "powerPhase3": 0.5,
            "energyReading": 1234.5
        }],
        "_links": links
    })
}

pub fn influx_config(address: &str, tag_meter: &str) -> InfluxConfig {
    InfluxConfig {
        address: address.to_owned(),
        username: "admin".to_owned(),
        password: "secret".to_owned(),
        database: "freshenergy".to_owned(),
        measurement: "energy".to_owned(),
        tag_meter: tag_meter.to_owned(),
    }
}

/// Sink keeping every batch in memory.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub batches: Arc<Mutex<Vec<Vec<Point>>>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn batches(&self) -> Vec<Vec<Point>> {
        self.batches.lock().expect("sink lock").clone()
    }
}

impl ReadingSink for RecordingSink {
    async fn write_points(&self, points: &[Point]) -> Result<()> {
        if self.fail {
            return Err(anyhow!("sink unavailable"));
        }
        self.batches.lock().expect("sink lock").push(points.to_vec());
        Ok(())
    }
}

pub fn meter_tags(meter: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("meter".to_owned(), meter.to_owned())])
}
