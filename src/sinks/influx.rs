use anyhow::{anyhow, Context, Result};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, error, info};
use url::Url;

use crate::config::service::InfluxConfig;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::sinks::point::Point;
use crate::sinks::ReadingSink;

static INFLUX_MSG: &'static str = "influx";
static ERROR_MSG: &'static str = "error";
static STATUS_MSG: &'static str = "status";

/// InfluxDB 1.x http write api.
#[derive(Debug, Clone)]
pub struct InfluxSink {
    client: Client,
    write_url: Url,
    ping_url: Url,
    username: String,
    password: String,
}

impl InfluxSink {
    pub fn new(client: Client, cfg: &InfluxConfig) -> Result<Self> {
        let base = cfg.address.trim_end_matches('/');

        let mut write_url = Url::parse(&format!("{}/write", base))
            .with_context(|| format!("invalid influx address '{}'", cfg.address))?;
        write_url
            .query_pairs_mut()
            .append_pair("db", &cfg.database)
            .append_pair("precision", "s");
        let ping_url = Url::parse(&format!("{}/ping", base))
            .with_context(|| format!("invalid influx address '{}'", cfg.address))?;

        Ok(Self {
            client,
            write_url,
            ping_url,
            username: cfg.username.clone(),
            password: cfg.password.clone(),
        })
    }

    /// Establish a first connection, fails if influx is not reachable.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .authorized(self.client.get(self.ping_url.clone()))
            .send()
            .await
            .context("influx ping failed")?;
        if !response.status().is_success() {
            return Err(anyhow!("influx ping failed: {}", response.status()));
        }
        info!("influx reachable at '{}'", self.ping_url);
        Ok(())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.username.is_empty() {
            request
        } else {
            request.basic_auth(&self.username, Some(&self.password))
        }
    }
}

impl ReadingSink for InfluxSink {
    async fn write_points(&self, points: &[Point]) -> Result<()> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let lines: Vec<String> = points.iter().filter_map(Point::to_line_protocol).collect();
        if lines.is_empty() {
            debug!("nothing to write to influx");
            return Ok(());
        }

        let response = self
            .authorized(self.client.post(self.write_url.clone()))
            .body(lines.join("\n"))
            .send()
            .await
            .inspect_err(|err| {
                error!("influx write failed: {}", err);
                metrics.sink_failures.with_label_values(&[ERROR_MSG]).inc();
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            metrics.sink_failures.with_label_values(&[STATUS_MSG]).inc();
            return Err(anyhow!("influx write rejected with {}: {}", status, body.trim()));
        }

        metrics.sink_writes.inc();
        metrics.sink_points.inc_by(lines.len() as u64);
        metrics.sink_duration.with_label_values(&[INFLUX_MSG]).observe(start.elapsed().as_secs_f64());
        Ok(())
    }
}
