use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::service::InfluxConfig;
use crate::config::settings::SettingsConfig;
use crate::error::PersistenceError;
use crate::observability::metrics::get_metrics;
use crate::sinks::point::Point;
use crate::sinks::ReadingSink;
use crate::sources::energy_client::EnergyClient;
use crate::state::store::StateStore;
use crate::utils::constants::METER_TAG;

/// Drives one `EnergyClient`: every tick fetches the next page and hands the
/// readings to the sink. State is loaded at start and saved on shutdown.
pub struct Poller<S> {
    client: EnergyClient,
    sink: S,
    store: StateStore,
    measurement: String,
    tags: BTreeMap<String, String>,
    interval: Duration,
    print_count: bool,
}

impl<S: ReadingSink> Poller<S> {
    pub fn new(
        client: EnergyClient,
        sink: S,
        store: StateStore,
        settings: &SettingsConfig,
        influx: &InfluxConfig,
    ) -> Self {
        let tags = BTreeMap::from([(METER_TAG.to_owned(), influx.tag_meter.clone())]);
        Self {
            client,
            sink,
            store,
            measurement: influx.measurement.clone(),
            tags,
            interval: settings.interval(),
            print_count: settings.print_count,
        }
    }

    pub fn client(&self) -> &EnergyClient {
        &self.client
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Resume token and cursor from the state file, if there is a usable one.
    pub async fn restore_state(&mut self) -> bool {
        match self.store.load().await {
            Some(state) => {
                let restored = self.client.restore(state);
                if restored {
                    self.client.publish_gauges(get_metrics().await);
                }
                restored
            }
            None => {
                info!("starting with fresh state");
                false
            }
        }
    }

    pub async fn persist_state(&self) -> Result<(), PersistenceError> {
        let metrics = get_metrics().await;
        self.store
            .save(&self.client.state())
            .await
            .inspect_err(|_| metrics.state_persist_failures.inc())
    }

    /// One poll cycle. Returns the number of points handed to the sink.
    pub async fn tick(&mut self) -> Result<usize> {
        let readings = self
            .client
            .fetch_readings()
            .await
            .context("could not retrieve energy content from api")?;

        let points: Vec<Point> = readings
            .iter()
            .map(|reading| Point::from_reading(&self.measurement, &self.tags, reading))
            .collect();

        if points.is_empty() {
            debug!("no new readings");
            return Ok(0);
        }

        if self.print_count {
            info!("write {} data points to sink", points.len());
        } else {
            debug!("write {} data points to sink", points.len());
        }

        self.sink
            .write_points(&points)
            .await
            .context("could not write batch to sink")?;

        Ok(points.len())
    }

    /// Poll until `shutdown` resolves, then persist state. The first poll
    /// happens one interval after start.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("polling every {} seconds", self.interval.as_secs());
        let metrics = get_metrics().await;
        metrics.up.set(1);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, stop polling");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.tick().await {
                        warn!("{:#}", err);
                    }
                }
            }
        }

        metrics.up.set(0);
        if let Err(err) = self.persist_state().await {
            warn!("could not persist state: {}", err);
        }
    }
}
