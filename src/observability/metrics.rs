use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

pub const ENDPOINT_TOKEN: &str = "token";
pub const ENDPOINT_READINGS: &str = "readings";

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Upstream metrics
    pub fetch_requests: IntCounterVec,
    pub fetch_failures: IntCounterVec,
    pub fetch_duration: HistogramVec,
    pub readings_fetched: IntCounter,

    // Client state
    pub token_refreshes: IntCounter,
    pub token_expiry_unix: IntGauge,
    pub cursor_present: IntGauge,
    pub state_persist_failures: IntCounter,

    // Sink metrics
    pub sink_writes: IntCounter,
    pub sink_points: IntCounter,
    pub sink_failures: IntCounterVec,
    pub sink_duration: HistogramVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    pub(crate) fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("energyagent".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Upstream
            fetch_requests: IntCounterVec::new(Opts::new("fetch_requests_total", "Upstream requests by endpoint"), &["endpoint"]).unwrap(),
            fetch_failures: IntCounterVec::new(Opts::new("fetch_failures_total", "Upstream failures by endpoint and reason"), &["endpoint", "reason"]).unwrap(),
            fetch_duration: HistogramVec::new(HistogramOpts::new("fetch_duration_seconds", "Upstream request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["endpoint"]).unwrap(),
            readings_fetched: IntCounter::new("readings_fetched_total", "Readings received from upstream").unwrap(),

            // Client state
            token_refreshes: IntCounter::new("token_refreshes_total", "Successful token acquisitions").unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the held token, 0 if none").unwrap(),
            cursor_present: IntGauge::new("cursor_present", "1 if a next link is known").unwrap(),
            state_persist_failures: IntCounter::new("state_persist_failures_total", "Failed state file writes").unwrap(),

            // Sink
            sink_writes: IntCounter::new("sink_writes_total", "Successful batch writes").unwrap(),
            sink_points: IntCounter::new("sink_points_total", "Points written to the sink").unwrap(),
            sink_failures: IntCounterVec::new(Opts::new("sink_failures_total", "Sink failures"), &["reason"]).unwrap(),
            sink_duration: HistogramVec::new(HistogramOpts::new("sink_write_duration_seconds", "Sink write time").buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]), &["sink"]).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.fetch_requests.clone())).unwrap();
        reg.register(Box::new(metrics.fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.readings_fetched.clone())).unwrap();
        reg.register(Box::new(metrics.token_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.cursor_present.clone())).unwrap();
        reg.register(Box::new(metrics.state_persist_failures.clone())).unwrap();
        reg.register(Box::new(metrics.sink_writes.clone())).unwrap();
        reg.register(Box::new(metrics.sink_points.clone())).unwrap();
        reg.register(Box::new(metrics.sink_failures.clone())).unwrap();
        reg.register(Box::new(metrics.sink_duration.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
