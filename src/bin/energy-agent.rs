use anyhow::{Context, Result};
use clap::Parser;
use energy_agent::executor::poller::Poller;
use energy_agent::server;
use energy_agent::sinks::influx::InfluxSink;
use energy_agent::sources::energy_client::EnergyClient;
use energy_agent::sources::http::build_http_client;
use energy_agent::sources::Credentials;
use energy_agent::state::store::StateStore;
use energy_agent::utils::config_loader;
use energy_agent::utils::logging::{self, LogLevel};
use energy_agent::utils::signal::shutdown_signal;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "energy-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Use new state even if there is a persistent one.
    #[arg(short = 's', long)]
    new_state: bool,
    /// Log the number of data points written per batch.
    #[arg(short = 'z', long)]
    print_count: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let mut service_config = config_loader::run(&args.config).await?;
    service_config.settings.use_new_state |= args.new_state;
    service_config.settings.print_count |= args.print_count;
    logging::run(&service_config, args.log_level).await?;

    let settings = service_config.settings.clone();

    // -------------------------------
    // 2. Create request client, shared by upstream and sink
    // -------------------------------

    let client = build_http_client(&settings.http)?;

    // -------------------------------
    // 3. Sink: fail fast if influx is not reachable
    // -------------------------------

    let sink = InfluxSink::new(client.clone(), &service_config.influx)?;
    sink.ping()
        .await
        .context("could not establish connection to influxdb")?;

    // -------------------------------
    // 4. Energy client with persisted state
    // -------------------------------

    let credentials = Credentials::from_config(&service_config.energy)
        .context("invalid energy api url")?;
    let energy_client = EnergyClient::new(credentials, client);
    let store = StateStore::in_dir(&settings.work_dir);

    let mut poller = Poller::new(energy_client, sink, store, &settings, &service_config.influx);
    if !settings.use_new_state {
        poller.restore_state().await;
    }

    // -------------------------------
    // 5. Metrics endpoint
    // -------------------------------

    let server_settings = settings.clone();
    let http_server = tokio::spawn(async move {
        if let Err(err) = server::server::start(&server_settings).await {
            error!("{:#}", err);
        }
    });

    // -------------------------------
    // 6. Poll until SIGINT / SIGTERM, then persist state
    // -------------------------------

    info!("Service starting...");
    poller.run(shutdown_signal()).await;
    http_server.abort();

    info!("Exiting application.");
    Ok(())
}
