use tracing::{info, warn};

/// Resolves on SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            warn!("cannot listen for SIGTERM, only Ctrl+C will stop the service: {}", err);
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c() => {}
        _ = sigterm.recv() => {
            info!("Received SIGTERM. Initiating graceful shutdown...");
        }
    }
}

#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received SIGINT (Ctrl+C). Initiating graceful shutdown..."),
        Err(err) => {
            warn!("cannot listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
