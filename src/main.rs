use anyhow::Result;
use hostpulse::*;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "Starting"
    );

    let app_config = config::AppConfig::load()?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (shared_output, latest_output) = output::SharedOutput::new();

    let sampler = sampler::Sampler::new(
        metric_source::SysinfoSource::new(),
        app_config.threshold,
        app_config.sampler.format,
        shared_output,
    );
    let sampler_handle = sampler::spawn(
        sampler,
        Duration::from_millis(app_config.sampler.interval_ms),
        shutdown_rx.clone(),
    );

    let connections = server::ConnectionCounter::new();
    let _server_handle = server::spawn(
        app_config.socket.clone(),
        app_config.server.clone(),
        server::ServerDeps {
            output: latest_output,
            connections: connections.clone(),
            shutdown_rx,
        },
    );

    shutdown_signal().await;
    tracing::info!(
        connections = connections.current(),
        "Received shutdown signal"
    );
    let _ = shutdown_tx.send(true);
    // The accept loop only notices the stop signal after its next accept, so
    // it is left to end with the runtime.
    let _ = sampler_handle.await;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
