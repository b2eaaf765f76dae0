// Broadcast server: accepts TCP clients, reads one handshake, then streams the
// latest payload to each client on its own cadence until the connection fails.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval, timeout};

use crate::config::{ServerConfig, SocketConfig};
use crate::output::LatestOutput;

/// Upper bound for the single handshake read.
pub const HANDSHAKE_BUFFER_SIZE: usize = 1024;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Number of currently attached clients, shared by every connection task.
#[derive(Debug, Clone, Default)]
pub struct ConnectionCounter(Arc<AtomicUsize>);

/// Decrements the connection count on drop (accept = +1, close = -1).
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl ConnectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    fn open(&self) -> ConnectionGuard {
        self.0.fetch_add(1, Ordering::Relaxed);
        ConnectionGuard(self.0.clone())
    }
}

/// Shared state and shutdown for the accept loop.
pub struct ServerDeps {
    pub output: LatestOutput,
    pub connections: ConnectionCounter,
    pub shutdown_rx: watch::Receiver<bool>,
}

#[derive(Debug, Clone, Copy)]
struct StreamTiming {
    send_interval: Duration,
    write_timeout: Duration,
}

/// Resolves the configured endpoint, binds it and runs the accept loop.
/// An invalid endpoint or a failed bind is logged and the server simply does
/// not start; the rest of the process keeps running.
pub fn spawn(
    socket: SocketConfig,
    config: ServerConfig,
    deps: ServerDeps,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let addr = match socket.endpoint() {
            Ok(addr) => addr,
            Err(e) => {
                tracing::info!(
                    error = %e,
                    "Invalid port or IP address! Please check then restart the program."
                );
                return;
            }
        };
        let listener = match TcpListener::bind(addr).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, %addr, operation = "bind", "Failed to bind listener");
                return;
            }
        };
        tracing::info!("Listening on tcp://{}", addr);
        serve(listener, deps, config).await;
    })
}

/// Accept loop. The stop signal is checked once per completed accept; each
/// accepted client gets its own task.
pub async fn serve(listener: TcpListener, deps: ServerDeps, config: ServerConfig) {
    let ServerDeps {
        output,
        connections,
        shutdown_rx,
    } = deps;
    let timing = StreamTiming {
        send_interval: Duration::from_millis(config.send_interval_ms),
        write_timeout: Duration::from_secs(config.write_timeout_secs),
    };

    let stats_handle = spawn_stats_logger(
        connections.clone(),
        Duration::from_secs(config.stats_log_interval_secs),
        shutdown_rx.clone(),
    );

    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        tracing::info!(
            connections = connections.current(),
            "Listening for connecting..."
        );
        match listener.accept().await {
            Ok((stream, peer)) => {
                let guard = connections.open();
                tokio::spawn(handle_connection(
                    stream,
                    peer,
                    guard,
                    output.clone(),
                    shutdown_rx.clone(),
                    timing,
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, operation = "accept", "Accept failed");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
    stats_handle.abort();
    tracing::debug!("Accept loop shutting down");
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    guard: ConnectionGuard,
    output: LatestOutput,
    shutdown_rx: watch::Receiver<bool>,
    timing: StreamTiming,
) {
    tracing::info!(%peer, "Client connected");
    if let Err(e) = stream_payloads(&mut stream, &output, &shutdown_rx, timing).await {
        tracing::info!(%peer, error = %e, "Client stream error");
    }
    if let Err(e) = stream.shutdown().await {
        tracing::debug!(%peer, error = %e, "Socket shutdown failed");
    }
    drop(stream);
    drop(guard);
    tracing::info!(%peer, "Client disconnected");
}

async fn stream_payloads(
    stream: &mut TcpStream,
    output: &LatestOutput,
    shutdown_rx: &watch::Receiver<bool>,
    timing: StreamTiming,
) -> anyhow::Result<()> {
    // Handshake: any content, including EOF, moves the connection on.
    let mut buf = [0u8; HANDSHAKE_BUFFER_SIZE];
    let n = stream.read(&mut buf).await?;
    tracing::debug!(bytes = n, "Handshake received");

    let mut tick = interval(timing.send_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tick.tick().await;
        if *shutdown_rx.borrow() {
            return Ok(());
        }
        let wire = output.latest().wire();
        timeout(timing.write_timeout, stream.write_all(&wire))
            .await
            .map_err(|_| anyhow::anyhow!("write timed out after {:?}", timing.write_timeout))??;
    }
}

fn spawn_stats_logger(
    connections: ConnectionCounter,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately; skip it so the first line lands after one period.
        tick.tick().await;
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    tracing::info!(connections = connections.current(), "server stats");
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
