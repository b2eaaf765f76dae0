use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

use crate::models::PayloadFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub socket: SocketConfig,
    pub threshold: ThresholdConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Listening endpoint. Kept as raw strings: an unparsable value only stops the
/// broadcast server from starting, it never fails config loading.
#[derive(Debug, Clone, Deserialize)]
pub struct SocketConfig {
    pub ip: String,
    pub port: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid IP address {0:?}")]
    InvalidIp(String),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

impl SocketConfig {
    pub fn endpoint(&self) -> Result<SocketAddr, EndpointError> {
        let port = self
            .port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| EndpointError::InvalidPort(self.port.clone()))?;
        let ip = self
            .ip
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| EndpointError::InvalidIp(self.ip.clone()))?;
        Ok(SocketAddr::new(ip, port))
    }
}

/// Safety limits in percent. FileRead, FileWrite and Process reuse these
/// three positionally (see `ThresholdConfig::limit_for`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ThresholdConfig {
    pub cpu: f64,
    pub ram: f64,
    pub disk: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub format: PayloadFormat,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            format: PayloadFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_interval_ms")]
    pub send_interval_ms: u64,
    /// A write stuck longer than this closes the connection.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
    /// How often to log the number of attached clients at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: default_interval_ms(),
            write_timeout_secs: default_write_timeout_secs(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_write_timeout_secs() -> u64 {
    10
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (key, value) in [
            ("threshold.cpu", self.threshold.cpu),
            ("threshold.ram", self.threshold.ram),
            ("threshold.disk", self.threshold.disk),
        ] {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "{} must be a non-negative number, got {}",
                key,
                value
            );
        }
        anyhow::ensure!(
            self.sampler.interval_ms > 0,
            "sampler.interval_ms must be > 0, got {}",
            self.sampler.interval_ms
        );
        anyhow::ensure!(
            self.server.send_interval_ms > 0,
            "server.send_interval_ms must be > 0, got {}",
            self.server.send_interval_ms
        );
        anyhow::ensure!(
            self.server.write_timeout_secs > 0,
            "server.write_timeout_secs must be > 0, got {}",
            self.server.write_timeout_secs
        );
        anyhow::ensure!(
            self.server.stats_log_interval_secs > 0,
            "server.stats_log_interval_secs must be > 0, got {}",
            self.server.stats_log_interval_secs
        );
        Ok(())
    }
}
