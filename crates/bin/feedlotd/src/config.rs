//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `feedlot.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use feedlot_app::dispatch::MonitorSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Feeding controller settings.
    pub device: DeviceConfig,
    /// Delivery monitor settings.
    pub monitor: MonitorConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Which transport talks to the feeding controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    /// Simulated feeder, no hardware needed.
    Virtual,
    /// Networked controller reached over HTTP.
    Http,
}

/// Feeding controller configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Transport selection.
    pub mode: DeviceMode,
    /// Controller address, used in `http` mode.
    pub address: String,
    /// Per-round-trip deadline in seconds.
    pub connect_timeout_secs: u64,
    /// Simulated dispensing rate in feed units per second, used in
    /// `virtual` mode.
    pub virtual_rate_per_second: f64,
}

/// Delivery monitor configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Maximum |reading − target| that still counts as delivered.
    pub tolerance: f64,
    /// Seconds between scale reads.
    pub poll_interval_secs: u64,
    /// Give-up deadline in seconds, measured from dispatch acknowledgement.
    pub max_duration_secs: u64,
}

impl Config {
    /// Load configuration from `feedlot.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("feedlot.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FEEDLOT_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("FEEDLOT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("FEEDLOT_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("FEEDLOT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("FEEDLOT_DEVICE_ADDRESS") {
            self.device.mode = DeviceMode::Http;
            self.device.address = val;
        }
        if let Ok(val) = std::env::var("FEEDLOT_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.device.mode == DeviceMode::Http && self.device.address.is_empty() {
            return Err(ConfigError::Validation(
                "device.address is required in http mode".to_string(),
            ));
        }
        if self.monitor.tolerance < 0.0 {
            return Err(ConfigError::Validation(
                "monitor.tolerance must not be negative".to_string(),
            ));
        }
        if self.monitor.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "monitor.poll_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the delivery monitor settings.
    #[must_use]
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            tolerance: self.monitor.tolerance,
            poll_interval: Duration::from_secs(self.monitor.poll_interval_secs),
            max_duration: Duration::from_secs(self.monitor.max_duration_secs),
        }
    }

    /// Return the per-round-trip device deadline.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.device.connect_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:feedlot.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "feedlotd=info,feedlot=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mode: DeviceMode::Virtual,
            address: String::new(),
            connect_timeout_secs: 5,
            virtual_rate_per_second: 0.5,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            poll_interval_secs: 1,
            max_duration_secs: 60,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
