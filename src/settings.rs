//! Runtime settings.
//!
//! Settings are layered with the `config` crate, lowest precedence first:
//! built-in defaults, an optional TOML file (`--config`), `UPTIMEROBOT_*`
//! environment variables, then command-line flags.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;
use thiserror::Error;
use uptimewatch_adapters::uptimerobot::DEFAULT_ENDPOINT;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9705;
pub const DEFAULT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_EMPTY_CONFIRMATIONS: u32 = 2;

const ENV_PREFIX: &str = "UPTIMEROBOT";

#[derive(Parser, Debug, Default)]
#[command(name = "uptimewatch")]
#[command(about = "Prometheus exporter for UptimeRobot account and monitor state")]
#[command(version)]
pub struct Args {
    /// UptimeRobot API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Address to listen on
    #[arg(long = "ip")]
    pub address: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seconds between polls of the UptimeRobot API
    #[arg(long)]
    pub interval: Option<u64>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Consecutive empty monitor lists required before all monitor series
    /// are removed
    #[arg(long)]
    pub empty_confirmations: Option<u32>,

    /// UptimeRobot API base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds (transport default when unset)
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("an UptimeRobot API key is required (--api-key or UPTIMEROBOT_API_KEY)")]
    MissingApiKey,

    #[error("interval must be greater than zero")]
    ZeroInterval,

    #[error("empty_confirmations must be at least 1")]
    ZeroEmptyConfirmations,

    #[error("request_timeout must be greater than zero when set")]
    ZeroRequestTimeout,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub address: String,
    pub port: u16,
    /// Poll interval in seconds.
    pub interval: u64,
    pub log_level: String,
    pub empty_confirmations: u32,
    pub endpoint: String,
    /// Request timeout in seconds.
    pub request_timeout: Option<u64>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("interval", &self.interval)
            .field("log_level", &self.log_level)
            .field("empty_confirmations", &self.empty_confirmations)
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Settings {
    /// Load settings from every layer, reading the process environment.
    pub fn load(args: &Args) -> Result<Self, SettingsError> {
        Self::load_with_env(args, None)
    }

    /// Load settings with an explicit set of environment variables instead of
    /// the process environment.
    pub fn load_with_env(
        args: &Args,
        env: Option<Map<String, String>>,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("api_key", "")?
            .set_default("address", DEFAULT_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("interval", DEFAULT_INTERVAL_SECS)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("empty_confirmations", i64::from(DEFAULT_EMPTY_CONFIRMATIONS))?
            .set_default("endpoint", DEFAULT_ENDPOINT)?;

        if let Some(path) = &args.config {
            builder = builder.add_source(File::from(path.clone()).format(FileFormat::Toml));
        }

        // Values stay strings here so a numeric-looking API key keeps its
        // leading zeros. Numeric fields are converted during deserialization.
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env));

        let settings: Settings = builder
            .set_override_option("api_key", args.api_key.clone())?
            .set_override_option("address", args.address.clone())?
            .set_override_option("port", args.port.map(i64::from))?
            .set_override_option("interval", args.interval)?
            .set_override_option("log_level", args.log_level.clone())?
            .set_override_option("empty_confirmations", args.empty_confirmations.map(i64::from))?
            .set_override_option("endpoint", args.endpoint.clone())?
            .set_override_option("request_timeout", args.request_timeout)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.api_key.trim().is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        if self.interval == 0 {
            return Err(SettingsError::ZeroInterval);
        }
        if self.empty_confirmations == 0 {
            return Err(SettingsError::ZeroEmptyConfirmations);
        }
        if self.request_timeout == Some(0) {
            return Err(SettingsError::ZeroRequestTimeout);
        }
        Ok(())
    }

    /// `address:port`, bracketing IPv6 addresses.
    pub fn listen_addr(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }
}
