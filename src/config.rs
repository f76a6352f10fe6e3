/// Runtime configuration loader - parses minemon.toml
///
/// Separates deployment-specific settings from code, making it easy to
/// point the service at a different serial device, API endpoint, or
/// fallback database path without recompiling.
///
/// The primary database connection string is NOT configured here: it comes
/// from the DATABASE_URL environment variable (see `db`), matching how the
/// rest of the deployment tooling expects to find it.

use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Root configuration loaded from minemon.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub transport: TransportConfig,
    pub api: ApiConfig,
    pub fallback: FallbackConfig,
    pub location_defaults: LocationDefaults,
}

/// Serial transport settings. The line discipline (baud rate, parity) is
/// configured on the device out-of-band; the service consumes the device
/// node as a stream of newline-terminated frames.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    pub device: String,
}

/// Remote monitoring API settings for the second persistence tier.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub url: String,
    pub api_key: String,

    /// Attempts per reading before the tier is declared failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Embedded fallback store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// Path to the SQLite database file. Created on first run.
    pub path: String,
}

/// Values used when the resolver creates a mine_locations row for a
/// section name it has never seen, and the id substituted when the
/// resolver itself fails.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationDefaults {
    pub mine_name: String,
    pub level_number: i32,
    pub depth_m: f64,
    pub ventilation_zone: String,

    /// Location id used when lookup/creation fails. Degrades traceability
    /// but never blocks ingestion.
    #[serde(default = "default_fallback_location_id")]
    pub fallback_location_id: i64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_fallback_location_id() -> i64 {
    1
}

/// Loads service configuration from minemon.toml.
///
/// # Panics
/// Panics if the configuration file is missing, malformed, or contains
/// invalid data. This is intentional — the service cannot operate without
/// knowing its transport device and API endpoint.
///
/// # File Location
/// Expects `minemon.toml` in the current working directory (project root
/// when running via `cargo run`), unless an explicit path is given.
pub fn load_config(path: Option<&str>) -> Config {
    let config_path = path.unwrap_or("minemon.toml");

    let contents = fs::read_to_string(config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path, e));

    toml::from_str(&contents)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", config_path, e))
}
