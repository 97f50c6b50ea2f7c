//! Configuration loader for the `stationdash` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase, improving
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Retention cap: 7 days of readings at 10-minute intervals.
pub const DEFAULT_HISTORY_CAP: u32 = 1008;

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// SQLite connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Weather-station endpoint serving the current reading as JSON.
    pub station_url: String,

    /// Key for the history blob in the key-value table.
    pub history_key: String,

    /// Maximum number of retained readings.
    pub history_cap: u32,

    /// Sampling interval for the background poller, in minutes.
    pub poll_minutes: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – SQLite connection string
/// - `STATION_URL` – weather-station endpoint URL
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `HISTORY_KEY` – blob key for the history (default: `weather-history`)
/// - `HISTORY_CAP` – max retained readings (default: 1008)
/// - `POLL_MINUTES` – poller interval in minutes (default: 15)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let station_url = require_env!("STATION_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let history_key =
        env::var("HISTORY_KEY").unwrap_or_else(|_| "weather-history".to_string());
    let history_cap = parse_env_u32!("HISTORY_CAP", DEFAULT_HISTORY_CAP);
    let poll_minutes = parse_env_u32!("POLL_MINUTES", 15);

    Ok(Config {
        db_url,
        db_pool_max,
        station_url,
        history_key,
        history_cap,
        poll_minutes,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL : {}", self.db_url);
        tracing::info!("  STATION_URL  : {}", self.station_url);
        tracing::info!("  DB_POOL_MAX  : {}", self.db_pool_max);
        tracing::info!("  HISTORY_KEY  : {}", self.history_key);
        tracing::info!("  HISTORY_CAP  : {}", self.history_cap);
        tracing::info!("  POLL_MINUTES : {}", self.poll_minutes);
    }
}
