//! Configuration loader for the `climascore-engine` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Every variable is optional; an unparseable value is
//! a startup error rather than a silent default.
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::providers::{ERA5_URL, NASA_POWER_URL, OPEN_METEO_URL};

/// Parse an optional numeric environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// HTTP listen port.
    pub port: u16,

    /// Open-Meteo forecast API base URL.
    pub open_meteo_url: String,

    /// Open-Meteo archive (ERA5) API base URL.
    pub era5_url: String,

    /// NASA POWER API base URL.
    pub nasa_power_url: String,

    /// Upper bound on each provider request.
    pub provider_timeout: Duration,

    /// Lifetime of cached results.
    pub cache_ttl: Duration,

    /// Base loan amount the recommendation scales from.
    pub loan_base_amount: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            open_meteo_url: OPEN_METEO_URL.to_string(),
            era5_url: ERA5_URL.to_string(),
            nasa_power_url: NASA_POWER_URL.to_string(),
            provider_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(15 * 60),
            loan_base_amount: 500.0,
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `CLIMA_PORT` – HTTP listen port (default: 8080)
/// - `OPEN_METEO_URL` – forecast API base URL
/// - `ERA5_URL` – archive API base URL
/// - `NASA_POWER_URL` – POWER API base URL
/// - `PROVIDER_TIMEOUT_SECS` – per-provider request timeout (default: 5)
/// - `CACHE_TTL_SECS` – cached result lifetime (default: 900)
/// - `LOAN_BASE_AMOUNT` – base loan amount (default: 500)
///
/// Returns an error if any numeric variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let defaults = Config::default();

    let port = parse_env!("CLIMA_PORT", u16, defaults.port);
    let open_meteo_url = env_or!("OPEN_METEO_URL", defaults.open_meteo_url);
    let era5_url = env_or!("ERA5_URL", defaults.era5_url);
    let nasa_power_url = env_or!("NASA_POWER_URL", defaults.nasa_power_url);
    let timeout_secs = parse_env!("PROVIDER_TIMEOUT_SECS", u64, defaults.provider_timeout.as_secs());
    let ttl_secs = parse_env!("CACHE_TTL_SECS", u64, defaults.cache_ttl.as_secs());
    let loan_base_amount = parse_env!("LOAN_BASE_AMOUNT", f64, defaults.loan_base_amount);

    if timeout_secs == 0 {
        return Err(anyhow!("Invalid PROVIDER_TIMEOUT_SECS: must be at least 1"));
    }
    if !loan_base_amount.is_finite() || loan_base_amount < 0.0 {
        return Err(anyhow!("Invalid LOAN_BASE_AMOUNT: {}", loan_base_amount));
    }

    Ok(Config {
        port,
        open_meteo_url,
        era5_url,
        nasa_power_url,
        provider_timeout: Duration::from_secs(timeout_secs),
        cache_ttl: Duration::from_secs(ttl_secs),
        loan_base_amount,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  CLIMA_PORT            : {}", self.port);
        tracing::info!("  OPEN_METEO_URL        : {}", self.open_meteo_url);
        tracing::info!("  ERA5_URL              : {}", self.era5_url);
        tracing::info!("  NASA_POWER_URL        : {}", self.nasa_power_url);
        tracing::info!("  PROVIDER_TIMEOUT_SECS : {}", self.provider_timeout.as_secs());
        tracing::info!("  CACHE_TTL_SECS        : {}", self.cache_ttl.as_secs());
        tracing::info!("  LOAN_BASE_AMOUNT      : {}", self.loan_base_amount);
    }
}
