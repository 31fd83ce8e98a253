//! Runtime configuration read from the environment (and `.env` via dotenvy).

use chrono::FixedOffset;
use std::env;

const DEFAULT_FX_API_URL: &str = "https://api.exchangerate-api.com/v4/latest";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Facturama PAC credentials
#[derive(Debug, Clone)]
pub struct FacturamaConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub sandbox: bool,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    /// Offset of the pricing zones' wall clock (central Mexico has no DST: UTC-6)
    pub local_utc_offset: FixedOffset,
    pub fx_api_url: String,
    pub fx_api_key: Option<String>,
    /// Minutes between background FX refreshes; 0 disables the task
    pub fx_refresh_interval_mins: u64,
    pub facturama: FacturamaConfig,
}

impl AppConfig {
    /// Load configuration from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let offset_hours: i32 = parse_or(get("LOCAL_UTC_OFFSET_HOURS"), "LOCAL_UTC_OFFSET_HOURS", -6)?;
        let local_utc_offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| {
            ConfigError::Invalid {
                name: "LOCAL_UTC_OFFSET_HOURS",
                value: offset_hours.to_string(),
            }
        })?;

        Ok(Self {
            database_url,
            database_max_connections: parse_or(
                get("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                5,
            )?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 8080)?,
            local_utc_offset,
            fx_api_url: get("FX_API_URL").unwrap_or_else(|| DEFAULT_FX_API_URL.to_string()),
            fx_api_key: get("FX_API_KEY"),
            fx_refresh_interval_mins: parse_or(
                get("FX_REFRESH_INTERVAL_MINS"),
                "FX_REFRESH_INTERVAL_MINS",
                0,
            )?,
            facturama: FacturamaConfig {
                user: get("FACTURAMA_USER"),
                password: get("FACTURAMA_PASSWORD"),
                sandbox: get("FACTURAMA_SANDBOX").as_deref() == Some("true"),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
