use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Deadline applied to every individual store call, in seconds.
    pub query_timeout: u64,
    pub retry_interval: u64,
    pub pool_max: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "mlbuser".to_string(),
            password: String::new(),
            database: "mlb_impact".to_string(),
            query_timeout: 30,
            retry_interval: 5,
            pool_max: 12,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("MLB_DB_HOST").unwrap_or(defaults.host),
            port: parse_var("MLB_DB_PORT", defaults.port)?,
            user: env::var("MLB_DB_USER").unwrap_or(defaults.user),
            password: env::var("MLB_DB_PASS").unwrap_or(defaults.password),
            database: env::var("MLB_DB_NAME").unwrap_or(defaults.database),
            query_timeout: parse_var("MLB_DB_TIMEOUT", defaults.query_timeout)?,
            retry_interval: parse_var("MLB_DB_RETRY_INTERVAL", defaults.retry_interval)?,
            pool_max: parse_var("MLB_DB_POOL_MAX", defaults.pool_max)?,
        })
    }

    pub fn query_deadline(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_interval)
    }
}

/// Reads an optional variable, falling back to `default` when unset and
/// failing when it is set but malformed.
pub(crate) fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid {} format", key))),
        _ => Ok(default),
    }
}
