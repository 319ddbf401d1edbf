//! # Engine Configuration
//!
//! Process settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`COCOLU_*`)
//! 2. Defaults (this file)
//!
//! Commission mode and profit share are NOT here: they live in the database
//! configuration store and are read once per order.
//!
//! ## Environment Variables
//! ```text
//! COCOLU_DB_PATH                    ./cocolu.db
//! COCOLU_COMMIT_TIMEOUT_MS          10000
//! COCOLU_BUSINESS_DAY_DELIVERY      false
//! COCOLU_AUTO_ASSIGN_MANUFACTURER   true
//! COCOLU_MAX_CONNECTIONS            5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cocolu_db::DbConfig;

/// A malformed environment value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': expected {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Upper bound on the writes of one commit transaction.
    pub commit_timeout: Duration,

    /// Roll delivery estimates forward to the next weekday.
    pub business_day_delivery: bool,

    /// Assign the least loaded manufacturer when a request names none.
    pub auto_assign_manufacturer: bool,

    /// Pool size.
    pub max_connections: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            db_path: PathBuf::from("./cocolu.db"),
            commit_timeout: Duration::from_millis(10_000),
            business_day_delivery: false,
            auto_assign_manufacturer: true,
            max_connections: 5,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `COCOLU_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`EngineConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = EngineConfig::default();

        if let Some(path) = lookup("COCOLU_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup("COCOLU_COMMIT_TIMEOUT_MS") {
            let ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "COCOLU_COMMIT_TIMEOUT_MS",
                    value: raw.clone(),
                    expected: "a positive number of milliseconds",
                })?;
            config.commit_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("COCOLU_BUSINESS_DAY_DELIVERY") {
            config.business_day_delivery = parse_flag("COCOLU_BUSINESS_DAY_DELIVERY", &raw)?;
        }

        if let Some(raw) = lookup("COCOLU_AUTO_ASSIGN_MANUFACTURER") {
            config.auto_assign_manufacturer = parse_flag("COCOLU_AUTO_ASSIGN_MANUFACTURER", &raw)?;
        }

        if let Some(raw) = lookup("COCOLU_MAX_CONNECTIONS") {
            config.max_connections = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "COCOLU_MAX_CONNECTIONS",
                    value: raw.clone(),
                    expected: "a positive integer",
                })?;
        }

        Ok(config)
    }

    /// Pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone()).max_connections(self.max_connections)
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
            expected: "true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.commit_timeout, Duration::from_secs(10));
        assert!(!config.business_day_delivery);
        assert!(config.auto_assign_manufacturer);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("COCOLU_DB_PATH", "/tmp/orders.db"),
            ("COCOLU_COMMIT_TIMEOUT_MS", "2500"),
            ("COCOLU_BUSINESS_DAY_DELIVERY", "yes"),
            ("COCOLU_AUTO_ASSIGN_MANUFACTURER", "0"),
            ("COCOLU_MAX_CONNECTIONS", "8"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/orders.db"));
        assert_eq!(config.commit_timeout, Duration::from_millis(2500));
        assert!(config.business_day_delivery);
        assert!(!config.auto_assign_manufacturer);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.db_config().max_connections, 8);
    }

    #[test]
    fn test_invalid_values() {
        let err = EngineConfig::from_lookup(lookup(&[("COCOLU_COMMIT_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("COCOLU_COMMIT_TIMEOUT_MS"));

        assert!(EngineConfig::from_lookup(lookup(&[("COCOLU_COMMIT_TIMEOUT_MS", "0")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[("COCOLU_BUSINESS_DAY_DELIVERY", "maybe")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[("COCOLU_MAX_CONNECTIONS", "-1")])).is_err());
    }
}
