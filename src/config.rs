//! Runtime configuration read from the environment

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::machine::Capacities;

const DEFAULT_JSON_PATH: &str = "data/machine_state.json";
const DEFAULT_SQLITE_PATH: &str = "data/machine_state.db";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Application settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Storage backend: `json`, `sqlite` or `memory`
    pub storage_type: String,
    /// File the state is persisted to
    pub data_path: PathBuf,
    /// Water capacity in ml
    pub water_capacity: f64,
    /// Coffee capacity in g
    pub coffee_capacity: f64,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Apply per-client request limits
    pub rate_limit_enabled: bool,
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Read settings from name/value pairs, matching names case-insensitively
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.to_uppercase(), value))
            .collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_type = lookup("STORAGE_TYPE")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|| "json".to_string());

        let data_path = match lookup("DATA_PATH") {
            Some(path) => PathBuf::from(path),
            None if storage_type == "sqlite" => PathBuf::from(DEFAULT_SQLITE_PATH),
            None => PathBuf::from(DEFAULT_JSON_PATH),
        };

        let defaults = Capacities::default();
        let water_capacity = match lookup("WATER_CAPACITY") {
            Some(raw) => parse_capacity("WATER_CAPACITY", &raw)?,
            None => defaults.water,
        };
        let coffee_capacity = match lookup("COFFEE_CAPACITY") {
            Some(raw) => parse_capacity("COFFEE_CAPACITY", &raw)?,
            None => defaults.coffee,
        };

        let rate_limit_enabled = match lookup("RATE_LIMIT_ENABLED") {
            Some(raw) => parse_bool("RATE_LIMIT_ENABLED", &raw)?,
            None => true,
        };

        Ok(Self {
            storage_type,
            data_path,
            water_capacity,
            coffee_capacity,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            rate_limit_enabled,
            log_level: lookup("LOG_LEVEL")
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|| "info".to_string()),
            cors_origins: parse_origins(
                lookup("CORS_ORIGINS").as_deref().unwrap_or(DEFAULT_CORS_ORIGINS),
            ),
        })
    }

    pub fn capacities(&self) -> Capacities {
        Capacities {
            water: self.water_capacity,
            coffee: self.coffee_capacity,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let capacities = Capacities::default();
        Self {
            storage_type: "json".to_string(),
            data_path: PathBuf::from(DEFAULT_JSON_PATH),
            water_capacity: capacities.water,
            coffee_capacity: capacities.coffee,
            bind_address: "127.0.0.1:8080".to_string(),
            rate_limit_enabled: true,
            log_level: "info".to_string(),
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

fn parse_capacity(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let value: f64 = raw.trim().parse().map_err(|_| invalid("not a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("must be a positive finite number"));
    }
    Ok(value)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
