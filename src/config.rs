//! Configuration for the store and the command-line front end

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Shard count for the record directory; must be a power of two.
    /// `None` uses the dashmap default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_amount: Option<usize>,
    /// Logging configuration
    pub log: LogConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from a file (TOML or JSON).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| Error::Configuration(e.to_string()))?,
            _ => {
                return Err(Error::Configuration(
                    "Unsupported config file format. Use .toml or .json".to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Overlay `TEMPORAL_STORE_*` environment variables onto this config.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(level) = std::env::var("TEMPORAL_STORE_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Ok(json) = std::env::var("TEMPORAL_STORE_LOG_JSON") {
            self.log.json = parse_bool(&json).ok_or_else(|| {
                Error::Configuration(format!("TEMPORAL_STORE_LOG_JSON: not a boolean: {json}"))
            })?;
        }
        if let Ok(shards) = std::env::var("TEMPORAL_STORE_SHARDS") {
            let shards = shards.parse::<usize>().map_err(|e| {
                Error::Configuration(format!("TEMPORAL_STORE_SHARDS: {e}"))
            })?;
            self.shard_amount = Some(shards);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check invariants dashmap would otherwise panic on
    pub fn validate(&self) -> Result<()> {
        if let Some(shards) = self.shard_amount {
            if shards < 2 || !shards.is_power_of_two() {
                return Err(Error::Configuration(format!(
                    "shard_amount must be a power of two greater than 1, got {shards}"
                )));
            }
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
