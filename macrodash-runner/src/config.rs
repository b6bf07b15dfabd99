//! Dashboard data-layer configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) gives the stock setup:
//!
//! ```toml
//! [store]
//! root = "data"
//!
//! [ingest]
//! workers = 1
//! timeout_secs = 30
//! history_start = "2000-01-01"
//!
//! [resolver]
//! long_periods = ["1y", "3y", "5y", "10y", "max"]
//!
//! [providers]
//! fred_api_key_env = "FRED_API_KEY"
//! ```

use chrono::NaiveDate;
use macrodash_core::series::Period;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the category subdirectories and `manifest.json`.
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Parallel ingestion workers; 1 means sequential.
    pub workers: usize,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
    /// First date requested by a full FRED fetch.
    pub history_start: NaiveDate,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            timeout_secs: 30,
            history_start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Periods served from the store before any live call.
    pub long_periods: Vec<Period>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            long_periods: Period::DEFAULT_LONG.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Environment variable holding the FRED API key.
    pub fred_api_key_env: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            fred_api_key_env: "FRED_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub store: StoreConfig,
    pub ingest: IngestConfig,
    pub resolver: ResolverConfig,
    pub providers: ProvidersConfig,
}

impl DashConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.workers == 0 {
            return Err(ConfigError::Invalid("ingest.workers must be at least 1".into()));
        }
        if self.ingest.timeout_secs == 0 {
            return Err(ConfigError::Invalid("ingest.timeout_secs must be at least 1".into()));
        }
        if self.providers.fred_api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "providers.fred_api_key_env must name an environment variable".into(),
            ));
        }
        Ok(())
    }
}
