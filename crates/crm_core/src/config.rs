//! Runtime configuration.
//!
//! # Responsibility
//! - Describe storage location, logging and simulation timings.
//! - Load them from a TOML file where every field has a default.
//!
//! # Invariants
//! - An empty document yields `CrmConfig::default()`.
//! - `auto_reply_min_ms <= auto_reply_max_ms` after loading.

use crate::logging::default_log_level;
use crate::store::StoreOptions;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrmConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite file; in-memory when unset.
    pub db_path: Option<PathBuf>,
    pub seed_sample_data: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            seed_sample_data: true,
        }
    }
}

impl StorageConfig {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            seed_sample_data: self.seed_sample_data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Delays of the simulated chat replies and e-mail delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub auto_reply_min_ms: u64,
    pub auto_reply_max_ms: u64,
    pub email_delivery_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            auto_reply_min_ms: 1_000,
            auto_reply_max_ms: 3_000,
            email_delivery_ms: 2_000,
        }
    }
}

impl SimulationConfig {
    pub fn auto_reply_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.auto_reply_min_ms),
            Duration::from_millis(self.auto_reply_max_ms),
        )
    }

    pub fn email_delivery_delay(&self) -> Duration {
        Duration::from_millis(self.email_delivery_ms)
    }
}

impl CrmConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let simulation = &self.simulation;
        if simulation.auto_reply_min_ms > simulation.auto_reply_max_ms {
            return Err(ConfigError::Invalid(format!(
                "simulation.auto_reply_min_ms ({}) exceeds auto_reply_max_ms ({})",
                simulation.auto_reply_min_ms, simulation.auto_reply_max_ms
            )));
        }
        Ok(())
    }
}
