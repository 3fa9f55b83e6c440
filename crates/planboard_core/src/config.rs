//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe database, logging and audit-feed settings in one document.
//! - Load that document from JSON with per-section defaults.
//!
//! # Invariants
//! - A missing section or field falls back to its default.
//! - `validate()` must pass before a config is used to open storage.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_FEED_LIMIT: u32 = 50;
const DEFAULT_MAX_FEED_LIMIT: u32 = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub audit: AuditConfig,
}

/// SQLite connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file. `None` means the caller must supply one.
    pub path: Option<PathBuf>,
    /// How long a writer waits for a competing transaction before failing
    /// with a retryable conflict.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Logging bootstrap settings, consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Activity feed limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub default_feed_limit: u32,
    pub max_feed_limit: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_feed_limit: DEFAULT_FEED_LIMIT,
            max_feed_limit: DEFAULT_MAX_FEED_LIMIT,
        }
    }
}

impl AuditConfig {
    /// Resolves a caller-supplied feed limit: `None` takes the default and
    /// everything is clamped into `1..=max_feed_limit`. A zero maximum is
    /// read as 1, so unvalidated configs still yield a usable limit.
    pub fn normalize_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_feed_limit)
            .clamp(1, self.max_feed_limit.max(1))
    }
}

impl CoreConfig {
    /// Parses a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit.default_feed_limit == 0 || self.audit.max_feed_limit == 0 {
            return Err(ConfigError::Invalid(
                "audit feed limits must be positive".to_string(),
            ));
        }
        if self.audit.default_feed_limit > self.audit.max_feed_limit {
            return Err(ConfigError::Invalid(format!(
                "audit.default_feed_limit {} exceeds audit.max_feed_limit {}",
                self.audit.default_feed_limit, self.audit.max_feed_limit
            )));
        }
        crate::logging::normalize_level(&self.logging.level).map_err(ConfigError::Invalid)?;
        Ok(())
    }
}
