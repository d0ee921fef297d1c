//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `MATCHGATE_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_AUTHORITY_TIMEOUT_MS, DEFAULT_MAX_CANDIDATES, DEFAULT_SUGGESTION_LIMIT,
};
use crate::cutover::StickyKey;

/// File name of the persisted cutover document inside `data_dir`.
pub const CUTOVER_FILENAME: &str = "cutover.json";
/// File name of the persisted metrics document inside `data_dir`.
pub const METRICS_FILENAME: &str = "metrics.json";
/// File name of the learning cache snapshot inside `data_dir`.
pub const LEARNING_FILENAME: &str = "learning.json";

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `MATCHGATE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted documents. Default: `./.data`.
    pub data_dir: PathBuf,

    /// Upper bound on a single Authority call. Default: `500ms`.
    pub authority_timeout: Duration,

    /// Maximum suggestions returned per request. Default: `5`.
    pub suggestion_limit: usize,

    /// Maximum canonical entities fuzzy-scored per request. Default: `200`.
    pub max_candidates: usize,

    /// Which form of the input feeds the sticky routing hash. Default: raw.
    pub sticky_key: StickyKey,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./.data"),
            authority_timeout: Duration::from_millis(DEFAULT_AUTHORITY_TIMEOUT_MS),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            sticky_key: StickyKey::default(),
        }
    }
}

impl Config {
    const ENV_DATA_DIR: &'static str = "MATCHGATE_DATA_DIR";
    const ENV_AUTHORITY_TIMEOUT_MS: &'static str = "MATCHGATE_AUTHORITY_TIMEOUT_MS";
    const ENV_SUGGESTION_LIMIT: &'static str = "MATCHGATE_SUGGESTION_LIMIT";
    const ENV_MAX_CANDIDATES: &'static str = "MATCHGATE_MAX_CANDIDATES";
    const ENV_STICKY_KEY: &'static str = "MATCHGATE_STICKY_KEY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_dir = Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir);
        let authority_timeout = Self::parse_timeout_from_env(defaults.authority_timeout)?;
        let suggestion_limit =
            Self::parse_usize_from_env(Self::ENV_SUGGESTION_LIMIT, defaults.suggestion_limit);
        let max_candidates =
            Self::parse_usize_from_env(Self::ENV_MAX_CANDIDATES, defaults.max_candidates);
        let sticky_key = Self::parse_sticky_key_from_env(defaults.sticky_key)?;

        Ok(Self {
            data_dir,
            authority_timeout,
            suggestion_limit,
            max_candidates,
            sticky_key,
        })
    }

    /// Validates basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }
        if self.authority_timeout.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_AUTHORITY_TIMEOUT_MS,
            });
        }
        if self.suggestion_limit == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_SUGGESTION_LIMIT,
            });
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MAX_CANDIDATES,
            });
        }
        Ok(())
    }

    /// Path of the persisted cutover document.
    pub fn cutover_path(&self) -> PathBuf {
        self.data_dir.join(CUTOVER_FILENAME)
    }

    /// Path of the persisted metrics document.
    pub fn metrics_path(&self) -> PathBuf {
        self.data_dir.join(METRICS_FILENAME)
    }

    /// Path of the learning cache snapshot.
    pub fn learning_path(&self) -> PathBuf {
        self.data_dir.join(LEARNING_FILENAME)
    }

    fn parse_timeout_from_env(default: Duration) -> Result<Duration, ConfigError> {
        match env::var(Self::ENV_AUTHORITY_TIMEOUT_MS) {
            Ok(value) => {
                let millis: u64 =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::NumberParseError {
                            name: Self::ENV_AUTHORITY_TIMEOUT_MS,
                            value: value.clone(),
                            source: e,
                        })?;

                if millis == 0 {
                    return Err(ConfigError::ZeroValue {
                        name: Self::ENV_AUTHORITY_TIMEOUT_MS,
                    });
                }

                Ok(Duration::from_millis(millis))
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_sticky_key_from_env(default: StickyKey) -> Result<StickyKey, ConfigError> {
        match env::var(Self::ENV_STICKY_KEY) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidStickyKey { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
