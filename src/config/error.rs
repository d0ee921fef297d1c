//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting could not be parsed.
    #[error("failed to parse {name} '{value}': {source}")]
    NumberParseError {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A numeric setting must be strictly positive.
    #[error("invalid {name}: must be greater than zero")]
    ZeroValue { name: &'static str },

    /// Sticky routing key was neither `raw` nor `normalized`.
    #[error("invalid sticky key '{value}': expected 'raw' or 'normalized'")]
    InvalidStickyKey { value: String },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
