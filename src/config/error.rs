//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The configuration file could not be read.
    #[error("failed to read configuration file {}: {source}", path.display())]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration is structurally valid but semantically wrong.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),

    /// The configuration could not be serialized.
    #[error("serialization error: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The configuration file could not be written.
    #[error("failed to write configuration file {}: {source}", path.display())]
    WriteError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
