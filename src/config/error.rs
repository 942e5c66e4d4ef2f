//! Configuration error types

use thiserror::Error;

/// Configuration error types
///
/// The file variants are soft: the resolver logs them and carries on with
/// the lower-precedence layers. Only [`ConfigError::Decode`] aborts a
/// resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path that was checked
        path: String,
    },

    /// The configuration file exists but could not be inspected or read
    #[error("Unable to access configuration file {path}: {source}")]
    FileAccess {
        /// Path that was checked
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Malformed configuration file
    #[error("Failed to parse configuration file {path}: {source}")]
    FileParse {
        /// Path of the malformed file
        path: String,
        /// Parser failure
        #[source]
        source: config::ConfigError,
    },

    /// A key that the merge layer rejects as a path
    #[error("Invalid configuration key '{key}': {source}")]
    InvalidKey {
        /// The offending key
        key: String,
        /// Path parse failure
        #[source]
        source: config::ConfigError,
    },

    /// The merged key space could not be bound into the typed settings
    #[error("Unable to decode configuration: {0}")]
    Decode(#[source] config::ConfigError),
}

impl ConfigError {
    /// Create a new file not found error
    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound { path: path.into() }
    }

    /// Create a new file access error
    pub fn file_access<S: Into<String>>(path: S, source: std::io::Error) -> Self {
        ConfigError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid key error
    pub fn invalid_key<S: Into<String>>(key: S, source: config::ConfigError) -> Self {
        ConfigError::InvalidKey {
            key: key.into(),
            source,
        }
    }
}
