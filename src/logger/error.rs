//! Error types for the logger

use thiserror::Error;

/// Errors that can occur while setting up logging
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to install subscriber: {message}")]
    Init { message: String },

    #[error("Failed to change log level: {message}")]
    Reload { message: String },
}

impl LoggerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn init(message: impl Into<String>) -> Self {
        Self::Init { message: message.into() }
    }

    pub fn reload(message: impl Into<String>) -> Self {
        Self::Reload { message: message.into() }
    }
}
