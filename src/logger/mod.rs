//! Logger Module
//!
//! Console logging based on `tracing-subscriber` with support for:
//! - Full, compact, and JSON output
//! - Color control (only on a terminal)
//! - Changing the level after startup

pub mod config;
pub mod error;


// Re-export main types
pub use self::config::*;
pub use error::LoggerError;

use std::io::IsTerminal;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Handle for changing the active log level
#[derive(Clone)]
pub struct LogLevelHandle {
    inner: reload::Handle<EnvFilter, Registry>,
}

impl LogLevelHandle {
    /// Replace the active filter with `level`
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        parse_level(level)?;
        let filter = EnvFilter::try_new(level).map_err(|e| LoggerError::config(e.to_string()))?;
        self.inner
            .reload(filter)
            .map_err(|e| LoggerError::reload(e.to_string()))
    }
}

/// Initialize the logger with the given configuration
///
/// Logs go to stderr so that command output on stdout stays parseable.
pub fn init_logger(config: LoggerConfig) -> Result<LogLevelHandle, LoggerError> {
    config.validate()?;

    let filter =
        EnvFilter::try_new(&config.level).map_err(|e| LoggerError::config(e.to_string()))?;
    let (filter, handle) = reload::Layer::new(filter);

    let use_ansi = config.colored && std::io::stderr().is_terminal();
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Full => registry
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(true)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|e| LoggerError::init(e.to_string()))?;

    tracing::debug!(
        level = %config.level,
        format = config.format.as_str(),
        ansi = use_ansi,
        "Logger initialized"
    );

    Ok(LogLevelHandle { inner: handle })
}
