//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};

use crate::logger::{LogFormat, LoggerConfig, LoggerError};

/// Resolve the proxy's runtime configuration
#[derive(Parser, Debug)]
#[command(name = "proxy-settings")]
#[command(about = "Resolve the proxy's runtime configuration")]
#[command(long_about = "
Resolves the proxy's configuration from built-in defaults, an optional
config.toml in the current directory, and environment variables, in that
order of precedence, and prints the result.

EXAMPLES:
    # Print the resolved settings as TOML
    proxy-settings show

    # Print them as JSON, together with the layer each value came from
    proxy-settings show --format json --sources

    # Fail with a non-zero exit code if the configuration does not decode
    proxy-settings check

    # List every key, its default, and the variable that overrides it
    proxy-settings keys
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute (defaults to `show`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level.
    /// Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only.
    /// Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level override
    ///
    /// Takes precedence over --verbose/--quiet and over the `debug` setting.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Full)]
    pub log_format: LogFormatArg,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve and print the settings (default)
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,

        /// Print every key with the layer that supplied its value
        #[arg(long)]
        sources: bool,
    },
    /// Resolve the settings and report whether they decode
    Check,
    /// List every known key, its default, and its environment variable
    Keys,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Show {
            format: OutputFormat::Toml,
            sources: false,
        }
    }
}

/// Output format for `show`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    #[value(name = "toml")]
    Toml,
    #[value(name = "json")]
    Json,
}

/// Log format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    #[value(name = "full")]
    Full,
    #[value(name = "compact")]
    Compact,
    #[value(name = "json")]
    Json,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Whether the log level was chosen on the command line
    pub fn explicit_log_level(&self) -> bool {
        self.log_level.is_some() || self.verbose || self.quiet
    }

    /// Effective log level name
    pub fn log_level_name(&self) -> String {
        match (self.log_level, self.verbose, self.quiet) {
            (Some(level), _, _) => level.into(),
            (None, true, _) => "debug".to_string(),
            (None, false, true) => "error".to_string(),
            (None, false, false) => "info".to_string(),
        }
    }

    /// Logger configuration derived from the global flags
    pub fn logger_config(&self) -> Result<LoggerConfig, LoggerError> {
        LoggerConfig::new(
            self.log_level_name(),
            self.log_format.into(),
            !self.no_color,
        )
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Full => LogFormat::Full,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
