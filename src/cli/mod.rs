//! CLI module for proxy-settings
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Command execution against the resolved configuration

pub mod executor;
pub mod parser;

// Re-export public types for convenience
pub use executor::{execute_command, exit_status, run};
pub use parser::{Cli, Commands, LogFormatArg, LogLevel, OutputFormat};
