//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and logger setup.

use std::io::Write;
use std::process::ExitCode;

use super::parser::{Cli, Commands, OutputFormat};
use crate::config::{ConfigError, ConfigLoader, EnvSource, Resolution, Settings};
use crate::logger::LogLevelHandle;

/// Execute a CLI command against the working directory and process environment
///
/// # Errors
/// Returns the decode error if the configuration cannot be resolved, or an
/// I/O error if the output cannot be written
pub fn execute_command(cli: &Cli, logger: Option<&LogLevelHandle>) -> anyhow::Result<()> {
    let loader = ConfigLoader::new();
    let stdout = std::io::stdout();
    run(cli, logger, &loader, &mut stdout.lock())
}

/// Execute a CLI command with an explicit loader and output
pub fn run<E, W>(
    cli: &Cli,
    logger: Option<&LogLevelHandle>,
    loader: &ConfigLoader<E>,
    out: &mut W,
) -> anyhow::Result<()>
where
    E: EnvSource,
    W: Write,
{
    match cli.command.clone().unwrap_or_default() {
        Commands::Show { format, sources } => {
            let resolution = resolve(cli, logger, loader)?;
            if sources {
                writeln!(out, "{}", render_sources(&resolution, loader))?;
            } else {
                writeln!(out, "{}", render_settings(&resolution.settings, format)?)?;
            }
        }
        Commands::Check => {
            let resolution = resolve(cli, logger, loader)?;
            tracing::info!(
                file_loaded = resolution.file.is_loaded(),
                overrides = resolution.overrides.len(),
                "Configuration is valid"
            );
            writeln!(out, "ok")?;
        }
        Commands::Keys => {
            writeln!(out, "{}", render_keys(loader))?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Map a command result to the process exit status
///
/// Configuration errors have already been logged, so they only set a failing
/// status. Anything else is returned for `main` to report.
pub fn exit_status(result: anyhow::Result<()>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is::<ConfigError>() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e),
    }
}

/// Resolve the configuration, logging a decode failure before returning it
fn resolve<E: EnvSource>(
    cli: &Cli,
    logger: Option<&LogLevelHandle>,
    loader: &ConfigLoader<E>,
) -> anyhow::Result<Resolution> {
    let resolution = loader.resolve().inspect_err(|e| {
        tracing::error!(error = %e, "Unable to decode configuration");
    })?;

    // The `debug` setting raises the level unless the command line chose one
    if resolution.settings.debug
        && !cli.explicit_log_level()
        && let Some(handle) = logger
    {
        handle.set_level("debug")?;
        tracing::debug!("Debug logging enabled by configuration");
    }

    Ok(resolution)
}

/// Serialize the settings in the requested format
pub fn render_settings(settings: &Settings, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Toml => toml::to_string_pretty(settings)?,
        OutputFormat::Json => serde_json::to_string_pretty(settings)?,
    };
    Ok(rendered.trim_end().to_string())
}

/// One line per known key: key, winning layer
pub fn render_sources<E: EnvSource>(resolution: &Resolution, loader: &ConfigLoader<E>) -> String {
    let width = key_width(loader);
    loader
        .defaults()
        .keys()
        .map(|key| format!("{:<width$}  {}", key.as_str(), resolution.source_of(key)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per known key: key, default, environment variable
pub fn render_keys<E: EnvSource>(loader: &ConfigLoader<E>) -> String {
    let width = key_width(loader);
    let defaults = loader.defaults();
    let environment = loader.environment();

    let value_width = defaults
        .iter()
        .map(|(_, value)| value.to_string().len())
        .max()
        .unwrap_or(0);

    environment
        .bindings()
        .iter()
        .map(|binding| {
            let default = defaults
                .get(&binding.key)
                .map(ToString::to_string)
                .unwrap_or_default();
            format!(
                "{:<width$}  {:<value_width$}  {}",
                binding.key.as_str(),
                default,
                binding.var
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn key_width<E: EnvSource>(loader: &ConfigLoader<E>) -> usize {
    loader
        .defaults()
        .keys()
        .map(|key| key.as_str().len())
        .max()
        .unwrap_or(0)
}
