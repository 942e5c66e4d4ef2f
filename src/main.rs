use std::process::ExitCode;

use clap::Parser;

use proxy_settings::cli::{Cli, execute_command, exit_status};
use proxy_settings::logger::init_logger;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let handle = init_logger(cli.logger_config()?)?;

    tracing::debug!(version = proxy_settings::pkg_version(), "Starting proxy-settings");

    exit_status(execute_command(&cli, Some(&handle)))
}
