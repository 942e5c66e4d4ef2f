//! proxy-settings
//!
//! Layered runtime configuration for the forwarding proxy: built-in
//! defaults, an optional `config.toml`, and environment variables, decoded
//! into one typed [`Settings`](crate::config::Settings) value at startup.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod logger;

pub use self::config::{ConfigError, ConfigLoader, Settings, load_settings};

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
