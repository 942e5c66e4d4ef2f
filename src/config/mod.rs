//! Configuration resolution for proxy-settings
//!
//! This module provides layered configuration loading with support for:
//! - Built-in defaults for every known key
//! - An optional `config.toml` in the working directory
//! - Environment variable overrides named after the keys
//!
//! # Configuration Priority (lowest to highest)
//! 1. Defaults from [`DefaultsRegistry::standard`]
//! 2. `./config.toml`
//! 3. Environment variables such as `PORT` or `CACHE_REDIS_PORT`

pub mod defaults;
pub mod env;
pub mod error;
pub mod file;
pub mod key;
pub mod loader;
pub mod settings;

// Re-export public types
pub use defaults::{DefaultValue, DefaultsRegistry};
pub use env::{EnvBinding, EnvOverride, EnvSource, EnvironmentSource, MapEnv, ProcessEnv};
pub use error::ConfigError;
pub use file::{FileOutcome, FileSource, LoadedFile};
pub use key::ConfigKey;
pub use loader::{ConfigLoader, Layer, Resolution, load_settings};
pub use settings::{
    CacheSettings, CacheType, OAuth2Settings, RedisSettings, RistrettoSettings, Settings,
};
