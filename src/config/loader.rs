//! Configuration loader for proxy-settings
//!
//! This module provides the `ConfigLoader` struct that resolves the three
//! configuration layers with proper precedence and decodes the result.

use config::{Config, ConfigBuilder, builder::DefaultState};

use crate::config::defaults::DefaultsRegistry;
use crate::config::env::{EnvOverride, EnvSource, EnvironmentSource, ProcessEnv};
use crate::config::error::ConfigError;
use crate::config::file::{FileOutcome, FileSource, LoadedFile};
use crate::config::key::ConfigKey;
use crate::config::settings::Settings;

/// Layer that supplied the winning value for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Built-in default
    Default,
    /// `config.toml`
    File,
    /// Environment variable
    Environment,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Default => "default",
            Layer::File => "file",
            Layer::Environment => "environment",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a successful resolution
#[derive(Debug)]
pub struct Resolution {
    /// The decoded settings
    pub settings: Settings,
    /// What the file layer contributed
    pub file: FileOutcome,
    /// Environment overrides applied, in key order
    pub overrides: Vec<EnvOverride>,
}

impl Resolution {
    /// Layer whose value won for `key`
    pub fn source_of(&self, key: &ConfigKey) -> Layer {
        if self.overrides.iter().any(|o| &o.key == key) {
            Layer::Environment
        } else if self.file.loaded().is_some_and(|file| file.contains(key)) {
            Layer::File
        } else {
            Layer::Default
        }
    }
}

/// Short-lived merge state for one resolution
///
/// Each layer writes into the builder in precedence order; decoding
/// consumes it.
struct MergeContext {
    builder: ConfigBuilder<DefaultState>,
}

impl MergeContext {
    fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    fn apply_defaults(mut self, defaults: &DefaultsRegistry) -> Result<Self, ConfigError> {
        for (key, value) in defaults.iter() {
            self.builder = self
                .builder
                .set_default(key.as_str(), value.clone())
                .map_err(|e| ConfigError::invalid_key(key.as_str(), e))?;
        }
        Ok(self)
    }

    fn apply_file(mut self, file: &LoadedFile) -> Self {
        self.builder = self
            .builder
            .add_source(file.clone());
        self
    }

    fn apply_overrides(mut self, overrides: &[EnvOverride]) -> Result<Self, ConfigError> {
        for o in overrides {
            tracing::debug!(key = %o.key, var = %o.var, "Applying environment override");
            self.builder = self
                .builder
                .set_override(o.key.as_str(), o.value.clone())
                .map_err(|e| ConfigError::invalid_key(o.key.as_str(), e))?;
        }
        Ok(self)
    }

    fn decode(self) -> Result<Settings, ConfigError> {
        self.builder
            .build()
            .and_then(|config| config.try_deserialize::<Settings>())
            .map_err(ConfigError::Decode)
    }
}

/// Resolves defaults, the config file, and the environment into [`Settings`]
///
/// Precedence (lowest to highest):
/// 1. Built-in defaults
/// 2. `config.toml` in the search directory (optional)
/// 3. Environment variables named after the keys
#[derive(Debug)]
pub struct ConfigLoader<E = ProcessEnv> {
    defaults: DefaultsRegistry,
    file: FileSource,
    env: E,
}

impl ConfigLoader<ProcessEnv> {
    /// Create a loader for the working directory and the process environment
    pub fn new() -> Self {
        Self {
            defaults: DefaultsRegistry::standard(),
            file: FileSource::new(),
            env: ProcessEnv,
        }
    }
}

impl Default for ConfigLoader<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> ConfigLoader<E> {
    /// Replace the defaults
    pub fn with_defaults(mut self, defaults: DefaultsRegistry) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the file source
    pub fn with_file(mut self, file: FileSource) -> Self {
        self.file = file;
        self
    }

    /// Replace the environment
    pub fn with_env<F: EnvSource>(self, env: F) -> ConfigLoader<F> {
        ConfigLoader {
            defaults: self.defaults,
            file: self.file,
            env,
        }
    }

    pub fn defaults(&self) -> &DefaultsRegistry {
        &self.defaults
    }

    pub fn file(&self) -> &FileSource {
        &self.file
    }

    /// Environment bindings for every known key
    pub fn environment(&self) -> EnvironmentSource {
        EnvironmentSource::for_keys(self.defaults.keys())
    }

    /// Resolve and decode the settings
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] if a value cannot be coerced to its
    /// field type. Problems with the config file never fail the load.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        self.resolve().map(|resolution| resolution.settings)
    }

    /// Resolve and decode the settings, reporting where values came from
    pub fn resolve(&self) -> Result<Resolution, ConfigError> {
        let file = self.file.contribute();
        if let Some(loaded) = file.loaded() {
            for key in loaded.keys().iter().filter(|k| !self.defaults.contains(k)) {
                tracing::debug!(key = %key, path = %loaded.path(), "Ignoring unknown configuration key");
            }
        }

        let overrides = self.environment().overrides(&self.env);

        let mut context = MergeContext::new().apply_defaults(&self.defaults)?;
        if let Some(loaded) = file.loaded() {
            context = context.apply_file(loaded);
        }
        let settings = context.apply_overrides(&overrides)?.decode()?;

        tracing::debug!(
            file_loaded = file.is_loaded(),
            overrides = overrides.len(),
            "Configuration resolved"
        );

        Ok(Resolution {
            settings,
            file,
            overrides,
        })
    }
}

/// Resolve the settings from `./config.toml` and the process environment
pub fn load_settings() -> Result<Settings, ConfigError> {
    ConfigLoader::new().load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::MapEnv;
    use crate::config::settings::CacheType;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a temporary search directory, optionally with `config.toml`
    fn setup_config_dir(contents: Option<&str>) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        if let Some(contents) = contents {
            fs::write(temp_dir.path().join("config.toml"), contents)
                .expect("Failed to write config file");
        }
        temp_dir
    }

    fn loader(dir: &TempDir, env: MapEnv) -> ConfigLoader<MapEnv> {
        ConfigLoader::new()
            .with_file(FileSource::in_dir(dir.path()))
            .with_env(env)
    }

    fn expected_defaults() -> Settings {
        use crate::config::settings::*;

        Settings {
            port: 8080,
            debug: false,
            target_header_name: "X-Target-URL".to_string(),
            cache: CacheSettings {
                enabled: false,
                cache_type: CacheType::Ristretto,
                ristretto: RistrettoSettings {
                    num_counters: 1000,
                    max_cost: 100,
                    buffer_items: 64,
                },
                redis: RedisSettings {
                    host: "http://localhost".to_string(),
                    port: 6379,
                    password: String::new(),
                    db: 0,
                },
            },
            oauth2: OAuth2Settings {
                host: "http://localhost".to_string(),
                port: 8090,
                token_endpoint: "/realms/example/protocol/openid-connect/token".to_string(),
                client_id: "my-client".to_string(),
                client_secret: "my-client-secret".to_string(),
            },
        }
    }

    #[test]
    fn test_defaults_only() {
        let temp_dir = setup_config_dir(None);
        let settings = loader(&temp_dir, MapEnv::new())
            .load()
            .expect("Should load settings");

        assert_eq!(settings, expected_defaults());
    }

    #[test]
    fn test_missing_file_is_reported_not_fatal() {
        let temp_dir = setup_config_dir(None);
        let resolution = loader(&temp_dir, MapEnv::new())
            .resolve()
            .expect("Should resolve");

        assert!(matches!(
            resolution.file.skipped(),
            Some(ConfigError::FileNotFound { .. })
        ));
        assert_eq!(resolution.settings, expected_defaults());
    }

    #[test]
    fn test_file_overrides_default() {
        let temp_dir = setup_config_dir(Some("port = 9999\n"));
        let settings = loader(&temp_dir, MapEnv::new())
            .load()
            .expect("Should load settings");

        let mut expected = expected_defaults();
        expected.port = 9999;
        assert_eq!(settings, expected);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = setup_config_dir(Some("port = 9999\n"));
        let settings = loader(&temp_dir, MapEnv::new().with("PORT", "7000"))
            .load()
            .expect("Should load settings");

        assert_eq!(settings.port, 7000);
    }

    #[test]
    fn test_env_overrides_default_without_file() {
        let temp_dir = setup_config_dir(None);
        let env = MapEnv::new()
            .with("DEBUG", "true")
            .with("CACHE_CACHE_TYPE", "redis")
            .with("CACHE_REDIS_DB", "3");
        let settings = loader(&temp_dir, env).load().expect("Should load settings");

        assert!(settings.debug);
        assert_eq!(settings.cache.cache_type, CacheType::Redis);
        assert_eq!(settings.cache.redis.db, 3);
        assert_eq!(settings.cache.redis.port, 6379);
    }

    #[test]
    fn test_nested_file_sections() {
        let temp_dir = setup_config_dir(Some(
            r#"
target_header_name = "X-Forward-To"

[cache]
enabled = true
cache_type = "redis"

[cache.redis]
host = "redis.internal"
password = "hunter2"

[oauth2]
port = 9443
"#,
        ));
        let settings = loader(&temp_dir, MapEnv::new())
            .load()
            .expect("Should load settings");

        assert_eq!(settings.target_header_name, "X-Forward-To");
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.cache_type, CacheType::Redis);
        assert_eq!(settings.cache.redis.host, "redis.internal");
        assert_eq!(settings.cache.redis.password, "hunter2");
        assert_eq!(settings.cache.redis.port, 6379);
        assert_eq!(settings.oauth2.port, 9443);
        assert_eq!(settings.oauth2.client_id, "my-client");
    }

    #[test]
    fn test_file_keys_are_case_insensitive() {
        let temp_dir = setup_config_dir(Some(
            r#"
PORT = 9999

[Cache]
Enabled = true

[cache.Redis]
HOST = "redis.internal"
"#,
        ));
        let resolution = loader(&temp_dir, MapEnv::new())
            .resolve()
            .expect("Should resolve settings");

        assert_eq!(resolution.settings.port, 9999);
        assert!(resolution.settings.cache.enabled);
        assert_eq!(resolution.settings.cache.redis.host, "redis.internal");
        assert_eq!(resolution.settings.cache.redis.port, 6379);
        assert_eq!(resolution.source_of(&"port".into()), Layer::File);
        assert_eq!(resolution.source_of(&"cache.enabled".into()), Layer::File);
        assert_eq!(resolution.source_of(&"cache.redis.host".into()), Layer::File);
    }

    #[test]
    fn test_full_precedence_chain() {
        let temp_dir = setup_config_dir(Some(
            r#"
port = 9999

[oauth2]
client_id = "file-client"
client_secret = "file-secret"
"#,
        ));
        let env = MapEnv::new()
            .with("PORT", "7000")
            .with("OAUTH2_CLIENT_SECRET", "env-secret");
        let resolution = loader(&temp_dir, env).resolve().expect("Should resolve");
        let settings = &resolution.settings;

        // Environment has highest priority
        assert_eq!(settings.port, 7000);
        assert_eq!(settings.oauth2.client_secret, "env-secret");

        // File overrides default
        assert_eq!(settings.oauth2.client_id, "file-client");

        // Default provides the rest
        assert_eq!(settings.oauth2.host, "http://localhost");

        assert_eq!(resolution.source_of(&"port".into()), Layer::Environment);
        assert_eq!(
            resolution.source_of(&"oauth2.client_secret".into()),
            Layer::Environment
        );
        assert_eq!(resolution.source_of(&"oauth2.client_id".into()), Layer::File);
        assert_eq!(resolution.source_of(&"oauth2.host".into()), Layer::Default);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let temp_dir = setup_config_dir(Some("port = \n[[[not toml"));
        let resolution = loader(&temp_dir, MapEnv::new())
            .resolve()
            .expect("Malformed file should not be fatal");

        assert!(matches!(
            resolution.file.skipped(),
            Some(ConfigError::FileParse { .. })
        ));
        assert_eq!(resolution.settings, expected_defaults());
    }

    #[test]
    fn test_malformed_file_keeps_env_overrides() {
        let temp_dir = setup_config_dir(Some("[cache\nenabled = "));
        let settings = loader(&temp_dir, MapEnv::new().with("CACHE_ENABLED", "1"))
            .load()
            .expect("Should load settings");

        assert!(settings.cache.enabled);
    }

    #[test]
    fn test_non_numeric_port_from_env_is_fatal() {
        let temp_dir = setup_config_dir(None);
        let result = loader(&temp_dir, MapEnv::new().with("PORT", "eighty")).load();

        assert!(matches!(result, Err(ConfigError::Decode(_))));
    }

    #[test]
    fn test_non_numeric_port_from_file_is_fatal() {
        let temp_dir = setup_config_dir(Some("port = \"not-a-port\"\n"));
        let result = loader(&temp_dir, MapEnv::new()).load();

        assert!(matches!(result, Err(ConfigError::Decode(_))));
    }

    #[test]
    fn test_invalid_boolean_is_fatal() {
        let temp_dir = setup_config_dir(None);
        let result = loader(&temp_dir, MapEnv::new().with("DEBUG", "sometimes")).load();

        assert!(matches!(result, Err(ConfigError::Decode(_))));
    }

    #[test]
    fn test_unknown_cache_type_is_fatal() {
        let temp_dir = setup_config_dir(Some("[cache]\ncache_type = \"memcached\"\n"));
        let result = loader(&temp_dir, MapEnv::new()).load();

        assert!(matches!(result, Err(ConfigError::Decode(_))));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let temp_dir = setup_config_dir(Some(
            r#"
listen_backlog = 128

[cache.memcached]
servers = ["a:11211"]
"#,
        ));
        let resolution = loader(&temp_dir, MapEnv::new().with("UNRELATED_SETTING", "x"))
            .resolve()
            .expect("Unknown keys should be ignored");

        assert!(resolution.file.is_loaded());
        assert!(resolution.overrides.is_empty());
        assert_eq!(resolution.settings, expected_defaults());
    }

    #[test]
    fn test_integer_coerced_to_string_field() {
        let temp_dir = setup_config_dir(Some("[cache.redis]\npassword = 1234\n"));
        let settings = loader(&temp_dir, MapEnv::new())
            .load()
            .expect("Should load settings");

        assert_eq!(settings.cache.redis.password, "1234");
    }

    #[test]
    fn test_every_default_is_required() {
        let temp_dir = setup_config_dir(None);
        let standard = DefaultsRegistry::standard();

        for key in standard.keys() {
            let mut defaults = standard.clone();
            defaults.remove(key);

            let result = loader(&temp_dir, MapEnv::new())
                .with_defaults(defaults)
                .load();
            assert!(
                matches!(result, Err(ConfigError::Decode(_))),
                "decoding without a default for '{}' should fail",
                key
            );
        }
    }

    #[test]
    fn test_environment_lists_every_key() {
        let config_loader = ConfigLoader::new();
        let env = config_loader.environment();
        let keys: Vec<_> = env.bindings().iter().map(|b| &b.key).collect();
        let defaults: Vec<_> = config_loader.defaults().keys().collect();
        assert_eq!(keys, defaults);
    }

    #[test]
    fn test_layer_display() {
        assert_eq!(Layer::Default.to_string(), "default");
        assert_eq!(Layer::File.to_string(), "file");
        assert_eq!(Layer::Environment.to_string(), "environment");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Resolving the same inputs twice yields the same settings
        #[test]
        fn prop_resolution_is_deterministic(
            file_port in proptest::option::of(1u16..=65535u16),
            env_port in proptest::option::of(1u16..=65535u16),
            enabled in any::<bool>(),
        ) {
            let contents = match file_port {
                Some(port) => format!("port = {}\n[cache]\nenabled = {}\n", port, enabled),
                None => format!("[cache]\nenabled = {}\n", enabled),
            };
            let temp_dir = setup_config_dir(Some(&contents));
            let mut env = MapEnv::new();
            if let Some(port) = env_port {
                env.set("PORT", port.to_string());
            }

            let config_loader = loader(&temp_dir, env);
            let first = config_loader.load().expect("Should load settings");
            let second = config_loader.load().expect("Should load settings");
            prop_assert_eq!(&first, &second);

            let expected_port = env_port.or(file_port).unwrap_or(8080);
            prop_assert_eq!(first.port, expected_port);
            prop_assert_eq!(first.cache.enabled, enabled);
        }

        /// An environment override wins regardless of what the file holds
        #[test]
        fn prop_env_always_wins(
            file_secret in "[a-z]{1,16}",
            env_secret in "[A-Z]{1,16}",
        ) {
            let contents = format!("[oauth2]\nclient_secret = \"{}\"\n", file_secret);
            let temp_dir = setup_config_dir(Some(&contents));
            let env = MapEnv::new().with("OAUTH2_CLIENT_SECRET", env_secret.clone());

            let settings = loader(&temp_dir, env).load().expect("Should load settings");
            prop_assert_eq!(settings.oauth2.client_secret, env_secret);
        }
    }
}
