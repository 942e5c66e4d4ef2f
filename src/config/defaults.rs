//! Built-in default values for every known configuration key

use std::collections::BTreeMap;
use std::fmt;

use crate::config::key::ConfigKey;

/// A raw default value, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::String(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::String(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Integer(value)
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Boolean(value)
    }
}

impl From<DefaultValue> for config::Value {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::String(s) => config::Value::from(s),
            DefaultValue::Integer(i) => config::Value::from(i),
            DefaultValue::Boolean(b) => config::Value::from(b),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::String(s) => write!(f, "{:?}", s),
            DefaultValue::Integer(i) => write!(f, "{}", i),
            DefaultValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Registry of default values, keyed by dotted path
///
/// Iteration is in key order, so applying the registry is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultsRegistry {
    values: BTreeMap<ConfigKey, DefaultValue>,
}

impl DefaultsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry holding a default for every field of [`Settings`]
    ///
    /// [`Settings`]: crate::config::Settings
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("port", "8080");
        registry.register("debug", false);
        registry.register("target_header_name", "X-Target-URL");

        registry.register("cache.enabled", false);
        registry.register("cache.cache_type", "ristretto");
        registry.register("cache.ristretto.num_counters", 1000_i64);
        registry.register("cache.ristretto.max_cost", 100_i64);
        registry.register("cache.ristretto.buffer_items", 64_i64);
        registry.register("cache.redis.host", "http://localhost");
        registry.register("cache.redis.port", 6379_i64);
        registry.register("cache.redis.password", "");
        registry.register("cache.redis.db", 0_i64);

        registry.register("oauth2.host", "http://localhost");
        registry.register("oauth2.port", "8090");
        registry.register(
            "oauth2.token_endpoint",
            "/realms/example/protocol/openid-connect/token",
        );
        registry.register("oauth2.client_id", "my-client");
        registry.register("oauth2.client_secret", "my-client-secret");
        registry
    }

    /// Register a default, returning the value it replaced
    pub fn register<K, V>(&mut self, key: K, value: V) -> Option<DefaultValue>
    where
        K: Into<ConfigKey>,
        V: Into<DefaultValue>,
    {
        self.values.insert(key.into(), value.into())
    }

    /// Remove a default, returning it
    pub fn remove(&mut self, key: &ConfigKey) -> Option<DefaultValue> {
        self.values.remove(key)
    }

    /// Default registered for `key`
    pub fn get(&self, key: &ConfigKey) -> Option<&DefaultValue> {
        self.values.get(key)
    }

    /// Whether `key` has a default
    pub fn contains(&self, key: &ConfigKey) -> bool {
        self.values.contains_key(key)
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &ConfigKey> {
        self.values.keys()
    }

    /// Keys with their defaults, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &DefaultValue)> {
        self.values.iter()
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is registered
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
