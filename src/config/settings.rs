//! Typed configuration structures consumed by the proxy at startup
//!
//! None of these fields carry a serde default: every value is supplied by
//! the [`DefaultsRegistry`](crate::config::DefaultsRegistry) or a higher
//! layer, so a missing registration is reported as a decode error instead
//! of decoding to a zero value.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Cache Configuration
// ============================================================================

/// Cache backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// In-process counting cache
    Ristretto,
    /// Remote Redis backend
    Redis,
}

impl CacheType {
    /// Convert the cache type to a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::Ristretto => "ristretto",
            CacheType::Redis => "redis",
        }
    }
}

impl FromStr for CacheType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ristretto" => Ok(CacheType::Ristretto),
            "redis" => Ok(CacheType::Redis),
            _ => Err(format!(
                "Invalid cache type '{}'. Valid values are: ristretto, redis",
                s
            )),
        }
    }
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tuning for the in-process counting cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RistrettoSettings {
    /// Number of keys tracked for admission frequency
    pub num_counters: i64,

    /// Maximum total cost held by the cache
    pub max_cost: i64,

    /// Keys per get buffer
    pub buffer_items: i64,
}

/// Redis cache backend connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: String,
    /// Database index
    pub db: u32,
}

impl RedisSettings {
    /// Get the backend address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Whether caching is enabled
    pub enabled: bool,

    /// Which backend serves the cache
    pub cache_type: CacheType,

    pub ristretto: RistrettoSettings,

    pub redis: RedisSettings,
}

// ============================================================================
// OAuth2 Configuration
// ============================================================================

/// Token-issuing service used to authenticate forwarded requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Settings {
    /// Scheme and host of the token service
    pub host: String,

    pub port: u16,

    /// Path of the token endpoint, starting with `/`
    pub token_endpoint: String,

    pub client_id: String,

    pub client_secret: String,
}

impl OAuth2Settings {
    /// Full URL of the token endpoint
    pub fn token_url(&self) -> String {
        format!("{}:{}{}", self.host, self.port, self.token_endpoint)
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete resolved settings
///
/// Built once by [`ConfigLoader`](crate::config::ConfigLoader) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Port the proxy listens on
    pub port: u16,

    /// Enables debug diagnostics
    pub debug: bool,

    /// Request header carrying the forwarding target
    pub target_header_name: String,

    pub cache: CacheSettings,

    pub oauth2: OAuth2Settings,
}
