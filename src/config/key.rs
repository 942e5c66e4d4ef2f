//! Dot-delimited configuration key paths

use std::fmt;

/// Separator between the segments of a key path
pub const KEY_SEPARATOR: char = '.';

/// A dot-delimited path identifying one setting, e.g. `cache.redis.port`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Create a key from its dotted path
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self(path.into())
    }

    /// The dotted path
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the path segments, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }

    /// Name of the environment variable that overrides this key
    ///
    /// The path is folded into a single upper-case token:
    /// `cache.redis.port` becomes `CACHE_REDIS_PORT`.
    pub fn env_var_name(&self) -> String {
        self.segments()
            .map(str::to_ascii_uppercase)
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl From<&str> for ConfigKey {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ConfigKey {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
