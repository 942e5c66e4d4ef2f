//! Environment variable overrides
//!
//! Every known key has exactly one binding to an environment variable,
//! computed by [`ConfigKey::env_var_name`]. The bindings are built up front
//! so the whole override surface can be listed and tested.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::config::key::ConfigKey;

// ============================================================================
// EnvSource trait
// ============================================================================

/// Abstraction over where environment variables come from
///
/// This allows testing without modifying the actual environment.
pub trait EnvSource {
    /// Iterate over all variables with Unicode names and values
    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_>;
}

/// Environment source that reads from the actual process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_> {
        // `std::env::vars` panics on non-Unicode entries; skip them instead
        Box::new(std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        }))
    }
}

/// Environment source backed by a map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, builder style
    pub fn with<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.set(name, value);
        self
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.vars.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_> {
        Box::new(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}

// ============================================================================
// Bindings
// ============================================================================

/// Mapping of one configuration key to its environment variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    pub key: ConfigKey,
    /// Canonical (upper-case) variable name
    pub var: String,
}

/// A value taken from the environment for a known key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    pub key: ConfigKey,
    /// Variable name as it appeared in the environment
    pub var: String,
    pub value: String,
}

/// Overlays environment variables onto the known keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSource {
    bindings: Vec<EnvBinding>,
    by_var: BTreeMap<String, usize>,
}

impl EnvironmentSource {
    /// Bind every given key to its environment variable
    pub fn for_keys<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a ConfigKey>,
    {
        let mut bindings: Vec<EnvBinding> = keys
            .into_iter()
            .map(|key| EnvBinding {
                var: key.env_var_name(),
                key: key.clone(),
            })
            .collect();
        bindings.sort_by(|a, b| a.key.cmp(&b.key));
        bindings.dedup_by(|a, b| a.key == b.key);

        let by_var = bindings
            .iter()
            .enumerate()
            .map(|(index, binding)| (binding.var.clone(), index))
            .collect();

        Self { bindings, by_var }
    }

    /// Every binding, in key order
    pub fn bindings(&self) -> &[EnvBinding] {
        &self.bindings
    }

    /// Binding for a variable name, matched case-insensitively
    pub fn binding_for_var(&self, name: &str) -> Option<&EnvBinding> {
        self.by_var
            .get(&name.to_ascii_uppercase())
            .map(|&index| &self.bindings[index])
    }

    /// Collect the overrides present in `env`, in key order
    ///
    /// Empty values are treated as unset. When several variables differ
    /// only in case, the canonical upper-case name wins, otherwise the
    /// lexicographically smallest name.
    pub fn overrides(&self, env: &dyn EnvSource) -> Vec<EnvOverride> {
        let mut chosen: BTreeMap<&ConfigKey, (String, String)> = BTreeMap::new();

        for (name, value) in env.vars() {
            if value.is_empty() {
                continue;
            }
            let Some(binding) = self.binding_for_var(&name) else {
                continue;
            };

            match chosen.entry(&binding.key) {
                Entry::Vacant(slot) => {
                    slot.insert((name, value));
                }
                Entry::Occupied(mut slot) => {
                    let current = &slot.get().0;
                    let replace = *current != binding.var
                        && (name == binding.var || name < *current);
                    if replace {
                        slot.insert((name, value));
                    }
                }
            }
        }

        chosen
            .into_iter()
            .map(|(key, (var, value))| EnvOverride {
                key: key.clone(),
                var,
                value,
            })
            .collect()
    }
}
