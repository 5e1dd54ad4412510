//! Environment lookups
//!
//! Values are read on demand at each lookup, never snapshotted. The process
//! environment wins; process-local properties fill the gaps.

use std::collections::HashMap;

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Process-local properties consulted after the real environment
static PROPERTIES: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

/// Set a process-local property
pub fn set_property(key: impl Into<String>, value: impl Into<String>) {
    PROPERTIES.insert(key.into(), value.into());
}

/// Remove a process-local property, returning the previous value
pub fn clear_property(key: &str) -> Option<String> {
    PROPERTIES.remove(key).map(|(_, v)| v)
}

/// Read a process-local property
pub fn property(key: &str) -> Option<String> {
    PROPERTIES.get(key).map(|v| v.value().clone())
}

/// Read-only view of named string values
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// OS environment, falling back to process-local properties
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().or_else(|| property(key))
    }
}

/// Fixed set of values, for isolated engines
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
