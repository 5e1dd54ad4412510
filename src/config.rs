//! Engine configuration
//!
//! Defaults match a standard deployment: mapping document at
//! `/mappings.json` inside the packaged resource directory, platform
//! bindings injected through `VCAP_SERVICES`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{BindingError, Result};

/// Env var overriding [`EngineConfig::mappings_path`]
pub const MAPPINGS_PATH_VAR: &str = "CLOUD_BINDINGS_MAPPINGS";
/// Env var overriding [`EngineConfig::resource_root`]
pub const RESOURCE_ROOT_VAR: &str = "CLOUD_BINDINGS_RESOURCE_ROOT";
/// Env var overriding [`EngineConfig::bindings_var`]
pub const BINDINGS_VAR_VAR: &str = "CLOUD_BINDINGS_VAR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mapping document, as a packaged resource path
    pub mappings_path: String,

    /// Directory that packaged resource paths are relative to
    pub resource_root: PathBuf,

    /// Env var holding the platform bindings JSON
    pub bindings_var: String,

    /// Prefix marking a packaged resource under schema version 1
    pub server_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mappings_path: "/mappings.json".to_string(),
            resource_root: PathBuf::from("resources"),
            bindings_var: "VCAP_SERVICES".to_string(),
            server_prefix: "/server/".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults with overrides from `CLOUD_BINDINGS_*` env vars
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(MAPPINGS_PATH_VAR) {
            config.mappings_path = path;
        }
        if let Ok(root) = std::env::var(RESOURCE_ROOT_VAR) {
            config.resource_root = PathBuf::from(root);
        }
        if let Ok(var) = std::env::var(BINDINGS_VAR_VAR) {
            config.bindings_var = var;
        }
        config
    }

    /// Defaults rooted at a scratch resource directory
    pub fn testing(resource_root: impl Into<PathBuf>) -> Self {
        Self {
            resource_root: resource_root.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| BindingError::MappingParse {
            path: "<engine config>".to_string(),
            source,
        })
    }

    pub fn with_mappings_path(mut self, path: impl Into<String>) -> Self {
        self.mappings_path = path.into();
        self
    }

    pub fn with_bindings_var(mut self, var: impl Into<String>) -> Self {
        self.bindings_var = var.into();
        self
    }
}
