//! Property-source adapter for host configuration layers
//!
//! A host that overlays several configuration sources asks each one for a
//! property by name. [`MappingsPropertySource`] answers from an [`Engine`]
//! and never fails the caller: a broken mapping document disables the
//! source with a warning, and fatal resolution errors are logged loudly and
//! reported as "no value".

use std::sync::Arc;

use tracing::{error, warn};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::FixSuggestion;

/// One named layer in a host's configuration overlay
pub trait PropertySource: Send + Sync {
    fn name(&self) -> &str;

    fn get_property(&self, name: &str) -> Option<String>;
}

pub struct MappingsPropertySource {
    name: String,
    /// `None` when the mapping document could not be read
    engine: Option<Arc<Engine>>,
}

impl MappingsPropertySource {
    /// Build an engine from `config` and load its mapping document
    pub fn new(name: impl Into<String>, config: EngineConfig) -> Self {
        let name = name.into();
        let engine = match Engine::open(config) {
            Ok(engine) => Some(Arc::new(engine)),
            Err(e) => {
                warn!(source_name = %name, error = %e, "Error reading mappings file");
                None
            }
        };
        Self { name, engine }
    }

    /// Wrap an engine the caller already configured
    pub fn from_engine(name: impl Into<String>, engine: Arc<Engine>) -> Self {
        Self {
            name: name.into(),
            engine: Some(engine),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }
}

impl PropertySource for MappingsPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, name: &str) -> Option<String> {
        let engine = self.engine.as_ref()?;
        match engine.resolve(name) {
            Ok(value) => value,
            Err(e) => {
                error!(
                    source_name = %self.name,
                    property = name,
                    error = %e,
                    fix = e.fix_suggestion().unwrap_or_default(),
                    "Failed to resolve property"
                );
                None
            }
        }
    }
}

/// Direct value lookups for application code
pub struct ServiceMappings {
    source: Arc<dyn PropertySource>,
}

impl ServiceMappings {
    pub fn new(source: Arc<dyn PropertySource>) -> Self {
        Self { source }
    }

    /// Facade over the standard `CloudServices` property source
    pub fn from_config(config: EngineConfig) -> Self {
        Self::new(Arc::new(MappingsPropertySource::new("CloudServices", config)))
    }

    pub fn get_value(&self, name: &str) -> Option<String> {
        self.source.get_property(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn broken_mappings_disable_the_source() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("mappings.json"), "{").unwrap();

        let source = MappingsPropertySource::new("CloudServices", EngineConfig::testing(temp.path()));
        assert!(!source.is_enabled());
        assert_eq!(source.name(), "CloudServices");
        assert_eq!(source.get_property("cloudant.username"), None);
    }

    #[test]
    fn fatal_resolution_errors_become_none() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("mappings.json"),
            r#"{"db": {"searchPatterns": ["file:/server/"]}}"#,
        )
        .unwrap();
        // "/server/" maps to the resource root itself, which is a directory
        let engine = Engine::with_env(EngineConfig::testing(temp.path()), StaticEnv::new());
        engine.load_default().unwrap();
        assert!(engine.resolve("db").is_err());

        let source = MappingsPropertySource::from_engine("CloudServices", Arc::new(engine));
        assert_eq!(source.get_property("db"), None);
    }

    #[test]
    fn service_mappings_delegate() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("mappings.json"),
            r#"{"db": {"searchPatterns": ["env:db_url"]}}"#,
        )
        .unwrap();
        let engine = Engine::with_env(
            EngineConfig::testing(temp.path()),
            StaticEnv::new().with("db_url", "\"postgres://db\""),
        );
        engine.load_default().unwrap();

        let mappings = ServiceMappings::new(Arc::new(MappingsPropertySource::from_engine(
            "CloudServices",
            Arc::new(engine),
        )));
        assert_eq!(mappings.get_value("db").as_deref(), Some("postgres://db"));
        assert_eq!(mappings.get_value("other"), None);
    }
}
