//! Mapping resolution engine
//!
//! Holds one mapping document (plus the file cache built against it) and
//! answers `resolve(name)` by walking the entry's search patterns in order.
//! The first pattern that yields a value wins.
//!
//! Document and cache are swapped together. Reloading while other threads
//! resolve is allowed, but callers that need a consistent view must finish
//! reloading before resolution starts.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::cache::FileContextCache;
use crate::config::EngineConfig;
use crate::env::{EnvSource, ProcessEnv};
use crate::error::Result;
use crate::mapping::MappingDocument;
use crate::pattern::SearchPattern;
use crate::resolver::ResolveContext;
use crate::resource::ResourceLoader;
use crate::schema::SchemaVersion;

/// A loaded path and everything derived from it
#[derive(Debug)]
struct Loaded {
    path: String,
    /// `None` when the resource did not exist
    document: Option<MappingDocument>,
    cache: FileContextCache,
}

pub struct Engine {
    config: EngineConfig,
    env: Arc<dyn EnvSource>,
    loader: ResourceLoader,
    state: RwLock<Option<Arc<Loaded>>>,
}

impl Engine {
    /// Engine over the process environment, with no document loaded
    pub fn new(config: EngineConfig) -> Self {
        Self::with_env(config, ProcessEnv)
    }

    /// Engine over a custom environment, with no document loaded
    pub fn with_env(config: EngineConfig, env: impl EnvSource + 'static) -> Self {
        Self {
            loader: ResourceLoader::new(config.resource_root.clone()),
            config,
            env: Arc::new(env),
            state: RwLock::new(None),
        }
    }

    /// Engine over the process environment with the configured document loaded
    pub fn open(config: EngineConfig) -> Result<Self> {
        let engine = Self::new(config);
        engine.load_default()?;
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load the document named by [`EngineConfig::mappings_path`]
    pub fn load_default(&self) -> Result<bool> {
        let path = self.config.mappings_path.clone();
        self.load_mapping_document(&path)
    }

    /// Point the engine at a mapping document
    ///
    /// Loading the path that is already active is a no-op. Any other path
    /// discards the current document and file cache and parses afresh.
    /// Returns whether a document is now active. On error the engine is left
    /// with no document.
    pub fn load_mapping_document(&self, path: &str) -> Result<bool> {
        if let Some(current) = self.state.read().as_ref() {
            if current.path == path {
                return Ok(current.document.is_some());
            }
        }

        let document = match MappingDocument::load(&self.loader, path) {
            Ok(document) => document,
            Err(e) => {
                *self.state.write() = None;
                return Err(e);
            }
        };
        let active = document.is_some();
        *self.state.write() = Some(Arc::new(Loaded {
            path: path.to_string(),
            document,
            cache: FileContextCache::new(),
        }));
        Ok(active)
    }

    /// Whether a mapping document is active
    pub fn is_loaded(&self) -> bool {
        self.snapshot()
            .map(|loaded| loaded.document.is_some())
            .unwrap_or(false)
    }

    /// Schema version of the active document
    pub fn schema_version(&self) -> Option<SchemaVersion> {
        self.snapshot()?.document.as_ref().map(MappingDocument::version)
    }

    /// Number of file contexts actually loaded for the active document
    pub fn file_loads(&self) -> usize {
        self.snapshot()
            .map(|loaded| loaded.cache.loads())
            .unwrap_or(0)
    }

    fn snapshot(&self) -> Option<Arc<Loaded>> {
        self.state.read().clone()
    }

    /// Resolve a logical binding name
    ///
    /// `Ok(None)` means no configured source currently has the value.
    #[instrument(skip(self))]
    pub fn resolve(&self, name: &str) -> Result<Option<String>> {
        let Some(loaded) = self.snapshot() else {
            return Ok(None);
        };
        let Some(document) = loaded.document.as_ref() else {
            return Ok(None);
        };
        let Some(patterns) = document.search_patterns(name) else {
            debug!("no search patterns");
            return Ok(None);
        };

        let ctx = ResolveContext {
            config: &self.config,
            env: self.env.as_ref(),
            loader: &self.loader,
            version: document.version(),
            cache: &loaded.cache,
        };

        for entry in patterns {
            debug!(entry, "trying search pattern");
            let Some(pattern) = SearchPattern::parse(entry) else {
                continue;
            };
            if let Some(value) = ctx.resolve(&pattern)? {
                debug!(source = %pattern.source, "resolved");
                return Ok(Some(value));
            }
        }

        debug!("not found in any source");
        Ok(None)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("loaded", &self.snapshot().map(|l| l.path.clone()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn nothing_loaded_resolves_nothing() {
        let engine = Engine::with_env(EngineConfig::default(), StaticEnv::new().with("a", "b"));
        assert!(!engine.is_loaded());
        assert_eq!(engine.resolve("cloudant").unwrap(), None);
    }

    #[test]
    fn same_path_is_not_reparsed() {
        let temp = tempdir().unwrap();
        let mappings = temp.path().join("mappings.json");
        fs::write(&mappings, r#"{"db": {"searchPatterns": ["env:first"]}}"#).unwrap();

        let env = StaticEnv::new().with("first", "1").with("second", "2");
        let engine = Engine::with_env(EngineConfig::testing(temp.path()), env);
        assert!(engine.load_default().unwrap());
        assert_eq!(engine.resolve("db").unwrap().as_deref(), Some("1"));

        fs::write(&mappings, r#"{"db": {"searchPatterns": ["env:second"]}}"#).unwrap();
        assert!(engine.load_mapping_document("/mappings.json").unwrap());
        assert_eq!(engine.resolve("db").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn missing_document_leaves_engine_empty() {
        let temp = tempdir().unwrap();
        let engine = Engine::with_env(EngineConfig::testing(temp.path()), StaticEnv::new());
        assert!(!engine.load_default().unwrap());
        assert!(!engine.is_loaded());
        assert_eq!(engine.schema_version(), None);
    }

    #[test]
    fn malformed_document_is_fatal_and_clears_state() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("mappings.json"), r#"{"db": {}}"#).unwrap();
        fs::write(temp.path().join("broken.json"), r#"{"db": "#).unwrap();

        let engine = Engine::with_env(EngineConfig::testing(temp.path()), StaticEnv::new());
        assert!(engine.load_default().unwrap());
        assert!(engine.load_mapping_document("/broken.json").is_err());
        assert!(!engine.is_loaded());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
