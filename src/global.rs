//! Process-wide default engine
//!
//! Hosts that cannot thread an [`Engine`] through their own wiring use these
//! functions. The engine is built from [`EngineConfig::from_env`] on first
//! use and loads its configured mapping document at that point.

use once_cell::sync::Lazy;
use tracing::error;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::Result;

static DEFAULT_ENGINE: Lazy<Engine> = Lazy::new(|| {
    let engine = Engine::new(EngineConfig::from_env());
    if let Err(e) = engine.load_default() {
        error!(error = %e, "Error reading mappings file");
    }
    engine
});

/// The shared engine
pub fn default_engine() -> &'static Engine {
    &DEFAULT_ENGINE
}

/// Resolve through the shared engine
pub fn resolve(name: &str) -> Result<Option<String>> {
    DEFAULT_ENGINE.resolve(name)
}

/// Point the shared engine at another mapping document
///
/// Must complete before other threads start resolving.
pub fn load_mapping_document(path: &str) -> Result<bool> {
    DEFAULT_ENGINE.load_mapping_document(path)
}
