//! Parsed file content cache (DashMap)
//!
//! One parsed JSON context per file locator, computed on first use and kept
//! for the life of the loaded mapping document. Failed loads are cached as
//! `{}` so a bad reference never retries I/O.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct FileContextCache {
    /// file locator → parsed JSON
    contexts: DashMap<String, Arc<Value>>,
    /// Number of times a loader actually ran
    loads: AtomicUsize,
}

impl FileContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the context for `file_path`, running `load` on first access
    ///
    /// Uses the entry API so concurrent callers for the same key wait on the
    /// shard lock instead of loading twice. `load` returning `None` caches
    /// an empty object.
    pub fn get_or_load<F>(&self, file_path: &str, load: F) -> Arc<Value>
    where
        F: FnOnce(&str) -> Option<Value>,
    {
        if let Some(cached) = self.contexts.get(file_path) {
            return Arc::clone(&cached);
        }

        let entry = self.contexts.entry(file_path.to_string()).or_insert_with(|| {
            self.loads.fetch_add(1, Ordering::Relaxed);
            Arc::new(load(file_path).unwrap_or_else(empty_object))
        });
        Arc::clone(&entry)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// How many loads ran (cache misses)
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
