//! Mapping document
//!
//! Parsed once per path, immutable afterwards. The schema version is read at
//! load time and fixed for the life of the document.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::resource::ResourceLoader;
use crate::schema::SchemaVersion;

#[derive(Debug, Clone)]
pub struct MappingDocument {
    path: String,
    version: SchemaVersion,
    root: Value,
}

impl MappingDocument {
    /// Wrap an already parsed document
    pub fn from_value(path: impl Into<String>, root: Value) -> Self {
        Self {
            path: path.into(),
            version: SchemaVersion::of_document(&root),
            root,
        }
    }

    /// Load a mapping document from packaged resources
    ///
    /// A missing resource is `Ok(None)`; a resource that exists but cannot
    /// be read or parsed is an error.
    pub fn load(loader: &ResourceLoader, path: &str) -> Result<Option<Self>> {
        debug!(path, "loading mapping document");
        match loader.read_json(path)? {
            Some(root) => {
                let document = Self::from_value(path, root);
                debug!(path, version = ?document.version, "mapping document loaded");
                Ok(Some(document))
            }
            None => {
                warn!(
                    path,
                    root = %loader.root().display(),
                    "Mapping resolution failed: no configuration was found"
                );
                Ok(None)
            }
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Binding entry for `name`, descending into `credentials` when present
    pub fn entry(&self, name: &str) -> Option<&Value> {
        let entry = self.version.entry(&self.root, name)?;
        match entry.get("credentials") {
            Some(credentials) if credentials.is_object() => Some(credentials),
            _ => Some(entry),
        }
    }

    /// Ordered search patterns for `name`
    ///
    /// `None` when the name has no entry, or its `searchPatterns` is missing
    /// or not an array (logged). Non-string elements are dropped.
    pub fn search_patterns(&self, name: &str) -> Option<Vec<&str>> {
        let entry = self.entry(name)?;
        let Some(patterns) = entry.get("searchPatterns").and_then(Value::as_array) else {
            warn!(
                name,
                "searchPatterns in mapping document is not an array, value will not be resolved"
            );
            return None;
        };
        Some(patterns.iter().filter_map(Value::as_str).collect())
    }
}
