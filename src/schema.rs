//! Mapping document schema versions
//!
//! The two versions differ in exactly two places: how a lookup name selects
//! its entry, and how a file locator is classified as a packaged resource or
//! a raw filesystem path.

use serde_json::Value;

use crate::pattern::split_first;
use crate::resource::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    /// Flat keys; `/server/`-prefixed files are packaged resources
    #[default]
    V1,
    /// `namespace.leaf` keys; relative files are packaged resources
    V2,
}

impl SchemaVersion {
    /// Read the `version` field; missing or non-integer means version 1
    pub fn of_document(document: &Value) -> Self {
        match document.get("version").and_then(Value::as_i64) {
            Some(v) if v > 1 => SchemaVersion::V2,
            _ => SchemaVersion::V1,
        }
    }

    /// Select the binding entry for `name`
    pub fn entry<'a>(&self, document: &'a Value, name: &str) -> Option<&'a Value> {
        let entry = match self {
            SchemaVersion::V1 => document.get(name)?,
            SchemaVersion::V2 => {
                let (namespace, leaf) = split_first(name, '.');
                if namespace.is_empty() || leaf.is_empty() {
                    return None;
                }
                non_null(document.get(namespace)?)?.get(leaf)?
            }
        };
        non_null(entry)
    }

    /// Classify a file locator
    pub fn classify(&self, target: &str, server_prefix: &str) -> Location {
        match self {
            SchemaVersion::V1 => match target.strip_prefix(server_prefix) {
                Some(resource) => Location::Resource(resource.to_string()),
                None => Location::File(target.into()),
            },
            SchemaVersion::V2 => {
                if target.starts_with('/') {
                    Location::File(target.into())
                } else {
                    Location::Resource(target.to_string())
                }
            }
        }
    }
}

fn non_null(value: &Value) -> Option<&Value> {
    (!value.is_null()).then_some(value)
}
