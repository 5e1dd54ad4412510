//! Error types with fix suggestions
//!
//! Absence is not an error: resolvers return `Ok(None)` when a source simply
//! does not hold a value. The variants below are configuration defects and
//! contract violations only.

use std::path::PathBuf;

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T> = std::result::Result<T, BindingError>;

#[derive(Error, Debug)]
pub enum BindingError {
    // ─────────────────────────────────────────────────────────────
    // Configuration defects (BIND-010 to BIND-011)
    // ─────────────────────────────────────────────────────────────

    #[error("BIND-010: Mapping resource '{path}' is not valid JSON: {source}")]
    MappingParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("BIND-011: Failed to read '{}': {source}", .path.display())]
    ResourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Contract violations (BIND-020)
    // ─────────────────────────────────────────────────────────────

    #[error("BIND-020: Invalid string [{value}]")]
    InvalidString { value: String },

    // ─────────────────────────────────────────────────────────────
    // Structured queries (BIND-030)
    // ─────────────────────────────────────────────────────────────

    #[error("BIND-030: JSONPath '{path}' is not supported (use $.a.b, $.a[0].b or $['a-b'])")]
    JsonPathUnsupported { path: String },
}

impl BindingError {
    /// True for errors that indicate a broken deployment artifact
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            BindingError::MappingParse { .. } | BindingError::ResourceRead { .. }
        )
    }
}

impl FixSuggestion for BindingError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BindingError::MappingParse { .. } => {
                Some("Check the mapping document syntax (try parsing it with jq)")
            }
            BindingError::ResourceRead { .. } => Some("Check file path and permissions"),
            BindingError::InvalidString { .. } => {
                Some("Only non-empty values may be sanitized; check the calling resolver")
            }
            BindingError::JsonPathUnsupported { .. } => {
                Some("Use simple paths like $.field.subfield or $.array[0].field")
            }
        }
    }
}
