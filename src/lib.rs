//! cloud-bindings - layered credential resolution for cloud deployments
//!
//! A mapping document lists, per logical binding name, an ordered set of
//! `source:locator` search patterns. [`Engine::resolve`] tries them in order
//! against platform-injected bindings, the environment and files, and
//! returns the first value found.

pub mod cache;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod global;
pub mod jsonpath;
pub mod mapping;
pub mod pattern;
pub mod property_source;
pub mod resolver;
pub mod resource;
pub mod sanitize;
pub mod schema;

pub use config::EngineConfig;
pub use engine::Engine;
pub use env::{clear_property, property, set_property, EnvSource, ProcessEnv, StaticEnv};
pub use error::{BindingError, FixSuggestion, Result};
pub use global::{default_engine, load_mapping_document, resolve};
pub use mapping::MappingDocument;
pub use property_source::{MappingsPropertySource, PropertySource, ServiceMappings};
pub use schema::SchemaVersion;
