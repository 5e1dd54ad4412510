//! Source resolvers
//!
//! One function per pattern source. Each takes the locator half of a search
//! pattern and returns the value or `None`. Only configuration defects and
//! contract violations come back as errors.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::FileContextCache;
use crate::config::EngineConfig;
use crate::env::EnvSource;
use crate::error::Result;
use crate::jsonpath;
use crate::pattern::{split_first, split_last, SearchPattern, Source};
use crate::resource::ResourceLoader;
use crate::sanitize::sanitize;
use crate::schema::SchemaVersion;

/// Everything a resolver may consult for one lookup
pub struct ResolveContext<'a> {
    pub config: &'a EngineConfig,
    pub env: &'a dyn EnvSource,
    pub loader: &'a ResourceLoader,
    pub version: SchemaVersion,
    pub cache: &'a FileContextCache,
}

impl ResolveContext<'_> {
    /// Dispatch one pattern to its resolver
    pub fn resolve(&self, pattern: &SearchPattern<'_>) -> Result<Option<String>> {
        match &pattern.source {
            Source::UserProvided => {
                if self.version == SchemaVersion::V1 {
                    debug!(
                        locator = pattern.locator,
                        "user-provided patterns need mapping schema version 2, skipping"
                    );
                    return Ok(None);
                }
                Ok(self.user_provided(pattern.locator))
            }
            Source::CloudFoundry => Ok(self.cloud_foundry(pattern.locator)),
            Source::Env => self.env_value(pattern.locator),
            Source::File => self.file_value(pattern.locator),
            Source::Unknown(source) => {
                warn!(source = %source, "Unknown protocol in searchPatterns");
                Ok(None)
            }
        }
    }

    fn bindings(&self) -> Option<String> {
        self.env
            .var(&self.config.bindings_var)
            .filter(|blob| !blob.is_empty())
    }

    /// `serviceName:credentialKey` against the `user-provided` array
    fn user_provided(&self, locator: &str) -> Option<String> {
        debug!(locator, "user-provided entry found");
        let Some(blob) = self.bindings() else {
            debug!(var = %self.config.bindings_var, "no platform bindings set");
            return None;
        };
        let Some((service_name, credential_key)) = split_last(locator, ':') else {
            info!(locator, "Invalid user-provided pattern");
            return None;
        };

        let bindings: Value = match serde_json::from_str(&blob) {
            Ok(value) => value,
            Err(e) => {
                info!(error = %e, "Unexpected exception reading platform bindings");
                return None;
            }
        };
        let Some(user_provided) = bindings.get("user-provided").and_then(Value::as_array) else {
            info!("platform bindings user-provided field is not an array");
            return None;
        };

        let service = user_provided
            .iter()
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(service_name))?;
        let credentials = service.get("credentials")?;
        debug!(service_name, "found user-provided credentials");
        query(credentials, credential_key)
    }

    /// `$`-rooted JSONPath straight into the platform bindings blob
    fn cloud_foundry(&self, locator: &str) -> Option<String> {
        if !locator.starts_with('$') {
            return None;
        }
        query_text(&self.bindings()?, locator)
    }

    /// `VAR` or `VAR:$.path`
    fn env_value(&self, locator: &str) -> Result<Option<String>> {
        let value = if locator.contains(':') {
            let (var, path) = split_first(locator, ':');
            debug!(var, path, "env tokens");
            if var.is_empty() || path.is_empty() || !path.starts_with('$') {
                return Ok(None);
            }
            match self.env.var(var) {
                Some(json) => query_text(&json, path),
                None => None,
            }
        } else {
            self.env.var(locator)
        };

        match value {
            Some(v) if !v.is_empty() => sanitize(&v).map(Some),
            _ => Ok(None),
        }
    }

    /// `path:$.query` via the file cache, or `path` for its first line
    fn file_value(&self, locator: &str) -> Result<Option<String>> {
        if locator.contains(':') {
            let (file_path, path) = split_first(locator, ':');
            if file_path.is_empty() || path.is_empty() || !path.starts_with('$') {
                return Ok(None);
            }
            let context = self.cache.get_or_load(file_path, |p| self.load_context(p));
            return Ok(query(&context, path));
        }

        // No location within the file: the value is its first line
        let location = self.version.classify(locator, &self.config.server_prefix);
        debug!(?location, "looking for resource");
        self.loader.read_first_line(&location)
    }

    /// Parse a file's JSON for the cache; any failure yields `None`
    fn load_context(&self, file_path: &str) -> Option<Value> {
        let location = self.version.classify(file_path, &self.config.server_prefix);
        debug!(?location, "loading JSON context");
        let text = match self.loader.read_to_string(&location) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(file_path, "file not found, caching empty context");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "unreadable file, caching empty context");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(file_path, error = %e, "file is not JSON, caching empty context");
                None
            }
        }
    }
}

/// Evaluate a query; unsupported syntax counts as "not found"
fn query(value: &Value, path: &str) -> Option<String> {
    match jsonpath::read_scalar(value, path) {
        Ok(found) => found,
        Err(e) => {
            debug!(error = %e, "query not evaluated");
            None
        }
    }
}

/// Parse JSON text then query it; malformed JSON counts as "not found"
fn query_text(json: &str, path: &str) -> Option<String> {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => query(&value, path),
        Err(e) => {
            debug!(error = %e, "value is not JSON");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;
    use std::fs;
    use tempfile::tempdir;

    const VCAP_SERVICES: &str = r#"{"cloudantNoSQLDB":[{"credentials":{"username":"VCAP_SERVICES-username","port":999,"url":"https://VCAP_SERVICES.cloudant.com"},"label":"cloudantNoSQLDB","name":"VCAP_SERVICES-cloudantno-1234567890"}]}"#;

    const VCAP_SERVICES_USER_PROVIDED: &str = r#"{"user-provided":[{"credentials":{"password":"VCAP_SERVICES-password","username":"VCAP_SERVICES-username"},"label":"user-provided","name":"cloudant-instance-id"}]}"#;

    struct Fixture {
        config: EngineConfig,
        env: StaticEnv,
        loader: ResourceLoader,
        cache: FileContextCache,
        version: SchemaVersion,
    }

    impl Fixture {
        fn new(env: StaticEnv, version: SchemaVersion) -> Self {
            Self {
                config: EngineConfig::default(),
                env,
                loader: ResourceLoader::new("resources"),
                cache: FileContextCache::new(),
                version,
            }
        }

        fn ctx(&self) -> ResolveContext<'_> {
            ResolveContext {
                config: &self.config,
                env: &self.env,
                loader: &self.loader,
                version: self.version,
                cache: &self.cache,
            }
        }

        fn resolve(&self, pattern: &str) -> Option<String> {
            let pattern = SearchPattern::parse(pattern).unwrap();
            self.ctx().resolve(&pattern).unwrap()
        }
    }

    #[test]
    fn user_provided_by_name() {
        let fx = Fixture::new(
            StaticEnv::new().with("VCAP_SERVICES", VCAP_SERVICES_USER_PROVIDED),
            SchemaVersion::V2,
        );
        assert_eq!(
            fx.resolve("platform-binding:cloudant-instance-id:username").as_deref(),
            Some("VCAP_SERVICES-username")
        );
        assert_eq!(
            fx.resolve("user-provided:cloudant-instance-id:$.password").as_deref(),
            Some("VCAP_SERVICES-password")
        );
        assert_eq!(fx.resolve("user-provided:other-instance:username"), None);
        assert_eq!(fx.resolve("user-provided:cloudant-instance-id:"), None);
        assert_eq!(fx.resolve("user-provided:cloudant-instance-id"), None);
    }

    #[test]
    fn user_provided_requires_v2() {
        let fx = Fixture::new(
            StaticEnv::new().with("VCAP_SERVICES", VCAP_SERVICES_USER_PROVIDED),
            SchemaVersion::V1,
        );
        assert_eq!(fx.resolve("user-provided:cloudant-instance-id:username"), None);
    }

    #[test]
    fn user_provided_tolerates_bad_blobs() {
        for blob in ["", "{not json", r#"{"user-provided": {}}"#, r#"{"other": []}"#] {
            let fx = Fixture::new(StaticEnv::new().with("VCAP_SERVICES", blob), SchemaVersion::V2);
            assert_eq!(fx.resolve("user-provided:cloudant-instance-id:username"), None);
        }
    }

    #[test]
    fn cloud_foundry_query() {
        let fx = Fixture::new(StaticEnv::new().with("VCAP_SERVICES", VCAP_SERVICES), SchemaVersion::V1);
        assert_eq!(
            fx.resolve("cloudfoundry:$.cloudantNoSQLDB[0].credentials.username").as_deref(),
            Some("VCAP_SERVICES-username")
        );
        assert_eq!(
            fx.resolve("cloudfoundry:$.cloudantNoSQLDB[0].credentials.port").as_deref(),
            Some("999")
        );
        assert_eq!(fx.resolve("cloudfoundry:$.cloudantNoSQLDB[1].credentials.username"), None);
        assert_eq!(fx.resolve("cloudfoundry:cloudantNoSQLDB[0].credentials.username"), None);
    }

    #[test]
    fn cloud_foundry_without_bindings() {
        let fx = Fixture::new(StaticEnv::new(), SchemaVersion::V1);
        assert_eq!(fx.resolve("cloudfoundry:$.cloudantNoSQLDB[0].credentials.username"), None);
    }

    #[test]
    fn env_plain_and_json() {
        let fx = Fixture::new(
            StaticEnv::new()
                .with("cloudant_username", "'env-username'")
                .with("cloudant_config", r#"{"cloudant_username":"bob"}"#)
                .with("not_json", "plain")
                .with("empty", ""),
            SchemaVersion::V1,
        );
        assert_eq!(fx.resolve("env:cloudant_username").as_deref(), Some("env-username"));
        assert_eq!(
            fx.resolve("env:cloudant_config:$.cloudant_username").as_deref(),
            Some("bob")
        );
        assert_eq!(fx.resolve("env:cloudant_config:cloudant_username"), None);
        assert_eq!(fx.resolve("env:cloudant_config:$.missing"), None);
        assert_eq!(fx.resolve("env:not_json:$.x"), None);
        assert_eq!(fx.resolve("env:empty"), None);
        assert_eq!(fx.resolve("env:unset"), None);
    }

    #[test]
    fn file_json_and_first_line() {
        let temp = tempdir().unwrap();
        let json_file = temp.path().join("creds.json");
        fs::write(&json_file, r#"{"username": "file-json-username", "url": "https://file-url"}"#)
            .unwrap();
        let line_file = temp.path().join("password.txt");
        fs::write(&line_file, "s3cret\nignored\n").unwrap();

        let fx = Fixture::new(StaticEnv::new(), SchemaVersion::V1);
        assert_eq!(
            fx.resolve(&format!("file:{}:$.username", json_file.display())).as_deref(),
            Some("file-json-username")
        );
        assert_eq!(
            fx.resolve(&format!("file:{}:$.url", json_file.display())).as_deref(),
            Some("https://file-url")
        );
        assert_eq!(fx.cache.loads(), 1);
        assert_eq!(
            fx.resolve(&format!("file:{}", line_file.display())).as_deref(),
            Some("s3cret")
        );
    }

    #[test]
    fn unknown_source_is_skipped() {
        let fx = Fixture::new(StaticEnv::new().with("x", "y"), SchemaVersion::V2);
        assert_eq!(fx.resolve("vault:x"), None);
    }
}
