//! Resolver configuration (restoreplan.toml)

use crate::error::CoreError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Default graph cache TTL: one hour
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("valid identifier regex"))
}

/// Catalog connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// PostgreSQL connection string
    /// (e.g. "host=localhost port=5432 dbname=app user=backup password=secret")
    pub connection_string: String,

    /// Use a TLS connection
    #[serde(default)]
    pub tls: bool,
}

/// Main configuration structure
///
/// The schema list and table exclusions are explicit configuration values
/// passed into graph construction, so tests can run against synthetic schema
/// sets without touching ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Database schemas to scan for foreign keys
    pub schemas: Vec<String>,

    /// Canonical `schema.table` names excluded from graph construction
    ///
    /// An edge is dropped when either endpoint is excluded.
    #[serde(default)]
    pub exclude_tables: Vec<String>,

    /// Graph cache time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Catalog connection (used by the CLI)
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            schemas: vec!["public".to_string()],
            exclude_tables: Vec::new(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            catalog: None,
        }
    }
}

impl ResolverConfig {
    /// Create a config for a set of schemas with defaults for everything else
    pub fn for_schemas(schemas: Vec<String>) -> Self {
        Self {
            schemas,
            ..Self::default()
        }
    }

    /// Validate the schema list
    ///
    /// The list must be non-empty and every entry a valid SQL identifier.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.schemas.is_empty() {
            return Err(CoreError::EmptySchemaSet);
        }

        for schema in &self.schemas {
            if !identifier_pattern().is_match(schema) {
                return Err(CoreError::InvalidSchemaName(schema.clone()));
            }
        }

        Ok(())
    }

    /// The schema list in canonical form: sorted and deduplicated
    ///
    /// Cache keys must be derived from this form so that logically identical
    /// schema sets given in different order share one cache entry.
    pub fn canonical_schemas(&self) -> Vec<String> {
        let mut schemas = self.schemas.clone();
        schemas.sort_unstable();
        schemas.dedup();
        schemas
    }

    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, CoreError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| CoreError::IoError(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, CoreError> {
        toml::from_str(toml).map_err(|e| CoreError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), CoreError> {
        let toml =
            toml::to_string_pretty(self).map_err(|e| CoreError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| CoreError::IoError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.schemas, vec!["public".to_string()]);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_schema_set_is_rejected() {
        let config = ResolverConfig::for_schemas(vec![]);
        assert!(matches!(config.validate(), Err(CoreError::EmptySchemaSet)));
    }

    #[test]
    fn invalid_identifier_is_rejected() {
        let config = ResolverConfig::for_schemas(vec!["app; drop table".to_string()]);
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidSchemaName(_))
        ));

        let config = ResolverConfig::for_schemas(vec!["1app".to_string()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn canonical_schemas_sorts_and_dedupes() {
        let config = ResolverConfig::for_schemas(vec![
            "reporting".to_string(),
            "app".to_string(),
            "reporting".to_string(),
        ]);

        assert_eq!(
            config.canonical_schemas(),
            vec!["app".to_string(), "reporting".to_string()]
        );
    }

    #[test]
    fn config_toml_round_trip() {
        let config = ResolverConfig {
            schemas: vec!["app".to_string(), "billing".to_string()],
            exclude_tables: vec!["app.audit_log".to_string()],
            cache_ttl_secs: 600,
            catalog: Some(CatalogConfig {
                connection_string: "host=localhost dbname=app".to_string(),
                tls: false,
            }),
        };

        let toml = toml::to_string(&config).unwrap();
        let parsed = ResolverConfig::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let parsed = ResolverConfig::from_toml("schemas = [\"app\"]").unwrap();
        assert_eq!(parsed.schemas, vec!["app".to_string()]);
        assert!(parsed.exclude_tables.is_empty());
        assert_eq!(parsed.cache_ttl_secs, 3600);
        assert!(parsed.catalog.is_none());
    }
}
