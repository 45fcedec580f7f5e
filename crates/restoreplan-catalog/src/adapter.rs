//! Catalog adapter trait for foreign-key discovery

use restoreplan_core::ForeignKeyEdge;

/// Errors that can occur when querying a database catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid catalog row: {0}")]
    InvalidRow(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for catalog adapters that can enumerate foreign-key constraints
///
/// Implementations query the database's INFORMATION_SCHEMA (or equivalent)
/// and return strongly typed edges, validated at this boundary. No ordering
/// of the returned edges is guaranteed.
#[async_trait::async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Get the adapter name (e.g., "PostgreSQL")
    fn name(&self) -> &'static str;

    /// Fetch all foreign-key constraints whose both endpoints lie within the
    /// given schema set.
    async fn fetch_foreign_keys(
        &self,
        schemas: &[String],
    ) -> Result<Vec<ForeignKeyEdge>, CatalogError>;

    /// Test the connection to the database
    ///
    /// This is useful for validating credentials before attempting a graph
    /// build.
    async fn test_connection(&self) -> Result<(), CatalogError>;
}
