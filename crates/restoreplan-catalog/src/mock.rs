//! Mock catalog adapter for testing
//!
//! This adapter serves a predefined foreign-key edge list without connecting
//! to any database. It's useful for:
//! - Unit testing the dependency resolver
//! - Integration testing CI/CD pipelines
//! - Simulating catalog failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use restoreplan_catalog::{CatalogAdapter, MockCatalogBuilder};
//! use restoreplan_core::{ForeignKeyEdge, TableId};
//!
//! let catalog = MockCatalogBuilder::new()
//!     .with_foreign_key("app.orders", "app.customers", "customer_id", "id")
//!     .build()?;
//!
//! let edges = catalog.fetch_foreign_keys(&["app".to_string()]).await?;
//! ```

use crate::adapter::{CatalogAdapter, CatalogError};
use restoreplan_core::{CoreError, ForeignKeyEdge, TableId};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock catalog adapter for testing
///
/// Stores foreign-key edges in memory and returns the subset whose both
/// endpoints fall within the requested schema set, matching the contract of
/// a real catalog query.
pub struct MockCatalog {
    /// Predefined foreign-key edges
    edges: Arc<RwLock<Vec<ForeignKeyEdge>>>,

    /// Error returned by every fetch, if configured
    query_error: Option<CatalogError>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,
}

impl MockCatalog {
    /// Create a new mock catalog with no edges
    pub fn new() -> Self {
        Self {
            edges: Arc::new(RwLock::new(Vec::new())),
            query_error: None,
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Add a foreign-key edge
    pub async fn add_edge(&self, edge: ForeignKeyEdge) {
        self.edges.write().await.push(edge);
    }

    /// Configure every fetch to fail with the given error
    pub fn with_query_error(mut self, error: CatalogError) -> Self {
        self.query_error = Some(error);
        self
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Number of stored edges (unfiltered)
    pub async fn edge_count(&self) -> usize {
        self.edges.read().await.len()
    }

    /// Remove all stored edges
    pub async fn clear_edges(&self) {
        self.edges.write().await.clear();
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockCatalog {
    fn clone(&self) -> Self {
        Self {
            edges: Arc::clone(&self.edges),
            query_error: self.query_error.clone(),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
        }
    }
}

#[async_trait::async_trait]
impl CatalogAdapter for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn fetch_foreign_keys(
        &self,
        schemas: &[String],
    ) -> Result<Vec<ForeignKeyEdge>, CatalogError> {
        self.simulate_latency().await;

        if let Some(error) = &self.query_error {
            return Err(error.clone());
        }

        let edges = self.edges.read().await;
        Ok(edges
            .iter()
            .filter(|e| {
                schemas.contains(&e.from_table.schema) && schemas.contains(&e.to_table.schema)
            })
            .cloned()
            .collect())
    }

    async fn test_connection(&self) -> Result<(), CatalogError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(CatalogError::NetworkError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Builder for creating a MockCatalog with a predefined edge list
///
/// # Example
///
/// ```rust,ignore
/// let catalog = MockCatalogBuilder::new()
///     .with_foreign_key("app.order_items", "app.orders", "order_id", "id")
///     .with_foreign_key("app.orders", "app.customers", "customer_id", "id")
///     .with_latency(50)
///     .build()?;
/// ```
pub struct MockCatalogBuilder {
    edges: Vec<ForeignKeyEdge>,
    parse_error: Option<CoreError>,
    query_error: Option<CatalogError>,
    fail_connection: bool,
    latency_ms: u64,
}

impl MockCatalogBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            parse_error: None,
            query_error: None,
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Add a foreign-key edge from typed endpoints
    pub fn with_edge(mut self, edge: ForeignKeyEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Add a foreign-key edge from canonical `schema.table` names
    ///
    /// Malformed names surface as an error from [`MockCatalogBuilder::build`].
    pub fn with_foreign_key(
        mut self,
        from_table: &str,
        to_table: &str,
        from_column: &str,
        to_column: &str,
    ) -> Self {
        match (TableId::parse(from_table), TableId::parse(to_table)) {
            (Ok(from), Ok(to)) => {
                self.edges
                    .push(ForeignKeyEdge::new(from, to, from_column, to_column));
            }
            (Err(e), _) | (_, Err(e)) => {
                self.parse_error.get_or_insert(e);
            }
        }
        self
    }

    /// Configure every fetch to fail with the given error
    pub fn with_query_error(mut self, error: CatalogError) -> Self {
        self.query_error = Some(error);
        self
    }

    /// Configure connection failure
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Build the MockCatalog
    pub fn build(self) -> Result<MockCatalog, CoreError> {
        if let Some(error) = self.parse_error {
            return Err(error);
        }

        Ok(MockCatalog {
            edges: Arc::new(RwLock::new(self.edges)),
            query_error: self.query_error,
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
        })
    }
}

impl Default for MockCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemas(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn fetch_returns_edges_within_schema_set() {
        let catalog = MockCatalogBuilder::new()
            .with_foreign_key("app.orders", "app.customers", "customer_id", "id")
            .with_foreign_key("billing.invoices", "app.customers", "customer_id", "id")
            .build()
            .unwrap();

        let edges = catalog.fetch_foreign_keys(&schemas(&["app"])).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from_table.qualified(), "app.orders");

        let edges = catalog
            .fetch_foreign_keys(&schemas(&["app", "billing"]))
            .await
            .unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[tokio::test]
    async fn cross_schema_edge_requires_both_endpoints() {
        let catalog = MockCatalogBuilder::new()
            .with_foreign_key("billing.invoices", "app.customers", "customer_id", "id")
            .build()
            .unwrap();

        assert!(catalog
            .fetch_foreign_keys(&schemas(&["billing"]))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn builder_surfaces_malformed_table_names() {
        let result = MockCatalogBuilder::new()
            .with_foreign_key("orders", "app.customers", "customer_id", "id")
            .build();

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn query_error_injection() {
        let catalog = MockCatalog::new()
            .with_query_error(CatalogError::QueryError("catalog offline".to_string()));

        let result = catalog.fetch_foreign_keys(&schemas(&["app"])).await;
        assert!(matches!(result, Err(CatalogError::QueryError(_))));
    }

    #[tokio::test]
    async fn connection_failure_injection() {
        let catalog = MockCatalog::new().with_connection_failure();
        assert!(matches!(
            catalog.test_connection().await,
            Err(CatalogError::NetworkError(_))
        ));

        let catalog = MockCatalog::new();
        assert!(catalog.test_connection().await.is_ok());
    }

    #[tokio::test]
    async fn add_edge_after_construction() {
        let catalog = MockCatalog::new();
        assert_eq!(catalog.edge_count().await, 0);

        catalog
            .add_edge(ForeignKeyEdge::new(
                TableId::new("app", "orders"),
                TableId::new("app", "customers"),
                "customer_id",
                "id",
            ))
            .await;

        assert_eq!(catalog.edge_count().await, 1);

        catalog.clear_edges().await;
        assert_eq!(catalog.edge_count().await, 0);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let catalog = MockCatalog::new();
        let cloned = catalog.clone();

        catalog
            .add_edge(ForeignKeyEdge::new(
                TableId::new("app", "orders"),
                TableId::new("app", "customers"),
                "customer_id",
                "id",
            ))
            .await;

        assert_eq!(cloned.edge_count().await, 1);
    }
}
