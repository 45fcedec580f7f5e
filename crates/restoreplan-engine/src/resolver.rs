//! The dependency resolver facade
//!
//! Ties the catalog adapter, the graph builder, and the TTL cache together
//! and exposes the operations the backup/restore orchestrator consumes.

use crate::builder::build_graph;
use crate::cache::{schema_set_key, GraphCache};
use crate::{all_dependencies, assign_groups, detect_cycles, sort_for_extraction, sort_for_restore};
use restoreplan_catalog::{CatalogAdapter, CatalogError};
use restoreplan_core::{CoreError, DependencyGraph, ForeignKeyEdge, ResolverConfig, TableId};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Errors surfaced by resolver operations
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Foreign-key dependency resolver with a cached graph
///
/// The graph is built lazily on first query and memoized per schema set
/// with a TTL; every other operation is a pure function of the cached graph
/// and the caller-supplied table subset. A catalog failure during a build
/// propagates to the caller and nothing partial is cached.
///
/// ```rust,ignore
/// let resolver = DependencyResolver::new(Arc::new(catalog), config)?;
/// let order = resolver.resolve_restore_order(&tables).await?;
/// ```
pub struct DependencyResolver {
    catalog: Arc<dyn CatalogAdapter>,
    config: ResolverConfig,
    cache: GraphCache,
}

impl DependencyResolver {
    /// Create a resolver over a catalog adapter
    ///
    /// Validates the configured schema set up front.
    pub fn new(
        catalog: Arc<dyn CatalogAdapter>,
        config: ResolverConfig,
    ) -> Result<Self, ResolveError> {
        config.validate()?;
        let cache = GraphCache::new(Duration::from_secs(config.cache_ttl_secs));

        Ok(Self {
            catalog,
            config,
            cache,
        })
    }

    /// Get the cached graph, building it from the catalog on a miss
    ///
    /// No build lock is held: concurrent callers racing on a cold cache may
    /// each rebuild, which is safe because builds are idempotent for the
    /// same schema set.
    pub async fn graph(&self) -> Result<Arc<DependencyGraph>, ResolveError> {
        let key = schema_set_key(&self.config.schemas);

        if let Some(graph) = self.cache.get(&key) {
            tracing::debug!(schemas = ?self.config.canonical_schemas(), "dependency graph cache hit");
            return Ok(graph);
        }

        tracing::debug!(
            schemas = ?self.config.canonical_schemas(),
            catalog = self.catalog.name(),
            "dependency graph cache miss; querying catalog"
        );

        let edges = self.catalog.fetch_foreign_keys(&self.config.schemas).await?;
        let graph = build_graph(edges, &self.config);

        tracing::info!(
            tables = graph.table_count(),
            edges = graph.edge_count(),
            "built dependency graph"
        );

        Ok(self.cache.insert(key, graph))
    }

    /// Tables the given table directly depends on
    pub async fn dependencies_of(&self, table: &TableId) -> Result<BTreeSet<TableId>, ResolveError> {
        Ok(self.graph().await?.dependencies_of(table))
    }

    /// Tables that directly depend on the given table
    pub async fn dependents_of(&self, table: &TableId) -> Result<BTreeSet<TableId>, ResolveError> {
        Ok(self.graph().await?.dependents_of(table))
    }

    /// All tables the given table depends on, directly or indirectly
    pub async fn all_dependencies(&self, table: &TableId) -> Result<HashSet<TableId>, ResolveError> {
        Ok(all_dependencies(table, &*self.graph().await?))
    }

    /// Safe restore order for a subset of tables: parents before children
    ///
    /// A cyclic subset degrades to a best-effort order (cyclic remainder
    /// appended in input order) rather than an error; use
    /// [`DependencyResolver::detect_circular_dependencies`] to find out
    /// whether that happened.
    pub async fn resolve_restore_order(
        &self,
        tables: &[TableId],
    ) -> Result<Vec<TableId>, ResolveError> {
        Ok(sort_for_restore(tables, &*self.graph().await?))
    }

    /// Extraction order: children before parents
    pub async fn resolve_extraction_order(
        &self,
        tables: &[TableId],
    ) -> Result<Vec<TableId>, ResolveError> {
        Ok(sort_for_extraction(tables, &*self.graph().await?))
    }

    /// Circular dependencies confined to the given subset
    pub async fn detect_circular_dependencies(
        &self,
        tables: &[TableId],
    ) -> Result<HashSet<Vec<TableId>>, ResolveError> {
        Ok(detect_cycles(tables, &*self.graph().await?))
    }

    /// Parallel restore plan: groups of tables safe to process concurrently
    ///
    /// Groups must be consumed strictly in index order by the caller; the
    /// resolver never dispatches anything itself.
    pub async fn parallel_groups(
        &self,
        tables: &[TableId],
    ) -> Result<Vec<Vec<TableId>>, ResolveError> {
        Ok(assign_groups(tables, &*self.graph().await?))
    }

    /// Raw foreign-key constraints originating from a table
    pub async fn foreign_keys_of(
        &self,
        table: &TableId,
    ) -> Result<Vec<ForeignKeyEdge>, ResolveError> {
        Ok(self.graph().await?.foreign_keys_of(table))
    }

    /// Drop all cached graphs
    ///
    /// Call after schema migrations so the next query rebuilds from the
    /// catalog.
    pub fn clear_cache(&self) {
        tracing::debug!("clearing dependency graph cache");
        self.cache.clear();
    }

    /// The resolver's configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}
