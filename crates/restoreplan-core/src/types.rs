//! Table identifiers, foreign-key edges, and the dependency graph
//!
//! The graph is represented as two explicit adjacency mappings over a closed
//! set of identifiers rather than a reference graph, with set semantics
//! enforced by the container type. Duplicate catalog rows therefore cannot
//! produce duplicate edges.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Identifies a table as a (schema, table) pair
///
/// The canonical string form is `schema.table`. Both segments must be
/// non-empty; malformed input is rejected at parse time, never coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId {
    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableId {
    /// Create a new table identifier
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parse a canonical `schema.table` string
    ///
    /// Fails with [`CoreError::InvalidTableId`] unless the input has exactly
    /// two non-empty dot-separated segments.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let mut segments = input.split('.');

        match (segments.next(), segments.next(), segments.next()) {
            (Some(schema), Some(table), None) if !schema.is_empty() && !table.is_empty() => {
                Ok(Self::new(schema, table))
            }
            _ => Err(CoreError::InvalidTableId(input.to_string())),
        }
    }

    /// Get the canonical fully-qualified name
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

impl FromStr for TableId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A foreign-key constraint between two tables
///
/// `from_table.from_column` references `to_table.to_column`, i.e. rows of
/// `from_table` depend on rows of `to_table` existing first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyEdge {
    /// The referencing table
    pub from_table: TableId,

    /// The referenced table
    pub to_table: TableId,

    /// The referencing column
    pub from_column: String,

    /// The referenced column
    pub to_column: String,
}

impl ForeignKeyEdge {
    /// Create a new foreign-key edge
    pub fn new(
        from_table: TableId,
        to_table: TableId,
        from_column: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            from_table,
            to_table,
            from_column: from_column.into(),
            to_column: to_column.into(),
        }
    }

    /// A foreign key whose endpoints are the same table
    ///
    /// Self-references carry no ordering information and are discarded
    /// during graph construction.
    pub fn is_self_reference(&self) -> bool {
        self.from_table == self.to_table
    }
}

/// Foreign-key dependency graph over a set of tables
///
/// Two symmetric mappings: `dependencies` points from a table to the tables
/// its rows reference (which must exist before it, for restore), and
/// `dependents` points the other way. The invariant `b ∈ dependencies[a]`
/// iff `a ∈ dependents[b]` holds by construction because edges are only
/// inserted through [`DependencyGraph::insert_edge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    /// table -> tables it depends on (its restore prerequisites)
    dependencies: HashMap<TableId, BTreeSet<TableId>>,

    /// table -> tables that depend on it
    dependents: HashMap<TableId, BTreeSet<TableId>>,

    /// table -> raw foreign-key constraints originating from it
    foreign_keys: HashMap<TableId, Vec<ForeignKeyEdge>>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a foreign-key edge
    ///
    /// Self-references are skipped. Repeated insertion of the same edge is a
    /// no-op for the adjacency sets (set semantics, not multiset).
    pub fn insert_edge(&mut self, edge: ForeignKeyEdge) {
        if edge.is_self_reference() {
            return;
        }

        self.dependencies
            .entry(edge.from_table.clone())
            .or_default()
            .insert(edge.to_table.clone());

        self.dependents
            .entry(edge.to_table.clone())
            .or_default()
            .insert(edge.from_table.clone());

        let keys = self.foreign_keys.entry(edge.from_table.clone()).or_default();
        if !keys.contains(&edge) {
            keys.push(edge);
        }
    }

    /// Tables this table directly depends on
    ///
    /// Unknown tables have an empty dependency set. This supports tables
    /// newly added to the schema before the graph cache refreshes.
    pub fn dependencies_of(&self, table: &TableId) -> BTreeSet<TableId> {
        self.dependencies.get(table).cloned().unwrap_or_default()
    }

    /// Tables that directly depend on this table
    pub fn dependents_of(&self, table: &TableId) -> BTreeSet<TableId> {
        self.dependents.get(table).cloned().unwrap_or_default()
    }

    /// Raw foreign-key constraints originating from a table
    pub fn foreign_keys_of(&self, table: &TableId) -> Vec<ForeignKeyEdge> {
        self.foreign_keys.get(table).cloned().unwrap_or_default()
    }

    /// Borrowed dependency set, if the table is known
    pub fn dependency_set(&self, table: &TableId) -> Option<&BTreeSet<TableId>> {
        self.dependencies.get(table)
    }

    /// Borrowed dependent set, if the table is known
    pub fn dependent_set(&self, table: &TableId) -> Option<&BTreeSet<TableId>> {
        self.dependents.get(table)
    }

    /// All tables that appear as an edge endpoint
    pub fn tables(&self) -> BTreeSet<TableId> {
        self.dependencies
            .keys()
            .chain(self.dependents.keys())
            .cloned()
            .collect()
    }

    /// Number of distinct tables in the graph
    pub fn table_count(&self) -> usize {
        self.tables().len()
    }

    /// Number of distinct dependency edges in the graph
    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(BTreeSet::len).sum()
    }

    /// Whether the graph has no edges
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(name: &str) -> TableId {
        TableId::parse(name).unwrap()
    }

    #[test]
    fn parse_valid_table_id() {
        let id = TableId::parse("app.orders").unwrap();
        assert_eq!(id.schema, "app");
        assert_eq!(id.table, "orders");
        assert_eq!(id.qualified(), "app.orders");
        assert_eq!(id.to_string(), "app.orders");
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(TableId::parse("orders").is_err());
        assert!(TableId::parse("a.b.c").is_err());
        assert!(TableId::parse(".orders").is_err());
        assert!(TableId::parse("app.").is_err());
        assert!(TableId::parse("").is_err());
    }

    #[test]
    fn from_str_round_trip() {
        let id: TableId = "app.customers".parse().unwrap();
        assert_eq!(id, TableId::new("app", "customers"));
    }

    #[test]
    fn insert_edge_populates_both_directions() {
        let mut graph = DependencyGraph::new();
        graph.insert_edge(ForeignKeyEdge::new(
            t("app.orders"),
            t("app.customers"),
            "customer_id",
            "id",
        ));

        assert!(graph.dependencies_of(&t("app.orders")).contains(&t("app.customers")));
        assert!(graph.dependents_of(&t("app.customers")).contains(&t("app.orders")));
    }

    #[test]
    fn self_reference_is_discarded() {
        let mut graph = DependencyGraph::new();
        graph.insert_edge(ForeignKeyEdge::new(
            t("app.employees"),
            t("app.employees"),
            "manager_id",
            "id",
        ));

        assert!(graph.is_empty());
        assert!(graph.dependencies_of(&t("app.employees")).is_empty());
        assert!(graph.dependents_of(&t("app.employees")).is_empty());
    }

    #[test]
    fn duplicate_edges_are_deduplicated() {
        let mut graph = DependencyGraph::new();
        let edge = ForeignKeyEdge::new(t("app.orders"), t("app.customers"), "customer_id", "id");
        graph.insert_edge(edge.clone());
        graph.insert_edge(edge);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.foreign_keys_of(&t("app.orders")).len(), 1);
    }

    #[test]
    fn unknown_table_has_empty_sets() {
        let graph = DependencyGraph::new();
        assert!(graph.dependencies_of(&t("app.missing")).is_empty());
        assert!(graph.dependents_of(&t("app.missing")).is_empty());
        assert!(graph.foreign_keys_of(&t("app.missing")).is_empty());
    }

    #[test]
    fn symmetric_consistency() {
        let mut graph = DependencyGraph::new();
        graph.insert_edge(ForeignKeyEdge::new(t("a.x"), t("a.y"), "y_id", "id"));
        graph.insert_edge(ForeignKeyEdge::new(t("a.y"), t("a.z"), "z_id", "id"));
        graph.insert_edge(ForeignKeyEdge::new(t("a.x"), t("a.z"), "z_id", "id"));

        for table in graph.tables() {
            for dep in graph.dependencies_of(&table) {
                assert!(graph.dependents_of(&dep).contains(&table));
            }
            for dependent in graph.dependents_of(&table) {
                assert!(graph.dependencies_of(&dependent).contains(&table));
            }
        }
    }

    #[test]
    fn multiple_columns_to_same_table_are_one_edge_but_two_keys() {
        let mut graph = DependencyGraph::new();
        graph.insert_edge(ForeignKeyEdge::new(
            t("app.transfers"),
            t("app.accounts"),
            "from_account_id",
            "id",
        ));
        graph.insert_edge(ForeignKeyEdge::new(
            t("app.transfers"),
            t("app.accounts"),
            "to_account_id",
            "id",
        ));

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.foreign_keys_of(&t("app.transfers")).len(), 2);
    }
}
