//! Graph construction from catalog foreign-key edges

use restoreplan_core::{DependencyGraph, ForeignKeyEdge, ResolverConfig};
use std::collections::HashSet;

/// Build a dependency graph from a raw foreign-key edge list
///
/// Self-referencing edges are skipped (they carry no ordering information),
/// edges touching an excluded table are dropped, and duplicate catalog rows
/// collapse into one adjacency entry. The function is pure over the fetched
/// edge list so it can be tested without a catalog connection.
pub fn build_graph(edges: Vec<ForeignKeyEdge>, config: &ResolverConfig) -> DependencyGraph {
    let excluded: HashSet<&str> = config.exclude_tables.iter().map(String::as_str).collect();

    let mut graph = DependencyGraph::new();
    let mut skipped_self = 0usize;
    let mut skipped_excluded = 0usize;

    for edge in edges {
        if edge.is_self_reference() {
            skipped_self += 1;
            continue;
        }

        if excluded.contains(edge.from_table.qualified().as_str())
            || excluded.contains(edge.to_table.qualified().as_str())
        {
            skipped_excluded += 1;
            continue;
        }

        graph.insert_edge(edge);
    }

    if skipped_self > 0 || skipped_excluded > 0 {
        tracing::debug!(
            self_references = skipped_self,
            excluded = skipped_excluded,
            "skipped foreign-key edges during graph build"
        );
    }

    graph
}
