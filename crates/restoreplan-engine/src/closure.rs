//! Transitive dependency closure

use restoreplan_core::{DependencyGraph, TableId};
use std::collections::{HashSet, VecDeque};

/// All tables a table depends on, directly or indirectly
///
/// Breadth-first worklist traversal over the whole graph; unlike the sorter
/// there is no caller-supplied subset filter. The result carries no ordering
/// guarantee beyond discovery order, so callers that need a safe processing
/// order must run the sorter over the returned set.
pub fn all_dependencies(start: &TableId, graph: &DependencyGraph) -> HashSet<TableId> {
    let mut visited: HashSet<TableId> = HashSet::new();
    let mut queue: VecDeque<TableId> = VecDeque::new();

    // Seed with the direct dependencies; the starting table itself only
    // appears in the result if it participates in a cycle.
    if let Some(deps) = graph.dependency_set(start) {
        for dep in deps {
            queue.push_back(dep.clone());
        }
    }

    while let Some(current) = queue.pop_front() {
        if visited.contains(&current) {
            continue;
        }
        visited.insert(current.clone());

        if let Some(deps) = graph.dependency_set(&current) {
            for dep in deps {
                if !visited.contains(dep) {
                    queue.push_back(dep.clone());
                }
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use restoreplan_core::ForeignKeyEdge;

    fn t(name: &str) -> TableId {
        TableId::parse(name).unwrap()
    }

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.insert_edge(ForeignKeyEdge::new(t(from), t(to), "ref_id", "id"));
        }
        graph
    }

    #[test]
    fn direct_and_indirect_dependencies() {
        // a -> b -> c, a -> d
        let graph = graph(&[("s.a", "s.b"), ("s.b", "s.c"), ("s.a", "s.d")]);

        let closure = all_dependencies(&t("s.a"), &graph);
        let expected: HashSet<TableId> = [t("s.b"), t("s.c"), t("s.d")].into_iter().collect();
        assert_eq!(closure, expected);
    }

    #[test]
    fn leaf_table_has_empty_closure() {
        let graph = graph(&[("s.a", "s.b")]);
        assert!(all_dependencies(&t("s.b"), &graph).is_empty());
    }

    #[test]
    fn unknown_table_has_empty_closure() {
        let graph = DependencyGraph::new();
        assert!(all_dependencies(&t("s.missing"), &graph).is_empty());
    }

    #[test]
    fn walk_covers_the_whole_graph_not_a_subset() {
        // Long chain: every hop is reachable
        let graph = graph(&[("s.a", "s.b"), ("s.b", "s.c"), ("s.c", "s.d"), ("s.d", "s.e")]);

        let closure = all_dependencies(&t("s.a"), &graph);
        assert_eq!(closure.len(), 4);
    }

    #[test]
    fn cycle_terminates_and_includes_start() {
        let graph = graph(&[("s.a", "s.b"), ("s.b", "s.a")]);

        let closure = all_dependencies(&t("s.a"), &graph);
        let expected: HashSet<TableId> = [t("s.a"), t("s.b")].into_iter().collect();
        assert_eq!(closure, expected);
    }
}
