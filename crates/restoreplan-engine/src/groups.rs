//! Parallel group (level) assignment

use crate::sort::sort_for_restore;
use restoreplan_core::{DependencyGraph, TableId};
use std::collections::{HashMap, HashSet};

/// Assign tables to parallel restore groups
///
/// Tables are first put in restore order, then each is assigned the lowest
/// group index such that all of its in-subset dependencies belong to strictly
/// earlier groups: `1 + max(group of each already-assigned dependency)`, or
/// group 0 when it has no in-subset dependencies.
///
/// Within a group no table depends (directly, within the subset) on another
/// member of the same group, so a group's members may be processed
/// concurrently. Groups themselves must be processed strictly in index
/// order; the engine only produces the plan, it never executes it.
pub fn assign_groups(tables: &[TableId], graph: &DependencyGraph) -> Vec<Vec<TableId>> {
    let order = sort_for_restore(tables, graph);
    let subset: HashSet<&TableId> = tables.iter().collect();

    let mut group_of: HashMap<TableId, usize> = HashMap::with_capacity(order.len());
    let mut groups: Vec<Vec<TableId>> = Vec::new();

    for table in order {
        let mut index = 0usize;

        if let Some(deps) = graph.dependency_set(&table) {
            for dep in deps.iter().filter(|d| subset.contains(d)) {
                // Dependencies not yet assigned (cyclic remainder) are skipped
                if let Some(&assigned) = group_of.get(dep) {
                    index = index.max(assigned + 1);
                }
            }
        }

        if groups.len() <= index {
            groups.resize_with(index + 1, Vec::new);
        }
        groups[index].push(table.clone());
        group_of.insert(table, index);
    }

    groups
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
    fn linear_chain_yields_singleton_groups() {
        let graph = graph(&[
            ("app.order_items", "app.orders"),
            ("app.orders", "app.customers"),
        ]);
        let tables = vec![t("app.order_items"), t("app.orders"), t("app.customers")];

        let groups = assign_groups(&tables, &graph);
        assert_eq!(
            groups,
            vec![
                vec![t("app.customers")],
                vec![t("app.orders")],
                vec![t("app.order_items")],
            ]
        );
    }

    #[test]
    fn independent_tables_share_group_zero() {
        let graph = DependencyGraph::new();
        let tables = vec![t("s.a"), t("s.b"), t("s.c")];

        let groups = assign_groups(&tables, &graph);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], tables);
    }

    #[test]
    fn diamond_levels() {
        // top depends on left and right; both depend on base
        let graph = graph(&[
            ("s.top", "s.left"),
            ("s.top", "s.right"),
            ("s.left", "s.base"),
            ("s.right", "s.base"),
        ]);
        let tables = vec![t("s.top"), t("s.left"), t("s.right"), t("s.base")];

        let groups = assign_groups(&tables, &graph);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], vec![t("s.base")]);
        assert_eq!(groups[1], vec![t("s.left"), t("s.right")]);
        assert_eq!(groups[2], vec![t("s.top")]);
    }

    #[test]
    fn no_intra_group_edges() {
        let graph = graph(&[
            ("s.d", "s.b"),
            ("s.d", "s.c"),
            ("s.b", "s.a"),
            ("s.c", "s.a"),
            ("s.e", "s.a"),
        ]);
        let tables = vec![t("s.a"), t("s.b"), t("s.c"), t("s.d"), t("s.e")];

        for group in assign_groups(&tables, &graph) {
            for member in &group {
                for dep in graph.dependencies_of(member) {
                    assert!(
                        !group.contains(&dep),
                        "{} and its dependency {} share a group",
                        member,
                        dep
                    );
                }
            }
        }
    }

    #[test]
    fn dependencies_outside_subset_do_not_raise_levels() {
        let graph = graph(&[("s.orders", "s.customers")]);
        let tables = vec![t("s.orders")];

        let groups = assign_groups(&tables, &graph);
        assert_eq!(groups, vec![vec![t("s.orders")]]);
    }

    #[test]
    fn group_concatenation_matches_restore_order() {
        let graph = graph(&[
            ("s.c", "s.b"),
            ("s.b", "s.a"),
            ("s.d", "s.a"),
        ]);
        let tables = vec![t("s.a"), t("s.b"), t("s.c"), t("s.d")];

        let order = sort_for_restore(&tables, &graph);
        let flattened: Vec<TableId> = assign_groups(&tables, &graph)
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(flattened, order);
    }
}
