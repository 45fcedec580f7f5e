//! Topological ordering for restore and extraction (Kahn's algorithm)

use restoreplan_core::{DependencyGraph, TableId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Compute a restore order for a subset of tables: parents before children
///
/// Kahn's algorithm over the subset-filtered graph. A table's degree here is
/// the number of in-subset tables it depends on, so a table becomes ready
/// once all of its prerequisites have been emitted. Edges to tables outside
/// the subset are ignored; they are assumed already satisfied or irrelevant.
///
/// Ties break deterministically: the ready queue is seeded in the caller's
/// input order, and dependents are relaxed in input-position order, so tables
/// that become ready together keep their original relative order.
///
/// If the subset contains a cycle, the unsortable remainder is appended in
/// original input order. The result is always a permutation of the input,
/// but the cyclic tail is not a valid topological order; callers that need
/// to detect this case should run cycle detection separately.
pub fn sort_for_restore(tables: &[TableId], graph: &DependencyGraph) -> Vec<TableId> {
    let subset: HashSet<&TableId> = tables.iter().collect();
    let position: HashMap<&TableId, usize> = tables
        .iter()
        .enumerate()
        .map(|(index, table)| (table, index))
        .collect();

    // Degree = count of in-subset dependencies still unresolved
    let mut degree: HashMap<&TableId, usize> = HashMap::with_capacity(tables.len());
    for table in tables {
        let count = graph
            .dependency_set(table)
            .map(|deps| deps.iter().filter(|d| subset.contains(d)).count())
            .unwrap_or(0);
        degree.insert(table, count);
    }

    let mut queue: VecDeque<&TableId> = tables
        .iter()
        .filter(|table| degree.get(*table) == Some(&0))
        .collect();

    let mut emitted: HashSet<&TableId> = HashSet::with_capacity(tables.len());
    let mut result: Vec<TableId> = Vec::with_capacity(tables.len());

    while let Some(table) = queue.pop_front() {
        if !emitted.insert(table) {
            continue;
        }
        result.push(table.clone());

        let Some(dependents) = graph.dependent_set(table) else {
            continue;
        };

        // Relax in-subset dependents in input-position order for stable ties
        let mut waiting: Vec<&TableId> = dependents
            .iter()
            .filter_map(|d| subset.get(d).copied())
            .collect();
        waiting.sort_unstable_by_key(|d| position[d]);

        for dependent in waiting {
            if let Some(remaining) = degree.get_mut(dependent) {
                if *remaining > 0 {
                    *remaining -= 1;
                    if *remaining == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }
    }

    // Cycle fallback: append the unsortable remainder in input order
    if result.len() < tables.len() {
        tracing::warn!(
            unsorted = tables.len() - result.len(),
            "cycle detected during restore ordering; appending remainder in input order"
        );
        for table in tables {
            if !emitted.contains(table) {
                emitted.insert(table);
                result.push(table.clone());
            }
        }
    }

    result
}

/// Compute an extraction order: children before parents
///
/// Defined as the exact reverse of [`sort_for_restore`]; extraction has no
/// independent algorithm.
pub fn sort_for_extraction(tables: &[TableId], graph: &DependencyGraph) -> Vec<TableId> {
    let mut order = sort_for_restore(tables, graph);
    order.reverse();
    order
}
