//! Elementary cycle detection over a subset of the dependency graph

use restoreplan_core::{DependencyGraph, TableId};
use std::collections::HashSet;

/// Find circular dependencies confined to a subset of tables
///
/// Runs a depth-first walk from each table over its subset-filtered
/// dependencies, tracking the current path. Revisiting a table already on
/// the path records the closed loop from its first occurrence through the
/// revisit (first and last element are the same table). Tables that finished
/// a walk without participating in any recorded cycle are pruned from later
/// walks; cycle members stay visitable so that distinct loops sharing a
/// table are each reported.
///
/// The output is deduplicated as a set, but rotations of the same loop
/// discovered from different starting tables may still be reported as
/// distinct cycles. Callers must not assume a canonical representation.
///
/// This is a diagnostic; it does not change how the sorter handles cycles.
pub fn detect_cycles<'a>(
    tables: &'a [TableId],
    graph: &'a DependencyGraph,
) -> HashSet<Vec<TableId>> {
    let subset: HashSet<&TableId> = tables.iter().collect();
    let mut finished: HashSet<&TableId> = HashSet::new();
    let mut in_cycle: HashSet<&TableId> = HashSet::new();
    let mut cycles: HashSet<Vec<TableId>> = HashSet::new();

    for start in tables {
        let mut path: Vec<&TableId> = Vec::new();
        walk(
            start,
            graph,
            &subset,
            &mut path,
            &mut finished,
            &mut in_cycle,
            &mut cycles,
        );
    }

    cycles
}

fn walk<'a>(
    table: &'a TableId,
    graph: &'a DependencyGraph,
    subset: &HashSet<&'a TableId>,
    path: &mut Vec<&'a TableId>,
    finished: &mut HashSet<&'a TableId>,
    in_cycle: &mut HashSet<&'a TableId>,
    cycles: &mut HashSet<Vec<TableId>>,
) {
    if let Some(first) = path.iter().position(|p| *p == table) {
        // Closed loop: path slice from the first occurrence through
        // the revisit, inclusive. Do not continue past it.
        let members = &path[first..];
        in_cycle.extend(members.iter().copied());
        let mut cycle: Vec<TableId> = members.iter().map(|p| (*p).clone()).collect();
        cycle.push(table.clone());
        cycles.insert(cycle);
        return;
    }

    if finished.contains(table) {
        return;
    }

    path.push(table);

    if let Some(deps) = graph.dependency_set(table) {
        for dep in deps {
            if subset.contains(dep) {
                walk(dep, graph, subset, path, finished, in_cycle, cycles);
            }
        }
    }

    path.pop();
    // Cycle members are never pruned: another path may close a different
    // loop through the same table.
    if !in_cycle.contains(table) {
        finished.insert(table);
    }
}
