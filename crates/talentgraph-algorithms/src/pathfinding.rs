//! Simple-path enumeration
//!
//! Bounded depth-first enumeration of simple paths between two nodes.
//! Both the path length and the number of returned paths are capped so
//! enumeration cannot blow up combinatorially on dense graphs.

use super::common::GraphView;

/// Enumerate simple paths from `source` to `target` with at most
/// `max_hops` edges, stopping after `max_count` paths are collected.
///
/// Paths are returned as dense index sequences including both endpoints.
/// `source == target` yields nothing, as do out-of-range indices.
pub fn simple_paths(
    view: &GraphView,
    source: usize,
    target: usize,
    max_hops: usize,
    max_count: usize,
) -> Vec<Vec<usize>> {
    let n = view.node_count;
    if source >= n || target >= n || source == target || max_hops == 0 || max_count == 0 {
        return Vec::new();
    }

    let mut paths = Vec::new();
    let mut on_path = vec![false; n];
    let mut current = vec![source];
    on_path[source] = true;

    dfs(view, target, max_hops, max_count, &mut current, &mut on_path, &mut paths);

    paths
}

fn dfs(
    view: &GraphView,
    target: usize,
    max_hops: usize,
    max_count: usize,
    current: &mut Vec<usize>,
    on_path: &mut [bool],
    paths: &mut Vec<Vec<usize>>,
) {
    if paths.len() >= max_count {
        return;
    }

    let last = *current.last().unwrap_or(&0);
    if current.len() > max_hops {
        return;
    }

    for &next in &view.neighbors[last] {
        if paths.len() >= max_count {
            return;
        }
        if on_path[next] {
            continue;
        }
        if next == target {
            let mut found = current.clone();
            found.push(target);
            paths.push(found);
            continue;
        }

        current.push(next);
        on_path[next] = true;
        dfs(view, target, max_hops, max_count, current, on_path, paths);
        on_path[next] = false;
        current.pop();
    }
}
