//! Local graph topology measures
//!
//! Clustering coefficients and average neighbor degree, used by the graph
//! statistics and the structural feature vectors.

use super::common::GraphView;
use std::collections::HashSet;

/// Local clustering coefficient per node.
///
/// For a node with degree k and t edges among its neighbors the
/// coefficient is 2t / (k * (k - 1)); nodes with degree < 2 get 0.0.
pub fn local_clustering(view: &GraphView) -> Vec<f64> {
    let n = view.node_count;
    let neighbor_sets: Vec<HashSet<usize>> = (0..n)
        .map(|u| view.neighbors[u].iter().copied().collect())
        .collect();

    let mut coefficients = vec![0.0; n];
    for u in 0..n {
        let k = neighbor_sets[u].len();
        if k < 2 {
            continue;
        }

        let mut links = 0usize;
        for &v in &neighbor_sets[u] {
            for &w in &neighbor_sets[v] {
                if w > v && neighbor_sets[u].contains(&w) {
                    links += 1;
                }
            }
        }

        coefficients[u] = 2.0 * links as f64 / (k * (k - 1)) as f64;
    }

    coefficients
}

/// Mean of the local clustering coefficients (0.0 for an empty graph).
pub fn average_clustering(view: &GraphView) -> f64 {
    if view.node_count == 0 {
        return 0.0;
    }
    local_clustering(view).iter().sum::<f64>() / view.node_count as f64
}

/// Average degree of each node's neighbors (0.0 for isolated nodes).
pub fn average_neighbor_degree(view: &GraphView) -> Vec<f64> {
    (0..view.node_count)
        .map(|u| {
            let neighbors = &view.neighbors[u];
            if neighbors.is_empty() {
                return 0.0;
            }
            let total: usize = neighbors.iter().map(|&v| view.degree(v)).sum();
            total as f64 / neighbors.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clustering_triangle_with_tail() {
        // Triangle 0-1-2 plus tail edge 2-3.
        let nodes: Vec<u64> = (0..4).collect();
        let edges = vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0), (2, 3, 1.0)];
        let view = GraphView::from_edges(&nodes, &edges);

        let c = local_clustering(&view);
        assert_eq!(c[view.node_to_index[&0]], 1.0);
        assert_eq!(c[view.node_to_index[&1]], 1.0);
        // Node 2 has 3 neighbors, 1 link among them: 2/(3*2) = 1/3
        assert!((c[view.node_to_index[&2]] - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(c[view.node_to_index[&3]], 0.0);

        let avg = average_clustering(&view);
        assert!((avg - (1.0 + 1.0 + 1.0 / 3.0) / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_neighbor_degree() {
        // Star: 0 connected to 1, 2, 3.
        let nodes: Vec<u64> = (0..4).collect();
        let edges = vec![(0, 1, 1.0), (0, 2, 1.0), (0, 3, 1.0)];
        let view = GraphView::from_edges(&nodes, &edges);

        let and = average_neighbor_degree(&view);
        assert_eq!(and[view.node_to_index[&0]], 1.0);
        assert_eq!(and[view.node_to_index[&1]], 3.0);
    }
}
