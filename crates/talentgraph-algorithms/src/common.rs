//! Shared utilities for graph algorithms
//!
//! Provides a read-only, dense view of an undirected graph topology for
//! algorithm execution.

use std::collections::HashMap;

/// External node identifier used by callers of this crate.
pub type NodeId = u64;

/// A dense, integer-indexed view of an undirected graph.
///
/// Algorithms like betweenness centrality and community detection iterate
/// over nodes and edges many times. Callers map their own identifiers to
/// dense indices (0..N) once, and every algorithm in this crate works on
/// plain `usize` indices from then on.
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,
    /// Adjacency list: index -> neighbor indices (each undirected edge
    /// appears in both endpoints' lists)
    pub neighbors: Vec<Vec<usize>>,
    /// Optional edge weights, parallel to `neighbors`
    pub weights: Option<Vec<Vec<f64>>>,
}

impl GraphView {
    /// Build a view from a node list and weighted undirected edge list.
    ///
    /// Edges whose endpoints are not in `nodes` are ignored; self-loops are
    /// ignored as well.
    pub fn from_edges(nodes: &[NodeId], edges: &[(NodeId, NodeId, f64)]) -> Self {
        let mut index_to_node = Vec::with_capacity(nodes.len());
        let mut node_to_index = HashMap::with_capacity(nodes.len());

        for (idx, node_id) in nodes.iter().enumerate() {
            index_to_node.push(*node_id);
            node_to_index.insert(*node_id, idx);
        }

        let node_count = index_to_node.len();
        let mut neighbors = vec![Vec::new(); node_count];
        let mut weights = vec![Vec::new(); node_count];

        for &(a, b, w) in edges {
            if a == b {
                continue;
            }
            let (Some(&u), Some(&v)) = (node_to_index.get(&a), node_to_index.get(&b)) else {
                continue;
            };
            neighbors[u].push(v);
            weights[u].push(w);
            neighbors[v].push(u);
            weights[v].push(w);
        }

        Self {
            node_count,
            index_to_node,
            node_to_index,
            neighbors,
            weights: Some(weights),
        }
    }

    /// Get the degree of a node (by index)
    pub fn degree(&self, idx: usize) -> usize {
        self.neighbors[idx].len()
    }

    /// Weight of the edge at position `pos` in `idx`'s adjacency list.
    /// Defaults to 1.0 when the view carries no weights.
    pub fn weight_at(&self, idx: usize, pos: usize) -> f64 {
        match &self.weights {
            Some(w) => w[idx][pos],
            None => 1.0,
        }
    }

    /// Weighted degree of a node (sum of incident edge weights).
    pub fn weighted_degree(&self, idx: usize) -> f64 {
        match &self.weights {
            Some(w) => w[idx].iter().sum(),
            None => self.neighbors[idx].len() as f64,
        }
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Total undirected edge weight (each edge counted once).
    pub fn total_weight(&self) -> f64 {
        (0..self.node_count).map(|i| self.weighted_degree(i)).sum::<f64>() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_from_edges() {
        let nodes = vec![10, 20, 30];
        let edges = vec![(10, 20, 2.0), (20, 30, 1.0)];
        let view = GraphView::from_edges(&nodes, &edges);

        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 2);

        let i10 = view.node_to_index[&10];
        let i20 = view.node_to_index[&20];
        assert!(view.neighbors[i10].contains(&i20));
        assert!(view.neighbors[i20].contains(&i10));
        assert_eq!(view.degree(i20), 2);
        assert_eq!(view.weighted_degree(i20), 3.0);
        assert_eq!(view.total_weight(), 3.0);
    }

    #[test]
    fn test_view_skips_self_loops_and_unknown_endpoints() {
        let nodes = vec![1, 2];
        let edges = vec![(1, 1, 1.0), (1, 99, 1.0), (1, 2, 1.0)];
        let view = GraphView::from_edges(&nodes, &edges);

        assert_eq!(view.edge_count(), 1);
    }
}
