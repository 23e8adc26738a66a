//! Betweenness centrality via source sampling
//!
//! Exact betweenness is O(V*E) and infeasible above ~10^4 nodes, so the
//! accumulation runs from a caller-chosen subset of source nodes and the
//! result is scaled to estimate the exact values. Callers may split the
//! source list into chunks and merge partial results to interleave
//! cancellation checks.

use super::common::GraphView;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Sample `k` distinct source indices (all of them when `k >= node_count`).
pub fn sample_sources(view: &GraphView, k: usize, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..view.node_count).collect();
    if k >= indices.len() {
        return indices;
    }
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);
    indices.truncate(k);
    indices
}

/// Brandes dependency accumulation from the given sources (unweighted).
///
/// Returns raw per-node accumulated dependencies. Use [`scale_betweenness`]
/// after merging all chunks to turn them into the sampled estimate.
pub fn betweenness_from_sources(view: &GraphView, sources: &[usize]) -> Vec<f64> {
    let n = view.node_count;
    let mut bc = vec![0.0; n];

    for &s in sources {
        // BFS phase: shortest-path counts and predecessor lists.
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1_i64; n];
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut order = Vec::with_capacity(n);
        let mut queue = VecDeque::new();

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &w in &view.neighbors[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        // Accumulation phase, reverse BFS order.
        let mut delta = vec![0.0_f64; n];
        while let Some(w) = order.pop() {
            for &v in &preds[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                bc[w] += delta[w];
            }
        }
    }

    bc
}

/// Scale raw accumulated dependencies into the sampled estimate.
///
/// Extrapolates from `source_count` sources to all `node_count` sources,
/// then halves because each undirected shortest path was counted from both
/// endpoints over a full run.
pub fn scale_betweenness(bc: &mut [f64], node_count: usize, source_count: usize) {
    if source_count == 0 {
        return;
    }
    let scale = node_count as f64 / source_count as f64 / 2.0;
    for v in bc.iter_mut() {
        *v *= scale;
    }
}
