//! Structural node embeddings
//!
//! These vectors are a structural proxy built from topology and profile
//! features, not a trained embedding. Feature order is fixed so vectors
//! from the same graph version are comparable:
//!
//!   0: degree
//!   1: sampled betweenness
//!   2: local clustering coefficient
//!   3: average neighbor degree
//!   4: sum of incident combined edge strengths
//!   5: follower count, normalized by the graph maximum
//!   6: repo count, normalized by the graph maximum
//!
//! The tail is zero-padded (or the vector truncated) to exactly the
//! configured dimension.

use rustc_hash::FxHashMap;
use talentgraph_algorithms::{average_neighbor_degree, local_clustering, GraphView};

use crate::graph::{PersonId, TalentGraph};

/// Per-person structural feature vectors for one graph version
#[derive(Debug, Clone)]
pub struct EmbeddingSet {
    dimension: usize,
    vectors: FxHashMap<PersonId, Vec<f32>>,
}

impl EmbeddingSet {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, id: PersonId) -> Option<&[f32]> {
        self.vectors.get(&id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.vectors.contains_key(&id)
    }

    /// Build vectors for every node. `betweenness` is per-view-index,
    /// aligned with `view.index_to_node`.
    pub(crate) fn build(
        graph: &TalentGraph,
        view: &GraphView,
        betweenness: &[f64],
        dimension: usize,
    ) -> Self {
        let clustering = local_clustering(view);
        let neighbor_degree = average_neighbor_degree(view);

        let max_followers = graph
            .nodes()
            .filter_map(|n| n.follower_count())
            .max()
            .unwrap_or(0) as f32;
        let max_repos = graph
            .nodes()
            .filter_map(|n| n.repo_count())
            .max()
            .unwrap_or(0) as f32;

        let mut vectors = FxHashMap::default();
        for (idx, &raw) in view.index_to_node.iter().enumerate() {
            let id = PersonId::new(raw);

            let strength_sum: f64 = graph
                .neighbors(id)
                .iter()
                .filter_map(|&other| graph.edge(id, other))
                .map(|e| e.combined_strength())
                .sum();

            let node = graph.node(id);
            let followers = node.and_then(|n| n.follower_count()).unwrap_or(0) as f32;
            let repos = node.and_then(|n| n.repo_count()).unwrap_or(0) as f32;

            let mut vector = vec![
                view.degree(idx) as f32,
                betweenness[idx] as f32,
                clustering[idx] as f32,
                neighbor_degree[idx] as f32,
                strength_sum as f32,
                if max_followers > 0.0 { followers / max_followers } else { 0.0 },
                if max_repos > 0.0 { repos / max_repos } else { 0.0 },
            ];
            vector.resize(dimension, 0.0);
            vectors.insert(id, vector);
        }

        EmbeddingSet { dimension, vectors }
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += x as f64 * y as f64;
        norm_a += x as f64 * x as f64;
        norm_b += y as f64 * y as f64;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Score everyone against `query`, excluding the query node, keeping
/// scores at or above `min_similarity`, descending, truncated to `k`.
/// Returns None when the query person has no vector.
pub(crate) fn rank_similar(
    set: &EmbeddingSet,
    query: PersonId,
    k: usize,
    min_similarity: f64,
) -> Option<Vec<(PersonId, f64)>> {
    let query_vec = set.get(query)?;

    let mut scored: Vec<(PersonId, f64)> = set
        .vectors
        .iter()
        .filter(|(&id, _)| id != query)
        .map(|(&id, vec)| (id, cosine_similarity(query_vec, vec)))
        .filter(|&(_, score)| score >= min_similarity)
        .collect();

    scored.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
    scored.truncate(k);
    Some(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PersonNode;
    use crate::store::CollaborationRow;

    fn small_graph() -> TalentGraph {
        let mut graph = TalentGraph::new();
        for id in 1..=4 {
            graph.add_node(PersonNode::new(PersonId::new(id), format!("p{id}")));
        }
        // Star around 1, plus a 2-3 edge.
        for (a, b) in [(1, 2), (1, 3), (1, 4), (2, 3)] {
            let row =
                CollaborationRow::new(PersonId::new(a), PersonId::new(b), 1.0, None, None).unwrap();
            graph.apply_collaboration(&row);
        }
        graph
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        // Zero magnitude short-circuits rather than dividing by zero.
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_build_pads_to_dimension() {
        let graph = small_graph();
        let view = graph.to_view();
        let betweenness = vec![0.0; view.node_count];

        let set = EmbeddingSet::build(&graph, &view, &betweenness, 128);
        assert_eq!(set.len(), 4);
        let vector = set.get(PersonId::new(1)).unwrap();
        assert_eq!(vector.len(), 128);
        assert_eq!(vector[0], 3.0); // degree of the hub
        assert!(vector[8..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rank_similar_excludes_query_and_truncates() {
        let graph = small_graph();
        let view = graph.to_view();
        let betweenness = vec![0.0; view.node_count];
        let set = EmbeddingSet::build(&graph, &view, &betweenness, 16);

        let ranked = rank_similar(&set, PersonId::new(2), 2, 0.0).unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|(id, _)| *id != PersonId::new(2)));
        assert!(ranked[0].1 >= ranked[1].1);
        // Nodes 2 and 3 are structurally identical, so 3 ranks first.
        assert_eq!(ranked[0].0, PersonId::new(3));
        assert!((ranked[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_similar_unknown_person() {
        let graph = small_graph();
        let view = graph.to_view();
        let set = EmbeddingSet::build(&graph, &view, &vec![0.0; view.node_count], 16);
        assert!(rank_similar(&set, PersonId::new(99), 3, 0.0).is_none());
    }
}
