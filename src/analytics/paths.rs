//! Novelty path discovery
//!
//! Matches two free-text concepts against headlines, enumerates bounded
//! simple paths between the matched people, and ranks the paths by how
//! structurally dissimilar consecutive people are. High novelty means the
//! path crosses between unlike neighborhoods instead of staying inside
//! one tight cluster.

use talentgraph_algorithms::{simple_paths, GraphView};

use crate::graph::{EdgeKind, PersonId, TalentGraph};

use super::cancel::CancelToken;
use super::embedding::{cosine_similarity, EmbeddingSet};
use super::{AnalyticsConfig, AnalyticsError};

/// One person along a discovered path
#[derive(Debug, Clone, PartialEq)]
pub struct PathPerson {
    pub person_id: PersonId,
    pub name: String,
    pub headline: Option<String>,
}

/// One hop along a discovered path
#[derive(Debug, Clone, PartialEq)]
pub struct PathHop {
    pub kinds: Vec<EdgeKind>,
    pub strength: f64,
}

/// A scored path between two concept matches
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredPath {
    pub people: Vec<PathPerson>,
    pub hops: Vec<PathHop>,
    /// Mean over consecutive pairs of (1 - cosine similarity)
    pub novelty: f64,
}

/// People whose headline contains `concept`, capped and in node order.
pub(crate) fn match_concept(graph: &TalentGraph, concept: &str, cap: usize) -> Vec<PersonId> {
    graph
        .nodes()
        .filter(|node| node.headline_matches(concept))
        .map(|node| node.id)
        .take(cap)
        .collect()
}

pub(crate) fn discover(
    graph: &TalentGraph,
    view: &GraphView,
    embeddings: &EmbeddingSet,
    config: &AnalyticsConfig,
    concept_a: &str,
    concept_b: &str,
    token: &CancelToken,
) -> Result<Vec<DiscoveredPath>, AnalyticsError> {
    let sources = match_concept(graph, concept_a, config.concept_candidate_cap);
    let targets = match_concept(graph, concept_b, config.concept_candidate_cap);
    if sources.is_empty() || targets.is_empty() {
        return Ok(Vec::new());
    }

    let mut raw_paths: Vec<Vec<usize>> = Vec::new();
    for &source in &sources {
        for &target in &targets {
            token.check()?;
            if source == target || raw_paths.len() >= config.max_paths {
                continue;
            }
            let (Some(&s), Some(&t)) = (
                view.node_to_index.get(&source.as_u64()),
                view.node_to_index.get(&target.as_u64()),
            ) else {
                continue;
            };
            let budget = config.max_paths - raw_paths.len();
            raw_paths.extend(simple_paths(view, s, t, config.max_path_len, budget));
        }
    }

    let mut scored: Vec<DiscoveredPath> = raw_paths
        .iter()
        .map(|indices| describe_path(graph, view, embeddings, indices))
        .collect();
    scored.sort_by(|x, y| y.novelty.total_cmp(&x.novelty));
    scored.truncate(config.top_paths);
    Ok(scored)
}

fn describe_path(
    graph: &TalentGraph,
    view: &GraphView,
    embeddings: &EmbeddingSet,
    indices: &[usize],
) -> DiscoveredPath {
    let ids: Vec<PersonId> = indices
        .iter()
        .map(|&idx| PersonId::new(view.index_to_node[idx]))
        .collect();

    let people = ids
        .iter()
        .map(|&id| {
            let node = graph.node(id);
            PathPerson {
                person_id: id,
                name: node.map(|n| n.name.clone()).unwrap_or_default(),
                headline: node.and_then(|n| n.headline.clone()),
            }
        })
        .collect();

    let hops = ids
        .windows(2)
        .map(|pair| {
            let edge = graph.edge(pair[0], pair[1]);
            PathHop {
                kinds: edge.map(|e| e.kinds()).unwrap_or_default(),
                strength: edge.map_or(0.0, |e| e.combined_strength()),
            }
        })
        .collect();

    let mut dissimilarity = 0.0;
    for pair in ids.windows(2) {
        let similarity = match (embeddings.get(pair[0]), embeddings.get(pair[1])) {
            (Some(a), Some(b)) => cosine_similarity(a, b),
            _ => 0.0,
        };
        dissimilarity += 1.0 - similarity;
    }
    let novelty = if ids.len() < 2 {
        0.0
    } else {
        dissimilarity / (ids.len() - 1) as f64
    };

    DiscoveredPath {
        people,
        hops,
        novelty,
    }
}
