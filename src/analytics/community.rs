//! Community detection and inspection
//!
//! Algorithm selection is a tagged enum; Louvain is a compile-time
//! feature (on by default). When it is compiled out, detection falls back
//! to label propagation and says so on the partition rather than failing.

use std::cmp::Reverse;

use talentgraph_algorithms::{
    average_clustering, greedy_modularity, label_propagation, modularity, GraphView, Partition,
};

use crate::graph::{PersonId, TalentGraph};

use super::cancel::CancelToken;
use super::AnalyticsError;

const LABEL_PROPAGATION_MAX_ITERS: usize = 20;

/// Selectable community detection algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunityAlgorithm {
    LabelPropagation,
    GreedyModularity,
    Louvain,
}

impl CommunityAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunityAlgorithm::LabelPropagation => "label-propagation",
            CommunityAlgorithm::GreedyModularity => "greedy-modularity",
            CommunityAlgorithm::Louvain => "louvain",
        }
    }
}

/// Disjoint communities covering the node set, largest first
#[derive(Debug, Clone)]
pub struct CommunityPartition {
    /// Algorithm that actually ran (after any fallback)
    pub algorithm: CommunityAlgorithm,
    pub communities: Vec<Vec<PersonId>>,
    pub modularity: f64,
    pub graph_version: u64,
    /// Set when the requested algorithm was unavailable
    pub warning: Option<String>,
}

impl CommunityPartition {
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }
}

/// One member of a community, ranked by full-graph degree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRank {
    pub person_id: PersonId,
    pub name: String,
    pub degree: usize,
}

/// Induced-subgraph summary of one community
#[derive(Debug, Clone)]
pub struct CommunityDetail {
    pub index: usize,
    pub size: usize,
    pub density: f64,
    pub average_clustering: f64,
    pub top_members: Vec<MemberRank>,
}

pub(crate) fn detect(
    graph: &TalentGraph,
    view: &GraphView,
    algorithm: CommunityAlgorithm,
    seed: Option<u64>,
    token: &CancelToken,
) -> Result<CommunityPartition, AnalyticsError> {
    token.check()?;

    let (ran, partition, warning) = run_algorithm(view, algorithm, seed);
    token.check()?;

    let score = modularity(view, &partition.assignment);

    // Largest first; ties broken by smallest member id for stable
    // ordinals within one run.
    let mut communities: Vec<Vec<PersonId>> = partition
        .groups
        .iter()
        .map(|group| {
            let mut members: Vec<PersonId> = group
                .iter()
                .map(|&idx| PersonId::new(view.index_to_node[idx]))
                .collect();
            members.sort();
            members
        })
        .collect();
    communities.sort_by_key(|members| (Reverse(members.len()), members.first().copied()));

    Ok(CommunityPartition {
        algorithm: ran,
        communities,
        modularity: score,
        graph_version: graph.version(),
        warning,
    })
}

fn run_algorithm(
    view: &GraphView,
    algorithm: CommunityAlgorithm,
    seed: Option<u64>,
) -> (CommunityAlgorithm, Partition, Option<String>) {
    match algorithm {
        CommunityAlgorithm::LabelPropagation => (
            algorithm,
            label_propagation(view, LABEL_PROPAGATION_MAX_ITERS, seed),
            None,
        ),
        CommunityAlgorithm::GreedyModularity => (algorithm, greedy_modularity(view), None),
        CommunityAlgorithm::Louvain => {
            #[cfg(feature = "louvain")]
            {
                (algorithm, talentgraph_algorithms::louvain(view, seed), None)
            }
            #[cfg(not(feature = "louvain"))]
            {
                tracing::warn!("louvain not compiled in; falling back to label propagation");
                (
                    CommunityAlgorithm::LabelPropagation,
                    label_propagation(view, LABEL_PROPAGATION_MAX_ITERS, seed),
                    Some(
                        "louvain unavailable in this build; used label propagation".to_string(),
                    ),
                )
            }
        }
    }
}

pub(crate) fn inspect(
    graph: &TalentGraph,
    partition: &CommunityPartition,
    index: usize,
    top_members: usize,
) -> Result<CommunityDetail, AnalyticsError> {
    let Some(members) = partition.communities.get(index) else {
        return Err(AnalyticsError::CommunityNotFound {
            index,
            count: partition.communities.len(),
        });
    };

    // Induced subgraph: member nodes plus edges with both endpoints inside.
    let nodes: Vec<u64> = members.iter().map(|id| id.as_u64()).collect();
    let mut edges = Vec::new();
    for &a in members {
        for &b in graph.neighbors(a) {
            if a < b && members.binary_search(&b).is_ok() {
                let strength = graph
                    .edge(a, b)
                    .map_or(1.0, |e| e.combined_strength().max(1.0));
                edges.push((a.as_u64(), b.as_u64(), strength));
            }
        }
    }
    let induced = GraphView::from_edges(&nodes, &edges);

    let size = members.len();
    let density = if size < 2 {
        0.0
    } else {
        2.0 * induced.edge_count() as f64 / (size as f64 * (size as f64 - 1.0))
    };

    let mut ranked: Vec<MemberRank> = members
        .iter()
        .map(|&id| MemberRank {
            person_id: id,
            name: graph.node(id).map(|n| n.name.clone()).unwrap_or_default(),
            degree: graph.degree(id),
        })
        .collect();
    ranked.sort_by_key(|m| (Reverse(m.degree), m.person_id));
    ranked.truncate(top_members);

    Ok(CommunityDetail {
        index,
        size,
        density,
        average_clustering: average_clustering(&induced),
        top_members: ranked,
    })
}
