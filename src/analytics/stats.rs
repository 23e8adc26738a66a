//! Graph-level statistics
//!
//! Fast mode covers everything cheap enough for interactive use; full
//! mode adds betweenness centrality estimated from a bounded sample of
//! BFS sources, chunked so cancellation can interrupt between sources.

use rustc_hash::FxHashMap;
use serde::Serialize;
use talentgraph_algorithms::{
    average_clustering, betweenness_from_sources, connected_components, sample_sources,
    scale_betweenness, GraphView,
};

use crate::graph::{PersonId, TalentGraph};

use super::cancel::CancelToken;
use super::AnalyticsError;

/// How much work a statistics call is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsMode {
    /// Counts, density, clustering, connectivity, degree distribution
    Fast,
    /// Fast plus sampled betweenness centrality
    Full,
}

/// Aggregate betweenness figures for a full-mode run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetweennessSummary {
    pub sources_sampled: usize,
    pub mean: f64,
    pub max: f64,
}

/// Snapshot of whole-graph statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub average_clustering: f64,
    pub connected: bool,
    pub component_count: usize,
    pub degree_average: f64,
    pub degree_min: usize,
    pub degree_max: usize,
    /// Present only for [`StatsMode::Full`]
    pub betweenness: Option<BetweennessSummary>,
}

/// Sources per chunk between cancellation checkpoints.
const BETWEENNESS_CHUNK: usize = 8;

/// Estimate betweenness from a sample of sources, polling the token
/// between chunks. Returns per-index scores aligned with the view.
pub(crate) fn sampled_betweenness(
    view: &GraphView,
    sample_size: usize,
    seed: Option<u64>,
    token: &CancelToken,
) -> Result<(Vec<f64>, usize), AnalyticsError> {
    let sources = sample_sources(view, sample_size.min(view.node_count), seed);
    let mut scores = vec![0.0; view.node_count];

    for chunk in sources.chunks(BETWEENNESS_CHUNK) {
        token.check()?;
        let partial = betweenness_from_sources(view, chunk);
        for (acc, v) in scores.iter_mut().zip(partial) {
            *acc += v;
        }
    }
    scale_betweenness(&mut scores, view.node_count, sources.len());
    Ok((scores, sources.len()))
}

/// Re-key per-index scores by person id.
pub(crate) fn betweenness_by_person(view: &GraphView, scores: &[f64]) -> FxHashMap<PersonId, f64> {
    view.index_to_node
        .iter()
        .zip(scores)
        .map(|(&node, &score)| (PersonId::new(node), score))
        .collect()
}

pub(crate) fn compute_statistics(
    graph: &TalentGraph,
    view: &GraphView,
    betweenness: Option<(&FxHashMap<PersonId, f64>, usize)>,
    token: &CancelToken,
) -> Result<GraphStatistics, AnalyticsError> {
    token.check()?;

    let n = view.node_count;
    let degrees: Vec<usize> = (0..n).map(|i| view.degree(i)).collect();
    let degree_average = if n == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / n as f64
    };

    token.check()?;
    let components = connected_components(view);

    token.check()?;
    let average_clustering = average_clustering(view);

    let betweenness = betweenness.map(|(map, sources_sampled)| {
        let max = map.values().copied().fold(0.0_f64, f64::max);
        let mean = if map.is_empty() {
            0.0
        } else {
            map.values().sum::<f64>() / map.len() as f64
        };
        BetweennessSummary {
            sources_sampled,
            mean,
            max,
        }
    });

    Ok(GraphStatistics {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        density: graph.density(),
        average_clustering,
        connected: components.len() <= 1,
        component_count: components.len(),
        degree_average,
        degree_min: degrees.iter().copied().min().unwrap_or(0),
        degree_max: degrees.iter().copied().max().unwrap_or(0),
        betweenness,
    })
}
