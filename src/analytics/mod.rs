//! Network analytics over the assembled graph
//!
//! [`engine::NetworkAnalytics`] owns the shared graph and a version-keyed
//! cache of derived values; the submodules hold the individual analyses.

use thiserror::Error;

use crate::export::ExportError;
use crate::graph::PersonId;
use crate::store::StoreError;

pub mod cancel;
pub mod community;
pub mod embedding;
pub mod engine;
pub mod paths;
pub mod stats;

pub use cancel::CancelToken;
pub use community::{CommunityAlgorithm, CommunityDetail, CommunityPartition, MemberRank};
pub use embedding::{cosine_similarity, EmbeddingSet};
pub use engine::{KeyConnector, NetworkAnalytics, RebuildSummary, SimilarPerson};
pub use paths::{DiscoveredPath, PathHop, PathPerson};
pub use stats::{BetweennessSummary, GraphStatistics, StatsMode};

/// Analytics errors
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// No graph has been assembled yet
    #[error("graph has not been built; run rebuild first")]
    GraphNotBuilt,

    /// Unknown person id
    #[error("person {0} not found")]
    PersonNotFound(PersonId),

    /// Community index out of range for the partition
    #[error("community {index} not found ({count} communities)")]
    CommunityNotFound { index: usize, count: usize },

    /// Cooperative cancellation tripped
    #[error("operation cancelled")]
    Cancelled,

    /// Store failure during rebuild
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Export failure
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Cost and shape knobs for the analytics engine
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Embedding vector dimension (zero-padded)
    pub embedding_dim: usize,
    /// Betweenness BFS source sample cap (actual sample is min(cap, |V|))
    pub betweenness_sample_size: usize,
    /// Members listed per community inspection
    pub community_top_members: usize,
    /// Headline matches kept per concept in path discovery
    pub concept_candidate_cap: usize,
    /// Hop limit for simple-path enumeration
    pub max_path_len: usize,
    /// Global cap on enumerated paths per discovery call
    pub max_paths: usize,
    /// Paths returned after novelty ranking
    pub top_paths: usize,
    /// Seed for source sampling and tie-breaking; None for entropy
    pub seed: Option<u64>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            embedding_dim: 128,
            betweenness_sample_size: 100,
            community_top_members: 50,
            concept_candidate_cap: 5,
            max_path_len: 4,
            max_paths: 10,
            top_paths: 5,
            seed: None,
        }
    }
}
