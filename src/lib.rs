//! Talent-network graph engine
//!
//! Builds a relationship graph over people from two evidence families:
//! collaboration signals and shared employment. The crate covers the full
//! path from raw employment rows to analytics:
//!
//! - batch aggregation of employment stints and resumable, idempotent
//!   co-employment edge building over a RocksDB-backed store,
//! - in-memory assembly into one undirected graph with merged
//!   parallel relationships and a version counter,
//! - cached analytics: statistics, structural embeddings and similarity,
//!   community detection, key connectors, novelty path discovery,
//! - GraphML and node-link JSON export.
//!
//! # Example Usage
//!
//! ```rust
//! use talentgraph::graph::{PersonId, PersonNode, TalentGraph};
//!
//! let mut graph = TalentGraph::new();
//! let mut ada = PersonNode::new(PersonId::new(1), "Ada");
//! ada.headline = Some("Systems engineer".to_string());
//! graph.add_node(ada);
//! graph.add_node(PersonNode::new(PersonId::new(2), "Grace"));
//!
//! assert_eq!(graph.node_count(), 2);
//! assert!(graph.contains(PersonId::new(1)));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod analytics;
pub mod export;
pub mod graph;
pub mod pipeline;
pub mod store;

// Re-export main types for convenience
pub use graph::{
    CoemploymentAttrs, CoemploymentStint, CollaborationAttrs, EdgeKind, EmployerId,
    GraphAssembler, PairKey, PersonId, PersonNode, RelationEdge, TalentGraph,
};

pub use store::{
    CoemploymentRow, CollaborationRow, PersonRecord, SourceStore, StoreError, StoreResult,
};

pub use pipeline::{
    aggregate_employments, progress_channel, BuildEvent, BuildReport, BuilderConfig,
    CoemploymentEdgeBuilder, EmploymentRecord, EmploymentSpan, PipelineError, PipelineResult,
};

pub use analytics::{
    AnalyticsConfig, AnalyticsError, AnalyticsResult, CancelToken, CommunityAlgorithm,
    CommunityDetail, CommunityPartition, DiscoveredPath, EmbeddingSet, GraphStatistics,
    KeyConnector, NetworkAnalytics, RebuildSummary, SimilarPerson, StatsMode,
};

pub use export::{
    export_graphml, export_node_link, node_link_value, read_node_link, ExportError, ExportResult,
};
