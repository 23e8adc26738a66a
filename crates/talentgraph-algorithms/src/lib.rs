//! Pure-topology graph algorithms for the talentgraph engine.
//!
//! Everything here operates on a dense, integer-indexed [`GraphView`];
//! callers own the mapping between domain identifiers and dense indices.

pub mod centrality;
pub mod common;
pub mod community;
pub mod pathfinding;
pub mod topology;

pub use centrality::{betweenness_from_sources, sample_sources, scale_betweenness};
pub use common::{GraphView, NodeId};
pub use community::{
    connected_components, greedy_modularity, label_propagation, louvain_available, modularity,
    Partition,
};
#[cfg(feature = "louvain")]
pub use community::louvain;
pub use pathfinding::simple_paths;
pub use topology::{average_clustering, average_neighbor_degree, local_clustering};
