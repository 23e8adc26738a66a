//! In-memory graph assembly
//!
//! Loads person nodes and both edge families from the source store into
//! one undirected multi-attribute graph, merging parallel relationships
//! between the same pair onto a single edge. The assembled graph carries a
//! version counter: structural mutations bump it, and every cached derived
//! value is keyed to the version it was computed against.

use super::edge::{CoemploymentStint, CollaborationAttrs, RelationEdge};
use super::node::PersonNode;
use super::types::{PairKey, PersonId};
use crate::store::{CoemploymentRow, CollaborationRow, SourceStore, StoreResult};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use talentgraph_algorithms::GraphView;
use tracing::{debug, info};

/// The assembled talent graph: one node per person, at most one edge per
/// unordered pair.
///
/// Shared-state discipline: one writer (rebuild / `add_node`) at a time,
/// any number of readers between mutations. The analytics engine enforces
/// this with an RwLock; the graph itself only provides the version
/// counter that keeps cached derived values honest.
#[derive(Debug, Clone)]
pub struct TalentGraph {
    nodes: IndexMap<PersonId, PersonNode>,
    edges: FxHashMap<PairKey, RelationEdge>,
    adjacency: FxHashMap<PersonId, Vec<PersonId>>,
    version: u64,
}

impl TalentGraph {
    pub fn new() -> Self {
        TalentGraph {
            nodes: IndexMap::new(),
            edges: FxHashMap::default(),
            adjacency: FxHashMap::default(),
            version: 1,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Monotonic version, bumped on every structural mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: PersonId) -> Option<&PersonNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PersonNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &RelationEdge> {
        self.edges.values()
    }

    pub fn edge(&self, x: PersonId, y: PersonId) -> Option<&RelationEdge> {
        PairKey::new(x, y).and_then(|pair| self.edges.get(&pair))
    }

    pub fn neighbors(&self, id: PersonId) -> &[PersonId] {
        self.adjacency.get(&id).map_or(&[], Vec::as_slice)
    }

    pub fn degree(&self, id: PersonId) -> usize {
        self.neighbors(id).len()
    }

    /// Undirected graph density.
    pub fn density(&self) -> f64 {
        let n = self.nodes.len();
        if n < 2 {
            return 0.0;
        }
        2.0 * self.edges.len() as f64 / (n as f64 * (n as f64 - 1.0))
    }

    /// Add a person node after assembly. Returns false (no-op) when the id
    /// already exists; on insertion the graph version is bumped, which
    /// invalidates every cached stat computed before the mutation.
    pub fn add_node(&mut self, node: PersonNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.insert_node(node);
        self.version += 1;
        true
    }

    fn insert_node(&mut self, node: PersonNode) {
        self.adjacency.entry(node.id).or_default();
        self.nodes.insert(node.id, node);
    }

    /// Merge a collaboration row onto the pair's edge. Returns false when
    /// either endpoint is not a loaded node.
    pub(crate) fn apply_collaboration(&mut self, row: &CollaborationRow) -> bool {
        let pair = row.pair;
        if !self.contains(pair.a()) || !self.contains(pair.b()) {
            return false;
        }

        let edge = self.edge_entry(pair);
        edge.collaboration = Some(CollaborationAttrs {
            strength: row.strength,
            shared_repo_count: row.shared_repo_count.unwrap_or(0),
            shared_contribution_count: row.shared_contribution_count.unwrap_or(0),
        });
        true
    }

    /// Merge one persisted co-employment row (one stint at one employer)
    /// onto the pair's edge. Returns false when either endpoint is not a
    /// loaded node.
    pub(crate) fn apply_coemployment(&mut self, row: &CoemploymentRow) -> bool {
        let pair = row.pair;
        if !self.contains(pair.a()) || !self.contains(pair.b()) {
            return false;
        }

        let edge = self.edge_entry(pair);
        edge.coemployment
            .get_or_insert_with(Default::default)
            .push_stint(CoemploymentStint {
                employer_id: row.employer_id,
                overlap_months: row.overlap_months,
                overlap_start: row.overlap_start,
                overlap_end: row.overlap_end,
            });
        true
    }

    /// Install a fully-formed edge, e.g. when reconstructing a graph from
    /// an export. Returns false when either endpoint is missing.
    pub(crate) fn insert_edge(&mut self, edge: RelationEdge) -> bool {
        let pair = edge.pair;
        if !self.contains(pair.a()) || !self.contains(pair.b()) {
            return false;
        }
        *self.edge_entry(pair) = edge;
        true
    }

    fn edge_entry(&mut self, pair: PairKey) -> &mut RelationEdge {
        if !self.edges.contains_key(&pair) {
            self.adjacency.entry(pair.a()).or_default().push(pair.b());
            self.adjacency.entry(pair.b()).or_default().push(pair.a());
        }
        self.edges
            .entry(pair)
            .or_insert_with(|| RelationEdge::new(pair))
    }

    /// Project the graph into the dense topology view the algorithms crate
    /// works on. Edge weight is the combined strength, floored at 1.0 so
    /// relationships of unknown strength still count as presence.
    pub fn to_view(&self) -> GraphView {
        let nodes: Vec<u64> = self.nodes.keys().map(|id| id.as_u64()).collect();
        let edges: Vec<(u64, u64, f64)> = self
            .edges
            .values()
            .map(|e| {
                (
                    e.pair.a().as_u64(),
                    e.pair.b().as_u64(),
                    e.combined_strength().max(1.0),
                )
            })
            .collect();
        GraphView::from_edges(&nodes, &edges)
    }
}

impl Default for TalentGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles a [`TalentGraph`] from the source store.
pub struct GraphAssembler;

impl GraphAssembler {
    /// Load person nodes (optionally capped at `node_limit` for
    /// cost-bounded interactive use) and both edge families. Edges whose
    /// endpoints were not both loaded are skipped, as are self-pairs.
    pub fn assemble(store: &SourceStore, node_limit: Option<usize>) -> StoreResult<TalentGraph> {
        let mut graph = TalentGraph::new();

        for record in store.scan_persons(node_limit)? {
            graph.insert_node(record.into());
        }

        let mut skipped = 0usize;
        for row in store.scan_collaborations()? {
            if !graph.apply_collaboration(&row) {
                skipped += 1;
            }
        }
        for row in store.scan_coemployment()? {
            if !graph.apply_coemployment(&row) {
                skipped += 1;
            }
        }

        if skipped > 0 {
            debug!(skipped, "edge rows dropped: endpoint outside loaded node set");
        }
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph assembled"
        );

        Ok(graph)
    }
}
