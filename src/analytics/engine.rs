//! The analytics engine
//!
//! `NetworkAnalytics` owns the assembled graph behind an `RwLock` (one
//! writer, many readers) and a mutex-guarded cache of derived values. All
//! cached values are keyed by graph version: a structural mutation bumps
//! the version and every prior entry stops being served, without the
//! mutation path having to know what was cached.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;
use talentgraph_algorithms::GraphView;
use tracing::info;

use crate::export;
use crate::graph::{CacheSlot, CacheStatusEntry, GraphAssembler, PersonId, PersonNode, TalentGraph};
use crate::store::SourceStore;

use super::cancel::CancelToken;
use super::community::{self, CommunityAlgorithm, CommunityDetail, CommunityPartition};
use super::embedding::{self, EmbeddingSet};
use super::paths::{self, DiscoveredPath};
use super::stats::{self, GraphStatistics, StatsMode};
use super::{AnalyticsConfig, AnalyticsError, AnalyticsResult};

/// Outcome of a graph rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub graph_version: u64,
}

/// A similarity search hit
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarPerson {
    pub person_id: PersonId,
    pub name: String,
    pub score: f64,
}

/// A high-betweenness person enriched with profile context
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConnector {
    pub person_id: PersonId,
    pub name: String,
    pub handle: Option<String>,
    pub degree: usize,
    pub betweenness: f64,
}

/// Betweenness results shared between statistics, embeddings and the key
/// connector query. Both shapes come from the same sampled run.
#[derive(Clone)]
struct BetweennessCache {
    by_index: Arc<Vec<f64>>,
    by_person: Arc<FxHashMap<PersonId, f64>>,
    sources_sampled: usize,
}

struct StatCache {
    view: CacheSlot<Arc<GraphView>>,
    statistics: CacheSlot<GraphStatistics>,
    betweenness: CacheSlot<BetweennessCache>,
    embeddings: CacheSlot<Arc<EmbeddingSet>>,
}

impl StatCache {
    fn new() -> Self {
        StatCache {
            view: CacheSlot::new(),
            statistics: CacheSlot::new(),
            betweenness: CacheSlot::new(),
            embeddings: CacheSlot::new(),
        }
    }

    fn clear(&mut self) {
        self.view.clear();
        self.statistics.clear();
        self.betweenness.clear();
        self.embeddings.clear();
    }
}

/// Shared, cached analytics over one assembled [`TalentGraph`]
pub struct NetworkAnalytics {
    config: AnalyticsConfig,
    graph: RwLock<Option<TalentGraph>>,
    cache: Mutex<StatCache>,
}

impl NetworkAnalytics {
    pub fn new(config: AnalyticsConfig) -> Self {
        NetworkAnalytics {
            config,
            graph: RwLock::new(None),
            cache: Mutex::new(StatCache::new()),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn is_built(&self) -> bool {
        self.read_graph().is_some()
    }

    /// Assemble the graph from the store, replacing any previous graph and
    /// dropping the whole cache.
    pub fn rebuild(
        &self,
        store: &SourceStore,
        node_limit: Option<usize>,
    ) -> AnalyticsResult<RebuildSummary> {
        let graph = GraphAssembler::assemble(store, node_limit)?;
        let summary = RebuildSummary {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            graph_version: graph.version(),
        };

        *self.write_graph() = Some(graph);
        self.lock_cache().clear();
        info!(
            nodes = summary.node_count,
            edges = summary.edge_count,
            "analytics graph rebuilt"
        );
        Ok(summary)
    }

    /// Add a person to the live graph. Returns false when the id already
    /// exists. Insertion bumps the graph version, so previously cached
    /// values stop being served and show up stale in [`Self::cache_status`].
    pub fn add_person(&self, node: PersonNode) -> AnalyticsResult<bool> {
        let mut guard = self.write_graph();
        let graph = guard.as_mut().ok_or(AnalyticsError::GraphNotBuilt)?;
        Ok(graph.add_node(node))
    }

    /// Staleness inspection for every populated cache slot.
    pub fn cache_status(&self) -> AnalyticsResult<Vec<CacheStatusEntry>> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        let version = graph.version();

        let cache = self.lock_cache();
        Ok([
            cache.statistics.status("statistics", version),
            cache.betweenness.status("betweenness", version),
            cache.embeddings.status("embeddings", version),
        ]
        .into_iter()
        .flatten()
        .collect())
    }

    /// Whole-graph statistics. Full mode adds sampled betweenness and
    /// caches the betweenness map for later queries.
    pub fn statistics(
        &self,
        mode: StatsMode,
        token: &CancelToken,
    ) -> AnalyticsResult<GraphStatistics> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        let version = graph.version();

        {
            let cache = self.lock_cache();
            if let Some(cached) = cache.statistics.get(version) {
                // Full-mode results satisfy fast-mode requests, not the
                // other way round.
                if mode == StatsMode::Fast || cached.betweenness.is_some() {
                    return Ok(cached.clone());
                }
            }
        }

        let view = self.view_for(graph);
        let betweenness = match mode {
            StatsMode::Fast => None,
            StatsMode::Full => Some(self.betweenness_for(graph, &view, token)?),
        };
        let statistics = stats::compute_statistics(
            graph,
            &view,
            betweenness
                .as_ref()
                .map(|b| (b.by_person.as_ref(), b.sources_sampled)),
            token,
        )?;

        self.lock_cache().statistics.put(statistics.clone(), version);
        Ok(statistics)
    }

    /// Structural embeddings for every node, built lazily per graph
    /// version.
    pub fn embeddings(&self, token: &CancelToken) -> AnalyticsResult<Arc<EmbeddingSet>> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        let view = self.view_for(graph);
        self.embeddings_for(graph, &view, token)
    }

    /// People most structurally similar to `person`.
    pub fn find_similar(
        &self,
        person: PersonId,
        k: usize,
        min_similarity: f64,
        token: &CancelToken,
    ) -> AnalyticsResult<Vec<SimilarPerson>> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        if !graph.contains(person) {
            return Err(AnalyticsError::PersonNotFound(person));
        }

        let view = self.view_for(graph);
        let embeddings = self.embeddings_for(graph, &view, token)?;
        let ranked = embedding::rank_similar(&embeddings, person, k, min_similarity)
            .ok_or(AnalyticsError::PersonNotFound(person))?;

        Ok(ranked
            .into_iter()
            .map(|(id, score)| SimilarPerson {
                person_id: id,
                name: graph.node(id).map(|n| n.name.clone()).unwrap_or_default(),
                score,
            })
            .collect())
    }

    pub fn detect_communities(
        &self,
        algorithm: CommunityAlgorithm,
        token: &CancelToken,
    ) -> AnalyticsResult<CommunityPartition> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        let view = self.view_for(graph);
        community::detect(graph, &view, algorithm, self.config.seed, token)
    }

    pub fn inspect_community(
        &self,
        partition: &CommunityPartition,
        index: usize,
    ) -> AnalyticsResult<CommunityDetail> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        community::inspect(graph, partition, index, self.config.community_top_members)
    }

    /// People whose sampled betweenness is at or above `min_betweenness`,
    /// highest first.
    pub fn key_connectors(
        &self,
        min_betweenness: f64,
        token: &CancelToken,
    ) -> AnalyticsResult<Vec<KeyConnector>> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        let view = self.view_for(graph);
        let betweenness = self.betweenness_for(graph, &view, token)?;

        let mut connectors: Vec<KeyConnector> = betweenness
            .by_person
            .iter()
            .filter(|&(_, &score)| score >= min_betweenness)
            .map(|(&id, &score)| {
                let node = graph.node(id);
                KeyConnector {
                    person_id: id,
                    name: node.map(|n| n.name.clone()).unwrap_or_default(),
                    handle: node.and_then(|n| n.handle().map(str::to_string)),
                    degree: graph.degree(id),
                    betweenness: score,
                }
            })
            .collect();
        connectors.sort_by(|x, y| {
            y.betweenness
                .total_cmp(&x.betweenness)
                .then(x.person_id.cmp(&y.person_id))
        });
        Ok(connectors)
    }

    /// Bounded simple paths between two headline concepts, ranked by
    /// structural novelty.
    pub fn discover_paths(
        &self,
        concept_a: &str,
        concept_b: &str,
        token: &CancelToken,
    ) -> AnalyticsResult<Vec<DiscoveredPath>> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        let view = self.view_for(graph);
        let embeddings = self.embeddings_for(graph, &view, token)?;
        paths::discover(
            graph,
            &view,
            &embeddings,
            &self.config,
            concept_a,
            concept_b,
            token,
        )
    }

    pub fn export_graphml(&self, path: impl AsRef<Path>) -> AnalyticsResult<()> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        export::export_graphml(graph, path)?;
        Ok(())
    }

    pub fn export_node_link(&self, path: impl AsRef<Path>) -> AnalyticsResult<()> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        export::export_node_link(graph, path)?;
        Ok(())
    }

    pub fn node_link_value(&self) -> AnalyticsResult<serde_json::Value> {
        let guard = self.read_graph();
        let graph = guard.as_ref().ok_or(AnalyticsError::GraphNotBuilt)?;
        Ok(export::node_link_value(graph)?)
    }

    fn view_for(&self, graph: &TalentGraph) -> Arc<GraphView> {
        let mut cache = self.lock_cache();
        if let Some(view) = cache.view.get(graph.version()) {
            return view.clone();
        }
        let view = Arc::new(graph.to_view());
        cache.view.put(view.clone(), graph.version());
        view
    }

    fn betweenness_for(
        &self,
        graph: &TalentGraph,
        view: &GraphView,
        token: &CancelToken,
    ) -> AnalyticsResult<BetweennessCache> {
        let version = graph.version();
        {
            let cache = self.lock_cache();
            if let Some(cached) = cache.betweenness.get(version) {
                return Ok(cached.clone());
            }
        }

        let (scores, sources_sampled) = stats::sampled_betweenness(
            view,
            self.config.betweenness_sample_size,
            self.config.seed,
            token,
        )?;
        let entry = BetweennessCache {
            by_person: Arc::new(stats::betweenness_by_person(view, &scores)),
            by_index: Arc::new(scores),
            sources_sampled,
        };
        self.lock_cache().betweenness.put(entry.clone(), version);
        Ok(entry)
    }

    fn embeddings_for(
        &self,
        graph: &TalentGraph,
        view: &GraphView,
        token: &CancelToken,
    ) -> AnalyticsResult<Arc<EmbeddingSet>> {
        let version = graph.version();
        {
            let cache = self.lock_cache();
            if let Some(cached) = cache.embeddings.get(version) {
                return Ok(cached.clone());
            }
        }

        let betweenness = self.betweenness_for(graph, view, token)?;
        let set = Arc::new(EmbeddingSet::build(
            graph,
            view,
            &betweenness.by_index,
            self.config.embedding_dim,
        ));
        self.lock_cache().embeddings.put(set.clone(), version);
        Ok(set)
    }

    // Poisoned locks are recovered rather than propagated: the graph and
    // cache stay structurally valid even if a panicking reader died.
    fn read_graph(&self) -> RwLockReadGuard<'_, Option<TalentGraph>> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_graph(&self) -> RwLockWriteGuard<'_, Option<TalentGraph>> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cache(&self) -> MutexGuard<'_, StatCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NetworkAnalytics {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CollaborationRow, PersonRecord};
    use tempfile::TempDir;

    fn person(id: u64, name: &str, headline: Option<&str>) -> PersonRecord {
        PersonRecord {
            person_id: PersonId::new(id),
            full_name: name.to_string(),
            headline: headline.map(str::to_string),
            location: None,
            external_handle: None,
            external_follower_count: None,
            external_repo_count: None,
        }
    }

    fn seeded_engine(dir: &TempDir) -> NetworkAnalytics {
        let store = SourceStore::open(dir.path()).unwrap();
        let records: Vec<PersonRecord> = (1..=5)
            .map(|id| person(id, &format!("p{id}"), Some("engineer")))
            .collect();
        store.put_persons(&records).unwrap();
        // A 5-path: 1-2-3-4-5.
        for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5)] {
            let row =
                CollaborationRow::new(PersonId::new(a), PersonId::new(b), 1.0, None, None)
                    .unwrap();
            store.put_collaboration(&row).unwrap();
        }

        let engine = NetworkAnalytics::new(AnalyticsConfig {
            seed: Some(42),
            ..Default::default()
        });
        engine.rebuild(&store, None).unwrap();
        engine
    }

    #[test]
    fn test_operations_require_built_graph() {
        let engine = NetworkAnalytics::default();
        let token = CancelToken::new();
        assert!(matches!(
            engine.statistics(StatsMode::Fast, &token),
            Err(AnalyticsError::GraphNotBuilt)
        ));
        assert!(matches!(
            engine.cache_status(),
            Err(AnalyticsError::GraphNotBuilt)
        ));
    }

    #[test]
    fn test_full_statistics_cache_and_reuse() {
        let dir = TempDir::new().unwrap();
        let engine = seeded_engine(&dir);
        let token = CancelToken::new();

        let full = engine.statistics(StatsMode::Full, &token).unwrap();
        assert_eq!(full.node_count, 5);
        assert_eq!(full.edge_count, 4);
        assert!(full.connected);
        assert_eq!(full.betweenness.as_ref().unwrap().sources_sampled, 5);

        // Fast request is served from the cached full result.
        let fast = engine.statistics(StatsMode::Fast, &token).unwrap();
        assert_eq!(fast, full);

        let status = engine.cache_status().unwrap();
        assert!(status.iter().any(|e| e.name == "statistics" && !e.stale));
        assert!(status.iter().any(|e| e.name == "betweenness" && !e.stale));
    }

    #[test]
    fn test_add_person_staleness() {
        let dir = TempDir::new().unwrap();
        let engine = seeded_engine(&dir);
        let token = CancelToken::new();
        engine.statistics(StatsMode::Full, &token).unwrap();

        let added = engine
            .add_person(PersonNode::new(PersonId::new(99), "new hire"))
            .unwrap();
        assert!(added);
        // Duplicate insert is a no-op.
        assert!(!engine
            .add_person(PersonNode::new(PersonId::new(99), "dup"))
            .unwrap());

        let status = engine.cache_status().unwrap();
        assert!(status.iter().all(|e| e.stale));

        // A fresh computation sees the new node.
        let stats = engine.statistics(StatsMode::Fast, &token).unwrap();
        assert_eq!(stats.node_count, 6);
        assert!(!stats.connected);
    }

    #[test]
    fn test_key_connectors_ranked_by_betweenness() {
        let dir = TempDir::new().unwrap();
        let engine = seeded_engine(&dir);
        let token = CancelToken::new();

        let connectors = engine.key_connectors(0.5, &token).unwrap();
        // On the 5-path, the middle node carries the most shortest paths.
        assert_eq!(connectors[0].person_id, PersonId::new(3));
        for pair in connectors.windows(2) {
            assert!(pair[0].betweenness >= pair[1].betweenness);
        }
        // Endpoints sit below the threshold.
        assert!(connectors.iter().all(|c| c.betweenness >= 0.5));
    }

    #[test]
    fn test_find_similar_unknown_person() {
        let dir = TempDir::new().unwrap();
        let engine = seeded_engine(&dir);
        assert!(matches!(
            engine.find_similar(PersonId::new(404), 3, 0.0, &CancelToken::new()),
            Err(AnalyticsError::PersonNotFound(_))
        ));
    }

    #[test]
    fn test_cancellation_interrupts_full_statistics() {
        let dir = TempDir::new().unwrap();
        let engine = seeded_engine(&dir);
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            engine.statistics(StatsMode::Full, &token),
            Err(AnalyticsError::Cancelled)
        ));
    }
}
