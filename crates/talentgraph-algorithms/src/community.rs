//! Community detection over a [`GraphView`]
//!
//! Three variants with different quality/cost trade-offs:
//! label propagation (cheap), greedy modularity merging (midsize graphs),
//! and Louvain (preferred, behind the `louvain` feature). Connected
//! components live here too since they share the partition output shape.

use super::common::GraphView;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

/// A partition of the node set into disjoint groups of dense indices.
///
/// `assignment[i]` is the group of node index `i`; `groups` lists members
/// per group. Group ids are ordinals valid only for this partition.
pub struct Partition {
    pub groups: Vec<Vec<usize>>,
    pub assignment: Vec<usize>,
}

impl Partition {
    /// Build a partition from a raw per-node label vector, compacting
    /// labels to consecutive group ids ordered by first appearance.
    pub fn from_labels(labels: &[usize]) -> Self {
        let mut remap: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut assignment = Vec::with_capacity(labels.len());

        for (idx, &label) in labels.iter().enumerate() {
            let group = *remap.entry(label).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(idx);
            assignment.push(group);
        }

        Partition { groups, assignment }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]); // Path compression
        }
        self.parent[i]
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Connected components of the undirected graph.
pub fn connected_components(view: &GraphView) -> Partition {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u in 0..n {
        for &v in &view.neighbors[u] {
            uf.union(u, v);
        }
    }

    let labels: Vec<usize> = (0..n).map(|i| uf.find(i)).collect();
    Partition::from_labels(&labels)
}

/// Label propagation community detection.
///
/// Each node repeatedly adopts the label carrying the most incident edge
/// weight among its neighbors, visiting nodes in a shuffled order each
/// sweep. Converges when a full sweep changes nothing or after
/// `max_iters` sweeps. On a tie the node keeps its current label if that
/// label is among the maxima, otherwise it picks among them at random.
pub fn label_propagation(view: &GraphView, max_iters: usize, seed: Option<u64>) -> Partition {
    let n = view.node_count;
    let mut labels: Vec<usize> = (0..n).collect();
    if n == 0 {
        return Partition::from_labels(&labels);
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..n).collect();

    for _ in 0..max_iters {
        order.shuffle(&mut rng);
        let mut changed = false;

        for &u in &order {
            if view.neighbors[u].is_empty() {
                continue;
            }

            let mut tally: HashMap<usize, f64> = HashMap::new();
            for (pos, &v) in view.neighbors[u].iter().enumerate() {
                *tally.entry(labels[v]).or_insert(0.0) += view.weight_at(u, pos);
            }

            let max_weight = tally.values().cloned().fold(f64::NEG_INFINITY, f64::max);
            let mut maxima: Vec<usize> = tally
                .into_iter()
                .filter(|&(_, w)| (w - max_weight).abs() < 1e-12)
                .map(|(label, _)| label)
                .collect();
            maxima.sort_unstable();

            let best_label = if maxima.contains(&labels[u]) {
                labels[u]
            } else {
                *maxima.choose(&mut rng).unwrap_or(&labels[u])
            };

            if best_label != labels[u] {
                labels[u] = best_label;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    Partition::from_labels(&labels)
}

/// Modularity of a partition given as a per-node assignment.
pub fn modularity(view: &GraphView, assignment: &[usize]) -> f64 {
    let m = view.total_weight();
    if m <= 0.0 {
        return 0.0;
    }

    let group_count = assignment.iter().copied().max().map_or(0, |g| g + 1);
    let mut internal = vec![0.0; group_count];
    let mut degree = vec![0.0; group_count];

    for u in 0..view.node_count {
        degree[assignment[u]] += view.weighted_degree(u);
        for (pos, &v) in view.neighbors[u].iter().enumerate() {
            if u < v && assignment[u] == assignment[v] {
                internal[assignment[u]] += view.weight_at(u, pos);
            }
        }
    }

    (0..group_count)
        .map(|c| internal[c] / m - (degree[c] / (2.0 * m)).powi(2))
        .sum()
}

/// Greedy modularity community detection (agglomerative).
///
/// Starts from singleton communities and repeatedly merges the connected
/// community pair with the largest positive modularity gain. Stops when no
/// merge improves modularity.
pub fn greedy_modularity(view: &GraphView) -> Partition {
    let n = view.node_count;
    let m = view.total_weight();
    let mut labels: Vec<usize> = (0..n).collect();
    if n == 0 || m <= 0.0 {
        return Partition::from_labels(&labels);
    }

    let mut degree: Vec<f64> = (0..n).map(|i| view.weighted_degree(i)).collect();
    // between[(a, b)] with a < b: total edge weight between communities a, b
    let mut between: HashMap<(usize, usize), f64> = HashMap::new();
    for u in 0..n {
        for (pos, &v) in view.neighbors[u].iter().enumerate() {
            if u < v {
                *between.entry((u, v)).or_insert(0.0) += view.weight_at(u, pos);
            }
        }
    }

    loop {
        let mut best: Option<((usize, usize), f64)> = None;
        for (&pair, &w) in &between {
            let (a, b) = pair;
            let gain = w / m - degree[a] * degree[b] / (2.0 * m * m);
            if gain > best.map_or(1e-12, |(_, g)| g) {
                best = Some((pair, gain));
            }
        }

        let Some(((a, b), _)) = best else { break };

        // Merge b into a.
        degree[a] += degree[b];
        degree[b] = 0.0;
        for label in labels.iter_mut() {
            if *label == b {
                *label = a;
            }
        }

        // Re-route b's inter-community weights to a.
        let stale: Vec<((usize, usize), f64)> = between
            .iter()
            .filter(|(&(x, y), _)| x == b || y == b)
            .map(|(&k, &v)| (k, v))
            .collect();
        for ((x, y), w) in stale {
            between.remove(&(x, y));
            let other = if x == b { y } else { x };
            if other == a {
                continue; // now internal to the merged community
            }
            let key = if other < a { (other, a) } else { (a, other) };
            *between.entry(key).or_insert(0.0) += w;
        }
    }

    Partition::from_labels(&labels)
}

/// Whether the Louvain variant was compiled in.
pub fn louvain_available() -> bool {
    cfg!(feature = "louvain")
}

/// Louvain community detection.
///
/// Standard two-phase loop: local moves that maximize modularity gain,
/// then aggregation of communities into super-nodes, repeated until no
/// pass improves modularity.
#[cfg(feature = "louvain")]
pub fn louvain(view: &GraphView, seed: Option<u64>) -> Partition {
    let n = view.node_count;
    if n == 0 {
        return Partition::from_labels(&[]);
    }

    // node (original index) -> community label, refined across levels
    let mut final_labels: Vec<usize> = (0..n).collect();

    // Working copy of the graph as weighted adjacency maps.
    let mut adj: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];
    let mut self_loops: Vec<f64> = vec![0.0; n];
    for u in 0..n {
        for (pos, &v) in view.neighbors[u].iter().enumerate() {
            *adj[u].entry(v).or_insert(0.0) += view.weight_at(u, pos);
        }
    }
    // node of the working graph -> set of original nodes it represents
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

    let m = view.total_weight();
    if m <= 0.0 {
        return Partition::from_labels(&final_labels);
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    loop {
        let count = adj.len();
        let degree: Vec<f64> = (0..count)
            .map(|i| adj[i].values().sum::<f64>() + 2.0 * self_loops[i])
            .collect();

        let mut community: Vec<usize> = (0..count).collect();
        let mut comm_degree: Vec<f64> = degree.clone();

        let mut order: Vec<usize> = (0..count).collect();
        order.shuffle(&mut rng);

        let mut moved_any = false;
        loop {
            let mut moved = false;
            for &u in &order {
                let current = community[u];

                // Weight from u to each neighboring community.
                let mut links: HashMap<usize, f64> = HashMap::new();
                for (&v, &w) in &adj[u] {
                    if v != u {
                        *links.entry(community[v]).or_insert(0.0) += w;
                    }
                }

                // Detach u from its community.
                comm_degree[current] -= degree[u];
                let to_current = links.get(&current).copied().unwrap_or(0.0);

                let mut best_comm = current;
                let mut best_gain = to_current / m - comm_degree[current] * degree[u] / (2.0 * m * m);
                let mut targets: Vec<(usize, f64)> = links.into_iter().collect();
                targets.sort_by_key(|&(c, _)| c);
                for (c, w) in targets {
                    let gain = w / m - comm_degree[c] * degree[u] / (2.0 * m * m);
                    if gain > best_gain + 1e-12 {
                        best_gain = gain;
                        best_comm = c;
                    }
                }

                comm_degree[best_comm] += degree[u];
                if best_comm != current {
                    community[u] = best_comm;
                    moved = true;
                    moved_any = true;
                }
            }
            if !moved {
                break;
            }
        }

        if !moved_any {
            break;
        }

        // Compact community ids and record them for the original nodes.
        let mut remap: HashMap<usize, usize> = HashMap::new();
        for &c in &community {
            let next = remap.len();
            remap.entry(c).or_insert(next);
        }
        let new_count = remap.len();

        for (u, &c) in community.iter().enumerate() {
            let compact = remap[&c];
            for &orig in &members[u] {
                final_labels[orig] = compact;
            }
        }

        if new_count == count {
            break;
        }

        // Aggregate into the next-level graph.
        let mut new_adj: Vec<HashMap<usize, f64>> = vec![HashMap::new(); new_count];
        let mut new_self: Vec<f64> = vec![0.0; new_count];
        let mut new_members: Vec<Vec<usize>> = vec![Vec::new(); new_count];

        for u in 0..count {
            let cu = remap[&community[u]];
            new_members[cu].append(&mut members[u]);
            new_self[cu] += self_loops[u];
            for (&v, &w) in &adj[u] {
                let cv = remap[&community[v]];
                if cu == cv {
                    if u < v {
                        new_self[cu] += w;
                    }
                } else {
                    *new_adj[cu].entry(cv).or_insert(0.0) += w;
                }
            }
        }

        adj = new_adj;
        self_loops = new_self;
        members = new_members;
    }

    Partition::from_labels(&final_labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two 4-cliques joined by a single weaker bridge edge.
    fn two_cliques() -> GraphView {
        let nodes: Vec<u64> = (0..8).collect();
        let mut edges = Vec::new();
        for base in [0u64, 4u64] {
            for i in base..base + 4 {
                for j in (i + 1)..base + 4 {
                    edges.push((i, j, 2.0));
                }
            }
        }
        edges.push((3, 4, 1.0)); // bridge
        GraphView::from_edges(&nodes, &edges)
    }

    fn assert_two_clique_split(partition: &Partition, view: &GraphView) {
        assert_eq!(partition.groups.len(), 2);
        let total: usize = partition.groups.iter().map(Vec::len).sum();
        assert_eq!(total, view.node_count);

        let g0 = partition.assignment[view.node_to_index[&0]];
        for id in 1..4u64 {
            assert_eq!(partition.assignment[view.node_to_index[&id]], g0);
        }
        let g4 = partition.assignment[view.node_to_index[&4]];
        assert_ne!(g0, g4);
        for id in 5..8u64 {
            assert_eq!(partition.assignment[view.node_to_index[&id]], g4);
        }
    }

    #[test]
    fn test_connected_components() {
        // 1-2, 3-4-5, 6 isolated
        let nodes = vec![1, 2, 3, 4, 5, 6];
        let edges = vec![(1, 2, 1.0), (3, 4, 1.0), (4, 5, 1.0)];
        let view = GraphView::from_edges(&nodes, &edges);

        let result = connected_components(&view);
        assert_eq!(result.groups.len(), 3);

        let c1 = result.assignment[view.node_to_index[&1]];
        let c2 = result.assignment[view.node_to_index[&2]];
        assert_eq!(c1, c2);

        let c3 = result.assignment[view.node_to_index[&3]];
        let c5 = result.assignment[view.node_to_index[&5]];
        assert_eq!(c3, c5);
        assert_ne!(c1, c3);
    }

    #[test]
    fn test_label_propagation_two_cliques() {
        let view = two_cliques();
        let partition = label_propagation(&view, 20, Some(7));
        assert_two_clique_split(&partition, &view);
    }

    #[test]
    fn test_greedy_modularity_two_cliques() {
        let view = two_cliques();
        let partition = greedy_modularity(&view);
        assert_two_clique_split(&partition, &view);
    }

    #[cfg(feature = "louvain")]
    #[test]
    fn test_louvain_two_cliques() {
        let view = two_cliques();
        let partition = louvain(&view, Some(7));
        assert_two_clique_split(&partition, &view);
    }

    #[test]
    fn test_partition_disjoint_and_covering() {
        let view = two_cliques();
        let partition = label_propagation(&view, 20, Some(1));

        let mut seen = vec![false; view.node_count];
        for group in &partition.groups {
            for &idx in group {
                assert!(!seen[idx], "node {idx} appears in two groups");
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_modularity_of_split_beats_trivial() {
        let view = two_cliques();
        let split = greedy_modularity(&view);
        let trivial = vec![0usize; view.node_count];
        assert!(modularity(&view, &split.assignment) > modularity(&view, &trivial));
    }
}
