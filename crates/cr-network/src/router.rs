//! Routing trait and the default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Callers route through the [`Router`] trait, so an application can swap in
//! another engine without touching the collection optimizer.  The default
//! [`DijkstraRouter`] runs over the costs the graph was annotated with.
//!
//! # Determinism
//!
//! Among equal-cost paths the engine prefers fewer hops, then the
//! lexicographically smaller sequence of node keys.  Queue entries are
//! ordered by `(cost, hops, node)`, so every predecessor that could tie for a
//! node is settled before that node is, and its path is final when compared.
//!
//! Costs are compared at [`COST_RESOLUTION`], so two paths whose summed
//! costs differ only by floating-point rounding count as equal and the hop
//! and key tie-break applies.
//!
//! # Exclusions
//!
//! Blocked edges and nodes are applied through an [`Exclusions`] set that is
//! resolved into a per-query mask.  The graph is never modified, so the same
//! snapshot can be re-queried with a different exclusion set.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use cr_core::{EdgeId, EdgeKey, GeoPoint, NodeId, NodeKey};

use crate::network::GeoGraph;
use crate::records::BlockedRoad;
use crate::SpatialResult;

/// Costs closer than this are treated as equal when ordering labels.
pub const COST_RESOLUTION: f64 = 1e-6;

#[inline]
fn quantize(cost: f64) -> f64 {
    (cost / COST_RESOLUTION).round()
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// A concrete path through one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Nodes in travel order, including both endpoints.
    pub nodes: Vec<NodeId>,
    /// Edges in travel order.  `edges.len() == nodes.len() - 1`.
    pub edges: Vec<EdgeId>,
    /// Sum of edge lengths in metres.
    pub distance_m: f64,
    /// Sum of edge costs.
    pub cost: f64,
}

impl Path {
    fn trivial(node: NodeId) -> Self {
        Path { nodes: vec![node], edges: vec![], distance_m: 0.0, cost: 0.0 }
    }

    pub fn hops(&self) -> usize {
        self.edges.len()
    }

    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// External keys of the visited nodes.
    pub fn keys<'g>(&self, graph: &'g GeoGraph) -> Vec<&'g NodeKey> {
        self.nodes.iter().map(|&n| graph.key(n)).collect()
    }

    /// Node coordinates, for line geometry.
    pub fn points(&self, graph: &GeoGraph) -> Vec<GeoPoint> {
        self.nodes.iter().map(|&n| graph.pos(n)).collect()
    }
}

/// Result of a point-to-point query.  "No route" is an expected outcome in
/// disaster mode, so it is a value rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    Found(Path),
    NotFound,
}

impl PathOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, PathOutcome::Found(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            PathOutcome::Found(p) => Some(p),
            PathOutcome::NotFound => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            PathOutcome::Found(p) => Some(p),
            PathOutcome::NotFound => None,
        }
    }

    pub fn cost(&self) -> Option<f64> {
        self.path().map(|p| p.cost)
    }
}

// ── Exclusions ────────────────────────────────────────────────────────────────

/// Segments and nodes a query must avoid.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    edges: FxHashSet<EdgeKey>,
    nodes: FxHashSet<NodeKey>,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude every segment named by `blocks`.
    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a BlockedRoad>) -> Self {
        let mut ex = Self::new();
        for block in blocks {
            ex.edges.insert(block.edge.clone());
        }
        ex
    }

    pub fn edge(mut self, key: impl Into<EdgeKey>) -> Self {
        self.edges.insert(key.into());
        self
    }

    pub fn node(mut self, key: impl Into<NodeKey>) -> Self {
        self.nodes.insert(key.into());
        self
    }

    pub fn insert_edge(&mut self, key: EdgeKey) {
        self.edges.insert(key);
    }

    pub fn insert_node(&mut self, key: NodeKey) {
        self.nodes.insert(key);
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.nodes.is_empty()
    }

    pub fn contains_edge(&self, key: &EdgeKey) -> bool {
        self.edges.contains(key)
    }
}

/// Exclusions resolved against one graph.  Both directions of a two-way
/// segment share a `SegmentId`, so excluding a segment key closes both.
pub(crate) struct ExclusionMask {
    segment: Vec<bool>,
    node: Vec<bool>,
}

impl ExclusionMask {
    /// `honour_blocked_flags = false` gives the unrestricted view used as a
    /// disaster-mode baseline.
    pub(crate) fn resolve(graph: &GeoGraph, ex: &Exclusions, honour_blocked_flags: bool) -> Self {
        let mut segment = vec![false; graph.segment_count()];
        let mut node = vec![false; graph.node_count()];

        for key in &ex.edges {
            match graph.segment_id(key) {
                Some(id) => segment[id.index()] = true,
                None => debug!(segment = %key, "exclusion names a segment not in the graph"),
            }
        }
        for key in &ex.nodes {
            match graph.node_id(key) {
                Some(id) => node[id.index()] = true,
                None => warn!(node = %key, "exclusion names a node not in the graph"),
            }
        }
        if honour_blocked_flags {
            for edge in graph.blocked_edges() {
                segment[graph.edge_segment[edge.index()].index()] = true;
            }
        }
        ExclusionMask { segment, node }
    }

    #[inline]
    fn allows_edge(&self, graph: &GeoGraph, edge: EdgeId) -> bool {
        !self.segment[graph.edge_segment[edge.index()].index()]
            && !self.node[graph.edge_to[edge.index()].index()]
    }

    #[inline]
    fn allows_node(&self, node: NodeId) -> bool {
        !self.node[node.index()]
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable point-to-point routing engine.
///
/// Implementations must be `Send + Sync`: independent requests may run on
/// separate worker threads over their own graph snapshots.
pub trait Router: Send + Sync {
    /// Compute the least-cost path from `from` to `to` avoiding `exclusions`
    /// and every edge flagged as blocked.
    fn route(
        &self,
        graph: &GeoGraph,
        from: NodeId,
        to: NodeId,
        exclusions: &Exclusions,
    ) -> PathOutcome;
}

/// Dijkstra's algorithm over the CSR graph with deterministic tie-breaking.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        graph: &GeoGraph,
        from: NodeId,
        to: NodeId,
        exclusions: &Exclusions,
    ) -> PathOutcome {
        let mask = ExclusionMask::resolve(graph, exclusions, true);
        route_masked(graph, from, to, &mask)
    }
}

/// Least-cost path between two nodes identified by external key.
///
/// # Errors
///
/// [`SpatialError::NodeNotFound`](crate::SpatialError::NodeNotFound) if
/// either key is not in the graph.  An unreachable goal is
/// `Ok(PathOutcome::NotFound)`.
pub fn shortest_path(
    graph: &GeoGraph,
    start: &NodeKey,
    goal: &NodeKey,
    exclusions: &Exclusions,
) -> SpatialResult<PathOutcome> {
    let from = graph.require_node(start)?;
    let to = graph.require_node(goal)?;
    let outcome = DijkstraRouter.route(graph, from, to, exclusions);
    debug!(%start, %goal, found = outcome.is_found(), cost = ?outcome.cost(), "shortest path");
    Ok(outcome)
}

/// One-to-all search from `source`.  Used to fill cost matrices.
pub fn shortest_path_tree<'g>(
    graph: &'g GeoGraph,
    source: NodeId,
    exclusions: &Exclusions,
) -> PathTree<'g> {
    let mask = ExclusionMask::resolve(graph, exclusions, true);
    tree_masked(graph, source, &mask)
}

pub(crate) fn route_masked(graph: &GeoGraph, from: NodeId, to: NodeId, mask: &ExclusionMask) -> PathOutcome {
    if !mask.allows_node(from) || !mask.allows_node(to) {
        return PathOutcome::NotFound;
    }
    if from == to {
        return PathOutcome::Found(Path::trivial(from));
    }
    let labels = search(graph, from, Some(to), mask);
    labels.path_to(graph, to)
}

pub(crate) fn tree_masked<'g>(graph: &'g GeoGraph, source: NodeId, mask: &ExclusionMask) -> PathTree<'g> {
    let labels = if mask.allows_node(source) {
        search(graph, source, None, mask)
    } else {
        Labels::unreached(graph.node_count())
    };
    PathTree { graph, source, labels }
}

// ── PathTree ──────────────────────────────────────────────────────────────────

/// Shortest-path tree rooted at one source node.
pub struct PathTree<'g> {
    graph: &'g GeoGraph,
    source: NodeId,
    labels: Labels,
}

impl PathTree<'_> {
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Least cost from the source, or `None` if unreachable.
    pub fn cost_to(&self, node: NodeId) -> Option<f64> {
        let c = self.labels.cost[node.index()];
        c.is_finite().then_some(c)
    }

    pub fn path_to(&self, node: NodeId) -> PathOutcome {
        self.labels.path_to(self.graph, node)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

struct Labels {
    cost: Vec<f64>,
    hops: Vec<u32>,
    prev_edge: Vec<EdgeId>,
}

impl Labels {
    fn unreached(n: usize) -> Self {
        Labels {
            cost: vec![f64::INFINITY; n],
            hops: vec![u32::MAX; n],
            prev_edge: vec![EdgeId::INVALID; n],
        }
    }

    fn path_to(&self, graph: &GeoGraph, to: NodeId) -> PathOutcome {
        if !self.cost[to.index()].is_finite() {
            return PathOutcome::NotFound;
        }
        let mut nodes = vec![to];
        let mut edges = Vec::new();
        let mut distance_m = 0.0;
        let mut cur = to;
        loop {
            let e = self.prev_edge[cur.index()];
            if e == EdgeId::INVALID {
                break;
            }
            edges.push(e);
            distance_m += graph.edge_length_m[e.index()];
            cur = graph.edge_from[e.index()];
            nodes.push(cur);
        }
        nodes.reverse();
        edges.reverse();
        PathOutcome::Found(Path { nodes, edges, distance_m, cost: self.cost[to.index()] })
    }

    /// Nodes from the source to `node`, inclusive.
    fn chain(&self, graph: &GeoGraph, node: NodeId) -> Vec<NodeId> {
        let mut out = vec![node];
        let mut cur = node;
        loop {
            let e = self.prev_edge[cur.index()];
            if e == EdgeId::INVALID {
                break;
            }
            cur = graph.edge_from[e.index()];
            out.push(cur);
        }
        out.reverse();
        out
    }
}

/// Min-queue entry ordered by `(cost, hops, node)`.
#[derive(Clone, Copy, PartialEq)]
struct QueueEntry {
    cost: f64,
    hops: u32,
    node: NodeId,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        quantize(self.cost)
            .total_cmp(&quantize(other.cost))
            .then(self.hops.cmp(&other.hops))
            .then(self.node.cmp(&other.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn search(graph: &GeoGraph, from: NodeId, to: Option<NodeId>, mask: &ExclusionMask) -> Labels {
    let n = graph.node_count();
    let mut labels = Labels::unreached(n);
    let mut settled = vec![false; n];

    labels.cost[from.index()] = 0.0;
    labels.hops[from.index()] = 0;

    let mut heap: BinaryHeap<Reverse<QueueEntry>> = BinaryHeap::new();
    heap.push(Reverse(QueueEntry { cost: 0.0, hops: 0, node: from }));

    while let Some(Reverse(entry)) = heap.pop() {
        let node = entry.node;
        if settled[node.index()] {
            continue;
        }
        // Skip stale entries.
        if entry.cost != labels.cost[node.index()] || entry.hops != labels.hops[node.index()] {
            continue;
        }
        settled[node.index()] = true;
        if Some(node) == to {
            break;
        }

        for edge in graph.out_edges(node) {
            if !mask.allows_edge(graph, edge) {
                continue;
            }
            let next = graph.edge_to[edge.index()];
            if settled[next.index()] {
                continue;
            }
            let cost = entry.cost + graph.edge_cost[edge.index()];
            let hops = entry.hops + 1;

            let better = match quantize(cost)
                .total_cmp(&quantize(labels.cost[next.index()]))
                .then(hops.cmp(&labels.hops[next.index()]))
            {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => {
                    let current_prev = graph.edge_from[labels.prev_edge[next.index()].index()];
                    current_prev != node
                        && labels.chain(graph, node) < labels.chain(graph, current_prev)
                }
            };

            if better {
                labels.cost[next.index()] = cost;
                labels.hops[next.index()] = hops;
                labels.prev_edge[next.index()] = edge;
                heap.push(Reverse(QueueEntry { cost, hops, node: next }));
            }
        }
    }

    labels
}
