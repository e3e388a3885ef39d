//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge arrays are sorted by `(from, to, segment)` and indexed by
//! `EdgeId`.  Iteration over a node's outgoing edges is a contiguous scan.
//!
//! # Node ordering
//!
//! Dense `NodeId`s are assigned in ascending [`NodeKey`] order, so comparing
//! two `NodeId`s of the same graph gives the same answer as comparing their
//! external keys.  The shortest-path tie-break relies on this.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! to snap free coordinates (a user's position, an evacuation start) onto
//! the network.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use cr_core::{CostWeights, EdgeId, EdgeKey, GeoPoint, NodeId, NodeKey, SegmentId};

use crate::records::SegmentAttributes;
use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in degree space.  Good enough to pick the
    /// nearest node within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── GeoGraph ──────────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a spatial index for node snapping.
///
/// Request-scoped and immutable once built.  Fields are `pub` for direct
/// indexed access on hot paths; construct via [`GeoGraphBuilder`] or
/// [`build_graph`](crate::build_graph).
#[derive(Debug)]
pub struct GeoGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// External key of each node, ascending.  Indexed by `NodeId`.
    pub node_key: Vec<NodeKey>,
    /// Geographic position of each node.
    pub node_pos: Vec<GeoPoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    /// Length in metres.
    pub edge_length_m: Vec<f64>,
    /// Cost under the weights the graph was built with.  Always finite and
    /// non-negative.
    pub edge_cost: Vec<f64>,
    /// Flagged by an active block.  Never traversed by the router.
    pub edge_blocked: Vec<bool>,
    /// Source segment each directed edge came from.
    pub edge_segment: Vec<SegmentId>,

    // ── Segment data (indexed by SegmentId) ───────────────────────────────
    pub segment_key: Vec<EdgeKey>,
    pub segment_attrs: Vec<SegmentAttributes>,

    /// Weights used to compute `edge_cost`.
    pub weights: CostWeights,

    /// Blocked segments left out by [`BlockMode::Omit`](crate::BlockMode),
    /// ascending.
    pub(crate) omitted_segments: Vec<EdgeKey>,

    node_index: FxHashMap<NodeKey, NodeId>,
    segment_index: FxHashMap<EdgeKey, SegmentId>,
    spatial_idx: RTree<NodeEntry>,
}

impl GeoGraph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segment_key.len()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn node_id(&self, key: &NodeKey) -> Option<NodeId> {
        self.node_index.get(key).copied()
    }

    /// Like [`node_id`](Self::node_id) but reports a missing node as an error.
    pub fn require_node(&self, key: &NodeKey) -> SpatialResult<NodeId> {
        self.node_id(key).ok_or_else(|| SpatialError::NodeNotFound(key.clone()))
    }

    pub fn segment_id(&self, key: &EdgeKey) -> Option<SegmentId> {
        self.segment_index.get(key).copied()
    }

    /// Keys of blocked segments that were left out of this graph.  Empty
    /// unless the graph was built with [`BlockMode::Omit`](crate::BlockMode)
    /// and at least one block matched.
    pub fn omitted_segments(&self) -> &[EdgeKey] {
        &self.omitted_segments
    }

    #[inline]
    pub fn key(&self, node: NodeId) -> &NodeKey {
        &self.node_key[node.index()]
    }

    #[inline]
    pub fn pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Directed edges flagged as blocked, for map display.
    pub fn blocked_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_blocked
            .iter()
            .enumerate()
            .filter(|(_, blocked)| **blocked)
            .map(|(i, _)| EdgeId(i as u32))
    }

    /// Endpoint positions of a directed edge.
    pub fn edge_endpoints(&self, edge: EdgeId) -> (GeoPoint, GeoPoint) {
        (
            self.pos(self.edge_from[edge.index()]),
            self.pos(self.edge_to[edge.index()]),
        )
    }

    #[inline]
    pub fn edge_attrs(&self, edge: EdgeId) -> SegmentAttributes {
        self.segment_attrs[self.edge_segment[edge.index()].index()]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest node to `pos`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── GeoGraphBuilder ───────────────────────────────────────────────────────────

/// Construct a [`GeoGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes and edges are added by external key in any order.  `build()`
/// validates the topology, assigns dense ids in key order, annotates edge
/// costs, constructs the CSR arrays, and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use cr_core::GeoPoint;
/// use cr_network::GeoGraphBuilder;
///
/// let mut b = GeoGraphBuilder::new();
/// b.add_node("a", GeoPoint::new(40.19, 29.06));
/// b.add_node("b", GeoPoint::new(40.20, 29.07));
/// b.add_road("a-b", "a", "b", Some(1_200.0));
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // two-way
/// ```
pub struct GeoGraphBuilder {
    nodes:    Vec<(NodeKey, GeoPoint)>,
    segments: Vec<RawSegment>,
    weights:  CostWeights,
}

struct RawSegment {
    key:      EdgeKey,
    from:     NodeKey,
    to:       NodeKey,
    length_m: Option<f64>,
    directed: bool,
    blocked:  bool,
    attrs:    SegmentAttributes,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    segment:  SegmentId,
    length_m: f64,
    blocked:  bool,
}

impl GeoGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), segments: Vec::new(), weights: CostWeights::default() }
    }

    /// Pre-allocate for the expected number of nodes and segments.
    pub fn with_capacity(nodes: usize, segments: usize) -> Self {
        Self {
            nodes:    Vec::with_capacity(nodes),
            segments: Vec::with_capacity(segments),
            weights:  CostWeights::default(),
        }
    }

    /// Cost weights used to annotate edges.  Default: raw distance.
    pub fn weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn add_node(&mut self, key: impl Into<NodeKey>, pos: GeoPoint) {
        self.nodes.push((key.into(), pos));
    }

    /// Add a one-way segment from `from` to `to`.
    pub fn add_directed_edge(
        &mut self,
        key: impl Into<EdgeKey>,
        from: impl Into<NodeKey>,
        to: impl Into<NodeKey>,
        length_m: Option<f64>,
    ) {
        self.push_segment(key.into(), from.into(), to.into(), length_m, true, false, SegmentAttributes::default());
    }

    /// Add a two-way segment (two directed edges of equal cost).
    pub fn add_road(
        &mut self,
        key: impl Into<EdgeKey>,
        a: impl Into<NodeKey>,
        b: impl Into<NodeKey>,
        length_m: Option<f64>,
    ) {
        self.push_segment(key.into(), a.into(), b.into(), length_m, false, false, SegmentAttributes::default());
    }

    /// Add a segment from an ingested record, optionally flagged as blocked.
    pub fn add_segment(&mut self, record: &crate::EdgeRecord, blocked: bool) {
        self.push_segment(
            record.key.clone(),
            record.from.clone(),
            record.to.clone(),
            record.length_m,
            record.directed,
            blocked,
            record.attrs,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn push_segment(
        &mut self,
        key: EdgeKey,
        from: NodeKey,
        to: NodeKey,
        length_m: Option<f64>,
        directed: bool,
        blocked: bool,
        attrs: SegmentAttributes,
    ) {
        self.segments.push(RawSegment { key, from, to, length_m, directed, blocked, attrs });
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn segment_count(&self) -> usize { self.segments.len() }

    /// Consume the builder and produce a [`GeoGraph`].
    ///
    /// # Errors
    ///
    /// [`SpatialError::GraphConstruction`] for an empty node set, duplicate
    /// node or segment keys, invalid coordinates, unknown node references,
    /// or a negative / non-finite explicit length.  [`SpatialError::Core`]
    /// if the weights are invalid.
    pub fn build(self) -> SpatialResult<GeoGraph> {
        self.weights.validate()?;

        if self.nodes.is_empty() {
            return Err(SpatialError::GraphConstruction("graph has no nodes".into()));
        }

        // ── Nodes: sort by key so dense ids follow key order ──────────────
        let mut nodes = self.nodes;
        nodes.sort_by(|a, b| a.0.cmp(&b.0));
        for pair in nodes.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(SpatialError::GraphConstruction(format!(
                    "duplicate node key {}",
                    pair[0].0
                )));
            }
        }
        if let Some((key, pos)) = nodes.iter().find(|(_, pos)| !pos.is_valid()) {
            return Err(SpatialError::GraphConstruction(format!(
                "node {key} has invalid coordinate {pos}"
            )));
        }

        let node_count = nodes.len();
        let mut node_index: FxHashMap<NodeKey, NodeId> =
            FxHashMap::with_capacity_and_hasher(node_count, Default::default());
        for (i, (key, _)) in nodes.iter().enumerate() {
            node_index.insert(key.clone(), NodeId(i as u32));
        }
        let (node_key, node_pos): (Vec<NodeKey>, Vec<GeoPoint>) = nodes.into_iter().unzip();

        // ── Segments → directed raw edges ─────────────────────────────────
        let mut segment_key   = Vec::with_capacity(self.segments.len());
        let mut segment_attrs = Vec::with_capacity(self.segments.len());
        let mut segment_index: FxHashMap<EdgeKey, SegmentId> =
            FxHashMap::with_capacity_and_hasher(self.segments.len(), Default::default());
        let mut raw: Vec<RawEdge> = Vec::with_capacity(self.segments.len() * 2);

        for seg in self.segments {
            let lookup = |key: &NodeKey| {
                node_index.get(key).copied().ok_or_else(|| {
                    SpatialError::GraphConstruction(format!(
                        "segment {} references unknown node {key}",
                        seg.key
                    ))
                })
            };
            let from = lookup(&seg.from)?;
            let to   = lookup(&seg.to)?;

            let length_m = match checked_length(&seg.key, seg.length_m)? {
                Some(len) => len,
                None => node_pos[from.index()].distance_m(node_pos[to.index()]),
            };

            let id = SegmentId(segment_key.len() as u32);
            if segment_index.insert(seg.key.clone(), id).is_some() {
                return Err(SpatialError::GraphConstruction(format!(
                    "duplicate segment key {}",
                    seg.key
                )));
            }
            segment_key.push(seg.key);
            segment_attrs.push(seg.attrs);

            raw.push(RawEdge { from, to, segment: id, length_m, blocked: seg.blocked });
            if !seg.directed {
                raw.push(RawEdge { from: to, to: from, segment: id, length_m, blocked: seg.blocked });
            }
        }

        // Sort by (from, to, segment) for CSR construction and stable edge ids.
        raw.sort_unstable_by_key(|e| (e.from.0, e.to.0, e.segment.0));

        let edge_cost = raw
            .iter()
            .map(|e| cr_core::edge_cost(e.length_m, &self.weights))
            .collect::<Result<Vec<f64>, _>>()?;

        let edge_from:     Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>       = raw.iter().map(|e| e.length_m).collect();
        let edge_blocked:  Vec<bool>      = raw.iter().map(|e| e.blocked).collect();
        let edge_segment:  Vec<SegmentId> = raw.iter().map(|e| e.segment).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, raw.len());

        let entries: Vec<NodeEntry> = node_pos
            .iter()
            .enumerate()
            .map(|(i, pos)| NodeEntry { point: [pos.lat, pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Ok(GeoGraph {
            node_key,
            node_pos,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_cost,
            edge_blocked,
            edge_segment,
            segment_key,
            segment_attrs,
            weights: self.weights,
            omitted_segments: Vec::new(),
            node_index,
            segment_index,
            spatial_idx,
        })
    }
}

/// Reject a negative or non-finite explicit segment length.
pub(crate) fn checked_length(key: &EdgeKey, length_m: Option<f64>) -> SpatialResult<Option<f64>> {
    match length_m {
        Some(len) if !len.is_finite() || len < 0.0 => Err(SpatialError::GraphConstruction(format!(
            "segment {key} has invalid length {len}"
        ))),
        other => Ok(other),
    }
}

impl Default for GeoGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
