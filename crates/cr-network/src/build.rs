//! `build_graph`: records + active blocks → [`GeoGraph`].

use rustc_hash::FxHashSet;
use tracing::debug;

use cr_core::{CostWeights, EdgeKey, NodeKey};

use crate::network::{checked_length, GeoGraph, GeoGraphBuilder};
use crate::records::{BlockedRoad, EdgeRecord, NodeRecord};
use crate::{SpatialError, SpatialResult};

/// How edges named by an active block enter the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockMode {
    /// Leave blocked segments out entirely.  Disaster-mode pathfinding.
    #[default]
    Omit,
    /// Keep blocked segments with `edge_blocked = true`.  Map display.
    Flag,
}

/// Build a request-scoped graph from a snapshot of node and edge records.
///
/// `active_blocks` should already be filtered to the request time (see
/// [`active_blocks`](crate::active_blocks)); every block listed here is
/// applied.  Blocks naming an unknown segment are ignored.
///
/// Pure function of its inputs.
///
/// # Errors
///
/// [`SpatialError::GraphConstruction`] if `nodes` is empty, or if any edge
/// (omitted or not) references a node that is not in `nodes`, repeats a
/// segment key, or has an invalid length.  See [`GeoGraphBuilder::build`]
/// for the remaining topology checks.
pub fn build_graph<'a>(
    nodes: &[NodeRecord],
    edges: &[EdgeRecord],
    active_blocks: impl IntoIterator<Item = &'a BlockedRoad>,
    mode: BlockMode,
    weights: CostWeights,
) -> SpatialResult<GeoGraph> {
    if nodes.is_empty() {
        return Err(SpatialError::GraphConstruction("graph has no nodes".into()));
    }

    let blocked: FxHashSet<&EdgeKey> = active_blocks.into_iter().map(|b| &b.edge).collect();
    let known: FxHashSet<&NodeKey> = nodes.iter().map(|n| &n.key).collect();

    let mut builder = GeoGraphBuilder::with_capacity(nodes.len(), edges.len()).weights(weights);
    for node in nodes {
        builder.add_node(node.key.clone(), node.pos);
    }

    let mut omitted: Vec<EdgeKey> = Vec::new();
    let mut flagged = 0usize;
    let mut seen: FxHashSet<&EdgeKey> = FxHashSet::default();
    for edge in edges {
        // Omitted edges never reach the builder, so every segment is checked
        // here the same way regardless of mode.
        if !seen.insert(&edge.key) {
            return Err(SpatialError::GraphConstruction(format!(
                "duplicate segment key {}",
                edge.key
            )));
        }
        for end in [&edge.from, &edge.to] {
            if !known.contains(end) {
                return Err(SpatialError::GraphConstruction(format!(
                    "segment {} references unknown node {end}",
                    edge.key
                )));
            }
        }
        checked_length(&edge.key, edge.length_m)?;

        match (blocked.contains(&edge.key), mode) {
            (true, BlockMode::Omit) => omitted.push(edge.key.clone()),
            (true, BlockMode::Flag) => {
                builder.add_segment(edge, true);
                flagged += 1;
            }
            (false, _) => builder.add_segment(edge, false),
        }
    }

    let mut graph = builder.build()?;
    omitted.sort();
    graph.omitted_segments = omitted;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        omitted = graph.omitted_segments.len(),
        flagged,
        "built geo graph"
    );
    Ok(graph)
}
