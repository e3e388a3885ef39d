//! Disaster-mode routing: pass/fail safe routes and evacuation to the
//! nearest safe zone.
//!
//! A route *passes* when a path exists that avoids every excluded segment
//! and every edge flagged as blocked.  The unrestricted best path (ignoring
//! all blocks) is computed alongside so callers can tell whether the blocks
//! forced a detour.
//!
//! The unrestricted path is only known when every block is still in the
//! graph: build with [`BlockMode::Flag`](crate::BlockMode::Flag), or build
//! without blocks and pass them as [`Exclusions`].  On a graph built with
//! [`BlockMode::Omit`](crate::BlockMode::Omit) the omitted segments are
//! gone, so the baseline fields are `None`.

use tracing::debug;

use cr_core::{GeoPoint, NodeKey};

use crate::network::GeoGraph;
use crate::router::{route_masked, tree_masked, ExclusionMask, Exclusions, Path, PathOutcome};
use crate::SpatialResult;

/// Average walking speed for evacuation estimates.
pub const WALK_SPEED_KMH: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SafetyClass {
    Pass,
    Fail,
}

/// Outcome of a disaster-mode point-to-point query.
#[derive(Debug, Clone, PartialEq)]
pub struct SafeRouteOutcome {
    pub class: SafetyClass,
    /// Best path avoiding all blocks.  `None` when the class is `Fail`.
    pub path: Option<Path>,
    /// Cost of the best path with no blocks applied.  `None` when no such
    /// path exists or the graph has omitted segments.
    pub baseline_cost: Option<f64>,
    /// The blocks changed the best path.  `None` without a baseline.
    pub rerouted: Option<bool>,
    /// `path.cost / baseline_cost`; 1.0 when the baseline is free.
    pub detour_ratio: Option<f64>,
}

/// Classify the route from `start` to `goal` under `exclusions` plus the
/// graph's blocked flags.
pub fn safe_route(
    graph: &GeoGraph,
    start: &NodeKey,
    goal: &NodeKey,
    exclusions: &Exclusions,
) -> SpatialResult<SafeRouteOutcome> {
    let from = graph.require_node(start)?;
    let to = graph.require_node(goal)?;

    let restricted = ExclusionMask::resolve(graph, exclusions, true);

    let baseline = if graph.omitted_segments().is_empty() {
        let open = ExclusionMask::resolve(graph, &Exclusions::new(), false);
        route_masked(graph, from, to, &open).into_path()
    } else {
        debug!(omitted = graph.omitted_segments().len(), "blocked segments omitted; no baseline");
        None
    };
    let safe = route_masked(graph, from, to, &restricted).into_path();

    let outcome = match safe {
        Some(path) => {
            let rerouted = baseline.as_ref().map(|b| b.nodes != path.nodes);
            let detour_ratio = baseline.as_ref().map(|b| {
                if b.cost > 0.0 { path.cost / b.cost } else { 1.0 }
            });
            SafeRouteOutcome {
                class: SafetyClass::Pass,
                baseline_cost: baseline.as_ref().map(|b| b.cost),
                path: Some(path),
                rerouted,
                detour_ratio,
            }
        }
        None => SafeRouteOutcome {
            class: SafetyClass::Fail,
            path: None,
            baseline_cost: baseline.as_ref().map(|b| b.cost),
            rerouted: None,
            detour_ratio: None,
        },
    };
    debug!(%start, %goal, class = ?outcome.class, rerouted = ?outcome.rerouted, "safe route");
    Ok(outcome)
}

/// A designated assembly area.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SafeZone {
    pub name: String,
    pub node: NodeKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evacuation {
    /// Index into the `zones` slice passed to [`evacuation_route`].
    pub zone: usize,
    pub path: Path,
    pub distance_km: f64,
    pub walk_time_min: f64,
}

/// Route from a free coordinate to the safe zone with the cheapest network
/// path.  `from` is snapped to the nearest graph node.
///
/// Zones whose node is not in the graph are skipped.  Ties go to the zone
/// listed first.  Returns `Ok(None)` when no zone is reachable.
pub fn evacuation_route(
    graph: &GeoGraph,
    from: GeoPoint,
    zones: &[SafeZone],
    exclusions: &Exclusions,
) -> SpatialResult<Option<Evacuation>> {
    let Some(start) = graph.snap_to_node(from) else {
        return Ok(None);
    };
    let mask = ExclusionMask::resolve(graph, exclusions, true);
    let tree = tree_masked(graph, start, &mask);

    let mut best: Option<(usize, f64)> = None;
    for (i, zone) in zones.iter().enumerate() {
        let Some(node) = graph.node_id(&zone.node) else {
            debug!(zone = %zone.name, "safe zone node not in graph");
            continue;
        };
        match (tree.cost_to(node), best) {
            (Some(cost), Some((_, c))) if cost < c => best = Some((i, cost)),
            (Some(cost), None) => best = Some((i, cost)),
            _ => {}
        }
    }

    let Some((zone, _)) = best else {
        return Ok(None);
    };
    let node = graph.require_node(&zones[zone].node)?;
    let PathOutcome::Found(path) = tree.path_to(node) else {
        return Ok(None);
    };
    let distance_km = path.distance_m / 1000.0;
    Ok(Some(Evacuation {
        zone,
        distance_km,
        walk_time_min: distance_km / WALK_SPEED_KMH * 60.0,
        path,
    }))
}
