//! Greedy nearest-feasible collection routing.
//!
//! # Algorithm
//!
//! ```text
//! select bins with fill > threshold
//! drop bins with unknown nodes, oversize loads, or no path from the depot
//! cost matrix: one shortest-path tree per location (depot + bins)
//! at = depot, room = capacity
//! while bins remain:
//!   next = cheapest remaining bin with load ≤ room reachable from `at`
//!          (ties → smaller BinId), skipping dead-end bins (no path back
//!          to the depot) while any other bin remains
//!   found     → visit it
//!   not found → single_trip_only ? skip the rest (TripLimit)
//!                                 : drive back to the depot, new trip
//! optional 2-opt per trip, then stitch the legs into one node path
//! ```
//!
//! From the depot with a fresh vehicle every remaining bin fits and is
//! reachable, and dead-end bins are only held back while another bin is
//! left, so each trip visits at least one bin and the loop terminates after
//! at most `n` trips.  Dead-end bins are collected last; once the vehicle
//! sits at one, bins it cannot reach from there are skipped as `Stranded`.

use tracing::{debug, warn};

use cr_core::{CoreError, NodeId, NodeKey, RouteConfig};
use cr_network::{build_graph, BlockMode, BlockedRoad, EdgeRecord, GeoGraph, NodeRecord, Path};

use crate::matrix::CostMatrix;
use crate::route::{CollectionRoute, RouteMetrics, Stop, Trip};
use crate::{two_opt, Bin, CollectResult, SkipReason, SkippedBin};

/// Trip order as location indices into the cost matrix.
struct PlannedTrip {
    order: Vec<usize>,
    returns: bool,
}

/// Order the bins above `config.fill_threshold` into one or more depot
/// trips over `graph`.
///
/// Edge costs come from `graph`, so `config.weights` must equal the weights
/// the graph was built with.
///
/// # Errors
///
/// - [`CoreError::InvalidParameter`] for an invalid `config`, a bin with an
///   out-of-range fill or load, duplicate bin ids, or mismatched weights.
/// - [`SpatialError::NodeNotFound`](cr_network::SpatialError::NodeNotFound)
///   if the depot is not in the graph.
///
/// Zero qualifying bins is not an error: the route is empty with cost 0.
pub fn optimize_route(
    graph: &GeoGraph,
    depot: &NodeKey,
    bins: &[Bin],
    config: &RouteConfig,
) -> CollectResult<CollectionRoute> {
    config.validate()?;
    if graph.weights != config.weights {
        return Err(CoreError::invalid(
            "weights",
            format!(
                "graph was built with {:?}, request uses {:?}",
                graph.weights, config.weights
            ),
        )
        .into());
    }
    let depot_id = graph.require_node(depot)?;

    for bin in bins {
        bin.validate()?;
    }
    let mut ids: Vec<_> = bins.iter().map(|b| b.id).collect();
    ids.sort_unstable();
    if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
        return Err(CoreError::invalid("bins", format!("duplicate bin id {}", pair[0])).into());
    }

    // ── Selection ─────────────────────────────────────────────────────────
    let mut selected: Vec<&Bin> = bins.iter().filter(|b| b.fill > config.fill_threshold).collect();
    selected.sort_by_key(|b| b.id);

    let mut skipped = Vec::new();
    let mut located: Vec<(&Bin, NodeId)> = Vec::with_capacity(selected.len());
    for bin in selected {
        match graph.node_id(&bin.node) {
            None => {
                debug!(bin = %bin.id, node = %bin.node, "bin node not in graph");
                skipped.push(SkippedBin { bin: bin.id, reason: SkipReason::UnknownNode });
            }
            Some(_) if bin.load > config.vehicle_capacity => {
                skipped.push(SkippedBin { bin: bin.id, reason: SkipReason::ExceedsCapacity });
            }
            Some(node) => located.push((bin, node)),
        }
    }

    let mut route = CollectionRoute::empty(depot.clone(), graph.pos(depot_id));
    if located.is_empty() {
        skipped.sort_by_key(|s| s.bin);
        route.skipped = skipped;
        debug!(%depot, bins = bins.len(), "no bins to collect");
        return Ok(route);
    }

    let locations: Vec<NodeId> =
        std::iter::once(depot_id).chain(located.iter().map(|&(_, n)| n)).collect();
    let matrix = CostMatrix::build(graph, locations);
    debug!(locations = matrix.len(), "cost matrix built");

    let mut remaining = Vec::with_capacity(located.len());
    for (k, (bin, _)) in located.iter().enumerate() {
        let loc = k + 1;
        if matrix.cost(0, loc).is_finite() {
            remaining.push(loc);
        } else {
            skipped.push(SkippedBin { bin: bin.id, reason: SkipReason::Unreachable });
        }
    }

    // ── Greedy trips ──────────────────────────────────────────────────────
    let load_of = |loc: usize| located[loc - 1].0.load;
    let mut trips = greedy_trips(&matrix, remaining, &load_of, config, |loc, reason| {
        skipped.push(SkippedBin { bin: located[loc - 1].0.id, reason });
    });

    if config.two_opt {
        for trip in &mut trips {
            let applied = two_opt::improve(&mut trip.order, &matrix, trip.returns);
            if applied > 0 {
                debug!(applied, stops = trip.order.len(), "2-opt improved trip");
            }
        }
    }

    // ── Stitch legs ───────────────────────────────────────────────────────
    for (t, plan) in trips.iter().enumerate() {
        let start_cost = route.cost;
        let start_distance = route.distance_m;
        let mut trip = Trip {
            stops: Vec::with_capacity(plan.order.len()),
            load: 0.0,
            cost: 0.0,
            distance_m: 0.0,
            returns_to_depot: plan.returns,
        };

        let mut at = 0;
        for &loc in &plan.order {
            append_leg(&mut route, graph, leg(&matrix, at, loc)?);
            let bin = located[loc - 1].0;
            route.stops.push(Stop {
                bin: bin.id,
                node: bin.node.clone(),
                trip: t,
                arrival_cost: route.cost,
                arrival_distance_m: route.distance_m,
            });
            route.visited.push(bin.id);
            trip.stops.push(bin.id);
            trip.load += bin.load;
            at = loc;
        }
        if plan.returns {
            append_leg(&mut route, graph, leg(&matrix, at, 0)?);
        }

        trip.cost = route.cost - start_cost;
        trip.distance_m = route.distance_m - start_distance;
        route.trips.push(trip);
    }

    skipped.sort_by_key(|s| s.bin);
    route.skipped = skipped;
    route.metrics = metrics(&route, config);

    debug!(
        %depot,
        visited = route.visited.len(),
        skipped = route.skipped.len(),
        trips = route.trips.len(),
        cost = route.cost,
        "collection route"
    );
    Ok(route)
}

/// Build a graph from records (blocked segments omitted, edges costed with
/// `config.weights`) and optimize over it.
pub fn plan_collection<'a>(
    nodes: &[NodeRecord],
    edges: &[EdgeRecord],
    active_blocks: impl IntoIterator<Item = &'a BlockedRoad>,
    depot: &NodeKey,
    bins: &[Bin],
    config: &RouteConfig,
) -> CollectResult<CollectionRoute> {
    config.validate()?;
    let graph = build_graph(nodes, edges, active_blocks, BlockMode::Omit, config.weights)?;
    optimize_route(&graph, depot, bins, config)
}

// ── Internals ─────────────────────────────────────────────────────────────────

/// `remaining` must be ascending, which is ascending `BinId`.
fn greedy_trips(
    matrix: &CostMatrix<'_>,
    mut remaining: Vec<usize>,
    load_of: &impl Fn(usize) -> f64,
    config: &RouteConfig,
    mut skip: impl FnMut(usize, SkipReason),
) -> Vec<PlannedTrip> {
    let mut trips = Vec::new();
    let mut order = Vec::new();
    let mut at = 0;
    let mut room = config.vehicle_capacity;

    while !remaining.is_empty() {
        let only_dead_ends = remaining.iter().all(|&loc| !matrix.cost(loc, 0).is_finite());
        let mut best: Option<(usize, f64)> = None;
        for (pos, &loc) in remaining.iter().enumerate() {
            if load_of(loc) > room {
                continue;
            }
            if !only_dead_ends && !matrix.cost(loc, 0).is_finite() {
                continue;
            }
            let cost = matrix.cost(at, loc);
            if cost.is_finite() && best.is_none_or(|(_, c)| cost < c) {
                best = Some((pos, cost));
            }
        }

        match best {
            Some((pos, _)) => {
                let loc = remaining.remove(pos);
                room -= load_of(loc);
                order.push(loc);
                at = loc;
            }
            None if order.is_empty() => {
                // A fresh vehicle at the depot always has a feasible bin.
                for loc in remaining.drain(..) {
                    skip(loc, SkipReason::Unreachable);
                }
            }
            None if config.single_trip_only => {
                for loc in remaining.drain(..) {
                    skip(loc, SkipReason::TripLimit);
                }
            }
            None if !matrix.cost(at, 0).is_finite() => {
                warn!(remaining = remaining.len(), "no way back to the depot; ending route");
                for loc in remaining.drain(..) {
                    skip(loc, SkipReason::Stranded);
                }
            }
            None => {
                trips.push(PlannedTrip { order: std::mem::take(&mut order), returns: true });
                at = 0;
                room = config.vehicle_capacity;
            }
        }
    }

    if !order.is_empty() {
        let returns = config.return_to_depot && matrix.cost(at, 0).is_finite();
        if config.return_to_depot && !returns {
            warn!("no way back to the depot after the last stop; final leg dropped");
        }
        trips.push(PlannedTrip { order, returns });
    }
    trips
}

fn leg(matrix: &CostMatrix<'_>, from: usize, to: usize) -> CollectResult<Path> {
    matrix.path(from, to).ok_or_else(|| {
        CoreError::Internal(format!("planned leg {from} -> {to} has no path")).into()
    })
}

fn append_leg(route: &mut CollectionRoute, graph: &GeoGraph, path: Path) {
    for &node in &path.nodes[1..] {
        route.nodes.push(graph.key(node).clone());
        route.points.push(graph.pos(node));
    }
    route.cost += path.cost;
    route.distance_m += path.distance_m;
}

fn metrics(route: &CollectionRoute, config: &RouteConfig) -> RouteMetrics {
    let distance_km = route.distance_m / 1000.0;
    RouteMetrics {
        distance_km,
        duration_min: distance_km / config.average_speed_kmh * 60.0
            + route.visited.len() as f64 * config.stop_time_min,
        fuel_litres: distance_km * config.fuel_litres_per_km,
        load_collected: route.trips.iter().map(|t| t.load).sum(),
    }
}
