//! Optimization result types.

use cr_core::{BinId, GeoPoint, NodeKey};

use crate::SkippedBin;

/// One collection stop, in visiting order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub bin: BinId,
    pub node: NodeKey,
    /// Index into [`CollectionRoute::trips`].
    pub trip: usize,
    /// Route cost accumulated on arrival.
    pub arrival_cost: f64,
    /// Route distance accumulated on arrival, in metres.
    pub arrival_distance_m: f64,
}

/// A depot-to-depot (or depot-to-last-stop) loop of the vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    /// Bins in visiting order.
    pub stops: Vec<BinId>,
    pub load: f64,
    pub cost: f64,
    pub distance_m: f64,
    /// The trip ends with a leg back to the depot.
    pub returns_to_depot: bool,
}

/// Estimates derived from the route geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteMetrics {
    pub distance_km: f64,
    /// Driving time at the configured average speed plus service time per
    /// stop.
    pub duration_min: f64,
    pub fuel_litres: f64,
    pub load_collected: f64,
}

/// Result of [`optimize_route`](crate::optimize_route).
///
/// `nodes` is the full driven node sequence starting at the depot, suitable
/// for line geometry.  Never mutated after it is returned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionRoute {
    pub depot: NodeKey,
    pub nodes: Vec<NodeKey>,
    pub points: Vec<GeoPoint>,
    pub stops: Vec<Stop>,
    pub trips: Vec<Trip>,
    /// Cumulative distance in metres.
    pub distance_m: f64,
    /// Cumulative cost under the graph's weights.
    pub cost: f64,
    /// Bins in visiting order.
    pub visited: Vec<BinId>,
    /// Qualifying bins that were not visited, ascending by id.
    pub skipped: Vec<SkippedBin>,
    pub metrics: RouteMetrics,
}

impl CollectionRoute {
    pub(crate) fn empty(depot: NodeKey, at: GeoPoint) -> Self {
        Self {
            nodes: vec![depot.clone()],
            points: vec![at],
            depot,
            stops: Vec::new(),
            trips: Vec::new(),
            distance_m: 0.0,
            cost: 0.0,
            visited: Vec::new(),
            skipped: Vec::new(),
            metrics: RouteMetrics::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    /// `[lon, lat]` pairs, the order map geometry formats expect.
    pub fn line_coordinates(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.lon_lat()).collect()
    }
}
