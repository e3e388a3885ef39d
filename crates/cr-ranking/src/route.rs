//! Precomputed walking route record.

use std::collections::BTreeMap;

use cr_core::{GeoPoint, RouteId};

/// A curated walking route, as stored by the persistence layer.
///
/// Boolean attributes the ranking service understands are typed fields;
/// anything else from the source record lives in `extensions`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkingRoute {
    pub id: RouteId,
    pub name: String,
    pub description: Option<String>,
    /// Line geometry in travel order.
    pub coordinates: Vec<GeoPoint>,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub start_name: Option<String>,
    pub end_name: Option<String>,
    pub distance_km: Option<f64>,
    pub walk_time_min: Option<f64>,
    /// Share of the route in shade, 0–100.
    pub shade_percentage: f64,
    pub shaded: bool,
    pub lit: bool,
    /// Crosses a currently blocked segment.
    pub blocked: bool,
    pub accessible: bool,
    pub active: bool,
    pub extensions: BTreeMap<String, String>,
}

impl WalkingRoute {
    /// An active, accessible, unshaded, unlit route.  `start` and `end` are
    /// taken from the first and last coordinate.
    pub fn new(id: u64, name: impl Into<String>, coordinates: Vec<GeoPoint>) -> Self {
        let start = coordinates.first().copied().unwrap_or(GeoPoint::new(0.0, 0.0));
        let end = coordinates.last().copied().unwrap_or(start);
        Self {
            id: RouteId(id),
            name: name.into(),
            description: None,
            coordinates,
            start,
            end,
            start_name: None,
            end_name: None,
            distance_km: None,
            walk_time_min: None,
            shade_percentage: 0.0,
            shaded: false,
            lit: false,
            blocked: false,
            accessible: true,
            active: true,
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_shade(mut self, percentage: f64) -> Self {
        self.shaded = true;
        self.shade_percentage = percentage;
        self
    }

    pub fn with_lighting(mut self) -> Self {
        self.lit = true;
        self
    }

    pub fn with_distance_km(mut self, km: f64) -> Self {
        self.distance_km = Some(km);
        self
    }

    /// Length along the line geometry.
    pub fn geometry_length_km(&self) -> f64 {
        self.coordinates.windows(2).map(|w| w[0].distance_km(w[1])).sum()
    }
}
