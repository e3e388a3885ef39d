//! Map-renderable output.
//!
//! Plain values shaped like a line feature collection: `[lon, lat]`
//! coordinates plus display properties.  The calling layer serializes them
//! (enable the `serde` feature).

use cr_core::RouteId;

use crate::WalkingRoute;

/// Shade share at or above which a shaded route is drawn as deep shade.
pub const DEEP_SHADE_PERCENTAGE: f64 = 70.0;

/// Display class of a route line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RouteColour {
    DeepShade,
    Shaded,
    Lit,
    Plain,
}

impl RouteColour {
    pub fn of(route: &WalkingRoute) -> Self {
        match (route.shaded, route.lit) {
            (true, _) if route.shade_percentage >= DEEP_SHADE_PERCENTAGE => RouteColour::DeepShade,
            (true, _) => RouteColour::Shaded,
            (false, true) => RouteColour::Lit,
            (false, false) => RouteColour::Plain,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            RouteColour::DeepShade => "#228B22",
            RouteColour::Shaded => "#90EE90",
            RouteColour::Lit => "#FFD700",
            RouteColour::Plain => "#808080",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FeatureProperties {
    pub id: RouteId,
    pub name: String,
    pub description: Option<String>,
    pub shade_percentage: f64,
    pub shaded: bool,
    pub lit: bool,
    pub blocked: bool,
    pub accessible: bool,
    pub distance_km: Option<f64>,
    pub walk_time_min: Option<f64>,
    pub colour: RouteColour,
    pub hex: &'static str,
}

/// One route as a map line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MapFeature {
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    pub properties: FeatureProperties,
}

/// Convert routes to map features, preserving order.
pub fn to_map_features<'a>(routes: impl IntoIterator<Item = &'a WalkingRoute>) -> Vec<MapFeature> {
    routes.into_iter().map(to_map_feature).collect()
}

pub fn to_map_feature(route: &WalkingRoute) -> MapFeature {
    let colour = RouteColour::of(route);
    MapFeature {
        coordinates: route.coordinates.iter().map(|p| p.lon_lat()).collect(),
        properties: FeatureProperties {
            id: route.id,
            name: route.name.clone(),
            description: route.description.clone(),
            shade_percentage: route.shade_percentage,
            shaded: route.shaded,
            lit: route.lit,
            blocked: route.blocked,
            accessible: route.accessible,
            distance_km: route.distance_km,
            walk_time_min: route.walk_time_min,
            colour,
            hex: colour.hex(),
        },
    }
}
