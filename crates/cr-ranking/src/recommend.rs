//! Time-of-day route recommendations around a user position.

use tracing::debug;

use cr_core::GeoPoint;

use crate::{RouteFilter, WalkingRoute};

/// Search radius used when the caller has no preference.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Maximum number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimeOfDay {
    /// Shaded routes keep walkers cool.
    Day,
    /// Lit routes are preferred after dark.
    Night,
}

impl TimeOfDay {
    fn filter(self) -> RouteFilter {
        let base = RouteFilter { exclude_blocked: true, ..RouteFilter::default() };
        match self {
            TimeOfDay::Day => RouteFilter { shaded_only: true, ..base },
            TimeOfDay::Night => RouteFilter { lit_only: true, ..base },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation<'a> {
    pub route: &'a WalkingRoute,
    /// Distance from the user to the route's start.
    pub distance_km: f64,
}

/// Shaded (day) or lit (night) routes starting within `radius_km` of `at`,
/// nearest first.  Ties keep input order.
pub fn recommend_nearby<'a>(
    routes: &'a [WalkingRoute],
    at: GeoPoint,
    time: TimeOfDay,
    radius_km: f64,
) -> Vec<Recommendation<'a>> {
    let filter = time.filter();
    let mut nearby: Vec<Recommendation<'a>> = routes
        .iter()
        .filter(|r| filter.matches(r))
        .map(|route| Recommendation { route, distance_km: at.distance_km(route.start) })
        .filter(|r| r.distance_km <= radius_km)
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby.truncate(MAX_RECOMMENDATIONS);
    debug!(?time, found = nearby.len(), "route recommendations");
    nearby
}
