//! Attribute filters and deviation ranking.

use tracing::debug;

use cr_core::GeoPoint;

use crate::WalkingRoute;

// ── Filtering ─────────────────────────────────────────────────────────────────

/// Boolean attribute filter.  Every enabled flag must hold for a route to
/// pass; the default passes every active route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouteFilter {
    pub shaded_only: bool,
    pub lit_only: bool,
    pub accessible_only: bool,
    pub exclude_blocked: bool,
    pub active_only: bool,
    /// Drop routes longer than this.  Routes without a recorded distance
    /// are kept.
    pub max_distance_km: Option<f64>,
}

impl Default for RouteFilter {
    fn default() -> Self {
        Self {
            shaded_only: false,
            lit_only: false,
            accessible_only: false,
            exclude_blocked: false,
            active_only: true,
            max_distance_km: None,
        }
    }
}

impl RouteFilter {
    pub fn shaded() -> Self {
        Self { shaded_only: true, ..Self::default() }
    }

    pub fn lit() -> Self {
        Self { lit_only: true, ..Self::default() }
    }

    pub fn matches(&self, route: &WalkingRoute) -> bool {
        (!self.shaded_only || route.shaded)
            && (!self.lit_only || route.lit)
            && (!self.accessible_only || route.accessible)
            && (!self.exclude_blocked || !route.blocked)
            && (!self.active_only || route.active)
            && match (self.max_distance_km, route.distance_km) {
                (Some(max), Some(d)) => d <= max,
                _ => true,
            }
    }
}

/// Routes matching `filter`, in input order.  An empty result is not an
/// error.
pub fn filter_routes<'a>(routes: &'a [WalkingRoute], filter: &RouteFilter) -> Vec<&'a WalkingRoute> {
    routes.iter().filter(|r| filter.matches(r)).collect()
}

// ── Ranking ───────────────────────────────────────────────────────────────────

/// Default number of routes returned by [`rank_routes`].
pub const DEFAULT_RANK_LIMIT: usize = 5;

/// A trip the user wants to make, matched against the curated routes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Keep shaded routes only and reward shade in the score.
    pub prefer_shade: bool,
    /// Keep lit routes only.
    pub prefer_lit: bool,
    pub accessible_only: bool,
    pub max_distance_km: Option<f64>,
    pub limit: usize,
}

impl RankRequest {
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            start,
            end,
            prefer_shade: true,
            prefer_lit: false,
            accessible_only: false,
            max_distance_km: None,
            limit: DEFAULT_RANK_LIMIT,
        }
    }

    fn filter(&self) -> RouteFilter {
        RouteFilter {
            shaded_only: self.prefer_shade,
            lit_only: self.prefer_lit,
            accessible_only: self.accessible_only,
            exclude_blocked: true,
            active_only: true,
            max_distance_km: self.max_distance_km,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedRoute<'a> {
    pub route: &'a WalkingRoute,
    pub start_deviation_km: f64,
    pub end_deviation_km: f64,
    pub total_deviation_km: f64,
    /// Lower is better.
    pub score: f64,
}

/// Rank routes by how far their endpoints are from the requested trip.
///
/// `score = start deviation + end deviation − shade bonus`, where the bonus
/// is `shade_percentage / 100` when shade is preferred.  Sorting is stable,
/// so equally scored routes keep their input order.  Blocked and inactive
/// routes never rank.
pub fn rank_routes<'a>(routes: &'a [WalkingRoute], request: &RankRequest) -> Vec<RankedRoute<'a>> {
    let filter = request.filter();
    let mut ranked: Vec<RankedRoute<'a>> = routes
        .iter()
        .filter(|r| filter.matches(r))
        .map(|route| {
            let start_deviation_km = request.start.distance_km(route.start);
            let end_deviation_km = request.end.distance_km(route.end);
            let total_deviation_km = start_deviation_km + end_deviation_km;
            let shade_bonus = if request.prefer_shade { route.shade_percentage / 100.0 } else { 0.0 };
            RankedRoute {
                route,
                start_deviation_km,
                end_deviation_km,
                total_deviation_km,
                score: total_deviation_km - shade_bonus,
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    let candidates = ranked.len();
    ranked.truncate(request.limit);
    debug!(candidates, returned = ranked.len(), "ranked walking routes");
    ranked
}
