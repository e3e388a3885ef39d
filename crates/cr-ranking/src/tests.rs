//! Unit tests for cr-ranking.

use cr_core::{GeoPoint, RouteId};

use crate::WalkingRoute;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Degrees of latitude per metre on the haversine sphere.
const DEG_PER_M: f64 = 1.0 / 111_194.93;

fn p(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon)
}

/// Straight north-bound route from `(lat, lon)`, roughly 1.1 km long.
fn route(id: u64, lat: f64, lon: f64) -> WalkingRoute {
    WalkingRoute::new(id, format!("route {id}"), vec![p(lat, lon), p(lat + 0.005, lon), p(lat + 0.01, lon)])
}

fn ids<'a>(routes: impl IntoIterator<Item = &'a WalkingRoute>) -> Vec<u64> {
    routes.into_iter().map(|r| r.id.0).collect()
}

// ── Filtering ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod filtering {
    use super::*;
    use crate::{filter_routes, RouteFilter};

    fn fixture() -> Vec<WalkingRoute> {
        let mut inactive = route(5, 40.0, 29.0).with_shade(90.0);
        inactive.active = false;
        let mut blocked = route(6, 40.0, 29.0).with_shade(60.0).with_lighting();
        blocked.blocked = true;
        let mut stairs = route(7, 40.0, 29.0).with_lighting();
        stairs.accessible = false;
        vec![
            route(1, 40.0, 29.0).with_shade(80.0),
            route(2, 40.0, 29.0).with_lighting().with_distance_km(3.0),
            route(3, 40.0, 29.0).with_shade(40.0).with_lighting().with_distance_km(1.0),
            route(4, 40.0, 29.0),
            inactive,
            blocked,
            stairs,
        ]
    }

    #[test]
    fn default_keeps_active_routes_in_order() {
        let routes = fixture();
        assert_eq!(ids(filter_routes(&routes, &RouteFilter::default())), vec![1, 2, 3, 4, 6, 7]);
    }

    #[test]
    fn shaded_only() {
        let routes = fixture();
        assert_eq!(ids(filter_routes(&routes, &RouteFilter::shaded())), vec![1, 3, 6]);
    }

    #[test]
    fn lit_only() {
        let routes = fixture();
        assert_eq!(ids(filter_routes(&routes, &RouteFilter::lit())), vec![2, 3, 6, 7]);
    }

    #[test]
    fn shaded_and_lit() {
        let routes = fixture();
        let filter = RouteFilter { shaded_only: true, lit_only: true, ..RouteFilter::default() };
        assert_eq!(ids(filter_routes(&routes, &filter)), vec![3, 6]);
    }

    #[test]
    fn accessible_and_unblocked() {
        let routes = fixture();
        let filter = RouteFilter {
            lit_only: true,
            accessible_only: true,
            exclude_blocked: true,
            ..RouteFilter::default()
        };
        assert_eq!(ids(filter_routes(&routes, &filter)), vec![2, 3]);
    }

    #[test]
    fn max_distance_keeps_unmeasured_routes() {
        let routes = fixture();
        let filter = RouteFilter { max_distance_km: Some(2.0), ..RouteFilter::default() };
        assert_eq!(ids(filter_routes(&routes, &filter)), vec![1, 3, 4, 6, 7]);
    }

    #[test]
    fn inactive_routes_on_request() {
        let routes = fixture();
        let filter = RouteFilter { active_only: false, shaded_only: true, ..RouteFilter::default() };
        assert_eq!(ids(filter_routes(&routes, &filter)), vec![1, 3, 5, 6]);
    }

    #[test]
    fn no_match_is_empty() {
        let routes = vec![route(1, 40.0, 29.0)];
        assert!(filter_routes(&routes, &RouteFilter::shaded()).is_empty());
        assert!(filter_routes(&[], &RouteFilter::default()).is_empty());
    }

    #[test]
    fn input_is_untouched() {
        let routes = fixture();
        let before = routes.clone();
        let _ = filter_routes(&routes, &RouteFilter::lit());
        assert_eq!(routes, before);
    }
}

// ── Ranking ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ranking {
    use super::*;
    use crate::{rank_routes, RankRequest};

    #[test]
    fn deviation_minus_shade_bonus() {
        let routes = vec![
            route(1, 40.0, 29.0).with_shade(20.0),
            route(2, 40.0, 29.0).with_shade(80.0),
            route(3, 40.02, 29.0).with_shade(100.0), // 2.2 km off at each end
        ];
        let request = RankRequest::new(p(40.0, 29.0), p(40.01, 29.0));
        let ranked = rank_routes(&routes, &request);
        let order: Vec<u64> = ranked.iter().map(|r| r.route.id.0).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert!((ranked[0].score + 0.8).abs() < 1e-9);
        assert!(ranked[0].total_deviation_km.abs() < 1e-9);
        assert!((ranked[2].start_deviation_km - 2.2239).abs() < 1e-3);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let routes = vec![
            route(9, 40.0, 29.0).with_shade(50.0),
            route(4, 40.0, 29.0).with_shade(50.0),
            route(7, 40.0, 29.0).with_shade(50.0),
        ];
        let ranked = rank_routes(&routes, &RankRequest::new(p(40.0, 29.0), p(40.01, 29.0)));
        let order: Vec<u64> = ranked.iter().map(|r| r.route.id.0).collect();
        assert_eq!(order, vec![9, 4, 7]);
    }

    #[test]
    fn top_five_by_default() {
        let routes: Vec<_> = (0..8).map(|i| route(i, 40.0 + i as f64 * 0.001, 29.0).with_shade(10.0)).collect();
        let ranked = rank_routes(&routes, &RankRequest::new(p(40.0, 29.0), p(40.01, 29.0)));
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].route.id, RouteId(0));
    }

    #[test]
    fn without_shade_preference_unshaded_routes_rank() {
        let routes = vec![route(1, 40.001, 29.0).with_shade(100.0), route(2, 40.0, 29.0)];
        let request = RankRequest { prefer_shade: false, ..RankRequest::new(p(40.0, 29.0), p(40.01, 29.0)) };
        let ranked = rank_routes(&routes, &request);
        let order: Vec<u64> = ranked.iter().map(|r| r.route.id.0).collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(ranked[0].score, ranked[0].total_deviation_km);
    }

    #[test]
    fn blocked_and_long_routes_never_rank() {
        let mut blocked = route(1, 40.0, 29.0).with_shade(90.0);
        blocked.blocked = true;
        let routes = vec![blocked, route(2, 40.0, 29.0).with_shade(90.0).with_distance_km(9.0)];
        let request = RankRequest { max_distance_km: Some(5.0), ..RankRequest::new(p(40.0, 29.0), p(40.01, 29.0)) };
        assert!(rank_routes(&routes, &request).is_empty());
    }
}

// ── Recommendations ───────────────────────────────────────────────────────────

#[cfg(test)]
mod recommendations {
    use super::*;
    use crate::{recommend_nearby, TimeOfDay, DEFAULT_RADIUS_KM};

    fn fixture() -> Vec<WalkingRoute> {
        let mut blocked = route(4, 40.0, 29.0).with_shade(90.0);
        blocked.blocked = true;
        vec![
            route(1, 40.02, 29.0).with_shade(60.0),   // ~2.2 km
            route(2, 40.005, 29.0).with_shade(30.0),  // ~0.6 km
            route(3, 40.001, 29.0).with_lighting(),   // ~0.1 km
            blocked,
            route(5, 40.2, 29.0).with_shade(90.0),    // ~22 km
        ]
    }

    #[test]
    fn day_prefers_shade_nearest_first() {
        let routes = fixture();
        let recs = recommend_nearby(&routes, p(40.0, 29.0), TimeOfDay::Day, DEFAULT_RADIUS_KM);
        let order: Vec<u64> = recs.iter().map(|r| r.route.id.0).collect();
        assert_eq!(order, vec![2, 1]);
        assert!(recs[0].distance_km < recs[1].distance_km);
    }

    #[test]
    fn night_prefers_lit() {
        let routes = fixture();
        let recs = recommend_nearby(&routes, p(40.0, 29.0), TimeOfDay::Night, DEFAULT_RADIUS_KM);
        let order: Vec<u64> = recs.iter().map(|r| r.route.id.0).collect();
        assert_eq!(order, vec![3]);
    }

    #[test]
    fn radius_bounds_results() {
        let routes = fixture();
        let recs = recommend_nearby(&routes, p(40.0, 29.0), TimeOfDay::Day, 1.0);
        assert_eq!(recs.len(), 1);
        let wide = recommend_nearby(&routes, p(40.0, 29.0), TimeOfDay::Day, 50.0);
        assert_eq!(wide.len(), 3);
    }

    #[test]
    fn at_most_five() {
        let routes: Vec<_> = (0..9).map(|i| route(i, 40.0 + i as f64 * 0.001, 29.0).with_shade(50.0)).collect();
        let recs = recommend_nearby(&routes, p(40.0, 29.0), TimeOfDay::Day, DEFAULT_RADIUS_KM);
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[4].route.id, RouteId(4));
    }
}

// ── Attribute scoring ─────────────────────────────────────────────────────────

#[cfg(test)]
mod scoring {
    use super::*;
    use crate::{AttributeIndex, AttributeKind, AttributeSample, Quality, RankingError};

    fn sample(lat: f64, lon: f64, score: f64) -> AttributeSample {
        AttributeSample { pos: p(lat, lon), score }
    }

    #[test]
    fn thresholds_per_kind() {
        assert_eq!(AttributeKind::Shade.classify(0.29), Quality::Poor);
        assert_eq!(AttributeKind::Shade.classify(0.3), Quality::Medium);
        assert_eq!(AttributeKind::Shade.classify(0.5), Quality::Good);
        assert_eq!(AttributeKind::Lighting.classify(0.39), Quality::Poor);
        assert_eq!(AttributeKind::Lighting.classify(0.5), Quality::Medium);
        assert_eq!(AttributeKind::Lighting.classify(0.7), Quality::Good);
    }

    #[test]
    fn nearest_within_radius() {
        let index = AttributeIndex::new(
            AttributeKind::Shade,
            vec![
                sample(40.0 + 40.0 * DEG_PER_M, 29.0, 0.9),
                sample(40.0 - 20.0 * DEG_PER_M, 29.0, 0.1),
            ],
        )
        .unwrap();
        assert_eq!(index.len(), 2);
        let hit = index.nearest_within(p(40.0, 29.0), 50.0).unwrap();
        assert_eq!(hit.score, 0.1);
        assert!(index.nearest_within(p(40.0, 29.0), 10.0).is_none());
        assert!(index.nearest_within(p(40.0 + 100.0 * DEG_PER_M, 29.0), 50.0).is_none());
    }

    #[test]
    fn score_mixes_penalty_and_mean() {
        let a = p(40.0, 29.0);
        let b = p(40.001, 29.0);
        let c = p(40.002, 29.0);
        let index = AttributeIndex::new(
            AttributeKind::Shade,
            vec![
                AttributeSample { pos: a, score: 0.2 },
                AttributeSample { pos: b, score: 0.4 },
                AttributeSample { pos: c, score: 0.9 },
            ],
        )
        .unwrap();
        let s = index.score_route(&[a, b, c]).unwrap();
        assert_eq!(s.matched, 3);
        assert_eq!(s.poor_points, 1);
        assert!((s.mean - 0.5).abs() < 1e-9);
        // 1.5 weighted poor points * 2.0 + (1 - 0.5) * 0.5
        assert!((s.score - 3.25).abs() < 1e-9);
    }

    #[test]
    fn shadier_route_scores_lower() {
        let index = AttributeIndex::new(
            AttributeKind::Shade,
            vec![sample(40.0, 29.0, 0.95), sample(40.0, 29.01, 0.05)],
        )
        .unwrap();
        let shady = index.score_route(&[p(40.0, 29.0)]).unwrap();
        let sunny = index.score_route(&[p(40.0, 29.01)]).unwrap();
        assert!(shady.score < sunny.score);
    }

    #[test]
    fn samples_at_most_twenty_points() {
        let coords: Vec<_> = (0..100).map(|i| p(40.0 + i as f64 * 0.0001, 29.0)).collect();
        let samples = coords.iter().map(|&pos| AttributeSample { pos, score: 1.0 }).collect();
        let index = AttributeIndex::new(AttributeKind::Lighting, samples).unwrap();
        let s = index.score_route(&coords).unwrap();
        assert_eq!(s.matched, 20);
        assert_eq!(s.score, 0.0);

        let s = index.score_route(&coords[..39]).unwrap();
        assert_eq!(s.matched, 20);
    }

    #[test]
    fn unjudgeable_routes() {
        let index = AttributeIndex::new(AttributeKind::Shade, vec![sample(40.0, 29.0, 0.5)]).unwrap();
        assert!(index.score_route(&[]).is_none());
        assert!(index.score_route(&[p(41.0, 29.0)]).is_none());
        let empty = AttributeIndex::new(AttributeKind::Shade, vec![]).unwrap();
        assert!(empty.is_empty());
        assert!(empty.score_route(&[p(40.0, 29.0)]).is_none());
    }

    #[test]
    fn invalid_samples_rejected() {
        let err = AttributeIndex::new(AttributeKind::Shade, vec![sample(40.0, 29.0, 0.5), sample(40.0, 29.0, 1.5)])
            .err()
            .unwrap();
        assert!(matches!(err, RankingError::InvalidSample { index: 1, .. }));
        assert!(AttributeIndex::new(AttributeKind::Lighting, vec![sample(95.0, 29.0, 0.5)]).is_err());
    }
}

// ── Map features ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod features {
    use super::*;
    use crate::{filter_routes, to_map_features, RouteColour, RouteFilter};

    #[test]
    fn colour_classes() {
        let deep = route(1, 40.0, 29.0).with_shade(70.0);
        let light = route(2, 40.0, 29.0).with_shade(69.9).with_lighting();
        let lit = route(3, 40.0, 29.0).with_lighting();
        let plain = route(4, 40.0, 29.0);
        assert_eq!(RouteColour::of(&deep), RouteColour::DeepShade);
        assert_eq!(RouteColour::of(&light), RouteColour::Shaded);
        assert_eq!(RouteColour::of(&lit), RouteColour::Lit);
        assert_eq!(RouteColour::of(&plain), RouteColour::Plain);
        assert_eq!(RouteColour::Lit.hex(), "#FFD700");
    }

    #[test]
    fn features_carry_lon_lat_geometry() {
        let routes = vec![route(1, 40.0, 29.0).with_shade(85.0).with_distance_km(1.1)];
        let features = to_map_features(&routes);
        assert_eq!(features.len(), 1);
        let f = &features[0];
        assert_eq!(f.coordinates[0], [29.0, 40.0]);
        assert_eq!(f.coordinates.len(), 3);
        assert_eq!(f.properties.id, RouteId(1));
        assert_eq!(f.properties.hex, "#228B22");
        assert_eq!(f.properties.distance_km, Some(1.1));
    }

    #[test]
    fn filtered_routes_render_in_order() {
        let routes = vec![
            route(1, 40.0, 29.0).with_lighting(),
            route(2, 40.0, 29.0),
            route(3, 40.0, 29.0).with_lighting(),
        ];
        let features = to_map_features(filter_routes(&routes, &RouteFilter::lit()));
        let order: Vec<u64> = features.iter().map(|f| f.properties.id.0).collect();
        assert_eq!(order, vec![1, 3]);
    }

    #[test]
    fn geometry_length_matches_haversine() {
        let r = route(1, 40.0, 29.0);
        assert!((r.geometry_length_km() - 1.11195).abs() < 1e-4);
    }
}
