//! Shade and lighting sample index, and route scoring against it.
//!
//! Samples are point measurements (a tree-canopy shade score, a street-lamp
//! lighting score) in `[0, 1]`, higher is better.  A route is scored by
//! looking up the nearest sample within [`SAMPLE_RADIUS_M`] of up to
//! [`MAX_SAMPLED_POINTS`] evenly spaced route coordinates.
//!
//! ```text
//! penalty = 2.0 · (poor points + 0.5 · medium points)
//! score   = penalty + (1 − mean sample score) · 0.5      lower is better
//! ```

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use cr_core::GeoPoint;

use crate::{RankingError, RankingResult};

/// Lookup radius around each sampled route coordinate.
pub const SAMPLE_RADIUS_M: f64 = 50.0;

/// Route coordinates checked per route.
pub const MAX_SAMPLED_POINTS: usize = 20;

const POOR_POINT_PENALTY: f64 = 2.0;
const MEAN_WEIGHT: f64 = 0.5;

/// Lower bound on metres per degree of latitude, so the search envelope
/// always covers the radius.
const M_PER_DEG: f64 = 111_000.0;

/// Which attribute the samples measure.  Sets the quality thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeKind {
    /// Poor (sunny) below 0.3, medium below 0.5.
    Shade,
    /// Poor (dark) below 0.4, medium below 0.7.
    Lighting,
}

impl AttributeKind {
    fn thresholds(self) -> (f64, f64) {
        match self {
            AttributeKind::Shade => (0.3, 0.5),
            AttributeKind::Lighting => (0.4, 0.7),
        }
    }

    pub fn classify(self, score: f64) -> Quality {
        let (poor, medium) = self.thresholds();
        if score < poor {
            Quality::Poor
        } else if score < medium {
            Quality::Medium
        } else {
            Quality::Good
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quality {
    Poor,
    Medium,
    Good,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSample {
    pub pos: GeoPoint,
    /// In `[0, 1]`, higher is better.
    pub score: f64,
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct SampleEntry {
    point: [f64; 2], // [lat, lon]
    idx: usize,
}

impl RTreeObject for SampleEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for SampleEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── AttributeIndex ────────────────────────────────────────────────────────────

/// Route score against an [`AttributeIndex`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteScore {
    /// Lower is better.
    pub score: f64,
    /// Poor points plus half the medium points, rounded down.
    pub poor_points: u32,
    pub mean: f64,
    /// Sampled coordinates that had a sample within range.
    pub matched: usize,
}

/// Spatial index over attribute samples of one kind.
pub struct AttributeIndex {
    kind: AttributeKind,
    samples: Vec<AttributeSample>,
    tree: RTree<SampleEntry>,
}

impl AttributeIndex {
    /// # Errors
    ///
    /// [`RankingError::InvalidSample`] for a score outside `[0, 1]` or an
    /// invalid coordinate.
    pub fn new(kind: AttributeKind, samples: Vec<AttributeSample>) -> RankingResult<Self> {
        if let Some((i, s)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| !s.pos.is_valid() || !(0.0..=1.0).contains(&s.score))
        {
            return Err(RankingError::InvalidSample {
                index: i,
                reason: format!("score {} at {}", s.score, s.pos),
            });
        }
        let entries = samples
            .iter()
            .enumerate()
            .map(|(idx, s)| SampleEntry { point: [s.pos.lat, s.pos.lon], idx })
            .collect();
        Ok(Self { kind, samples, tree: RTree::bulk_load(entries) })
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Closest sample strictly within `radius_m` of `pos`, by great-circle
    /// distance.
    pub fn nearest_within(&self, pos: GeoPoint, radius_m: f64) -> Option<&AttributeSample> {
        let dlat = radius_m / M_PER_DEG;
        let dlon = radius_m / (M_PER_DEG * pos.lat.to_radians().cos().max(1e-6));
        let envelope = AABB::from_corners(
            [pos.lat - dlat, pos.lon - dlon],
            [pos.lat + dlat, pos.lon + dlon],
        );
        self.tree
            .locate_in_envelope(&envelope)
            .map(|e| (e.idx, pos.distance_m(self.samples[e.idx].pos)))
            .filter(|&(_, d)| d < radius_m)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(idx, _)| &self.samples[idx])
    }

    /// Score a route's line geometry.  `None` when no sampled coordinate has
    /// a sample in range (the route cannot be judged).
    pub fn score_route(&self, coords: &[GeoPoint]) -> Option<RouteScore> {
        if coords.is_empty() {
            return None;
        }
        let step = coords.len().div_ceil(MAX_SAMPLED_POINTS).max(1);

        let mut weighted_poor = 0.0;
        let mut total = 0.0;
        let mut matched = 0usize;
        for &pos in coords.iter().step_by(step) {
            let Some(sample) = self.nearest_within(pos, SAMPLE_RADIUS_M) else {
                continue;
            };
            matched += 1;
            total += sample.score;
            weighted_poor += match self.kind.classify(sample.score) {
                Quality::Poor => 1.0,
                Quality::Medium => 0.5,
                Quality::Good => 0.0,
            };
        }
        if matched == 0 {
            return None;
        }

        let mean = total / matched as f64;
        Some(RouteScore {
            score: weighted_poor * POOR_POINT_PENALTY + (1.0 - mean) * MEAN_WEIGHT,
            poor_points: weighted_poor as u32,
            mean,
            matched,
        })
    }
}
