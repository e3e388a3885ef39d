//! Input records supplied by the persistence / GeoJSON-loading collaborator.
//!
//! Ingested geographic data carries arbitrary extra properties.  The ones the
//! routing core understands are typed fields; everything else is kept in an
//! `extensions` map so it can be passed through to map output untouched.

use std::collections::BTreeMap;

use cr_core::{EdgeKey, GeoPoint, NodeKey};

/// A point of the road network.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRecord {
    pub key: NodeKey,
    pub pos: GeoPoint,
}

impl NodeRecord {
    pub fn new(key: impl Into<NodeKey>, lat: f64, lon: f64) -> Self {
        Self { key: key.into(), pos: GeoPoint::new(lat, lon) }
    }

    /// A record whose key is derived from its coordinate.
    pub fn at(pos: GeoPoint) -> Self {
        Self { key: NodeKey::from_point(pos), pos }
    }
}

/// Static attributes of a road or footpath segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentAttributes {
    pub shaded: bool,
    pub lit: bool,
}

/// A road segment between two nodes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    pub key: EdgeKey,
    pub from: NodeKey,
    pub to: NodeKey,
    /// Explicit length in metres.  When `None` the great-circle distance
    /// between the endpoints is used.
    pub length_m: Option<f64>,
    /// One-way segment.  Two-way segments become two directed edges with
    /// equal cost.
    pub directed: bool,
    pub attrs: SegmentAttributes,
    /// Source properties the routing core does not interpret.
    pub extensions: BTreeMap<String, String>,
}

impl EdgeRecord {
    /// A two-way segment with computed length and no attributes.
    pub fn road(key: impl Into<EdgeKey>, from: impl Into<NodeKey>, to: impl Into<NodeKey>) -> Self {
        Self {
            key: key.into(),
            from: from.into(),
            to: to.into(),
            length_m: None,
            directed: false,
            attrs: SegmentAttributes::default(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn length(mut self, length_m: f64) -> Self {
        self.length_m = Some(length_m);
        self
    }

    pub fn one_way(mut self) -> Self {
        self.directed = true;
        self
    }

    pub fn attrs(mut self, attrs: SegmentAttributes) -> Self {
        self.attrs = attrs;
        self
    }
}

/// Validity window of a block, in Unix seconds.  `end_unix_secs = None`
/// means open-ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    pub start_unix_secs: i64,
    pub end_unix_secs: Option<i64>,
}

impl TimeWindow {
    /// Half-open: `start <= t < end`.
    pub fn contains(&self, t: i64) -> bool {
        t >= self.start_unix_secs && self.end_unix_secs.is_none_or(|end| t < end)
    }
}

/// A road closure published by the disaster-management collaborator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockedRoad {
    pub edge: EdgeKey,
    pub window: TimeWindow,
    pub reason: Option<String>,
}

impl BlockedRoad {
    /// A block active from `start_unix_secs` with no end.
    pub fn open_ended(edge: impl Into<EdgeKey>, start_unix_secs: i64) -> Self {
        Self {
            edge: edge.into(),
            window: TimeWindow { start_unix_secs, end_unix_secs: None },
            reason: None,
        }
    }

    pub fn is_active_at(&self, t: i64) -> bool {
        self.window.contains(t)
    }
}

/// Blocks whose window contains `t`.
pub fn active_blocks(blocks: &[BlockedRoad], t: i64) -> impl Iterator<Item = &BlockedRoad> {
    blocks.iter().filter(move |b| b.is_active_at(t))
}
