//! Bin records and the reasons a qualifying bin can be left out.

use cr_core::{BinId, CoreError, CoreResult, NodeKey};

/// A waste bin as seen by one optimization request.
///
/// Fill levels change between requests (sensor or manual updates); the
/// optimizer only reads them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bin {
    pub id: BinId,
    /// Road-network node the bin is collected from.
    pub node: NodeKey,
    /// Fill fraction in `[0, 1]`.
    pub fill: f64,
    /// Vehicle capacity consumed when the bin is emptied.
    pub load: f64,
}

impl Bin {
    pub fn new(id: u64, node: impl Into<NodeKey>, fill: f64, load: f64) -> Self {
        Self { id: BinId(id), node: node.into(), fill, load }
    }

    pub(crate) fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.fill) {
            return Err(CoreError::invalid(
                "bin.fill",
                format!("bin {} fill must be within [0, 1], got {}", self.id, self.fill),
            ));
        }
        if !self.load.is_finite() || self.load < 0.0 {
            return Err(CoreError::invalid(
                "bin.load",
                format!("bin {} load must be a finite value >= 0, got {}", self.id, self.load),
            ));
        }
        Ok(())
    }
}

/// Why a bin above the fill threshold was not visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipReason {
    /// No path from the depot (isolated component or cut off by blocks).
    Unreachable,
    /// The bin's load alone is larger than the vehicle capacity.
    ExceedsCapacity,
    /// The bin's node is not part of the graph.
    UnknownNode,
    /// `single_trip_only` ended the route before the bin fit.
    TripLimit,
    /// Reachable from the depot, but the vehicle was left at a stop with no
    /// path back and could not get to the bin from there.
    Stranded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedBin {
    pub bin: BinId,
    pub reason: SkipReason,
}
