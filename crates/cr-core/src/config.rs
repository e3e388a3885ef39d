//! Per-request route configuration.
//!
//! Supplied by the caller with every optimization request; nothing here is
//! persisted.  Serde-derivable so applications can load it from JSON/TOML.

use crate::{CoreError, CoreResult, CostWeights};

/// Configuration for one collection-route request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouteConfig {
    /// Bins strictly above this fill fraction are collected.  Range [0, 1].
    pub fill_threshold: f64,

    /// Vehicle capacity in the same units as `Bin::load`.  May be
    /// `f64::INFINITY` for an unconstrained vehicle.
    pub vehicle_capacity: f64,

    /// Edge cost weighting.
    pub weights: CostWeights,

    /// Stop after the first trip instead of returning to the depot to
    /// unload and starting another.  Bins left over are reported as skipped.
    pub single_trip_only: bool,

    /// Append the final leg back to the depot after the last stop.
    pub return_to_depot: bool,

    /// Refine each trip's stop order with 2-opt after the greedy pass.
    pub two_opt: bool,

    /// Average vehicle speed used for the duration estimate.
    pub average_speed_kmh: f64,

    /// Service time spent at each bin.
    pub stop_time_min: f64,

    /// Fuel consumption used for the fuel estimate.
    pub fuel_litres_per_km: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            fill_threshold:     0.7,
            vehicle_capacity:   f64::INFINITY,
            weights:            CostWeights::default(),
            single_trip_only:   false,
            return_to_depot:    false,
            two_opt:            false,
            average_speed_kmh:  30.0,
            stop_time_min:      3.0,
            fuel_litres_per_km: 0.15,
        }
    }
}

impl RouteConfig {
    /// Reject out-of-range parameters before any computation begins.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.fill_threshold) {
            return Err(CoreError::invalid(
                "fill_threshold",
                format!("must be within [0, 1], got {}", self.fill_threshold),
            ));
        }
        // NaN fails `>= 0.0`; +inf is allowed.
        if !(self.vehicle_capacity >= 0.0) {
            return Err(CoreError::invalid(
                "vehicle_capacity",
                format!("must be >= 0, got {}", self.vehicle_capacity),
            ));
        }
        self.weights.validate()?;
        if !self.average_speed_kmh.is_finite() || self.average_speed_kmh <= 0.0 {
            return Err(CoreError::invalid(
                "average_speed_kmh",
                format!("must be a finite value > 0, got {}", self.average_speed_kmh),
            ));
        }
        if !self.stop_time_min.is_finite() || self.stop_time_min < 0.0 {
            return Err(CoreError::invalid(
                "stop_time_min",
                format!("must be a finite value >= 0, got {}", self.stop_time_min),
            ));
        }
        if !self.fuel_litres_per_km.is_finite() || self.fuel_litres_per_km < 0.0 {
            return Err(CoreError::invalid(
                "fuel_litres_per_km",
                format!("must be a finite value >= 0, got {}", self.fuel_litres_per_km),
            ));
        }
        Ok(())
    }
}
