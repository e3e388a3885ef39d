//! Distance/cost model.
//!
//! Edge costs are derived from great-circle (or source-supplied) distances:
//!
//! ```text
//! fuel accounting on:   cost = distance_m * distance_weight
//!                            + distance_km * fuel_cost_per_km
//! fuel accounting off:  cost = distance_m
//! ```
//!
//! Costs must be non-negative and finite; Dijkstra's correctness depends on
//! it.  Weights are validated up front and every computed cost is checked.

use crate::{CoreError, CoreResult, GeoPoint};

/// Cost weighting applied to edge distances.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostWeights {
    /// Multiplier on metres.  Only used when fuel accounting is on.
    pub distance_weight: f64,
    /// Fuel cost per kilometre.  `None` disables fuel accounting and the
    /// cost is the raw distance in metres.
    pub fuel_cost_per_km: Option<f64>,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self { distance_weight: 1.0, fuel_cost_per_km: None }
    }
}

impl CostWeights {
    /// Weights with fuel accounting enabled.
    pub fn with_fuel(distance_weight: f64, fuel_cost_per_km: f64) -> Self {
        Self { distance_weight, fuel_cost_per_km: Some(fuel_cost_per_km) }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.distance_weight.is_finite() || self.distance_weight < 0.0 {
            return Err(CoreError::invalid(
                "distance_weight",
                format!("must be a finite value >= 0, got {}", self.distance_weight),
            ));
        }
        match self.fuel_cost_per_km {
            Some(fuel) if !fuel.is_finite() || fuel < 0.0 => Err(CoreError::invalid(
                "fuel_cost_per_km",
                format!("must be a finite value >= 0, got {fuel}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Cost of travelling `distance_m` metres under `weights`.
///
/// Returns [`CoreError::Internal`] if the result is negative or not finite,
/// which can only happen with unvalidated weights or a corrupt distance.
pub fn edge_cost(distance_m: f64, weights: &CostWeights) -> CoreResult<f64> {
    let cost = match weights.fuel_cost_per_km {
        Some(fuel) => distance_m * weights.distance_weight + distance_m / 1000.0 * fuel,
        None => distance_m,
    };
    if !cost.is_finite() || cost < 0.0 {
        return Err(CoreError::Internal(format!(
            "computed cost {cost} for distance {distance_m} m is not a non-negative number"
        )));
    }
    Ok(cost)
}

/// Cost between two points using great-circle distance.
pub fn cost(a: GeoPoint, b: GeoPoint, weights: &CostWeights) -> CoreResult<f64> {
    edge_cost(a.distance_m(b), weights)
}
