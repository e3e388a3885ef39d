//! `cr-core`: foundational types for the civic-route workspace.
//!
//! This crate is a dependency of every other `cr-*` crate.  It has no `cr-*`
//! dependencies and minimal external ones (`thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `EdgeId`, `SegmentId`, `BinId`, `RouteId`, keys |
//! | [`geo`]     | `GeoPoint`, haversine distance                            |
//! | [`cost`]    | `CostWeights`, `edge_cost`, `cost`                        |
//! | [`config`]  | `RouteConfig` and its validation                          |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod cost;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::RouteConfig;
pub use cost::{cost, edge_cost, CostWeights};
pub use error::{CoreError, CoreResult};
pub use geo::{haversine_m, GeoPoint, EARTH_RADIUS_M};
pub use ids::{BinId, EdgeId, EdgeKey, NodeId, NodeKey, RouteId, SegmentId};
