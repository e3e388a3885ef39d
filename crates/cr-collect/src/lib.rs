//! `cr-collect`: waste-collection route optimizer for the civic-route
//! workspace.
//!
//! A heuristic, not an exact VRP solver: greedy nearest-feasible ordering
//! over network shortest-path costs, with depot returns when the vehicle
//! is full and optional 2-opt refinement of each trip.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`bin`]       | `Bin`, `SkipReason`, `SkippedBin`                     |
//! | [`optimizer`] | `optimize_route`, `plan_collection`                   |
//! | [`route`]     | `CollectionRoute`, `Trip`, `Stop`, `RouteMetrics`     |
//! | [`two_opt`]   | Per-trip 2-opt refinement                             |
//! | [`error`]     | `CollectError`, `CollectResult<T>`                    |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Fills the cost matrix on Rayon's thread pool.          |
//! | `serde`    | Derives `Serialize`/`Deserialize` on result types.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cr_collect::{optimize_route, Bin};
//! use cr_core::{NodeKey, RouteConfig};
//!
//! let bins = vec![Bin::new(1, "j12", 0.92, 1.0), Bin::new(2, "j40", 0.75, 1.0)];
//! let route = optimize_route(&graph, &NodeKey::new("depot"), &bins, &RouteConfig::default())?;
//! println!("{} stops, {:.1} km", route.visited.len(), route.metrics.distance_km);
//! ```

pub mod bin;
pub mod error;
mod matrix;
pub mod optimizer;
pub mod route;
pub mod two_opt;


pub use bin::{Bin, SkipReason, SkippedBin};
pub use error::{CollectError, CollectResult};
pub use optimizer::{optimize_route, plan_collection};
pub use route::{CollectionRoute, RouteMetrics, Stop, Trip};
