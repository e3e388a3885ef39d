//! `cr-network`: road graph, spatial snapping, and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`records`]  | `NodeRecord`, `EdgeRecord`, `BlockedRoad`, `TimeWindow`    |
//! | [`network`]  | `GeoGraph` (CSR + R-tree), `GeoGraphBuilder`               |
//! | [`build`]    | `build_graph`, `BlockMode`                                 |
//! | [`router`]   | `Router` trait, `DijkstraRouter`, `shortest_path`, `PathTree` |
//! | [`disaster`] | `safe_route`, `evacuation_route`                           |
//! | [`loader`]   | CSV loaders for nodes, segments, and blocks                |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public record types.    |

pub mod build;
pub mod disaster;
pub mod error;
pub mod loader;
pub mod network;
pub mod records;
pub mod router;


pub use build::{build_graph, BlockMode};
pub use disaster::{evacuation_route, safe_route, Evacuation, SafeRouteOutcome, SafeZone, SafetyClass};
pub use error::{SpatialError, SpatialResult};
pub use network::{GeoGraph, GeoGraphBuilder};
pub use records::{active_blocks, BlockedRoad, EdgeRecord, NodeRecord, SegmentAttributes, TimeWindow};
pub use router::{shortest_path, shortest_path_tree, DijkstraRouter, Exclusions, Path, PathOutcome, PathTree, Router};
