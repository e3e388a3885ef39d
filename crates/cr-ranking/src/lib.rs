//! `cr-ranking`: shaded / lit walking route service for the civic-route
//! workspace.
//!
//! Works on precomputed [`WalkingRoute`] records; nothing here touches the
//! road graph.  Every operation is a pure function of its inputs and never
//! mutates them.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`route`]      | `WalkingRoute`                                        |
//! | [`filter`]     | `RouteFilter`, `filter_routes`, `rank_routes`         |
//! | [`recommend`]  | `recommend_nearby`, `TimeOfDay`                       |
//! | [`attributes`] | `AttributeIndex` (R-tree of samples), `score_route`   |
//! | [`features`]   | `to_map_features`, `RouteColour`                      |
//! | [`error`]      | `RankingError`, `RankingResult<T>`                    |

pub mod attributes;
pub mod error;
pub mod features;
pub mod filter;
pub mod recommend;
pub mod route;

#[cfg(test)]
mod tests;

pub use attributes::{AttributeIndex, AttributeKind, AttributeSample, Quality, RouteScore};
pub use error::{RankingError, RankingResult};
pub use features::{to_map_feature, to_map_features, FeatureProperties, MapFeature, RouteColour};
pub use filter::{filter_routes, rank_routes, RankRequest, RankedRoute, RouteFilter};
pub use recommend::{recommend_nearby, Recommendation, TimeOfDay, DEFAULT_RADIUS_KM};
pub use route::WalkingRoute;
