//! Network-subsystem error type.

use thiserror::Error;

use cr_core::{CoreError, NodeKey};

/// Errors produced by `cr-network`.
///
/// An unreachable goal is *not* an error; see
/// [`PathOutcome::NotFound`](crate::PathOutcome::NotFound).
#[derive(Debug, Error)]
pub enum SpatialError {
    /// Malformed input topology: dangling edge reference, empty node set,
    /// duplicate key, bad coordinate or distance.
    #[error("graph construction error: {0}")]
    GraphConstruction(String),

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeKey),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("record parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
