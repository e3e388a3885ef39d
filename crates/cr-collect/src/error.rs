use cr_core::CoreError;
use cr_network::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    /// Invalid request parameters or an internal cost invariant violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Depot not in the graph, or graph construction failed.
    #[error(transparent)]
    Network(#[from] SpatialError),
}

pub type CollectResult<T> = Result<T, CollectError>;
