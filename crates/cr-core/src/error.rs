//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Out-of-range request configuration.  Raised before any computation.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A broken internal invariant (e.g. a negative computed cost).  The
    /// request is aborted rather than returning a wrong route.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidParameter { name, reason: reason.into() }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
