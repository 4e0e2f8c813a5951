//! Errors raised while constructing field sources.
//!
//! Evaluation never fails; only construction is validated.

use thiserror::Error;

/// Reasons a field source could not be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldSourceError {
    /// The requested geometry cannot carry a well-defined current path,
    /// e.g. coincident endpoints, an empty parameter interval, or a non-positive radius.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The parametric curve does not produce a usable position.
    #[error("invalid source function: {0}")]
    InvalidSourceFunction(String),
}

pub type FieldSourceResult<T> = Result<T, FieldSourceError>;
