//! Error types for STAC model operations.

use thiserror::Error;

/// Result type alias using StacError.
pub type StacResult<T> = Result<T, StacError>;

/// Errors raised while constructing or interpreting STAC records.
#[derive(Debug, Error)]
pub enum StacError {
    #[error("Invalid ground sample distance: {0}")]
    InvalidGsd(f64),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),
}
