//! Error types for GeoTIFF header parsing.

use thiserror::Error;

pub type GeoTiffResult<T> = Result<T, GeoTiffError>;

#[derive(Debug, Error)]
pub enum GeoTiffError {
    #[error("Invalid TIFF: {0}")]
    InvalidTiff(String),

    /// The buffer ends before a structure the parser needs. Callers
    /// reading over the network can fetch at least `needed` leading
    /// bytes and parse again.
    #[error("Truncated header: need {needed} bytes, have {available}")]
    Truncated { needed: u64, available: u64 },

    #[error("Missing required tag {0}")]
    MissingTag(&'static str),

    #[error("Unsupported GeoTIFF: {0}")]
    Unsupported(String),
}
