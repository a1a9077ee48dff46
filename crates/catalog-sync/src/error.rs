//! Error types for the catalog-sync crate.

use thiserror::Error;

/// Errors that can occur while synchronizing the catalog.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Registry or directory listing could not be fetched.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Dataset has no translation-table entry. Reported, never fatal.
    #[error("No translation for dataset: {0}")]
    UnknownDataset(String),

    #[error("Failed to read raster header {href}: {reason}")]
    AssetMetadata { href: String, reason: String },

    #[error("Downstream rejected {operation}: {reason}")]
    DownstreamRejected { operation: String, reason: String },

    #[error("Failed to read downstream catalog: {0}")]
    CatalogRead(String),

    #[error("Invalid dataset registry: {0}")]
    InvalidRegistry(String),

    #[error("Invalid translation table: {0}")]
    InvalidTranslationTable(String),

    #[error("Projection error: {0}")]
    Projection(#[from] projection::ProjectionError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type for catalog-sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
