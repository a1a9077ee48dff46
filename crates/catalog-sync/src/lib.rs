//! GeoCubes → STAC catalog synchronization.
//!
//! Detects which rasters were added to the GeoCubes archive since the last
//! run and publishes only those as STAC items, keeping the owning
//! collection's GSD summaries and extent consistent.
//!
//! # Architecture
//!
//! - Dataset registry parsing and the dataset → collection translation
//! - Item grouping and identifier derivation (naming dialects)
//! - Item construction from raster headers
//! - The reconciliation engine, which talks to the outside world only
//!   through the traits in [`sources`]
//! - OSEO JSON conversion for the GeoServer write API

pub mod builder;
pub mod dataset;
pub mod error;
pub mod grouping;
pub mod naming;
pub mod oseo;
pub mod reconcile;
pub mod sources;
pub mod translation;

// Re-exports
pub use builder::{AssetFile, ItemBuilder};
pub use dataset::{parse_registry, DatasetDescriptor};
pub use error::{Result, SyncError};
pub use grouping::{group_files, ItemGroup};
pub use naming::NamingDialect;
pub use reconcile::{
    DatasetReport, NewDataset, ReconciliationEngine, RunReport, SyncContext, SyncOptions,
};
pub use sources::{CatalogPublisher, CatalogReader, ListingSource, RasterHeaderReader};
pub use translation::{CollectionIndex, TranslationTable};
