//! Collaborators of the reconciliation engine.
//!
//! The engine only talks to the outside world through these traits; the
//! service provides HTTP implementations and the tests in-memory fakes.

use async_trait::async_trait;
use geotiff_parser::RasterHeader;
use stac_common::{Collection, Item, ItemFootprint};

use crate::error::Result;

/// Lists raster files in an upstream directory.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// File names (relative to `url`) of the rasters listed at `url`, in
    /// page order.
    async fn list_files(&self, url: &str) -> Result<Vec<String>>;
}

/// Reads the header of a remote raster.
#[async_trait]
pub trait RasterHeaderReader: Send + Sync {
    async fn read_header(&self, href: &str) -> Result<RasterHeader>;
}

/// Read access to the downstream catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<Collection>>;

    async fn get_collection(&self, collection_id: &str) -> Result<Collection>;

    /// All items of a collection, following pagination to the end.
    async fn collection_items(&self, collection_id: &str) -> Result<Vec<ItemFootprint>>;
}

/// Write access to the downstream catalog.
#[async_trait]
pub trait CatalogPublisher: Send + Sync {
    async fn create_item(&self, item: &Item) -> Result<()>;

    async fn update_item(&self, item: &Item) -> Result<()>;

    async fn update_collection(&self, collection: &Collection) -> Result<()>;

    /// Update `item` when it already exists downstream, create it otherwise.
    async fn upsert_item(&self, item: &Item, exists: bool) -> Result<()> {
        if exists {
            self.update_item(item).await
        } else {
            self.create_item(item).await
        }
    }
}
