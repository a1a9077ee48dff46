//! Incremental reconciliation of upstream listings against the catalog.
//!
//! Per dataset, the items already in the downstream collection are read
//! once as a baseline. Every year path is then listed and grouped, and only
//! groups whose derived identifier is missing from the baseline are built
//! and published. When anything was added, the collection's extent is
//! recomputed over old and new items and the collection is written back
//! exactly once.
//!
//! Any listing, header or publish failure aborts the whole run.

use std::collections::HashSet;
use std::sync::Arc;

use stac_common::{Collection, ItemFootprint, TimeWindow};
use tracing::{debug, info, instrument, warn};

use crate::builder::{AssetFile, ItemBuilder};
use crate::dataset::DatasetDescriptor;
use crate::error::{Result, SyncError};
use crate::grouping::{group_files, ItemGroup};
use crate::naming::NamingDialect;
use crate::sources::{CatalogPublisher, CatalogReader, ListingSource, RasterHeaderReader};
use crate::translation::{CollectionIndex, TranslationTable};

/// Naming and CRS conventions of the downstream catalog.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Only collections whose id ends with this are considered
    pub collection_suffix: String,
    /// Removed from collection titles before matching display names
    pub title_suffix: String,
    /// CRS of rasters whose GeoKeys name none
    pub default_epsg: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            collection_suffix: "at_geocubes".to_string(),
            title_suffix: " (GeoCubes)".to_string(),
            default_epsg: 3067,
        }
    }
}

/// Everything the engine needs, passed in explicitly.
#[derive(Clone)]
pub struct SyncContext {
    pub listing: Arc<dyn ListingSource>,
    pub headers: Arc<dyn RasterHeaderReader>,
    pub reader: Arc<dyn CatalogReader>,
    pub publisher: Arc<dyn CatalogPublisher>,
    pub translations: TranslationTable,
    pub options: SyncOptions,
}

/// Upstream dataset with no translation-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDataset {
    pub name: String,
    pub folder: String,
    pub metadata_url: String,
}

impl From<&DatasetDescriptor> for NewDataset {
    fn from(d: &DatasetDescriptor) -> Self {
        Self {
            name: d.name.clone(),
            folder: d.folder.clone(),
            metadata_url: d.metadata_url.clone(),
        }
    }
}

/// Outcome of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReport {
    pub dataset: String,
    pub collection_id: String,
    /// Items in the collection before this run
    pub baseline_items: usize,
    /// Item groups found upstream, summed over year paths
    pub upstream_items: usize,
    /// Identifiers published this run, in publish order
    pub added: Vec<String>,
    /// Identifiers seen again under a later year path and skipped
    pub duplicates: Vec<String>,
    pub collection_updated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub datasets: Vec<DatasetReport>,
    pub new_datasets: Vec<NewDataset>,
    /// `(dataset, display name)` pairs with no matching downstream collection
    pub unmatched: Vec<(String, String)>,
}

impl RunReport {
    pub fn items_added(&self) -> usize {
        self.datasets.iter().map(|d| d.added.len()).sum()
    }
}

pub struct ReconciliationEngine {
    ctx: SyncContext,
}

impl ReconciliationEngine {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Synchronize every dataset, in registry order.
    pub async fn run(&self, datasets: &[DatasetDescriptor]) -> Result<RunReport> {
        let options = &self.ctx.options;
        let collections = self.ctx.reader.list_collections().await?;
        let index = CollectionIndex::new(
            &collections,
            &options.collection_suffix,
            &options.title_suffix,
        );
        info!(
            collections = index.len(),
            datasets = datasets.len(),
            "Loaded downstream collections"
        );

        let mut report = RunReport::default();
        for dataset in datasets {
            let Some(display_name) = self.ctx.translations.display_name(&dataset.name) else {
                let err = SyncError::UnknownDataset(dataset.name.clone());
                warn!(error = %err, folder = %dataset.folder, "Skipping dataset");
                report.new_datasets.push(NewDataset::from(dataset));
                continue;
            };

            let Some(collection_id) = index.collection_id(display_name) else {
                warn!(
                    dataset = %dataset.name,
                    display_name = %display_name,
                    "No downstream collection for dataset, skipping"
                );
                report
                    .unmatched
                    .push((dataset.name.clone(), display_name.to_string()));
                continue;
            };

            let dataset_report = self
                .sync_dataset(dataset, display_name, collection_id)
                .await?;
            report.datasets.push(dataset_report);
        }

        Ok(report)
    }

    /// Publish the items of `dataset` missing from collection `collection_id`.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name))]
    pub async fn sync_dataset(
        &self,
        dataset: &DatasetDescriptor,
        display_name: &str,
        collection_id: &str,
    ) -> Result<DatasetReport> {
        let mut collection = self.ctx.reader.get_collection(collection_id).await?;
        let baseline_items = self.ctx.reader.collection_items(collection_id).await?;

        // Read-only for the whole dataset, across all year paths.
        let baseline: HashSet<&str> = baseline_items.iter().map(|i| i.id.as_str()).collect();
        let mut published: HashSet<String> = HashSet::new();

        let dialect = NamingDialect::for_dataset(dataset, display_name);
        let builder = ItemBuilder::new(collection.id.clone(), self.ctx.options.default_epsg);
        let default_window = collection_window(&collection);

        let mut upstream_items = 0;
        let mut added = Vec::new();
        let mut duplicates = Vec::new();
        let mut new_footprints: Vec<ItemFootprint> = Vec::new();

        for year_path in &dataset.year_paths {
            let files = self.ctx.listing.list_files(year_path).await?;
            let groups = group_files(&files);
            upstream_items += groups.len();

            let window = TimeWindow::from_year_path(year_path).or(default_window);
            if window.is_none() {
                warn!(year_path = %year_path, "No year in path and no collection interval");
            }
            debug!(year_path = %year_path, files = files.len(), groups = groups.len(), "Listed year path");

            for group in &groups {
                let item_id = dialect.item_id(display_name, &group.key);

                if baseline.contains(item_id.as_str()) {
                    continue;
                }
                if published.contains(&item_id) {
                    warn!(item = %item_id, year_path = %year_path, "Item already published this run, skipping");
                    duplicates.push(item_id);
                    continue;
                }

                let assets = self.read_group(year_path, group).await?;
                let item = builder.build(item_id, &assets, window, &mut collection.summaries)?;
                self.ctx.publisher.create_item(&item).await?;
                info!(collection = %collection.id, item = %item.id, "Published item");

                new_footprints.push(item.footprint());
                published.insert(item.id.clone());
                added.push(item.id);
            }
        }

        let collection_updated = !added.is_empty();
        if collection_updated {
            collection.update_extent_from_items(baseline_items.iter().chain(&new_footprints));
            self.ctx.publisher.update_collection(&collection).await?;
            info!(collection = %collection.id, added = added.len(), "Updated collection");
        } else {
            debug!(collection = %collection.id, "All items present");
        }

        Ok(DatasetReport {
            dataset: dataset.name.clone(),
            collection_id: collection.id,
            baseline_items: baseline_items.len(),
            upstream_items,
            added,
            duplicates,
            collection_updated,
        })
    }

    /// Read the header of every file of a group, in group order.
    async fn read_group(&self, year_path: &str, group: &ItemGroup) -> Result<Vec<AssetFile>> {
        let mut files = Vec::with_capacity(group.files.len());
        for file_name in &group.files {
            let href = format!("{}{}", year_path, file_name);
            let header = self.ctx.headers.read_header(&href).await?;
            files.push(AssetFile {
                file_name: file_name.clone(),
                href,
                header,
            });
        }
        Ok(files)
    }
}

/// The collection's own interval, used for items outside year paths.
fn collection_window(collection: &Collection) -> Option<TimeWindow> {
    match collection.interval() {
        [Some(start), Some(end)] => Some(TimeWindow::new(start, end)),
        [Some(t), None] | [None, Some(t)] => Some(TimeWindow::new(t, t)),
        [None, None] => None,
    }
}
