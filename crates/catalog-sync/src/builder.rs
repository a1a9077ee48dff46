//! Item construction from a group's raster headers.

use std::collections::BTreeMap;

use geotiff_parser::RasterHeader;
use projection::{raster_bounds, Crs, DEFAULT_DENSIFY_POINTS};
use stac_common::{Asset, AssetRole, Gsd, Item, ItemProperties, Summaries, TimeWindow};
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::grouping::file_stem;

/// One file of an item group together with its header.
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub file_name: String,
    pub href: String,
    pub header: RasterHeader,
}

/// Builds the items of one collection.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    collection_id: String,
    /// CRS assumed for rasters whose GeoKeys name none
    default_epsg: u32,
}

impl ItemBuilder {
    pub fn new(collection_id: impl Into<String>, default_epsg: u32) -> Self {
        Self {
            collection_id: collection_id.into(),
            default_epsg,
        }
    }

    /// Build one item from its files in group order.
    ///
    /// The first file becomes the `COG` asset, every later one a band asset
    /// named by the last `_` token of its stem. Every asset's GSD is added
    /// to `summaries` if not yet recorded; the item's GSD is the minimum.
    pub fn build(
        &self,
        item_id: String,
        files: &[AssetFile],
        window: Option<TimeWindow>,
        summaries: &mut Summaries,
    ) -> Result<Item> {
        let primary = files.first().ok_or_else(|| SyncError::AssetMetadata {
            href: item_id.clone(),
            reason: "item group has no files".to_string(),
        })?;

        let mut assets = BTreeMap::new();
        let mut min_gsd: Option<Gsd> = None;

        for (i, file) in files.iter().enumerate() {
            let role = if i == 0 {
                AssetRole::Primary
            } else {
                AssetRole::band_from_stem(file_stem(&file.file_name))
            };

            let gsd = Gsd::from_resolution(file.header.resolution()).map_err(|e| {
                SyncError::AssetMetadata {
                    href: file.href.clone(),
                    reason: e.to_string(),
                }
            })?;
            if summaries.record_gsd(gsd) {
                debug!(collection = %self.collection_id, gsd = %gsd, "New GSD in collection summaries");
            }
            min_gsd = Some(min_gsd.map_or(gsd, |m| m.min(gsd)));

            let asset = Asset::new(
                &role,
                file.href.clone(),
                gsd,
                file.header.shape(),
                file.header.transform,
            );
            assets.insert(role.key().to_string(), asset);
        }

        let header = &primary.header;
        let epsg = header.epsg.unwrap_or(self.default_epsg);
        let crs = Crs::from_epsg(epsg)?;
        let native = raster_bounds(header.shape(), &header.transform)?;
        let bbox = crs.transform_bounds(&native, DEFAULT_DENSIFY_POINTS);

        let properties = ItemProperties {
            datetime: None,
            start_datetime: window.map(|w| w.start),
            end_datetime: window.map(|w| w.end),
            epsg,
            shape: header.shape(),
            transform: header.transform,
        };

        // `files` is non-empty, so the minimum exists.
        let gsd = min_gsd.ok_or_else(|| SyncError::AssetMetadata {
            href: primary.href.clone(),
            reason: "no ground sample distance".to_string(),
        })?;

        debug!(item = %item_id, assets = assets.len(), gsd = %gsd, "Built item");

        Ok(Item::new(
            item_id,
            self.collection_id.clone(),
            bbox,
            properties,
            gsd,
            assets,
        ))
    }
}
