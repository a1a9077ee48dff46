//! Raster asset records.

use serde::{Deserialize, Serialize};

use crate::gsd::Gsd;

/// Media type of the primary asset of an item.
pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";

/// Media type of auxiliary band assets.
pub const GEOTIFF_MEDIA_TYPE: &str = "image/tiff; application=geotiff";

/// Asset key (and title) of the primary asset.
pub const PRIMARY_ASSET_KEY: &str = "COG";

/// Role an asset plays inside its item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRole {
    /// First file of a group: the cloud-optimized GeoTIFF.
    Primary,
    /// Any later file of a group, named by the last `_` token of its stem.
    Band(String),
}

impl AssetRole {
    /// Role of an auxiliary file, derived from its stem.
    pub fn band_from_stem(stem: &str) -> Self {
        let name = stem.rsplit('_').next().unwrap_or(stem);
        AssetRole::Band(name.to_string())
    }

    /// Key under which the asset is stored in the item's asset map.
    pub fn key(&self) -> &str {
        match self {
            AssetRole::Primary => PRIMARY_ASSET_KEY,
            AssetRole::Band(name) => name,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            AssetRole::Primary => COG_MEDIA_TYPE,
            AssetRole::Band(_) => GEOTIFF_MEDIA_TYPE,
        }
    }
}

/// Metadata for one raster file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: String,
    pub roles: Vec<String>,
    pub gsd: Gsd,
    /// `[rows, columns]`
    #[serde(rename = "proj:shape")]
    pub shape: [u32; 2],
    /// Affine transform `[a, b, c, d, e, f, g, h, i]`.
    #[serde(rename = "proj:transform")]
    pub transform: [f64; 9],
}

impl Asset {
    pub fn new(role: &AssetRole, href: String, gsd: Gsd, shape: [u32; 2], transform: [f64; 9]) -> Self {
        Self {
            href,
            media_type: role.media_type().to_string(),
            title: role.key().to_string(),
            roles: vec!["data".to_string()],
            gsd,
            shape,
            transform,
        }
    }
}
