//! STAC items and the lightweight footprint view of already-published items.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::{Asset, PRIMARY_ASSET_KEY};
use crate::bbox::BoundingBox;
use crate::gsd::Gsd;
use crate::time::{parse_datetime, TimeWindow};
use crate::STAC_VERSION;

const PROJECTION_EXTENSION: &str =
    "https://stac-extensions.github.io/projection/v1.1.0/schema.json";

/// Item-level properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProperties {
    /// Always `null` when a start/end span is present.
    pub datetime: Option<DateTime<Utc>>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(rename = "proj:epsg")]
    pub epsg: u32,
    #[serde(rename = "proj:shape")]
    pub shape: [u32; 2],
    #[serde(rename = "proj:transform")]
    pub transform: [f64; 9],
}

/// A STAC item (GeoJSON Feature).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub stac_version: String,
    #[serde(default)]
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub collection: String,
    pub geometry: serde_json::Value,
    pub bbox: BoundingBox,
    pub properties: ItemProperties,
    /// Finest ground sample distance among the item's assets.
    pub gsd: Gsd,
    pub assets: BTreeMap<String, Asset>,
}

impl Item {
    /// Assemble an item whose geometry is the polygon of `bbox`.
    pub fn new(
        id: String,
        collection: String,
        bbox: BoundingBox,
        properties: ItemProperties,
        gsd: Gsd,
        assets: BTreeMap<String, Asset>,
    ) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            stac_version: STAC_VERSION.to_string(),
            stac_extensions: vec![PROJECTION_EXTENSION.to_string()],
            id,
            collection,
            geometry: bbox.to_polygon(),
            bbox,
            properties,
            gsd,
            assets,
        }
    }

    pub fn primary_asset(&self) -> Option<&Asset> {
        self.assets.get(PRIMARY_ASSET_KEY)
    }

    /// Start/end span, falling back to the single `datetime`.
    pub fn time_window(&self) -> Option<TimeWindow> {
        let p = &self.properties;
        match (p.start_datetime.or(p.datetime), p.end_datetime.or(p.datetime)) {
            (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
            _ => None,
        }
    }

    pub fn footprint(&self) -> ItemFootprint {
        let window = self.time_window();
        ItemFootprint {
            id: self.id.clone(),
            bbox: Some(self.bbox),
            start: window.map(|w| w.start),
            end: window.map(|w| w.end),
        }
    }
}

/// Identifier, bbox and time span of an item already in the catalog.
///
/// Deserializes directly from a STAC feature; everything else in the
/// feature is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "FeatureRepr")]
pub struct ItemFootprint {
    pub id: String,
    pub bbox: Option<BoundingBox>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct FeatureRepr {
    id: String,
    #[serde(default)]
    bbox: Option<BoundingBox>,
    #[serde(default)]
    properties: FeaturePropertiesRepr,
}

/// Timestamps stay strings here; catalogs do not all emit RFC 3339.
#[derive(Default, Deserialize)]
struct FeaturePropertiesRepr {
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    start_datetime: Option<String>,
    #[serde(default)]
    end_datetime: Option<String>,
}

impl From<FeatureRepr> for ItemFootprint {
    fn from(f: FeatureRepr) -> Self {
        let p = f.properties;
        let parse = |s: &Option<String>| s.as_deref().and_then(|s| parse_datetime(s).ok());
        let datetime = parse(&p.datetime);
        Self {
            id: f.id,
            bbox: f.bbox,
            start: parse(&p.start_datetime).or(datetime),
            end: parse(&p.end_datetime).or(datetime),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_from_feature() {
        let json = r#"{
            "type": "Feature",
            "id": "korkeusmalli_2m_2020_1_L4131",
            "bbox": [24.1, 60.2, 24.5, 60.4],
            "geometry": null,
            "properties": {
                "datetime": null,
                "start_datetime": "2020-01-01T00:00:00Z",
                "end_datetime": "2020-12-31T00:00:00Z"
            },
            "assets": {}
        }"#;
        let footprint: ItemFootprint = serde_json::from_str(json).unwrap();
        assert_eq!(footprint.id, "korkeusmalli_2m_2020_1_L4131");
        assert_eq!(footprint.bbox, Some(BoundingBox::new(24.1, 60.2, 24.5, 60.4)));
        assert_eq!(footprint.start, Some(TimeWindow::calendar_year(2020).unwrap().start));
    }

    #[test]
    fn test_footprint_falls_back_to_datetime() {
        let json = r#"{"id": "x", "properties": {"datetime": "2019-12-31T00:00:00Z"}}"#;
        let footprint: ItemFootprint = serde_json::from_str(json).unwrap();
        assert!(footprint.bbox.is_none());
        assert_eq!(footprint.start, footprint.end);
        assert!(footprint.start.is_some());
    }

    #[test]
    fn test_footprint_accepts_naive_timestamps() {
        let json = r#"{"id": "x", "properties": {
            "start_datetime": "2018-01-01",
            "end_datetime": "2018-12-31T00:00:00"
        }}"#;
        let footprint: ItemFootprint = serde_json::from_str(json).unwrap();
        let window = TimeWindow::calendar_year(2018).unwrap();
        assert_eq!(footprint.start, Some(window.start));
        assert_eq!(footprint.end, Some(window.end));
    }
}
