//! STAC collections and their summary/extent metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::gsd::Gsd;
use crate::item::ItemFootprint;

fn collection_type() -> String {
    "Collection".to_string()
}

/// A STAC collection as served by the catalog read API.
///
/// Fields this crate does not interpret are kept in `extra` so that a
/// collection can be written back without losing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "type", default = "collection_type")]
    pub collection_type: String,
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub providers: Vec<Provider>,
    pub extent: Extent,
    #[serde(default)]
    pub summaries: Summaries,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Collection summaries. Only `gsd` is maintained here; other summary
/// fields are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summaries {
    #[serde(default)]
    pub gsd: Vec<Gsd>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl Summaries {
    /// Append `gsd` unless an equal value is already recorded.
    ///
    /// Returns `true` when the set grew. Existing values keep their order
    /// and are never removed.
    pub fn record_gsd(&mut self, gsd: Gsd) -> bool {
        if self.gsd.contains(&gsd) {
            false
        } else {
            self.gsd.push(gsd);
            true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<DateTime<Utc>>; 2]>,
}

impl Collection {
    /// Overall bbox (the first entry of the spatial extent).
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.extent.spatial.bbox.first().copied()
    }

    /// Overall `[start, end]` interval (the first entry of the temporal extent).
    pub fn interval(&self) -> [Option<DateTime<Utc>>; 2] {
        self.extent.temporal.interval.first().copied().unwrap_or([None, None])
    }

    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == rel)
    }

    /// Recompute the spatial and temporal extent from the complete item set.
    ///
    /// The extent is rebuilt from scratch, never merged with the previous
    /// one. A dimension with no information among the items (no bbox, or
    /// no timestamps at all) keeps its previous value.
    pub fn update_extent_from_items<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a ItemFootprint>,
    {
        let mut bbox: Option<BoundingBox> = None;
        let mut start: Option<DateTime<Utc>> = None;
        let mut end: Option<DateTime<Utc>> = None;

        for item in items {
            if let Some(b) = item.bbox {
                bbox = Some(bbox.map_or(b, |acc| acc.union(&b)));
            }
            if let Some(s) = item.start {
                start = Some(start.map_or(s, |acc| acc.min(s)));
            }
            if let Some(e) = item.end {
                end = Some(end.map_or(e, |acc| acc.max(e)));
            }
        }

        if let Some(bbox) = bbox {
            self.extent.spatial.bbox = vec![bbox];
        }
        if start.is_some() || end.is_some() {
            self.extent.temporal.interval = vec![[start, end]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeWindow;

    fn collection() -> Collection {
        serde_json::from_value(serde_json::json!({
            "type": "Collection",
            "id": "korkeusmalli_2m_at_geocubes",
            "title": "Korkeusmalli 2m (GeoCubes)",
            "description": "Elevation model",
            "license": "CC-BY-4.0",
            "extent": {
                "spatial": {"bbox": [[0.0, 0.0, 0.0, 0.0]]},
                "temporal": {"interval": [["2008-01-01T00:00:00Z", "2008-12-31T00:00:00Z"]]}
            },
            "summaries": {"gsd": [2, 10], "proj:epsg": [3067]},
            "keywords": ["dem"]
        }))
        .unwrap()
    }

    fn footprint(id: &str, bbox: BoundingBox, year: i32) -> ItemFootprint {
        let window = TimeWindow::calendar_year(year).unwrap();
        ItemFootprint {
            id: id.to_string(),
            bbox: Some(bbox),
            start: Some(window.start),
            end: Some(window.end),
        }
    }

    #[test]
    fn test_record_gsd_keeps_order_and_rejects_duplicates() {
        let mut c = collection();
        assert!(!c.summaries.record_gsd(Gsd::new(10.0).unwrap()));
        assert!(c.summaries.record_gsd(Gsd::new(1.0).unwrap()));
        let values: Vec<f64> = c.summaries.gsd.iter().map(|g| g.value()).collect();
        assert_eq!(values, vec![2.0, 10.0, 1.0]);
    }

    #[test]
    fn test_update_extent_recomputes_from_items() {
        let mut c = collection();
        let items = vec![
            footprint("a", BoundingBox::new(21.0, 60.0, 22.0, 61.0), 2018),
            footprint("b", BoundingBox::new(25.0, 62.0, 26.0, 63.5), 2020),
        ];
        c.update_extent_from_items(&items);

        assert_eq!(c.bbox(), Some(BoundingBox::new(21.0, 60.0, 26.0, 63.5)));
        let [start, end] = c.interval();
        assert_eq!(start, Some(TimeWindow::calendar_year(2018).unwrap().start));
        assert_eq!(end, Some(TimeWindow::calendar_year(2020).unwrap().end));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let c = collection();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["keywords"][0], "dem");
        assert_eq!(json["summaries"]["proj:epsg"][0], 3067);
        assert_eq!(json["summaries"]["gsd"][1], 10);
    }
}
