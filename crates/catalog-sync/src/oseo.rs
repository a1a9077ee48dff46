//! Conversion of STAC records into GeoServer OpenSearch-for-EO JSON.
//!
//! The OSEO REST API stores products (items) and collections as GeoJSON
//! features with a flat, OSEO-specific property layout.

use serde_json::{json, Map, Value};
use stac_common::{BoundingBox, Collection, Item};

/// OSEO product feature for an item.
///
/// When the item has no start/end span but a single `datetime`, both
/// `timeStart` and `timeEnd` take that instant.
pub fn item_to_oseo(item: &Item) -> Value {
    let p = &item.properties;
    let (start, end) = match (p.start_datetime, p.end_datetime, p.datetime) {
        (None, None, Some(dt)) => (Some(dt), Some(dt)),
        (start, end, _) => (start, end),
    };

    json!({
        "type": "Feature",
        "geometry": item.geometry,
        "properties": {
            "eop:identifier": item.id,
            "eop:parentIdentifier": item.collection,
            "timeStart": start,
            "timeEnd": end,
            "eop:resolution": item.gsd,
            "crs": p.epsg,
            "projTransform": p.transform,
            "assets": item.assets,
        }
    })
}

/// OSEO collection feature.
pub fn collection_to_oseo(collection: &Collection) -> Value {
    let [start, end] = collection.interval();

    let mut properties = Map::new();
    properties.insert("name".into(), json!(collection.id));
    properties.insert("title".into(), json!(collection.title));
    properties.insert("eo:identifier".into(), json!(collection.id));
    properties.insert("description".into(), json!(collection.description));
    properties.insert("timeStart".into(), json!(start));
    properties.insert("timeEnd".into(), json!(end));
    properties.insert("primary".into(), json!(true));
    properties.insert("license".into(), json!(collection.license));
    properties.insert("providers".into(), json!(collection.providers));
    properties.insert("licenseLink".into(), Value::Null);
    properties.insert("summaries".into(), json!(collection.summaries));
    properties.insert("queryables".into(), json!(["eo:identifier"]));

    if let Some(assets) = &collection.assets {
        properties.insert("assets".into(), assets.clone());
    }
    if let Some(link) = collection.link("license") {
        properties.insert("licenseLink".into(), link_ref(&link.href, "license"));
    }
    if let Some(link) = collection.link("derived_from") {
        properties.insert("derivedFrom".into(), link_ref(&link.href, "derived_from"));
    }

    json!({
        "type": "Feature",
        "geometry": collection.bbox().map(bbox_polygon),
        "properties": properties,
    })
}

fn link_ref(href: &str, rel: &str) -> Value {
    json!({
        "href": href,
        "rel": rel,
        "type": "application/json",
    })
}

/// Closed ring starting at (max_x, min_y), the vertex order the OSEO
/// collections were originally registered with.
fn bbox_polygon(b: BoundingBox) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [b.max_x, b.min_y],
            [b.max_x, b.max_y],
            [b.min_x, b.max_y],
            [b.min_x, b.min_y],
            [b.max_x, b.min_y],
        ]]
    })
}
