//! Client for the STAC read API of the downstream catalog.

use async_trait::async_trait;
use catalog_sync::{CatalogReader, Result, SyncError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use stac_common::{Collection, ItemFootprint, Link};
use tracing::{debug, instrument};

/// One page of a paginated STAC response.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(alias = "features", alias = "collections")]
    records: Vec<T>,
    #[serde(default)]
    links: Vec<Link>,
}

impl<T> Page<T> {
    fn next_url(&self) -> Option<String> {
        self.links
            .iter()
            .find(|l| l.rel == "next")
            .map(|l| force_https(&l.href))
    }
}

/// The API advertises its links as `http:` behind the TLS proxy.
pub fn force_https(url: &str) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{}", rest),
        None => url.to_string(),
    }
}

pub struct StacApiReader {
    client: Client,
    /// Root ending in `/`, e.g. `https://host/geoserver/ogc/stac/v1/`
    base_url: String,
}

impl StacApiReader {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn collections_url(&self) -> String {
        format!("{}collections", self.base_url)
    }

    pub fn collection_url(&self, collection_id: &str) -> String {
        format!("{}collections/{}", self.base_url, collection_id)
    }

    pub fn items_url(&self, collection_id: &str) -> String {
        format!("{}collections/{}/items", self.base_url, collection_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::CatalogRead(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(SyncError::CatalogRead(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::CatalogRead(format!("{}: {}", url, e)))
    }

    /// Every record of a paginated endpoint, following `next` links.
    async fn get_all<T: DeserializeOwned>(&self, first: String) -> Result<Vec<T>> {
        let mut records = Vec::new();
        let mut next = Some(first);
        let mut pages = 0;

        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url).await?;
            next = page.next_url();
            records.extend(page.records);
            pages += 1;
        }

        debug!(pages, records = records.len(), "Read paginated listing");
        Ok(records)
    }
}

#[async_trait]
impl CatalogReader for StacApiReader {
    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<Collection>> {
        self.get_all(self.collections_url()).await
    }

    #[instrument(skip(self))]
    async fn get_collection(&self, collection_id: &str) -> Result<Collection> {
        self.get_json(&self.collection_url(collection_id)).await
    }

    #[instrument(skip(self))]
    async fn collection_items(&self, collection_id: &str) -> Result<Vec<ItemFootprint>> {
        self.get_all(self.items_url(collection_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> StacApiReader {
        StacApiReader::new(Client::new(), "https://paituli.csc.fi/geoserver/ogc/stac/v1/")
    }

    #[test]
    fn test_urls() {
        let r = reader();
        assert_eq!(
            r.collections_url(),
            "https://paituli.csc.fi/geoserver/ogc/stac/v1/collections"
        );
        assert_eq!(
            r.items_url("clc_at_geocubes"),
            "https://paituli.csc.fi/geoserver/ogc/stac/v1/collections/clc_at_geocubes/items"
        );
    }

    #[test]
    fn test_force_https() {
        assert_eq!(force_https("http://a/b?page=2"), "https://a/b?page=2");
        assert_eq!(force_https("https://a/b"), "https://a/b");
    }

    #[test]
    fn test_item_page_next_link() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": "a", "bbox": [24.0, 60.0, 25.0, 61.0],
                 "properties": {"datetime": "2020-01-01T00:00:00Z"}}
            ],
            "links": [
                {"rel": "self", "href": "http://host/items"},
                {"rel": "next", "href": "http://host/items?startIndex=10"}
            ]
        }"#;
        let page: Page<ItemFootprint> = serde_json::from_str(json).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, "a");
        assert_eq!(page.next_url().as_deref(), Some("https://host/items?startIndex=10"));
    }

    #[test]
    fn test_last_collection_page() {
        let json = r#"{
            "collections": [{
                "id": "clc_at_geocubes",
                "title": "CORINE (GeoCubes)",
                "extent": {
                    "spatial": {"bbox": [[20.0, 59.5, 31.5, 70.1]]},
                    "temporal": {"interval": [["2000-01-01T00:00:00Z", null]]}
                }
            }],
            "links": []
        }"#;
        let page: Page<Collection> = serde_json::from_str(json).unwrap();
        assert_eq!(page.records[0].id, "clc_at_geocubes");
        assert!(page.next_url().is_none());
    }
}
