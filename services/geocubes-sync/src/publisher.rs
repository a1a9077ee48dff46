//! Writes items and collections through GeoServer's OSEO REST API.

use async_trait::async_trait;
use catalog_sync::oseo::{collection_to_oseo, item_to_oseo};
use catalog_sync::{CatalogPublisher, Result, SyncError};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use stac_common::{Collection, Item};
use tracing::{debug, instrument};

use crate::config::Credentials;

pub struct OseoPublisher {
    client: Client,
    /// Root ending in `/`, e.g. `https://host/geoserver/rest/oseo/`
    base_url: String,
    credentials: Credentials,
}

impl OseoPublisher {
    pub fn new(client: Client, base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn products_url(&self, collection_id: &str) -> String {
        format!("{}collections/{}/products", self.base_url, collection_id)
    }

    pub fn product_url(&self, collection_id: &str, item_id: &str) -> String {
        format!("{}collections/{}/products/{}", self.base_url, collection_id, item_id)
    }

    pub fn collection_url(&self, collection_id: &str) -> String {
        format!("{}collections/{}/", self.base_url, collection_id)
    }

    async fn send(&self, operation: String, request: RequestBuilder, body: &Value) -> Result<()> {
        let response = request
            .basic_auth(&self.credentials.user, Some(self.credentials.password()))
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::DownstreamRejected {
                operation: operation.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SyncError::DownstreamRejected {
                operation,
                reason: format!("HTTP {}: {}", status, text.trim()),
            });
        }

        debug!(operation = %operation, status = %status, "Write accepted");
        Ok(())
    }
}

#[async_trait]
impl CatalogPublisher for OseoPublisher {
    #[instrument(skip(self, item), fields(item = %item.id))]
    async fn create_item(&self, item: &Item) -> Result<()> {
        let url = self.products_url(&item.collection);
        self.send(
            format!("POST {}", url),
            self.client.post(&url),
            &item_to_oseo(item),
        )
        .await
    }

    #[instrument(skip(self, item), fields(item = %item.id))]
    async fn update_item(&self, item: &Item) -> Result<()> {
        let url = self.product_url(&item.collection, &item.id);
        self.send(
            format!("PUT {}", url),
            self.client.put(&url),
            &item_to_oseo(item),
        )
        .await
    }

    #[instrument(skip(self, collection), fields(collection = %collection.id))]
    async fn update_collection(&self, collection: &Collection) -> Result<()> {
        let url = self.collection_url(&collection.id);
        self.send(
            format!("PUT {}", url),
            self.client.put(&url),
            &collection_to_oseo(collection),
        )
        .await
    }
}
