//! GeoCubes dataset registry and directory listings.

use async_trait::async_trait;
use catalog_sync::{parse_registry, DatasetDescriptor, ListingSource, Result, SyncError};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

/// Fetch and parse the dataset registry.
#[instrument(skip(client))]
pub async fn fetch_datasets(
    client: &Client,
    registry_url: &str,
    base_url: &str,
) -> Result<Vec<DatasetDescriptor>> {
    let body = get_text(client, registry_url).await?;
    let datasets = parse_registry(&body, base_url)?;
    info!(datasets = datasets.len(), "Fetched dataset registry");
    Ok(datasets)
}

/// Lists rasters from the HTML index pages of the upstream file server.
pub struct HtmlListing {
    client: Client,
    /// Extension without the dot, e.g. `tif`
    extension: String,
}

impl HtmlListing {
    pub fn new(client: Client, extension: impl Into<String>) -> Self {
        Self {
            client,
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl ListingSource for HtmlListing {
    #[instrument(skip(self))]
    async fn list_files(&self, url: &str) -> Result<Vec<String>> {
        let html = get_text(&self.client, url).await?;
        let files = extract_raster_links(&html, &self.extension)?;
        debug!(files = files.len(), "Listed directory");
        Ok(files)
    }
}

/// Every anchor target ending in `.{extension}`, in page order.
pub fn extract_raster_links(html: &str, extension: &str) -> Result<Vec<String>> {
    let selector = Selector::parse("a[href]")
        .map_err(|e| SyncError::Other(anyhow::anyhow!("invalid anchor selector: {}", e)))?;
    let suffix = format!(".{}", extension);

    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.ends_with(&suffix))
        .map(str::to_string)
        .collect())
}

async fn get_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SyncError::UpstreamUnavailable(format!("{}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(SyncError::UpstreamUnavailable(format!(
            "{}: HTTP {}",
            url,
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| SyncError::UpstreamUnavailable(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<html><head><title>Index of /geocubes/cubes/km/2020</title></head>
<body><h1>Index of /geocubes/cubes/km/2020</h1>
<pre><a href="?C=N;O=D">Name</a> <a href="/geocubes/cubes/km/">Parent Directory</a>
<a href="km_2m_2020_1_L4131.tif">km_2m_2020_1_L4131.tif</a>  2021-03-02 12:01  48M
<a href="km_2m_2020_1_L4131.tif.aux.xml">km_2m_2020_1_L4131.tif.aux.xml</a>
<a href="km_2m_2020_1_L4132.tif">km_2m_2020_1_L4132.tif</a>  2021-03-02 12:02  47M
<a name="footer">no target</a>
</pre></body></html>"#;

    #[test]
    fn test_extract_raster_links() {
        let files = extract_raster_links(INDEX, "tif").unwrap();
        assert_eq!(files, vec!["km_2m_2020_1_L4131.tif", "km_2m_2020_1_L4132.tif"]);
    }

    #[test]
    fn test_extract_other_extension() {
        let files = extract_raster_links(INDEX, "xml").unwrap();
        assert_eq!(files, vec!["km_2m_2020_1_L4131.tif.aux.xml"]);
    }

    #[test]
    fn test_extract_empty_page() {
        let files = extract_raster_links("<html><body></body></html>", "tif").unwrap();
        assert!(files.is_empty());
    }
}
