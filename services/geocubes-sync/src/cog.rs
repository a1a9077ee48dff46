//! Remote GeoTIFF header reading over HTTP range requests.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use catalog_sync::{RasterHeaderReader, Result, SyncError};
use geotiff_parser::{read_raster_header, GeoTiffError, RasterHeader};
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

/// Bytes requested up front; COG headers sit at the start of the file.
pub const INITIAL_RANGE: u64 = 64 * 1024;

/// Extra ranges fetched for tag values stored past the initial range.
pub const MAX_EXTRA_FETCHES: usize = 4;

/// Byte ranges of one remote file.
#[async_trait]
pub trait RangeSource: Send + Sync {
    /// Bytes `start..end`. A source that ignores the range returns the
    /// whole file and `true`.
    async fn fetch(&self, start: u64, end: u64) -> Result<(Bytes, bool)>;
}

pub struct HttpCogReader {
    client: Client,
}

impl HttpCogReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RasterHeaderReader for HttpCogReader {
    #[instrument(skip(self))]
    async fn read_header(&self, href: &str) -> Result<RasterHeader> {
        let source = HttpRanges {
            client: &self.client,
            href,
        };
        read_header_from(&source, href, MAX_EXTRA_FETCHES).await
    }
}

struct HttpRanges<'a> {
    client: &'a Client,
    href: &'a str,
}

#[async_trait]
impl<'a> RangeSource for HttpRanges<'a> {
    async fn fetch(&self, start: u64, end: u64) -> Result<(Bytes, bool)> {
        let response = self
            .client
            .get(self.href)
            .header(RANGE, range_header(start, end))
            .send()
            .await
            .map_err(|e| metadata_error(self.href, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::AssetMetadata {
                href: self.href.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| metadata_error(self.href, e))?;
        Ok((body, status != StatusCode::PARTIAL_CONTENT))
    }
}

/// Read a raster header, fetching at most `max_extra` ranges after the
/// initial one. The buffer is parsed again after every fetch.
pub async fn read_header_from<S: RangeSource + ?Sized>(
    source: &S,
    href: &str,
    max_extra: usize,
) -> Result<RasterHeader> {
    let (first, whole) = source.fetch(0, INITIAL_RANGE).await?;
    let mut buffer = BytesMut::from(&first[..]);
    let mut complete = whole;
    let mut extra_fetches = 0;

    loop {
        let err = match read_raster_header(&buffer) {
            Ok(header) => {
                debug!(bytes = buffer.len(), extra_fetches, "Read raster header");
                return Ok(header);
            }
            Err(e) => e,
        };

        let Some(end) = missing_range_end(&err, buffer.len() as u64, complete) else {
            return Err(metadata_error(href, err));
        };
        if extra_fetches == max_extra {
            return Err(SyncError::AssetMetadata {
                href: href.to_string(),
                reason: format!(
                    "header still incomplete after {} extra range requests ({})",
                    max_extra, err
                ),
            });
        }

        let start = buffer.len() as u64;
        debug!(start, end, "Header continues past fetched range");
        let (more, whole) = source.fetch(start, end).await?;
        extra_fetches += 1;

        if whole {
            buffer = BytesMut::from(&more[..]);
            complete = true;
        } else {
            buffer.extend_from_slice(&more);
        }
    }
}

/// Exclusive end of the next range to fetch, when `err` can be resolved by
/// reading further. Doubles the buffer at least, so scattered tag values
/// need few round trips.
fn missing_range_end(err: &GeoTiffError, have: u64, complete: bool) -> Option<u64> {
    match err {
        GeoTiffError::Truncated { needed, .. } if !complete && *needed > have => {
            Some((*needed).max(have * 2))
        }
        _ => None,
    }
}

fn range_header(start: u64, end: u64) -> String {
    format!("bytes={}-{}", start, end.saturating_sub(1))
}

fn metadata_error(href: &str, e: impl std::fmt::Display) -> SyncError {
    SyncError::AssetMetadata {
        href: href.to_string(),
        reason: e.to_string(),
    }
}
