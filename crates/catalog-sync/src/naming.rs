//! Item identifier derivation.
//!
//! Item identifiers are the de-duplication key against the downstream
//! catalog. They must stay byte-for-byte identical to the ones already
//! published, otherwise every existing item of a dataset reappears as new.

use crate::dataset::DatasetDescriptor;

/// Marker that upstream puts in Sentinel mosaic file names.
const SENTINEL_MARKER: &str = "sentinel";
/// Marker that upstream puts in NDVI product file names.
const NDVI_MARKER: &str = "ndvi";

/// Naming convention of a dataset's item identifiers.
///
/// Within the Sentinel and NDVI dialects the file key is still checked for
/// its marker (case-sensitively, as upstream names files). A marked key
/// names the item after its first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingDialect {
    /// `{display name}_{key tokens after the first}`
    Default,
    /// Sentinel mosaics: first key token with hyphens as underscores. An
    /// unmarked key falls back to the display name minus its last two
    /// tokens.
    Sentinel,
    /// NDVI products: first key token, lowercased, hyphens kept. An
    /// unmarked key is named as in [`NamingDialect::Default`].
    Ndvi,
}

impl NamingDialect {
    /// Resolve the dialect for a dataset.
    ///
    /// The file prefix, code and layer name are matched case-sensitively,
    /// like the file keys they describe. The display name is human text
    /// (`Sentinel-2, bands`) and is matched ignoring case.
    pub fn for_dataset(dataset: &DatasetDescriptor, display_name: &str) -> Self {
        let codes = [
            dataset.file_prefix.as_str(),
            dataset.name.as_str(),
            dataset.layer_name.as_str(),
        ];
        let display = display_name.to_lowercase();
        let mentions =
            |marker: &str| codes.iter().any(|c| c.contains(marker)) || display.contains(marker);

        if mentions(SENTINEL_MARKER) {
            NamingDialect::Sentinel
        } else if mentions(NDVI_MARKER) {
            NamingDialect::Ndvi
        } else {
            NamingDialect::Default
        }
    }

    /// Derive the identifier of the item with grouping key `key`.
    ///
    /// Pure: equal inputs always give equal identifiers.
    pub fn item_id(&self, display_name: &str, key: &str) -> String {
        let mut tokens = key.split('_');
        let first = tokens.next().unwrap_or_default();
        let rest = tokens.collect::<Vec<_>>().join("_");

        let name = match self {
            NamingDialect::Default => sanitize(display_name),
            NamingDialect::Sentinel if key.contains(SENTINEL_MARKER) => {
                sanitize(&first.replace('-', "_"))
            }
            NamingDialect::Sentinel => {
                display_stem(&sanitize(display_name).replace('-', "_"), 2)
            }
            NamingDialect::Ndvi if key.contains(NDVI_MARKER) => first.to_lowercase(),
            NamingDialect::Ndvi => sanitize(display_name),
        };

        format!("{}_{}", name, rest)
    }
}

/// Lowercase, spaces to underscores, commas removed.
pub fn sanitize(name: &str) -> String {
    name.to_lowercase().replace(' ', "_").replace(',', "")
}

/// Drop `trailing` `_`-tokens from a sanitized display name, always keeping
/// the first token.
fn display_stem(sanitized: &str, trailing: usize) -> String {
    let tokens: Vec<&str> = sanitized.split('_').collect();
    let keep = tokens.len().saturating_sub(trailing).max(1);
    tokens[..keep].join("_")
}
