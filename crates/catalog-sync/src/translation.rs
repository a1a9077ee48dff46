//! Mapping from upstream dataset codes to downstream collections.
//!
//! Two lookups are chained: the translation table turns a dataset code into
//! a display name, and the collection index turns the display name into
//! the id of the downstream collection whose title carries that name.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use stac_common::Collection;

use crate::error::{Result, SyncError};

/// Column holding the upstream dataset code.
pub const CODE_COLUMN: &str = "Nimi";
/// Column holding the display name.
pub const NAME_COLUMN: &str = "Name";

/// Dataset code → display name, loaded from a CSV file.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    names: HashMap<String, String>,
}

impl TranslationTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            SyncError::InvalidTranslationTable(format!("{}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    /// Parse CSV with a header row containing the code and name columns.
    /// Later rows override earlier ones for the same code.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let invalid = |e: csv::Error| SyncError::InvalidTranslationTable(e.to_string());

        let mut csv = csv::Reader::from_reader(reader);
        let headers = csv.headers().map_err(invalid)?.clone();
        let column = |name: &str| {
            headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
                SyncError::InvalidTranslationTable(format!("missing column '{}'", name))
            })
        };
        let code_idx = column(CODE_COLUMN)?;
        let name_idx = column(NAME_COLUMN)?;

        let mut names = HashMap::new();
        for record in csv.records() {
            let record = record.map_err(invalid)?;
            if let (Some(code), Some(name)) = (record.get(code_idx), record.get(name_idx)) {
                names.insert(code.to_string(), name.to_string());
            }
        }
        Ok(Self { names })
    }

    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Display name → downstream collection id.
#[derive(Debug, Clone, Default)]
pub struct CollectionIndex {
    ids: HashMap<String, String>,
}

impl CollectionIndex {
    /// Index the collections whose id ends with `id_suffix`, keyed by their
    /// title with `title_suffix` removed.
    pub fn new<'a, I>(collections: I, id_suffix: &str, title_suffix: &str) -> Self
    where
        I: IntoIterator<Item = &'a Collection>,
    {
        let ids = collections
            .into_iter()
            .filter(|c| c.id.ends_with(id_suffix))
            .map(|c| (c.title.replace(title_suffix, ""), c.id.clone()))
            .collect();
        Self { ids }
    }

    pub fn collection_id(&self, display_name: &str) -> Option<&str> {
        self.ids.get(display_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
