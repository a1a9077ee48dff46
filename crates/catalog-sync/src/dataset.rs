//! Upstream dataset registry.
//!
//! The registry endpoint answers with plain text: records separated by `;`,
//! fields by `,`, in the fixed order
//! `name, layername, years, folder, file_prefix, max_resolution, bit_depth,
//! producer, metadata_URL`.

use crate::error::{Result, SyncError};

const MIN_FIELDS: usize = 4;

/// One upstream dataset. Created once per run, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDescriptor {
    /// Internal dataset code, the translation-table key
    pub name: String,
    pub layer_name: String,
    /// Year tokens in registry order
    pub years: Vec<String>,
    /// Folder path template, e.g. `/geocubes/cubes/korkeusmalli/`
    pub folder: String,
    pub file_prefix: String,
    pub max_resolution: String,
    pub bit_depth: String,
    pub producer: String,
    pub metadata_url: String,
    /// One directory listing URL per year token
    pub year_paths: Vec<String>,
}

impl DatasetDescriptor {
    fn from_fields(fields: &[&str], base_url: &str) -> Result<Self> {
        if fields.len() < MIN_FIELDS {
            return Err(SyncError::InvalidRegistry(format!(
                "record '{}' has {} fields, expected at least {}",
                fields.join(","),
                fields.len(),
                MIN_FIELDS
            )));
        }

        let field = |i: usize| fields.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
        let folder = field(3);
        let years: Vec<String> = field(2).split('.').map(str::to_string).collect();
        let year_paths = years
            .iter()
            .map(|year| format!("{}{}{}/", base_url, folder, year))
            .collect();

        Ok(Self {
            name: field(0),
            layer_name: field(1),
            years,
            folder,
            file_prefix: field(4),
            max_resolution: field(5),
            bit_depth: field(6),
            producer: field(7),
            metadata_url: field(8),
            year_paths,
        })
    }
}

/// Parse the registry response body.
///
/// `base_url` is prepended to each folder to form the listing URLs. Blank
/// records (such as the one after a trailing `;`) are ignored.
pub fn parse_registry(body: &str, base_url: &str) -> Result<Vec<DatasetDescriptor>> {
    body.split(';')
        .filter(|record| !record.trim().is_empty())
        .map(|record| {
            let fields: Vec<&str> = record.split(',').collect();
            DatasetDescriptor::from_fields(&fields, base_url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://vm0160.kaj.pouta.csc.fi";

    #[test]
    fn test_parse_multi_year_dataset() {
        let body = "korkeusmalli,Korkeusmalli,2008.2020,/geocubes/cubes/km/,km,2,16,MML,https://example.org/meta";
        let datasets = parse_registry(body, BASE).unwrap();
        assert_eq!(datasets.len(), 1);

        let d = &datasets[0];
        assert_eq!(d.name, "korkeusmalli");
        assert_eq!(d.years, vec!["2008", "2020"]);
        assert_eq!(d.producer, "MML");
        assert_eq!(d.metadata_url, "https://example.org/meta");
        assert_eq!(
            d.year_paths,
            vec![
                "https://vm0160.kaj.pouta.csc.fi/geocubes/cubes/km/2008/",
                "https://vm0160.kaj.pouta.csc.fi/geocubes/cubes/km/2020/",
            ]
        );
    }

    #[test]
    fn test_single_year_gives_single_path() {
        let body = "clc,CLC,2018,/cubes/clc/,clc,20,8,SYKE,m;";
        let datasets = parse_registry(body, BASE).unwrap();
        assert_eq!(datasets.len(), 1);
        assert_eq!(
            datasets[0].year_paths,
            vec!["https://vm0160.kaj.pouta.csc.fi/cubes/clc/2018/"]
        );
    }

    #[test]
    fn test_records_keep_registry_order() {
        let body = "b,B,2019,/b/,b,1,8,P,m;a,A,2019,/a/,a,1,8,P,m";
        let names: Vec<String> = parse_registry(body, BASE)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_short_record_is_rejected() {
        let result = parse_registry("broken,record", BASE);
        assert!(matches!(result, Err(SyncError::InvalidRegistry(_))));
    }

    #[test]
    fn test_missing_trailing_fields_default_to_empty() {
        let datasets = parse_registry("x,X,2015,/x/", BASE).unwrap();
        assert_eq!(datasets[0].metadata_url, "");
        assert_eq!(datasets[0].year_paths.len(), 1);
    }
}
