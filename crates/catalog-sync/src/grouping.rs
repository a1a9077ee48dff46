//! Grouping of raster files into items.
//!
//! Files sharing their first four `_`-separated stem tokens belong to the
//! same item. The first file seen for a group is its primary (COG) asset,
//! so listing order is significant and never re-sorted.

use std::collections::HashMap;

/// Number of leading stem tokens forming the grouping key.
pub const KEY_TOKENS: usize = 4;

/// Files of one logical item, in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGroup {
    pub key: String,
    /// File names as listed (extension included)
    pub files: Vec<String>,
}

impl ItemGroup {
    pub fn primary(&self) -> &str {
        // Groups are only created together with their first member.
        self.files.first().map(String::as_str).unwrap_or_default()
    }
}

/// File name up to its first `.`.
pub fn file_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Grouping key of a file: the first [`KEY_TOKENS`] tokens of its stem.
pub fn group_key(file_name: &str) -> String {
    file_stem(file_name)
        .split('_')
        .take(KEY_TOKENS)
        .collect::<Vec<_>>()
        .join("_")
}

/// Partition `files` into groups, in order of each key's first appearance.
pub fn group_files<I, S>(files: I) -> Vec<ItemGroup>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: Vec<ItemGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for file in files {
        let file = file.as_ref();
        let key = group_key(file);
        match index.get(&key) {
            Some(&i) => groups[i].files.push(file.to_string()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ItemGroup {
                    key,
                    files: vec![file.to_string()],
                });
            }
        }
    }

    groups
}
