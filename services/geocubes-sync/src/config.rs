//! Run configuration and write credentials.
//!
//! Settings come from an optional YAML file named by `GEOCUBES_SYNC_CONFIG`;
//! every field falls back to the production value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use catalog_sync::SyncOptions;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info};

/// Environment variable naming the YAML settings file.
pub const CONFIG_ENV_VAR: &str = "GEOCUBES_SYNC_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Plain-text dataset registry endpoint
    pub registry_url: String,
    /// Prefixed to each dataset folder to form the listing URLs
    pub upstream_base_url: String,
    /// CSV mapping dataset codes to display names
    pub translation_table: PathBuf,
    /// CSV whose first cell is the write password
    pub password_file: PathBuf,
    pub user: String,
    /// Sent on every request so catalog logs can tell this client apart
    pub user_agent: String,
    pub collection_suffix: String,
    pub title_suffix: String,
    /// Extension of the rasters picked from directory listings
    pub raster_extension: String,
    /// CRS of rasters whose GeoKeys name none
    pub epsg: u32,
    pub request_timeout_secs: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let options = SyncOptions::default();
        Self {
            registry_url: "https://vm0160.kaj.pouta.csc.fi/geocubes/info/getDatasets".to_string(),
            upstream_base_url: "https://vm0160.kaj.pouta.csc.fi".to_string(),
            translation_table: PathBuf::from("karttatasot.csv"),
            password_file: PathBuf::from("passwords.txt"),
            user: "admin".to_string(),
            user_agent: "update-script".to_string(),
            collection_suffix: options.collection_suffix,
            title_suffix: options.title_suffix,
            raster_extension: "tif".to_string(),
            epsg: options.default_epsg,
            request_timeout_secs: None,
        }
    }
}

impl SyncConfig {
    /// Load from the file named by `GEOCUBES_SYNC_CONFIG`, or use defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_file(&path),
            Err(_) => {
                debug!("{} not set, using default configuration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            collection_suffix: self.collection_suffix.clone(),
            title_suffix: self.title_suffix.clone(),
            default_epsg: self.epsg,
        }
    }

    /// HTTP client carrying the configured User-Agent and timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .with_context(|| format!("Invalid user agent: {}", self.user_agent))?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("Failed to build HTTP client")
    }
}

/// Read and write API roots of the downstream catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub read_api: String,
    pub write_api: String,
}

impl Endpoints {
    pub fn from_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            read_api: format!("{}/geoserver/ogc/stac/v1/", host),
            write_api: format!("{}/geoserver/rest/oseo/", host),
        }
    }
}

/// Basic-auth credentials for the write API.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// First cell of the password file, or `None` when the file is absent.
pub fn read_password_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open password file: {}", path.display()))?;

    let record = reader
        .records()
        .next()
        .ok_or_else(|| anyhow!("Password file is empty: {}", path.display()))?
        .with_context(|| format!("Failed to read password file: {}", path.display()))?;

    record
        .get(0)
        .map(|cell| Some(cell.trim().to_string()))
        .ok_or_else(|| anyhow!("Password file has no cells: {}", path.display()))
}

/// Credentials from the password file, prompting when it does not exist.
pub fn load_credentials(config: &SyncConfig) -> Result<Credentials> {
    let password = match read_password_file(&config.password_file)? {
        Some(password) => password,
        None => inquire::Password::new("Password:")
            .without_confirmation()
            .prompt()
            .context("Failed to read password")?,
    };
    Ok(Credentials::new(config.user.clone(), password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.user, "admin");
        assert_eq!(config.user_agent, "update-script");
        assert_eq!(config.translation_table, PathBuf::from("karttatasot.csv"));
        assert_eq!(config.epsg, 3067);
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.sync_options().collection_suffix, "at_geocubes");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user: editor").unwrap();
        writeln!(file, "request_timeout_secs: 30").unwrap();
        writeln!(file, "title_suffix: \" (Test)\"").unwrap();

        let config = SyncConfig::from_file(file.path()).unwrap();
        assert_eq!(config.user, "editor");
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(config.sync_options().title_suffix, " (Test)");
        assert_eq!(config.registry_url, SyncConfig::default().registry_url);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SyncConfig::from_file(dir.path().join("nope.yaml")).is_err());
    }

    #[test]
    fn test_endpoints_from_host() {
        let endpoints = Endpoints::from_host("https://paituli.csc.fi/");
        assert_eq!(endpoints.read_api, "https://paituli.csc.fi/geoserver/ogc/stac/v1/");
        assert_eq!(endpoints.write_api, "https://paituli.csc.fi/geoserver/rest/oseo/");
    }

    #[test]
    fn test_password_file_first_cell() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cret,unused").unwrap();
        writeln!(file, "other").unwrap();

        let password = read_password_file(file.path()).unwrap();
        assert_eq!(password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_absent_password_file() {
        let dir = tempfile::tempdir().unwrap();
        let password = read_password_file(&dir.path().join("passwords.txt")).unwrap();
        assert_eq!(password, None);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("admin", "s3cret");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
        assert_eq!(credentials.password(), "s3cret");
    }
}
