//! Configuration loading for the finder.
//!
//! Every section is optional; missing values fall back to the public HLS
//! deployment on Azure.

use std::path::Path;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use storage::{GridSource, SasToken, StorageLocation};
use tracing::debug;

/// Root of the YAML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinderConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// How prefix listings reach the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingBackend {
    /// Blob service REST API via reqwest
    #[default]
    Rest,
    /// `object_store` Azure client
    ObjectStore,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_account_url")]
    pub account_url: String,
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default)]
    pub backend: ListingBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            account_url: default_account_url(),
            container: default_container(),
            backend: ListingBackend::default(),
        }
    }
}

fn default_account_url() -> String {
    "https://hlssa.blob.core.windows.net/".to_string()
}

fn default_container() -> String {
    "hls".to_string()
}

impl StorageConfig {
    pub fn location(&self) -> StorageLocation {
        StorageLocation::new(&self.account_url, &self.container)
    }

    /// Storage account name, the first label of the account host.
    pub fn account_name(&self) -> Result<String> {
        let url = Url::parse(&self.account_url)
            .with_context(|| format!("Invalid storage.account_url: {}", self.account_url))?;
        url.host_str()
            .and_then(|host| host.split('.').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .with_context(|| format!("No account name in {}", self.account_url))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    /// URL or local path of the tiling system table
    #[serde(default = "default_grid_source")]
    pub source: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            source: default_grid_source(),
        }
    }
}

fn default_grid_source() -> String {
    "https://hls.gsfc.nasa.gov/wp-content/uploads/2016/10/S2_TilingSystem2-1.txt".to_string()
}

impl GridConfig {
    pub fn grid_source(&self) -> Result<GridSource> {
        self.source
            .parse()
            .with_context(|| format!("Invalid grid.source: {}", self.source))
    }
}

/// Where the SAS token comes from. A fixed token wins over the endpoint;
/// with neither, requests go out unsigned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub sas_token: Option<String>,
}

impl CredentialsConfig {
    pub fn static_token(&self) -> Option<SasToken> {
        self.sas_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| SasToken::new(t.trim(), None))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_max_days")]
    pub max_days: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            max_days: default_max_days(),
        }
    }
}

fn default_version() -> String {
    "v1.4".to_string()
}

fn default_max_days() -> u32 {
    366
}

impl FinderConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: FinderConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded finder config");
        Ok(config)
    }

    /// Load `path` if given, otherwise use the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
