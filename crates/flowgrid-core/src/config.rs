//! flowgrid.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_DATA_DIR: &str = "/var/lib/flowgrid";
const DEFAULT_FILE_NAME: &str = "catalog.redb";
const DEFAULT_MAX_EXECUTABLES: usize = 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub catalog: Option<StoreConfig>,
    pub cache: Option<CacheConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    /// Keep everything in memory (tests, dry runs).
    pub in_memory: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Upper bound on memoized executables before the cache is flushed.
    pub max_executables: Option<usize>,
}

impl CatalogConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: CatalogConfig = toml::from_str(content)?;
        if config.max_executables() == 0 {
            anyhow::bail!("cache.max_executables must be greater than zero");
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Configuration for an ephemeral in-memory catalog.
    pub fn in_memory() -> Self {
        CatalogConfig {
            catalog: Some(StoreConfig {
                data_dir: None,
                file_name: None,
                in_memory: Some(true),
            }),
            cache: None,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.catalog
            .as_ref()
            .and_then(|c| c.in_memory)
            .unwrap_or(false)
    }

    /// Full path of the catalog database file.
    pub fn db_path(&self) -> PathBuf {
        let store = self.catalog.as_ref();
        let dir = store
            .and_then(|c| c.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let file = store
            .and_then(|c| c.file_name.as_deref())
            .unwrap_or(DEFAULT_FILE_NAME);
        dir.join(file)
    }

    pub fn max_executables(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|c| c.max_executables)
            .unwrap_or(DEFAULT_MAX_EXECUTABLES)
    }
}
