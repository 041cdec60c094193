use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub api: ApiConfig,

    pub search: SearchConfig,

    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default tracing filter; `RUST_LOG` takes precedence when set.
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Directory for `storage.json`. Empty means the platform data directory.
    pub data_dir: String,

    /// When false, search history lives in memory only.
    pub persist_history: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            data_dir: String::new(),
            persist_history: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: crate::clients::tvmaze::TVMAZE_API.to_string(),
            request_timeout_seconds: 10,
            user_agent: "TVApi/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters, after trimming) are not sent.
    pub min_query_length: usize,

    pub debounce_delay_ms: u64,

    pub max_results: usize,

    pub max_history_size: usize,

    pub suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            debounce_delay_ms: 500,
            max_results: 50,
            max_history_size: 10,
            suggestion_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub search_ttl_seconds: u64,

    pub show_ttl_seconds: u64,

    pub max_entries: usize,

    pub cleanup_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl_seconds: 5 * 60,
            show_ttl_seconds: 15 * 60,
            max_entries: 50,
            cleanup_interval_seconds: 5 * 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tvapi").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".tvapi").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes the defaults to `path` unless a file is already there.
    /// Returns whether a file was created.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        Self::default().save_to_path(path)?;
        info!("Created default config file: {}", path.display());
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api.base_url))?;

        if self.api.request_timeout_seconds == 0 {
            anyhow::bail!("API request timeout must be > 0");
        }

        if !matches!(self.general.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "Unknown log format '{}', expected \"pretty\" or \"json\"",
                self.general.log_format
            );
        }

        if self.search.min_query_length == 0 {
            anyhow::bail!("Minimum query length must be > 0");
        }

        if self.search.max_results == 0 || self.search.max_history_size == 0 {
            anyhow::bail!("Search result and history limits must be > 0");
        }

        if self.cache.max_entries == 0 {
            anyhow::bail!("Cache must allow at least one entry");
        }

        if self.cache.cleanup_interval_seconds == 0 {
            anyhow::bail!("Cache cleanup interval must be > 0");
        }

        Ok(())
    }

    /// Directory holding persisted client state.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        if !self.general.data_dir.is_empty() {
            return PathBuf::from(&self.general.data_dir);
        }

        dirs::data_dir().map_or_else(|| PathBuf::from(".tvapi"), |dir| dir.join("tvapi"))
    }

    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir().join("storage.json")
    }
}
