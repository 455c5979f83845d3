use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Backend REST API base URL
    #[serde(default = "default_backend_api_url")]
    pub backend_api_url: String,

    /// Movie catalog API key
    pub catalog_api_key: String,

    /// Movie catalog API base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Movie catalog image host base URL
    #[serde(default = "default_catalog_image_url")]
    pub catalog_image_url: String,

    /// Timeout for catalog requests, in seconds
    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_timeout_secs: u64,

    /// Replace the local watchlist with the server's copy after login
    #[serde(default)]
    pub sync_watchlist_on_login: bool,

    /// Directory for persisted client state files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_backend_api_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_catalog_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_catalog_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Resolved directory for persisted state files
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cinetrack")
        })
    }
}
