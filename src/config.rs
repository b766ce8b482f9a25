use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::json_store::default_data_dir;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(default = "default_prune_stale_ledger")]
    pub prune_stale_ledger: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_manifest() -> String {
    "data/manifest.json".to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}
fn default_prune_stale_ledger() -> bool {
    false
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            theme: default_theme(),
            data_dir: default_data_dir_string(),
            fetch_timeout_secs: None,
            prune_stale_ledger: default_prune_stale_ledger(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizdrill")
            .join("config.toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}
