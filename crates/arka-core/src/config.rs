use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";
pub const DEFAULT_ERROR_MESSAGE: &str = "Maaf, terjadi kesalahan. Coba lagi.";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    /// Shown in place of any failed reply
    pub error_message: String,
    /// Unset means requests may wait forever
    pub timeout_secs: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the user config, then apply `ARKA_ENDPOINT` / `ARKA_LOG` overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_overrides(
            std::env::var("ARKA_ENDPOINT").ok(),
            std::env::var("ARKA_LOG").ok(),
        );
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, log_level: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(level) = log_level.filter(|l| !l.trim().is_empty()) {
            self.log_level = level;
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("arka").join("config.json"))
    }
}
