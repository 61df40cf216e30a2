use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::settings::DEFAULT_LEAD_TIME_HOURS;

pub const APP_ID: &str = "leadtrack";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required setting `{0}`")]
    Missing(&'static str),
}

fn default_lead_hours() -> u32 {
    DEFAULT_LEAD_TIME_HOURS
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub supabase_anon_key: String,
    /// Used until the user's own settings have been fetched.
    #[serde(default = "default_lead_hours")]
    pub default_lead_hours: u32,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            default_lead_hours: DEFAULT_LEAD_TIME_HOURS,
            debug_logging: false,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join(APP_ID)
        .join("config.json")
}

impl AppConfig {
    /// Read the config file (defaults if absent), then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("LEADTRACK_SUPABASE_URL") {
            self.supabase_url = url;
        }
        if let Some(key) = lookup("LEADTRACK_SUPABASE_ANON_KEY") {
            self.supabase_anon_key = key;
        }
        if let Some(debug) = lookup("LEADTRACK_DEBUG") {
            self.debug_logging = matches!(debug.as_str(), "1" | "true" | "yes");
        }
    }

    /// Fail unless both backend settings are present.
    pub fn require_backend(&self) -> Result<(&str, &str), ConfigError> {
        let url = self.supabase_url.trim();
        let key = self.supabase_anon_key.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing("supabase_url"));
        }
        if key.is_empty() {
            return Err(ConfigError::Missing("supabase_anon_key"));
        }
        Ok((url, key))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
