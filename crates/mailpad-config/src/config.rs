/// Application configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Whether editing sessions auto-save their draft periodically.
    pub auto_save_enabled: bool,
    /// Interval in seconds between auto-saves (minimum 5).
    pub auto_save_interval_secs: u64,
    /// Number of undo snapshots kept per editing session (minimum 1).
    pub history_capacity: usize,
    /// Drafts older than this many days are removed on cleanup (minimum 1).
    pub storage_expiry_days: u32,
    pub max_title_length: usize,
    pub max_content_length: usize,
    pub max_template_name_length: usize,
    /// Language code used for new templates and greetings.
    pub default_language: String,
    /// Folder exported HTML files are written to. Empty = documents folder.
    pub export_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auto_save_enabled: true,
            auto_save_interval_secs: 30,
            history_capacity: 50,
            storage_expiry_days: 7,
            max_title_length: 200,
            max_content_length: 50_000,
            max_template_name_length: 100,
            default_language: "en".to_string(),
            export_dir: String::new(),
        }
    }
}

impl AppConfig {
    /// Returns the config file path: exe directory + `mailpad.json`.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("mailpad.json")))
            .unwrap_or_else(|| PathBuf::from("mailpad.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            let mut config = Self::default();
            config.sanitize();
            config
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Auto-save interval as a `Duration`.
    pub fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auto_save_interval_secs)
    }

    /// Maximum draft age before cleanup.
    pub fn storage_expiry(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.storage_expiry_days) * 24 * 60 * 60)
    }

    /// Returns the effective export directory.
    ///
    /// Resolution order:
    /// 1. `export_dir` (if non-empty and the path exists)
    /// 2. User's documents directory
    /// 3. User's home directory
    pub fn resolve_export_dir(&self) -> Option<PathBuf> {
        if !self.export_dir.is_empty() {
            let p = PathBuf::from(&self.export_dir);
            if p.is_dir() {
                return Some(p);
            }
        }
        dirs::document_dir().or_else(dirs::home_dir)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.auto_save_interval_secs = self.auto_save_interval_secs.max(5);
        self.history_capacity = self.history_capacity.max(1);
        self.storage_expiry_days = self.storage_expiry_days.max(1);
        self.max_title_length = self.max_title_length.max(2);
        self.max_content_length = self.max_content_length.max(10);
        self.max_template_name_length = self.max_template_name_length.max(1);

        if self.default_language.trim().is_empty() {
            self.default_language = "en".to_string();
        }
    }
}
