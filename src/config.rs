use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the AI backend. Treated as opaque and possibly offline.
    pub api_base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8787".to_string(),
            api_key: String::new(),
            request_timeout_secs: 30,
            cache_ttl_secs: 300,
            cache_capacity: 50,
        }
    }
}

impl AppConfig {
    pub fn load(app_data: &Path) -> Self {
        let config_path = app_data.join("config.json");
        let mut config = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Self::default(),
            }
        } else {
            let c = Self::default();
            c.save(app_data);
            c
        };

        // Override with environment variable if set (more secure than hardcoding)
        if let Ok(key) = std::env::var("LEADPILOT_API_KEY") {
            if !key.is_empty() {
                config.api_key = key;
            }
        }

        config
    }

    pub fn save(&self, app_data: &Path) {
        let config_path = app_data.join("config.json");
        if let Ok(content) = serde_json::to_string_pretty(self) {
            std::fs::write(config_path, content).ok();
        }
    }

    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leadpilot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path());
        assert_eq!(config.cache_capacity, 50);
        assert!(dir.path().join("config.json").exists());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            api_base_url: "http://ai.internal:9000".to_string(),
            ..AppConfig::default()
        };
        config.save(dir.path());
        assert_eq!(AppConfig::load(dir.path()).api_base_url, "http://ai.internal:9000");
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{oops").unwrap();
        assert_eq!(AppConfig::load(dir.path()).cache_ttl_secs, 300);
    }
}
