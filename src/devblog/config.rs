use crate::error::{BlogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_API_URL: &str = "https://user-service-oyy1.onrender.com";
pub const DEFAULT_PAGE_SIZE: usize = 6;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "DEVBLOG_API_URL";

pub const KEYS: &[&str] = &["api-url", "page-size", "debounce-ms", "timeout-secs"];

/// Configuration for devblog, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct BlogConfig {
    /// Base URL of the blog service, without the `/api` suffix
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Posts revealed per page of the feed
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Quiet window before search input is applied
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BlogConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: BlogConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Applies the `DEVBLOG_API_URL` override, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api-url" => Some(self.api_url.clone()),
            "page-size" => Some(self.page_size.to_string()),
            "debounce-ms" => Some(self.debounce_ms.to_string()),
            "timeout-secs" => Some(self.timeout_secs.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api-url" => {
                let url = value.trim().trim_end_matches('/');
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(BlogError::Config(format!(
                        "api-url must start with http:// or https://, got {}",
                        value
                    )));
                }
                self.api_url = url.to_string();
            }
            "page-size" => {
                let size = parse_number::<usize>(key, value)?;
                if size == 0 {
                    return Err(BlogError::Config("page-size must be at least 1".into()));
                }
                self.page_size = size;
            }
            "debounce-ms" => self.debounce_ms = parse_number(key, value)?,
            "timeout-secs" => self.timeout_secs = parse_number(key, value)?,
            other => {
                return Err(BlogError::Config(format!("Unknown config key: {}", other)));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BlogError::Config(format!("{} expects a number, got {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BlogConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.page_size, 6);
        assert_eq!(config.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_set_api_url_strips_trailing_slash() {
        let mut config = BlogConfig::default();
        config.set("api-url", "http://localhost:8080/").unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = BlogConfig::default();
        assert!(config.set("api-url", "localhost").is_err());
        assert!(config.set("page-size", "0").is_err());
        assert!(config.set("page-size", "many").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, BlogConfig::default());
    }

    #[test]
    fn test_get_known_and_unknown_keys() {
        let config = BlogConfig::default();
        assert_eq!(config.get("page-size").as_deref(), Some("6"));
        assert_eq!(config.get("nope"), None);
        for key in KEYS {
            assert!(config.get(key).is_some());
        }
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = BlogConfig::load(temp_dir.path().join("missing")).unwrap();
        assert_eq!(config, BlogConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("nested");

        let mut config = BlogConfig::default();
        config.set("page-size", "9").unwrap();
        config.save(&dir).unwrap();

        let loaded = BlogConfig::load(&dir).unwrap();
        assert_eq!(loaded.page_size, 9);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            r#"{"api-url":"http://example.test"}"#,
        )
        .unwrap();

        let loaded = BlogConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.api_url, "http://example.test");
        assert_eq!(loaded.page_size, DEFAULT_PAGE_SIZE);
    }
}
