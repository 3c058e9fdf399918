use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, LingoError};

fn default_csrf_cookie() -> String {
    "csrftoken".to_string()
}

fn default_csrf_header() -> String {
    "X-CSRFToken".to_string()
}

fn default_discard_stale_responses() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the translation service (without the `/api/...` suffix)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Token attached to state-changing requests, if the backend wants one
    #[serde(default)]
    pub csrf_token: Option<String>,
    /// Cookie consulted for a token when `csrf_token` is unset
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
    /// Header carrying the token
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory holding the persisted history record
    pub dir: PathBuf,
    /// Fixed name of the persisted record
    pub key: String,
    /// Maximum number of entries kept, most recent first
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Source language selection at startup ("auto" for detection)
    pub default_source: String,
    /// Target language selection at startup (empty lets the backend decide)
    pub default_target: String,
    /// Drop responses that were superseded by a swap or a cleared input
    #[serde(default = "default_discard_stale_responses")]
    pub discard_stale_responses: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            csrf_token: None,
            csrf_cookie: default_csrf_cookie(),
            csrf_header: default_csrf_header(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".lingo"),
            key: "translationHistory".to_string(),
            max_entries: 50,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_source: "auto".to_string(),
            default_target: String::new(),
            discard_stale_responses: default_discard_stale_responses(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LingoError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LingoError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| LingoError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.history.max_entries == 0 {
            return Err(LingoError::Config("history.max_entries must be at least 1".to_string()));
        }
        if self.history.key.trim().is_empty() {
            return Err(LingoError::Config("history.key must not be empty".to_string()));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(LingoError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        Ok(())
    }
}
