//! Console configuration.
//!
//! Configuration is stored in `<config dir>/mlm-console/config.yaml` and includes:
//! - The backend base URL (overridden by `MLM_BACKEND_URL`)
//! - Default page size for list screens
//! - Search debounce quiet period
//! - HTTP request timeout

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConsoleError, Result};

/// Environment variable that points at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "MLM_CONSOLE_CONFIG";

/// Environment variable that overrides the configured backend URL.
pub const BACKEND_URL_ENV: &str = "MLM_BACKEND_URL";

/// Keys accepted by `config get` / `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "base_url",
    "page_size",
    "search_debounce_ms",
    "request_timeout_secs",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL, e.g. `https://api.example.com/api`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Rows per page on list screens (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quiet period after the last search keystroke, in milliseconds (default: 1000)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Total HTTP request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_page_size() -> u32 {
    10
}

fn default_search_debounce_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Directory holding the config file and the stored access token.
pub fn app_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "mlm-console")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ConsoleError::Config("could not determine a config directory".to_string()))
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }
        Ok(app_config_dir()?.join("config.yaml"))
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ConsoleError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            ConsoleError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;
        Ok(())
    }

    /// Resolve the backend base URL, environment first.
    pub fn base_url(&self) -> Result<Url> {
        let raw = match env::var(BACKEND_URL_ENV) {
            Ok(url) if !url.is_empty() => url,
            _ => self.base_url.clone().ok_or_else(|| {
                ConsoleError::Config(format!(
                    "backend URL not configured. Set {BACKEND_URL_ENV} or run: mlm-console config set base_url <url>"
                ))
            })?,
        };
        Ok(Url::parse(&raw)?)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read a single key as text
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "base_url" => Ok(self.base_url.clone().unwrap_or_default()),
            "page_size" => Ok(self.page_size.to_string()),
            "search_debounce_ms" => Ok(self.search_debounce_ms.to_string()),
            "request_timeout_secs" => Ok(self.request_timeout_secs.to_string()),
            _ => Err(unknown_key(key)),
        }
    }

    /// Set a single key from text, validating the value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "base_url" => {
                Url::parse(value)?;
                self.base_url = Some(value.to_string());
            }
            "page_size" => {
                let size = parse_number::<u32>(key, value)?;
                if size == 0 {
                    return Err(ConsoleError::Config(
                        "page_size must be at least 1".to_string(),
                    ));
                }
                self.page_size = size;
            }
            "search_debounce_ms" => self.search_debounce_ms = parse_number(key, value)?,
            "request_timeout_secs" => self.request_timeout_secs = parse_number(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> ConsoleError {
    ConsoleError::Config(format!(
        "unknown config key '{}', expected one of: {}",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConsoleError::Config(format!("invalid value '{value}' for {key}")))
}
