use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::download::DEFAULT_FILE_NAME;
use crate::error::ConfigError;

/// Production generation service.
pub const DEFAULT_BASE_URL: &str = "https://smartpresentationgenerator-production.up.railway.app/";

pub const ENV_BASE_URL: &str = "SLIDEGEN_BASE_URL";
pub const ENV_OUTPUT_DIR: &str = "SLIDEGEN_OUTPUT_DIR";
pub const ENV_LOG_PATH: &str = "SLIDEGEN_LOG_PATH";

/// Files probed, in order, by [`Config::load_with_fallback`].
const LOCAL_CONFIG_PATHS: [&str; 3] = ["slidegen.toml", "slidegen.json", ".slidegen/config.toml"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the generation service; `api/...` endpoints are joined onto it.
    pub base_url: String,
    /// Directory the downloaded presentation is written into.
    pub output_dir: PathBuf,
    pub file_name: String,
    pub log_path: Option<PathBuf>,
    /// Columns in the preview grid.
    pub preview_columns: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("."),
            file_name: DEFAULT_FILE_NAME.to_string(),
            log_path: None,
            preview_columns: 3,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError { source: e })?;

        if is_toml(path) {
            toml::from_str(&contents).map_err(|e| ConfigError::TomlParseError { source: e })
        } else {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError { source: e })
        }
    }

    /// Load configuration with default fallback
    pub fn load_with_fallback() -> Self {
        let mut candidates: Vec<PathBuf> = LOCAL_CONFIG_PATHS.iter().map(PathBuf::from).collect();
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("slidegen").join("config.toml"));
        }

        for path in &candidates {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    /// Override fields from `SLIDEGEN_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(dir) = non_empty(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = non_empty(ENV_LOG_PATH) {
            self.log_path = Some(PathBuf::from(path));
        }
    }

    /// The base URL with a guaranteed trailing slash, so that joining
    /// `api/...` keeps any path prefix the deployment lives under.
    pub fn service_url(&self) -> Result<Url, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            field: "base_url".to_string(),
            value: self.base_url.clone(),
        };

        let mut url = Url::parse(self.base_url.trim()).map_err(|_| invalid())?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(invalid());
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = if is_toml(path) {
            toml::to_string_pretty(self).map_err(|e| ConfigError::TomlRenderError { source: e })?
        } else {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::ParseError { source: e })?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError { source: e })?;
        }
        std::fs::write(path, contents).map_err(|e| ConfigError::IoError { source: e })
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}
