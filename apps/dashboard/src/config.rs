//! Configuration Management

use analysis::RenderStyle;
use model::Surface;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Service endpoint
    pub api: ApiConfig,
    /// Drawing surface used by `render`
    pub surface: Surface,
    /// Colors and marker sizes
    pub style: RenderStyle,
    /// Where the session tokens live
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8081".to_string(), timeout_secs: 10 }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be an http(s) URL, got {:?}", self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be > 0".to_string()));
        }
        let s = &self.surface;
        if !(s.padding.is_finite() && s.padding >= 0.0) {
            return Err(ConfigError::Invalid(format!("surface.padding must be >= 0, got {}", s.padding)));
        }
        if s.drawable_width() <= 0.0 || s.drawable_height() <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "surface {}x{} leaves no room inside padding {}", s.width, s.height, s.padding
            )));
        }
        let st = &self.style;
        for (name, v) in [
            ("grid_width", st.grid_width),
            ("path_width", st.path_width),
            ("endpoint_radius", st.endpoint_radius),
            ("intermediate_radius", st.intermediate_radius),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::Invalid(format!("style.{} must be > 0, got {}", name, v)));
            }
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs_next::config_dir()
            .map(|d| d.join("mokart").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("mokart.toml"))
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage.dir.clone().unwrap_or_else(crate::store::FileStore::default_dir)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
