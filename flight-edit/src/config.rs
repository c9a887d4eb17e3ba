use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::save::OverlapPolicy;
use crate::validation::DEFAULT_KNOWN_CITIES;

pub const API_URL_ENV: &str = "FLIGHT_EDIT_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot determine config directory")]
    NoConfigDir,
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightEditConfig {
    /// Base URL of the flight API, e.g. "http://www.angular.at/api"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Quiet period before a form change is reported
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
    /// Refuse to save while any field is invalid
    #[serde(default)]
    pub gate_on_validity: bool,
    #[serde(default = "default_known_cities")]
    pub known_cities: Vec<String>,
}

fn default_api_url() -> String {
    "http://www.angular.at/api".to_string()
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_known_cities() -> Vec<String> {
    DEFAULT_KNOWN_CITIES.iter().map(|c| c.to_string()).collect()
}

impl Default for FlightEditConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            debounce_ms: default_debounce_ms(),
            overlap_policy: OverlapPolicy::default(),
            gate_on_validity: false,
            known_cities: default_known_cities(),
        }
    }
}

impl FlightEditConfig {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("flight-edit")
            .join("config.toml"))
    }

    /// Load config from the default location, then apply environment
    /// overrides. Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(write_err)
    }

    /// Writes the default config to `path` unless a file is already there.
    pub fn ensure_file(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Ok(());
        }
        Self::default().save_to(path)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
