use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::Coordinates;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_LOCATE_URL: &str = "http://ip-api.com/json/";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API key is missing. Set GEMINI_API_KEY (or API_KEY) or add api_key to {0}")]
    MissingApiKey(String),

    #[error("Invalid location '{0}', expected \"latitude,longitude\"")]
    InvalidLocation(String),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Process-wide settings, built once at startup and handed to the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    /// Fixed position as `"lat,lon"`. Skips network lookup when set.
    pub location: Option<String>,
    /// IP geolocation endpoint used when no fixed position is configured.
    pub locate_url: Option<String>,
    /// Disable location lookup entirely.
    #[serde(default)]
    pub no_location: bool,
}

const CONFIG_FILE_NAME: &str = "config.toml";
const LOCAL_CONFIG_FILE: &str = "careermate.toml";

pub fn careermate_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".careermate")
}

pub fn default_config_path() -> PathBuf {
    careermate_dir().join(CONFIG_FILE_NAME)
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Config {
    /// Load the home config, falling back to `./careermate.toml`, then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = [default_config_path(), PathBuf::from(LOCAL_CONFIG_FILE)]
            .iter()
            .find(|path| path.exists())
            .map(|path| Self::from_file(path))
            .transpose()?
            .unwrap_or_default();

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay values from the environment. `lookup` is injected for tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY")
            .and_then(non_empty)
            .or_else(|| lookup("API_KEY").and_then(non_empty))
        {
            self.api_key = Some(key);
        }
        if let Some(base) = lookup("GEMINI_API_BASE").and_then(non_empty) {
            self.api_base = Some(base);
        }
        if let Some(model) = lookup("GEMINI_MODEL").and_then(non_empty) {
            self.model = Some(model);
        }
        if let Some(location) = lookup("CAREERMATE_LOCATION").and_then(non_empty) {
            self.location = Some(location);
        }
        if let Some(url) = lookup("CAREERMATE_LOCATE_URL").and_then(non_empty) {
            self.locate_url = Some(url);
        }
        if let Some(flag) = lookup("CAREERMATE_NO_LOCATION") {
            self.no_location = parse_bool_env(&flag);
        }
    }

    /// The credential is the one value the client cannot start without.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(default_config_path().display().to_string()))
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn locate_url(&self) -> &str {
        self.locate_url.as_deref().unwrap_or(DEFAULT_LOCATE_URL)
    }

    pub fn fixed_location(&self) -> Result<Option<Coordinates>, ConfigError> {
        match self.location.as_deref() {
            None => Ok(None),
            Some(raw) => Coordinates::parse(raw)
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidLocation(raw.to_string())),
        }
    }
}
