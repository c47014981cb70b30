/// Settings for the collaborators and the upload boundary.
///
/// Values are layered: built-in defaults, then an optional JSON file in
/// the user's config directory, then environment variables. Credentials
/// may be absent; a missing key only surfaces when the matching service
/// is called.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::upload::{UploadLimits, MAX_UPLOAD_BYTES};

pub const REMOVE_BG_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";
pub const VISION_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const VISION_MODEL: &str = "gpt-4-vision-preview";
pub const VISION_MAX_TOKENS: u32 = 500;
pub const LISTING_PROMPT: &str = "Check if this image meets Meesho's e-commerce listing guidelines: no watermark, plain background, good lighting. If not, suggest improvements.";

const HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoveBgConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl Default for RemoveBgConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: REMOVE_BG_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub prompt: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: VISION_ENDPOINT.to_string(),
            model: VISION_MODEL.to_string(),
            max_tokens: VISION_MAX_TOKENS,
            prompt: LISTING_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StudioConfig {
    pub remove_bg: RemoveBgConfig,
    pub vision: VisionConfig,
    pub max_upload_bytes: u64,
    pub http_timeout_secs: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            remove_bg: RemoveBgConfig::default(),
            vision: VisionConfig::default(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

impl StudioConfig {
    /// Load defaults, the settings file if present, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::settings_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Get the path where the settings file is looked up
    ///
    /// - Linux: ~/.config/listing-studio/settings.json
    /// - macOS: ~/Library/Application Support/listing-studio/settings.json
    /// - Windows: %APPDATA%\listing-studio\settings.json
    pub fn settings_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("listing-studio");
        path.push("settings.json");
        Some(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides; empty values count as unset
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = get("REMOVEBG_API_KEY") {
            self.remove_bg.api_key = Some(key);
        }
        if let Some(url) = get("STUDIO_REMOVEBG_URL") {
            self.remove_bg.endpoint = url;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.vision.api_key = Some(key);
        }
        if let Some(url) = get("STUDIO_VISION_URL") {
            self.vision.endpoint = url;
        }
        if let Some(model) = get("STUDIO_VISION_MODEL") {
            self.vision.model = model;
        }
        if let Some(raw) = get("STUDIO_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_number("STUDIO_MAX_UPLOAD_BYTES", &raw)?;
        }
        if let Some(raw) = get("STUDIO_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = parse_number("STUDIO_HTTP_TIMEOUT_SECS", &raw)?;
        }
        Ok(())
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_bytes: self.max_upload_bytes,
        }
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_hosted_services() {
        let config = StudioConfig::default();
        assert_eq!(config.remove_bg.endpoint, REMOVE_BG_ENDPOINT);
        assert_eq!(config.vision.max_tokens, 500);
        assert!(config.vision.api_key.is_none());
        assert_eq!(config.upload_limits(), UploadLimits::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "vision": { "model": "gpt-4o" }, "max_upload_bytes": 2048 }"#)
            .unwrap();

        let config = StudioConfig::from_file(&path).unwrap();
        assert_eq!(config.vision.model, "gpt-4o");
        assert_eq!(config.vision.endpoint, VISION_ENDPOINT);
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.remove_bg, RemoveBgConfig::default());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            StudioConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = StudioConfig::default();
        config.vision.model = "from-file".into();

        config
            .apply_env(env(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("STUDIO_VISION_MODEL", "from-env"),
                ("REMOVEBG_API_KEY", ""),
                ("STUDIO_HTTP_TIMEOUT_SECS", "5"),
            ]))
            .unwrap();

        assert_eq!(config.vision.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.vision.model, "from-env");
        assert!(config.remove_bg.api_key.is_none());
        assert_eq!(config.http_timeout_secs, 5);
    }

    #[test]
    fn test_env_rejects_bad_numbers() {
        let mut config = StudioConfig::default();
        let err = config
            .apply_env(env(&[("STUDIO_MAX_UPLOAD_BYTES", "ten megs")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "STUDIO_MAX_UPLOAD_BYTES",
                ..
            }
        ));
    }
}
