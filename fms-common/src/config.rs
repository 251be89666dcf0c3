//! Configuration loading and API key resolution
//!
//! Settings come from an optional TOML file; the Gemini API key is resolved
//! on every gateway call with ENV → TOML priority.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variables checked for the Gemini API key, highest priority first
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5790;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Gemini rejects inline payloads above ~20 MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `fms-web.toml`
///
/// Every field is optional in the file; missing fields take the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub host: String,
    pub port: u16,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            logging: LoggingConfig::default(),
        }
    }
}

/// Platform config file location: `{config_dir}/find-my-spot/fms-web.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("find-my-spot").join("fms-web.toml"))
}

/// Load the TOML config file
///
/// A missing file is not an error: defaults are returned. A file that exists
/// but cannot be read or parsed is.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the Gemini API key
///
/// **Priority:** `GEMINI_API_KEY` → `API_KEY` → TOML `gemini_api_key`
///
/// Called at request time, so a key exported after startup is picked up.
pub fn resolve_gemini_api_key(toml_key: Option<&str>) -> Result<String> {
    let env_key = API_KEY_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .filter(|k| is_valid_key(k))
            .map(|k| (*name, k))
    });
    let toml_key = toml_key.filter(|k| is_valid_key(k));

    if let (Some((name, _)), Some(_)) = (&env_key, toml_key) {
        warn!(
            "Gemini API key found in both {} and TOML config. Using environment (highest priority).",
            name
        );
    }

    if let Some((name, key)) = env_key {
        debug!("Gemini API key loaded from environment variable {}", name);
        return Ok(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        debug!("Gemini API key loaded from TOML config");
        return Ok(key.trim().to_string());
    }

    Err(Error::Config(
        "Gemini API key not configured. Please configure using one of:\n\
         1. Environment: GEMINI_API_KEY=your-key-here (or API_KEY)\n\
         2. TOML config: ~/.config/find-my-spot/fms-web.toml (gemini_api_key = \"your-key\")"
            .to_string(),
    ))
}
