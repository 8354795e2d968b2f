//! Configuration resolution for moodmix-server
//!
//! Multi-tier resolution, priority CLI argument -> environment variable ->
//! TOML config file -> compiled default. The pipeline section nests the
//! core `PipelineConfig` so taxonomy, threshold and playlists live in the
//! same file as the server settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use moodmix_core::{Error, PipelineConfig, Result};

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 5750;

pub const API_KEY_ENV: &str = "MOODMIX_API_KEY";
pub const CONFIG_PATH_ENV: &str = "MOODMIX_CONFIG";
pub const PORT_ENV: &str = "MOODMIX_PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port (default 5750)
    pub port: Option<u16>,
    /// Gemini API key; unset means fallback-heuristics-only operation
    pub api_key: Option<String>,
    /// Model name (default gemini-2.5-flash)
    pub model: Option<String>,
    /// Expected reply shape: "structured" (JSON) or "single-word"
    pub response_mode: Option<String>,
    /// Center-crop preprocessing before upload
    pub face_crop: Option<bool>,
    /// Stabilization pipeline settings
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse server config failed: {}", e)))?;
        config.pipeline.validate()?;
        Ok(config)
    }
}

/// Resolve the config file path: CLI arg -> MOODMIX_CONFIG -> the platform
/// config directory (`<config-dir>/moodmix/config.toml`) when it exists.
pub fn resolve_config_path(cli_arg: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path);
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = dirs::config_dir().map(|d| d.join("moodmix").join("config.toml"))?;
    default.exists().then_some(default)
}

/// Resolve the API key from 3-tier configuration.
///
/// Priority: CLI -> environment -> TOML. Returns None when no tier has a
/// usable key; the server then runs with fallback heuristics only.
pub fn resolve_api_key(cli_arg: Option<String>, config: &ServerConfig) -> Option<String> {
    let cli_key = cli_arg.filter(|k| is_valid_key(k));
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let file_key = config.api_key.clone().filter(|k| is_valid_key(k));

    let mut sources = Vec::new();
    if cli_key.is_some() {
        sources.push("command line");
    }
    if env_key.is_some() {
        sources.push("environment");
    }
    if file_key.is_some() {
        sources.push("TOML");
    }
    if sources.len() > 1 {
        warn!(
            "API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    cli_key.or(env_key).or(file_key)
}

/// Resolve the listen port: CLI -> MOODMIX_PORT -> TOML -> default.
pub fn resolve_port(cli_arg: Option<u16>, config: &ServerConfig) -> u16 {
    if let Some(port) = cli_arg {
        return port;
    }
    if let Ok(raw) = std::env::var(PORT_ENV) {
        if let Ok(port) = raw.parse() {
            return port;
        }
        warn!("Ignoring unparseable {}: {}", PORT_ENV, raw);
    }
    config.port.unwrap_or(DEFAULT_PORT)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
