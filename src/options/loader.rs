//! Configuration loading and discovery for `px2unit.toml`
//!
//! Provides functions to find, load, and parse option sets from TOML, JSON
//! and JSON5 files.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use super::set::OptionSet;

/// Name of the project config file
pub const CONFIG_FILE_NAME: &str = "px2unit.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parsing or option decoding error
    #[error("Invalid options: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON5 parsing error
    #[error("Failed to parse JSON5 config: {0}")]
    Json5(#[from] json5::Error),
    /// Options have the wrong shape
    #[error("Invalid options: {0}")]
    Shape(String),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Json5,
}

impl ConfigFormat {
    /// Pick a format from a file extension; unknown extensions are read as TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            Some("json5") => Self::Json5,
            _ => Self::Toml,
        }
    }
}

/// Find px2unit.toml by walking up from the current working directory,
/// falling back to the XDG config directory.
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Check XDG_CONFIG_HOME/px2unit/px2unit.toml or ~/.config/px2unit/px2unit.toml
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("px2unit").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Find px2unit.toml by walking up from `start`
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load an option set.
///
/// With a path, loads that file. Otherwise uses [`find_config`]; if nothing is
/// found, returns the default single-entry set.
///
/// # Example
/// ```ignore
/// let options = load_config(None)?;
/// let options = load_config(Some(Path::new("web/px2unit.json")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<OptionSet, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(OptionSet::default()),
    }
}

/// Load an option set from a specific file
pub fn load_config_file(path: &Path) -> Result<OptionSet, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config_str(&contents, ConfigFormat::from_path(path))
}

/// Parse config text.
///
/// TOML files hold either top-level option keys or an `[[options]]` array.
/// JSON and JSON5 files hold an object, an array of objects, or
/// `{ "options": [...] }`.
pub fn parse_config_str(contents: &str, format: ConfigFormat) -> Result<OptionSet, ConfigError> {
    let value: Value = match format {
        ConfigFormat::Toml => {
            let table: toml::Table = toml::from_str(contents)?;
            serde_json::to_value(table)?
        }
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Json5 => json5::from_str(contents)?,
    };

    OptionSet::from_value(value)
}
