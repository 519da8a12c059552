//! Configuration file loading.

use crate::config::types::AgentSettings;
use crate::error::AgentError;
use std::path::{Path, PathBuf};

/// Configuration file name for project-local config.
const LOCAL_CONFIG_NAME: &str = "sandbox-agent.toml";

/// Configuration file name within the XDG config directory.
const XDG_CONFIG_NAME: &str = "config.toml";

/// Application name for XDG directory lookup.
const APP_NAME: &str = "sandbox-agent";

/// Loads configuration from the default search paths.
///
/// Search order:
/// 1. `./sandbox-agent.toml` (project-local)
/// 2. `~/.config/sandbox-agent/config.toml` (XDG config)
///
/// Returns default settings if no config file is found.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be parsed.
pub fn load() -> Result<AgentSettings, AgentError> {
    for path in search_paths() {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading configuration");
            return from_path(&path);
        }
    }

    Ok(AgentSettings::default())
}

/// Loads configuration from a specific file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match the schema.
pub fn from_path(path: &Path) -> Result<AgentSettings, AgentError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AgentError::configuration(
            "config_file",
            format!("failed to read '{}': {}", path.display(), e),
        )
    })?;

    from_str(&contents).map_err(|e| {
        AgentError::configuration(
            "config_file",
            format!("failed to parse '{}': {}", path.display(), e),
        )
    })
}

/// Parses configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or doesn't match the schema.
pub fn from_str(toml_str: &str) -> Result<AgentSettings, AgentError> {
    toml::from_str(toml_str)
        .map_err(|e| AgentError::configuration("config", format!("invalid TOML: {e}")))
}

/// Returns the paths that would be searched for configuration files.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(dir) = xdg_config_dir() {
        paths.push(dir.join(XDG_CONFIG_NAME));
    }

    paths
}

/// Returns `~/.config/sandbox-agent` on most systems.
#[must_use]
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}
