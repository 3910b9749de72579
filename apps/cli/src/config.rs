//! Settings file handling.
//!
//! Settings live in a JSON file; a missing file means defaults.

use anyhow::{Context, Result};
use oboeru_core::Settings;
use std::path::{Path, PathBuf};

/// `<config dir>/oboeru/settings.json`, falling back to the current directory.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oboeru")
        .join("settings.json")
}

/// Load and validate settings.
pub fn load(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("invalid settings file {}", path.display()))?;
    settings
        .validate()
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(settings)
}

/// Validate and write settings, creating the parent directory.
pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    settings.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write settings to {}", path.display()))?;
    Ok(())
}
