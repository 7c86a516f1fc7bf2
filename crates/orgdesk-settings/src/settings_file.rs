//! Settings file utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::GridSettings;

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("orgdesk"))
}

pub fn grid_settings_file() -> Result<PathBuf> {
    config_dir().map(|p| p.join("grid.toml"))
}

/// Read grid settings from a TOML file
pub fn load_grid_settings(path: &Path) -> Result<GridSettings> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {:?}", path))?;
    let settings: GridSettings = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse settings file: {:?}", path))?;
    Ok(settings.sanitized())
}

/// Read grid settings, falling back to defaults when the file does not exist
pub fn load_or_default(path: Option<&Path>) -> Result<GridSettings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => grid_settings_file()?,
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No grid settings file, using defaults");
        return Ok(GridSettings::default());
    }

    load_grid_settings(&path)
}
