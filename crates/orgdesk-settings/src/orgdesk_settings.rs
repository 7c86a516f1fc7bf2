//! Grid configuration
//!
//! `GridSettings` carries every per-instance knob of the grid engine. Screens
//! usually start from `GridSettings::default()` and override the load mode and
//! page size; the CLI reads them from `grid.toml` in the config directory.

mod grid_settings;
mod settings_file;

pub use grid_settings::{GridSettings, LoadMode};
pub use settings_file::{config_dir, grid_settings_file, load_grid_settings, load_or_default};
