//! Paths and user settings
//!
//! **Why**: Note appearance and export placement are studio choices; they live
//! in `playa-notes.json` next to the other per-user files.
//!
//! **Used by**: main (startup), review workflows (layout, export root)

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::text_layout::{REFERENCE_HEIGHT, TextLayout};

/// Settings file name.
pub const SETTINGS_FILE: &str = "playa-notes.json";
/// Default log file name.
pub const LOG_FILE: &str = "playa-notes.log";
/// Environment override for the config directory.
pub const CONFIG_DIR_ENV: &str = "PLAYA_NOTES_CONFIG_DIR";

const APP_DIR: &str = "playa-notes";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Create PathConfig from CLI arguments and environment variables
    ///
    /// Priority: CLI args → ENV var (PLAYA_NOTES_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));

        Self { config_dir }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. PLAYA_NOTES_CONFIG_DIR environment variable
/// 3. Local folder IF playa-notes.json or playa-notes.log exists there
/// 4. Platform-specific config directory from dirs-next (default)
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

/// Get path to a data file (logs)
///
/// Same priority as `config_file`, platform fallback is the data directory.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_data_dir(config).join(name)
}

/// Ensure that configuration and data directories exist
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = get_config_dir(config);
    let data_dir = get_data_dir(config);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    }

    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }

    Ok(())
}

fn has_local_config_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn local_dir() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .filter(|dir| has_local_config_files(dir))
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Some(dir) = local_dir() {
        return dir;
    }
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn get_data_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Some(dir) = local_dir() {
        return dir;
    }
    dirs_next::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Note appearance and export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesSettings {
    // Layout
    pub text_size: f32,    // Relative to image height
    pub line_spacing: f32, // Vertical step between stacked lines
    pub padding: [f32; 2], // From the top-left corner [x, y]
    pub shadow_offset: f32,
    pub reference_height: f32, // Height text size is authored for
    pub spacing: f32,          // Letter spacing written on text elements

    // Colors
    pub note_color: [f32; 4],
    pub shadow_color: [f32; 4],

    // Export
    pub export_root: Option<PathBuf>, // None = next to the source media
    pub frame_extension: String,
}

impl Default for NotesSettings {
    fn default() -> Self {
        Self {
            text_size: 0.005,
            line_spacing: 0.08,
            padding: [0.06, 0.15],
            shadow_offset: 0.002,
            reference_height: REFERENCE_HEIGHT,
            spacing: 0.8,
            note_color: [1.0, 1.0, 1.0, 1.0],
            shadow_color: [0.0, 0.0, 0.0, 1.0],
            export_root: None,
            frame_extension: "jpg".to_string(),
        }
    }
}

impl NotesSettings {
    /// Load settings; a missing file gives defaults, a broken one logs and gives defaults.
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                debug!("No settings at {} ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Invalid settings {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Serialize settings")?;
        std::fs::write(path, json).with_context(|| format!("Write settings {}", path.display()))?;
        Ok(())
    }

    pub fn layout(&self) -> TextLayout {
        TextLayout {
            text_size: self.text_size,
            line_spacing: self.line_spacing,
            padding: self.padding,
            shadow_offset: self.shadow_offset,
            reference_height: self.reference_height,
        }
    }
}
