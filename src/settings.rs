//! User settings persistence.
//!
//! This module handles loading and saving viewer preferences across sessions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::parsers::TimeScale;
use crate::state::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};

/// Viewer settings that persist across sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    /// Timestamp convention used when none is given on the command line
    #[serde(default)]
    pub time_scale: TimeScale,
    /// Rendered chart width in pixels
    #[serde(default = "default_width")]
    pub chart_width: u32,
    /// Rendered chart height in pixels
    #[serde(default = "default_height")]
    pub chart_height: u32,
    /// Print every parse diagnostic in the summary
    #[serde(default)]
    pub show_diagnostics: bool,
}

fn default_version() -> u32 {
    1
}

fn default_width() -> u32 {
    DEFAULT_CHART_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_CHART_HEIGHT
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            version: 1,
            time_scale: TimeScale::default(),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
            show_diagnostics: false,
        }
    }
}

impl ViewerSettings {
    /// Get the config directory path for tlogview
    pub fn get_config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::data_dir().map(|p| p.join("tlogview"))
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs::config_dir().map(|p| p.join("tlogview"))
        }
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        match Self::get_settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from a file, falling back to defaults on any error
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = Self::get_settings_path()
            .ok_or_else(|| "Could not determine config directory".to_string())?;
        self.save_to(&path)
    }

    /// Save settings to a file, creating parent directories
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write settings file: {}", e))?;

        Ok(())
    }
}
