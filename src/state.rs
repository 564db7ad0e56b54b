//! Core application state types and constants.
//!
//! This module contains the loaded-file wrapper shared by the loader, the
//! exporters and the command line front end, along with chart constants.

use std::path::PathBuf;

use crate::parsers::Category;
use crate::store::TelemetryLog;

// ============================================================================
// Constants
// ============================================================================

/// Default rendered chart size in pixels
pub const DEFAULT_CHART_WIDTH: u32 = 1600;
pub const DEFAULT_CHART_HEIGHT: u32 = 900;

/// Color palette for chart traces
pub const CHART_COLORS: &[[u8; 3]] = &[
    [71, 108, 155],  // Blue (primary)
    [191, 78, 48],   // Rust orange (secondary)
    [113, 120, 78],  // Olive green
    [253, 193, 73],  // Amber
    [100, 149, 237], // Cornflower blue
    [255, 127, 80],  // Coral
];

// ============================================================================
// Core Types
// ============================================================================

/// Represents a loaded log file with its parsed data
#[derive(Clone, Debug)]
pub struct LoadedFile {
    /// Path to the original file
    pub path: PathBuf,
    /// Display name for the file
    pub name: String,
    /// Parsed log data
    pub log: TelemetryLog,
}

impl LoadedFile {
    pub fn new(path: PathBuf, log: TelemetryLog) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        Self { path, name, log }
    }

    /// Every (category, device, measurement) triple that has at least one reading
    pub fn series_keys(&self) -> Vec<SeriesKey> {
        let mut keys = Vec::new();
        for category in Category::ALL {
            for (device, readings) in self.log.store().category(category) {
                for (measurement, values) in readings.iter() {
                    if !values.is_empty() {
                        keys.push(SeriesKey {
                            category,
                            device: device.clone(),
                            measurement: measurement.to_string(),
                        });
                    }
                }
            }
        }
        keys
    }
}

/// Identifies one series in a log
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub category: Category,
    pub device: String,
    pub measurement: String,
}

impl SeriesKey {
    pub fn new(category: Category, device: &str, measurement: &str) -> Self {
        Self {
            category,
            device: device.to_string(),
            measurement: measurement.to_string(),
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.device, self.measurement)
    }
}

impl std::str::FromStr for SeriesKey {
    type Err = String;

    /// Parse `category/device/measurement`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        let [category, device, measurement] = parts.as_slice() else {
            return Err(format!(
                "expected category/device/measurement, got '{}'",
                s
            ));
        };

        let category = category
            .parse::<Category>()
            .map_err(|_| format!("unknown category '{}'", category))?;

        Ok(Self::new(category, device, measurement))
    }
}
