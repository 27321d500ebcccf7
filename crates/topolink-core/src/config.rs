//! Editor configuration.

use crate::history::DEFAULT_HISTORY_CAPACITY;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the editor. Every field falls back to its default when
/// missing from the JSON source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapshots kept for undo, including the initial state.
    pub history_capacity: usize,
    /// Body size for devices created without an explicit size.
    pub default_device_size: Size,
    /// Size for groups created without an explicit size.
    pub default_group_size: Size,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Port hit radius in screen pixels.
    pub port_hit_tolerance: f64,
    /// Side of the group resize handle in screen pixels.
    pub resize_handle_size: f64,
    /// Zoom factor per scroll notch.
    pub zoom_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_device_size: Size::new(80.0, 60.0),
            default_group_size: Size::new(300.0, 200.0),
            min_zoom: 0.1,
            max_zoom: 10.0,
            port_hit_tolerance: 6.0,
            resize_handle_size: 12.0,
            zoom_step: 1.1,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
