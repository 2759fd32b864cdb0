//! Configuration file support for the box editor.
//!
//! This module provides serialization and deserialization of editor settings
//! as JSON, allowing users to keep their thresholds and keybindings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_CONFIDENCE, HANDLE_SIZE, HISTORY_CAPACITY, MAX_ZOOM, MIN_DRAW_PX, MIN_MASK_PX,
    MIN_ZOOM, ZOOM_STEP,
};
use crate::keybindings::KeyBindings;
use crate::viewport::ZoomLimits;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Errors that can occur while reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Minimum detector confidence for a detection to become a box
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Resize handle size and hit margin in viewport pixels
    #[serde(default = "default_handle_size")]
    pub handle_size: f32,

    /// Class assigned to newly drawn boxes
    #[serde(default)]
    pub default_class: u32,

    /// Undo/redo depth
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Freehand boxes smaller than this many pixels are ignored
    #[serde(default = "default_min_draw_px")]
    pub min_draw_px: f32,

    /// Masks smaller than this many pixels are ignored
    #[serde(default = "default_min_mask_px")]
    pub min_mask_px: f32,

    /// Zoom factor per wheel notch
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE
}

fn default_handle_size() -> f32 {
    HANDLE_SIZE
}

fn default_history_capacity() -> usize {
    HISTORY_CAPACITY
}

fn default_min_draw_px() -> f32 {
    MIN_DRAW_PX
}

fn default_min_mask_px() -> f32 {
    MIN_MASK_PX
}

fn default_zoom_step() -> f32 {
    ZOOM_STEP
}

fn default_min_zoom() -> f32 {
    MIN_ZOOM
}

fn default_max_zoom() -> f32 {
    MAX_ZOOM
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            confidence_threshold: DEFAULT_CONFIDENCE,
            handle_size: HANDLE_SIZE,
            default_class: 0,
            history_capacity: HISTORY_CAPACITY,
            min_draw_px: MIN_DRAW_PX,
            min_mask_px: MIN_MASK_PX,
            zoom_step: ZOOM_STEP,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            log_level: LogLevel::default(),
            keybindings: KeyBindings::default(),
        }
    }
}

impl EditorConfig {
    /// Default config file location in the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bbox-editor").join("config.json"))
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            log::warn!(
                "Config version {} is newer than supported version {}",
                config.version,
                CONFIG_VERSION
            );
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to load config {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            step: self.zoom_step,
            min: self.min_zoom,
            max: self.max_zoom,
        }
    }
}
