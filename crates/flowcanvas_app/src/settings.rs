// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas settings file.

use flowcanvas_graph::{CanvasConfig, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE_NAME: &str = "flowcanvas.ron";

/// Contents of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Format version
    pub version: u32,
    /// Canvas configuration
    pub canvas: CanvasConfig,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            canvas: CanvasConfig::default(),
        }
    }
}

impl CanvasSettings {
    /// Parse settings from RON text
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }
        settings.canvas.validate()?;

        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unusable
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "Loaded canvas settings");
                settings
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Ignoring settings file");
                Self::default()
            }
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Error reading settings or scripts
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Value could not be written as RON
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// File written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },

    /// Values out of range
    #[error("Invalid canvas configuration: {0}")]
    Invalid(#[from] ConfigError),
}
