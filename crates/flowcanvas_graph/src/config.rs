// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas and zoom configuration.

use egui::{Modifiers, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom limits and step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Smallest zoom level
    pub min_zoom: f32,
    /// Largest zoom level
    pub max_zoom: f32,
    /// Increment used by zoom buttons and scaled by wheel zoom
    pub zoom_step: f32,
    /// Level used on startup, reset and configuration change
    pub initial_zoom: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 2.0,
            zoom_step: 0.25,
            initial_zoom: 1.0,
        }
    }
}

impl ZoomConfig {
    /// Create a validated zoom configuration
    pub fn new(
        min_zoom: f32,
        max_zoom: f32,
        zoom_step: f32,
        initial_zoom: f32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            min_zoom,
            max_zoom,
            zoom_step,
            initial_zoom,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is positive and the range is ordered
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("min_zoom", self.min_zoom)?;
        positive("max_zoom", self.max_zoom)?;
        positive("zoom_step", self.zoom_step)?;
        positive("initial_zoom", self.initial_zoom)?;

        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::InvertedRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.initial_zoom) {
            return Err(ConfigError::InitialOutOfRange {
                initial: self.initial_zoom,
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        Ok(())
    }

    /// Clamp a level into `[min_zoom, max_zoom]`
    pub fn clamp(&self, level: f32) -> f32 {
        level.max(self.min_zoom).min(self.max_zoom)
    }
}

/// Keyboard modifier that turns a primary-button press into a pan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PanModifier {
    /// Shift key
    #[default]
    Shift,
    /// Alt/Option key
    Alt,
    /// Control key
    Ctrl,
    /// Command on macOS, Control elsewhere
    Command,
}

impl PanModifier {
    /// Check if this modifier is held
    pub fn is_held(self, modifiers: &Modifiers) -> bool {
        match self {
            Self::Shift => modifiers.shift,
            Self::Alt => modifiers.alt,
            Self::Ctrl => modifiers.ctrl,
            Self::Command => modifiers.command,
        }
    }
}

/// Interaction settings for the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Size of nodes created by a palette drop
    pub default_node_size: Vec2,
    /// Zoom limits
    pub zoom: ZoomConfig,
    /// Zoom change per wheel unit, as a fraction of `zoom.zoom_step`
    pub wheel_zoom_sensitivity: f32,
    /// Pick radius around connector points (world units)
    pub connector_hit_radius: f32,
    /// Pick radius around connection delete handles (world units)
    pub delete_handle_radius: f32,
    /// Modifier that pans with the primary button
    pub pan_modifier: PanModifier,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_node_size: Vec2::new(150.0, 75.0),
            zoom: ZoomConfig::default(),
            wheel_zoom_sensitivity: 0.01,
            connector_hit_radius: 6.0,
            delete_handle_radius: 8.0,
            pan_modifier: PanModifier::default(),
        }
    }
}

impl CanvasConfig {
    /// Check every setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.zoom.validate()?;
        positive("wheel_zoom_sensitivity", self.wheel_zoom_sensitivity)?;
        non_negative("connector_hit_radius", self.connector_hit_radius)?;
        non_negative("delete_handle_radius", self.delete_handle_radius)?;
        non_negative("default_node_size.x", self.default_node_size.x)?;
        non_negative("default_node_size.y", self.default_node_size.y)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// Error for an invalid configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Value must be strictly positive
    #[error("{field} must be a positive number, got {value}")]
    NotPositive {
        /// Offending field
        field: &'static str,
        /// Offending value
        value: f32,
    },

    /// Value must not be negative
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Offending field
        field: &'static str,
        /// Offending value
        value: f32,
    },

    /// Minimum zoom above maximum zoom
    #[error("Zoom range is inverted: min {min} > max {max}")]
    InvertedRange {
        /// Minimum zoom
        min: f32,
        /// Maximum zoom
        max: f32,
    },

    /// Initial zoom outside the allowed range
    #[error("Initial zoom {initial} is outside [{min}, {max}]")]
    InitialOutOfRange {
        /// Initial zoom
        initial: f32,
        /// Minimum zoom
        min: f32,
        /// Maximum zoom
        max: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ZoomConfig::default().validate().is_ok());
        assert!(CanvasConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zoom_config_rejects_bad_values() {
        assert_eq!(
            ZoomConfig::new(2.0, 1.0, 0.1, 1.5),
            Err(ConfigError::InvertedRange { min: 2.0, max: 1.0 })
        );
        assert!(matches!(
            ZoomConfig::new(0.5, 2.0, 0.1, 3.0),
            Err(ConfigError::InitialOutOfRange { .. })
        ));
        assert!(matches!(
            ZoomConfig::new(0.5, 2.0, -0.1, 1.0),
            Err(ConfigError::NotPositive { field: "zoom_step", .. })
        ));
        assert!(matches!(
            ZoomConfig::new(0.0, 2.0, 0.1, 1.0),
            Err(ConfigError::NotPositive { field: "min_zoom", .. })
        ));
    }

    #[test]
    fn test_clamp() {
        let config = ZoomConfig::new(0.5, 3.0, 0.5, 1.0).unwrap();
        assert_eq!(config.clamp(0.1), 0.5);
        assert_eq!(config.clamp(4.0), 3.0);
        assert_eq!(config.clamp(1.7), 1.7);
    }

    #[test]
    fn test_pan_modifier() {
        assert!(PanModifier::Shift.is_held(&Modifiers::SHIFT));
        assert!(!PanModifier::Shift.is_held(&Modifiers::ALT));
        assert!(PanModifier::Alt.is_held(&Modifiers::ALT));
        assert!(PanModifier::Ctrl.is_held(&Modifiers::CTRL));
        assert!(PanModifier::Command.is_held(&Modifiers::COMMAND));
    }

    #[test]
    fn test_partial_ron_config_uses_defaults() {
        let config: CanvasConfig =
            ron::from_str("(zoom: (max_zoom: 4.0), pan_modifier: Alt)").unwrap();
        assert_eq!(config.zoom.max_zoom, 4.0);
        assert_eq!(config.zoom.min_zoom, 0.1);
        assert_eq!(config.pan_modifier, PanModifier::Alt);
        assert_eq!(config.default_node_size, Vec2::new(150.0, 75.0));
        assert!(config.validate().is_ok());
    }
}
