//! Editor tunables, loadable from JSON.

use crate::elements::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Interaction constants for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Minimum interval between processed high-frequency pointer events.
    pub throttle_ms: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplicative step per wheel notch.
    pub wheel_zoom_step: f64,
    /// Multiplicative step for zoom-in/zoom-out actions.
    pub button_zoom_step: f64,
    /// Straight run out of an anchor before a connector turns.
    pub connector_padding: f64,
    /// Gap between a shape and the sibling synthesized from its anchor.
    pub sibling_gap: f64,
    /// Anchor grab radius, in screen pixels.
    pub anchor_hit_radius: f64,
    /// Eraser reach, in screen pixels.
    pub eraser_radius: f64,
    /// How long an erased stroke is excluded from further erasure in one gesture.
    pub eraser_cooldown_ms: f64,
    /// Pointer travel (screen pixels) below which a gesture counts as a click.
    pub click_slop: f64,
    /// Key that temporarily switches to panning while held.
    pub pan_key: String,
    /// Size of shapes created by placement tools.
    pub default_shape_size: Size,
    pub brush_color: SerializableColor,
    pub brush_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 16.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            wheel_zoom_step: 1.05,
            button_zoom_step: 1.2,
            connector_padding: 20.0,
            sibling_gap: 60.0,
            anchor_hit_radius: 10.0,
            eraser_radius: 10.0,
            eraser_cooldown_ms: 250.0,
            click_slop: 4.0,
            pan_key: "Space".to_string(),
            default_shape_size: Size::new(120.0, 80.0),
            brush_color: SerializableColor::black(),
            brush_width: 2.0,
        }
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

impl EditorConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validate())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a config, falling back to defaults if it is missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Using default editor config ({}): {err}", path.display());
                Self::default()
            }
        }
    }

    /// Replace nonsensical values with defaults.
    pub fn validate(mut self) -> Self {
        let defaults = Self::default();
        self.throttle_ms = if self.throttle_ms.is_finite() {
            self.throttle_ms.max(0.0)
        } else {
            defaults.throttle_ms
        };
        self.min_zoom = positive_or(self.min_zoom, defaults.min_zoom);
        self.max_zoom = positive_or(self.max_zoom, defaults.max_zoom);
        if self.min_zoom > self.max_zoom {
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        if !(self.wheel_zoom_step.is_finite() && self.wheel_zoom_step > 1.0) {
            self.wheel_zoom_step = defaults.wheel_zoom_step;
        }
        if !(self.button_zoom_step.is_finite() && self.button_zoom_step > 1.0) {
            self.button_zoom_step = defaults.button_zoom_step;
        }
        self.connector_padding = positive_or(self.connector_padding, defaults.connector_padding);
        self.sibling_gap = positive_or(self.sibling_gap, defaults.sibling_gap);
        self.anchor_hit_radius = positive_or(self.anchor_hit_radius, defaults.anchor_hit_radius);
        self.eraser_radius = positive_or(self.eraser_radius, defaults.eraser_radius);
        self.eraser_cooldown_ms = self.eraser_cooldown_ms.max(0.0);
        self.click_slop = self.click_slop.max(0.0);
        self.brush_width = positive_or(self.brush_width, defaults.brush_width);
        self.default_shape_size = Size::new(
            positive_or(self.default_shape_size.width, defaults.default_shape_size.width),
            positive_or(self.default_shape_size.height, defaults.default_shape_size.height),
        );
        if self.pan_key.is_empty() {
            self.pan_key = defaults.pan_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "sibling_gap": 80.0 }"#).unwrap();
        assert!((config.sibling_gap - 80.0).abs() < f64::EPSILON);
        assert!((config.throttle_ms - 16.0).abs() < f64::EPSILON);
        assert_eq!(config.pan_key, "Space");
    }

    #[test]
    fn test_validate_swaps_zoom_limits() {
        let config = EditorConfig::from_json(r#"{ "min_zoom": 8.0, "max_zoom": 2.0 }"#).unwrap();
        assert!((config.min_zoom - 2.0).abs() < f64::EPSILON);
        assert!((config.max_zoom - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_bad_steps() {
        let config =
            EditorConfig::from_json(r#"{ "wheel_zoom_step": 0.5, "eraser_radius": -1 }"#).unwrap();
        assert!((config.wheel_zoom_step - 1.05).abs() < f64::EPSILON);
        assert!((config.eraser_radius - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            EditorConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "pan_key": "Alt" }}"#).unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.pan_key, "Alt");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load_or_default(dir.path().join("missing.json"));
        assert_eq!(config, EditorConfig::default());
    }
}
