//! Configuration options for slabview views.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};

/// Tunable constants for a view: appearance, camera dynamics and projection.
///
/// Every field has a default, so a JSON override only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Clear color of the color attachment (RGBA).
    pub background_color: [f32; 4],

    /// Initial contrast window `[min, max]` in raw intensity units.
    pub contrast_window: [f32; 2],

    /// Initial depth slice shown in 2D mode.
    pub slice_index: f32,

    /// Drag magnitudes and rotation angles at or below this are ignored.
    pub input_threshold: f32,

    /// Arcball rotation speed multiplier.
    pub rotation_speed: f32,

    /// Fraction of arcball angular velocity retained per second, in `[0, 1)`.
    pub friction_coefficient: f32,

    /// Ortho pan speed multiplier.
    pub pan_speed: f32,

    /// Smallest accepted zoom level.
    pub min_zoom: f32,

    /// Largest accepted zoom level.
    pub max_zoom: f32,

    /// Perspective vertical field of view in radians.
    pub fov: f32,

    /// Near clipping plane.
    pub z_near: f32,

    /// Far clipping plane.
    pub z_far: f32,

    /// Half extent of the 2D frustum at zoom 1.
    pub ortho_bound: f32,

    /// Initial arcball camera position.
    pub arcball_position: Vec3,

    /// Initial ortho camera position.
    pub ortho_position: Vec3,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            background_color: [0.141, 0.141, 0.141, 1.0],
            contrast_window: [0.0, 255.0],
            slice_index: 0.0,
            input_threshold: 1e-7,
            rotation_speed: 0.3,
            friction_coefficient: 0.999,
            pan_speed: 0.005,
            min_zoom: 1.0,
            max_zoom: 10.0,
            fov: std::f32::consts::TAU / 8.0,
            z_near: 1.0,
            z_far: 100.0,
            ortho_bound: 2.0,
            arcball_position: Vec3::new(4.0, 2.0, 5.0),
            ortho_position: Vec3::new(0.0, 0.0, 5.0),
        }
    }
}

impl ViewOptions {
    /// Parses options from JSON, filling unspecified fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reads and parses options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamps a zoom level into `[min_zoom, max_zoom]`.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Checks that the options describe a usable view.
    pub fn validate(&self) -> Result<()> {
        fn invalid(name: &'static str, reason: impl Into<String>) -> Result<()> {
            Err(ViewError::InvalidOption {
                name,
                reason: reason.into(),
            })
        }

        if !(0.0..1.0).contains(&self.friction_coefficient) {
            return invalid(
                "friction_coefficient",
                format!("{} is outside [0, 1)", self.friction_coefficient),
            );
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return invalid(
                "min_zoom",
                format!(
                    "zoom range [{}, {}] must be positive and ordered",
                    self.min_zoom, self.max_zoom
                ),
            );
        }
        if self.z_near <= 0.0 {
            return invalid("z_near", format!("{} must be positive", self.z_near));
        }
        if self.z_far <= self.z_near {
            return invalid(
                "z_far",
                format!("{} must exceed z_near {}", self.z_far, self.z_near),
            );
        }
        if !(self.fov > 0.0 && self.fov < std::f32::consts::PI) {
            return invalid("fov", format!("{} is outside (0, pi)", self.fov));
        }
        if self.ortho_bound <= 0.0 {
            return invalid("ortho_bound", "must be positive");
        }
        if self.input_threshold < 0.0 {
            return invalid("input_threshold", "must not be negative");
        }
        if self.rotation_speed <= 0.0 {
            return invalid("rotation_speed", "must be positive");
        }
        if self.pan_speed <= 0.0 {
            return invalid("pan_speed", "must be positive");
        }
        if self.contrast_window[0] > self.contrast_window[1] {
            return invalid("contrast_window", "min must not exceed max");
        }
        if self.arcball_position.length_squared() == 0.0 {
            return invalid("arcball_position", "must not be the origin");
        }
        if self.ortho_position.length_squared() == 0.0 {
            return invalid("ortho_position", "must not be the origin");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = ViewOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.min_zoom, 1.0);
        assert_eq!(options.max_zoom, 10.0);
        assert!((options.fov - std::f32::consts::PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_override() {
        let options = ViewOptions::from_json_str(r#"{ "pan_speed": 0.01, "max_zoom": 20.0 }"#)
            .expect("partial override should parse");
        assert_eq!(options.pan_speed, 0.01);
        assert_eq!(options.max_zoom, 20.0);
        assert_eq!(options.rotation_speed, 0.3);
    }

    #[test]
    fn test_json_round_trip() {
        let options = ViewOptions {
            ortho_bound: 3.0,
            ..ViewOptions::default()
        };
        let json = options.to_json_string().unwrap();
        assert_eq!(ViewOptions::from_json_str(&json).unwrap(), options);
    }

    #[test]
    fn test_rejects_friction_of_one() {
        let err = ViewOptions::from_json_str(r#"{ "friction_coefficient": 1.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ViewError::InvalidOption {
                name: "friction_coefficient",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_planes() {
        let options = ViewOptions {
            z_near: 10.0,
            z_far: 5.0,
            ..ViewOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = ViewOptions::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));
    }

    #[test]
    fn test_clamp_zoom() {
        let options = ViewOptions::default();
        assert_eq!(options.clamp_zoom(999.0), 10.0);
        assert_eq!(options.clamp_zoom(-5.0), 1.0);
        assert_eq!(options.clamp_zoom(4.5), 4.5);
        assert_eq!(options.clamp_zoom(f32::NAN), 1.0);
    }
}
