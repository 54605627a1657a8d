use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::CallviewError;
use crate::geometry::Corner;
use crate::render::FitMode;

/// Fixed layout of the local preview tile.
///
/// Loaded once and threaded through the controller; nothing mutates it
/// after construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OverlayConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f64,
    #[serde(default = "default_border_width")]
    pub border_width: f64,
    #[serde(default)]
    pub initial_corner: Corner,
    #[serde(default)]
    pub spring: SpringConfig,
    /// How the remote video fills the screen behind the tile.
    #[serde(default)]
    pub background_fit: FitMode,
}

fn default_width() -> f64 {
    150.0
}

fn default_height() -> f64 {
    200.0
}

fn default_margin() -> f64 {
    20.0
}

fn default_corner_radius() -> f64 {
    10.0
}

fn default_border_width() -> f64 {
    2.0
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            margin: default_margin(),
            corner_radius: default_corner_radius(),
            border_width: default_border_width(),
            initial_corner: Corner::default(),
            spring: SpringConfig::default(),
            background_fit: FitMode::default(),
        }
    }
}

/// Origami-style spring parameters (tension/friction), as used by the
/// platform animation libraries the overlay mimics.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpringConfig {
    #[serde(default = "default_tension")]
    pub tension: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default = "default_rest_threshold")]
    pub rest_speed_threshold: f64,
    #[serde(default = "default_rest_threshold")]
    pub rest_displacement_threshold: f64,
    #[serde(default)]
    pub overshoot_clamping: bool,
}

fn default_tension() -> f64 {
    40.0
}

fn default_friction() -> f64 {
    7.0
}

fn default_mass() -> f64 {
    1.0
}

fn default_rest_threshold() -> f64 {
    0.001
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            tension: default_tension(),
            friction: default_friction(),
            mass: default_mass(),
            rest_speed_threshold: default_rest_threshold(),
            rest_displacement_threshold: default_rest_threshold(),
            overshoot_clamping: false,
        }
    }
}

impl OverlayConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CallviewError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CallviewError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, CallviewError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no overlay config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(CallviewError::Config(format!("{}: {e}", path.display()))),
        }
    }

    pub fn validate(&self) -> Result<(), CallviewError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("spring.tension", self.spring.tension),
            ("spring.mass", self.spring.mass),
            ("spring.rest_speed_threshold", self.spring.rest_speed_threshold),
            ("spring.rest_displacement_threshold", self.spring.rest_displacement_threshold),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CallviewError::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("margin", self.margin),
            ("corner_radius", self.corner_radius),
            ("border_width", self.border_width),
            ("spring.friction", self.spring.friction),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CallviewError::Config(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_match_tile_layout() {
        let c = OverlayConfig::default();
        assert_eq!(c.width, 150.0);
        assert_eq!(c.height, 200.0);
        assert_eq!(c.margin, 20.0);
        assert_eq!(c.corner_radius, 10.0);
        assert_eq!(c.border_width, 2.0);
        assert_eq!(c.initial_corner, Corner::TopLeft);
        assert_eq!(c.background_fit, FitMode::Cover);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_uses_serde_defaults() {
        let c = OverlayConfig::from_json(r#"{"margin": 12, "initial_corner": "bottom_right"}"#)
            .unwrap();
        assert_eq!(c.margin, 12.0);
        assert_eq!(c.width, 150.0);
        assert_eq!(c.initial_corner, Corner::BottomRight);
        assert_eq!(c.spring, SpringConfig::default());
    }

    #[test]
    fn nested_spring_overrides() {
        let c = OverlayConfig::from_json(r#"{"spring": {"friction": 12}}"#).unwrap();
        assert_eq!(c.spring.friction, 12.0);
        assert_eq!(c.spring.tension, 40.0);
    }

    #[test]
    fn rejects_non_positive_size() {
        let err = OverlayConfig::from_json(r#"{"width": 0}"#).unwrap_err();
        assert!(matches!(err, CallviewError::Config(_)));
    }

    #[test]
    fn rejects_negative_margin() {
        assert!(OverlayConfig::from_json(r#"{"margin": -4}"#).is_err());
    }

    #[test]
    fn rejects_zero_rest_thresholds() {
        // A zero threshold would keep the spring from ever coming to rest.
        for json in [
            r#"{"spring": {"rest_speed_threshold": 0}}"#,
            r#"{"spring": {"rest_displacement_threshold": 0}}"#,
        ] {
            let err = OverlayConfig::from_json(json).unwrap_err();
            assert!(matches!(err, CallviewError::Config(_)), "{json}");
        }
    }

    #[test]
    fn background_fit_is_configurable() {
        let c = OverlayConfig::from_json(r#"{"background_fit": "contain"}"#).unwrap();
        assert_eq!(c.background_fit, FitMode::Contain);
        assert!(OverlayConfig::from_json(r#"{"background_fit": "stretch"}"#).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = OverlayConfig::load(&dir.path().join("overlay.json")).unwrap();
        assert_eq!(c, OverlayConfig::default());
    }

    #[test]
    fn loads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.json");
        fs::write(&path, r#"{"width": 120, "height": 160}"#).unwrap();
        let c = OverlayConfig::load(&path).unwrap();
        assert_eq!(c.width, 120.0);
        assert_eq!(c.height, 160.0);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.json");
        fs::write(&path, "not json!!!").unwrap();
        assert!(matches!(OverlayConfig::load(&path), Err(CallviewError::Config(_))));
    }
}
