//! Configuration structures for overlay behavior and embed calibration.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, PenmarkError};
use crate::models::geometry::Point;

/// Main configuration for the penmark pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PenmarkConfig {
    /// Overlay box behavior.
    pub overlay: OverlayConfig,

    /// Viewport-to-page calibration.
    pub transform: TransformConfig,
}

/// Overlay box defaults and resize floors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Minimum overlay width in viewport pixels.
    pub min_width: f64,

    /// Minimum overlay height in viewport pixels.
    pub min_height: f64,

    /// Default top-left position, relative to the render container.
    pub default_x: f64,
    pub default_y: f64,

    /// Default overlay box dimensions in viewport pixels.
    pub default_width: f64,
    pub default_height: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            min_width: 200.0,
            min_height: 120.0,
            default_x: 10.0,
            default_y: 10.0,
            default_width: 400.0,
            default_height: 240.0,
        }
    }
}

impl OverlayConfig {
    /// Default top-left corner as a point.
    pub fn default_position(&self) -> Point {
        Point {
            x: self.default_x,
            y: self.default_y,
        }
    }
}

/// Calibration parameters for the viewport-to-page transform.
///
/// All three are empirical tuning values measured against the reference
/// viewer layout, not derived quantities. They are lifted into configuration
/// precisely so a different viewer layout or render scale can recalibrate
/// them without touching the transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Horizontal offset in page points introduced by the render container's
    /// own left padding.
    pub left_margin_pt: f64,

    /// Vertical offset in page points correcting for the same container
    /// padding.
    pub vertical_offset_pt: f64,

    /// Fixed down-scale applied to the signature raster's natural pixel
    /// dimensions to get its drawn size in page points.
    pub signature_scale: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            left_margin_pt: 26.0,
            vertical_offset_pt: 40.0,
            signature_scale: 0.67,
        }
    }
}

impl TransformConfig {
    /// Reject calibration values the transform cannot work with.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (value, field) in [
            (self.left_margin_pt, "transform.left_margin_pt"),
            (self.vertical_offset_pt, "transform.vertical_offset_pt"),
            (self.signature_scale, "transform.signature_scale"),
        ] {
            if !value.is_finite() {
                return Err(GeometryError::NonFinite(field));
            }
        }
        if self.signature_scale <= 0.0 {
            return Err(GeometryError::NotPositive("transform.signature_scale"));
        }
        Ok(())
    }
}

impl PenmarkConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, PenmarkError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| PenmarkError::Config(e.to_string()))?;
        config.transform.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), PenmarkError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| PenmarkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration() {
        let cfg = TransformConfig::default();
        assert_eq!(cfg.left_margin_pt, 26.0);
        assert_eq!(cfg.vertical_offset_pt, 40.0);
        assert_eq!(cfg.signature_scale, 0.67);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let cfg = TransformConfig {
            signature_scale: 0.0,
            ..TransformConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = TransformConfig {
            signature_scale: f64::NAN,
            ..TransformConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = PenmarkConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PenmarkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.overlay.min_width, config.overlay.min_width);
        assert_eq!(parsed.transform.signature_scale, config.transform.signature_scale);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: PenmarkConfig =
            serde_json::from_str(r#"{"transform": {"signature_scale": 0.5}}"#).unwrap();
        assert_eq!(parsed.transform.signature_scale, 0.5);
        assert_eq!(parsed.transform.left_margin_pt, 26.0);
        assert_eq!(parsed.overlay.min_width, 200.0);
    }
}
