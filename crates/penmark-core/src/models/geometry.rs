//! Strict numeric value objects for viewport and page geometry.
//!
//! Gesture events arrive from outside the library as raw floats; everything
//! is validated here so the transform math downstream can stay total.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A point in viewport pixels, relative to the document render container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point, rejecting non-finite coordinates.
    pub fn new(x: f64, y: f64) -> Result<Self, GeometryError> {
        ensure_finite(x, "point.x")?;
        ensure_finite(y, "point.y")?;
        Ok(Self { x, y })
    }

    /// Translate by raw deltas. Used by the drag reducer, which receives
    /// already-validated deltas.
    pub(crate) fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Box dimensions in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a size, rejecting non-finite or non-positive dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        ensure_finite(width, "size.width")?;
        ensure_finite(height, "size.height")?;
        if width <= 0.0 {
            return Err(GeometryError::NotPositive("size.width"));
        }
        if height <= 0.0 {
            return Err(GeometryError::NotPositive("size.height"));
        }
        Ok(Self { width, height })
    }
}

/// An axis-aligned box in the PDF page's native coordinate space.
///
/// Origin is the page's bottom-left corner; units are unscaled page points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub(crate) fn ensure_finite(value: f64, field: &'static str) -> Result<(), GeometryError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinite(field))
    }
}
