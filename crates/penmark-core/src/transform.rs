//! Viewport-to-page coordinate transform.
//!
//! Three coordinate spaces meet here: the on-screen pixel space of the
//! scaled page render (origin top-left, y grows downward), the overlay's
//! box within it, and the PDF page's native space (origin bottom-left, y
//! grows upward, unscaled). The transform is pure and total; malformed
//! numbers are rejected when a [`RenderContext`] is constructed, never
//! inside the math.

use crate::error::GeometryError;
use crate::models::config::TransformConfig;
use crate::models::geometry::{ensure_finite, DocumentBox, Size};
use crate::overlay::OverlayGeometry;

/// Render metrics for the currently displayed page.
///
/// Recomputed whenever the displayed page or its render scale changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Ratio of rendered pixel size to native page units (1.5 = 150%).
    pub scale: f64,

    /// Page height in native page units, unscaled.
    pub page_height_native: f64,
}

impl RenderContext {
    /// Create a render context, rejecting non-finite or non-positive inputs.
    pub fn new(scale: f64, page_height_native: f64) -> Result<Self, GeometryError> {
        ensure_finite(scale, "render.scale")?;
        ensure_finite(page_height_native, "render.page_height_native")?;
        if scale <= 0.0 {
            return Err(GeometryError::NotPositive("render.scale"));
        }
        if page_height_native <= 0.0 {
            return Err(GeometryError::NotPositive("render.page_height_native"));
        }
        Ok(Self {
            scale,
            page_height_native,
        })
    }
}

/// Convert overlay geometry into the box the signature is drawn at, in the
/// page's native bottom-left coordinate space.
///
/// The overlay communicates *position* authoritatively; the drawn *size* is
/// the signature raster's natural dimensions under the fixed calibration
/// scale (`scaled_size`), not the overlay's viewport size. The vertical
/// axis flips: viewport y measures down from the top of the render, page y
/// measures up from the bottom of the page, and the drawn box is anchored
/// at its own bottom-left corner, hence the scaled height in the subtraction.
pub fn to_document_box(
    geometry: &OverlayGeometry,
    ctx: &RenderContext,
    scaled_size: Size,
    cfg: &TransformConfig,
) -> DocumentBox {
    let x = cfg.left_margin_pt + geometry.position.x / ctx.scale;
    let y = ctx.page_height_native
        - geometry.position.y / ctx.scale
        - scaled_size.height
        - cfg.vertical_offset_pt;

    DocumentBox {
        x,
        y,
        width: scaled_size.width,
        height: scaled_size.height,
    }
}
