//! Overlay geometry state and its gesture reducers.
//!
//! The overlay is the draggable/resizable box showing the signature preview
//! on top of the rendered page. Drag and resize arrive as one event at a
//! time from an external gesture source; the reducers here are pure
//! functions of (state, event), so they stay decoupled from any particular
//! gesture-recognition mechanism.
//!
//! Containment within the render container is an *end-only* constraint: the
//! gesture source clamps the final position when the gesture completes, so
//! mid-gesture positions outside the container are legal here and never
//! rejected.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::models::config::OverlayConfig;
use crate::models::geometry::{ensure_finite, Point, Size};

/// One drag movement, in raw viewport pixel deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragDelta {
    pub dx: f64,
    pub dy: f64,
}

impl DragDelta {
    /// Create a drag delta, rejecting non-finite values at the boundary.
    pub fn new(dx: f64, dy: f64) -> Result<Self, GeometryError> {
        ensure_finite(dx, "drag.dx")?;
        ensure_finite(dy, "drag.dy")?;
        Ok(Self { dx, dy })
    }
}

/// One resize movement: the gesture's new box dimensions plus how far the
/// left and top edges moved.
///
/// `left_shift`/`top_shift` are non-zero only when the user drags a top or
/// left handle; applying them keeps the opposite edge anchored in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDelta {
    pub width: f64,
    pub height: f64,
    pub left_shift: f64,
    pub top_shift: f64,
}

impl ResizeDelta {
    /// Create a resize delta, rejecting non-finite values at the boundary.
    pub fn new(
        width: f64,
        height: f64,
        left_shift: f64,
        top_shift: f64,
    ) -> Result<Self, GeometryError> {
        ensure_finite(width, "resize.width")?;
        ensure_finite(height, "resize.height")?;
        ensure_finite(left_shift, "resize.left_shift")?;
        ensure_finite(top_shift, "resize.top_shift")?;
        Ok(Self {
            width,
            height,
            left_shift,
            top_shift,
        })
    }
}

/// Current on-screen geometry of the signature overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayGeometry {
    /// Top-left corner in viewport pixels, relative to the render container.
    pub position: Point,

    /// Box dimensions in viewport pixels.
    pub size: Size,

    /// Whether the overlay has interaction focus. Visual affordance only;
    /// has no effect on embedding.
    pub focused: bool,

    /// Whether the overlay is shown. Derived: true iff a signature image is
    /// currently loaded. Maintained by the session, not the reducers.
    pub visible: bool,
}

impl OverlayGeometry {
    /// The default box for a freshly loaded or reset session.
    pub fn default_for(cfg: &OverlayConfig) -> Self {
        Self {
            position: cfg.default_position(),
            size: Size {
                width: cfg.default_width,
                height: cfg.default_height,
            },
            focused: true,
            visible: false,
        }
    }

    /// Apply one drag movement.
    pub fn apply_drag(self, delta: DragDelta) -> Self {
        Self {
            position: self.position.translated(delta.dx, delta.dy),
            ..self
        }
    }

    /// Apply one resize movement.
    ///
    /// The new dimensions are floored at the configured minimums; the
    /// position shifts by the edge deltas so that resizing from a top or
    /// left handle leaves the opposite edge where the user expects it.
    pub fn apply_resize(self, delta: ResizeDelta, limits: &OverlayConfig) -> Self {
        Self {
            position: self.position.translated(delta.left_shift, delta.top_shift),
            size: Size {
                width: delta.width.max(limits.min_width),
                height: delta.height.max(limits.min_height),
            },
            ..self
        }
    }

    /// Return to the default box, keeping the current visibility.
    pub fn reset(self, cfg: &OverlayConfig) -> Self {
        Self {
            visible: self.visible,
            ..Self::default_for(cfg)
        }
    }

    pub fn focus(self) -> Self {
        Self {
            focused: true,
            ..self
        }
    }

    pub fn blur(self) -> Self {
        Self {
            focused: false,
            ..self
        }
    }
}
