//! Core library for placing a freehand signature onto a PDF page.
//!
//! This crate provides:
//! - Overlay geometry state: pure drag/resize reducers for the on-screen
//!   signature box, with configurable size floors
//! - The viewport-to-page coordinate transform, including the vertical-axis
//!   flip into the PDF's bottom-left coordinate space
//! - The embedding pipeline: data-URI decode, image XObject + SMask
//!   construction, page mutation, and document re-serialization
//! - Document session state: load, page navigation, reset, and the
//!   single-embed-in-flight guard

pub mod error;
pub mod models;
pub mod overlay;
pub mod pdf;
pub mod signature;
pub mod transform;

pub use error::{EmbedError, GeometryError, LoadError, PenmarkError, Result};
pub use models::config::{OverlayConfig, PenmarkConfig, TransformConfig};
pub use models::geometry::{DocumentBox, Point, Size};
pub use overlay::{DragDelta, OverlayGeometry, ResizeDelta};
pub use pdf::Session;
pub use signature::{DecodedSignature, SignatureImage};
pub use transform::{to_document_box, RenderContext};
