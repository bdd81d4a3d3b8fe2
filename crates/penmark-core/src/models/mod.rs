//! Value objects and configuration.

pub mod config;
pub mod geometry;

pub use config::{OverlayConfig, PenmarkConfig, TransformConfig};
pub use geometry::{DocumentBox, Point, Size};
