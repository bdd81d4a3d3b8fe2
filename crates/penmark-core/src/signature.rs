//! Signature image transport and decoding.
//!
//! The external capture pad hands the signature over as a base64 PNG data
//! URI; an empty string means no signature is loaded. The encoded form is
//! held as-is until save time, decoded exactly once, and cleared after a
//! successful embed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::DynamicImage;
use tracing::debug;

use crate::error::EmbedError;
use crate::models::geometry::Size;

/// An encoded signature image as delivered by the capture collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureImage(String);

impl SignatureImage {
    pub fn new(data_uri: impl Into<String>) -> Self {
        Self(data_uri.into())
    }

    /// No signature loaded. The overlay is hidden in this state.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode into a page-embeddable raster.
    ///
    /// Accepts a `data:<media-type>;base64,` prefixed URI or a bare base64
    /// payload.
    pub fn decode(&self) -> Result<DecodedSignature, EmbedError> {
        if self.is_empty() {
            return Err(EmbedError::ImageDecode("no signature loaded".to_string()));
        }

        let payload = match self.0.split_once(',') {
            Some((header, body)) if header.starts_with("data:") => body,
            _ => self.0.as_str(),
        };

        let bytes = BASE64
            .decode(payload.trim().as_bytes())
            .map_err(|e| EmbedError::ImageDecode(e.to_string()))?;
        let image =
            image::load_from_memory(&bytes).map_err(|e| EmbedError::ImageDecode(e.to_string()))?;

        debug!(
            width = image.width(),
            height = image.height(),
            "decoded signature image"
        );
        Ok(DecodedSignature { image })
    }
}

/// A decoded signature raster ready for embedding.
#[derive(Debug, Clone)]
pub struct DecodedSignature {
    image: DynamicImage,
}

impl DecodedSignature {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The drawn size in page points: natural pixel dimensions under the
    /// fixed calibration ratio. No pixel resampling happens; the page
    /// content stream scales the full-resolution raster at draw time.
    pub fn scaled_size(&self, ratio: f64) -> Size {
        Size {
            width: f64::from(self.image.width()) * ratio,
            height: f64::from(self.image.height()) * ratio,
        }
    }

    /// Split into interleaved RGB samples and a separate alpha channel, the
    /// two streams a PDF image XObject plus SMask pair expects.
    pub fn to_rgb_and_alpha(&self) -> (Vec<u8>, Vec<u8>) {
        let rgba = self.image.to_rgba8();
        let (w, h) = rgba.dimensions();
        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        let mut alpha = Vec::with_capacity((w * h) as usize);
        for pixel in rgba.pixels() {
            rgb.push(pixel[0]);
            rgb.push(pixel[1]);
            rgb.push(pixel[2]);
            alpha.push(pixel[3]);
        }
        (rgb, alpha)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use std::io::Cursor;

    /// A small opaque PNG encoded as a data URI, standing in for the
    /// capture pad's output.
    pub fn sample_data_uri(width: u32, height: u32) -> String {
        let img = ImageBuffer::from_pixel(width, height, Rgba([20u8, 20, 120, 255]));
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(&png))
    }
}
