//! QR raster rendering
//!
//! Wraps the `qrcode` encoder and serializes the raster to PNG in memory.
//! Error correction is pinned at the highest tier with a standard 4-module
//! quiet zone and a black-on-white palette; callers only choose the pixel
//! size.

use crate::error::{Error, Result};
use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Luma};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

/// Default edge length in pixels when the caller does not pick one
pub const DEFAULT_SIZE: u32 = 300;

/// Smallest edge length the renderer will produce; anything below this is
/// unreliable to scan
pub const MIN_SIZE: u32 = 64;

/// A rendered QR code held as in-memory PNG bytes
#[derive(Debug, Clone)]
pub struct RenderedPng {
    /// PNG-encoded image bytes
    pub png: Bytes,
    /// Actual raster width/height in pixels (may exceed the requested size
    /// to keep modules on whole pixels)
    pub dimensions: (u32, u32),
}

impl RenderedPng {
    /// Byte length of the PNG payload
    pub fn len(&self) -> usize {
        self.png.len()
    }

    /// Whether the PNG payload is empty (never true for a successful render)
    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }
}

/// Render options that cross the client/server boundary
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Requested edge length in pixels
    pub size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { size: DEFAULT_SIZE }
    }
}

/// QR code renderer with fixed high error correction
pub struct QrRenderer {
    ecc_level: EcLevel,
}

impl QrRenderer {
    /// Create a renderer at the highest error-correction tier
    pub fn new() -> Self {
        Self {
            ecc_level: EcLevel::H,
        }
    }

    /// Render a payload string to an in-memory PNG.
    ///
    /// Empty input is rejected before the encoder is touched; the renderer
    /// never produces a code for a blank payload.
    pub fn render_png(&self, text: &str, options: RenderOptions) -> Result<RenderedPng> {
        if text.is_empty() {
            return Err(Error::EmptyPayload);
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ecc_level)
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))?;

        let size = options.size.max(MIN_SIZE);
        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(size, size)
            .quiet_zone(true)
            .build();

        let (width, height) = image.dimensions();
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(image.as_raw(), width, height, ExtendedColorType::L8)
            .map_err(|e| Error::Png(format!("Failed to encode PNG: {}", e)))?;

        Ok(RenderedPng {
            png: Bytes::from(buffer),
            dimensions: (width, height),
        })
    }
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

    #[test]
    fn test_render_produces_png_bytes() {
        let renderer = QrRenderer::new();
        let rendered = renderer
            .render_png("hello", RenderOptions::default())
            .unwrap();
        assert!(!rendered.is_empty());
        assert_eq!(&rendered.png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_render_respects_requested_size() {
        let renderer = QrRenderer::new();
        let rendered = renderer
            .render_png("hello", RenderOptions { size: 400 })
            .unwrap();
        let (width, height) = rendered.dimensions;
        assert!(width >= 400);
        assert_eq!(width, height);
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = QrRenderer::new();
        let options = RenderOptions { size: 300 };
        let first = renderer.render_png("WIFI:T:WPA;S:Home;P:pw;;", options).unwrap();
        let second = renderer.render_png("WIFI:T:WPA;S:Home;P:pw;;", options).unwrap();
        assert_eq!(first.png, second.png);
    }

    #[test]
    fn test_empty_payload_rejected() {
        let renderer = QrRenderer::new();
        let result = renderer.render_png("", RenderOptions::default());
        assert!(matches!(result, Err(Error::EmptyPayload)));
    }

    #[test]
    fn test_degenerate_size_clamped() {
        let renderer = QrRenderer::new();
        let rendered = renderer.render_png("x", RenderOptions { size: 1 }).unwrap();
        assert!(rendered.dimensions.0 >= MIN_SIZE);
    }
}
