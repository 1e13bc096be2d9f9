//! Pure Rust encoder backend using the `image` crate.
//!
//! Everything is statically linked: JPEG and PNG through `image`, lossy WebP
//! through the `webp` crate (vendored libwebp). No shell-outs, no system
//! codec dependencies.

use super::backend::{Encoder, EncoderError};
use super::params::{OutputFormat, Quality};
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;

/// Pure Rust backend.
///
/// - Decoding: JPEG, PNG, WebP (whatever `image::load_from_memory` accepts)
/// - Encoding: JPEG (`JpegEncoder`), PNG (`PngEncoder`), lossy WebP (`webp`)
/// - Resize: triangle (bilinear) filtering
pub struct RustEncoder;

impl RustEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for RustEncoder {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, EncoderError> {
        image::load_from_memory(bytes).map_err(|e| EncoderError::Decode(e.to_string()))
    }

    fn dimensions(&self, image: &DynamicImage) -> (u32, u32) {
        (image.width(), image.height())
    }

    fn encode(
        &self,
        image: &DynamicImage,
        quality: Quality,
        format: OutputFormat,
    ) -> Result<Vec<u8>, EncoderError> {
        match format {
            OutputFormat::Jpeg => encode_jpeg(image, quality),
            OutputFormat::Png => encode_png(image),
            OutputFormat::Webp => encode_webp(image, quality),
        }
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width.max(1), height.max(1), FilterType::Triangle)
    }
}

fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, EncoderError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.value());
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncoderError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, EncoderError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| EncoderError::Encode(format!("PNG encode failed: {e}")))?;
    Ok(buf)
}

/// Lossy WebP via the `webp` crate; the `image` crate only writes lossless WebP.
fn encode_webp(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, EncoderError> {
    let encoder = webp::Encoder::from_image(image)
        .map_err(|e| EncoderError::Encode(format!("WebP encoder init failed: {e}")))?;
    Ok(encoder.encode(quality.value() as f32).to_vec())
}
