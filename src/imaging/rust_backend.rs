//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, GIF, WebP) | `image::load_from_memory` |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! The WebP encoder in `image` is lossless-only, which is also what the
//! maximum quality setting asks for. JPEG has no alpha channel, so images are
//! flattened to RGB before encoding.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{OutputFormat, Quality};
use crate::session::CropRegion;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;

/// Backend using the `image` crate's built-in codecs.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(bytes).map_err(|e| BackendError::DecodeFailed(e.to_string()))
}

fn encode_webp(image: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))
        .map_err(|e| BackendError::EncodeFailed(format!("WebP encode failed: {e}")))?;
    Ok(buf)
}

fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality.percent()))
        .map_err(|e| BackendError::EncodeFailed(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let img = load_image(bytes)?;
        Ok(Dimensions {
            width: img.width(),
            height: img.height(),
        })
    }

    fn crop(&self, bytes: &[u8], region: CropRegion) -> Result<DynamicImage, BackendError> {
        let img = load_image(bytes)?;
        if region.is_empty() || !region.fits_within(img.width(), img.height()) {
            return Err(BackendError::RegionOutOfBounds {
                region,
                width: img.width(),
                height: img.height(),
            });
        }
        Ok(img.crop_imm(region.left, region.top, region.width, region.height))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        match format {
            OutputFormat::WebP => encode_webp(image),
            OutputFormat::Jpeg => encode_jpeg(image, quality),
        }
    }
}
