//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three pixel operations the pipeline
//! needs: decode (capability probes), crop (the stencil render) and encode
//! (the export). Everything above this layer is backend-agnostic, which lets
//! the probe sequencing and format negotiation be tested against a mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image` crate.

use super::params::{OutputFormat, Quality};
use crate::session::CropRegion;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
    #[error("Encode failed: {0}")]
    EncodeFailed(String),
    #[error("Crop region {region:?} lies outside the {width}x{height} image")]
    RegionOutOfBounds {
        region: CropRegion,
        width: u32,
        height: u32,
    },
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Pixel operations every backend must support.
///
/// Backends are shared across the blocking thread pool, hence `Send + Sync`.
pub trait ImageBackend: Send + Sync {
    /// Fully decode `bytes`, reporting the resulting dimensions.
    fn decode(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode `bytes` and cut out `region`.
    fn crop(&self, bytes: &[u8], region: CropRegion) -> Result<DynamicImage, BackendError>;

    /// Encode `image` in `format` at `quality`.
    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
