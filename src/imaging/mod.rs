//! Image processing in pure Rust, on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (capability probes) | `image::load_from_memory` |
//! | **Crop** (stencil render) | `DynamicImage::crop_imm` |
//! | **Fit to canvas** | `DynamicImage::resize` with Lanczos3 |
//! | **Encode** | lossless WebP or quality-100 JPEG |
//!
//! The module is split into:
//! - **Parameters**: [`Quality`] and [`OutputFormat`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Canvas**: the rendered surface passed from the stencil to the encoder

pub mod backend;
pub mod canvas;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use canvas::Canvas;
pub use params::{OutputFormat, Quality};
pub use rust_backend::RustBackend;
