//! # stencil-crop
//!
//! Pick an image, frame it with a crop stencil under one of a few named
//! presets, and export the crop as WebP when the machine can decode WebP,
//! JPEG otherwise.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! ```text
//! 1. Ingest    file      →  SourceImage   (size gate, async read, data URL)
//! 2. Track     stencil   →  CropRegion    (latest observation wins)
//! 3. Probe     decoder   →  bool          (WebP feature samples, short-circuit)
//! 4. Encode    canvas    →  artifact      (WebP or JPEG, maximum quality)
//! ```
//!
//! The interactive stencil itself (drawing, drag handles) is not part of this
//! crate. It reports regions into the [`session::CropSession`] and hands the
//! rendered [`imaging::Canvas`] to the encoder. The CLI, which has no widget,
//! renders the canvas itself through [`cropper::Cropper::render_canvas`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`presets`] | Closed set of crop presets (`default`, `avatar`, `cover`) |
//! | [`ingest`] | File selection, 5 MiB size gate, data-URL source images, error message |
//! | [`session`] | Live crop region and active preset |
//! | [`capability`] | WebP decode probes with caching |
//! | [`encode`] | Output format negotiation, encoding, preview handles |
//! | [`cropper`] | Facade wiring the stages together for one user |
//! | [`imaging`] | `image`-crate backend: decode, crop, encode |
//! | [`data_url`] | `data:<mime>;base64,` codec and MIME inspection |
//! | [`config`] | `stencil-crop.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Probe, Don't Assume
//!
//! Whether WebP output is usable is decided by decoding four 1×1 reference
//! samples (lossy, lossless, alpha, animation) through the same decoder the
//! consumer uses. The first success settles it. The answer is cached for the
//! life of the detector because decoder support cannot change mid-run.
//!
//! ## One Writer per Cell
//!
//! The current source image and error message belong to the ingestor; the crop
//! region belongs to the session. Writers take `&mut self`, so overlapping
//! selections on the same ingestor are serialized by the borrow checker rather
//! than racing, and a stale read can never overwrite a newer one.
//!
//! ## Failed Re-selection Is Harmless
//!
//! Rejecting an oversized file, or failing to read one, only updates the
//! error message. A previously loaded image stays usable.

pub mod capability;
pub mod config;
pub mod cropper;
pub mod data_url;
pub mod encode;
pub mod imaging;
pub mod ingest;
pub mod output;
pub mod presets;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use capability::{CapabilityDetector, CapabilitySet, Feature};
pub use cropper::{Cropper, RenderError};
pub use data_url::detect_mime_type;
pub use encode::{EncodeError, EncodedArtifact, Encoder, PreviewHandle};
pub use ingest::{
    ErrorState, FileIngestor, FileInput, IngestError, IngestOutcome, MAX_FILE_SIZE, SelectedFile,
    SourceImage, validate_file_size,
};
pub use presets::{Preset, PresetName, RegionError, UnknownPresetError, get_preset};
pub use session::{CropObservation, CropRegion, CropSession};
