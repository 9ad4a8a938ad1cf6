//! One cropping workflow, end to end.
//!
//! [`Cropper`] wires the pipeline stages together and is what a front end
//! drives:
//!
//! ```text
//! handle_file_change ─► on_change (every stencil frame) ─► render_canvas ─► crop
//!    FileIngestor          CropSession                     stencil render    Encoder
//! ```
//!
//! An interactive widget renders its own canvas and calls [`Cropper::crop`]
//! directly. Front ends without one (the CLI) use
//! [`Cropper::render_canvas`], which checks the committed region against the
//! active preset, cuts it from the source image and fits it to the preset's
//! canvas bounds.

use crate::capability::{CapabilityDetector, CapabilitySet};
use crate::data_url::DataUrlError;
use crate::encode::{EncodeError, EncodedArtifact, Encoder};
use crate::imaging::{BackendError, Canvas, ImageBackend, OutputFormat};
use crate::ingest::{FileIngestor, FileInput, IngestOutcome, SourceImage};
use crate::presets::{Preset, PresetName, RegionError};
use crate::session::{CropObservation, CropSession};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No crop region has been selected")]
    NoSelection,
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error("Source image is not a valid data URL: {0}")]
    DataUrl(#[from] DataUrlError),
    #[error("Failed to render crop: {0}")]
    Backend(#[from] BackendError),
    #[error("Render task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Ingestor, session, detector and encoder for a single user.
pub struct Cropper<B> {
    backend: Arc<B>,
    ingestor: FileIngestor,
    session: CropSession,
    detector: Arc<CapabilityDetector<B>>,
    encoder: Encoder<B>,
    cropped: Option<EncodedArtifact>,
}

impl<B: ImageBackend + 'static> Cropper<B> {
    pub fn new(backend: B, preset: PresetName) -> Self {
        let backend = Arc::new(backend);
        let detector = Arc::new(CapabilityDetector::new(Arc::clone(&backend)));
        let encoder = Encoder::new(Arc::clone(&backend), Arc::clone(&detector));
        Self {
            backend,
            ingestor: FileIngestor::new(),
            session: CropSession::new(preset),
            detector,
            encoder,
            cropped: None,
        }
    }

    /// See [`Encoder::prefer_modern`].
    pub fn prefer_modern(mut self, prefer: bool) -> Self {
        self.encoder = self.encoder.prefer_modern(prefer);
        self
    }

    /// The active preset.
    pub fn config(&self) -> &'static Preset {
        self.session.preset()
    }

    pub fn select_preset(&mut self, preset: PresetName) {
        self.session.select_preset(preset);
    }

    pub fn image(&self) -> Option<&Arc<SourceImage>> {
        self.ingestor.image()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.ingestor.error().message()
    }

    pub fn session(&self) -> &CropSession {
        &self.session
    }

    /// Last successful export.
    pub fn cropped(&self) -> Option<&EncodedArtifact> {
        self.cropped.as_ref()
    }

    pub async fn handle_file_change(&mut self, input: &mut FileInput) -> IngestOutcome {
        self.ingestor.handle_file_change(input).await
    }

    /// Stencil frame callback.
    pub fn on_change(&mut self, observation: CropObservation) {
        self.session.update(observation);
    }

    /// Render the last observed region the way the stencil would.
    pub async fn render_canvas(&self) -> Result<Canvas, RenderError> {
        let (Some(region), Some(image)) = (self.session.region(), self.session.image()) else {
            return Err(RenderError::NoSelection);
        };
        let preset = self.session.preset();
        preset.check_region(&region)?;

        let source_mime = image.mime_type();
        let bytes = image.bytes()?;
        let backend = Arc::clone(&self.backend);
        let cropped = tokio::task::spawn_blocking(move || backend.crop(&bytes, region))
            .await?
            .map_err(|e| match e {
                BackendError::RegionOutOfBounds { width, height, .. } => {
                    RenderError::Region(RegionError::OutOfBounds {
                        right: region.right(),
                        bottom: region.bottom(),
                        image_width: width,
                        image_height: height,
                    })
                }
                other => RenderError::Backend(other),
            })?;

        Ok(Canvas::new(cropped, source_mime).fit_within(preset.canvas))
    }

    /// Encode `canvas` and keep the result as [`Cropper::cropped`].
    ///
    /// `None` is a no-op: the previous export, if any, is kept.
    pub async fn crop(
        &mut self,
        canvas: Option<&Canvas>,
    ) -> Result<Option<&EncodedArtifact>, EncodeError> {
        if let Some(artifact) = self.encoder.encode(canvas).await? {
            self.cropped = Some(artifact);
            return Ok(self.cropped.as_ref());
        }
        Ok(None)
    }

    pub async fn supports_modern_format(&self) -> bool {
        self.detector.supports_modern_format().await
    }

    /// Format the next [`Cropper::crop`] will emit.
    pub async fn output_format(&self) -> OutputFormat {
        self.encoder.choose_format().await
    }

    pub async fn capabilities(&self) -> CapabilitySet {
        self.detector.capabilities().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::MockBackend;
    use crate::ingest::SelectedFile;
    use crate::session::CropRegion;
    use crate::test_helpers::{jpeg_bytes, write_file};
    use tempfile::TempDir;

    async fn loaded<B: ImageBackend + 'static>(
        cropper: &mut Cropper<B>,
        tmp: &TempDir,
        width: u32,
        height: u32,
    ) -> Arc<SourceImage> {
        let path = write_file(tmp.path(), "photo.jpg", &jpeg_bytes(width, height));
        let mut input = FileInput::new();
        input.select(SelectedFile::from_path(&path).await.unwrap());
        match cropper.handle_file_change(&mut input).await {
            IngestOutcome::Loaded(image) => image,
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    fn observe<B: ImageBackend + 'static>(
        cropper: &mut Cropper<B>,
        image: &Arc<SourceImage>,
        region: CropRegion,
    ) {
        cropper.on_change(CropObservation {
            coordinates: Some(region),
            image: Some(Arc::clone(image)),
        });
    }

    #[tokio::test]
    async fn render_without_selection_errors() {
        let cropper = Cropper::new(MockBackend::new(), PresetName::Default);
        assert!(matches!(
            cropper.render_canvas().await,
            Err(RenderError::NoSelection)
        ));
    }

    #[tokio::test]
    async fn render_checks_preset_minimum() {
        let tmp = TempDir::new().unwrap();
        let mut cropper = Cropper::new(RustBackend::new(), PresetName::Cover);
        let image = loaded(&mut cropper, &tmp, 400, 400).await;
        observe(&mut cropper, &image, CropRegion::new(10, 10, 200, 200));

        assert!(matches!(
            cropper.render_canvas().await,
            Err(RenderError::Region(RegionError::TooSmall { .. }))
        ));
    }

    #[tokio::test]
    async fn render_reports_out_of_bounds_region() {
        let tmp = TempDir::new().unwrap();
        let mut cropper = Cropper::new(RustBackend::new(), PresetName::Default);
        let image = loaded(&mut cropper, &tmp, 300, 300).await;
        observe(&mut cropper, &image, CropRegion::new(200, 200, 200, 200));

        assert!(matches!(
            cropper.render_canvas().await,
            Err(RenderError::Region(RegionError::OutOfBounds {
                right: 400,
                image_width: 300,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn render_fits_canvas_bounds() {
        let tmp = TempDir::new().unwrap();
        let mut cropper = Cropper::new(RustBackend::new(), PresetName::Default);
        let image = loaded(&mut cropper, &tmp, 800, 600).await;
        observe(&mut cropper, &image, CropRegion::new(0, 0, 640, 480));

        let canvas = cropper.render_canvas().await.unwrap();
        assert_eq!((canvas.width(), canvas.height()), (320, 240));
        assert_eq!(canvas.source_mime(), "image/jpeg");
    }

    #[tokio::test]
    async fn crop_keeps_last_artifact() {
        let mut cropper = Cropper::new(
            MockBackend::with_decode_results(vec![true]),
            PresetName::Avatar,
        );
        assert!(cropper.crop(None).await.unwrap().is_none());
        assert!(cropper.cropped().is_none());

        let canvas = Canvas::new(image::DynamicImage::new_rgb8(200, 200), "image/png");
        let mime = cropper
            .crop(Some(&canvas))
            .await
            .unwrap()
            .map(|a| a.mime_type.clone());
        assert_eq!(mime.as_deref(), Some("image/webp"));

        assert!(cropper.crop(None).await.unwrap().is_none());
        assert_eq!(cropper.cropped().unwrap().mime_type, "image/webp");
    }

    #[tokio::test]
    async fn output_format_matches_export() {
        let mut cropper = Cropper::new(
            MockBackend::with_decode_results(vec![false, false, true]),
            PresetName::Default,
        );
        assert!(cropper.supports_modern_format().await);
        assert_eq!(cropper.output_format().await, OutputFormat::WebP);

        let canvas = Canvas::new(image::DynamicImage::new_rgb8(160, 160), "image/png");
        let artifact = cropper.crop(Some(&canvas)).await.unwrap().unwrap();
        assert_eq!(artifact.mime_type, OutputFormat::WebP.mime_type());

        let jpeg_only = Cropper::new(MockBackend::with_decode_results(vec![true]), PresetName::Default)
            .prefer_modern(false);
        assert_eq!(jpeg_only.output_format().await, OutputFormat::Jpeg);
    }

    #[tokio::test]
    async fn session_tracks_observations() {
        let tmp = TempDir::new().unwrap();
        let mut cropper = Cropper::new(RustBackend::new(), PresetName::Avatar);
        let image = loaded(&mut cropper, &tmp, 300, 300).await;
        observe(&mut cropper, &image, CropRegion::new(5, 5, 200, 200));

        assert_eq!(cropper.session().region(), Some(CropRegion::new(5, 5, 200, 200)));
        assert_eq!(cropper.session().preset_name(), PresetName::Avatar);
        assert!(Arc::ptr_eq(cropper.session().image().unwrap(), &image));
        assert!(Arc::ptr_eq(cropper.image().unwrap(), &image));
    }

    #[tokio::test]
    async fn config_follows_selected_preset() {
        let mut cropper = Cropper::new(MockBackend::new(), PresetName::Default);
        assert_eq!(cropper.config().name, "Default");
        cropper.select_preset(PresetName::Cover);
        assert_eq!(cropper.config().name, "cover");
    }
}
