//! Final export of a rendered crop.
//!
//! [`Encoder::encode`] asks the [`CapabilityDetector`] whether the host
//! decodes WebP. If it does, the canvas is encoded as WebP; otherwise it
//! falls back to JPEG. Both use the maximum quality setting. The encode runs
//! on the blocking pool so the event loop keeps turning.
//!
//! The result is an [`EncodedArtifact`]: a MIME type plus bytes, handed to
//! whatever consumes it next. Nothing here touches the network.
//!
//! ## Preview handles
//!
//! Local display needs the bytes at an addressable location.
//! [`EncodedArtifact::with_preview`] writes them to a temporary file, lends
//! the path to a consumer, and removes the file afterwards whatever the
//! consumer did, including on error or panic. The file is owned
//! by a [`PreviewHandle`] guard; dropping the guard releases it.

use crate::capability::CapabilityDetector;
use crate::imaging::{BackendError, Canvas, ImageBackend, OutputFormat, Quality};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to encode crop: {0}")]
    Backend(#[from] BackendError),
    #[error("Encode task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Encoded output of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl EncodedArtifact {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        OutputFormat::from_mime_type(&self.mime_type)
            .map(OutputFormat::extension)
            .unwrap_or("bin")
    }

    /// Write the artifact to a temporary file and return the guard owning it.
    pub fn preview(&self) -> io::Result<PreviewHandle> {
        let mut file = tempfile::Builder::new()
            .prefix("crop-preview-")
            .suffix(&format!(".{}", self.extension()))
            .tempfile()?;
        file.write_all(&self.data)?;
        file.flush()?;
        Ok(PreviewHandle { file })
    }

    /// Lend a preview path to `consume`, releasing it on every exit path.
    pub fn with_preview<T, E>(&self, consume: impl FnOnce(&Path) -> Result<T, E>) -> Result<T, E>
    where
        E: From<io::Error>,
    {
        let handle = self.preview()?;
        let result = consume(handle.path());
        if let Err(e) = handle.release() {
            log::warn!("Failed to release preview: {e}");
        }
        result
    }
}

/// Temporary on-disk copy of an artifact. Removed when released or dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    file: NamedTempFile,
}

impl PreviewHandle {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the file now, reporting any error. Dropping does the same
    /// silently.
    pub fn release(self) -> io::Result<()> {
        self.file.close()
    }
}

/// Chooses an output format and encodes canvases.
pub struct Encoder<B> {
    backend: Arc<B>,
    detector: Arc<CapabilityDetector<B>>,
    prefer_modern: bool,
}

impl<B: ImageBackend + 'static> Encoder<B> {
    pub fn new(backend: Arc<B>, detector: Arc<CapabilityDetector<B>>) -> Self {
        Self {
            backend,
            detector,
            prefer_modern: true,
        }
    }

    /// With `false`, always emit the fallback format without probing.
    pub fn prefer_modern(mut self, prefer: bool) -> Self {
        self.prefer_modern = prefer;
        self
    }

    /// WebP when allowed and supported, JPEG otherwise.
    pub async fn choose_format(&self) -> OutputFormat {
        if self.prefer_modern && self.detector.supports_modern_format().await {
            OutputFormat::MODERN
        } else {
            OutputFormat::FALLBACK
        }
    }

    /// Encode `canvas`. `None` means nothing has been rendered yet and
    /// resolves to `Ok(None)`.
    pub async fn encode(
        &self,
        canvas: Option<&Canvas>,
    ) -> Result<Option<EncodedArtifact>, EncodeError> {
        let Some(canvas) = canvas else {
            log::debug!("No canvas to encode");
            return Ok(None);
        };

        let format = self.choose_format().await;
        let quality = Quality::MAX;
        log::debug!(
            "Encoding {}x{} canvas (source {}) as {format}",
            canvas.width(),
            canvas.height(),
            canvas.source_mime()
        );

        let backend = Arc::clone(&self.backend);
        let image = canvas.shared_image();
        let data =
            tokio::task::spawn_blocking(move || backend.encode(&image, format, quality)).await??;

        log::info!("Exported {} bytes as {format}", data.len());
        Ok(Some(EncodedArtifact {
            mime_type: format.mime_type().to_string(),
            data,
        }))
    }
}
