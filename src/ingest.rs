//! File selection and ingestion.
//!
//! Turning a user-selected file into a [`SourceImage`] happens in two steps:
//!
//! 1. **Size gate**: files over [`MAX_FILE_SIZE`] are rejected from the
//!    reported size alone. The content is never opened.
//! 2. **Read**: the file is read asynchronously and wrapped in a data URL.
//!    This is the only suspension point.
//!
//! [`FileIngestor`] owns the current image and the current error message.
//! A failed attempt updates the message and leaves the previous image in
//! place, so a bad re-selection never destroys a good crop source.
//!
//! [`FileIngestor::handle_file_change`] is the boundary the UI calls. It takes
//! the selection out of the [`FileInput`] before doing anything else, which
//! resets the input on every path and lets the same file be picked again.

use crate::data_url;
use image::ImageFormat;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Ingestion ceiling: 5 MiB. A file of exactly this size is accepted.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// MIME type used when neither the content nor the extension identifies the file.
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File is too large. Please select a file smaller than 5MB.")]
    FileTooLarge { size_bytes: u64 },
    #[error("An error occurred while reading the file: {0}")]
    FileRead(#[from] io::Error),
}

/// `true` when a file of `size_bytes` is within the ingestion ceiling.
pub fn validate_file_size(size_bytes: u64) -> bool {
    size_bytes <= MAX_FILE_SIZE
}

/// A file picked by the user, as reported by the input mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl SelectedFile {
    /// Describe a file on disk, taking its size from filesystem metadata.
    pub async fn from_path(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            size_bytes: metadata.len(),
            path,
        })
    }
}

/// File-selection control holding zero or one pending file.
#[derive(Debug, Clone, Default)]
pub struct FileInput {
    selected: Option<SelectedFile>,
}

impl FileInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, file: SelectedFile) {
        self.selected = Some(file);
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    /// Take the pending file, resetting the selection marker.
    pub fn take(&mut self) -> Option<SelectedFile> {
        self.selected.take()
    }
}

/// An ingested file, held as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    data_url: String,
    size_bytes: u64,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, data_url: String, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            data_url,
            size_bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Size of the file at ingestion time.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn mime_type(&self) -> String {
        data_url::detect_mime_type(&self.data_url)
    }

    /// Decode the payload back into the original file bytes.
    pub fn bytes(&self) -> Result<Vec<u8>, data_url::DataUrlError> {
        data_url::decode(&self.data_url).map(|(_, bytes)| bytes)
    }
}

/// The single current user-facing error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState(Option<String>);

impl ErrorState {
    pub fn message(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.0 = Some(message.into());
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// Result of one selection attempt at the UI boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The input held no file.
    NoSelection,
    Loaded(Arc<SourceImage>),
    /// The attempt failed; the message is also in [`FileIngestor::error`].
    Failed(String),
}

/// Owns the current [`SourceImage`] and [`ErrorState`].
#[derive(Debug, Default)]
pub struct FileIngestor {
    image: Option<Arc<SourceImage>>,
    error: ErrorState,
}

impl FileIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&Arc<SourceImage>> {
        self.image.as_ref()
    }

    pub fn error(&self) -> &ErrorState {
        &self.error
    }

    /// Validate and read `file`, replacing the current image on success.
    ///
    /// On failure the error message is set and the previous image is kept.
    pub async fn ingest(&mut self, file: SelectedFile) -> Result<Arc<SourceImage>, IngestError> {
        match read_source(&file).await {
            Ok(image) => {
                let image = Arc::new(image);
                log::info!(
                    "Loaded {} ({} bytes, {})",
                    image.name(),
                    image.size_bytes(),
                    image.mime_type()
                );
                self.image = Some(image.clone());
                self.error.clear();
                Ok(image)
            }
            Err(e) => {
                log::warn!("Rejected {}: {}", file.path.display(), e);
                self.error.set(e.to_string());
                Err(e)
            }
        }
    }

    /// Process the file input's pending selection.
    ///
    /// Errors are absorbed into [`FileIngestor::error`] rather than returned.
    pub async fn handle_file_change(&mut self, input: &mut FileInput) -> IngestOutcome {
        let Some(file) = input.take() else {
            return IngestOutcome::NoSelection;
        };
        self.error.clear();

        match self.ingest(file).await {
            Ok(image) => IngestOutcome::Loaded(image),
            Err(e) => IngestOutcome::Failed(e.to_string()),
        }
    }
}

async fn read_source(file: &SelectedFile) -> Result<SourceImage, IngestError> {
    if !validate_file_size(file.size_bytes) {
        return Err(IngestError::FileTooLarge {
            size_bytes: file.size_bytes,
        });
    }

    let bytes = tokio::fs::read(&file.path).await?;
    let mime = sniff_mime_type(&bytes, &file.path);
    Ok(SourceImage::new(
        file.name.clone(),
        data_url::encode(mime, &bytes),
        file.size_bytes,
    ))
}

/// MIME type from magic bytes, then from the extension.
fn sniff_mime_type(bytes: &[u8], path: &Path) -> &'static str {
    image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_MIME_TYPE)
}
