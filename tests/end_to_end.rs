//! Full workflow through the public API with the real `image` backend:
//! select a file, report a region, render, export.

use image::{ImageEncoder, RgbImage};
use stencil_crop::imaging::RustBackend;
use stencil_crop::{
    CapabilityDetector, CropObservation, CropRegion, Cropper, FileInput, IngestOutcome,
    MAX_FILE_SIZE, PresetName, RenderError, SelectedFile,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn jpeg_file(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    let path = dir.join(name);
    std::fs::write(&path, buf).unwrap();
    path
}

async fn select(cropper: &mut Cropper<RustBackend>, path: &Path) -> IngestOutcome {
    let mut input = FileInput::new();
    input.select(SelectedFile::from_path(path).await.unwrap());
    let outcome = cropper.handle_file_change(&mut input).await;
    assert!(input.is_empty(), "selection marker must be reset");
    outcome
}

async fn expected_mime() -> &'static str {
    let detector = CapabilityDetector::new(Arc::new(RustBackend::new()));
    if detector.capabilities().await.any() {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

#[tokio::test]
async fn crop_small_jpeg_with_default_preset() {
    let tmp = TempDir::new().unwrap();
    let path = jpeg_file(tmp.path(), "photo.jpg", 400, 300);
    let mut cropper = Cropper::new(RustBackend::new(), PresetName::Default);

    let image = match select(&mut cropper, &path).await {
        IngestOutcome::Loaded(image) => image,
        other => panic!("expected Loaded, got {other:?}"),
    };
    assert_eq!(image.name(), "photo.jpg");
    assert_eq!(image.mime_type(), "image/jpeg");
    assert!(cropper.error_message().is_none());

    cropper.on_change(CropObservation {
        coordinates: Some(CropRegion::new(10, 10, 200, 200)),
        image: Some(Arc::clone(&image)),
    });
    let canvas = cropper.render_canvas().await.unwrap();
    assert_eq!((canvas.width(), canvas.height()), (200, 200));

    let artifact = cropper.crop(Some(&canvas)).await.unwrap().unwrap();
    assert_eq!(artifact.mime_type, expected_mime().await);
    assert!(!artifact.is_empty());

    let dims = artifact
        .with_preview(|p| image::image_dimensions(p).map_err(std::io::Error::other))
        .unwrap();
    assert_eq!(dims, (200, 200));
    assert!(cropper.cropped().is_some());
}

#[tokio::test]
async fn jpeg_only_export_when_modern_disabled() {
    let tmp = TempDir::new().unwrap();
    let path = jpeg_file(tmp.path(), "photo.jpg", 400, 300);
    let mut cropper = Cropper::new(RustBackend::new(), PresetName::Avatar).prefer_modern(false);

    let IngestOutcome::Loaded(image) = select(&mut cropper, &path).await else {
        panic!("expected Loaded");
    };
    cropper.on_change(CropObservation {
        coordinates: Some(CropRegion::new(0, 0, 300, 300)),
        image: Some(image),
    });
    let canvas = cropper.render_canvas().await.unwrap();
    let artifact = cropper.crop(Some(&canvas)).await.unwrap().unwrap();
    assert_eq!(artifact.mime_type, "image/jpeg");
    assert_eq!(artifact.extension(), "jpg");
}

#[tokio::test]
async fn region_below_preset_minimum_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = jpeg_file(tmp.path(), "photo.jpg", 400, 300);
    let mut cropper = Cropper::new(RustBackend::new(), PresetName::Default);

    let IngestOutcome::Loaded(image) = select(&mut cropper, &path).await else {
        panic!("expected Loaded");
    };
    cropper.on_change(CropObservation {
        coordinates: Some(CropRegion::new(0, 0, 100, 100)),
        image: Some(image),
    });
    assert!(matches!(
        cropper.render_canvas().await,
        Err(RenderError::Region(_))
    ));
}

#[tokio::test]
async fn file_at_size_limit_is_accepted() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("limit.bin");
    std::fs::write(&path, vec![0u8; MAX_FILE_SIZE as usize]).unwrap();
    let mut cropper = Cropper::new(RustBackend::new(), PresetName::Default);

    let IngestOutcome::Loaded(image) = select(&mut cropper, &path).await else {
        panic!("expected Loaded");
    };
    assert_eq!(image.size_bytes(), MAX_FILE_SIZE);
    assert_eq!(image.bytes().unwrap().len(), MAX_FILE_SIZE as usize);
}

#[tokio::test]
async fn oversized_reselection_keeps_previous_image() {
    let tmp = TempDir::new().unwrap();
    let good = jpeg_file(tmp.path(), "photo.jpg", 320, 320);
    let big = tmp.path().join("huge.jpg");
    std::fs::write(&big, vec![0u8; MAX_FILE_SIZE as usize + 1]).unwrap();
    let mut cropper = Cropper::new(RustBackend::new(), PresetName::Default);

    assert!(matches!(
        select(&mut cropper, &good).await,
        IngestOutcome::Loaded(_)
    ));
    match select(&mut cropper, &big).await {
        IngestOutcome::Failed(message) => assert_eq!(
            message,
            "File is too large. Please select a file smaller than 5MB."
        ),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(
        cropper.error_message(),
        Some("File is too large. Please select a file smaller than 5MB.")
    );
    assert_eq!(cropper.image().unwrap().name(), "photo.jpg");
}
