//! The rendered crop surface handed to the encoder.

use crate::presets::Size;
use image::DynamicImage;
use image::imageops::FilterType;
use std::sync::Arc;

/// Pixels produced by the stencil for the committed region.
///
/// Cloning is cheap: the pixel buffer is shared, so a canvas can be moved
/// into a blocking encode task without copying.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: Arc<DynamicImage>,
    source_mime: String,
}

impl Canvas {
    /// `source_mime` is the MIME type of the image the canvas was cut from,
    /// kept for inspection only.
    pub fn new(image: DynamicImage, source_mime: impl Into<String>) -> Self {
        Self {
            image: Arc::new(image),
            source_mime: source_mime.into(),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub(crate) fn shared_image(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.image)
    }

    pub fn source_mime(&self) -> &str {
        &self.source_mime
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Scale down (never up) so the canvas fits inside `bounds`, keeping the
    /// aspect ratio.
    pub fn fit_within(self, bounds: Size) -> Self {
        if self.width() <= bounds.width && self.height() <= bounds.height {
            return self;
        }
        let scaled = self
            .image
            .resize(bounds.width, bounds.height, FilterType::Lanczos3);
        Self {
            image: Arc::new(scaled),
            source_mime: self.source_mime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_within_leaves_small_canvas_alone() {
        let canvas = Canvas::new(DynamicImage::new_rgb8(200, 100), "image/png");
        let fitted = canvas.fit_within(Size {
            width: 320,
            height: 320,
        });
        assert_eq!((fitted.width(), fitted.height()), (200, 100));
        assert_eq!(fitted.source_mime(), "image/png");
    }

    #[test]
    fn fit_within_scales_down_preserving_aspect() {
        let canvas = Canvas::new(DynamicImage::new_rgb8(1000, 500), "image/jpeg");
        let fitted = canvas.fit_within(Size {
            width: 320,
            height: 320,
        });
        assert_eq!((fitted.width(), fitted.height()), (320, 160));
        assert_eq!(fitted.image().color(), image::ColorType::Rgb8);
    }

    #[test]
    fn clones_share_pixels() {
        let canvas = Canvas::new(DynamicImage::new_rgb8(4, 4), "image/png");
        let copy = canvas.clone();
        assert!(Arc::ptr_eq(&canvas.shared_image(), &copy.shared_image()));
    }
}
