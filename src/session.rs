//! Live crop-region state.
//!
//! The stencil widget pushes a [`CropObservation`] on every interaction
//! frame. [`CropSession`] keeps only the latest complete one; there is no
//! history and no commit step. When the user finalizes a crop, the encoder
//! reads [`CropSession::region`] alongside the canvas the widget rendered.

use crate::ingest::SourceImage;
use crate::presets::{Preset, PresetName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Rectangle in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Exclusive right edge. Widened so `left + width` cannot overflow.
    pub fn right(&self) -> u64 {
        self.left as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        self.top as u64 + self.height as u64
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One frame of stencil output. Either field may be missing while the widget
/// is still initializing.
#[derive(Debug, Clone, Default)]
pub struct CropObservation {
    pub coordinates: Option<CropRegion>,
    pub image: Option<Arc<SourceImage>>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    region: CropRegion,
    image: Arc<SourceImage>,
}

/// Holds the active preset and the last complete observation.
#[derive(Debug, Clone, Default)]
pub struct CropSession {
    preset: PresetName,
    latest: Option<Snapshot>,
}

impl CropSession {
    pub fn new(preset: PresetName) -> Self {
        Self {
            preset,
            latest: None,
        }
    }

    /// Record a stencil update. Incomplete observations are ignored.
    pub fn update(&mut self, observation: CropObservation) {
        let (Some(region), Some(image)) = (observation.coordinates, observation.image) else {
            return;
        };
        log::trace!(
            "crop region {}x{}+{}+{}",
            region.width,
            region.height,
            region.left,
            region.top
        );
        self.latest = Some(Snapshot { region, image });
    }

    pub fn region(&self) -> Option<CropRegion> {
        self.latest.as_ref().map(|s| s.region)
    }

    pub fn image(&self) -> Option<&Arc<SourceImage>> {
        self.latest.as_ref().map(|s| &s.image)
    }

    /// Switch presets. The held region is left as-is.
    pub fn select_preset(&mut self, preset: PresetName) {
        self.preset = preset;
    }

    pub fn preset_name(&self) -> PresetName {
        self.preset
    }

    pub fn preset(&self) -> &'static Preset {
        self.preset.preset()
    }

    /// Drop the held observation.
    pub fn reset(&mut self) {
        self.latest = None;
    }
}
