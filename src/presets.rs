//! Named crop presets.
//!
//! A preset bundles the constraints the crop stencil works under: minimum
//! (and optionally maximum) region size, the display bounds of the rendered
//! canvas, an optional fixed stencil size, and the stencil's interaction
//! props. The set is closed: [`PresetName`] has exactly three variants and
//! every preset is a `static`, so lookups are pure and allocation-free.
//!
//! | Preset | Min | Canvas | Stencil | Props |
//! |---|---|---|---|---|
//! | `default` | 160×160 | 320×320 | 320×320 | movable, not resizable |
//! | `avatar` | 160×160 | 640×640 | free | movable, 1:1 aspect |
//! | `cover` | 1300×400 | 2600×800 | 1300×400 | movable, resizable |
//!
//! Switching presets never touches an existing crop region; callers that want
//! a fresh region after a switch reset the [`CropSession`](crate::session::CropSession)
//! themselves.

use crate::session::CropRegion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lookup of a preset name outside the closed set.
///
/// This is a programming error, not a user-facing condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown preset '{0}'. Expected one of: default, avatar, cover")]
pub struct UnknownPresetError(pub String);

/// A region that violates a preset's constraints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("Crop region {width}x{height} is smaller than the {preset} minimum of {min_width}x{min_height}")]
    TooSmall {
        preset: &'static str,
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    #[error("Crop region {width}x{height} exceeds the {preset} maximum of {max_width}x{max_height}")]
    TooLarge {
        preset: &'static str,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
    #[error("Crop region {width}x{height} does not match the {expected} aspect ratio")]
    AspectRatio {
        width: u32,
        height: u32,
        expected: AspectRatio,
    },
    #[error("Crop region ends at {right}x{bottom}, outside the {image_width}x{image_height} image")]
    OutOfBounds {
        right: u64,
        bottom: u64,
        image_width: u32,
        image_height: u32,
    },
}

/// Identifier of a preset. Serialized lowercase (`"default"`, `"avatar"`, `"cover"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    #[default]
    Default,
    Avatar,
    Cover,
}

impl PresetName {
    pub const ALL: [PresetName; 3] = [PresetName::Default, PresetName::Avatar, PresetName::Cover];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Avatar => "avatar",
            PresetName::Cover => "cover",
        }
    }

    /// The preset this name selects. Infallible: the key space is closed.
    pub fn preset(self) -> &'static Preset {
        match self {
            PresetName::Default => &DEFAULT,
            PresetName::Avatar => &AVATAR,
            PresetName::Cover => &COVER,
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetName {
    type Err = UnknownPresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownPresetError(s.to_string()))
    }
}

/// Look up a preset by its string identifier.
pub fn get_preset(name: &str) -> Result<&'static Preset, UnknownPresetError> {
    name.parse::<PresetName>().map(PresetName::preset)
}

/// Width × height pair used for canvas bounds and fixed stencil sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Positive rational aspect ratio (width / height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn value(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Interaction props handed to the stencil widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StencilProps {
    pub movable: bool,
    /// `None` leaves the widget's own default in place.
    pub resizable: Option<bool>,
    pub aspect_ratio: Option<AspectRatio>,
    /// Names of the resize handles to show; `None` shows the widget default set.
    pub handlers: Option<&'static [&'static str]>,
}

/// Immutable crop constraints for one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub canvas: Size,
    pub stencil_size: Option<Size>,
    pub stencil_props: StencilProps,
}

// No preset caps the region size; oversized crops are scaled down to the
// canvas bounds instead.
static DEFAULT: Preset = Preset {
    name: "Default",
    min_width: 160,
    min_height: 160,
    max_width: None,
    max_height: None,
    canvas: Size {
        width: 320,
        height: 320,
    },
    stencil_size: Some(Size {
        width: 320,
        height: 320,
    }),
    stencil_props: StencilProps {
        movable: true,
        resizable: Some(false),
        aspect_ratio: None,
        handlers: None,
    },
};

static AVATAR: Preset = Preset {
    name: "avatar",
    min_width: 160,
    min_height: 160,
    max_width: None,
    max_height: None,
    canvas: Size {
        width: 640,
        height: 640,
    },
    stencil_size: None,
    stencil_props: StencilProps {
        movable: true,
        resizable: None,
        aspect_ratio: Some(AspectRatio {
            width: 1,
            height: 1,
        }),
        handlers: None,
    },
};

static COVER: Preset = Preset {
    name: "cover",
    min_width: 1300,
    min_height: 400,
    max_width: None,
    max_height: None,
    canvas: Size {
        width: 2600,
        height: 800,
    },
    stencil_size: Some(Size {
        width: 1300,
        height: 400,
    }),
    stencil_props: StencilProps {
        movable: true,
        resizable: Some(true),
        aspect_ratio: None,
        handlers: None,
    },
};

impl Preset {
    /// Check a committed region against this preset's size and shape constraints.
    ///
    /// Aspect ratio is enforced with one pixel of slack to absorb rounding in
    /// the stencil's coordinate reports.
    pub fn check_region(&self, region: &CropRegion) -> Result<(), RegionError> {
        if region.width < self.min_width || region.height < self.min_height {
            return Err(RegionError::TooSmall {
                preset: self.name,
                width: region.width,
                height: region.height,
                min_width: self.min_width,
                min_height: self.min_height,
            });
        }

        let max_width = self.max_width.unwrap_or(u32::MAX);
        let max_height = self.max_height.unwrap_or(u32::MAX);
        if region.width > max_width || region.height > max_height {
            return Err(RegionError::TooLarge {
                preset: self.name,
                width: region.width,
                height: region.height,
                max_width,
                max_height,
            });
        }

        if let Some(ratio) = self.stencil_props.aspect_ratio {
            let expected_width = region.height as f64 * ratio.value();
            if (region.width as f64 - expected_width).abs() > 1.0 {
                return Err(RegionError::AspectRatio {
                    width: region.width,
                    height: region.height,
                    expected: ratio,
                });
            }
        }

        Ok(())
    }
}
