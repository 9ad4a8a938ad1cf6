//! Parameter types for encode operations.
//!
//! - [`Quality`]: quality factor on a 0–1 scale. Clamped on construction.
//! - [`OutputFormat`]: the two output encodings: WebP when the host decodes
//!   it, JPEG otherwise.

use serde::Serialize;
use std::fmt;

/// Quality factor for encoding (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Quality(f32);

impl Quality {
    /// Highest setting. Exports always use this.
    pub const MAX: Quality = Quality(1.0);

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::MAX;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// The factor as an integer percentage, floored at 1 for encoders that
    /// reject a quality of zero.
    pub fn percent(self) -> u8 {
        ((self.0 * 100.0).round() as u8).max(1)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

/// Output encoding for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputFormat {
    /// Preferred when the host can decode it. Encoded losslessly.
    WebP,
    /// Universally decodable fallback.
    Jpeg,
}

impl OutputFormat {
    pub const MODERN: OutputFormat = OutputFormat::WebP;
    pub const FALLBACK: OutputFormat = OutputFormat::Jpeg;

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/webp" => Some(OutputFormat::WebP),
            "image/jpeg" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_unit_range() {
        assert_eq!(Quality::new(-0.5).value(), 0.0);
        assert_eq!(Quality::new(0.5).value(), 0.5);
        assert_eq!(Quality::new(1.5).value(), 1.0);
        assert_eq!(Quality::new(f32::NAN), Quality::MAX);
    }

    #[test]
    fn quality_default_is_max() {
        assert_eq!(Quality::default().value(), 1.0);
        assert_eq!(Quality::default().percent(), 100);
    }

    #[test]
    fn quality_percent_never_zero() {
        assert_eq!(Quality::new(0.0).percent(), 1);
        assert_eq!(Quality::new(0.85).percent(), 85);
    }

    #[test]
    fn format_mime_types() {
        assert_eq!(OutputFormat::MODERN.mime_type(), "image/webp");
        assert_eq!(OutputFormat::FALLBACK.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::from_mime_type("image/webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_mime_type("image/png"), None);
    }
}
