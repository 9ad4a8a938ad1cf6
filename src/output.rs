//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout.
//!
//! ## Presets
//!
//! ```text
//! default (Default)
//!     Minimum: 160x160
//!     Canvas: 320x320
//!     Stencil: 320x320, movable, fixed size
//! ```
//!
//! ## Capabilities
//!
//! ```text
//! WebP lossy: yes
//! WebP lossless: yes
//! WebP alpha: yes
//! WebP animation: no
//! Output format: image/webp
//! ```
//!
//! ## Export
//!
//! ```text
//! photo.jpg (image/jpeg, 48213 bytes)
//!     Preset: avatar
//!     Region: 200x200 at (10, 10)
//!     Output: cropped/photo-avatar.webp (image/webp, 30115 bytes, 200x200)
//! ```

use crate::capability::{CapabilitySet, Feature};
use crate::encode::EncodedArtifact;
use crate::imaging::OutputFormat;
use crate::ingest::SourceImage;
use crate::presets::{Preset, PresetName};
use crate::session::CropRegion;
use std::path::Path;

fn indent(text: impl AsRef<str>) -> String {
    format!("    {}", text.as_ref())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn stencil_line(preset: &Preset) -> String {
    let mut parts = Vec::new();
    if let Some(size) = preset.stencil_size {
        parts.push(format!("{}x{}", size.width, size.height));
    }
    if preset.stencil_props.movable {
        parts.push("movable".to_string());
    }
    match preset.stencil_props.resizable {
        Some(true) => parts.push("resizable".to_string()),
        Some(false) => parts.push("fixed size".to_string()),
        None => {}
    }
    if let Some(ratio) = preset.stencil_props.aspect_ratio {
        parts.push(format!("aspect {ratio}"));
    }
    format!("Stencil: {}", parts.join(", "))
}

/// Lines describing every preset.
pub fn format_presets() -> Vec<String> {
    let mut lines = Vec::new();
    for name in PresetName::ALL {
        let preset = name.preset();
        lines.push(format!("{} ({})", name, preset.name));
        lines.push(indent(format!(
            "Minimum: {}x{}",
            preset.min_width, preset.min_height
        )));
        if preset.max_width.is_some() || preset.max_height.is_some() {
            let fmt = |v: Option<u32>| v.map_or("-".to_string(), |v| v.to_string());
            lines.push(indent(format!(
                "Maximum: {}x{}",
                fmt(preset.max_width),
                fmt(preset.max_height)
            )));
        }
        lines.push(indent(format!(
            "Canvas: {}x{}",
            preset.canvas.width, preset.canvas.height
        )));
        lines.push(indent(stencil_line(preset)));
    }
    lines
}

pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}

/// Per-feature probe results followed by the format an export would use.
pub fn format_capabilities(set: &CapabilitySet, output: OutputFormat) -> Vec<String> {
    let mut lines: Vec<String> = Feature::PROBE_ORDER
        .iter()
        .map(|&f| format!("WebP {}: {}", f, yes_no(set.get(f))))
        .collect();
    lines.push(format!("Output format: {}", output));
    lines
}

pub fn print_capabilities(set: &CapabilitySet, output: OutputFormat) {
    for line in format_capabilities(set, output) {
        println!("{}", line);
    }
}

/// Summary of one export.
pub fn format_export(
    source: &SourceImage,
    preset: PresetName,
    region: &CropRegion,
    artifact: &EncodedArtifact,
    output_path: &Path,
    dimensions: (u32, u32),
) -> Vec<String> {
    vec![
        format!(
            "{} ({}, {} bytes)",
            source.name(),
            source.mime_type(),
            source.size_bytes()
        ),
        indent(format!("Preset: {}", preset)),
        indent(format!(
            "Region: {}x{} at ({}, {})",
            region.width, region.height, region.left, region.top
        )),
        indent(format!(
            "Output: {} ({}, {} bytes, {}x{})",
            output_path.display(),
            artifact.mime_type,
            artifact.len(),
            dimensions.0,
            dimensions.1
        )),
    ]
}

pub fn print_export(
    source: &SourceImage,
    preset: PresetName,
    region: &CropRegion,
    artifact: &EncodedArtifact,
    output_path: &Path,
    dimensions: (u32, u32),
) {
    for line in format_export(source, preset, region, artifact, output_path, dimensions) {
        println!("{}", line);
    }
}
