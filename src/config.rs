//! Tool configuration.
//!
//! Settings come from two layers: stock defaults, then an optional
//! `stencil-crop.toml` merged on top. Both are TOML; the file only needs
//! the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! preset = "default"        # default | avatar | cover
//! output_dir = "cropped"    # Where exported crops are written
//!
//! [encoding]
//! prefer_modern = true      # Emit WebP when the host decodes it
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::presets::PresetName;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is not given.
pub const CONFIG_FILENAME: &str = "stencil-crop.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `stencil-crop.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Preset used when the command line does not name one.
    pub preset: PresetName,
    /// Directory exported crops are written to.
    pub output_dir: String,
    pub encoding: EncodingConfig,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            preset: PresetName::Default,
            output_dir: "cropped".to_string(),
            encoding: EncodingConfig::default(),
        }
    }
}

impl CropConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// Allow WebP output when the capability probes succeed. With `false`
    /// every export is JPEG and no probes run.
    pub prefer_modern: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            prefer_modern: true,
        }
    }
}

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CropConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto `base`, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CropConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CropConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path` over the stock defaults.
pub fn load_config(path: &Path) -> Result<CropConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_none() {
        log::debug!("No config at {}, using defaults", path.display());
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Fully commented stock config, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# stencil-crop configuration
# ==========================
# All settings are optional. Values shown are the defaults.
# Unknown keys cause an error.

# Preset used when --preset is not given: "default", "avatar" or "cover".
#   default  160x160 minimum, fixed 320x320 stencil
#   avatar   160x160 minimum, square, rendered up to 640x640
#   cover    1300x400 minimum, resizable, rendered up to 2600x800
preset = "default"

# Directory exported crops are written to (created if missing).
output_dir = "cropped"

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[encoding]
# Emit WebP when this machine's decoder handles it, JPEG otherwise.
# Set to false to always emit JPEG.
prefer_modern = true
"##
}
