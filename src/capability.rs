//! Host decoding capability probes.
//!
//! Whether the modern output format can be used is decided empirically: for
//! each WebP feature a minimal reference image (1×1 pixel) is pushed through
//! the backend's decoder. A successful decode means the feature is
//! supported; any failure means it is not. Probes never error.
//!
//! [`CapabilityDetector::supports_modern_format`] runs the probes in the fixed
//! order lossy → lossless → alpha → animation, one at a time, and stops at the
//! first success. Decoder capability does not change while the process runs,
//! so both the coarse answer and the full [`CapabilitySet`] are computed once
//! per detector and cached.

use crate::imaging::ImageBackend;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A WebP feature that can be probed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Lossy,
    Lossless,
    Alpha,
    Animation,
}

impl Feature {
    /// Order in which [`CapabilityDetector::supports_modern_format`] probes.
    pub const PROBE_ORDER: [Feature; 4] = [
        Feature::Lossy,
        Feature::Lossless,
        Feature::Alpha,
        Feature::Animation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Lossy => "lossy",
            Feature::Lossless => "lossless",
            Feature::Alpha => "alpha",
            Feature::Animation => "animation",
        }
    }

    /// Base64 of the reference WebP sample for this feature.
    pub fn sample(self) -> &'static str {
        match self {
            Feature::Lossy => "UklGRiIAAABXRUJQVlA4IBYAAAAwAQCdASoBAAEADsD+JaQAA3AAAAAA",
            Feature::Lossless => "UklGRhoAAABXRUJQVlA4TA0AAAAvAAAAEAcQERGIiP4HAA==",
            Feature::Alpha => {
                "UklGRkoAAABXRUJQVlA4WAoAAAAQAAAAAAAAAAAAQUxQSAwAAAARBxAR/Q9ERP8DAABWUDggGAAAABQBAJ0BKgEAAQAAAP4AAA3AAP7mtQAAAA=="
            }
            Feature::Animation => {
                "UklGRlIAAABXRUJQVlA4WAoAAAASAAAAAAAAAAAAQU5JTQYAAAD/////AABBTk1GJgAAAAAAAAAAAAAAAAAAAGQAAABWUDhMDQAAAC8AAAAQBxAREYiI/gcA"
            }
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-feature probe results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CapabilitySet {
    pub lossy: bool,
    pub lossless: bool,
    pub alpha: bool,
    pub animation: bool,
}

impl CapabilitySet {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Lossy => self.lossy,
            Feature::Lossless => self.lossless,
            Feature::Alpha => self.alpha,
            Feature::Animation => self.animation,
        }
    }

    pub fn any(&self) -> bool {
        Feature::PROBE_ORDER.into_iter().any(|f| self.get(f))
    }
}

/// Probes the backend's decoder and caches the answers.
pub struct CapabilityDetector<B> {
    backend: Arc<B>,
    modern: OnceCell<bool>,
    full: OnceCell<CapabilitySet>,
}

impl<B: ImageBackend + 'static> CapabilityDetector<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            modern: OnceCell::new(),
            full: OnceCell::new(),
        }
    }

    /// Attempt to decode the reference sample for `feature`.
    ///
    /// The decode runs on the blocking pool. A decode error, a malformed
    /// sample, or a failed task all count as "unsupported".
    pub async fn detect(&self, feature: Feature) -> bool {
        let Ok(sample) = STANDARD.decode(feature.sample()) else {
            return false;
        };
        let backend = Arc::clone(&self.backend);
        let supported = tokio::task::spawn_blocking(move || backend.decode(&sample).is_ok())
            .await
            .unwrap_or(false);
        log::debug!("WebP {feature} probe: {supported}");
        supported
    }

    /// `true` if any probe succeeds. Probing stops at the first success.
    ///
    /// Computed once; later calls return the cached answer.
    pub async fn supports_modern_format(&self) -> bool {
        *self
            .modern
            .get_or_init(|| async move {
                if let Some(full) = self.full.get() {
                    return full.any();
                }
                for feature in Feature::PROBE_ORDER {
                    if self.detect(feature).await {
                        return true;
                    }
                }
                false
            })
            .await
    }

    /// Run every probe (in [`Feature::PROBE_ORDER`]) and report each result.
    pub async fn capabilities(&self) -> CapabilitySet {
        *self
            .full
            .get_or_init(|| async move {
                CapabilitySet {
                    lossy: self.detect(Feature::Lossy).await,
                    lossless: self.detect(Feature::Lossless).await,
                    alpha: self.detect(Feature::Alpha).await,
                    animation: self.detect(Feature::Animation).await,
                }
            })
            .await
    }
}
