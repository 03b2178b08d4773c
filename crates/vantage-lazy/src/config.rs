//! Loader Configuration
//!
//! Attribute contract, state classes, and the tunable knobs. All fields
//! default so the host can override any subset (programmatically or from
//! its dashboard config file).

use serde::{Deserialize, Serialize};

/// Deferred image source attribute
pub const ATTR_DEFERRED_SRC: &str = "data-src";
/// Deferred responsive source-set attribute
pub const ATTR_DEFERRED_SRCSET: &str = "data-srcset";
/// Generic deferred-block marker (presence flag, value uninterpreted)
pub const ATTR_DEFERRED_MARKER: &str = "data-lazy";

/// Class applied while a load is in flight
pub const CLASS_LOADING: &str = "lazy-loading";
/// Class applied when a load completes
pub const CLASS_LOADED: &str = "lazy-loaded";
/// Class applied when an image or frame load fails
pub const CLASS_ERROR: &str = "lazy-error";

/// Lazy loader configuration. Immutable once a loader is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyConfig {
    /// Margin around the viewport that pre-triggers loading, e.g. `"50px"`
    pub root_margin: String,
    /// Visible fraction that counts as a threshold crossing, in [0, 1]
    pub threshold: f32,
    /// Selector for deferred images
    pub image_selector: String,
    /// Selector for deferred frames and generic blocks
    pub content_selector: String,
    /// Register elements inserted after the initial scan
    pub watch_additions: bool,
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            root_margin: "50px".to_string(),
            threshold: 0.01,
            image_selector: format!("img[{ATTR_DEFERRED_SRC}]"),
            content_selector: format!(
                "iframe[{ATTR_DEFERRED_SRC}], [{ATTR_DEFERRED_MARKER}]"
            ),
            watch_additions: true,
        }
    }
}

/// Parse a root-margin string (`"50px"` or a bare number) into pixels
pub(crate) fn parse_root_margin(value: &str) -> Option<f32> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f32>().ok().filter(|v| v.is_finite())
}
