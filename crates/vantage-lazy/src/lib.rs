//! Vantage Lazy - Visibility-Triggered Resource Loader
//!
//! Defers loading of dashboard images and embedded content until the
//! element is about to enter the viewport, tracks load state per
//! element, and degrades to eager loading when no visibility primitive
//! is available.
//!
//! # Example
//! ```rust,ignore
//! use vantage_dom::Document;
//! use vantage_lazy::{LazyConfig, LazyLoader};
//!
//! let mut doc = Document::new();
//! // ... build the dashboard DOM, marking deferred images with data-src ...
//! let mut loader = LazyLoader::with_defaults(&mut doc);
//! // each frame: push geometry, then pump
//! loader.update_viewport(viewport, &element_rects);
//! loader.pump(&mut doc);
//! ```

mod capability;
mod config;
mod loader;
mod observer;
mod track;

pub use capability::{
    GeometryCapability, IntersectionCapability, ObserverOptions, UnsupportedCapability,
};
pub use config::{
    ATTR_DEFERRED_MARKER, ATTR_DEFERRED_SRC, ATTR_DEFERRED_SRCSET, CLASS_ERROR, CLASS_LOADED,
    CLASS_LOADING, LazyConfig,
};
pub use loader::{LazyLoader, LoadOutcome};
pub use observer::{GeometryObserver, IntersectionEntry, Rect, ViewportObserver};
pub use track::TrackedSet;

// Re-export the DOM substrate for consumers
pub use vantage_dom as dom;
