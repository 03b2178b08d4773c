//! Capability Detection
//!
//! The visibility primitive is injected behind `IntersectionCapability`
//! so hosts without geometry feedback degrade to the eager fallback and
//! tests can substitute a scripted observer. Detection happens once, at
//! loader construction; the result is assumed stable for the process.

use crate::observer::{GeometryObserver, IntersectionEntry, Rect, ViewportObserver};
use std::collections::HashMap;
use vantage_dom::NodeId;

/// Options shared by both of a loader's observers
#[derive(Debug, Clone, Copy)]
pub struct ObserverOptions {
    /// Pre-trigger margin around the viewport, in pixels
    pub root_margin_px: f32,
    /// Visible fraction that counts as a crossing, in [0, 1]
    pub threshold: f32,
}

/// Source of viewport observers, if the environment has one
pub trait IntersectionCapability {
    /// Whether the visibility primitive exists here
    fn is_supported(&self) -> bool;

    /// Construct an observer. Only called when `is_supported` is true.
    fn create(&mut self, options: ObserverOptions) -> Box<dyn ViewportObserver>;
}

/// Production capability: geometry-driven observers fed by the host
#[derive(Debug, Default)]
pub struct GeometryCapability;

impl IntersectionCapability for GeometryCapability {
    fn is_supported(&self) -> bool {
        true
    }

    fn create(&mut self, options: ObserverOptions) -> Box<dyn ViewportObserver> {
        Box::new(GeometryObserver::new(
            options.root_margin_px,
            options.threshold,
        ))
    }
}

/// Capability for environments with no visibility primitive
#[derive(Debug, Default)]
pub struct UnsupportedCapability;

impl IntersectionCapability for UnsupportedCapability {
    fn is_supported(&self) -> bool {
        false
    }

    fn create(&mut self, _options: ObserverOptions) -> Box<dyn ViewportObserver> {
        Box::new(NullObserver)
    }
}

/// Observer that watches nothing and reports nothing
struct NullObserver;

impl ViewportObserver for NullObserver {
    fn observe(&mut self, _target: NodeId) {}
    fn unobserve(&mut self, _target: NodeId) {}
    fn disconnect(&mut self) {}
    fn update(&mut self, _viewport: Rect, _rects: &HashMap<NodeId, Rect>) {}
    fn take_entries(&mut self) -> Vec<IntersectionEntry> {
        Vec::new()
    }
}
