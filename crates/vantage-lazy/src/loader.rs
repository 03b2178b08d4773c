//! Lazy Loader
//!
//! Defers image and embedded-content loading until the element nears
//! the viewport. Elements are claimed into tracked sets the moment a
//! load starts, so every load operation is idempotent; environments
//! without a visibility primitive fall back to loading every candidate
//! eagerly at construction, with identical attribute and class handling.

use crate::capability::{GeometryCapability, IntersectionCapability, ObserverOptions};
use crate::config::{
    self, ATTR_DEFERRED_MARKER, ATTR_DEFERRED_SRC, ATTR_DEFERRED_SRCSET, CLASS_ERROR,
    CLASS_LOADED, CLASS_LOADING, LazyConfig,
};
use crate::observer::{Rect, ViewportObserver};
use crate::track::TrackedSet;
use std::collections::HashMap;
use vantage_dom::{Document, NodeId, Selector};

/// Terminal result of an image or frame load, delivered by the host's
/// resource pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Error,
}

/// Visibility-triggered resource loader.
///
/// One instance per loading session; after [`destroy`](Self::destroy)
/// the instance goes inert and a fresh one is required.
pub struct LazyLoader {
    config: LazyConfig,
    image_selector: Selector,
    content_selector: Selector,
    is_supported: bool,
    image_observer: Option<Box<dyn ViewportObserver>>,
    content_observer: Option<Box<dyn ViewportObserver>>,
    images: TrackedSet,
    content: TrackedSet,
    mutation_observer: Option<u64>,
    destroyed: bool,
}

impl LazyLoader {
    /// Construct a loader over `doc` with an injected visibility
    /// capability, then run the initial candidate scan.
    ///
    /// Never fails: malformed selector or margin overrides degrade to
    /// the defaults, and a missing capability switches every load to
    /// the eager fallback path.
    pub fn new(
        doc: &mut Document,
        config: LazyConfig,
        capability: &mut dyn IntersectionCapability,
    ) -> Self {
        let image_selector = parse_selector(&config.image_selector, "image", || {
            Selector::tag_with_attr(Some("img"), ATTR_DEFERRED_SRC)
        });
        let content_selector = parse_selector(&config.content_selector, "content", || {
            Selector::tag_with_attr(Some("iframe"), ATTR_DEFERRED_SRC)
                .or(Selector::tag_with_attr(None, ATTR_DEFERRED_MARKER))
        });

        let root_margin_px = match config::parse_root_margin(&config.root_margin) {
            Some(px) => px,
            None => {
                tracing::warn!(
                    root_margin = %config.root_margin,
                    "unparseable root margin, using 0px"
                );
                0.0
            }
        };
        let threshold = if config.threshold.is_finite() {
            config.threshold.clamp(0.0, 1.0)
        } else {
            tracing::warn!(threshold = %config.threshold, "invalid threshold, using 0");
            0.0
        };

        let is_supported = capability.is_supported();
        let (image_observer, content_observer) = if is_supported {
            let options = ObserverOptions {
                root_margin_px,
                threshold,
            };
            // Image observer first, then content (tests rely on this order)
            (
                Some(capability.create(options)),
                Some(capability.create(options)),
            )
        } else {
            (None, None)
        };

        let mutation_observer = if config.watch_additions {
            let id = doc.mutations_mut().create();
            let root = doc.root();
            if let Some(observer) = doc.mutations_mut().get(id) {
                observer.observe(root);
            }
            Some(id)
        } else {
            None
        };

        tracing::info!(
            supported = is_supported,
            watch_additions = config.watch_additions,
            "lazy loader constructed"
        );

        let mut loader = Self {
            config,
            image_selector,
            content_selector,
            is_supported,
            image_observer,
            content_observer,
            images: TrackedSet::new(),
            content: TrackedSet::new(),
            mutation_observer,
            destroyed: false,
        };
        loader.scan(doc);
        loader
    }

    /// Construct with the default configuration and the geometry-driven
    /// capability.
    pub fn with_defaults(doc: &mut Document) -> Self {
        let mut capability = GeometryCapability;
        Self::new(doc, LazyConfig::default(), &mut capability)
    }

    /// Whether the visibility primitive was available at construction
    pub fn is_supported(&self) -> bool {
        self.is_supported
    }

    /// Number of images with an initiated load
    pub fn tracked_images(&self) -> usize {
        self.images.len()
    }

    /// Number of content elements with an initiated load
    pub fn tracked_content(&self) -> usize {
        self.content.len()
    }

    /// The configuration this loader was built with
    pub fn config(&self) -> &LazyConfig {
        &self.config
    }

    /// Start loading a deferred image.
    ///
    /// Claims the element, applies `lazy-loading`, moves `data-src` to
    /// `src` (and `data-srcset` to `srcset` when present), and stops
    /// observing it. Elements carrying neither deferred attribute are
    /// not candidates and are never claimed. Calling this twice for one
    /// element is a no-op the second time; the resource attributes are
    /// written at most once.
    pub fn load_image(&mut self, doc: &mut Document, node: NodeId) {
        if self.destroyed {
            return;
        }
        if !doc.has_attr(node, ATTR_DEFERRED_SRC) && !doc.has_attr(node, ATTR_DEFERRED_SRCSET) {
            return;
        }
        if !self.images.begin(node) {
            return;
        }
        doc.add_class(node, CLASS_LOADING);
        if let Some(src) = doc.remove_attr(node, ATTR_DEFERRED_SRC) {
            doc.set_attr(node, "src", &src);
        }
        if let Some(srcset) = doc.remove_attr(node, ATTR_DEFERRED_SRCSET) {
            doc.set_attr(node, "srcset", &srcset);
        }
        if let Some(observer) = self.image_observer.as_mut() {
            observer.unobserve(node);
        }
        tracing::debug!(node = node.to_raw(), "image load started");
    }

    /// Start loading deferred content.
    ///
    /// Frames with a deferred source behave like images and wait for
    /// [`resolve_load`](Self::resolve_load); generic marked blocks have
    /// nothing to fetch and go straight to `lazy-loaded`.
    pub fn load_content(&mut self, doc: &mut Document, node: NodeId) {
        if self.destroyed || !self.content.begin(node) {
            return;
        }
        let is_frame = doc.tag(node).is_some_and(|t| t.eq_ignore_ascii_case("iframe"));
        if is_frame && doc.has_attr(node, ATTR_DEFERRED_SRC) {
            doc.add_class(node, CLASS_LOADING);
            if let Some(src) = doc.remove_attr(node, ATTR_DEFERRED_SRC) {
                doc.set_attr(node, "src", &src);
            }
            tracing::debug!(node = node.to_raw(), "frame load started");
        } else {
            doc.add_class(node, CLASS_LOADED);
            tracing::debug!(node = node.to_raw(), "deferred block revealed");
        }
        if let Some(observer) = self.content_observer.as_mut() {
            observer.unobserve(node);
        }
    }

    /// Deliver the resource's terminal signal (image decode, frame
    /// load). Swaps `lazy-loading` for `lazy-loaded` or `lazy-error`.
    /// Untracked or already-terminal elements are ignored; failures are
    /// never retried.
    pub fn resolve_load(&mut self, doc: &mut Document, node: NodeId, outcome: LoadOutcome) {
        if self.destroyed {
            return;
        }
        if !self.images.contains(node) && !self.content.contains(node) {
            return;
        }
        if !doc.has_class(node, CLASS_LOADING) {
            return;
        }
        doc.remove_class(node, CLASS_LOADING);
        match outcome {
            LoadOutcome::Loaded => doc.add_class(node, CLASS_LOADED),
            LoadOutcome::Error => doc.add_class(node, CLASS_ERROR),
        }
        tracing::debug!(node = node.to_raw(), ?outcome, "load resolved");
    }

    /// Push current geometry into both observers. A no-op in fallback
    /// mode and after destroy.
    pub fn update_viewport(&mut self, viewport: Rect, rects: &HashMap<NodeId, Rect>) {
        if self.destroyed {
            return;
        }
        if let Some(observer) = self.image_observer.as_mut() {
            observer.update(viewport, rects);
        }
        if let Some(observer) = self.content_observer.as_mut() {
            observer.update(viewport, rects);
        }
    }

    /// Drain observer entries and mutation records, starting loads for
    /// every intersecting report and registering newly inserted
    /// candidates.
    ///
    /// An element may be reported more than once before its load runs;
    /// the tracked sets absorb the duplicates.
    pub fn pump(&mut self, doc: &mut Document) {
        if self.destroyed {
            return;
        }

        let entries = self
            .image_observer
            .as_mut()
            .map(|o| o.take_entries())
            .unwrap_or_default();
        for entry in entries {
            if entry.is_intersecting && entry.ratio > 0.0 {
                self.load_image(doc, entry.target);
            }
        }

        let entries = self
            .content_observer
            .as_mut()
            .map(|o| o.take_entries())
            .unwrap_or_default();
        for entry in entries {
            if entry.is_intersecting && entry.ratio > 0.0 {
                self.load_content(doc, entry.target);
            }
        }

        if let Some(id) = self.mutation_observer {
            let records = doc
                .mutations_mut()
                .get(id)
                .map(|o| o.take_records())
                .unwrap_or_default();
            for record in records {
                for added in record.added {
                    self.register(doc, added);
                    let descendants: Vec<NodeId> = doc.tree().descendants(added).collect();
                    for node in descendants {
                        self.register(doc, node);
                    }
                }
            }
        }
    }

    /// Tear down: disconnect both observers and the mutation
    /// subscription, clear both tracked sets, and go inert. Safe to
    /// call in fallback mode (where no observers exist) and safe to
    /// call twice.
    pub fn destroy(&mut self, doc: &mut Document) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(observer) = self.image_observer.as_mut() {
            observer.disconnect();
        }
        if let Some(observer) = self.content_observer.as_mut() {
            observer.disconnect();
        }
        self.image_observer = None;
        self.content_observer = None;
        if let Some(id) = self.mutation_observer.take() {
            doc.mutations_mut().remove(id);
        }
        self.images.clear();
        self.content.clear();
        tracing::info!("lazy loader destroyed");
    }

    /// Initial candidate scan over the whole document
    fn scan(&mut self, doc: &mut Document) {
        let candidates: Vec<NodeId> = doc.elements().collect();
        for node in candidates {
            self.register(doc, node);
        }
    }

    /// Register one candidate: observe it, or load it immediately in
    /// fallback mode. Image candidates win when both selectors match.
    fn register(&mut self, doc: &mut Document, node: NodeId) {
        if doc.matches(node, &self.image_selector) {
            if self.images.contains(node) {
                return;
            }
            if !self.is_supported {
                self.load_image(doc, node);
                return;
            }
            if let Some(observer) = self.image_observer.as_mut() {
                observer.observe(node);
            }
        } else if doc.matches(node, &self.content_selector) {
            if self.content.contains(node) {
                return;
            }
            if !self.is_supported {
                self.load_content(doc, node);
                return;
            }
            if let Some(observer) = self.content_observer.as_mut() {
                observer.observe(node);
            }
        }
    }
}

fn parse_selector(input: &str, which: &str, fallback: impl FnOnce() -> Selector) -> Selector {
    match Selector::parse(input) {
        Ok(selector) => selector,
        Err(err) => {
            tracing::warn!(%err, selector = input, which, "invalid selector, using default");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::UnsupportedCapability;

    fn doc_with_deferred_img(src: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let img = doc.create_element("img");
        doc.set_attr(img, ATTR_DEFERRED_SRC, src);
        let root = doc.root();
        doc.append_child(root, img);
        (doc, img)
    }

    #[test]
    fn test_fallback_loads_on_construction() {
        let (mut doc, img) = doc_with_deferred_img("test.jpg");
        let mut capability = UnsupportedCapability;
        let loader = LazyLoader::new(&mut doc, LazyConfig::default(), &mut capability);

        assert!(!loader.is_supported());
        assert_eq!(loader.tracked_images(), 1);
        assert_eq!(doc.attr(img, "src"), Some("test.jpg"));
        assert!(!doc.has_attr(img, ATTR_DEFERRED_SRC));
        assert!(doc.has_class(img, CLASS_LOADING));
    }

    #[test]
    fn test_observed_mode_defers() {
        let (mut doc, img) = doc_with_deferred_img("test.jpg");
        let loader = LazyLoader::with_defaults(&mut doc);

        assert!(loader.is_supported());
        assert_eq!(loader.tracked_images(), 0);
        assert_eq!(doc.attr(img, "src"), None);
        assert!(doc.has_attr(img, ATTR_DEFERRED_SRC));
    }

    #[test]
    fn test_load_image_idempotent() {
        let (mut doc, img) = doc_with_deferred_img("test.jpg");
        let mut loader = LazyLoader::with_defaults(&mut doc);

        loader.load_image(&mut doc, img);
        // Second call sees the claim and does nothing
        doc.set_attr(img, ATTR_DEFERRED_SRC, "other.jpg");
        loader.load_image(&mut doc, img);

        assert_eq!(loader.tracked_images(), 1);
        assert_eq!(doc.attr(img, "src"), Some("test.jpg"));
        assert_eq!(doc.attr(img, ATTR_DEFERRED_SRC), Some("other.jpg"));
    }

    #[test]
    fn test_srcset_copied_when_present() {
        let (mut doc, img) = doc_with_deferred_img("test.jpg");
        doc.set_attr(img, ATTR_DEFERRED_SRCSET, "test.jpg 1x, test@2x.jpg 2x");
        let mut loader = LazyLoader::with_defaults(&mut doc);

        loader.load_image(&mut doc, img);
        assert_eq!(doc.attr(img, "srcset"), Some("test.jpg 1x, test@2x.jpg 2x"));
        assert!(!doc.has_attr(img, ATTR_DEFERRED_SRCSET));
    }

    #[test]
    fn test_image_without_deferred_source_not_claimed() {
        let mut doc = Document::new();
        let img = doc.create_element("img");
        let root = doc.root();
        doc.append_child(root, img);
        let mut loader = LazyLoader::with_defaults(&mut doc);

        loader.load_image(&mut doc, img);
        assert!(!doc.has_class(img, CLASS_LOADING));
        assert_eq!(loader.tracked_images(), 0);
    }

    #[test]
    fn test_srcset_only_image_is_a_candidate() {
        let mut doc = Document::new();
        let img = doc.create_element("img");
        doc.set_attr(img, ATTR_DEFERRED_SRCSET, "test.jpg 1x");
        let root = doc.root();
        doc.append_child(root, img);
        let mut loader = LazyLoader::with_defaults(&mut doc);

        loader.load_image(&mut doc, img);
        assert!(doc.has_class(img, CLASS_LOADING));
        assert_eq!(doc.attr(img, "srcset"), Some("test.jpg 1x"));
        assert_eq!(doc.attr(img, "src"), None);
        assert_eq!(loader.tracked_images(), 1);
    }

    #[test]
    fn test_generic_block_completes_immediately() {
        let mut doc = Document::new();
        let block = doc.create_element("div");
        doc.set_attr(block, ATTR_DEFERRED_MARKER, "chart");
        let root = doc.root();
        doc.append_child(root, block);
        let mut loader = LazyLoader::with_defaults(&mut doc);

        loader.load_content(&mut doc, block);
        assert!(doc.has_class(block, CLASS_LOADED));
        assert!(!doc.has_class(block, CLASS_LOADING));
        assert_eq!(loader.tracked_content(), 1);
    }

    #[test]
    fn test_iframe_waits_for_signal() {
        let mut doc = Document::new();
        let frame = doc.create_element("iframe");
        doc.set_attr(frame, ATTR_DEFERRED_SRC, "https://example.com/embed");
        let root = doc.root();
        doc.append_child(root, frame);
        let mut loader = LazyLoader::with_defaults(&mut doc);

        loader.load_content(&mut doc, frame);
        assert_eq!(doc.attr(frame, "src"), Some("https://example.com/embed"));
        assert!(doc.has_class(frame, CLASS_LOADING));

        loader.resolve_load(&mut doc, frame, LoadOutcome::Error);
        assert!(doc.has_class(frame, CLASS_ERROR));
        assert!(!doc.has_class(frame, CLASS_LOADING));
    }

    #[test]
    fn test_resolve_ignores_untracked() {
        let (mut doc, img) = doc_with_deferred_img("test.jpg");
        let mut loader = LazyLoader::with_defaults(&mut doc);

        loader.resolve_load(&mut doc, img, LoadOutcome::Loaded);
        assert!(!doc.has_class(img, CLASS_LOADED));
    }

    #[test]
    fn test_resolve_never_reverts_terminal_state() {
        let (mut doc, img) = doc_with_deferred_img("test.jpg");
        let mut loader = LazyLoader::with_defaults(&mut doc);

        loader.load_image(&mut doc, img);
        loader.resolve_load(&mut doc, img, LoadOutcome::Loaded);
        loader.resolve_load(&mut doc, img, LoadOutcome::Error);

        assert!(doc.has_class(img, CLASS_LOADED));
        assert!(!doc.has_class(img, CLASS_ERROR));
    }

    #[test]
    fn test_invalid_overrides_degrade_to_defaults() {
        let (mut doc, img) = doc_with_deferred_img("test.jpg");
        let config = LazyConfig {
            root_margin: "plenty".to_string(),
            threshold: f32::NAN,
            image_selector: "img[data-src".to_string(),
            ..LazyConfig::default()
        };
        let mut capability = UnsupportedCapability;
        let loader = LazyLoader::new(&mut doc, config, &mut capability);

        // Default image selector still finds the candidate
        assert_eq!(loader.tracked_images(), 1);
        assert_eq!(doc.attr(img, "src"), Some("test.jpg"));
    }
}
