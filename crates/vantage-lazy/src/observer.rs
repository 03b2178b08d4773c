//! Viewport Observers
//!
//! Reports when observed elements cross the visibility threshold. The
//! `ViewportObserver` trait is the seam the loader registers elements
//! through; `GeometryObserver` is the production implementation, driven
//! by viewport and element geometry pushed in by the host each frame.

use std::collections::HashMap;
use vantage_dom::NodeId;

/// Axis-aligned rectangle in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Intersection with another rect, if any
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Grow by a margin on every side (negative margins shrink)
    pub fn expand(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }
}

/// One visibility report for an observed element
#[derive(Debug, Clone)]
pub struct IntersectionEntry {
    pub target: NodeId,
    /// Fraction of the element inside the (margin-expanded) viewport
    pub ratio: f32,
    /// Whether any part of the element is inside it
    pub is_intersecting: bool,
}

/// Element visibility subscription.
///
/// Implementations queue entries and surface them through
/// `take_entries`; observing an already-observed target is a no-op, so
/// a single element is never registered twice.
pub trait ViewportObserver {
    /// Start watching an element
    fn observe(&mut self, target: NodeId);

    /// Stop watching an element
    fn unobserve(&mut self, target: NodeId);

    /// Stop watching everything and drop queued entries
    fn disconnect(&mut self);

    /// Feed current geometry: the viewport and each element's bounds
    fn update(&mut self, viewport: Rect, rects: &HashMap<NodeId, Rect>);

    /// Take queued visibility reports
    fn take_entries(&mut self) -> Vec<IntersectionEntry>;
}

/// Geometry-driven observer.
///
/// Queues an entry the first time a target's geometry is seen and on
/// every threshold crossing after that. Targets with no known geometry
/// stay silent until the host supplies their bounds.
#[derive(Debug)]
pub struct GeometryObserver {
    margin: f32,
    threshold: f32,
    observed: HashMap<NodeId, Option<f32>>, // last reported ratio
    pending: Vec<IntersectionEntry>,
}

impl GeometryObserver {
    pub fn new(margin: f32, threshold: f32) -> Self {
        Self {
            margin,
            threshold,
            observed: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Number of currently watched elements
    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }
}

impl ViewportObserver for GeometryObserver {
    fn observe(&mut self, target: NodeId) {
        // entry() keeps the last ratio if the target is already watched
        self.observed.entry(target).or_insert(None);
        tracing::debug!(target = target.to_raw(), "observe");
    }

    fn unobserve(&mut self, target: NodeId) {
        self.observed.remove(&target);
        tracing::debug!(target = target.to_raw(), "unobserve");
    }

    fn disconnect(&mut self) {
        self.observed.clear();
        self.pending.clear();
    }

    fn update(&mut self, viewport: Rect, rects: &HashMap<NodeId, Rect>) {
        let expanded = viewport.expand(self.margin);

        for (target, last_ratio) in &mut self.observed {
            let Some(rect) = rects.get(target) else {
                continue;
            };
            let denom = rect.area();
            let ratio = if denom > 0.0 {
                expanded
                    .intersect(rect)
                    .map(|i| i.area() / denom)
                    .unwrap_or(0.0)
            } else {
                0.0
            };

            let crossed = match *last_ratio {
                Some(last) => {
                    (last < self.threshold && ratio >= self.threshold)
                        || (last >= self.threshold && ratio < self.threshold)
                }
                None => true,
            };

            if crossed {
                *last_ratio = Some(ratio);
                self.pending.push(IntersectionEntry {
                    target: *target,
                    ratio,
                    is_intersecting: ratio > 0.0,
                });
            }
        }
    }

    fn take_entries(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rects_for(target: NodeId, rect: Rect) -> HashMap<NodeId, Rect> {
        let mut rects = HashMap::new();
        rects.insert(target, rect);
        rects
    }

    #[test]
    fn test_rect_intersect() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let inside = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert_eq!(viewport.intersect(&inside), Some(inside));

        let outside = Rect::new(900.0, 700.0, 50.0, 50.0);
        assert_eq!(viewport.intersect(&outside), None);

        let half = Rect::new(-25.0, 0.0, 50.0, 50.0);
        let overlap = viewport.intersect(&half).unwrap();
        assert_eq!(overlap.area(), 25.0 * 50.0);
    }

    #[test]
    fn test_rect_expand() {
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
        let grown = viewport.expand(50.0);
        assert_eq!(grown, Rect::new(-50.0, -50.0, 200.0, 200.0));
    }

    #[test]
    fn test_first_observation_reports() {
        let target = NodeId::from_raw(1);
        let mut observer = GeometryObserver::new(0.0, 0.01);
        observer.observe(target);

        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        observer.update(viewport, &rects_for(target, Rect::new(0.0, 0.0, 100.0, 100.0)));

        let entries = observer.take_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intersecting);
        assert_eq!(entries[0].ratio, 1.0);
    }

    #[test]
    fn test_threshold_crossing() {
        let target = NodeId::from_raw(1);
        let mut observer = GeometryObserver::new(0.0, 0.01);
        observer.observe(target);
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);

        // Starts offscreen: first report is non-intersecting
        observer.update(viewport, &rects_for(target, Rect::new(0.0, 1000.0, 100.0, 100.0)));
        let entries = observer.take_entries();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_intersecting);

        // Still offscreen: no new report
        observer.update(viewport, &rects_for(target, Rect::new(0.0, 900.0, 100.0, 100.0)));
        assert!(observer.take_entries().is_empty());

        // Scrolled into view: crossing reported
        observer.update(viewport, &rects_for(target, Rect::new(0.0, 550.0, 100.0, 100.0)));
        let entries = observer.take_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intersecting);
    }

    #[test]
    fn test_margin_pretriggers() {
        let target = NodeId::from_raw(1);
        let mut observer = GeometryObserver::new(50.0, 0.01);
        observer.observe(target);

        // 40px below the fold but inside the 50px margin
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        observer.update(viewport, &rects_for(target, Rect::new(0.0, 640.0, 100.0, 100.0)));

        let entries = observer.take_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intersecting);
    }

    #[test]
    fn test_unobserve_stops_reports() {
        let target = NodeId::from_raw(1);
        let mut observer = GeometryObserver::new(0.0, 0.01);
        observer.observe(target);
        observer.unobserve(target);
        assert_eq!(observer.observed_count(), 0);

        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        observer.update(viewport, &rects_for(target, Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(observer.take_entries().is_empty());
    }

    #[test]
    fn test_observe_twice_keeps_state() {
        let target = NodeId::from_raw(1);
        let mut observer = GeometryObserver::new(0.0, 0.01);
        observer.observe(target);

        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let rects = rects_for(target, Rect::new(0.0, 0.0, 100.0, 100.0));
        observer.update(viewport, &rects);
        assert_eq!(observer.take_entries().len(), 1);

        // Duplicate registration must not reset the last ratio
        observer.observe(target);
        observer.update(viewport, &rects);
        assert!(observer.take_entries().is_empty());
        assert_eq!(observer.observed_count(), 1);
    }

    #[test]
    fn test_zero_area_never_intersects() {
        let target = NodeId::from_raw(1);
        let mut observer = GeometryObserver::new(0.0, 0.01);
        observer.observe(target);

        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        observer.update(viewport, &rects_for(target, Rect::new(10.0, 10.0, 0.0, 0.0)));

        let entries = observer.take_entries();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_intersecting);
    }
}
