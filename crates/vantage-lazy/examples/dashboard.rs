//! Minimal dashboard wiring for the lazy loader.
//!
//! Builds a column of deferred chart images plus a deferred legend
//! block, scrolls the viewport down in steps, and prints the state
//! each element ends up in. Run with RUST_LOG=debug to watch the
//! observer traffic.

use std::collections::HashMap;
use tracing_subscriber::EnvFilter;
use vantage_dom::Document;
use vantage_lazy::{
    ATTR_DEFERRED_MARKER, ATTR_DEFERRED_SRC, CLASS_LOADING, LazyLoader, LoadOutcome, Rect,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut doc = Document::new();
    let mut rects = HashMap::new();
    let root = doc.root();

    let mut panels = Vec::new();
    for i in 0..5 {
        let img = doc.create_element("img");
        doc.set_attr(img, ATTR_DEFERRED_SRC, &format!("charts/vol-surface-{i}.png"));
        doc.append_child(root, img);
        rects.insert(img, Rect::new(0.0, 700.0 * i as f32, 640.0, 480.0));
        panels.push(img);
    }
    let legend = doc.create_element("div");
    doc.set_attr(legend, ATTR_DEFERRED_MARKER, "legend");
    doc.append_child(root, legend);
    rects.insert(legend, Rect::new(0.0, 3500.0, 640.0, 200.0));
    panels.push(legend);

    let mut loader = LazyLoader::with_defaults(&mut doc);

    // Scroll down one viewport at a time, resolving whatever started
    for step in 0..7 {
        let viewport = Rect::new(0.0, 600.0 * step as f32, 800.0, 600.0);
        loader.update_viewport(viewport, &rects);
        loader.pump(&mut doc);
        for &panel in &panels {
            if doc.has_class(panel, CLASS_LOADING) {
                loader.resolve_load(&mut doc, panel, LoadOutcome::Loaded);
            }
        }
    }

    for &panel in &panels {
        let classes: Vec<&str> = doc
            .tree()
            .element(panel)
            .map(|e| e.classes().collect())
            .unwrap_or_default();
        println!(
            "{:>3}  src={:<28}  classes={:?}",
            panel.to_raw(),
            doc.attr(panel, "src").unwrap_or("-"),
            classes
        );
    }
    println!(
        "tracked: {} images, {} content",
        loader.tracked_images(),
        loader.tracked_content()
    );
}
