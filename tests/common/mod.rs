//! Shared builders for engine and host tests.
#![allow(dead_code)]

use unveil::engine::{EngineOptions, VisibilityEngine};
use unveil::page::{Document, NodeId, Rect};

pub fn new_page() -> Document {
    Document::new(1280.0, 720.0)
}

pub fn engine(doc: Document) -> VisibilityEngine {
    VisibilityEngine::new(doc, EngineOptions::default())
}

/// A visible block element with text and a sensible natural size.
pub fn block(doc: &mut Document, parent: NodeId, tag: &str, text: &str) -> NodeId {
    let el = doc.create_element(tag);
    doc.append_child(parent, el);
    doc.set_bounds(el, Rect::new(0.0, 0.0, 300.0, 100.0));
    doc.set_text(el, text);
    el
}

/// A block hidden with inline `display: none`.
pub fn hidden_block(doc: &mut Document, parent: NodeId, text: &str) -> NodeId {
    let el = block(doc, parent, "div", text);
    doc.set_style(el, "display", "none");
    el
}

/// A block that stays zero-sized no matter what the strategies try:
/// stylesheet width/height 0 without `overflow: hidden`, so nothing in the
/// reveal ladder fixes it and verification keeps failing.
pub fn unrevealable_block(doc: &mut Document, parent: NodeId, text: &str) -> NodeId {
    let el = block(doc, parent, "div", text);
    doc.set_base_style(el, "width", "0px");
    doc.set_base_style(el, "height", "0px");
    el
}
