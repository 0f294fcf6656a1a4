//! Reveal strategies.
//!
//! Four strategies run in order until one leaves the element verified
//! visible. A strategy that changes something without passing verification
//! has the element's inline style text and class attribute rolled back
//! before the next one runs. Ancestor mutations from strategy 3 are not
//! individually rolled back; only the target element's final visibility
//! decides the outcome.

use crate::page::{has_zero_scale, parse_px, Document, NodeId, StyleInspector};

use super::detector::is_hidden;
use super::EngineOptions;

/// Classes pages commonly use to hide content.
const HIDING_CLASSES: &[&str] = &[
    "hidden",
    "hide",
    "invisible",
    "collapsed",
    "d-none",
    "sr-only",
    "visually-hidden",
    "screen-reader-only",
    "opacity-0",
    "scale-0",
];

/// Classes pages commonly use to show content. Only added when the class
/// is already in use elsewhere in the document, as a signal the page
/// defines meaningful CSS for it.
const SHOWING_CLASSES: &[&str] = &["show", "visible", "expanded", "d-block", "d-inline-block"];

const BLOCK_TAGS: &[&str] = &[
    "div", "p", "section", "article", "header", "footer", "nav", "aside",
];
const INLINE_TAGS: &[&str] = &["span", "a", "strong", "em", "code"];

/// Attributes that mark an element as a show/hide trigger for another.
const TOGGLE_ATTRS: &[&str] = &["data-target", "data-toggle", "aria-controls"];

/// Run the strategy ladder. Returns true once the element verifies
/// visible; false after exhausting all strategies (element rolled back).
pub fn apply_strategies(doc: &mut Document, node: NodeId, opts: &EngineOptions) -> bool {
    let original_style = doc.inline_css_text(node);
    let original_classes = doc.class_attr(node).to_string();

    if reveal_with_css(doc, node, opts) && visible_after_reveal(doc, node) {
        return true;
    }
    rollback(doc, node, &original_style, &original_classes);

    if reveal_with_classes(doc, node) && visible_after_reveal(doc, node) {
        return true;
    }
    rollback(doc, node, &original_style, &original_classes);

    if reveal_ancestors(doc, node, opts) && visible_after_reveal(doc, node) {
        return true;
    }
    rollback(doc, node, &original_style, &original_classes);

    if reveal_with_events(doc, node) && visible_after_reveal(doc, node) {
        return true;
    }
    rollback(doc, node, &original_style, &original_classes);

    false
}

fn rollback(doc: &mut Document, node: NodeId, style: &str, classes: &str) {
    doc.set_inline_css_text(node, style);
    doc.set_class_attr(node, classes);
}

/// Verification: the detector predicate inverted, plus a non-zero box.
pub fn visible_after_reveal(doc: &Document, node: NodeId) -> bool {
    let style = doc.computed_style(node);
    let rect = doc.bounding_box(node);
    let get = |prop: &str| style.get(prop).map(|v| v.as_str()).unwrap_or("");

    get("display") != "none"
        && get("visibility") != "hidden"
        && parse_px(get("opacity")).is_some_and(|o| o > 0.0)
        && (rect.width > 0.0 || rect.height > 0.0)
}

/// Strategy 1: override each detected hiding technique with inline CSS.
pub fn reveal_with_css(doc: &mut Document, node: NodeId, opts: &EngineOptions) -> bool {
    let style = doc.computed_style(node);
    let get = |prop: &str| style.get(prop).map(|v| v.as_str()).unwrap_or("");
    let mut changed = false;

    if get("display") == "none" {
        let tag = doc.tag(node).to_string();
        let display = if BLOCK_TAGS.contains(&tag.as_str()) {
            "block"
        } else if INLINE_TAGS.contains(&tag.as_str()) {
            "inline"
        } else {
            "block"
        };
        doc.set_style(node, "display", display);
        changed = true;
    }

    if get("visibility") == "hidden" {
        doc.set_style(node, "visibility", "visible");
        changed = true;
    }

    if parse_px(get("opacity")) == Some(0.0) {
        doc.set_style(node, "opacity", "1");
        changed = true;
    }

    if parse_px(get("height")) == Some(0.0) && get("overflow") == "hidden" {
        doc.set_style(node, "height", "auto");
        changed = true;
    }

    if parse_px(get("width")) == Some(0.0) && get("overflow") == "hidden" {
        doc.set_style(node, "width", "auto");
        changed = true;
    }

    if get("position") == "absolute" {
        let offscreen = |v: &str| parse_px(v).is_some_and(|px| px < opts.offscreen_threshold);
        if offscreen(get("left")) || offscreen(get("top")) {
            doc.set_style(node, "position", "static");
            doc.set_style(node, "left", "auto");
            doc.set_style(node, "top", "auto");
            changed = true;
        }
    }

    let clip_path = get("clip-path");
    if !clip_path.is_empty() && clip_path != "none" {
        doc.set_style(node, "clip-path", "none");
        changed = true;
    }

    let transform = get("transform");
    if transform != "none" && has_zero_scale(transform) {
        doc.set_style(node, "transform", "none");
        changed = true;
    }

    changed
}

/// Strategy 2: strip known hiding classes, add known showing classes the
/// page already uses.
pub fn reveal_with_classes(doc: &mut Document, node: NodeId) -> bool {
    let mut changed = false;

    for class in HIDING_CLASSES {
        if doc.has_class(node, class) {
            doc.remove_class(node, class);
            changed = true;
        }
    }

    for class in SHOWING_CLASSES {
        if doc.class_in_use(class) && !doc.has_class(node, class) {
            doc.add_class(node, class);
            changed = true;
        }
    }

    changed
}

/// Strategy 3: walk up to `max_ancestor_depth` ancestors (stopping at
/// body) and apply strategies 1 and 2 to any hidden one. Only the target's
/// final visibility is verified afterwards.
pub fn reveal_ancestors(doc: &mut Document, node: NodeId, opts: &EngineOptions) -> bool {
    let mut revealed = false;
    let mut current = doc.parent(node);
    let mut depth = 0;

    while let Some(parent) = current {
        if parent == doc.body() || depth >= opts.max_ancestor_depth {
            break;
        }
        if is_hidden(doc, parent, opts)
            && (reveal_with_css(doc, parent, opts) || reveal_with_classes(doc, parent))
        {
            revealed = true;
        }
        current = doc.parent(parent);
        depth += 1;
    }

    revealed
}

/// Strategy 4, last resort: dispatch the common reveal events at the
/// element, then activate any trigger whose toggle/target attribute
/// points at it.
pub fn reveal_with_events(doc: &mut Document, node: NodeId) -> bool {
    for event in ["mouseenter", "mouseover", "focus"] {
        doc.dispatch(node, event);
    }

    let triggers: Vec<(NodeId, String)> = doc
        .elements()
        .into_iter()
        .filter_map(|el| {
            TOGGLE_ATTRS
                .iter()
                .find_map(|attr| doc.attr(el, attr))
                .map(|target| (el, target.to_string()))
        })
        .collect();

    for (trigger, target) in triggers {
        if trigger == node {
            continue;
        }
        let matches = doc.matches(node, &target)
            || doc.closest(node, &target).is_some()
            || doc.id_attr(node) == target.trim_start_matches('#');
        if matches {
            doc.click(trigger);
        }
    }

    // Dispatching counts as triggered even with no listener; verification
    // decides whether anything actually became visible.
    true
}
