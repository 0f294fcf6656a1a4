//! Hidden-element detection.
//!
//! A scan walks every element in the document, keeps those judged both
//! hidden (any one of the CSS/layout heuristics) and meaningful (content,
//! interactivity, or structure worth reporting), then dedups containment so
//! a hidden container is reported once rather than once per hidden child.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::page::{
    clip_path_collapsed, has_zero_scale, parse_px, Document, NodeId, PropertyMap, Rect,
    StyleInspector,
};

use super::EngineOptions;

/// Tags that never carry user-visible content.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "meta", "link", "title", "head", "noscript",
];

/// Class/id fragments that mark tracking or analytics machinery.
const TRACKING_PATTERNS: &[&str] = &["track", "analytic", "pixel", "beacon", "gtm", "ga-"];

const IMAGE_TAGS: &[&str] = &["img", "svg", "canvas"];
const FORM_TAGS: &[&str] = &["input", "select", "textarea", "button"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Navigation,
    Forms,
    Content,
    Controls,
    Modals,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Navigation => "navigation",
            Category::Forms => "forms",
            Category::Content => "content",
            Category::Controls => "controls",
            Category::Modals => "modals",
            Category::Other => "other",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interactivity {
    pub buttons: usize,
    pub inputs: usize,
    pub links: usize,
    pub clickable: usize,
}

/// One finding of a scan generation. The node reference stays internal;
/// everything else is derived descriptive metadata, computed at discovery
/// time and not kept live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredElement {
    pub id: String,
    #[serde(skip)]
    pub node: NodeId,
    pub category: Category,
    pub preview: String,
    pub selector: String,
    pub hiding_method: String,
    pub size: ElementSize,
    pub interactivity: Interactivity,
}

/// Any one matching heuristic classifies the element as hidden.
pub fn is_hidden(doc: &Document, node: NodeId, opts: &EngineOptions) -> bool {
    if !doc.is_connected(node) {
        return false;
    }
    let style = doc.computed_style(node);
    let rect = doc.bounding_box(node);
    hidden_by_style(&style, rect, doc.viewport(), opts)
}

/// The visibility predicate over plain style/layout data.
pub fn hidden_by_style(
    style: &PropertyMap,
    rect: Rect,
    viewport: (f64, f64),
    opts: &EngineOptions,
) -> bool {
    let get = |prop: &str| style.get(prop).map(|v| v.as_str()).unwrap_or("");

    if get("display") == "none" {
        return true;
    }
    if get("visibility") == "hidden" {
        return true;
    }
    if parse_px(get("opacity")) == Some(0.0) {
        return true;
    }
    if rect.width == 0.0 && rect.height == 0.0 {
        return true;
    }
    if get("position") == "absolute" {
        let offscreen = |v: &str| parse_px(v).is_some_and(|px| px < opts.offscreen_threshold);
        if offscreen(get("left")) || offscreen(get("top")) {
            return true;
        }
    }
    // Parked entirely outside the viewport in the negative direction.
    let (vw, vh) = viewport;
    if rect.x < -vw || rect.y < -vh {
        return true;
    }
    if clip_path_collapsed(get("clip-path")) {
        return true;
    }
    if has_zero_scale(get("transform")) {
        return true;
    }
    if get("overflow") == "hidden" {
        let zero = |v: &str| parse_px(v) == Some(0.0);
        if zero(get("height")) || zero(get("width")) {
            return true;
        }
    }

    false
}

/// Content/size/interactivity filter. Size checks read the captured
/// natural box, not the collapsed live box: a `display: none` element
/// measures 0x0 live, which would otherwise disqualify every such finding.
pub fn is_meaningful(doc: &Document, node: NodeId, opts: &EngineOptions) -> bool {
    let tag = doc.tag(node);
    if SKIP_TAGS.contains(&tag) {
        return false;
    }

    let class_attr = doc.class_attr(node).to_ascii_lowercase();
    let id_attr = doc.id_attr(node).to_ascii_lowercase();
    if TRACKING_PATTERNS
        .iter()
        .any(|p| class_attr.contains(p) || id_attr.contains(p))
    {
        return false;
    }

    let natural = doc.bounds(node);
    let interactive = interactive_descendants(doc, node) > 0;
    if natural.width < opts.tiny_size && natural.height < opts.tiny_size && !interactive {
        return false;
    }

    let has_text = !doc.text_content(node).trim().is_empty();
    let has_images = doc
        .descendants(node)
        .iter()
        .any(|d| IMAGE_TAGS.contains(&doc.tag(*d)));
    let has_structure = !doc.children(node).is_empty();
    let has_form_elements = doc
        .descendants(node)
        .iter()
        .any(|d| FORM_TAGS.contains(&doc.tag(*d)));

    has_text || interactive || has_images || has_structure || has_form_elements
}

/// Containment dedup over the surviving candidates: an ancestor absorbs its
/// hidden descendants, and empty undersized leftovers are dropped.
pub fn dedup_candidates(doc: &Document, candidates: &[NodeId], opts: &EngineOptions) -> Vec<NodeId> {
    candidates
        .iter()
        .copied()
        .filter(|node| {
            let natural = doc.bounds(*node);
            if natural.width < opts.small_size && natural.height < opts.small_size {
                return false;
            }
            if doc.text_content(*node).trim().is_empty() && doc.children(*node).is_empty() {
                return false;
            }
            !candidates
                .iter()
                .any(|other| *other != *node && doc.contains(*other, *node))
        })
        .collect()
}

fn count_descendants(doc: &Document, node: NodeId, pred: impl Fn(NodeId) -> bool) -> usize {
    doc.descendants(node).into_iter().filter(|d| pred(*d)).count()
}

pub fn interactive_descendants(doc: &Document, node: NodeId) -> usize {
    count_descendants(doc, node, |d| {
        matches!(
            doc.tag(d),
            "button" | "input" | "select" | "textarea" | "a"
        ) || doc.has_attr(d, "onclick")
            || doc.has_attr(d, "data-toggle")
            || doc.attr(d, "role") == Some("button")
    })
}

/// Fixed-priority decision list; first match wins.
pub fn categorize(doc: &Document, node: NodeId) -> Category {
    let text = doc.text_content(node).to_ascii_lowercase();
    let classes = doc.class_attr(node).to_ascii_lowercase();
    let tag = doc.tag(node);

    let has_descendant_tag = |tags: &[&str]| {
        doc.descendants(node)
            .iter()
            .any(|d| tags.contains(&doc.tag(*d)))
    };

    if classes.contains("nav")
        || classes.contains("menu")
        || text.contains("navigation")
        || text.contains("menu")
    {
        return Category::Navigation;
    }

    if tag == "form"
        || has_descendant_tag(&["input", "select", "textarea"])
        || classes.contains("form")
        || text.contains("search")
    {
        return Category::Forms;
    }

    if classes.contains("content")
        || classes.contains("article")
        || tag == "article"
        || tag == "section"
    {
        return Category::Content;
    }

    if has_descendant_tag(&["button"])
        || classes.contains("controls")
        || classes.contains("settings")
        || text.contains("settings")
    {
        return Category::Controls;
    }

    if classes.contains("modal")
        || classes.contains("popup")
        || classes.contains("overlay")
        || classes.contains("dialog")
    {
        return Category::Modals;
    }

    Category::Other
}

/// Display string: truncated text, or a summary of what the element holds.
pub fn preview(doc: &Document, node: NodeId) -> String {
    let text = doc.text_content(node);
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        if trimmed.chars().count() > 100 {
            let cut: String = trimmed.chars().take(97).collect();
            return format!("{}...", cut);
        }
        return trimmed.to_string();
    }

    let interactive = count_descendants(doc, node, |d| {
        matches!(doc.tag(d), "button" | "input" | "a")
    });
    let images = count_descendants(doc, node, |d| matches!(doc.tag(d), "img" | "svg"));

    if interactive > 0 && images > 0 {
        format!("{} interactive elements, {} images", interactive, images)
    } else if interactive > 0 {
        format!("{} interactive elements", interactive)
    } else if images > 0 {
        format!("{} images", images)
    } else {
        format!("{} element", doc.tag(node).to_ascii_uppercase())
    }
}

pub fn selector(doc: &Document, node: NodeId) -> String {
    let id = doc.id_attr(node);
    if !id.is_empty() {
        return format!("#{}", id);
    }
    if let Some(first) = doc.class_attr(node).split_whitespace().next() {
        return format!(".{}", first);
    }
    doc.tag(node).to_string()
}

/// Which hiding techniques are in play, as a display string.
pub fn analyze_hiding_method(doc: &Document, node: NodeId, opts: &EngineOptions) -> String {
    let style = doc.computed_style(node);
    let get = |prop: &str| style.get(prop).map(|v| v.as_str()).unwrap_or("");
    let mut methods = Vec::new();

    if get("display") == "none" {
        methods.push("display:none");
    }
    if get("visibility") == "hidden" {
        methods.push("visibility:hidden");
    }
    if parse_px(get("opacity")) == Some(0.0) {
        methods.push("opacity:0");
    }
    if get("position") == "absolute"
        && parse_px(get("left")).is_some_and(|px| px < opts.offscreen_threshold)
    {
        methods.push("position:absolute");
    }
    if parse_px(get("height")) == Some(0.0) {
        methods.push("height:0");
    }
    if get("clip-path") != "none" && !get("clip-path").is_empty() {
        methods.push("clip-path");
    }

    if methods.is_empty() {
        "unknown".to_string()
    } else {
        methods.join(", ")
    }
}

pub fn element_size(doc: &Document, node: NodeId) -> ElementSize {
    let natural = doc.bounds(node);
    ElementSize {
        width: natural.width,
        height: natural.height,
    }
}

pub fn assess_interactivity(doc: &Document, node: NodeId) -> Interactivity {
    Interactivity {
        buttons: count_descendants(doc, node, |d| doc.tag(d) == "button"),
        inputs: count_descendants(doc, node, |d| {
            matches!(doc.tag(d), "input" | "select" | "textarea")
        }),
        links: count_descendants(doc, node, |d| doc.tag(d) == "a"),
        clickable: count_descendants(doc, node, |d| {
            doc.has_attr(d, "onclick") || doc.has_attr(d, "data-toggle")
        }),
    }
}
