//! Computed-style and layout queries over the page model.
//!
//! The detector and the reveal engine only ever ask two questions of a
//! page: "what is this node's computed style" and "what box does it
//! occupy". Both are behind `StyleInspector` so the heuristics can be
//! exercised against hand-built documents in tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::document::{Document, NodeId};

pub type PropertyMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Style/layout capability the engine depends on.
pub trait StyleInspector {
    fn computed_style(&self, node: NodeId) -> PropertyMap;
    fn bounding_box(&self, node: NodeId) -> Rect;
}

/// UA-default display per tag. Head/metadata tags compute to `none`, the
/// common block containers to `block`, everything else to `inline`.
pub fn default_display(tag: &str) -> &'static str {
    match tag {
        "script" | "style" | "meta" | "link" | "title" | "head" | "noscript" | "template" => {
            "none"
        }
        "html" | "body" | "div" | "p" | "section" | "article" | "header" | "footer" | "nav"
        | "aside" | "form" | "ul" | "ol" | "li" | "main" | "fieldset" | "h1" | "h2" | "h3"
        | "h4" | "h5" | "h6" | "table" | "blockquote" | "pre" | "figure" => "block",
        _ => "inline",
    }
}

/// Parse a `<length>` that is either a bare number or a `px` value.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.trim().parse::<f64>().ok()
}

/// True if a transform value collapses the element on some axis.
pub fn has_zero_scale(transform: &str) -> bool {
    let t = transform.to_ascii_lowercase();
    t.contains("scale(0)") || t.contains("scalex(0)") || t.contains("scaley(0)")
}

/// True if a clip-path value clips the element down to nothing.
pub fn clip_path_collapsed(clip_path: &str) -> bool {
    let c = clip_path.to_ascii_lowercase();
    c.contains("inset(100%)") || c.contains("polygon(0 0, 0 0, 0 0)")
}

impl StyleInspector for Document {
    /// Resolve the cascade for one node: UA defaults, then class rules in
    /// document order, then element-specific stylesheet declarations, then
    /// inline style.
    fn computed_style(&self, node: NodeId) -> PropertyMap {
        let mut style = PropertyMap::new();
        style.insert("display".into(), default_display(self.tag(node)).into());
        style.insert("visibility".into(), "visible".into());
        style.insert("opacity".into(), "1".into());
        style.insert("position".into(), "static".into());
        style.insert("left".into(), "auto".into());
        style.insert("top".into(), "auto".into());
        style.insert("width".into(), "auto".into());
        style.insert("height".into(), "auto".into());
        style.insert("overflow".into(), "visible".into());
        style.insert("clip-path".into(), "none".into());
        style.insert("transform".into(), "none".into());

        for rule in self.class_rules() {
            if self.has_class(node, &rule.class) {
                for (prop, value) in &rule.declarations {
                    style.insert(prop.clone(), value.clone());
                }
            }
        }

        for (prop, value) in self.base_style(node) {
            style.insert(prop.clone(), value.clone());
        }

        for (prop, value) in self.inline(node).iter() {
            style.insert(prop.to_string(), value.to_string());
        }

        style
    }

    /// Layout box: the captured bounds, overridden by any pixel-valued
    /// width/height/left/top the cascade produces. `display: none` (on the
    /// node or any ancestor) and zero-scale transforms collapse the box.
    fn bounding_box(&self, node: NodeId) -> Rect {
        if !self.is_connected(node) {
            return Rect::ZERO;
        }

        let style = self.computed_style(node);
        if style.get("display").map(|d| d.as_str()) == Some("none") {
            return Rect::ZERO;
        }

        let mut ancestor = self.parent(node);
        while let Some(id) = ancestor {
            let display = self.computed_style(id);
            if display.get("display").map(|d| d.as_str()) == Some("none") {
                return Rect::ZERO;
            }
            ancestor = self.parent(id);
        }

        let mut rect = self.bounds(node);

        if style.get("position").map(|p| p.as_str()) == Some("absolute") {
            if let Some(left) = style.get("left").and_then(|v| parse_px(v)) {
                rect.x = left;
            }
            if let Some(top) = style.get("top").and_then(|v| parse_px(v)) {
                rect.y = top;
            }
        }

        if let Some(width) = style.get("width").and_then(|v| parse_px(v)) {
            rect.width = width;
        }
        if let Some(height) = style.get("height").and_then(|v| parse_px(v)) {
            rect.height = height;
        }

        if style.get("transform").is_some_and(|t| has_zero_scale(t)) {
            rect.width = 0.0;
            rect.height = 0.0;
        }

        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_element(tag: &str) -> (Document, NodeId) {
        let mut doc = Document::new(1280.0, 720.0);
        let el = doc.create_element(tag);
        doc.append_child(doc.body(), el);
        (doc, el)
    }

    #[test]
    fn cascade_precedence_inline_wins() {
        let (mut doc, el) = doc_with_element("div");
        let mut decls = PropertyMap::new();
        decls.insert("display".into(), "none".into());
        doc.add_class_rule("hidden", decls);
        doc.set_class_attr(el, "hidden");

        assert_eq!(doc.computed_style(el).get("display").unwrap(), "none");

        doc.set_base_style(el, "display", "flex");
        assert_eq!(doc.computed_style(el).get("display").unwrap(), "flex");

        doc.set_style(el, "display", "block");
        assert_eq!(doc.computed_style(el).get("display").unwrap(), "block");
    }

    #[test]
    fn metadata_tags_default_to_display_none() {
        let mut doc = Document::new(1280.0, 720.0);
        let script = doc.create_element("script");
        doc.append_child(doc.body(), script);
        assert_eq!(
            doc.computed_style(script).get("display").unwrap(),
            "none"
        );
    }

    #[test]
    fn display_none_collapses_bounding_box() {
        let (mut doc, el) = doc_with_element("div");
        doc.set_bounds(el, Rect::new(10.0, 10.0, 200.0, 50.0));
        doc.set_style(el, "display", "none");
        assert_eq!(doc.bounding_box(el), Rect::ZERO);
    }

    #[test]
    fn absolute_position_overrides_box_origin() {
        let (mut doc, el) = doc_with_element("div");
        doc.set_bounds(el, Rect::new(10.0, 10.0, 200.0, 50.0));
        doc.set_style(el, "position", "absolute");
        doc.set_style(el, "left", "-9999px");
        let rect = doc.bounding_box(el);
        assert_eq!(rect.x, -9999.0);
        assert_eq!(rect.width, 200.0);
    }

    #[test]
    fn zero_scale_transform_collapses_size() {
        let (mut doc, el) = doc_with_element("div");
        doc.set_bounds(el, Rect::new(0.0, 0.0, 100.0, 100.0));
        doc.set_style(el, "transform", "scaleX(0)");
        let rect = doc.bounding_box(el);
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 0.0);
    }

    #[test]
    fn px_parsing() {
        assert_eq!(parse_px("-9999px"), Some(-9999.0));
        assert_eq!(parse_px(" 12 "), Some(12.0));
        assert_eq!(parse_px("auto"), None);
    }
}
