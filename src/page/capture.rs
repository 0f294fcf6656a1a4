//! Page capture format.
//!
//! A capture is the JSON form of a page as produced by an external
//! collector: the body subtree with per-node inline style text, the
//! element-specific stylesheet declarations that applied to each node, the
//! class rules in play, recorded layout boxes, and any declarative event
//! bindings. Loading a capture materializes a `Document`; saving one
//! serializes the (possibly mutated) document back out.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::document::{Document, EventEffect, NodeId};
use super::style::Rect;
use crate::error::{Result, UnveilError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCapture {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub viewport: ViewportCapture,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleCapture>,
    #[serde(default)]
    pub body: Vec<NodeCapture>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<BindingCapture>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportCapture {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCapture {
    pub class: String,
    pub declarations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCapture {
    pub tag: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub classes: String,
    /// Inline `style` attribute text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style: String,
    /// Element-specific stylesheet declarations (non-class selectors).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub css: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeCapture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingCapture {
    /// Selector for the element the listener is registered on.
    pub on: String,
    pub event: String,
    pub effects: Vec<EffectCapture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum EffectCapture {
    #[serde(rename_all = "camelCase")]
    AddClass { target: String, class: String },
    #[serde(rename_all = "camelCase")]
    RemoveClass { target: String, class: String },
    #[serde(rename_all = "camelCase")]
    SetStyle {
        target: String,
        prop: String,
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    ClearStyle { target: String, prop: String },
}

impl PageCapture {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| UnveilError::CaptureError(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Materialize the capture into a live document.
    pub fn to_document(&self) -> Result<Document> {
        let mut doc = Document::new(self.viewport.width, self.viewport.height);
        doc.set_title(&self.title);
        doc.set_url(&self.url);

        for rule in &self.rules {
            doc.add_class_rule(&rule.class, rule.declarations.clone());
        }

        let body = doc.body();
        for node in &self.body {
            let child = build_node(&mut doc, node);
            doc.append_child(body, child);
        }

        for binding in &self.bindings {
            let node = resolve_selector(&doc, &binding.on).ok_or_else(|| {
                UnveilError::CaptureError(format!(
                    "binding references unknown element: {}",
                    binding.on
                ))
            })?;
            let mut effects = Vec::with_capacity(binding.effects.len());
            for effect in &binding.effects {
                effects.push(resolve_effect(&doc, effect)?);
            }
            doc.add_binding(node, &binding.event, effects);
        }

        Ok(doc)
    }

    /// Serialize a document back into capture form. Event bindings are
    /// kept only for elements addressable by id.
    pub fn from_document(doc: &Document) -> Self {
        let (width, height) = doc.viewport();
        let rules = doc
            .class_rules()
            .iter()
            .map(|r| RuleCapture {
                class: r.class.clone(),
                declarations: r.declarations.clone(),
            })
            .collect();

        let body = doc
            .children(doc.body())
            .iter()
            .map(|child| dump_node(doc, *child))
            .collect();

        let mut bindings = Vec::new();
        for binding in doc.bindings() {
            match dump_binding(doc, binding) {
                Some(capture) => bindings.push(capture),
                None => tracing::warn!(
                    "dropping event binding on element without id (event: {})",
                    binding.event
                ),
            }
        }

        Self {
            title: doc.title().to_string(),
            url: doc.url().to_string(),
            viewport: ViewportCapture { width, height },
            rules,
            body,
            bindings,
        }
    }
}

fn build_node(doc: &mut Document, capture: &NodeCapture) -> NodeId {
    let node = doc.create_element(&capture.tag);
    doc.set_id_attr(node, &capture.id);
    doc.set_class_attr(node, &capture.classes);
    doc.set_inline_css_text(node, &capture.style);
    doc.set_text(node, &capture.text);
    if let Some(bounds) = capture.bounds {
        doc.set_bounds(node, bounds);
    }
    for (prop, value) in &capture.css {
        doc.set_base_style(node, prop, value);
    }
    for (name, value) in &capture.attrs {
        doc.set_attr(node, name, value);
    }
    for child in &capture.children {
        let built = build_node(doc, child);
        doc.append_child(node, built);
    }
    node
}

fn dump_node(doc: &Document, node: NodeId) -> NodeCapture {
    let bounds = doc.bounds(node);
    NodeCapture {
        tag: doc.tag(node).to_string(),
        id: doc.id_attr(node).to_string(),
        classes: doc.class_attr(node).to_string(),
        style: doc.inline_css_text(node),
        css: doc.base_style(node).clone(),
        text: doc.own_text(node).to_string(),
        bounds: (bounds != Rect::ZERO).then_some(bounds),
        attrs: doc.attrs(node).clone(),
        children: doc
            .children(node)
            .iter()
            .map(|child| dump_node(doc, *child))
            .collect(),
    }
}

fn dump_binding(
    doc: &Document,
    binding: &crate::page::document::EventBinding,
) -> Option<BindingCapture> {
    let on = id_selector(doc, binding.node)?;
    let mut effects = Vec::with_capacity(binding.effects.len());
    for effect in &binding.effects {
        effects.push(dump_effect(doc, effect)?);
    }
    Some(BindingCapture {
        on,
        event: binding.event.clone(),
        effects,
    })
}

fn dump_effect(doc: &Document, effect: &EventEffect) -> Option<EffectCapture> {
    Some(match effect {
        EventEffect::AddClass { target, class } => EffectCapture::AddClass {
            target: id_selector(doc, *target)?,
            class: class.clone(),
        },
        EventEffect::RemoveClass { target, class } => EffectCapture::RemoveClass {
            target: id_selector(doc, *target)?,
            class: class.clone(),
        },
        EventEffect::SetStyle {
            target,
            prop,
            value,
        } => EffectCapture::SetStyle {
            target: id_selector(doc, *target)?,
            prop: prop.clone(),
            value: value.clone(),
        },
        EventEffect::ClearStyle { target, prop } => EffectCapture::ClearStyle {
            target: id_selector(doc, *target)?,
            prop: prop.clone(),
        },
    })
}

fn id_selector(doc: &Document, node: NodeId) -> Option<String> {
    let id = doc.id_attr(node);
    (!id.is_empty()).then(|| format!("#{}", id))
}

/// First element in document order matching a simple selector.
fn resolve_selector(doc: &Document, selector: &str) -> Option<NodeId> {
    doc.elements()
        .into_iter()
        .find(|n| doc.matches(*n, selector))
}

fn resolve_effect(doc: &Document, capture: &EffectCapture) -> Result<EventEffect> {
    let resolve = |selector: &str| -> Result<NodeId> {
        resolve_selector(doc, selector).ok_or_else(|| {
            UnveilError::CaptureError(format!(
                "binding effect references unknown element: {}",
                selector
            ))
        })
    };

    Ok(match capture {
        EffectCapture::AddClass { target, class } => EventEffect::AddClass {
            target: resolve(target)?,
            class: class.clone(),
        },
        EffectCapture::RemoveClass { target, class } => EventEffect::RemoveClass {
            target: resolve(target)?,
            class: class.clone(),
        },
        EffectCapture::SetStyle {
            target,
            prop,
            value,
        } => EventEffect::SetStyle {
            target: resolve(target)?,
            prop: prop.clone(),
            value: value.clone(),
        },
        EffectCapture::ClearStyle { target, prop } => EventEffect::ClearStyle {
            target: resolve(target)?,
            prop: prop.clone(),
        },
    })
}
