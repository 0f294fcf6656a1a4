//! In-memory page model.
//!
//! A `Document` owns every node of a captured page in an arena; the engine
//! holds only `NodeId` indices into it. Detaching a node keeps its data
//! alive (stale generations may still reference it) but marks the whole
//! subtree disconnected, which is what liveness checks look at.

use std::collections::BTreeMap;

use super::inline::InlineStyle;
use super::style::{PropertyMap, Rect};

/// Non-owning reference to a node in the page arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id_attr: String,
    class_attr: String,
    inline: InlineStyle,
    attrs: BTreeMap<String, String>,
    text: String,
    base_style: PropertyMap,
    bounds: Rect,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    connected: bool,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id_attr: String::new(),
            class_attr: String::new(),
            inline: InlineStyle::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            base_style: PropertyMap::new(),
            bounds: Rect::ZERO,
            parent: None,
            children: Vec::new(),
            connected: false,
        }
    }
}

/// A stylesheet rule keyed by a single class name. Rules apply in document
/// order; element-specific base styles win over them.
#[derive(Debug, Clone)]
pub struct ClassRule {
    pub class: String,
    pub declarations: PropertyMap,
}

/// Declarative effect applied when an event binding fires.
#[derive(Debug, Clone)]
pub enum EventEffect {
    AddClass { target: NodeId, class: String },
    RemoveClass { target: NodeId, class: String },
    SetStyle { target: NodeId, prop: String, value: String },
    ClearStyle { target: NodeId, prop: String },
}

/// A page-defined event listener: fires when `event` is dispatched at
/// `node` or bubbles up through it.
#[derive(Debug, Clone)]
pub struct EventBinding {
    pub node: NodeId,
    pub event: String,
    pub effects: Vec<EventEffect>,
}

pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    viewport: (f64, f64),
    title: String,
    url: String,
    class_rules: Vec<ClassRule>,
    bindings: Vec<EventBinding>,
    scrolled_to: Option<NodeId>,
}

impl Document {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            viewport: (viewport_width, viewport_height),
            title: String::new(),
            url: String::new(),
            class_rules: Vec::new(),
            bindings: Vec::new(),
            scrolled_to: None,
        };

        let root = doc.alloc("html");
        doc.nodes[root.0].connected = true;
        doc.root = root;
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.append_child(root, doc.head);
        doc.append_child(root, doc.body);

        // The document element and body span the viewport.
        let page_box = Rect::new(0.0, 0.0, viewport_width, viewport_height);
        doc.nodes[root.0].bounds = page_box;
        doc.nodes[doc.body.0].bounds = page_box;
        doc
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(tag));
        id
    }

    /// Create a detached element; attach it with `append_child`.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(tag)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    pub fn bindings(&self) -> &[EventBinding] {
        &self.bindings
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        let connected = self.nodes[parent.0].connected;
        self.set_subtree_connected(child, connected);
    }

    /// Detach a node from its parent. Node data stays in the arena so stale
    /// references keep resolving; the subtree is marked disconnected.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
        self.nodes[node.0].parent = None;
        self.set_subtree_connected(node, false);
    }

    fn set_subtree_connected(&mut self, node: NodeId, connected: bool) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            self.nodes[id.0].connected = connected;
            stack.extend(self.nodes[id.0].children.iter().copied());
        }
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.nodes[node.0].connected
    }

    /// All connected elements in document order, root included.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_subtree(self.root, &mut out);
        out
    }

    /// Descendants of `node` in document order, `node` excluded.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in &self.nodes[node.0].children {
            self.collect_subtree(*child, &mut out);
        }
        out
    }

    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        for child in &self.nodes[node.0].children {
            self.collect_subtree(*child, out);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// True if `node` is a strict descendant of `ancestor`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes[node.0].parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn id_attr(&self, node: NodeId) -> &str {
        &self.nodes[node.0].id_attr
    }

    pub fn set_id_attr(&mut self, node: NodeId, value: &str) {
        self.nodes[node.0].id_attr = value.to_string();
    }

    pub fn class_attr(&self, node: NodeId) -> &str {
        &self.nodes[node.0].class_attr
    }

    /// Replace the class attribute wholesale (byte-exact, used by restore).
    pub fn set_class_attr(&mut self, node: NodeId, value: &str) {
        self.nodes[node.0].class_attr = value.to_string();
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0]
            .class_attr
            .split_whitespace()
            .any(|c| c == class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let attr = &mut self.nodes[node.0].class_attr;
        if attr.is_empty() {
            attr.push_str(class);
        } else {
            attr.push(' ');
            attr.push_str(class);
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let remaining: Vec<&str> = self.nodes[node.0]
            .class_attr
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        self.nodes[node.0].class_attr = remaining.join(" ");
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attrs.get(name).map(|v| v.as_str())
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.nodes[node.0].attrs.contains_key(name)
    }

    pub fn attrs(&self, node: NodeId) -> &BTreeMap<String, String> {
        &self.nodes[node.0].attrs
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = text.to_string();
    }

    pub fn own_text(&self, node: NodeId) -> &str {
        &self.nodes[node.0].text
    }

    /// Concatenated text of the node and all descendants, document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.append_text(node, &mut out);
        out
    }

    fn append_text(&self, node: NodeId, out: &mut String) {
        out.push_str(&self.nodes[node.0].text);
        for child in &self.nodes[node.0].children {
            self.append_text(*child, out);
        }
    }

    pub fn inline(&self, node: NodeId) -> &InlineStyle {
        &self.nodes[node.0].inline
    }

    pub fn style_value(&self, node: NodeId, prop: &str) -> Option<&str> {
        self.nodes[node.0].inline.get(prop)
    }

    pub fn set_style(&mut self, node: NodeId, prop: &str, value: &str) {
        self.nodes[node.0].inline.set(prop, value);
    }

    pub fn remove_style(&mut self, node: NodeId, prop: &str) {
        self.nodes[node.0].inline.remove(prop);
    }

    pub fn inline_css_text(&self, node: NodeId) -> String {
        self.nodes[node.0].inline.css_text()
    }

    /// Replace the whole inline style from attribute text (strategy
    /// rollback path).
    pub fn set_inline_css_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].inline = InlineStyle::parse(text);
    }

    pub fn base_style(&self, node: NodeId) -> &PropertyMap {
        &self.nodes[node.0].base_style
    }

    pub fn set_base_style(&mut self, node: NodeId, prop: &str, value: &str) {
        self.nodes[node.0]
            .base_style
            .insert(prop.to_string(), value.to_string());
    }

    pub fn bounds(&self, node: NodeId) -> Rect {
        self.nodes[node.0].bounds
    }

    pub fn set_bounds(&mut self, node: NodeId, bounds: Rect) {
        self.nodes[node.0].bounds = bounds;
    }

    pub fn class_rules(&self) -> &[ClassRule] {
        &self.class_rules
    }

    pub fn add_class_rule(&mut self, class: &str, declarations: PropertyMap) {
        self.class_rules.push(ClassRule {
            class: class.to_string(),
            declarations,
        });
    }

    /// True if any connected element carries the class. Mirrors a
    /// `querySelector(".cls")` existence probe.
    pub fn class_in_use(&self, class: &str) -> bool {
        self.elements().iter().any(|n| self.has_class(*n, class))
    }

    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    pub fn find_by_id_attr(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|n| self.nodes[n.0].id_attr == id)
    }

    pub fn find_child_with_class(&self, parent: NodeId, class: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|c| self.has_class(*c, class))
    }

    /// Match against a simple selector: `#id`, `.class`, or a tag name.
    pub fn matches(&self, node: NodeId, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.nodes[node.0].id_attr == id
        } else if let Some(class) = selector.strip_prefix('.') {
            self.has_class(node, class)
        } else {
            self.nodes[node.0].tag.eq_ignore_ascii_case(selector)
        }
    }

    /// Nearest ancestor-or-self matching the selector.
    pub fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.matches(id, selector) {
                return Some(id);
            }
            current = self.nodes[id.0].parent;
        }
        None
    }

    pub fn add_binding(&mut self, node: NodeId, event: &str, effects: Vec<EventEffect>) {
        self.bindings.push(EventBinding {
            node,
            event: event.to_string(),
            effects,
        });
    }

    /// Dispatch a bubbling event at `target`: bindings registered on the
    /// target or any ancestor fire, in registration order. Returns the
    /// number of bindings that fired.
    pub fn dispatch(&mut self, target: NodeId, event: &str) -> usize {
        let mut effects = Vec::new();
        let mut fired = 0;
        for binding in &self.bindings {
            if binding.event != event {
                continue;
            }
            if binding.node == target || self.contains(binding.node, target) {
                effects.extend(binding.effects.iter().cloned());
                fired += 1;
            }
        }
        for effect in effects {
            self.apply_effect(effect);
        }
        fired
    }

    pub fn click(&mut self, target: NodeId) -> usize {
        self.dispatch(target, "click")
    }

    fn apply_effect(&mut self, effect: EventEffect) {
        match effect {
            EventEffect::AddClass { target, class } => self.add_class(target, &class),
            EventEffect::RemoveClass { target, class } => self.remove_class(target, &class),
            EventEffect::SetStyle {
                target,
                prop,
                value,
            } => self.set_style(target, &prop, &value),
            EventEffect::ClearStyle { target, prop } => self.remove_style(target, &prop),
        }
    }

    pub fn scroll_into_view(&mut self, node: NodeId) {
        self.scrolled_to = Some(node);
    }

    pub fn scrolled_to(&self) -> Option<NodeId> {
        self.scrolled_to
    }
}
