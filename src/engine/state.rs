//! Pre-reveal element state.
//!
//! The snapshot records the inline value of every property a reveal may
//! touch — the empty string meaning "no inline value" — plus the exact
//! class attribute text. Restore reapplies them verbatim: a property that
//! was absent is removed again, so the post-restore inline style text is
//! byte-identical to the pre-reveal text. Computed display/visibility/
//! opacity are recorded for reporting only and never applied; hiding that
//! came from a stylesheet rule rather than inline style stays a documented
//! best-effort limitation.

use crate::page::{Document, NodeId, StyleInspector};

/// Inline properties a reveal may touch, in snapshot order.
pub const SNAPSHOT_PROPS: [&str; 11] = [
    "display",
    "visibility",
    "opacity",
    "height",
    "width",
    "position",
    "left",
    "top",
    "clip-path",
    "transform",
    "overflow",
];

#[derive(Debug, Clone)]
pub struct OriginalState {
    styles: Vec<(&'static str, String)>,
    class_attr: String,
    computed_display: String,
    computed_visibility: String,
    computed_opacity: String,
}

impl OriginalState {
    pub fn capture(doc: &Document, node: NodeId) -> Self {
        let computed = doc.computed_style(node);
        let lookup = |prop: &str| computed.get(prop).cloned().unwrap_or_default();

        let styles = SNAPSHOT_PROPS
            .iter()
            .map(|prop| {
                (
                    *prop,
                    doc.style_value(node, prop).unwrap_or("").to_string(),
                )
            })
            .collect();

        Self {
            styles,
            class_attr: doc.class_attr(node).to_string(),
            computed_display: lookup("display"),
            computed_visibility: lookup("visibility"),
            computed_opacity: lookup("opacity"),
        }
    }

    /// Reapply the snapshot verbatim. The reveal-added transition is
    /// cleared as well; it is the one engine mutation outside the
    /// snapshotted property set.
    pub fn apply(&self, doc: &mut Document, node: NodeId) {
        for (prop, value) in &self.styles {
            if value.is_empty() {
                doc.remove_style(node, prop);
            } else {
                doc.set_style(node, prop, value);
            }
        }
        doc.remove_style(node, "transition");
        doc.set_class_attr(node, &self.class_attr);
    }

    pub fn style_value(&self, prop: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(p, _)| *p == prop)
            .map(|(_, v)| v.as_str())
    }

    pub fn class_attr(&self) -> &str {
        &self.class_attr
    }

    pub fn computed_display(&self) -> &str {
        &self.computed_display
    }

    pub fn computed_visibility(&self) -> &str {
        &self.computed_visibility
    }

    pub fn computed_opacity(&self) -> &str {
        &self.computed_opacity
    }
}
