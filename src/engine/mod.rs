//! The visibility engine.
//!
//! One engine instance per page context. It owns the document, the current
//! scan generation, the pre-reveal snapshots, and the revealed set; all
//! state dies with the page.

pub mod detector;
pub mod reveal;
pub mod state;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnveilError};
use crate::page::{Document, NodeId};

pub use detector::{Category, DiscoveredElement, ElementSize, Interactivity};
pub use state::OriginalState;

pub const INDICATOR_CLASS: &str = "unveil-reveal-indicator";
pub const REVEALED_CLASS: &str = "unveil-revealed";
pub const HIGHLIGHT_CLASS: &str = "unveil-highlight";
pub const STYLE_NODE_ID: &str = "unveil-styles";

const REVEAL_TRANSITION: &str = "all 0.3s ease-in-out";
const INDICATOR_TEXT: &str = "✨ Revealed";

/// Indicator/highlight presentation, installed into the page once.
const INDICATOR_CSS: &str = "\
.unveil-highlight { outline: 2px solid #007acc; outline-offset: 2px; } \
.unveil-revealed { position: relative; } \
.unveil-reveal-indicator { position: absolute; top: -30px; right: 0; \
background: #007acc; color: white; padding: 4px 10px; border-radius: 12px; \
font-size: 11px; z-index: 10000; }";

/// Heuristic tunables, sourced from configuration.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Below this natural size an element must contain interactive
    /// descendants to stay meaningful.
    pub tiny_size: f64,
    /// Below this natural size an element is dropped in the dedup pass.
    pub small_size: f64,
    /// Left/top offsets below this mark the offscreen-dump pattern.
    pub offscreen_threshold: f64,
    /// How many ancestor levels the chain-reveal strategy walks.
    pub max_ancestor_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            tiny_size: 5.0,
            small_size: 10.0,
            offscreen_threshold: -9000.0,
            max_ancestor_depth: 10,
        }
    }
}

/// Result of one scan generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discovery {
    pub elements: Vec<DiscoveredElement>,
    pub total: usize,
    pub categories: BTreeMap<Category, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSummary {
    pub total: usize,
    pub restored: usize,
    pub failed: usize,
}

pub struct VisibilityEngine {
    doc: Document,
    opts: EngineOptions,
    generation: Vec<DiscoveredElement>,
    id_counter: u32,
    snapshots: HashMap<String, OriginalState>,
    revealed: Vec<String>,
}

impl VisibilityEngine {
    pub fn new(mut doc: Document, opts: EngineOptions) -> Self {
        inject_styles(&mut doc);
        Self {
            doc,
            opts,
            generation: Vec::new(),
            id_counter: 0,
            snapshots: HashMap::new(),
            revealed: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn generation(&self) -> &[DiscoveredElement] {
        &self.generation
    }

    pub fn is_revealed(&self, element_id: &str) -> bool {
        self.revealed.iter().any(|id| id == element_id)
    }

    pub fn snapshot(&self, element_id: &str) -> Option<&OriginalState> {
        self.snapshots.get(element_id)
    }

    /// Scan the document for hidden, meaningful elements. Replaces the
    /// previous generation and resets the id counter; previously revealed
    /// elements are left as they are.
    pub fn discover(&mut self) -> Discovery {
        self.generation.clear();
        self.id_counter = 0;

        let candidates: Vec<NodeId> = self
            .doc
            .elements()
            .into_iter()
            .filter(|node| {
                detector::is_hidden(&self.doc, *node, &self.opts)
                    && detector::is_meaningful(&self.doc, *node, &self.opts)
            })
            .collect();

        let survivors = detector::dedup_candidates(&self.doc, &candidates, &self.opts);

        for node in survivors {
            let id = format!("unveil-element-{}", self.id_counter);
            self.id_counter += 1;
            self.generation.push(DiscoveredElement {
                id,
                node,
                category: detector::categorize(&self.doc, node),
                preview: detector::preview(&self.doc, node),
                selector: detector::selector(&self.doc, node),
                hiding_method: detector::analyze_hiding_method(&self.doc, node, &self.opts),
                size: detector::element_size(&self.doc, node),
                interactivity: detector::assess_interactivity(&self.doc, node),
            });
        }

        Discovery {
            elements: self.generation.clone(),
            total: self.generation.len(),
            categories: category_summary(&self.generation),
        }
    }

    fn find(&self, element_id: &str) -> Option<&DiscoveredElement> {
        self.generation.iter().find(|el| el.id == element_id)
    }

    /// Make one element visible. `Ok(Some(_))` on verified success,
    /// `Ok(None)` when every strategy failed (element rolled back),
    /// `Err(ElementNotFound)` when the id does not resolve to a live node.
    pub fn reveal(&mut self, element_id: &str) -> Result<Option<DiscoveredElement>> {
        let entry = self
            .find(element_id)
            .cloned()
            .ok_or_else(|| UnveilError::ElementNotFound(element_id.to_string()))?;
        if !self.doc.is_connected(entry.node) {
            return Err(UnveilError::ElementNotFound(element_id.to_string()));
        }

        let original = OriginalState::capture(&self.doc, entry.node);

        if !reveal::apply_strategies(&mut self.doc, entry.node, &self.opts) {
            tracing::debug!("no reveal strategy succeeded for {}", element_id);
            return Ok(None);
        }

        // A re-reveal must not lose the pre-first-reveal state.
        self.snapshots
            .entry(entry.id.clone())
            .or_insert(original);
        if !self.is_revealed(element_id) {
            self.revealed.push(entry.id.clone());
        }

        add_reveal_indicator(&mut self.doc, entry.node, element_id);
        self.doc
            .set_style(entry.node, "transition", REVEAL_TRANSITION);

        Ok(Some(entry))
    }

    /// Reveal every element of the current generation, tallying failures
    /// instead of aborting.
    pub fn reveal_all(&mut self) -> RevealSummary {
        let ids: Vec<String> = self.generation.iter().map(|el| el.id.clone()).collect();
        let mut summary = RevealSummary {
            total: ids.len(),
            successful: 0,
            failed: 0,
        };

        for id in ids {
            match self.reveal(&id) {
                Ok(Some(_)) => summary.successful += 1,
                Ok(None) => summary.failed += 1,
                Err(e) => {
                    tracing::warn!("reveal {} failed: {}", id, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Undo a reveal exactly: snapshotted inline properties verbatim, the
    /// original class attribute text, indicator removed, snapshot consumed.
    pub fn restore(&mut self, element_id: &str) -> Result<()> {
        if !self.snapshots.contains_key(element_id) {
            return Err(UnveilError::NoSnapshot(element_id.to_string()));
        }

        // The snapshot stays behind if the element no longer resolves.
        let entry = self
            .find(element_id)
            .cloned()
            .ok_or_else(|| UnveilError::ElementNotFound(element_id.to_string()))?;
        if !self.doc.is_connected(entry.node) {
            return Err(UnveilError::ElementNotFound(element_id.to_string()));
        }

        let state = self
            .snapshots
            .remove(element_id)
            .expect("snapshot presence checked above");
        state.apply(&mut self.doc, entry.node);
        remove_reveal_indicator(&mut self.doc, entry.node);
        self.revealed.retain(|id| id != element_id);

        Ok(())
    }

    /// Restore every currently revealed element. The revealed set is
    /// cleared afterwards regardless of individual failures.
    pub fn restore_all(&mut self) -> RestoreSummary {
        let ids = self.revealed.clone();
        let mut summary = RestoreSummary {
            total: ids.len(),
            restored: 0,
            failed: 0,
        };

        for id in &ids {
            match self.restore(id) {
                Ok(()) => summary.restored += 1,
                Err(e) => {
                    tracing::warn!("restore {} failed: {}", id, e);
                    summary.failed += 1;
                }
            }
        }

        self.revealed.clear();
        summary
    }

    /// Mark the element and scroll it into view.
    pub fn highlight(&mut self, element_id: &str) -> Result<()> {
        let entry = self
            .find(element_id)
            .cloned()
            .ok_or_else(|| UnveilError::ElementNotFound(element_id.to_string()))?;
        if !self.doc.is_connected(entry.node) {
            return Err(UnveilError::ElementNotFound(element_id.to_string()));
        }

        self.doc.add_class(entry.node, HIGHLIGHT_CLASS);
        self.doc.scroll_into_view(entry.node);
        Ok(())
    }

    /// Document-wide sweep by class, deliberately not scoped to the
    /// current generation: stale-generation highlights come off too.
    pub fn unhighlight_all(&mut self) {
        for node in self.doc.elements_with_class(HIGHLIGHT_CLASS) {
            self.doc.remove_class(node, HIGHLIGHT_CLASS);
        }
    }
}

fn category_summary(elements: &[DiscoveredElement]) -> BTreeMap<Category, usize> {
    let mut summary = BTreeMap::new();
    for el in elements {
        *summary.entry(el.category).or_insert(0) += 1;
    }
    summary
}

/// Install the indicator stylesheet once per page.
fn inject_styles(doc: &mut Document) {
    if doc.find_by_id_attr(STYLE_NODE_ID).is_some() {
        return;
    }
    let style = doc.create_element("style");
    doc.set_id_attr(style, STYLE_NODE_ID);
    doc.set_text(style, INDICATOR_CSS);
    doc.append_child(doc.head(), style);
}

fn add_reveal_indicator(doc: &mut Document, node: NodeId, element_id: &str) {
    if doc.find_child_with_class(node, INDICATOR_CLASS).is_some() {
        return;
    }
    let badge = doc.create_element("div");
    doc.set_class_attr(badge, INDICATOR_CLASS);
    doc.set_attr(badge, "data-unveil-id", element_id);
    doc.set_text(badge, INDICATOR_TEXT);
    doc.append_child(node, badge);
    doc.add_class(node, REVEALED_CLASS);
}

fn remove_reveal_indicator(doc: &mut Document, node: NodeId) {
    if let Some(badge) = doc.find_child_with_class(node, INDICATOR_CLASS) {
        doc.detach(badge);
    }
    doc.remove_class(node, REVEALED_CLASS);
}
