//! Snapshot/restore: byte-exact round trips, snapshot lifecycle,
//! orphaning behavior across generations.

mod common;

use common::{engine, hidden_block, new_page};
use unveil::engine::{INDICATOR_CLASS, REVEALED_CLASS};
use unveil::error::UnveilError;
use unveil::page::{PropertyMap, StyleInspector};

#[test]
fn restore_reproduces_inline_style_and_classes_exactly() {
    let mut doc = new_page();
    let body = doc.body();
    let el = hidden_block(&mut doc, body, "menu entries");
    doc.set_inline_css_text(el, "display: none; color: red;");
    doc.set_class_attr(el, "menu  hidden");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    engine.reveal(&id).unwrap().expect("reveal should succeed");
    assert_ne!(engine.document().inline_css_text(el), "display: none; color: red;");

    engine.restore(&id).unwrap();

    let doc = engine.document();
    assert_eq!(doc.inline_css_text(el), "display: none; color: red;");
    assert_eq!(doc.class_attr(el), "menu  hidden");
    assert!(doc.find_child_with_class(el, INDICATOR_CLASS).is_none());
    assert!(!doc.has_class(el, REVEALED_CLASS));
    assert!(!engine.is_revealed(&id));
    assert!(engine.snapshot(&id).is_none());
}

#[test]
fn restore_is_consumed_after_first_use() {
    let mut doc = new_page();
    let body = doc.body();
    hidden_block(&mut doc, body, "once only");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    engine.reveal(&id).unwrap();
    assert!(engine.restore(&id).is_ok());
    assert!(matches!(
        engine.restore(&id),
        Err(UnveilError::NoSnapshot(_))
    ));
}

#[test]
fn restore_without_reveal_reports_no_snapshot() {
    let mut doc = new_page();
    let body = doc.body();
    hidden_block(&mut doc, body, "never revealed");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    assert!(matches!(
        engine.restore(&id),
        Err(UnveilError::NoSnapshot(_))
    ));
}

#[test]
fn stylesheet_hiding_falls_back_to_stylesheet_state() {
    let mut doc = new_page();
    let body = doc.body();

    let mut decls = PropertyMap::new();
    decls.insert("display".to_string(), "none".to_string());
    doc.add_class_rule("tucked-away", decls);

    let el = common::block(&mut doc, body, "div", "stylesheet hidden");
    doc.set_class_attr(el, "tucked-away");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    engine.reveal(&id).unwrap().expect("reveal should succeed");
    assert_eq!(engine.document().style_value(el, "display"), Some("block"));

    engine.restore(&id).unwrap();

    // The inline override is gone; the stylesheet rule hides it again.
    let doc = engine.document();
    assert_eq!(doc.inline_css_text(el), "");
    assert_eq!(
        doc.computed_style(el).get("display").map(String::as_str),
        Some("none")
    );
}

#[test]
fn re_reveal_keeps_the_first_snapshot() {
    let mut doc = new_page();
    let body = doc.body();
    let el = hidden_block(&mut doc, body, "revealed twice");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    engine.reveal(&id).unwrap().expect("first reveal");
    let revealed_style = engine.document().inline_css_text(el);

    // Second reveal of an already-visible element succeeds without
    // replacing the original snapshot or duplicating the indicator.
    engine.reveal(&id).unwrap().expect("second reveal");
    assert_eq!(
        engine.snapshot(&id).unwrap().style_value("display"),
        Some("none")
    );
    assert_eq!(engine.document().inline_css_text(el), revealed_style);

    let badges = engine
        .document()
        .children(el)
        .iter()
        .filter(|c| engine.document().has_class(**c, INDICATOR_CLASS))
        .count();
    assert_eq!(badges, 1);

    engine.restore(&id).unwrap();
    assert_eq!(engine.document().inline_css_text(el), "display: none;");
}

#[test]
fn restore_of_detached_element_keeps_the_snapshot() {
    let mut doc = new_page();
    let body = doc.body();
    let el = hidden_block(&mut doc, body, "going away");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    engine.reveal(&id).unwrap();
    engine.document_mut().detach(el);

    assert!(matches!(
        engine.restore(&id),
        Err(UnveilError::ElementNotFound(_))
    ));
    assert!(engine.snapshot(&id).is_some());
}

#[test]
fn restore_all_clears_revealed_set_despite_failures() {
    let mut doc = new_page();
    let body = doc.body();
    hidden_block(&mut doc, body, "first");
    let second = hidden_block(&mut doc, body, "second");
    hidden_block(&mut doc, body, "third");

    let mut engine = engine(doc);
    engine.discover();
    let summary = engine.reveal_all();
    assert_eq!(summary.successful, 3);

    // One element leaves the document between reveal and restore.
    engine.document_mut().detach(second);

    let summary = engine.restore_all();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.restored, 2);
    assert_eq!(summary.failed, 1);

    for el in engine.generation() {
        assert!(!engine.is_revealed(&el.id));
    }

    // The set was cleared unconditionally.
    let again = engine.restore_all();
    assert_eq!(again.total, 0);
}

#[test]
fn rescan_orphans_revealed_elements() {
    let mut doc = new_page();
    let body = doc.body();
    hidden_block(&mut doc, body, "orphaned after rescan");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();
    engine.reveal(&id).unwrap().expect("reveal should succeed");

    // The element is visible now, so the new generation does not list it;
    // its snapshot and revealed-set entry stay behind keyed by the old id.
    let rescan = engine.discover();
    assert_eq!(rescan.total, 0);
    assert!(engine.is_revealed(&id));
    assert!(engine.snapshot(&id).is_some());

    assert!(matches!(
        engine.restore(&id),
        Err(UnveilError::ElementNotFound(_))
    ));
    assert!(engine.snapshot(&id).is_some());
}
