//! Reveal strategies: per-strategy behavior, verification, rollback,
//! bulk tallies.

mod common;

use common::{block, engine, hidden_block, new_page, unrevealable_block};
use unveil::engine::{INDICATOR_CLASS, REVEALED_CLASS};
use unveil::error::UnveilError;
use unveil::page::{PropertyMap, StyleInspector};

fn zero_size_rule(doc: &mut unveil::page::Document, class: &str) {
    let mut decls = PropertyMap::new();
    decls.insert("width".to_string(), "0px".to_string());
    decls.insert("height".to_string(), "0px".to_string());
    doc.add_class_rule(class, decls);
}

#[test]
fn css_override_reveals_inline_display_none() {
    let mut doc = new_page();
    let body = doc.body();
    let el = hidden_block(&mut doc, body, "hello there");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    let revealed = engine.reveal(&id).unwrap();
    assert!(revealed.is_some());

    let doc = engine.document();
    assert_eq!(doc.style_value(el, "display"), Some("block"));
    assert_eq!(doc.style_value(el, "transition"), Some("all 0.3s ease-in-out"));
    assert!(doc.has_class(el, REVEALED_CLASS));
    assert!(doc.find_child_with_class(el, INDICATOR_CLASS).is_some());
    assert!(engine.is_revealed(&id));
    assert_eq!(
        engine.snapshot(&id).unwrap().style_value("display"),
        Some("none")
    );
}

#[test]
fn inline_display_none_span_becomes_inline() {
    let mut doc = new_page();
    let body = doc.body();
    let el = block(&mut doc, body, "span", "inline words");
    doc.set_style(el, "display", "none");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    engine.reveal(&id).unwrap();
    assert_eq!(engine.document().style_value(el, "display"), Some("inline"));
}

#[test]
fn opacity_and_offscreen_clear_in_a_single_pass() {
    let mut doc = new_page();
    let body = doc.body();
    let el = block(&mut doc, body, "div", "promo content");
    doc.set_inline_css_text(el, "opacity: 0; position: absolute; left: -9999px;");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    let revealed = engine.reveal(&id).unwrap();
    assert!(revealed.is_some());

    let doc = engine.document();
    assert_eq!(doc.style_value(el, "opacity"), Some("1"));
    assert_eq!(doc.style_value(el, "position"), Some("static"));
    assert_eq!(doc.style_value(el, "left"), Some("auto"));
    assert_eq!(doc.style_value(el, "top"), Some("auto"));

    let rect = doc.bounding_box(el);
    assert!(rect.x >= -1280.0);
    assert!(rect.width > 0.0);

    // Strategy 1 alone did it: the class strategy never ran.
    assert_eq!(doc.class_attr(el), REVEALED_CLASS);
}

#[test]
fn class_strategy_strips_known_hiding_classes() {
    let mut doc = new_page();
    let body = doc.body();
    zero_size_rule(&mut doc, "hidden");

    let el = block(&mut doc, body, "div", "menu content");
    doc.set_class_attr(el, "menu hidden");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    let revealed = engine.reveal(&id).unwrap();
    assert!(revealed.is_some());

    let doc = engine.document();
    assert!(!doc.has_class(el, "hidden"));
    assert!(doc.has_class(el, "menu"));
}

#[test]
fn showing_class_added_only_when_page_uses_it() {
    // Page A: nothing uses "show"; the class must not be invented.
    let mut doc = new_page();
    let body = doc.body();
    zero_size_rule(&mut doc, "hidden");
    let el = block(&mut doc, body, "div", "panel content");
    doc.set_class_attr(el, "hidden");

    let mut eng = engine(doc);
    eng.discover();
    let id = eng.generation()[0].id.clone();
    eng.reveal(&id).unwrap();
    assert!(!eng.document().has_class(el, "show"));

    // Page B: another element already carries "show".
    let mut doc = new_page();
    let body = doc.body();
    zero_size_rule(&mut doc, "hidden");
    let el = block(&mut doc, body, "div", "panel content");
    doc.set_class_attr(el, "hidden");
    let other = block(&mut doc, body, "div", "already open");
    doc.set_class_attr(other, "show");

    let mut eng = engine(doc);
    eng.discover();
    let id = eng.generation()[0].id.clone();
    eng.reveal(&id).unwrap();
    assert!(eng.document().has_class(el, "show"));
}

#[test]
fn ancestor_chain_reveals_hidden_parent() {
    let mut doc = new_page();
    let body = doc.body();

    // The wrapper is hidden and excluded from findings (tracking class),
    // so the child is the reported element.
    let wrapper = hidden_block(&mut doc, body, "");
    doc.set_class_attr(wrapper, "track-wrapper");
    let child = block(&mut doc, wrapper, "div", "content inside a hidden wrapper");

    let mut engine = engine(doc);
    let discovery = engine.discover();
    assert_eq!(discovery.total, 1);
    assert_eq!(engine.generation()[0].node, child);
    let id = engine.generation()[0].id.clone();

    let revealed = engine.reveal(&id).unwrap();
    assert!(revealed.is_some());

    let doc = engine.document();
    assert_eq!(doc.style_value(wrapper, "display"), Some("block"));
    assert!(doc.bounding_box(child).width > 0.0);
}

#[test]
fn event_dispatch_reveals_listener_backed_elements() {
    let mut doc = new_page();
    let body = doc.body();
    zero_size_rule(&mut doc, "collapsed-size");

    let el = block(&mut doc, body, "div", "hover to expand");
    doc.set_class_attr(el, "collapsed-size");
    doc.add_binding(
        el,
        "mouseenter",
        vec![unveil::page::EventEffect::RemoveClass {
            target: el,
            class: "collapsed-size".to_string(),
        }],
    );

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    let revealed = engine.reveal(&id).unwrap();
    assert!(revealed.is_some());
    assert!(!engine.document().has_class(el, "collapsed-size"));
}

#[test]
fn toggle_trigger_click_reveals_target() {
    let mut doc = new_page();
    let body = doc.body();
    zero_size_rule(&mut doc, "collapsed-size");

    let menu = block(&mut doc, body, "div", "dropdown items");
    doc.set_id_attr(menu, "menu");
    doc.set_class_attr(menu, "collapsed-size");

    let trigger = block(&mut doc, body, "button", "Open menu");
    doc.set_attr(trigger, "aria-controls", "menu");
    doc.add_binding(
        trigger,
        "click",
        vec![unveil::page::EventEffect::RemoveClass {
            target: menu,
            class: "collapsed-size".to_string(),
        }],
    );

    let mut engine = engine(doc);
    let discovery = engine.discover();
    let id = discovery
        .elements
        .iter()
        .find(|el| el.node == menu)
        .unwrap()
        .id
        .clone();

    let revealed = engine.reveal(&id).unwrap();
    assert!(revealed.is_some());
    assert!(!engine.document().has_class(menu, "collapsed-size"));
}

#[test]
fn failed_reveal_rolls_back_all_mutations() {
    let mut doc = new_page();
    let body = doc.body();
    let el = unrevealable_block(&mut doc, body, "cannot be shown");
    doc.set_inline_css_text(el, "color: red;");
    doc.set_class_attr(el, "stubborn  widget");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    let revealed = engine.reveal(&id).unwrap();
    assert!(revealed.is_none());

    let doc = engine.document();
    assert_eq!(doc.inline_css_text(el), "color: red;");
    assert_eq!(doc.class_attr(el), "stubborn  widget");
    assert!(doc.find_child_with_class(el, INDICATOR_CLASS).is_none());
    assert!(!engine.is_revealed(&id));
    assert!(engine.snapshot(&id).is_none());
}

#[test]
fn reveal_all_tallies_partial_failures() {
    let mut doc = new_page();
    let body = doc.body();
    hidden_block(&mut doc, body, "one");
    hidden_block(&mut doc, body, "two");
    hidden_block(&mut doc, body, "three");
    unrevealable_block(&mut doc, body, "stuck four");
    unrevealable_block(&mut doc, body, "stuck five");

    let mut engine = engine(doc);
    engine.discover();
    let summary = engine.reveal_all();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.successful, 3);
    assert_eq!(summary.failed, 2);
}

#[test]
fn unknown_and_detached_ids_fail_with_element_not_found() {
    let mut doc = new_page();
    let body = doc.body();
    let el = hidden_block(&mut doc, body, "soon detached");

    let mut engine = engine(doc);
    engine.discover();
    let id = engine.generation()[0].id.clone();

    assert!(matches!(
        engine.reveal("unveil-element-99"),
        Err(UnveilError::ElementNotFound(_))
    ));

    engine.document_mut().detach(el);
    assert!(matches!(
        engine.reveal(&id),
        Err(UnveilError::ElementNotFound(_))
    ));
}
