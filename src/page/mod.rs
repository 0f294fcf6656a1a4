mod capture;
mod document;
mod inline;
mod style;

pub use capture::{BindingCapture, EffectCapture, NodeCapture, PageCapture, RuleCapture};
pub use document::{ClassRule, Document, EventBinding, EventEffect, NodeId};
pub use inline::InlineStyle;
pub use style::{
    clip_path_collapsed, default_display, has_zero_scale, parse_px, PropertyMap, Rect,
    StyleInspector,
};
