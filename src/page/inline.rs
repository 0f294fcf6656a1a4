//! Inline style declaration lists.
//!
//! The engine's restore guarantee is byte-exact: after a reveal/restore
//! round trip the element's inline style text must equal the pre-reveal
//! text. Declarations are therefore kept as an ordered list, and setting a
//! property that already exists rewrites it in place rather than moving it
//! to the end.

/// An element's `style` attribute, parsed into ordered declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    decls: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value. Malformed declarations (no colon,
    /// empty property name) are dropped.
    pub fn parse(text: &str) -> Self {
        let mut decls = Vec::new();
        for piece in text.split(';') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if let Some((prop, value)) = piece.split_once(':') {
                let prop = prop.trim();
                if prop.is_empty() {
                    continue;
                }
                decls.push((prop.to_ascii_lowercase(), value.trim().to_string()));
            }
        }
        Self { decls }
    }

    /// Serialize back to `style` attribute text, one `prop: value;` per
    /// declaration, space separated. Stable: parse → css_text → parse is
    /// the identity on the declaration list.
    pub fn css_text(&self) -> String {
        self.decls
            .iter()
            .map(|(prop, value)| format!("{}: {};", prop, value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, replacing in place if present, appending otherwise.
    pub fn set(&mut self, prop: &str, value: &str) {
        let prop = prop.to_ascii_lowercase();
        match self.decls.iter_mut().find(|(p, _)| *p == prop) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.decls.push((prop, value.to_string())),
        }
    }

    pub fn remove(&mut self, prop: &str) {
        self.decls.retain(|(p, _)| p != prop);
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.decls.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_serialize_round_trip() {
        let style = InlineStyle::parse("display:none; color: red");
        assert_eq!(style.get("display"), Some("none"));
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.css_text(), "display: none; color: red;");

        let again = InlineStyle::parse(&style.css_text());
        assert_eq!(again, style);
    }

    #[test]
    fn set_existing_property_keeps_position() {
        let mut style = InlineStyle::parse("display: none; color: red;");
        style.set("display", "block");
        assert_eq!(style.css_text(), "display: block; color: red;");
    }

    #[test]
    fn remove_then_empty() {
        let mut style = InlineStyle::parse("opacity: 0;");
        style.remove("opacity");
        assert!(style.is_empty());
        assert_eq!(style.css_text(), "");
    }

    #[test]
    fn malformed_declarations_are_dropped() {
        let style = InlineStyle::parse("nonsense;; : red; display: none");
        assert_eq!(style.css_text(), "display: none;");
    }

    #[test]
    fn property_names_are_case_insensitive() {
        let style = InlineStyle::parse("Display: None");
        assert_eq!(style.get("display"), Some("None"));
    }
}
