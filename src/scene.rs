// 🎨 Scene - Declarative element tree produced by every renderer
//
// Renderers return an `Element`; hosts paint it. Interactions are data:
// hover effects and click actions travel with the element and are serialized
// as `data-*` attributes in markup.

use crate::category::Category;
use crate::format::fmt_num;
use serde::Serialize;
use std::fmt::Write as _;

// ============================================================================
// INTERACTIONS
// ============================================================================

/// What a click asks the host to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    DrillDown { skill_id: String },
    SelectXpTab(Category),
    SelectProjectTab(Category),
    Retry,
    Logout,
}

impl Action {
    /// Compact form used in markup and host URLs
    pub fn encode(&self) -> String {
        match self {
            Action::DrillDown { skill_id } => format!("drill-down:{}", skill_id),
            Action::SelectXpTab(c) => format!("xp-tab:{}", c.key()),
            Action::SelectProjectTab(c) => format!("project-tab:{}", c.key()),
            Action::Retry => "retry".to_string(),
            Action::Logout => "logout".to_string(),
        }
    }

    pub fn decode(encoded: &str) -> Option<Action> {
        match encoded.split_once(':') {
            Some(("drill-down", id)) if !id.is_empty() => {
                Some(Action::DrillDown { skill_id: id.to_string() })
            }
            Some(("xp-tab", key)) => Category::from_key(key).map(Action::SelectXpTab),
            Some(("project-tab", key)) => Category::from_key(key).map(Action::SelectProjectTab),
            None if encoded == "retry" => Some(Action::Retry),
            None if encoded == "logout" => Some(Action::Logout),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HoverEffect {
    /// Show the element with this id while hovered
    Reveal { target: String },
    /// Swap an attribute value while hovered
    SetAttr { name: String, idle: String, hovered: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Interaction {
    Hover(HoverEffect),
    Click(Action),
}

// ============================================================================
// ELEMENT
// ============================================================================

const SELF_CLOSING: [&str; 7] = ["rect", "line", "circle", "path", "ellipse", "polyline", "polygon"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
    pub interactions: Vec<Interaction>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element { tag: tag.to_string(), ..Default::default() }
    }

    /// Set (or replace) an attribute
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Numeric attribute, compacted to at most 2 decimals
    pub fn num(self, name: &str, value: f64) -> Self {
        self.attr(name, fmt_num(value))
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn on_click(mut self, action: Action) -> Self {
        self.interactions.push(Interaction::Click(action));
        self
    }

    pub fn on_hover(mut self, effect: HoverEffect) -> Self {
        self.interactions.push(Interaction::Hover(effect));
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map_or(false, |c| c.split_whitespace().any(|part| part == class))
    }

    pub fn click_action(&self) -> Option<&Action> {
        self.interactions.iter().find_map(|i| match i {
            Interaction::Click(action) => Some(action),
            _ => None,
        })
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Depth-first, self included
    pub fn find_all<P: Fn(&Element) -> bool>(&self, predicate: P) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_matching(&predicate, &mut out);
        out
    }

    fn collect_matching<'a, P: Fn(&Element) -> bool>(&'a self, predicate: &P, out: &mut Vec<&'a Element>) {
        if predicate(self) {
            out.push(self);
        }
        for child in &self.children {
            child.collect_matching(predicate, out);
        }
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        self.find_all(|e| e.has_class(class))
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.find_all(|e| e.tag == tag)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find_all(|e| e.get_attr("id") == Some(id)).into_iter().next()
    }

    /// Concatenated text of this element and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    // ========================================================================
    // MARKUP
    // ========================================================================

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape_xml(value));
        }
        for interaction in &self.interactions {
            let (name, value) = match interaction {
                Interaction::Click(action) => ("data-action", action.encode()),
                Interaction::Hover(HoverEffect::Reveal { target }) => ("data-hover-reveal", target.clone()),
                Interaction::Hover(HoverEffect::SetAttr { name, idle, hovered }) => {
                    ("data-hover-attr", format!("{}:{}:{}", name, idle, hovered))
                }
            };
            let _ = write!(out, " {}=\"{}\"", name, escape_xml(&value));
        }

        if self.text.is_none() && self.children.is_empty() && SELF_CLOSING.contains(&self.tag.as_str()) {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_xml(text));
        }
        for child in &self.children {
            child.write_markup(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_serialization() {
        let el = Element::new("g")
            .class("bar")
            .on_click(Action::DrillDown { skill_id: "skill_js".into() })
            .child(Element::new("rect").num("width", 12.5).num("height", 3.0))
            .child(Element::new("text").text("A & B"));

        assert_eq!(
            el.to_markup(),
            "<g class=\"bar\" data-action=\"drill-down:skill_js\"><rect width=\"12.5\" height=\"3\"/><text>A &amp; B</text></g>"
        );
    }

    #[test]
    fn test_html_elements_never_self_close() {
        assert_eq!(Element::new("div").class("x").to_markup(), "<div class=\"x\"></div>");
    }

    #[test]
    fn test_hover_effects_serialize() {
        let el = Element::new("circle")
            .on_hover(HoverEffect::Reveal { target: "tip-1".into() })
            .on_hover(HoverEffect::SetAttr { name: "r".into(), idle: "5".into(), hovered: "7".into() });
        let markup = el.to_markup();
        assert!(markup.contains("data-hover-reveal=\"tip-1\""));
        assert!(markup.contains("data-hover-attr=\"r:5:7\""));
    }

    #[test]
    fn test_action_round_trip() {
        let actions = vec![
            Action::DrillDown { skill_id: "skill_sys-admin".into() },
            Action::SelectXpTab(Category::PiscineJs),
            Action::SelectProjectTab(Category::Module),
            Action::Retry,
            Action::Logout,
        ];
        for action in actions {
            assert_eq!(Action::decode(&action.encode()), Some(action));
        }
        assert_eq!(Action::decode("xp-tab:unknown"), None);
        assert_eq!(Action::decode("drill-down:"), None);
    }

    #[test]
    fn test_queries() {
        let el = Element::new("div")
            .child(Element::new("span").class("a b").id("first").text("one"))
            .child(Element::new("span").class("b").text("two"));

        assert_eq!(el.find_by_class("b").len(), 2);
        assert_eq!(el.find_by_id("first").map(|e| e.text_content()), Some("one".to_string()));
        assert_eq!(el.text_content(), "onetwo");
        assert_eq!(el.find_by_tag("span").len(), 2);
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut el = Element::new("rect").attr("fill", "red");
        el.set_attr("fill", "blue");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.get_attr("fill"), Some("blue"));
    }
}
