//! HTML-structure tree.
//!
//! The class list is kept apart from the other attributes so passes can append
//! to it without string surgery. Attributes keep insertion order, which is the
//! order they are serialized in.

#[derive(Debug, Clone, PartialEq)]
pub enum HNode {
    Root(Vec<HNode>),
    Element(Element),
    Text(String),
    Comment(String),
    /// Embedded HTML passed through verbatim by the serializer.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag_name: String,
    pub class_names: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<HNode>,
}

impl HNode {
    pub fn text(value: impl Into<String>) -> Self {
        HNode::Text(value.into())
    }

    pub fn children(&self) -> &[HNode] {
        match self {
            HNode::Root(children) => children,
            HNode::Element(el) => &el.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<HNode>> {
        match self {
            HNode::Root(children) => Some(children),
            HNode::Element(el) => Some(&mut el.children),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            HNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, tag: &str) -> bool {
        matches!(self, HNode::Element(el) if el.tag_name == tag)
    }

    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, HNode::Text(value) if value.trim().is_empty())
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        push_text(self, &mut out);
        out
    }
}

fn push_text(node: &HNode, out: &mut String) {
    match node {
        HNode::Text(value) => out.push_str(value),
        HNode::Root(children) => children.iter().for_each(|c| push_text(c, out)),
        HNode::Element(el) => el.children.iter().for_each(|c| push_text(c, out)),
        HNode::Comment(_) | HNode::Raw(_) => {}
    }
}

impl From<Element> for HNode {
    fn from(el: Element) -> Self {
        HNode::Element(el)
    }
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Element {
            tag_name: tag_name.into(),
            ..Element::default()
        }
    }

    pub fn with_children(mut self, children: Vec<HNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_classes<S: AsRef<str>>(mut self, classes: &[S]) -> Self {
        self.add_classes(classes);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_names.iter().any(|c| c == class)
    }

    /// Append classes after any already present, skipping duplicates.
    pub fn add_classes<S: AsRef<str>>(&mut self, classes: &[S]) {
        for class in classes {
            let class = class.as_ref();
            if !class.is_empty() && !self.has_class(class) {
                self.class_names.push(class.to_string());
            }
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| push_text(c, &mut out));
        out
    }
}

/// Split a whitespace-separated class string into tokens.
pub fn split_classes(classes: &str) -> Vec<String> {
    classes.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_classes_appends_without_duplicates() {
        let mut el = Element::new("p").with_classes(&["a", "b"]);
        el.add_classes(&["b", "c", ""]);
        assert_eq!(el.class_names, vec!["a", "b", "c"]);
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut el = Element::new("a").with_attr("href", "#x").with_attr("id", "y");
        el.set_attr("href", "#z");
        assert_eq!(
            el.attributes,
            vec![("href".to_string(), "#z".to_string()), ("id".to_string(), "y".to_string())]
        );
    }

    #[test]
    fn text_content_ignores_raw_and_comments() {
        let node = HNode::Element(Element::new("p").with_children(vec![
            HNode::text("a"),
            HNode::Raw("<b>x</b>".into()),
            HNode::Comment("c".into()),
            HNode::Element(Element::new("em").with_children(vec![HNode::text("b")])),
        ]));
        assert_eq!(node.text_content(), "ab");
    }

    #[test]
    fn split_classes_collapses_whitespace() {
        assert_eq!(split_classes("  flex   flex-col "), vec!["flex", "flex-col"]);
        assert!(split_classes("   ").is_empty());
    }
}
