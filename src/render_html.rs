//! HTML fragment serializer.
//!
//! Turns the HTML-structure tree into a string. Text and attribute values are
//! escaped; `Raw` nodes are emitted verbatim, so the converter decides whether
//! embedded HTML survives at all.

use crate::hast::{Element, HNode};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// Render a tree (or any subtree) to an HTML string.
pub fn to_html(node: &HNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &HNode, out: &mut String) {
    match node {
        HNode::Root(children) => children.iter().for_each(|c| write_node(c, out)),
        HNode::Element(el) => write_element(el, out),
        HNode::Text(value) => out.push_str(&escape_text(value)),
        HNode::Comment(value) => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
        HNode::Raw(value) => out.push_str(value),
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag_name);
    if !el.class_names.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&escape_attr(&el.class_names.join(" ")));
        out.push('"');
    }
    for (name, value) in &el.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag_name.as_str()) {
        return;
    }
    el.children.iter().for_each(|c| write_node(c, out));
    out.push_str("</");
    out.push_str(&el.tag_name);
    out.push('>');
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
