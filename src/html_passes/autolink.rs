//! Anchor links in front of headings.

use crate::hast::{Element, HNode};
use crate::html_passes::{heading_level, is_footnote_section};

const ANCHOR_TEXT: &str = "\u{1f517}";

pub fn run(tree: &mut HNode) {
    if let Some(children) = tree.children_mut() {
        visit(children);
    }
}

fn visit(children: &mut [HNode]) {
    for child in children {
        let HNode::Element(el) = child else {
            continue;
        };
        if is_footnote_section(el) {
            continue;
        }
        if heading_level(el).is_none() {
            visit(&mut el.children);
            continue;
        }
        let Some(id) = el.attr("id").map(str::to_string) else {
            continue;
        };
        if el.children.first().is_some_and(is_anchor) {
            continue;
        }
        el.children.insert(0, anchor(&id).into());
    }
}

fn anchor(id: &str) -> Element {
    Element::new("a")
        .with_classes(&["heading-anchor"])
        .with_attr("aria-hidden", "true")
        .with_attr("tabindex", "-1")
        .with_attr("href", format!("#{id}"))
        .with_children(vec![
            Element::new("span")
                .with_classes(&["anchor-link"])
                .with_children(vec![HNode::text(ANCHOR_TEXT)])
                .into(),
        ])
}

fn is_anchor(node: &HNode) -> bool {
    matches!(node, HNode::Element(el) if el.tag_name == "a" && el.has_class("heading-anchor"))
}
