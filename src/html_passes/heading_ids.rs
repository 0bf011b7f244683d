//! Heading ids and the table-of-contents side channel.

use serde::Serialize;

use crate::hast::{Element, HNode};
use crate::html_passes::{heading_level, is_footnote_section};
use crate::slug::Slugger;

/// One heading of the compiled document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub slug: String,
    pub text: String,
}

/// Give every heading an id and return the headings in document order.
///
/// Existing ids are kept. The footnote section is skipped.
pub fn run(tree: &mut HNode) -> Vec<Heading> {
    let mut slugger = Slugger::new();
    let mut headings = Vec::new();
    if let Some(children) = tree.children_mut() {
        visit(children, &mut slugger, &mut headings);
    }
    headings
}

fn visit(children: &mut [HNode], slugger: &mut Slugger, out: &mut Vec<Heading>) {
    for child in children {
        let HNode::Element(el) = child else {
            continue;
        };
        if is_footnote_section(el) {
            continue;
        }
        match heading_level(el) {
            Some(level) => {
                if let Some(heading) = assign(el, level, slugger) {
                    out.push(heading);
                }
            }
            None => visit(&mut el.children, slugger, out),
        }
    }
}

fn assign(el: &mut Element, level: u8, slugger: &mut Slugger) -> Option<Heading> {
    let text = el.text_content().trim().to_string();
    let slug = match el.attr("id") {
        Some(id) => {
            let id = id.to_string();
            slugger.reserve(&id);
            id
        }
        None => {
            let slug = slugger.slug(&text)?;
            el.set_attr("id", slug.clone());
            slug
        }
    };
    Some(Heading { level, slug, text })
}
