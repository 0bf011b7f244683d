//! Table of contents under a `Contents` heading.
//!
//! The first heading whose whole text matches the configured pattern opens
//! the section. Everything up to the next heading of the same or a higher
//! rank is replaced by a nested list linking every later heading that has an
//! id. Nothing changes when no heading matches or nothing follows it.

use regex::Regex;

use crate::error::{Error, Result};
use crate::hast::{Element, HNode};
use crate::html_passes::{heading_level, is_footnote_section};
use crate::options::{HtmlPassKind, TocOptions};

#[derive(Debug, Clone)]
pub struct Toc {
    heading: Regex,
    max_depth: u8,
}

#[derive(Debug, Clone)]
struct Entry {
    level: u8,
    id: String,
    text: String,
}

impl Toc {
    pub fn new(options: &TocOptions) -> Result<Self> {
        let heading = Regex::new(&format!("(?i)^(?:{})$", options.heading)).map_err(|e| {
            Error::config(HtmlPassKind::Toc.name(), format!("invalid heading pattern: {e}"))
        })?;
        if !(1..=6).contains(&options.max_depth) {
            return Err(Error::config(
                HtmlPassKind::Toc.name(),
                "maxDepth must be between 1 and 6",
            ));
        }
        Ok(Toc {
            heading,
            max_depth: options.max_depth,
        })
    }

    pub fn run(&self, tree: &mut HNode) {
        if let Some(children) = tree.children_mut() {
            self.visit(children);
        }
    }

    /// Returns true once the section has been found, whether or not it was
    /// filled.
    fn visit(&self, children: &mut Vec<HNode>) -> bool {
        for i in 0..children.len() {
            let Some(el) = children[i].as_element() else {
                continue;
            };
            if is_footnote_section(el) {
                continue;
            }
            match heading_level(el) {
                Some(level) => {
                    if self.heading.is_match(el.text_content().trim()) {
                        self.fill(children, i, level);
                        return true;
                    }
                }
                None => {
                    if let HNode::Element(el) = &mut children[i]
                        && self.visit(&mut el.children)
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn fill(&self, children: &mut Vec<HNode>, at: usize, level: u8) {
        let end = children[at + 1..]
            .iter()
            .position(|n| n.as_element().and_then(heading_level).is_some_and(|l| l <= level))
            .map_or(children.len(), |p| at + 1 + p);

        let mut entries = Vec::new();
        self.collect(&children[end..], &mut entries);
        if entries.is_empty() {
            log::debug!("no headings to list under the table of contents");
            return;
        }

        let list = HNode::from(list(&entries));
        let replacement = if end == children.len() {
            vec![HNode::text("\n"), list]
        } else {
            vec![HNode::text("\n"), list, HNode::text("\n")]
        };
        children.splice(at + 1..end, replacement);
    }

    fn collect(&self, nodes: &[HNode], out: &mut Vec<Entry>) {
        for node in nodes {
            let Some(el) = node.as_element() else {
                continue;
            };
            if is_footnote_section(el) {
                continue;
            }
            match heading_level(el) {
                Some(level) => {
                    if level <= self.max_depth
                        && let Some(id) = el.attr("id")
                    {
                        out.push(Entry {
                            level,
                            id: id.to_string(),
                            text: el.text_content().trim().to_string(),
                        });
                    }
                }
                None => self.collect(&el.children, out),
            }
        }
    }
}

/// Nested `ul` for entries whose first item sets the list's level.
fn list(entries: &[Entry]) -> Element {
    let mut items = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        let entry = &entries[i];
        let nested_end = entries[i + 1..]
            .iter()
            .position(|e| e.level <= entry.level)
            .map_or(entries.len(), |p| i + 1 + p);

        let link = Element::new("a")
            .with_attr("href", format!("#{}", entry.id))
            .with_children(vec![HNode::text(entry.text.clone())]);
        let mut item = vec![link.into()];
        if nested_end > i + 1 {
            item.push(HNode::text("\n"));
            item.push(list(&entries[i + 1..nested_end]).into());
            item.push(HNode::text("\n"));
        }
        items.push(HNode::text("\n"));
        items.push(Element::new("li").with_children(item).into());
        i = nested_end;
    }
    items.push(HNode::text("\n"));
    Element::new("ul").with_children(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertOptions, to_hast};
    use crate::html_passes::heading_ids;
    use crate::parse::parse;
    use crate::render_html::to_html;
    use pretty_assertions::assert_eq;

    fn render_with(md: &str, options: &TocOptions) -> String {
        let mut tree = to_hast(parse(md), &ConvertOptions::default());
        heading_ids::run(&mut tree);
        Toc::new(options).unwrap().run(&mut tree);
        to_html(&tree)
    }

    fn render(md: &str) -> String {
        render_with(md, &TocOptions::default())
    }

    #[test]
    fn replaces_section_with_nested_list() {
        let html = render("# Doc\n\n## Contents\n\nstale\n\n## Alpha\n\n### Beta\n\n## Gamma");
        assert_eq!(
            html,
            "<h1 id=\"doc\">Doc</h1>\n<h2 id=\"contents\">Contents</h2>\n<ul>\n\
             <li><a href=\"#alpha\">Alpha</a>\n<ul>\n<li><a href=\"#beta\">Beta</a></li>\n</ul>\n</li>\n\
             <li><a href=\"#gamma\">Gamma</a></li>\n</ul>\n\
             <h2 id=\"alpha\">Alpha</h2>\n<h3 id=\"beta\">Beta</h3>\n<h2 id=\"gamma\">Gamma</h2>"
        );
    }

    #[test]
    fn heading_at_the_end_gets_nothing() {
        let source = "## Intro\n\ntext\n\n## Contents";
        assert_eq!(
            render(source),
            "<h2 id=\"intro\">Intro</h2>\n<p>text</p>\n<h2 id=\"contents\">Contents</h2>"
        );
    }

    #[test]
    fn no_matching_heading_is_a_no_op() {
        let html = render("## Alpha\n\n## Beta");
        assert!(!html.contains("<ul>"), "{html}");
    }

    #[test]
    fn depth_and_pattern_are_configurable() {
        let options = TocOptions {
            heading: "toc|table of contents".into(),
            max_depth: 2,
        };
        let html = render_with("## Table of Contents\n\n## Alpha\n\n### Beta", &options);
        assert!(html.contains("<li><a href=\"#alpha\">Alpha</a></li>"), "{html}");
        assert!(!html.contains("href=\"#beta\""), "{html}");
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let options = TocOptions {
            heading: "(".into(),
            ..TocOptions::default()
        };
        let err = Toc::new(&options).unwrap_err();
        assert_eq!(err.pass(), Some("toc"));
    }
}
