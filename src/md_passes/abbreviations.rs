//! Abbreviations defined with `*[ABBR]: Expansion` lines.
//!
//! A paragraph made only of definition lines is removed from the document.
//! Every whole-word use of a defined abbreviation elsewhere becomes an
//! [`MdKind::Abbr`] node, which renders as `<abbr title="Expansion">`.
//! Later definitions of the same abbreviation win.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::mdast::{MdKind, Node};
use crate::options::AbbreviationOptions;

static DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\[([^\]]+)\]:\s*(.+)$").expect("valid abbreviation pattern"));

#[derive(Debug, Clone)]
pub struct Abbreviations {
    expand_first: bool,
}

impl Abbreviations {
    pub fn new(options: &AbbreviationOptions) -> Self {
        Abbreviations {
            expand_first: options.expand_first,
        }
    }

    pub fn run(&self, tree: &mut Node) {
        let mut definitions = HashMap::new();
        collect(tree, &mut definitions);
        if definitions.is_empty() {
            return;
        }
        let mut abbrs: Vec<(String, String)> = definitions.into_iter().collect();
        abbrs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let mut expanded = Vec::new();
        self.replace(tree, &abbrs, &mut expanded);
    }

    fn replace(&self, node: &mut Node, abbrs: &[(String, String)], expanded: &mut Vec<String>) {
        let mut i = 0;
        while i < node.children.len() {
            let child = &mut node.children[i];
            match &child.kind {
                MdKind::Text(value) => {
                    if let Some(parts) = self.split(value, abbrs, expanded) {
                        let count = parts.len();
                        node.children.splice(i..=i, parts);
                        i += count;
                        continue;
                    }
                }
                MdKind::Abbr { .. } => {}
                _ => self.replace(child, abbrs, expanded),
            }
            i += 1;
        }
    }

    /// Split one text value around abbreviation uses; `None` when there are none.
    fn split(
        &self,
        text: &str,
        abbrs: &[(String, String)],
        expanded: &mut Vec<String>,
    ) -> Option<Vec<Node>> {
        let mut found: Vec<(usize, usize, usize)> = Vec::new();
        for (index, (abbr, _)) in abbrs.iter().enumerate() {
            for (start, _) in text.match_indices(abbr.as_str()) {
                let end = start + abbr.len();
                let overlaps = found.iter().any(|&(s, e, _)| start < e && end > s);
                if !overlaps && is_boundary(text, start, end) {
                    found.push((start, end, index));
                }
            }
        }
        if found.is_empty() {
            return None;
        }
        found.sort_by_key(|&(start, _, _)| start);

        let mut parts = Vec::new();
        let mut last = 0;
        for (start, end, index) in found {
            let (abbr, title) = &abbrs[index];
            if start > last {
                parts.push(Node::text(&text[last..start]));
            }
            let node = Node::with_children(
                MdKind::Abbr {
                    title: title.clone(),
                },
                vec![Node::text(abbr.as_str())],
            );
            if self.expand_first && !expanded.contains(abbr) {
                expanded.push(abbr.clone());
                parts.push(Node::text(format!("{title} (")));
                parts.push(node);
                parts.push(Node::text(")"));
            } else {
                parts.push(node);
            }
            last = end;
        }
        if last < text.len() {
            parts.push(Node::text(&text[last..]));
        }
        Some(parts)
    }
}

/// An abbreviation must not touch a letter on either side.
fn is_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphabetic()) && !after.is_some_and(|c| c.is_ascii_alphabetic())
}

/// Remove definition paragraphs, recording their definitions.
fn collect(node: &mut Node, out: &mut HashMap<String, String>) {
    let mut i = 0;
    while i < node.children.len() {
        if let Some(defs) = definitions(&node.children[i]) {
            out.extend(defs);
            node.children.remove(i);
            continue;
        }
        collect(&mut node.children[i], out);
        i += 1;
    }
}

/// Definitions in `node` when it is a paragraph of definition lines only.
fn definitions(node: &Node) -> Option<Vec<(String, String)>> {
    if !node.is_paragraph() || node.children.len() != 1 {
        return None;
    }
    let text = node.children[0].text_value()?;
    let mut defs = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let caps = DEFINITION.captures(line)?;
        defs.push((caps[1].to_string(), caps[2].trim().to_string()));
    }
    if defs.is_empty() { None } else { Some(defs) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertOptions, to_hast};
    use crate::parse::parse;
    use crate::render_html::to_html;
    use pretty_assertions::assert_eq;

    fn render_with(source: &str, expand_first: bool) -> String {
        let mut tree = parse(source);
        Abbreviations::new(&AbbreviationOptions { expand_first }).run(&mut tree);
        to_html(&to_hast(tree, &ConvertOptions::default()))
    }

    fn render(source: &str) -> String {
        render_with(source, false)
    }

    #[test]
    fn wraps_uses_and_drops_definitions() {
        let html = render("The HTML spec and HTML again.\n\n*[HTML]: Hyper Text Markup Language");
        assert_eq!(
            html,
            "<p>The <abbr title=\"Hyper Text Markup Language\">HTML</abbr> spec and \
             <abbr title=\"Hyper Text Markup Language\">HTML</abbr> again.</p>"
        );
    }

    #[test]
    fn abbreviations_ending_with_punctuation() {
        let html = render("A.B.C. and C-D%F. foo\n\n*[A.B.C.]: ref1\n*[C-D%F.]: ref2");
        assert!(html.contains("<abbr title=\"ref1\">A.B.C.</abbr>"), "{html}");
        assert!(html.contains("<abbr title=\"ref2\">C-D%F.</abbr>"), "{html}");
    }

    #[test]
    fn partial_words_do_not_match() {
        for abbr in ["AB", "BC", "B"] {
            let html = render(&format!("ABC ABC ABC\n\n*[{abbr}]: ref1"));
            assert!(!html.contains("<abbr"), "{abbr}: {html}");
        }
    }

    #[test]
    fn definitions_in_separate_paragraphs() {
        let html = render("Here is abc and def\n\n*[abc]: A B C\n\n*[def]: D E F");
        assert_eq!(
            html,
            "<p>Here is <abbr title=\"A B C\">abc</abbr> and <abbr title=\"D E F\">def</abbr></p>"
        );
    }

    #[test]
    fn longest_abbreviation_wins() {
        let html = render("W3C HTML5 and HTML\n\n*[HTML]: markup\n*[HTML5]: markup five");
        assert!(html.contains("<abbr title=\"markup five\">HTML5</abbr>"), "{html}");
        assert!(html.contains("and <abbr title=\"markup\">HTML</abbr>"), "{html}");
    }

    #[test]
    fn expand_first_use_only() {
        let html = render_with("CSS and CSS\n\n*[CSS]: Cascading Style Sheets", true);
        assert_eq!(
            html,
            "<p>Cascading Style Sheets (<abbr title=\"Cascading Style Sheets\">CSS</abbr>) and \
             <abbr title=\"Cascading Style Sheets\">CSS</abbr></p>"
        );
    }

    #[test]
    fn mixed_paragraph_is_not_a_definition() {
        let html = render("*[X]: y\nnot a definition");
        assert!(html.contains("not a definition"), "{html}");
        assert!(!html.contains("<abbr"), "{html}");
    }

    #[test]
    fn inline_code_is_untouched() {
        let html = render("`HTML` and HTML\n\n*[HTML]: markup");
        assert!(html.contains("<code>HTML</code> and <abbr"), "{html}");
    }
}
