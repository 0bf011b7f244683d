//! Attribution and caption lines at the end of a blockquote.
//!
//! ```markdown
//! > Stay hungry.
//! > — Stewart Brand (1974)
//! > Source: Whole Earth Catalog
//! ```
//!
//! A line starting with the marker (`—`) is an attribution, a line starting
//! with the caption prefix (`Source:`) is a caption. Either turns the quote
//! into a `figure`; a quote with neither is not touched.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::hast::split_classes;
use crate::mdast::{MdKind, Node};
use crate::options::BlockquoteOptions;

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://[^\s/$.?#()].[^\s()]*").expect("valid URL pattern"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid pattern"));

#[derive(Debug, Clone)]
pub struct Blockquote {
    options: BlockquoteOptions,
}

impl Blockquote {
    pub fn new(options: &BlockquoteOptions) -> Self {
        Blockquote {
            options: options.clone(),
        }
    }

    pub fn run(&self, tree: &mut Node) {
        self.process(tree);
    }

    fn process(&self, node: &mut Node) {
        for index in 0..node.children.len() {
            self.process(&mut node.children[index]);
            if node.children[index].kind == MdKind::Blockquote {
                let quote = std::mem::replace(&mut node.children[index], Node::new(MdKind::Root));
                node.children[index] = self.transform(quote);
            }
        }
    }

    /// Extract metadata lines and build the figure, or hand the quote back.
    fn transform(&self, mut quote: Node) -> Node {
        let opts = &self.options;
        let original = quote.clone();
        let mut attribution: Option<String> = None;
        let mut caption: Option<String> = None;

        let mut i = quote.children.len();
        while i > 0 {
            i -= 1;
            if !quote.children[i].is_paragraph() {
                continue;
            }
            let text = inline_text(&quote.children[i]);
            if text.trim().is_empty() {
                continue;
            }

            let marker_at = if attribution.is_some() {
                None
            } else {
                find_line_start(&text, &opts.marker)
            };
            let caption_at = if caption.is_some() {
                None
            } else {
                find_line_start(&text, &opts.caption_prefix)
            };
            let first_meta = match (marker_at, caption_at) {
                (None, None) => continue,
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
            };

            if let Some(at) = marker_at {
                let end = caption_at.filter(|c| *c > at).unwrap_or(text.len());
                let mut line = text[at..end].trim_start().to_string();
                if opts.remove_marker {
                    line = strip_leading(&line, &opts.marker);
                }
                attribution = Some(line.trim().to_string());
            }
            if let Some(at) = caption_at {
                let end = marker_at.filter(|m| *m > at).unwrap_or(text.len());
                let mut line = text[at..end].trim_start().to_string();
                if opts.remove_caption_prefix {
                    line = strip_leading(&line, &opts.caption_prefix);
                }
                caption = Some(line.trim().to_string());
            }

            let content = text[..first_meta].trim_end();
            if content.trim().is_empty() {
                quote.children.remove(i);
            } else {
                truncate_inline(&mut quote.children[i].children, content.len());
            }

            if attribution.is_some() && caption.is_some() {
                break;
            }
        }

        let attribution = attribution.filter(|a| !a.is_empty());
        let caption = caption.filter(|c| !c.is_empty());
        if attribution.is_none() && caption.is_none() {
            return original;
        }

        let mut figure_classes = split_classes(&opts.class_name_attribution_figure);
        if caption.is_some() {
            figure_classes.extend(split_classes(&opts.class_name_caption_figure));
        }

        let attribution_node = attribution.map(|text| {
            let visible = match URL.find(&text) {
                Some(url) => {
                    quote.data.cite = Some(url.as_str().to_string());
                    let removed = text.replacen(url.as_str(), "", 1);
                    WHITESPACE_RUN.replace_all(&removed, " ").trim().to_string()
                }
                None => text.clone(),
            };
            let (name, meta) = split_attribution(&visible);
            let mut lines = vec![Node::paragraph(vec![Node::text(name)])];
            if let Some(meta) = meta {
                lines.push(Node::paragraph(vec![Node::text(meta)]));
            }
            let tag = if caption.is_some() { "div" } else { "figcaption" };
            Node::container(
                tag,
                split_classes(&opts.class_name_attribution),
                vec![Node::container("div", Vec::new(), lines)],
            )
        });

        let caption_node = caption.map(|text| {
            let mut node = Node::paragraph(vec![Node::text(text)]);
            node.data.h_name = Some("figcaption".into());
            node.data.class_names = split_classes(&opts.class_name_caption);
            node
        });

        let mut children = vec![quote];
        children.extend(attribution_node);
        children.extend(caption_node);
        Node::container("figure", figure_classes, children)
    }
}

/// Byte offset of a line starting with `prefix`: the text start, or just
/// after a newline.
fn find_line_start(text: &str, prefix: &str) -> Option<usize> {
    if text.starts_with(prefix) {
        return Some(0);
    }
    text.find(&format!("\n{prefix}")).map(|at| at + 1)
}

fn strip_leading(value: &str, prefix: &str) -> String {
    let trimmed = value.trim_start();
    match trimmed.strip_prefix(prefix) {
        Some(rest) => rest.trim_start().to_string(),
        None => trimmed.to_string(),
    }
}

/// Split `Name (meta)` into its name and trailing parenthesised part.
fn split_attribution(text: &str) -> (String, Option<String>) {
    let trimmed = text.trim();
    let whole = (trimmed.to_string(), None);
    if !trimmed.ends_with(')') {
        return whole;
    }
    let Some(open) = trimmed.rfind('(') else {
        return whole;
    };
    let name = trimmed[..open].trim();
    let meta = trimmed[open + 1..trimmed.len() - 1].trim();
    if name.is_empty() || meta.is_empty() {
        return whole;
    }
    (name.to_string(), Some(meta.to_string()))
}

/// Visible text of inline content, inline code included.
fn inline_text(node: &Node) -> String {
    let mut out = String::new();
    push_inline_text(node, &mut out);
    out
}

fn push_inline_text(node: &Node, out: &mut String) {
    match &node.kind {
        MdKind::Text(value) | MdKind::InlineCode(value) => out.push_str(value),
        _ => node.children.iter().for_each(|c| push_inline_text(c, out)),
    }
}

/// Keep the first `budget` bytes of visible text, preserving formatting.
/// Returns the unused budget.
fn truncate_inline(children: &mut Vec<Node>, mut budget: usize) -> usize {
    let mut keep = 0;
    for child in children.iter_mut() {
        if budget == 0 {
            break;
        }
        match &mut child.kind {
            MdKind::Text(value) => {
                if value.len() > budget {
                    value.truncate(budget);
                    budget = 0;
                } else {
                    budget -= value.len();
                }
            }
            MdKind::InlineCode(value) => {
                if value.len() > budget {
                    break;
                }
                budget -= value.len();
            }
            _ if !child.children.is_empty() => {
                budget = truncate_inline(&mut child.children, budget);
            }
            _ => {}
        }
        keep += 1;
    }
    children.truncate(keep);
    budget
}
