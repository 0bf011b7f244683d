//! `[center]…[/center]` alignment blocks.
//!
//! Two forms are recognized among sibling blocks:
//!
//! - inline: one paragraph that starts with `[align]` and ends with
//!   `[/align]` is wrapped in a `div` with the text-alignment class;
//! - block: a paragraph holding only `[align]` opens a range that runs to a
//!   matching `[/align]` paragraph, and everything between is moved under a
//!   flex wrapper.
//!
//! `align` is `left`, `center` or `right`, optionally with `:row`. A marker
//! preceded by a backslash stays literal text. An opening marker without a
//! matching close is left untouched.

use crate::hast::split_classes;
use crate::mdast::{MdKind, Node};
use crate::options::AlignOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Left,
    Center,
    Right,
}

const ALIGNMENTS: [(Alignment, &str); 3] = [
    (Alignment::Left, "left"),
    (Alignment::Center, "center"),
    (Alignment::Right, "right"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Inline,
    Block,
    Row,
}

#[derive(Debug, Clone)]
struct Marker {
    align: Alignment,
    layout: Layout,
    /// The paragraph holds nothing but the marker.
    marker_only: bool,
    tag: String,
}

fn start_tags() -> impl Iterator<Item = (Alignment, Layout, String)> {
    ALIGNMENTS.iter().flat_map(|(align, name)| {
        [
            (*align, Layout::Block, format!("[{name}]")),
            (*align, Layout::Row, format!("[{name}:row]")),
        ]
    })
}

fn end_tags() -> impl Iterator<Item = (Alignment, String)> {
    ALIGNMENTS.iter().flat_map(|(align, name)| {
        [
            (*align, format!("[/{name}]")),
            (*align, format!("[/{name}:row]")),
        ]
    })
}

fn is_known_tag(s: &str) -> bool {
    start_tags().any(|(_, _, tag)| tag == s) || end_tags().any(|(_, tag)| tag == s)
}

/// Configured alignment pass.
#[derive(Debug, Clone)]
pub struct Align {
    text: [Vec<String>; 3],
    block: [Vec<String>; 3],
    row: [Vec<String>; 3],
}

impl Align {
    pub fn new(options: &AlignOptions) -> Self {
        Align {
            text: [
                split_classes(&options.left),
                split_classes(&options.center),
                split_classes(&options.right),
            ],
            block: [
                split_classes(&options.left_block),
                split_classes(&options.center_block),
                split_classes(&options.right_block),
            ],
            row: [
                split_classes(&options.left_row_block),
                split_classes(&options.center_row_block),
                split_classes(&options.right_row_block),
            ],
        }
    }

    pub fn run(&self, tree: &mut Node, source: &str) {
        self.process(tree, source);
    }

    fn process(&self, node: &mut Node, source: &str) {
        let mut index = 0;
        while index < node.children.len() {
            if self.try_wrap(&mut node.children, index, source) {
                // The wrapper and its contents are not revisited.
                index += 1;
                continue;
            }
            self.process(&mut node.children[index], source);
            index += 1;
        }
    }

    fn try_wrap(&self, children: &mut Vec<Node>, start: usize, source: &str) -> bool {
        let Some(open) = detect_start(&mut children[start], source) else {
            return false;
        };
        // A lone closing tag never opens a range.
        if open.marker_only && open.layout == Layout::Inline {
            return false;
        }

        for end in start..children.len() {
            let Some(close) = detect_end(&mut children[end], source) else {
                continue;
            };
            if close.align != open.align {
                continue;
            }
            if end == start && open.marker_only && close.marker_only {
                continue;
            }

            let mut segment: Vec<Node> = children.drain(start..=end).collect();
            if open.marker_only {
                segment.remove(0);
            } else {
                strip_start(&mut segment[0], &open.tag);
                if segment.first().is_some_and(is_empty_paragraph) {
                    segment.remove(0);
                }
            }
            if close.marker_only {
                segment.pop();
            } else {
                if let Some(last) = segment.last_mut() {
                    strip_end(last, &close.tag);
                }
                if segment.last().is_some_and(is_empty_paragraph) {
                    segment.pop();
                }
            }

            if segment.is_empty() {
                return true;
            }

            let block_range = open.marker_only || close.marker_only;
            let classes = match (block_range, open.layout) {
                (_, Layout::Row) => &self.row,
                (true, _) => &self.block,
                (false, _) => &self.text,
            };
            let wrapper = Node::container("div", classes[open.align as usize].clone(), segment);
            children.insert(start, wrapper);
            return true;
        }

        log::debug!("unterminated alignment marker `{}` left as text", open.tag);
        false
    }
}

fn first_text(paragraph: &mut Node) -> Option<&mut Node> {
    paragraph
        .children
        .iter_mut()
        .find(|c| matches!(c.kind, MdKind::Text(_)))
}

fn last_text(paragraph: &mut Node) -> Option<&mut Node> {
    paragraph
        .children
        .iter_mut()
        .rev()
        .find(|c| matches!(c.kind, MdKind::Text(_)))
}

fn set_text(node: &mut Node, value: String) {
    node.kind = MdKind::Text(value);
}

/// Byte offset `at` in the source is a backslash.
fn backslash_at(source: &str, at: usize) -> bool {
    source.as_bytes().get(at) == Some(&b'\\')
}

/// The text node at `start` was written with a leading escape.
fn escaped_before(node: &Node, source: &str) -> bool {
    node.position.is_some_and(|pos| {
        backslash_at(source, pos.start) || (pos.start > 0 && backslash_at(source, pos.start - 1))
    })
}

/// A paragraph whose only child is a marker tag.
fn detect_marker_only(node: &mut Node, source: &str) -> Option<Marker> {
    if !node.is_paragraph() || node.children.len() != 1 {
        return None;
    }
    let only = &mut node.children[0];
    if only.data.escaped {
        return None;
    }
    let value = only.text_value()?.to_string();
    let trimmed = value.trim();

    if let Some(candidate) = trimmed.strip_prefix('\\')
        && is_known_tag(candidate)
    {
        let unescaped = value.replacen(trimmed, candidate, 1);
        set_text(only, unescaped);
        only.data.escaped = true;
        return None;
    }
    if escaped_before(only, source) {
        return None;
    }

    if let Some((align, layout, tag)) = start_tags().find(|(_, _, tag)| tag == trimmed) {
        return Some(Marker {
            align,
            layout,
            marker_only: true,
            tag,
        });
    }
    end_tags()
        .find(|(_, tag)| tag == trimmed)
        .map(|(align, tag)| Marker {
            align,
            layout: Layout::Inline,
            marker_only: true,
            tag,
        })
}

fn detect_start(node: &mut Node, source: &str) -> Option<Marker> {
    if let Some(marker) = detect_marker_only(node, source) {
        return Some(marker);
    }
    if !node.is_paragraph() {
        return None;
    }
    let first = first_text(node)?;
    if first.data.escaped {
        return None;
    }
    let value = first.text_value()?.to_string();

    if let Some(rest) = value.strip_prefix('\\')
        && (start_tags().any(|(_, _, tag)| rest.starts_with(&tag))
            || end_tags().any(|(_, tag)| rest.starts_with(&tag)))
    {
        set_text(first, rest.to_string());
        first.data.escaped = true;
        return None;
    }
    if escaped_before(first, source) {
        if start_tags().any(|(_, _, tag)| value.starts_with(&tag)) {
            first.data.escaped = true;
        }
        return None;
    }

    let (align, layout, tag) = start_tags().find(|(_, _, tag)| value.starts_with(tag))?;
    Some(Marker {
        align,
        layout: if layout == Layout::Row { Layout::Row } else { Layout::Inline },
        marker_only: false,
        tag,
    })
}

fn detect_end(node: &mut Node, source: &str) -> Option<Marker> {
    if let Some(marker) = detect_marker_only(node, source) {
        return Some(marker);
    }
    if !node.is_paragraph() {
        return None;
    }
    let last = last_text(node)?;
    if last.data.escaped {
        return None;
    }
    let value = last.text_value()?.to_string();

    if let Some(tag) = end_tags()
        .map(|(_, tag)| tag)
        .find(|tag| value.ends_with(&format!("\\{tag}")))
    {
        let head = &value[..value.len() - tag.len() - 1];
        set_text(last, format!("{head}{tag}"));
        last.data.escaped = true;
        return None;
    }

    let (align, tag) = end_tags().find(|(_, tag)| value.ends_with(tag))?;
    let escaped = last.position.is_some_and(|pos| {
        pos.end > tag.len() && backslash_at(source, pos.end - tag.len() - 1)
    });
    if escaped {
        last.data.escaped = true;
        return None;
    }
    Some(Marker {
        align,
        layout: Layout::Inline,
        marker_only: false,
        tag,
    })
}

fn strip_start(paragraph: &mut Node, tag: &str) {
    let Some(index) = paragraph
        .children
        .iter()
        .position(|c| matches!(c.kind, MdKind::Text(_)))
    else {
        return;
    };
    let Some(rest) = paragraph.children[index]
        .text_value()
        .and_then(|v| v.strip_prefix(tag))
        .map(str::to_string)
    else {
        return;
    };
    if rest.is_empty() {
        paragraph.children.remove(index);
    } else {
        set_text(&mut paragraph.children[index], rest);
    }
}

fn strip_end(paragraph: &mut Node, tag: &str) {
    let Some(index) = paragraph
        .children
        .iter()
        .rposition(|c| matches!(c.kind, MdKind::Text(_)))
    else {
        return;
    };
    let Some(head) = paragraph.children[index]
        .text_value()
        .and_then(|v| v.strip_suffix(tag))
        .map(str::to_string)
    else {
        return;
    };
    if head.is_empty() {
        paragraph.children.remove(index);
    } else {
        set_text(&mut paragraph.children[index], head);
    }
}

fn is_empty_paragraph(node: &Node) -> bool {
    node.is_paragraph()
        && node
            .children
            .iter()
            .all(|c| c.text_value().is_some_and(|v| v.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Node {
        let mut tree = parse(source);
        Align::new(&AlignOptions::default()).run(&mut tree, source);
        tree
    }

    fn classes(node: &Node) -> Vec<&str> {
        node.data.class_names.iter().map(String::as_str).collect()
    }

    #[test]
    fn inline_form_wraps_one_paragraph() {
        let tree = run("[center]Hello *world*[/center]");
        let wrapper = &tree.children[0];
        assert_eq!(wrapper.kind, MdKind::Container);
        assert_eq!(classes(wrapper), vec!["text-center"]);
        let para = &wrapper.children[0];
        assert!(para.is_paragraph());
        assert_eq!(para.children[0].text_value(), Some("Hello "));
        assert_eq!(para.children[1].kind, MdKind::Emphasis);
        assert_eq!(para.children.len(), 2);
    }

    #[test]
    fn block_form_reparents_siblings_in_order() {
        let tree = run("[center]\n\n## Title\n\nSome text.\n\n- one\n- two\n\n[/center]\n");
        assert_eq!(tree.children.len(), 1);
        let wrapper = &tree.children[0];
        assert_eq!(classes(wrapper), vec!["flex", "flex-col", "items-center"]);
        let kinds: Vec<_> = wrapper.children.iter().map(|c| &c.kind).collect();
        assert!(matches!(kinds[0], MdKind::Heading(2)));
        assert!(matches!(kinds[1], MdKind::Paragraph));
        assert!(matches!(kinds[2], MdKind::List { .. }));
        assert_eq!(wrapper.children[2].children.len(), 2);
    }

    #[test]
    fn row_layout_uses_row_classes() {
        let tree = run("[right:row]\n\nA\n\nB\n\n[/right:row]\n");
        assert_eq!(classes(&tree.children[0]), vec!["flex", "justify-end"]);
        assert_eq!(tree.children[0].children.len(), 2);
    }

    #[test]
    fn escaped_marker_is_literal_for_every_alignment() {
        for name in ["left", "center", "right"] {
            let source = format!("\\[{name}]x[/{name}]");
            let tree = run(&source);
            let para = &tree.children[0];
            assert!(para.is_paragraph(), "{name}: {para:?}");
            assert_eq!(para.plain_text(), format!("[{name}]x[/{name}]"));
        }
    }

    #[test]
    fn unterminated_marker_is_left_alone() {
        let tree = run("[center]\n\nText without a close.\n");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].plain_text(), "[center]");
    }

    #[test]
    fn mismatched_close_does_not_wrap() {
        let tree = run("[center]\n\nText\n\n[/left]\n");
        assert_eq!(tree.children.len(), 3);
        assert!(tree.children.iter().all(Node::is_paragraph));
    }

    #[test]
    fn custom_classes_apply() {
        let options = AlignOptions {
            center: "mx-auto  prose".into(),
            ..AlignOptions::default()
        };
        let source = "[center]x[/center]";
        let mut tree = parse(source);
        Align::new(&options).run(&mut tree, source);
        assert_eq!(classes(&tree.children[0]), vec!["mx-auto", "prose"]);
    }

    #[test]
    fn nested_containers_are_processed() {
        let tree = run("> [left]quoted[/left]\n");
        let quote = &tree.children[0];
        assert_eq!(quote.kind, MdKind::Blockquote);
        assert_eq!(classes(&quote.children[0]), vec!["text-left"]);
    }
}
