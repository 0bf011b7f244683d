//! Markdown source to markdown-structure tree.
//!
//! `pulldown-cmark` does the CommonMark/GFM work; this module folds its
//! offset-annotated event stream into owned [`Node`]s shaped the way the
//! passes expect: adjacent text merged (soft breaks kept as `\n`), tight list
//! items given a synthetic paragraph, code block text collected into the node.

use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag};

use crate::mdast::{ColumnAlign, MdKind, Node, Position};

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Parse a document body (front matter already removed) into a tree.
pub fn parse(source: &str) -> Node {
    let mut builder = TreeBuilder::new(source.len());
    for (event, range) in Parser::new_ext(source, parser_options()).into_offset_iter() {
        builder.event(event, range);
    }
    builder.finish()
}

struct Frame {
    node: Node,
    /// Children are spliced into the parent on close (tags we do not model).
    transparent: bool,
    /// Whether the last child is a synthetic paragraph still taking inline content.
    open_inline: bool,
    /// Set on list items when the parser produced a real paragraph.
    loose: bool,
}

impl Frame {
    fn new(node: Node) -> Self {
        Frame {
            node,
            transparent: false,
            open_inline: false,
            loose: false,
        }
    }
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new(len: usize) -> Self {
        let mut root = Node::new(MdKind::Root);
        root.position = Some(Position { start: 0, end: len });
        TreeBuilder {
            stack: vec![Frame::new(root)],
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        let position = Some(Position {
            start: range.start,
            end: range.end,
        });
        match event {
            Event::Start(tag) => self.open(tag, position),
            Event::End(_) => self.close(),
            Event::Text(text) => self.push_text(&text, position),
            Event::Code(code) => self.push_inline(Node {
                position,
                ..Node::new(MdKind::InlineCode(code.to_string()))
            }),
            Event::Html(html) => self.push_html(&html, position),
            Event::InlineHtml(html) => self.push_inline(Node {
                position,
                ..Node::new(MdKind::Html(html.to_string()))
            }),
            Event::FootnoteReference(label) => self.push_inline(Node {
                position,
                ..Node::new(MdKind::FootnoteReference(label.to_string()))
            }),
            Event::SoftBreak => self.push_text("\n", position),
            Event::HardBreak => self.push_inline(Node {
                position,
                ..Node::new(MdKind::Break)
            }),
            Event::Rule => self.push_block(Node {
                position,
                ..Node::new(MdKind::ThematicBreak)
            }),
            Event::TaskListMarker(checked) => {
                if let Some(frame) = self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|f| matches!(f.node.kind, MdKind::ListItem { .. }))
                {
                    frame.node.kind = MdKind::ListItem {
                        checked: Some(checked),
                    };
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>, position: Option<Position>) {
        let kind = match tag {
            Tag::Paragraph => {
                if let Some(parent) = self.stack.last_mut()
                    && matches!(parent.node.kind, MdKind::ListItem { .. })
                {
                    parent.loose = true;
                }
                MdKind::Paragraph
            }
            Tag::Heading { level, .. } => MdKind::Heading(level as u8),
            Tag::BlockQuote(_) => MdKind::Blockquote,
            Tag::CodeBlock(kind) => {
                let (lang, meta) = match kind {
                    CodeBlockKind::Fenced(info) => split_info(&info),
                    CodeBlockKind::Indented => (None, None),
                };
                MdKind::Code {
                    lang,
                    meta,
                    value: String::new(),
                }
            }
            Tag::HtmlBlock => MdKind::Html(String::new()),
            Tag::List(start) => MdKind::List {
                ordered: start.is_some(),
                start,
                spread: false,
            },
            Tag::Item => MdKind::ListItem { checked: None },
            Tag::FootnoteDefinition(label) => MdKind::FootnoteDefinition(label.to_string()),
            Tag::Table(aligns) => MdKind::Table(aligns.iter().map(column_align).collect()),
            Tag::TableHead => MdKind::TableRow { head: true },
            Tag::TableRow => MdKind::TableRow { head: false },
            Tag::TableCell => MdKind::TableCell,
            Tag::Emphasis => MdKind::Emphasis,
            Tag::Strong => MdKind::Strong,
            Tag::Strikethrough => MdKind::Delete,
            Tag::Link { dest_url, title, .. } => MdKind::Link {
                url: dest_url.to_string(),
                title: non_empty(&title),
            },
            Tag::Image { dest_url, title, .. } => MdKind::Image {
                url: dest_url.to_string(),
                alt: String::new(),
                title: non_empty(&title),
            },
            _ => {
                let mut frame = Frame::new(Node::new(MdKind::Container));
                frame.transparent = true;
                self.stack.push(frame);
                return;
            }
        };
        if is_phrasing(&kind) {
            self.ensure_inline_paragraph();
        } else {
            self.close_inline_paragraph();
        }
        let mut node = Node::new(kind);
        node.position = position;
        self.stack.push(Frame::new(node));
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        if frame.transparent {
            for child in frame.node.children {
                self.append(child);
            }
            return;
        }
        let loose = frame.loose;
        let mut node = frame.node;
        match &mut node.kind {
            MdKind::Code { value, .. } => {
                if value.ends_with('\n') {
                    value.pop();
                }
            }
            MdKind::Image { alt, .. } => {
                *alt = node.children.iter().map(Node::plain_text).collect();
                node.children.clear();
            }
            MdKind::ListItem { .. } => {
                if let Some(parent) = self.stack.last_mut()
                    && let MdKind::List { spread, .. } = &mut parent.node.kind
                {
                    *spread |= loose;
                }
            }
            _ => {}
        }
        self.append(node);
    }

    /// Append a finished node to the open frame, routing inline content of
    /// list items through their synthetic paragraph.
    fn append(&mut self, node: Node) {
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        if parent.open_inline
            && let Some(last) = parent.node.children.last_mut()
        {
            push_merged(&mut last.children, node);
            return;
        }
        push_merged(&mut parent.node.children, node);
    }

    fn push_text(&mut self, text: &str, position: Option<Position>) {
        if let Some(frame) = self.stack.last_mut() {
            match &mut frame.node.kind {
                MdKind::Code { value, .. } | MdKind::Html(value) => {
                    value.push_str(text);
                    return;
                }
                _ => {}
            }
        }
        self.push_inline(Node {
            position,
            ..Node::text(text)
        });
    }

    fn push_html(&mut self, html: &str, position: Option<Position>) {
        if let Some(frame) = self.stack.last_mut()
            && let MdKind::Html(value) = &mut frame.node.kind
        {
            value.push_str(html);
            return;
        }
        self.push_block(Node {
            position,
            ..Node::new(MdKind::Html(html.to_string()))
        });
    }

    fn push_inline(&mut self, node: Node) {
        self.ensure_inline_paragraph();
        self.append(node);
    }

    fn push_block(&mut self, node: Node) {
        self.close_inline_paragraph();
        self.append(node);
    }

    fn ensure_inline_paragraph(&mut self) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        if !matches!(frame.node.kind, MdKind::ListItem { .. }) || frame.open_inline {
            return;
        }
        frame.node.children.push(Node::paragraph(Vec::new()));
        frame.open_inline = true;
    }

    fn close_inline_paragraph(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.open_inline = false;
        }
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .map(|frame| frame.node)
            .unwrap_or_else(|| Node::new(MdKind::Root))
    }
}

/// Push a child, merging it into a preceding text sibling when both are text.
fn push_merged(children: &mut Vec<Node>, node: Node) {
    if let MdKind::Text(value) = &node.kind
        && let Some(last) = children.last_mut()
        && let MdKind::Text(prev) = &mut last.kind
    {
        prev.push_str(value);
        if let (Some(prev_pos), Some(pos)) = (&mut last.position, node.position) {
            prev_pos.end = pos.end;
        }
        return;
    }
    children.push(node);
}

fn is_phrasing(kind: &MdKind) -> bool {
    matches!(
        kind,
        MdKind::Emphasis
            | MdKind::Strong
            | MdKind::Delete
            | MdKind::Link { .. }
            | MdKind::Image { .. }
    )
}

/// Split a fence info string into language and free-form meta.
fn split_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    if info.is_empty() {
        return (None, None);
    }
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (Some(lang.to_string()), non_empty(meta.trim())),
        None => (Some(info.to_string()), None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn column_align(align: &Alignment) -> ColumnAlign {
    match align {
        Alignment::None => ColumnAlign::None,
        Alignment::Left => ColumnAlign::Left,
        Alignment::Center => ColumnAlign::Center,
        Alignment::Right => ColumnAlign::Right,
    }
}
