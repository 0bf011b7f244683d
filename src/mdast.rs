//! Markdown-structure tree.
//!
//! Nodes exclusively own their children. Cross-pass annotations travel in
//! [`NodeData`], which is consumed when the tree is lowered to HTML and never
//! serialized directly.

/// Byte span of a node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

/// Column alignment of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlign {
    None,
    Left,
    Center,
    Right,
}

/// Node kinds of the markdown-structure tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MdKind {
    Root,
    Paragraph,
    Heading(u8),
    List {
        ordered: bool,
        start: Option<u64>,
        /// Loose lists keep their paragraphs when lowered.
        spread: bool,
    },
    ListItem {
        checked: Option<bool>,
    },
    Blockquote,
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    InlineCode(String),
    Text(String),
    Emphasis,
    Strong,
    Delete,
    Mark,
    /// Abbreviation use; `title` is the expansion.
    Abbr {
        title: String,
    },
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    FootnoteReference(String),
    FootnoteDefinition(String),
    Break,
    ThematicBreak,
    Html(String),
    Table(Vec<ColumnAlign>),
    TableRow {
        head: bool,
    },
    TableCell,
    /// Synthetic block wrapper; lowered to `div` unless `data.h_name` says otherwise.
    Container,
}

/// Code-tab membership recorded by the grouping pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTab {
    pub group: String,
    pub tab: String,
}

/// Fixed set of annotations a pass may leave for a later stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    /// Tag to emit instead of the default mapping for this kind.
    pub h_name: Option<String>,
    pub class_names: Vec<String>,
    pub id: Option<String>,
    /// Extra attributes for the produced element, in source order.
    pub properties: Vec<(String, String)>,
    pub cite: Option<String>,
    pub code_tabs: Option<CodeTab>,
    pub shiki_meta: Option<String>,
    /// An alignment marker in this text was escaped and must stay literal.
    pub escaped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: MdKind,
    pub children: Vec<Node>,
    pub data: NodeData,
    pub position: Option<Position>,
}

impl Node {
    pub fn new(kind: MdKind) -> Self {
        Node {
            kind,
            children: Vec::new(),
            data: NodeData::default(),
            position: None,
        }
    }

    pub fn with_children(kind: MdKind, children: Vec<Node>) -> Self {
        Node {
            children,
            ..Node::new(kind)
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::new(MdKind::Text(value.into()))
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::with_children(MdKind::Paragraph, children)
    }

    /// A synthetic wrapper emitted as `tag` with the given classes.
    pub fn container(tag: &str, class_names: Vec<String>, children: Vec<Node>) -> Self {
        let mut node = Node::with_children(MdKind::Container, children);
        node.data.h_name = Some(tag.to_string());
        node.data.class_names = class_names;
        node
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, MdKind::Paragraph)
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            MdKind::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Concatenated text of all descendant `Text` nodes.
    ///
    /// Inline code and other literal kinds are not included.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    if let MdKind::Text(value) = &node.kind {
        out.push_str(value);
    }
    for child in &node.children {
        collect_text(child, out);
    }
}
