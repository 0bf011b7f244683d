//! Hard line breaks for every newline inside a paragraph.

use crate::mdast::{MdKind, Node};
use crate::md_passes::splice_text;

pub fn run(tree: &mut Node) {
    splice_text(tree, &mut |node| {
        let value = node.text_value()?;
        if !value.contains('\n') {
            return None;
        }
        let mut nodes = Vec::new();
        for (i, line) in value.split('\n').enumerate() {
            if i > 0 {
                nodes.push(Node::new(MdKind::Break));
            }
            let line = if i > 0 { line.trim_start_matches([' ', '\t']) } else { line };
            if !line.is_empty() {
                nodes.push(Node::text(line));
            }
        }
        Some(nodes)
    });
}
