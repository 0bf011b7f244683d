//! Reading-time estimate from the prose of a document.

use serde::Serialize;

use crate::mdast::{MdKind, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: u32,
}

impl ReadingTime {
    /// Count prose words in `tree`; code is not counted.
    ///
    /// `words_per_minute` must be non-zero, which option validation ensures.
    pub fn estimate(tree: &Node, words_per_minute: u32) -> Self {
        let mut text = String::new();
        collect_prose(tree, &mut text);
        let words = text.split_whitespace().count();
        let minutes = if words == 0 {
            0
        } else {
            let wpm = words_per_minute.max(1) as usize;
            u32::try_from(words.div_ceil(wpm)).unwrap_or(u32::MAX).max(1)
        };
        ReadingTime { words, minutes }
    }
}

fn collect_prose(node: &Node, out: &mut String) {
    match &node.kind {
        MdKind::Text(value) => out.push_str(value),
        MdKind::Code { .. } | MdKind::InlineCode(_) | MdKind::Html(_) => out.push(' '),
        _ => {
            for child in &node.children {
                collect_prose(child, out);
            }
            if !matches!(
                node.kind,
                MdKind::Emphasis
                    | MdKind::Strong
                    | MdKind::Delete
                    | MdKind::Mark
                    | MdKind::Abbr { .. }
                    | MdKind::Link { .. }
            ) {
                out.push(' ');
            }
        }
    }
}
