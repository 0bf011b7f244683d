//! `==highlighted==` spans.
//!
//! Each text node is split at most once per run into text, a `Mark` and the
//! trailing text; the trailing text is not scanned again. Code and inline
//! code are separate node kinds and never reach the scanner.

use crate::mdast::{MdKind, Node};
use crate::md_passes::splice_text;

const DELIMITER: &str = "==";

/// A successful split of one text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split<'a> {
    pub before: &'a str,
    pub inner: &'a str,
    pub after: &'a str,
}

/// Find the first non-empty `==…==` span.
///
/// An opening delimiter pairs with the next `==` after it. An empty pair
/// (`====`) is literal text and scanning resumes after it; an opening
/// delimiter with no close ends the scan.
pub fn split(value: &str) -> Option<Split<'_>> {
    let mut from = 0;
    loop {
        let open = from + value[from..].find(DELIMITER)?;
        let inner_start = open + DELIMITER.len();
        let Some(close) = value[inner_start..].find(DELIMITER).map(|i| inner_start + i) else {
            log::debug!("unterminated highlight delimiter left as text");
            return None;
        };
        if close == inner_start {
            from = close + DELIMITER.len();
            continue;
        }
        return Some(Split {
            before: &value[..open],
            inner: &value[inner_start..close],
            after: &value[close + DELIMITER.len()..],
        });
    }
}

pub fn run(tree: &mut Node) {
    splice_text(tree, &mut |node| {
        let value = node.text_value()?;
        let Split {
            before,
            inner,
            after,
        } = split(value)?;

        let mut nodes = Vec::with_capacity(3);
        if !before.is_empty() {
            nodes.push(Node::text(before));
        }
        nodes.push(Node::with_children(MdKind::Mark, vec![Node::text(inner)]));
        if !after.is_empty() {
            nodes.push(Node::text(after));
        }
        Some(nodes)
    });
}
