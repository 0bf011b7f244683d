//! Bare `http://` and `https://` URLs in prose become links.
//!
//! A URL is a whitespace-delimited token. Trailing sentence punctuation and
//! an unbalanced closing parenthesis are left outside the link. Text that is
//! already inside a link is not scanned.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::mdast::{MdKind, Node};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("valid token pattern"));

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^\s$.?#].[^\s]*$").expect("valid url pattern"));

const TRAILING: &[char] = &['.', ',', ':', ';', '!', '?', '\'', '"'];

pub fn run(tree: &mut Node) {
    let mut i = 0;
    while i < tree.children.len() {
        let child = &mut tree.children[i];
        match &child.kind {
            MdKind::Text(value) => {
                if let Some(parts) = split(value) {
                    let count = parts.len();
                    tree.children.splice(i..=i, parts);
                    i += count;
                    continue;
                }
            }
            MdKind::Link { .. } => {}
            _ => run(child),
        }
        i += 1;
    }
}

/// Split a text value around its URLs; `None` when it has none.
fn split(text: &str) -> Option<Vec<Node>> {
    let mut parts = Vec::new();
    let mut last = 0;
    for token in TOKEN.find_iter(text) {
        let start = token.start();
        let url = trim_url(token.as_str());
        if !URL.is_match(url) {
            continue;
        }
        if start > last {
            parts.push(Node::text(&text[last..start]));
        }
        parts.push(Node::with_children(
            MdKind::Link {
                url: url.to_string(),
                title: None,
            },
            vec![Node::text(url)],
        ));
        last = start + url.len();
    }
    if parts.is_empty() {
        return None;
    }
    if last < text.len() {
        parts.push(Node::text(&text[last..]));
    }
    Some(parts)
}

fn trim_url(mut url: &str) -> &str {
    loop {
        if let Some(trimmed) = url.strip_suffix(TRAILING) {
            url = trimmed;
        } else if url.ends_with(')') && url.matches('(').count() < url.matches(')').count() {
            url = &url[..url.len() - 1];
        } else {
            return url;
        }
    }
}
