//! GitHub-style `:shortcode:` emoji.
//!
//! Unknown shortcodes stay as written. Inline code and code blocks are other
//! node kinds and are never rewritten.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::mdast::Node;
use crate::md_passes::splice_text;

static SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([a-z0-9_+-]+):").expect("valid shortcode pattern"));

/// Replace every known shortcode in `text`.
pub fn replace(text: &str) -> Cow<'_, str> {
    SHORTCODE.replace_all(text, |caps: &Captures<'_>| match emojis::get_by_shortcode(&caps[1]) {
        Some(emoji) => emoji.as_str().to_string(),
        None => caps[0].to_string(),
    })
}

pub fn run(tree: &mut Node) {
    splice_text(tree, &mut |node| {
        let value = node.text_value()?;
        match replace(value) {
            Cow::Borrowed(_) => None,
            Cow::Owned(replaced) if replaced == value => None,
            Cow::Owned(replaced) => Some(vec![Node::text(replaced)]),
        }
    });
}
