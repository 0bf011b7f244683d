//! Accessible names for emoji in prose.
//!
//! Each emoji sequence (including skin tones, ZWJ sequences and keycaps)
//! becomes `<span role="img" aria-label="name">…</span>` so
//! screen readers announce it. Text inside code, preformatted and script-like
//! elements is left alone, as is anything already wrapped.

use crate::hast::{Element, HNode};

const SKIP_TAGS: &[&str] = &["pre", "code", "kbd", "script", "style", "math"];

const VARIATION_SELECTOR: char = '\u{fe0f}';
const KEYCAP: char = '\u{20e3}';

/// Longest emoji sequence tried, in chars. Covers ZWJ families with skin
/// tones and subdivision flags.
const MAX_SEQUENCE: usize = 12;

/// Longest known emoji at the start of `chars`, as (char count, name).
fn longest_emoji(text: &str, chars: &[(usize, char)]) -> Option<(usize, &'static str)> {
    let (start, first) = *chars.first()?;
    let second = chars.get(1).map(|&(_, c)| c);
    if first.is_ascii() && !matches!(second, Some(VARIATION_SELECTOR | KEYCAP)) {
        return None;
    }
    (1..=chars.len().min(MAX_SEQUENCE)).rev().find_map(|len| {
        let end = chars.get(len).map_or(text.len(), |&(at, _)| at);
        emojis::get(&text[start..end]).map(|emoji| (len, emoji.name()))
    })
}

pub fn run(tree: &mut HNode) {
    if let Some(children) = tree.children_mut() {
        visit(children);
    }
}

fn visit(children: &mut Vec<HNode>) {
    let mut i = 0;
    while i < children.len() {
        match &mut children[i] {
            HNode::Text(value) => {
                if let Some(parts) = split(value) {
                    let count = parts.len();
                    children.splice(i..=i, parts);
                    i += count;
                    continue;
                }
            }
            HNode::Element(el) if !skipped(el) => visit(&mut el.children),
            _ => {}
        }
        i += 1;
    }
}

fn skipped(el: &Element) -> bool {
    SKIP_TAGS.contains(&el.tag_name.as_str())
        || (el.tag_name == "span" && el.attr("role") == Some("img"))
        || (el.tag_name == "a" && el.has_class("heading-anchor"))
}

/// Split a text value around known emoji; `None` when there are none.
fn split(value: &str) -> Option<Vec<HNode>> {
    let chars: Vec<(usize, char)> = value.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(value.len(), |&(at, _)| at);
    let mut parts = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    while i < chars.len() {
        let Some((mut len, name)) = longest_emoji(value, &chars[i..]) else {
            i += 1;
            continue;
        };
        if chars.get(i + len).map(|&(_, c)| c) == Some(VARIATION_SELECTOR) {
            len += 1;
        }
        let (at, end) = (byte_at(i), byte_at(i + len));
        if plain_start < at {
            parts.push(HNode::text(&value[plain_start..at]));
        }
        parts.push(
            Element::new("span")
                .with_attr("role", "img")
                .with_attr("aria-label", name)
                .with_children(vec![HNode::text(&value[at..end])])
                .into(),
        );
        plain_start = end;
        i += len;
    }
    if parts.is_empty() {
        return None;
    }
    if plain_start < value.len() {
        parts.push(HNode::text(&value[plain_start..]));
    }
    Some(parts)
}
