//! Smart punctuation for prose text.
//!
//! Straight quotes become curly quotes, ASCII dash runs become en and em
//! dashes, and `...` becomes an ellipsis. Quote direction is decided by a
//! small state machine that looks at the previous and next character; the
//! state carries across inline nodes and resets at every paragraph and
//! heading.
//!
//! Inline code and code blocks are other node kinds and are never rewritten.
//! Text between raw `<pre>`, `<code>`, `<kbd>`, `<math>`, `<script>` or
//! `<style>` tags and their closing tag is skipped too.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::mdast::{MdKind, Node};
use crate::options::{DashMode, TypographyOptions};

const OPEN_DOUBLE: char = '\u{201c}';
const CLOSE_DOUBLE: char = '\u{201d}';
const OPEN_SINGLE: char = '\u{2018}';
const CLOSE_SINGLE: char = '\u{2019}';
const EM_DASH: char = '\u{2014}';
const EN_DASH: char = '\u{2013}';
const ELLIPSIS: char = '\u{2026}';

const VERBATIM_TAGS: &[&str] = &["pre", "code", "kbd", "math", "script", "style"];

/// Opening, closing and self-closing tags. Group 1 marks a closing tag,
/// group 3 a self-closing one.
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/)?([A-Za-z][A-Za-z0-9-]*)(?:\s(?:[^>"']|"[^"]*"|'[^']*')*?)?\s*(/)?>"#)
        .expect("valid tag pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    None,
    Space,
    Word,
    Punct,
}

fn classify(c: Option<char>) -> CharClass {
    match c {
        None => CharClass::None,
        Some(c) if c.is_whitespace() => CharClass::Space,
        Some(c) if c.is_ascii_alphanumeric() => CharClass::Word,
        Some(_) => CharClass::Punct,
    }
}

#[derive(Debug, Clone)]
struct State {
    prev: CharClass,
    /// Open raw verbatim tags, innermost last.
    verbatim: Vec<String>,
}

impl State {
    fn should_open(&self, next: Option<char>) -> bool {
        match self.prev {
            CharClass::None | CharClass::Space => true,
            _ => !matches!(
                classify(next),
                CharClass::Space | CharClass::Punct | CharClass::None
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Typography {
    options: TypographyOptions,
}

impl Typography {
    pub fn new(options: &TypographyOptions) -> Self {
        Typography {
            options: options.clone(),
        }
    }

    pub fn run(&self, tree: &mut Node) {
        let mut state = State {
            prev: CharClass::None,
            verbatim: Vec::new(),
        };
        self.walk(tree, &mut state);
    }

    fn walk(&self, parent: &mut Node, state: &mut State) {
        for child in &mut parent.children {
            match &mut child.kind {
                MdKind::Html(value) => track_raw_html(value, &mut state.verbatim),
                MdKind::InlineCode(_) => state.prev = CharClass::Word,
                MdKind::Code { .. } => state.prev = CharClass::None,
                MdKind::Break => state.prev = CharClass::Space,
                MdKind::Text(value) => {
                    if state.verbatim.is_empty() {
                        *value = self.transform(value, state);
                    }
                }
                MdKind::Paragraph | MdKind::Heading(_) => {
                    state.prev = CharClass::None;
                    self.walk(child, state);
                }
                _ => self.walk(child, state),
            }
        }
    }

    /// Rewrite one text value, updating the running state.
    fn transform(&self, value: &str, state: &mut State) -> String {
        let opts = &self.options;
        let chars: Vec<char> = value.chars().collect();
        let at = |i: usize| chars.get(i).copied();
        let mut out = String::with_capacity(value.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = at(i + 1);
            let next2 = at(i + 2);

            if opts.ellipses {
                if c == '.' && next == Some('.') && next2 == Some('.') {
                    out.push(ELLIPSIS);
                    state.prev = CharClass::Punct;
                    i += 3;
                    continue;
                }
                if c == '.'
                    && next == Some(' ')
                    && next2 == Some('.')
                    && at(i + 3) == Some(' ')
                    && at(i + 4) == Some('.')
                {
                    out.push(ELLIPSIS);
                    state.prev = CharClass::Punct;
                    i += 5;
                    continue;
                }
            }

            if opts.dashes != DashMode::Off && c == '-' && next == Some('-') {
                let triple = next2 == Some('-');
                let dash = match (opts.dashes, triple) {
                    (DashMode::Oldschool, false) | (DashMode::Inverted, true) => EN_DASH,
                    _ => EM_DASH,
                };
                out.push(dash);
                state.prev = CharClass::Punct;
                i += if triple { 3 } else { 2 };
                continue;
            }

            if opts.backticks {
                if c == '`' && next == Some('`') {
                    out.push(OPEN_DOUBLE);
                    state.prev = CharClass::Punct;
                    i += 2;
                    continue;
                }
                if c == '\'' && next == Some('\'') {
                    out.push(CLOSE_DOUBLE);
                    state.prev = CharClass::Punct;
                    i += 2;
                    continue;
                }
            }

            if opts.quotes && c == '"' {
                out.push(if state.should_open(next) { OPEN_DOUBLE } else { CLOSE_DOUBLE });
                state.prev = CharClass::Punct;
                i += 1;
                continue;
            }

            if opts.quotes && c == '\'' {
                let apostrophe = state.prev == CharClass::Word && classify(next) == CharClass::Word;
                out.push(if !apostrophe && state.should_open(next) {
                    OPEN_SINGLE
                } else {
                    CLOSE_SINGLE
                });
                state.prev = CharClass::Punct;
                i += 1;
                continue;
            }

            out.push(c);
            state.prev = classify(Some(c));
            i += 1;
        }
        out
    }
}

/// Push or pop verbatim tags for every tag in a raw HTML node, in order.
fn track_raw_html(value: &str, stack: &mut Vec<String>) {
    for caps in TAG.captures_iter(value) {
        if caps.get(3).is_some() {
            continue;
        }
        let tag = caps[2].to_ascii_lowercase();
        if caps.get(1).is_some() {
            if let Some(pos) = stack.iter().rposition(|open| *open == tag) {
                stack.remove(pos);
            }
        } else if VERBATIM_TAGS.contains(&tag.as_str()) {
            stack.push(tag);
        }
    }
}
