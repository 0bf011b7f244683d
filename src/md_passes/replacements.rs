//! Typographic replacements: arrows, plus-minus, fractions and `×`.
//!
//! Rules run in order, longest patterns first, over prose text only. Each
//! rule has a name so it can be switched off from the options.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::mdast::{MdKind, Node};
use crate::md_passes::splice_text;
use crate::options::{MarkdownPassKind, ReplacementOptions};

#[derive(Debug)]
enum Matcher {
    Pattern(Regex),
    /// A literal not followed by `forbidden`.
    NotFollowedBy { literal: &'static str, forbidden: char },
}

#[derive(Debug)]
struct Rule {
    name: &'static str,
    matcher: Matcher,
    replacement: &'static str,
}

fn pattern(name: &'static str, re: &str, replacement: &'static str) -> Rule {
    Rule {
        name,
        matcher: Matcher::Pattern(Regex::new(re).expect("valid replacement pattern")),
        replacement,
    }
}

fn not_followed_by(name: &'static str, literal: &'static str, forbidden: char, replacement: &'static str) -> Rule {
    Rule {
        name,
        matcher: Matcher::NotFollowedBy { literal, forbidden },
        replacement,
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        pattern("arrow_double_lr", "<==>", "\u{21d4}"),
        pattern("arrow_double_right", "==>", "\u{21d2}"),
        not_followed_by("arrow_double_left", "<==", '=', "\u{21d0}"),
        pattern("arrow_lr", "<(?:--|\u{2014})>", "\u{2194}"),
        pattern("arrow_right", "(?:--|\u{2014})>", "\u{2192}"),
        not_followed_by("arrow_left", "<--", '-', "\u{2190}"),
        not_followed_by("arrow_left", "<\u{2014}", '\u{2014}', "\u{2190}"),
        pattern("plusminus", r"\+-", "\u{b1}"),
        pattern("onehalf", r"\b1/2\b", "\u{bd}"),
        pattern("onequarter", r"\b1/4\b", "\u{bc}"),
        pattern("threequarters", r"\b3/4\b", "\u{be}"),
        pattern("multiplication", r"(?i)\b(\d+)\s*x\s*(\d+)\b", "${1} \u{d7} ${2}"),
    ]
});

/// Names accepted in `replacements.disable`.
pub fn rule_names() -> impl Iterator<Item = &'static str> {
    let mut names: Vec<&'static str> = RULES.iter().map(|r| r.name).collect();
    names.dedup();
    names.into_iter()
}

#[derive(Debug, Clone)]
pub struct Replacements {
    /// Indices into the rule table, in order.
    active: Vec<usize>,
}

impl Replacements {
    pub fn new(options: &ReplacementOptions) -> Result<Self> {
        if let Some(unknown) = options
            .disable
            .iter()
            .find(|name| !rule_names().any(|known| known == name.as_str()))
        {
            return Err(Error::config(
                MarkdownPassKind::Replacements.name(),
                format!("unknown rule `{unknown}`"),
            ));
        }
        let active = RULES
            .iter()
            .enumerate()
            .filter(|(_, rule)| !options.disable.iter().any(|d| d == rule.name))
            .map(|(i, _)| i)
            .collect();
        Ok(Replacements { active })
    }

    /// Apply every active rule to one string.
    pub fn apply(&self, text: &str) -> String {
        let mut value = text.to_string();
        for rule in self.active.iter().filter_map(|i| RULES.get(*i)) {
            value = match &rule.matcher {
                Matcher::Pattern(re) => re.replace_all(&value, rule.replacement).into_owned(),
                Matcher::NotFollowedBy { literal, forbidden } => {
                    replace_not_followed(&value, literal, *forbidden, rule.replacement)
                }
            };
        }
        value
    }

    pub fn run(&self, tree: &mut Node) {
        splice_text(tree, &mut |node| {
            let value = node.text_value()?;
            let replaced = self.apply(value);
            if replaced == value {
                return None;
            }
            let mut node = node.clone();
            node.kind = MdKind::Text(replaced);
            Some(vec![node])
        });
    }
}

fn replace_not_followed(text: &str, literal: &str, forbidden: char, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(literal) {
        let after = &rest[at + literal.len()..];
        out.push_str(&rest[..at]);
        if after.starts_with(forbidden) {
            out.push_str(literal);
        } else {
            out.push_str(replacement);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}
