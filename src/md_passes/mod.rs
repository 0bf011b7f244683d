//! Markdown-tree passes.
//!
//! Each pass is a plain value built once from [`CompileOptions`] and run over
//! a freshly parsed tree. Passes only look at the node kinds they understand;
//! everything else is walked through or left alone.

pub mod abbreviations;
pub mod align;
pub mod attributes;
pub mod blockquote;
pub mod breaks;
pub mod code_meta;
pub mod emoji_shortcodes;
pub mod highlight;
pub mod linkify;
pub mod replacements;
pub mod typography;

use crate::error::Result;
use crate::mdast::{MdKind, Node};
use crate::options::{CompileOptions, MarkdownPassKind};

/// A configured markdown-tree pass.
#[derive(Debug, Clone)]
pub enum MarkdownPass {
    Abbreviations(abbreviations::Abbreviations),
    Align(align::Align),
    Attributes(attributes::Attributes),
    Blockquote(blockquote::Blockquote),
    Breaks,
    EmojiShortcodes,
    Linkify,
    Highlight,
    CodeTabs,
    CodeMeta,
    Replacements(replacements::Replacements),
    Typography(typography::Typography),
}

impl MarkdownPass {
    pub fn new(kind: MarkdownPassKind, options: &CompileOptions) -> Result<Self> {
        Ok(match kind {
            MarkdownPassKind::Abbreviations => MarkdownPass::Abbreviations(
                abbreviations::Abbreviations::new(&options.abbreviations),
            ),
            MarkdownPassKind::Align => MarkdownPass::Align(align::Align::new(&options.align)),
            MarkdownPassKind::Attributes => MarkdownPass::Attributes(attributes::Attributes::new(
                options.allow_dangerous_html,
            )),
            MarkdownPassKind::Blockquote => {
                MarkdownPass::Blockquote(blockquote::Blockquote::new(&options.blockquote))
            }
            MarkdownPassKind::Breaks => MarkdownPass::Breaks,
            MarkdownPassKind::EmojiShortcodes => MarkdownPass::EmojiShortcodes,
            MarkdownPassKind::Linkify => MarkdownPass::Linkify,
            MarkdownPassKind::Highlight => MarkdownPass::Highlight,
            MarkdownPassKind::CodeTabs => MarkdownPass::CodeTabs,
            MarkdownPassKind::CodeMeta => MarkdownPass::CodeMeta,
            MarkdownPassKind::Replacements => {
                MarkdownPass::Replacements(replacements::Replacements::new(&options.replacements)?)
            }
            MarkdownPassKind::Typography => {
                MarkdownPass::Typography(typography::Typography::new(&options.typography))
            }
        })
    }

    pub fn kind(&self) -> MarkdownPassKind {
        match self {
            MarkdownPass::Abbreviations(_) => MarkdownPassKind::Abbreviations,
            MarkdownPass::Align(_) => MarkdownPassKind::Align,
            MarkdownPass::Attributes(_) => MarkdownPassKind::Attributes,
            MarkdownPass::Blockquote(_) => MarkdownPassKind::Blockquote,
            MarkdownPass::Breaks => MarkdownPassKind::Breaks,
            MarkdownPass::EmojiShortcodes => MarkdownPassKind::EmojiShortcodes,
            MarkdownPass::Linkify => MarkdownPassKind::Linkify,
            MarkdownPass::Highlight => MarkdownPassKind::Highlight,
            MarkdownPass::CodeTabs => MarkdownPassKind::CodeTabs,
            MarkdownPass::CodeMeta => MarkdownPassKind::CodeMeta,
            MarkdownPass::Replacements(_) => MarkdownPassKind::Replacements,
            MarkdownPass::Typography(_) => MarkdownPassKind::Typography,
        }
    }

    /// Run the pass. `source` is the raw document text the tree was parsed
    /// from; positions in the tree index into it.
    pub fn run(&self, tree: &mut Node, source: &str) {
        log::trace!("markdown pass `{}`", self.kind().name());
        match self {
            MarkdownPass::Abbreviations(pass) => pass.run(tree),
            MarkdownPass::Align(pass) => pass.run(tree, source),
            MarkdownPass::Attributes(pass) => pass.run(tree, source),
            MarkdownPass::Blockquote(pass) => pass.run(tree),
            MarkdownPass::Breaks => breaks::run(tree),
            MarkdownPass::EmojiShortcodes => emoji_shortcodes::run(tree),
            MarkdownPass::Linkify => linkify::run(tree),
            MarkdownPass::Highlight => highlight::run(tree),
            MarkdownPass::CodeTabs => code_meta::group_tabs(tree),
            MarkdownPass::CodeMeta => code_meta::preserve_meta(tree),
            MarkdownPass::Replacements(pass) => pass.run(tree),
            MarkdownPass::Typography(pass) => pass.run(tree),
        }
    }
}

/// Replace text nodes in place, depth first.
///
/// `rewrite` returns the nodes that take the place of a text node, or `None`
/// to leave it as it is. Replacement nodes are never visited again in the
/// same walk.
pub(crate) fn splice_text<F>(node: &mut Node, rewrite: &mut F)
where
    F: FnMut(&Node) -> Option<Vec<Node>>,
{
    let mut index = 0;
    while index < node.children.len() {
        let child = &mut node.children[index];
        if matches!(child.kind, MdKind::Text(_)) {
            if let Some(replacement) = rewrite(child) {
                let count = replacement.len();
                node.children.splice(index..=index, replacement);
                index += count;
                continue;
            }
        } else {
            splice_text(child, rewrite);
        }
        index += 1;
    }
}

/// Call `f` for every code block in the tree.
pub(crate) fn for_each_code(node: &mut Node, f: &mut impl FnMut(&mut Node)) {
    if matches!(node.kind, MdKind::Code { .. }) {
        f(node);
        return;
    }
    for child in &mut node.children {
        for_each_code(child, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn splice_text_skips_inserted_nodes() {
        let mut tree = parse("ab");
        let mut calls = 0;
        splice_text(&mut tree, &mut |node| {
            calls += 1;
            let value = node.text_value()?;
            Some(vec![Node::text(value), Node::text(value)])
        });
        assert_eq!(calls, 1);
        assert_eq!(tree.children[0].children.len(), 2);
    }

    #[test]
    fn passes_are_built_in_listed_order() {
        let options = CompileOptions::default();
        let kinds: Vec<_> = options
            .passes
            .markdown
            .iter()
            .map(|kind| MarkdownPass::new(*kind, &options).map(|p| p.kind()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(kinds, options.passes.markdown);
    }
}
