//! HTML-tree passes.
//!
//! These run after the markdown tree has been lowered. Like the markdown
//! passes they are plain values built once per pipeline; the heading-id pass
//! additionally reports the headings it saw.

pub mod autolink;
pub mod code_tabs;
pub mod color_swatch;
pub mod emoji;
pub mod footnote_titles;
pub mod heading_ids;
pub mod toc;
pub mod utility_classes;

use crate::error::Result;
use crate::hast::{Element, HNode};
use crate::options::{CompileOptions, HtmlPassKind};

pub use heading_ids::Heading;

/// A configured HTML-tree pass.
#[derive(Debug, Clone)]
pub enum HtmlPass {
    HeadingIds,
    Toc(toc::Toc),
    AutolinkHeadings,
    CodeTabs,
    UtilityClasses,
    ColorSwatch,
    FootnoteTitles(footnote_titles::FootnoteTitles),
    AccessibleEmoji,
}

impl HtmlPass {
    pub fn new(kind: HtmlPassKind, options: &CompileOptions) -> Result<Self> {
        Ok(match kind {
            HtmlPassKind::HeadingIds => HtmlPass::HeadingIds,
            HtmlPassKind::Toc => HtmlPass::Toc(toc::Toc::new(&options.toc)?),
            HtmlPassKind::AutolinkHeadings => HtmlPass::AutolinkHeadings,
            HtmlPassKind::CodeTabs => HtmlPass::CodeTabs,
            HtmlPassKind::UtilityClasses => HtmlPass::UtilityClasses,
            HtmlPassKind::ColorSwatch => HtmlPass::ColorSwatch,
            HtmlPassKind::FootnoteTitles => {
                HtmlPass::FootnoteTitles(footnote_titles::FootnoteTitles::new(&options.footnotes)?)
            }
            HtmlPassKind::AccessibleEmoji => HtmlPass::AccessibleEmoji,
        })
    }

    pub fn kind(&self) -> HtmlPassKind {
        match self {
            HtmlPass::HeadingIds => HtmlPassKind::HeadingIds,
            HtmlPass::Toc(_) => HtmlPassKind::Toc,
            HtmlPass::AutolinkHeadings => HtmlPassKind::AutolinkHeadings,
            HtmlPass::CodeTabs => HtmlPassKind::CodeTabs,
            HtmlPass::UtilityClasses => HtmlPassKind::UtilityClasses,
            HtmlPass::ColorSwatch => HtmlPassKind::ColorSwatch,
            HtmlPass::FootnoteTitles(_) => HtmlPassKind::FootnoteTitles,
            HtmlPass::AccessibleEmoji => HtmlPassKind::AccessibleEmoji,
        }
    }

    /// Run the pass; heading records are appended to `headings`.
    pub fn run(&self, tree: &mut HNode, headings: &mut Vec<Heading>) {
        log::trace!("html pass `{}`", self.kind().name());
        match self {
            HtmlPass::HeadingIds => headings.extend(heading_ids::run(tree)),
            HtmlPass::Toc(pass) => pass.run(tree),
            HtmlPass::AutolinkHeadings => autolink::run(tree),
            HtmlPass::CodeTabs => code_tabs::run(tree),
            HtmlPass::UtilityClasses => utility_classes::run(tree),
            HtmlPass::ColorSwatch => color_swatch::run(tree),
            HtmlPass::FootnoteTitles(pass) => pass.run(tree),
            HtmlPass::AccessibleEmoji => emoji::run(tree),
        }
    }
}

/// Visit every element depth first, parents before children, passing the
/// parent's tag name (`None` at the root).
pub(crate) fn walk_elements<F>(node: &mut HNode, f: &mut F)
where
    F: FnMut(&mut Element, Option<&str>),
{
    fn visit<F>(children: &mut [HNode], parent: Option<&str>, f: &mut F)
    where
        F: FnMut(&mut Element, Option<&str>),
    {
        for child in children {
            if let HNode::Element(el) = child {
                f(el, parent);
                let tag = el.tag_name.clone();
                visit(&mut el.children, Some(&tag), f);
            }
        }
    }

    match node {
        HNode::Root(children) => visit(children, None, f),
        HNode::Element(el) => {
            f(el, None);
            let tag = el.tag_name.clone();
            visit(&mut el.children, Some(&tag), f);
        }
        _ => {}
    }
}

/// Whether this element opens the generated footnote section.
pub(crate) fn is_footnote_section(el: &Element) -> bool {
    el.tag_name == "section" && el.has_attr("data-footnotes")
}

pub(crate) fn heading_level(el: &Element) -> Option<u8> {
    match el.tag_name.as_str() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn walk_reports_parent_tags() {
        let mut tree = HNode::Root(vec![
            Element::new("pre")
                .with_children(vec![Element::new("code").into()])
                .into(),
            Element::new("p")
                .with_children(vec![Element::new("code").into()])
                .into(),
        ]);
        let mut seen = Vec::new();
        walk_elements(&mut tree, &mut |el, parent| {
            seen.push(format!("{}<{}", el.tag_name, parent.unwrap_or("root")));
        });
        assert_eq!(seen, vec!["pre<root", "code<pre", "p<root", "code<p"]);
    }

    #[test]
    fn heading_levels() {
        assert_eq!(heading_level(&Element::new("h3")), Some(3));
        assert_eq!(heading_level(&Element::new("header")), None);
    }
}
