//! Fluent construction of a [`Pipeline`].
//!
//! ```
//! use mdforge::{DashMode, HtmlPassKind, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .dashes(DashMode::Inverted)
//!     .enable_html(HtmlPassKind::AutolinkHeadings)
//!     .words_per_minute(250)
//!     .build()
//!     .unwrap();
//!
//! let compiled = pipeline.compile("doc.md", "## Intro").unwrap();
//! assert!(compiled.html.contains("heading-anchor"));
//! ```

use crate::error::Result;
use crate::options::{
    AbbreviationOptions, AlignOptions, BlockquoteOptions, CompileOptions, DashMode,
    FootnoteOptions, HtmlPassKind, MarkdownPassKind, ReplacementOptions, TocOptions,
    TypographyOptions,
};
use crate::pipeline::Pipeline;

/// Builder for [`Pipeline`], starting from the default options.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    options: CompileOptions,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing options value.
    pub fn from_options(options: CompileOptions) -> Self {
        PipelineBuilder { options }
    }

    pub fn align(mut self, align: AlignOptions) -> Self {
        self.options.align = align;
        self
    }

    pub fn blockquote(mut self, blockquote: BlockquoteOptions) -> Self {
        self.options.blockquote = blockquote;
        self
    }

    pub fn typography(mut self, typography: TypographyOptions) -> Self {
        self.options.typography = typography;
        self
    }

    pub fn dashes(mut self, dashes: DashMode) -> Self {
        self.options.typography.dashes = dashes;
        self
    }

    pub fn replacements(mut self, replacements: ReplacementOptions) -> Self {
        self.options.replacements = replacements;
        self
    }

    pub fn footnotes(mut self, footnotes: FootnoteOptions) -> Self {
        self.options.footnotes = footnotes;
        self
    }

    pub fn footnote_title_template(mut self, template: impl Into<String>) -> Self {
        self.options.footnotes.title_template = template.into();
        self
    }

    pub fn abbreviations(mut self, abbreviations: AbbreviationOptions) -> Self {
        self.options.abbreviations = abbreviations;
        self
    }

    pub fn toc(mut self, toc: TocOptions) -> Self {
        self.options.toc = toc;
        self
    }

    /// Replace both pass lists.
    pub fn passes(mut self, markdown: Vec<MarkdownPassKind>, html: Vec<HtmlPassKind>) -> Self {
        self.options.passes.markdown = markdown;
        self.options.passes.html = html;
        self
    }

    /// Append a markdown pass unless it is already enabled.
    pub fn enable_markdown(mut self, kind: MarkdownPassKind) -> Self {
        if !self.options.passes.markdown.contains(&kind) {
            self.options.passes.markdown.push(kind);
        }
        self
    }

    /// Append an HTML pass unless it is already enabled.
    pub fn enable_html(mut self, kind: HtmlPassKind) -> Self {
        if !self.options.passes.html.contains(&kind) {
            self.options.passes.html.push(kind);
        }
        self
    }

    pub fn disable_markdown(mut self, kind: MarkdownPassKind) -> Self {
        self.options.passes.markdown.retain(|k| *k != kind);
        self
    }

    pub fn disable_html(mut self, kind: HtmlPassKind) -> Self {
        self.options.passes.html.retain(|k| *k != kind);
        self
    }

    pub fn words_per_minute(mut self, wpm: u32) -> Self {
        self.options.words_per_minute = wpm;
        self
    }

    pub fn allow_dangerous_html(mut self, allow: bool) -> Self {
        self.options.allow_dangerous_html = allow;
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        Pipeline::new(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_starts_from_defaults() {
        let pipeline = PipelineBuilder::new().build().unwrap();
        assert_eq!(pipeline.options(), &CompileOptions::default());
    }

    #[test]
    fn enable_and_disable_passes() {
        let pipeline = Pipeline::builder()
            .disable_markdown(MarkdownPassKind::Typography)
            .enable_html(HtmlPassKind::AccessibleEmoji)
            .enable_html(HtmlPassKind::AutolinkHeadings)
            .build()
            .unwrap();
        let passes = &pipeline.options().passes;
        assert!(!passes.markdown.contains(&MarkdownPassKind::Typography));
        assert_eq!(passes.html.last(), Some(&HtmlPassKind::AutolinkHeadings));
        assert_eq!(
            passes.html.iter().filter(|k| **k == HtmlPassKind::AccessibleEmoji).count(),
            1
        );
    }

    #[test]
    fn build_validates() {
        let err = Pipeline::builder().words_per_minute(0).build().unwrap_err();
        assert_eq!(err.pass(), Some("reading-time"));

        let err = Pipeline::builder()
            .footnote_title_template("")
            .build()
            .unwrap_err();
        assert_eq!(err.pass(), Some("footnote-titles"));
    }

    #[test]
    fn toc_heading_is_configurable() {
        let pipeline = Pipeline::builder()
            .toc(TocOptions {
                heading: "on this page".into(),
                max_depth: 3,
            })
            .build()
            .unwrap();
        let compiled = pipeline.compile("toc.md", "## On this page\n\n## Setup").unwrap();
        assert!(compiled.html.contains("href=\"#setup\">Setup</a>"), "{}", compiled.html);

        let err = Pipeline::builder()
            .toc(TocOptions {
                heading: "[".into(),
                ..TocOptions::default()
            })
            .build()
            .unwrap_err();
        assert_eq!(err.pass(), Some("toc"));
    }

    #[test]
    fn dangerous_html_passes_through() {
        let pipeline = Pipeline::builder()
            .passes(vec![], vec![])
            .allow_dangerous_html(true)
            .build()
            .unwrap();
        let compiled = pipeline.compile("raw.md", "<aside>hi</aside>").unwrap();
        assert_eq!(compiled.html.trim_end(), "<aside>hi</aside>");
    }
}
