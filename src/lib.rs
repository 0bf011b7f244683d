//! `mdforge`: extended Markdown to styled HTML.
//!
//! Markdown is parsed into a markdown tree and rewritten by an ordered list of
//! markdown passes: abbreviations, alignment blocks, `{.class #id}` attribute
//! blocks, blockquote attribution, line breaks, `:shortcode:` emoji, bare URL
//! links, `==highlight==`, code-tab metadata, typographic replacements and
//! smart punctuation. The tree is then lowered to an HTML tree, rewritten
//! again by HTML passes (heading ids, table of contents, code-tab groups,
//! utility classes, color swatches, footnote titles, accessible emoji) and
//! serialized.
//!
//! Malformed custom syntax never fails a build; it renders as literal text.
//! Only invalid options are errors, and they are reported when a
//! [`Pipeline`] is built.
//!
//! # Quick start
//!
//! ```
//! let compiled = mdforge::compile(
//!     "[center]\n\n## Hello\n\n[/center]\n\nSay \"hi\" -- ==now==.",
//!     &mdforge::CompileOptions::default(),
//! )
//! .unwrap();
//!
//! assert!(compiled.html.contains("flex flex-col items-center"));
//! assert!(compiled.html.contains("\u{201c}hi\u{201d} \u{2013} <mark"));
//! assert_eq!(compiled.headings[0].slug, "hello");
//! ```

pub mod builder;
pub mod convert;
pub mod error;
pub mod hast;
pub mod html_passes;
pub mod md_passes;
pub mod mdast;
pub mod options;
pub mod parse;
pub mod pipeline;
pub mod reading_time;
pub mod render_html;
pub mod slug;
pub mod template;

pub use builder::PipelineBuilder;
pub use error::{Error, Result};
pub use html_passes::{Heading, HtmlPass};
pub use md_passes::MarkdownPass;
pub use options::{
    AbbreviationOptions, AlignOptions, BlockquoteOptions, CompileOptions, DashMode,
    FootnoteOptions, HtmlPassKind, MarkdownPassKind, PassList, ReplacementOptions, TocOptions,
    TypographyOptions,
};
pub use parse::parse;
pub use pipeline::{Compiled, Pipeline};
pub use reading_time::ReadingTime;

/// Compile one document with a pipeline built from `options`.
///
/// Builds the pipeline on every call; reuse a [`Pipeline`] when compiling
/// more than one document.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compiled> {
    const DOCUMENT: &str = "<input>";
    Pipeline::new(options.clone())
        .map_err(|err| err.in_document(DOCUMENT))?
        .compile(DOCUMENT, source)
}
