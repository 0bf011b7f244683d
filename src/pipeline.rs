//! The compile pipeline: parse, markdown passes, lowering, HTML passes,
//! serialization.
//!
//! A [`Pipeline`] is built once from [`CompileOptions`]; every option is
//! checked and every pass constructed up front, so compiling a document can
//! only fail for reasons that belong to that document. Each compile owns its
//! trees, which makes a pipeline safe to share across threads.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::convert::{ConvertOptions, to_hast};
use crate::error::Result;
use crate::html_passes::{Heading, HtmlPass};
use crate::md_passes::MarkdownPass;
use crate::options::CompileOptions;
use crate::parse::parse;
use crate::reading_time::ReadingTime;
use crate::render_html::to_html;

/// Output of compiling one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compiled {
    pub html: String,
    /// Headings in document order, for tables of contents.
    pub headings: Vec<Heading>,
    pub reading_time: ReadingTime,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    options: CompileOptions,
    markdown: Vec<MarkdownPass>,
    html: Vec<HtmlPass>,
    convert: ConvertOptions,
}

impl Pipeline {
    /// Validate `options` and construct the enabled passes in order.
    pub fn new(options: CompileOptions) -> Result<Self> {
        options.validate()?;
        let markdown = options
            .passes
            .markdown
            .iter()
            .map(|kind| MarkdownPass::new(*kind, &options))
            .collect::<Result<Vec<_>>>()?;
        let html = options
            .passes
            .html
            .iter()
            .map(|kind| HtmlPass::new(*kind, &options))
            .collect::<Result<Vec<_>>>()?;
        let convert = ConvertOptions::new(&options.footnotes, options.allow_dangerous_html);
        log::debug!(
            "pipeline ready: {} markdown passes, {} html passes",
            markdown.len(),
            html.len()
        );
        Ok(Pipeline {
            options,
            markdown,
            html,
            convert,
        })
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile one document. `document` names it in logs and errors.
    pub fn compile(&self, document: &str, source: &str) -> Result<Compiled> {
        self.compile_inner(source).map_err(|err| err.in_document(document))
    }

    fn compile_inner(&self, source: &str) -> Result<Compiled> {
        let start = Instant::now();

        let mut tree = parse(source);
        for pass in &self.markdown {
            pass.run(&mut tree, source);
        }
        let reading_time = ReadingTime::estimate(&tree, self.options.words_per_minute);

        let mut hast = to_hast(tree, &self.convert);
        let mut headings = Vec::new();
        for pass in &self.html {
            pass.run(&mut hast, &mut headings);
        }
        let html = to_html(&hast);

        log::debug!(
            "compiled {} bytes into {} bytes of html in {:?}",
            source.len(),
            html.len(),
            start.elapsed()
        );
        Ok(Compiled {
            html,
            headings,
            reading_time,
        })
    }

    /// Compile named documents in parallel. Results keep input order and
    /// each document succeeds or fails on its own.
    pub fn compile_batch<N, S>(&self, documents: &[(N, S)]) -> Vec<Result<Compiled>>
    where
        N: AsRef<str> + Sync,
        S: AsRef<str> + Sync,
    {
        documents
            .par_iter()
            .map(|(name, source)| {
                let name = name.as_ref();
                let result = self.compile(name, source.as_ref());
                if let Err(err) = &result {
                    log::debug!("`{name}` failed: {err}");
                }
                result
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{HtmlPassKind, MarkdownPassKind};
    use pretty_assertions::assert_eq;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn pipeline_is_shareable() {
        assert_send_sync::<Pipeline>();
    }

    #[test]
    fn compiles_with_defaults() {
        let pipeline = Pipeline::new(CompileOptions::default()).unwrap();
        let compiled = pipeline.compile("intro.md", "## Hello\n\nSome ==marked== text.").unwrap();
        assert!(compiled.html.contains("<h2 class=\"mb-2 mt-6 relative first:mt-0 group\" id=\"hello\">Hello</h2>"), "{}", compiled.html);
        assert!(compiled.html.contains("<mark class=\"bg-gray-300 text-gray-900\">marked</mark>"), "{}", compiled.html);
        assert_eq!(compiled.headings.len(), 1);
        assert_eq!(compiled.reading_time.words, 4);
    }

    #[test]
    fn passes_run_in_configured_order_only() {
        let mut options = CompileOptions::default();
        options.passes.markdown = vec![MarkdownPassKind::Highlight];
        options.passes.html = vec![];
        let pipeline = Pipeline::new(options).unwrap();
        let compiled = pipeline.compile("a.md", "## Hi \"there\"\n\n==x==").unwrap();
        assert_eq!(compiled.html, "<h2>Hi \"there\"</h2>\n<p><mark>x</mark></p>");
        assert!(compiled.headings.is_empty());
    }

    #[test]
    fn invalid_options_fail_at_build_time() {
        let mut options = CompileOptions::default();
        options.replacements.disable = vec!["nope".into()];
        let err = Pipeline::new(options).unwrap_err();
        assert_eq!(err.pass(), Some("replacements"));

        let mut options = CompileOptions::default();
        options.passes.html = vec![HtmlPassKind::UtilityClasses, HtmlPassKind::HeadingIds];
        let err = Pipeline::new(options).unwrap_err();
        assert_eq!(err.pass(), Some("utility-classes"));
    }

    #[test]
    fn batch_keeps_input_order() {
        let pipeline = Pipeline::new(CompileOptions::default()).unwrap();
        let docs = vec![("a.md", "# A"), ("b.md", "# B"), ("c.md", "# C")];
        let slugs: Vec<String> = pipeline
            .compile_batch(&docs)
            .into_iter()
            .map(|r| r.unwrap().headings[0].slug.clone())
            .collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }
}
