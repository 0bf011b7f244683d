//! End-to-end tests that compile complete fixture documents.

use mdforge::{CompileOptions, DashMode, Error, HtmlPassKind, MarkdownPassKind, Pipeline};

fn fixtures_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e))
}

fn compile(source: &str) -> String {
    mdforge::compile(source, &CompileOptions::default())
        .unwrap_or_else(|e| panic!("compile failed: {e}"))
        .html
}

/// Compile with only the given markdown passes and no HTML passes, so the
/// output shows the structure those passes produce.
fn compile_with(markdown: Vec<MarkdownPassKind>, source: &str) -> String {
    let pipeline = Pipeline::builder().passes(markdown, vec![]).build().unwrap();
    pipeline.compile("test.md", source).unwrap().html
}

fn position(html: &str, needle: &str) -> usize {
    html.find(needle)
        .unwrap_or_else(|| panic!("Expected {needle:?} in:\n{html}"))
}

#[test]
fn escaped_alignment_markers_stay_literal() {
    for keyword in ["left", "center", "right"] {
        let source = format!("\\[{keyword}]x[/{keyword}]");
        let html = compile_with(vec![MarkdownPassKind::Align], &source);
        assert_eq!(html, format!("<p>[{keyword}]x[/{keyword}]</p>"));
    }
}

#[test]
fn highlight_spans_do_not_overlap() {
    let html = compile_with(vec![MarkdownPassKind::Highlight], "==a==b==c==");
    assert_eq!(html, "<p><mark>a</mark>b==c==</p>");
}

#[test]
fn swatch_only_on_inline_code() {
    let html = compile(&read_fixture("article.md"));
    assert_eq!(html.matches("data-color-swatch=\"true\"").count(), 1, "{html}");
    assert!(html.contains("<code class=\"language-css\">.brand { color: #0969da; }\n</code>"), "{html}");
    assert!(html.contains(", not plain #0969da."), "{html}");
}

#[test]
fn code_tab_metadata_round_trips() {
    let html = compile("```js [g1:JavaScript] {1,3}\nconst a = 1\n```\n");
    assert!(html.contains("data-code-tabs-group=\"g1\""), "{html}");
    assert!(html.contains("data-code-tabs-tab=\"JavaScript\""), "{html}");
    assert!(html.contains("data-shiki-meta=\"{1,3}\""), "{html}");
    assert!(!html.contains("[g1:"), "{html}");
}

#[test]
fn code_tabs_fixture_groups_and_wraps() {
    let html = compile(&read_fixture("code_tabs.md"));
    assert_eq!(html.matches("<code-tabs").count(), 2, "{html}");

    let group = position(&html, "<code-tabs class=\"code-tabs border border-gray-200 rounded-md overflow-hidden\" data-code-tabs-group=\"install\">");
    let npm = position(&html, "data-code-tabs-tab=\"npm\"");
    let pnpm = position(&html, "data-code-tabs-tab=\"pnpm\"");
    assert!(group < npm && npm < pnpm);
    assert!(html.contains("data-shiki-meta=\"{2}\""), "{html}");
    assert!(html.contains("hidden peer-checked:block"), "{html}");

    let mermaid = position(&html, "language-mermaid");
    let before_mermaid = &html[..mermaid];
    assert!(before_mermaid.ends_with("lg:px-12\"><code class=\""), "{html}");
    assert!(html.contains("<code-tabs class=\"code-tabs border border-gray-200 rounded-md overflow-hidden\"><pre"), "{html}");
}

#[test]
fn blockquote_variants() {
    let html = compile_with(
        vec![MarkdownPassKind::Blockquote],
        &read_fixture("blockquotes.md"),
    );

    assert!(
        html.contains("<figure class=\"blockquote\">\n<blockquote>\n<p>Attribution only.</p>\n</blockquote>\n<figcaption class=\"blockquote-attribution\">\n<div>\n<p>Ada Lovelace</p>\n</div>\n</figcaption>\n</figure>"),
        "{html}"
    );
    assert!(
        html.contains("<figure class=\"blockquote blockquote-figure\">\n<blockquote>\n<p>Caption only.</p>\n</blockquote>\n<figcaption class=\"blockquote-caption\">Notes on the Analytical Engine</figcaption>\n</figure>"),
        "{html}"
    );
    assert!(
        html.contains("<blockquote cite=\"https://example.com/hopper\">\n<p>Both lines.</p>\n</blockquote>\n<div class=\"blockquote-attribution\">\n<div>\n<p>Grace Hopper</p>\n</div>\n</div>\n<figcaption class=\"blockquote-caption\">Interview</figcaption>"),
        "{html}"
    );
    assert!(html.ends_with("<blockquote>\n<p>Just a quote.</p>\n</blockquote>"), "{html}");
    assert_eq!(html.matches("<figure").count(), 3);
}

#[test]
fn typography_skips_code() {
    let html = compile("`\"Hello\" -- ...` and \"Hello\" -- ...");
    assert!(html.contains(">\"Hello\" -- ...</code>"), "{html}");
    assert!(html.contains(" and \u{201c}Hello\u{201d} \u{2013} \u{2026}</p>"), "{html}");
}

#[test]
fn center_block_wraps_children_in_order() {
    let source = "[center]\n\n## Title\n\nPara\n\n- one\n- two\n\n[/center]";
    let html = compile_with(vec![MarkdownPassKind::Align], source);
    assert_eq!(
        html,
        "<div class=\"flex flex-col items-center\">\n<h2>Title</h2>\n<p>Para</p>\n<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n</div>"
    );
}

#[test]
fn article_fixture_end_to_end() {
    let compiled = mdforge::compile(&read_fixture("article.md"), &CompileOptions::default()).unwrap();
    let html = &compiled.html;

    let slugs: Vec<_> = compiled.headings.iter().map(|h| h.slug.as_str()).collect();
    assert_eq!(slugs, vec!["field-notes", "overview"]);
    assert_eq!(compiled.headings[1].level, 2);

    assert!(html.contains("<div class=\"flex flex-col items-center\">"), "{html}");
    assert!(html.contains("Say \u{201c}hello\u{201d} \u{2013} it\u{2019}s polite\u{2026} and <mark"), "{html}");
    assert!(html.contains("<span role=\"img\" aria-label=\"rocket\">\u{1f680}</span>"), "{html}");
    assert!(html.contains("<p class=\"mb-8 text-lg leading-relaxed\">Edsger Dijkstra</p>"), "{html}");
    assert!(html.contains("<p class=\"mb-8 text-lg leading-relaxed\">1975</p>"), "{html}");
    assert!(html.contains("Arrows \u{2192} and fractions \u{bd} render nicely"), "{html}");
    assert!(html.contains("title=\"Back to reference source\""), "{html}");
    assert!(html.contains("aria-label=\"Back to reference 1\""), "{html}");
    assert!(compiled.reading_time.words > 40);
    assert_eq!(compiled.reading_time.minutes, 1);
}

#[test]
fn options_documents_agree() {
    let json = CompileOptions::from_json_str(&read_fixture("options.json")).unwrap();
    let yaml = CompileOptions::from_yaml_str(&read_fixture("options.yaml")).unwrap();
    let toml = CompileOptions::from_toml_str(&read_fixture("options.toml")).unwrap();
    assert_eq!(json, yaml);
    assert_eq!(json, toml);
    assert_eq!(json.typography.dashes, DashMode::Inverted);
    assert_eq!(json.words_per_minute, 120);

    let compiled = mdforge::compile(
        "[center]\n\nHi -- 2x4[^a]\n\n[/center]\n\n[^a]: Note",
        &json,
    )
    .unwrap();
    assert!(compiled.html.contains("<div class=\"grid place-items-center\">"), "{}", compiled.html);
    assert!(compiled.html.contains("Hi \u{2014} 2x4"), "{}", compiled.html);
    assert!(compiled.html.contains("title=\"Jump back to a\""), "{}", compiled.html);
}

#[test]
fn config_errors_name_pass_and_document() {
    let mut options = CompileOptions::default();
    options.replacements.disable = vec!["sparkles".into()];
    let err = mdforge::compile("text", &options).unwrap_err();
    assert_eq!(err.pass(), Some("replacements"));
    assert!(err.document().is_some());
    assert!(matches!(&err, Error::Document { source, .. } if matches!(**source, Error::Config { .. })));

    let mut options = CompileOptions::default();
    options.passes.html = vec![HtmlPassKind::FootnoteTitles, HtmlPassKind::HeadingIds];
    let err = Pipeline::new(options).unwrap_err();
    assert_eq!(err.pass(), Some("footnote-titles"));
    assert!(err.to_string().contains("footnote-titles"), "{err}");
}

#[test]
fn malformed_syntax_never_fails() {
    for source in [
        "[center]\nnever closed",
        "==open highlight",
        "> \u{2014}",
        "```js [broken\nx\n```",
        "[/right] stray close",
        "====",
    ] {
        mdforge::compile(source, &CompileOptions::default())
            .unwrap_or_else(|e| panic!("{source:?} failed: {e}"));
    }
}

#[test]
fn batch_compiles_documents_independently() {
    let pipeline = Pipeline::new(CompileOptions::default()).unwrap();
    let docs = vec![
        ("article.md".to_string(), read_fixture("article.md")),
        ("code_tabs.md".to_string(), read_fixture("code_tabs.md")),
        ("blockquotes.md".to_string(), read_fixture("blockquotes.md")),
    ];
    let results = pipeline.compile_batch(&docs);
    assert_eq!(results.len(), 3);
    for ((name, source), result) in docs.iter().zip(&results) {
        let compiled = result.as_ref().unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(compiled, &pipeline.compile(name, source).unwrap());
    }
}

#[test]
fn closed_raw_html_does_not_silence_typography() {
    for raw in ["<pre>code</pre>", "<script src=\"a.js\"></script>"] {
        let html = compile(&format!("{raw}\n\nHe said \"hi\" -- ok..."));
        assert!(html.contains("He said \u{201c}hi\u{201d} \u{2013} ok\u{2026}"), "{html}");
    }
}

#[test]
fn code_meta_keeps_inner_spacing() {
    let html = compile("```js [g:T] title=\"a   b\"\nx\n```\n");
    assert!(html.contains("data-shiki-meta=\"title=&quot;a   b&quot;\""), "{html}");
}

#[test]
fn attributes_and_abbreviations_end_to_end() {
    let compiled = mdforge::compile(
        "## Setup {#install}\n\nThe HTML page *renders*{.lead} fast.\n\n*[HTML]: Hyper Text Markup Language",
        &CompileOptions::default(),
    )
    .unwrap();
    let html = &compiled.html;
    assert_eq!(compiled.headings[0].slug, "install");
    assert!(html.contains("id=\"install\">Setup</h2>"), "{html}");
    assert!(html.contains("<abbr title=\"Hyper Text Markup Language\">HTML</abbr>"), "{html}");
    assert!(html.contains("<em class=\"lead\">renders</em> fast."), "{html}");
    assert!(!html.contains("*[HTML]"), "{html}");
}

#[test]
fn shortcodes_links_and_breaks() {
    let html = compile(":rocket: see https://example.com/docs.\nnext line");
    assert!(html.contains("<span role=\"img\" aria-label=\"rocket\">\u{1f680}</span>"), "{html}");
    assert!(html.contains("href=\"https://example.com/docs\">https://example.com/docs</a>.<br>\nnext line"), "{html}");
}

#[test]
fn table_of_contents_lists_following_headings() {
    let html = compile("## Contents\n\n## Alpha\n\n### Beta");
    let alpha = position(&html, "href=\"#alpha\">Alpha</a>");
    let beta = position(&html, "href=\"#beta\">Beta</a>");
    let heading = position(&html, "id=\"alpha\">Alpha</h2>");
    assert!(alpha < beta && beta < heading, "{html}");
}
