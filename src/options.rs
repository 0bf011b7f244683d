//! Per-pipeline options.
//!
//! Every section deserializes with defaults for missing keys, so an options
//! document only needs to name what it overrides:
//!
//! ```
//! let options = mdforge::CompileOptions::from_json_str(
//!     r#"{ "align": { "center": "mx-auto" }, "wordsPerMinute": 250 }"#,
//! ).unwrap();
//! assert_eq!(options.align.center, "mx-auto");
//! assert_eq!(options.align.right, "text-right");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Markdown-tree passes, named the way option documents refer to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkdownPassKind {
    Abbreviations,
    Align,
    Attributes,
    Blockquote,
    Breaks,
    EmojiShortcodes,
    Linkify,
    Highlight,
    CodeTabs,
    CodeMeta,
    Replacements,
    Typography,
}

impl MarkdownPassKind {
    pub fn name(self) -> &'static str {
        match self {
            MarkdownPassKind::Abbreviations => "abbreviations",
            MarkdownPassKind::Align => "align",
            MarkdownPassKind::Attributes => "attributes",
            MarkdownPassKind::Blockquote => "blockquote",
            MarkdownPassKind::Breaks => "breaks",
            MarkdownPassKind::EmojiShortcodes => "emoji-shortcodes",
            MarkdownPassKind::Linkify => "linkify",
            MarkdownPassKind::Highlight => "highlight",
            MarkdownPassKind::CodeTabs => "code-tabs",
            MarkdownPassKind::CodeMeta => "code-meta",
            MarkdownPassKind::Replacements => "replacements",
            MarkdownPassKind::Typography => "typography",
        }
    }
}

/// HTML-tree passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HtmlPassKind {
    HeadingIds,
    Toc,
    AutolinkHeadings,
    CodeTabs,
    UtilityClasses,
    ColorSwatch,
    FootnoteTitles,
    AccessibleEmoji,
}

impl HtmlPassKind {
    pub fn name(self) -> &'static str {
        match self {
            HtmlPassKind::HeadingIds => "heading-ids",
            HtmlPassKind::Toc => "toc",
            HtmlPassKind::AutolinkHeadings => "autolink-headings",
            HtmlPassKind::CodeTabs => "code-tabs",
            HtmlPassKind::UtilityClasses => "utility-classes",
            HtmlPassKind::ColorSwatch => "color-swatch",
            HtmlPassKind::FootnoteTitles => "footnote-titles",
            HtmlPassKind::AccessibleEmoji => "accessible-emoji",
        }
    }
}

/// Enabled passes, in the order they run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PassList {
    pub markdown: Vec<MarkdownPassKind>,
    pub html: Vec<HtmlPassKind>,
}

impl Default for PassList {
    fn default() -> Self {
        PassList {
            markdown: vec![
                MarkdownPassKind::Abbreviations,
                MarkdownPassKind::Align,
                MarkdownPassKind::Attributes,
                MarkdownPassKind::Blockquote,
                MarkdownPassKind::Breaks,
                MarkdownPassKind::EmojiShortcodes,
                MarkdownPassKind::Linkify,
                MarkdownPassKind::Highlight,
                MarkdownPassKind::CodeTabs,
                MarkdownPassKind::CodeMeta,
                MarkdownPassKind::Replacements,
                MarkdownPassKind::Typography,
            ],
            html: vec![
                HtmlPassKind::HeadingIds,
                HtmlPassKind::Toc,
                HtmlPassKind::CodeTabs,
                HtmlPassKind::UtilityClasses,
                HtmlPassKind::ColorSwatch,
                HtmlPassKind::FootnoteTitles,
                HtmlPassKind::AccessibleEmoji,
            ],
        }
    }
}

/// Class overrides for the alignment pass, one per logical role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlignOptions {
    pub left: String,
    pub center: String,
    pub right: String,
    pub left_block: String,
    pub center_block: String,
    pub right_block: String,
    pub left_row_block: String,
    pub center_row_block: String,
    pub right_row_block: String,
}

impl Default for AlignOptions {
    fn default() -> Self {
        AlignOptions {
            left: "text-left".into(),
            center: "text-center".into(),
            right: "text-right".into(),
            left_block: "flex flex-col items-start".into(),
            center_block: "flex flex-col items-center".into(),
            right_block: "flex flex-col items-end".into(),
            left_row_block: "flex justify-start".into(),
            center_row_block: "flex justify-center".into(),
            right_row_block: "flex justify-end".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockquoteOptions {
    /// Class on every figure produced for a quote with metadata.
    pub class_name_attribution_figure: String,
    /// Extra figure class when a caption is present.
    pub class_name_caption_figure: String,
    pub class_name_attribution: String,
    pub class_name_caption: String,
    /// Leading text of an attribution line.
    pub marker: String,
    /// Leading text of a caption line.
    pub caption_prefix: String,
    pub remove_marker: bool,
    pub remove_caption_prefix: bool,
}

impl Default for BlockquoteOptions {
    fn default() -> Self {
        BlockquoteOptions {
            class_name_attribution_figure: "blockquote".into(),
            class_name_caption_figure: "blockquote-figure".into(),
            class_name_attribution: "blockquote-attribution".into(),
            class_name_caption: "blockquote-caption".into(),
            marker: "\u{2014}".into(),
            caption_prefix: "Source:".into(),
            remove_marker: true,
            remove_caption_prefix: true,
        }
    }
}

/// How ASCII dash runs are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashMode {
    /// `--` is an em dash.
    Default,
    /// `--` is an en dash, `---` an em dash.
    #[default]
    Oldschool,
    /// `--` is an em dash, `---` an en dash.
    Inverted,
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypographyOptions {
    pub quotes: bool,
    pub backticks: bool,
    pub ellipses: bool,
    pub dashes: DashMode,
}

impl Default for TypographyOptions {
    fn default() -> Self {
        TypographyOptions {
            quotes: true,
            backticks: true,
            ellipses: true,
            dashes: DashMode::Oldschool,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AbbreviationOptions {
    /// Write the first use of each abbreviation as `expansion (ABBR)`.
    pub expand_first: bool,
}

/// Table of contents generated under a matching heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TocOptions {
    /// Case-insensitive pattern the whole heading text must match.
    pub heading: String,
    /// Deepest heading level listed.
    pub max_depth: u8,
}

impl Default for TocOptions {
    fn default() -> Self {
        TocOptions {
            heading: "contents".into(),
            max_depth: 6,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplacementOptions {
    /// Rule names to skip, e.g. `multiplication`.
    pub disable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FootnoteOptions {
    /// Text of the hidden heading that opens the footnote section.
    pub label: String,
    /// `aria-label` of back-references; `$ref` is the reference number.
    pub back_label: String,
    /// `title` of back-references; `$id` is the footnote identifier.
    pub title_template: String,
    /// Prefix on generated ids so they cannot clobber page ids.
    pub clobber_prefix: String,
}

impl Default for FootnoteOptions {
    fn default() -> Self {
        FootnoteOptions {
            label: "Footnotes".into(),
            back_label: "Back to reference $ref".into(),
            title_template: "Back to reference $id".into(),
            clobber_prefix: "user-content-".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    pub passes: PassList,
    pub align: AlignOptions,
    pub blockquote: BlockquoteOptions,
    pub typography: TypographyOptions,
    pub replacements: ReplacementOptions,
    pub abbreviations: AbbreviationOptions,
    pub footnotes: FootnoteOptions,
    pub toc: TocOptions,
    pub words_per_minute: u32,
    /// Keep raw HTML from the document, and event-handler attributes from
    /// `{…}` attribute blocks, instead of dropping them.
    pub allow_dangerous_html: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            passes: PassList::default(),
            align: AlignOptions::default(),
            blockquote: BlockquoteOptions::default(),
            typography: TypographyOptions::default(),
            replacements: ReplacementOptions::default(),
            abbreviations: AbbreviationOptions::default(),
            footnotes: FootnoteOptions::default(),
            toc: TocOptions::default(),
            words_per_minute: 200,
            allow_dangerous_html: false,
        }
    }
}

impl CompileOptions {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Check option values and pass ordering.
    pub fn validate(&self) -> Result<()> {
        validate_unique(&self.passes.markdown, MarkdownPassKind::name)?;
        validate_unique(&self.passes.html, HtmlPassKind::name)?;

        let md_index = |kind: MarkdownPassKind| self.passes.markdown.iter().position(|k| *k == kind);
        if let (Some(grouping), Some(meta)) = (
            md_index(MarkdownPassKind::CodeTabs),
            md_index(MarkdownPassKind::CodeMeta),
        ) && meta < grouping
        {
            return Err(Error::config(
                MarkdownPassKind::CodeMeta.name(),
                "must run after the code-tabs grouping pass",
            ));
        }

        for early in [MarkdownPassKind::Attributes, MarkdownPassKind::Linkify] {
            for later in [MarkdownPassKind::Replacements, MarkdownPassKind::Typography] {
                if let (Some(a), Some(b)) = (md_index(early), md_index(later))
                    && b < a
                {
                    return Err(Error::config(
                        early.name(),
                        format!("must run before the {} pass", later.name()),
                    ));
                }
            }
        }
        for line_based in [MarkdownPassKind::Abbreviations, MarkdownPassKind::Blockquote] {
            if let (Some(a), Some(breaks)) = (md_index(line_based), md_index(MarkdownPassKind::Breaks))
                && breaks < a
            {
                return Err(Error::config(
                    MarkdownPassKind::Breaks.name(),
                    format!("must run after the {} pass", line_based.name()),
                ));
            }
        }

        let html_index = |kind: HtmlPassKind| self.passes.html.iter().position(|k| *k == kind);
        if let Some(ids) = html_index(HtmlPassKind::HeadingIds) {
            for dependent in [
                HtmlPassKind::UtilityClasses,
                HtmlPassKind::ColorSwatch,
                HtmlPassKind::FootnoteTitles,
                HtmlPassKind::AutolinkHeadings,
                HtmlPassKind::Toc,
            ] {
                if html_index(dependent).is_some_and(|i| i < ids) {
                    return Err(Error::config(
                        dependent.name(),
                        "must run after heading-ids",
                    ));
                }
            }
        }

        if self.passes.html.contains(&HtmlPassKind::FootnoteTitles)
            && self.footnotes.title_template.trim().is_empty()
        {
            return Err(Error::config(
                HtmlPassKind::FootnoteTitles.name(),
                "title template must not be empty",
            ));
        }
        if self.footnotes.label.trim().is_empty() {
            return Err(Error::config("footnotes", "footnote label must not be empty"));
        }
        if self.passes.html.contains(&HtmlPassKind::Toc) && !(1..=6).contains(&self.toc.max_depth) {
            return Err(Error::config(
                HtmlPassKind::Toc.name(),
                "maxDepth must be between 1 and 6",
            ));
        }
        if self.words_per_minute == 0 {
            return Err(Error::config("reading-time", "wordsPerMinute must be greater than zero"));
        }
        if self.blockquote.marker.is_empty() || self.blockquote.caption_prefix.is_empty() {
            return Err(Error::config(
                MarkdownPassKind::Blockquote.name(),
                "marker and caption prefix must not be empty",
            ));
        }
        Ok(())
    }
}

fn validate_unique<K: Copy + PartialEq>(kinds: &[K], name: fn(K) -> &'static str) -> Result<()> {
    for (i, kind) in kinds.iter().enumerate() {
        if kinds[..i].contains(kind) {
            return Err(Error::config(name(*kind), "listed more than once"));
        }
    }
    Ok(())
}
