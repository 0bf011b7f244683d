//! `{.class #id key=value}` attribute blocks.
//!
//! A block directly after emphasis, strong, strikethrough, inline code, a
//! link or an image applies to that node. A block at the end of an ATX
//! heading, or alone in the paragraph right after any heading, applies to
//! the heading. A block at the start of a fenced code block's meta applies to
//! the `code` element. `[[…]]` is accepted wherever `{…}` is.
//!
//! Event-handler attributes (`on…`) are dropped unless dangerous HTML is
//! allowed. A block that does not parse is left as literal text.

use crate::mdast::{MdKind, Node, NodeData};

/// Attributes parsed from one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBlock {
    pub classes: Vec<String>,
    pub id: Option<String>,
    pub properties: Vec<(String, String)>,
}

impl AttributeBlock {
    fn apply(self, data: &mut NodeData) {
        for class in self.classes {
            if !data.class_names.contains(&class) {
                data.class_names.push(class);
            }
        }
        if self.id.is_some() {
            data.id = self.id;
        }
        for (name, value) in self.properties {
            match data.properties.iter_mut().find(|(key, _)| *key == name) {
                Some(slot) => slot.1 = value,
                None => data.properties.push((name, value)),
            }
        }
    }

    fn without_event_handlers(mut self) -> Self {
        self.properties
            .retain(|(name, _)| !name.to_ascii_lowercase().starts_with("on"));
        self
    }
}

/// Parse a block at the start of `text`. Returns the attributes and the
/// number of bytes consumed.
pub fn parse_block(text: &str) -> Option<(AttributeBlock, usize)> {
    if let Some(rest) = text.strip_prefix('{') {
        let close = find_close(rest, "}")?;
        let block = parse_inner(&rest[..close])?;
        return Some((block, close + 2));
    }
    let lead = usize::from(text.starts_with(" [["));
    let rest = text[lead..].strip_prefix("[[")?;
    let close = find_close(rest, "]]")?;
    let block = parse_inner(&rest[..close])?;
    Some((block, lead + 2 + close + 2))
}

/// Offset of `close` in `text`, ignoring anything inside quotes.
fn find_close(text: &str, close: &str) -> Option<usize> {
    let mut quote = None;
    for (at, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if text[at..].starts_with(close) => return Some(at),
            None => {}
        }
    }
    None
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')
}

/// Parse the tokens between the delimiters; `None` unless every token is
/// well formed and there is at least one.
fn parse_inner(inner: &str) -> Option<AttributeBlock> {
    let mut block = AttributeBlock::default();
    let mut rest = inner.trim_start();
    if rest.is_empty() {
        return None;
    }
    while !rest.is_empty() {
        let tail = if let Some(class) = rest.strip_prefix('.') {
            let (name, tail) = take_while(class, |c| !c.is_whitespace());
            block.classes.push(non_empty(name)?);
            tail
        } else if let Some(id) = rest.strip_prefix('#') {
            let (name, tail) = take_while(id, |c| !c.is_whitespace());
            block.id = Some(non_empty(name)?);
            tail
        } else {
            let (name, tail) = take_while(rest, is_name_char);
            if !name.starts_with(is_name_start) {
                return None;
            }
            let (value, tail) = match tail.strip_prefix('=') {
                Some(value) => parse_value(value)?,
                None => (String::new(), tail),
            };
            match name {
                "class" => block.classes.extend(value.split_whitespace().map(str::to_string)),
                "id" => block.id = Some(value),
                _ => block.properties.push((name.to_string(), value)),
            }
            tail
        };
        if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
            return None;
        }
        rest = tail.trim_start();
    }
    Some(block)
}

fn non_empty(name: &str) -> Option<String> {
    (!name.is_empty()).then(|| name.to_string())
}

fn take_while(text: &str, keep: impl Fn(char) -> bool) -> (&str, &str) {
    let end = text.find(|c: char| !keep(c)).unwrap_or(text.len());
    text.split_at(end)
}

fn parse_value(text: &str) -> Option<(String, &str)> {
    match text.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let body = &text[1..];
            let end = body.find(q)?;
            Some((body[..end].to_string(), &body[end + 1..]))
        }
        _ => {
            let (value, tail) = take_while(text, |c| !c.is_whitespace() && c != '"' && c != '\'');
            Some((value.to_string(), tail))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attributes {
    allow_event_handlers: bool,
}

impl Attributes {
    pub fn new(allow_dangerous_html: bool) -> Self {
        Attributes {
            allow_event_handlers: allow_dangerous_html,
        }
    }

    fn filter(&self, block: AttributeBlock) -> AttributeBlock {
        if self.allow_event_handlers {
            block
        } else {
            block.without_event_handlers()
        }
    }

    pub fn run(&self, tree: &mut Node, source: &str) {
        self.visit(tree, source);
    }

    fn visit(&self, parent: &mut Node, source: &str) {
        let mut i = 0;
        while i < parent.children.len() {
            match parent.children[i].kind {
                MdKind::Emphasis
                | MdKind::Strong
                | MdKind::Delete
                | MdKind::InlineCode(_)
                | MdKind::Link { .. }
                | MdKind::Image { .. } => self.inline(parent, i),
                MdKind::Heading(_) => {
                    self.heading_inline(&mut parent.children[i], source);
                    self.heading_next_line(parent, i);
                }
                MdKind::Code { .. } => self.code(&mut parent.children[i]),
                _ => {}
            }
            self.visit(&mut parent.children[i], source);
            i += 1;
        }
    }

    /// Block in the text node right after an inline node.
    fn inline(&self, parent: &mut Node, index: usize) {
        let Some(MdKind::Text(next)) = parent.children.get(index + 1).map(|n| &n.kind) else {
            return;
        };
        let Some((block, consumed)) = parse_block(next) else {
            return;
        };
        let rest = next[consumed..].to_string();
        self.filter(block).apply(&mut parent.children[index].data);
        if rest.is_empty() {
            parent.children.remove(index + 1);
        } else {
            parent.children[index + 1].kind = MdKind::Text(rest);
        }
    }

    /// `# Title {.x}`: a block closing the last text of an ATX heading.
    fn heading_inline(&self, heading: &mut Node, source: &str) {
        if is_setext(heading, source) {
            return;
        }
        let Some(last) = heading.children.last() else {
            return;
        };
        let Some(text) = last.text_value() else {
            return;
        };
        let open = if text.ends_with('}') {
            text.rfind('{')
        } else if text.ends_with("]]") {
            text.rfind("[[")
        } else {
            None
        };
        let Some(open) = open else {
            return;
        };
        let Some((block, consumed)) = parse_block(&text[open..]) else {
            return;
        };
        let title = text[..open].trim_end();
        let alone = heading.children.len() == 1;
        if open + consumed != text.len() || (alone && title.is_empty()) {
            return;
        }
        if title.is_empty() {
            heading.children.pop();
        } else {
            let title = title.to_string();
            if let Some(last) = heading.children.last_mut() {
                last.kind = MdKind::Text(title);
            }
        }
        self.filter(block).apply(&mut heading.data);
    }

    /// A paragraph holding only a block, right after a heading.
    fn heading_next_line(&self, parent: &mut Node, index: usize) {
        let Some(next) = parent.children.get(index + 1) else {
            return;
        };
        if !next.is_paragraph() || next.children.len() != 1 {
            return;
        }
        let Some(text) = next.children[0].text_value() else {
            return;
        };
        let Some((block, consumed)) = parse_block(text) else {
            return;
        };
        if consumed != text.len() {
            return;
        }
        self.filter(block).apply(&mut parent.children[index].data);
        parent.children.remove(index + 1);
    }

    /// ```` ```lang {.x key=v} ````: a block at the start of the meta.
    fn code(&self, code: &mut Node) {
        let MdKind::Code {
            lang: Some(_),
            meta: Some(meta),
            ..
        } = &code.kind
        else {
            return;
        };
        if let Some((block, _)) = parse_block(meta.trim_start()) {
            let block = self.filter(block);
            code.data.id = block.id.or(code.data.id.take());
            code.data.properties.extend(block.properties);
            code.data.class_names.extend(block.classes);
        }
    }
}

/// Setext headings span more than one source line.
fn is_setext(heading: &Node, source: &str) -> bool {
    heading
        .position
        .and_then(|p| source.get(p.start..p.end))
        .is_some_and(|s| s.trim_end().contains('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertOptions, to_hast};
    use crate::parse::parse;
    use crate::render_html::to_html;
    use pretty_assertions::assert_eq;

    fn render_with(source: &str, allow: bool) -> String {
        let mut tree = parse(source);
        Attributes::new(allow).run(&mut tree, source);
        to_html(&to_hast(tree, &ConvertOptions::default()))
    }

    fn render(source: &str) -> String {
        render_with(source, false)
    }

    #[test]
    fn parses_classes_ids_and_values() {
        let (block, consumed) = parse_block("{.a .b #main key=v title=\"two words\" flag} tail").unwrap();
        assert_eq!(consumed, "{.a .b #main key=v title=\"two words\" flag}".len());
        assert_eq!(block.classes, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(block.id.as_deref(), Some("main"));
        assert_eq!(
            block.properties,
            vec![
                ("key".to_string(), "v".to_string()),
                ("title".to_string(), "two words".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_blocks() {
        assert_eq!(parse_block("{}"), None);
        assert_eq!(parse_block("{1,3}"), None);
        assert_eq!(parse_block("[[data-id=\"title\""), None);
        assert_eq!(parse_block("data-id=\"title\"]]"), None);
        assert_eq!(parse_block("{title=\"open}"), None);
    }

    #[test]
    fn inline_elements() {
        let html = render("*test*{style=em:4} and **multiple**{style=color:pink} and `tag`{.highlight}");
        assert_eq!(
            html,
            "<p><em style=\"em:4\">test</em> and <strong style=\"color:pink\">multiple</strong> and \
             <code class=\"highlight\">tag</code></p>"
        );
    }

    #[test]
    fn links_and_images() {
        let html = render("[Test link](https://ache.one){ping=https://ache.one/big.brother}");
        assert!(html.contains("<a href=\"https://ache.one\" ping=\"https://ache.one/big.brother\">Test link</a>"), "{html}");

        let html = render("![Alt text](https://example.com/image.png){.centered width=300}");
        assert!(html.contains("class=\"centered\""), "{html}");
        assert!(html.contains("width=\"300\""), "{html}");
    }

    #[test]
    fn double_bracket_syntax_with_leading_space() {
        let html = render("**Bold** [[.note]] after");
        assert_eq!(html, "<p><strong class=\"note\">Bold</strong> after</p>");
    }

    #[test]
    fn heading_inline_and_next_line() {
        assert_eq!(
            render("# Title of the article {data-id=\"title\"}"),
            "<h1 data-id=\"title\">Title of the article</h1>"
        );
        assert_eq!(
            render("# Title of the article[[data-id=\"title\"]]"),
            "<h1 data-id=\"title\">Title of the article</h1>"
        );
        assert_eq!(
            render("# Title of the article\n{data-id=\"title\"}"),
            "<h1 data-id=\"title\">Title of the article</h1>"
        );
        assert_eq!(
            render("Title of the article\n====================\n\n{data-id=\"title\"}"),
            "<h1 data-id=\"title\">Title of the article</h1>"
        );
    }

    #[test]
    fn setext_heading_keeps_inline_block() {
        let html = render("Title of the article [[data-id=\"title\"]]\n====================");
        assert!(html.contains("Title of the article [[data-id=\"title\"]]"), "{html}");
    }

    #[test]
    fn heading_id_and_class() {
        assert_eq!(
            render("## Setup {#install .wide}"),
            "<h2 class=\"wide\" id=\"install\">Setup</h2>"
        );
    }

    #[test]
    fn code_block_meta() {
        assert_eq!(
            render("```lang {info=string}\nThis is an awesome code\n```\n"),
            "<pre><code class=\"language-lang\" info=\"string\">This is an awesome code\n</code></pre>"
        );
    }

    #[test]
    fn heading_with_inline_markup() {
        assert_eq!(
            render("# Using *mdforge* {.lead}"),
            "<h1 class=\"lead\">Using <em>mdforge</em></h1>"
        );
    }

    #[test]
    fn line_range_meta_is_not_attributes() {
        let html = render("```js {1,3}\nx\n```\n");
        assert_eq!(html, "<pre><code class=\"language-js\">x\n</code></pre>");
    }

    #[test]
    fn event_handlers_need_dangerous_html() {
        let source = "**x**{onclick=\"alert(1)\" style=\"color: red;\"}";
        let html = render(source);
        assert!(!html.contains("onclick"), "{html}");
        assert!(html.contains("style=\"color: red;\""), "{html}");

        let html = render_with(source, true);
        assert!(html.contains("onclick=\"alert(1)\""), "{html}");
    }

    #[test]
    fn unparsed_block_stays_literal() {
        assert_eq!(render("*a*{=nope}"), "<p><em>a</em>{=nope}</p>");
    }
}
