//! Markdown tree to HTML tree.
//!
//! Applies the default tag mapping for every markdown kind, moves pass
//! annotations ([`NodeData`]) onto the produced elements, and builds the
//! footnote section in reference order.

use std::collections::HashMap;

use crate::hast::{Element, HNode};
use crate::mdast::{ColumnAlign, MdKind, Node, NodeData};
use crate::options::FootnoteOptions;
use crate::template::{Template, TemplateContext};

/// Settings the converter needs from the compile options.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub footnote_label: String,
    pub footnote_back_label: Template,
    pub clobber_prefix: String,
    pub allow_dangerous_html: bool,
}

impl ConvertOptions {
    pub fn new(footnotes: &FootnoteOptions, allow_dangerous_html: bool) -> Self {
        ConvertOptions {
            footnote_label: footnotes.label.clone(),
            footnote_back_label: Template::new(footnotes.back_label.clone()),
            clobber_prefix: footnotes.clobber_prefix.clone(),
            allow_dangerous_html,
        }
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions::new(&FootnoteOptions::default(), false)
    }
}

/// Lower a markdown tree to an HTML tree.
pub fn to_hast(mut root: Node, options: &ConvertOptions) -> HNode {
    let mut definitions = HashMap::new();
    take_definitions(&mut root, &mut definitions);

    let mut converter = Converter {
        options,
        definitions,
        order: Vec::new(),
        counts: HashMap::new(),
    };
    let mut children = converter.all(root.children);
    if let Some(section) = converter.footnote_section() {
        children.push(section);
    }
    HNode::Root(wrap(children, false))
}

/// Remove footnote definitions from the tree, keyed by normalized id.
fn take_definitions(node: &mut Node, out: &mut HashMap<String, Node>) {
    let mut i = 0;
    while i < node.children.len() {
        if let MdKind::FootnoteDefinition(label) = &node.children[i].kind {
            let id = footnote_id(label);
            let def = node.children.remove(i);
            out.entry(id).or_insert(def);
            continue;
        }
        take_definitions(&mut node.children[i], out);
        i += 1;
    }
}

/// Lowercase the label and percent-encode anything unsafe in a URL fragment.
pub(crate) fn footnote_id(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

struct Converter<'a> {
    options: &'a ConvertOptions,
    definitions: HashMap<String, Node>,
    /// Footnote ids in order of first reference.
    order: Vec<String>,
    /// Number of references seen per footnote id.
    counts: HashMap<String, usize>,
}

impl Converter<'_> {
    fn all(&mut self, nodes: Vec<Node>) -> Vec<HNode> {
        nodes.into_iter().flat_map(|n| self.one(n)).collect()
    }

    fn one(&mut self, node: Node) -> Vec<HNode> {
        let Node {
            kind, children, data, ..
        } = node;
        let el = match kind {
            MdKind::Root => return self.all(children),
            MdKind::Text(value) => return vec![HNode::Text(value)],
            MdKind::Paragraph => Element::new("p").with_children(self.all(children)),
            MdKind::Heading(level) => {
                Element::new(format!("h{}", level.clamp(1, 6))).with_children(self.all(children))
            }
            MdKind::Blockquote => {
                Element::new("blockquote").with_children(wrap(self.all(children), true))
            }
            MdKind::List {
                ordered,
                start,
                spread,
            } => self.list(ordered, start, spread, children),
            MdKind::ListItem { checked } => self.list_item(checked, true, children),
            MdKind::Code { lang, value, .. } => return vec![code_block(lang, value, &data)],
            MdKind::InlineCode(value) => Element::new("code").with_children(vec![HNode::Text(value)]),
            MdKind::Emphasis => Element::new("em").with_children(self.all(children)),
            MdKind::Strong => Element::new("strong").with_children(self.all(children)),
            MdKind::Delete => Element::new("del").with_children(self.all(children)),
            MdKind::Mark => Element::new("mark").with_children(self.all(children)),
            MdKind::Abbr { title } => Element::new("abbr")
                .with_attr("title", title)
                .with_children(self.all(children)),
            MdKind::Link { url, title } => {
                let mut a = Element::new("a").with_attr("href", url);
                if let Some(title) = title {
                    a.set_attr("title", title);
                }
                a.with_children(self.all(children))
            }
            MdKind::Image { url, alt, title } => {
                let mut img = Element::new("img").with_attr("src", url).with_attr("alt", alt);
                if let Some(title) = title {
                    img.set_attr("title", title);
                }
                img
            }
            MdKind::FootnoteReference(label) => return self.footnote_reference(&label),
            MdKind::FootnoteDefinition(_) => return Vec::new(),
            MdKind::Break => return vec![Element::new("br").into(), HNode::text("\n")],
            MdKind::ThematicBreak => Element::new("hr"),
            MdKind::Html(value) => {
                return if self.options.allow_dangerous_html {
                    vec![HNode::Raw(value)]
                } else {
                    Vec::new()
                };
            }
            MdKind::Table(aligns) => self.table(&aligns, children),
            MdKind::TableRow { .. } => Element::new("tr").with_children(wrap(self.all(children), true)),
            MdKind::TableCell => Element::new("td").with_children(self.all(children)),
            MdKind::Container => Element::new("div").with_children(wrap(self.all(children), true)),
        };
        vec![apply_data(el, &data).into()]
    }

    fn list(&mut self, ordered: bool, start: Option<u64>, spread: bool, items: Vec<Node>) -> Element {
        let mut list = Element::new(if ordered { "ol" } else { "ul" });
        if ordered && let Some(start) = start.filter(|s| *s != 1) {
            list.set_attr("start", start.to_string());
        }
        let mut has_tasks = false;
        let mut children = Vec::with_capacity(items.len());
        for item in items {
            let Node {
                kind, children: content, data, ..
            } = item;
            let li = match kind {
                MdKind::ListItem { checked } => {
                    has_tasks |= checked.is_some();
                    self.list_item(checked, spread, content)
                }
                other => {
                    let node = Node {
                        kind: other,
                        children: content,
                        data: NodeData::default(),
                        position: None,
                    };
                    children.extend(self.one(node));
                    continue;
                }
            };
            children.push(apply_data(li, &data).into());
        }
        if has_tasks {
            list.add_classes(&["contains-task-list"]);
        }
        list.with_children(wrap(children, true))
    }

    fn list_item(&mut self, checked: Option<bool>, spread: bool, content: Vec<Node>) -> Element {
        let mut children = Vec::new();
        for node in content {
            if !spread && node.is_paragraph() && node.data == NodeData::default() {
                children.extend(self.all(node.children));
            } else {
                children.extend(self.one(node));
            }
        }
        if spread {
            children = wrap(children, true);
        }
        let mut li = Element::new("li");
        if let Some(checked) = checked {
            li.add_classes(&["task-list-item"]);
            let mut input = Element::new("input")
                .with_attr("type", "checkbox")
                .with_attr("disabled", "");
            if checked {
                input.set_attr("checked", "");
            }
            let boxed = vec![input.into(), HNode::text(" ")];
            match children.iter_mut().find(|c| c.is_element("p")) {
                Some(HNode::Element(p)) if spread => {
                    p.children.splice(0..0, boxed);
                }
                _ => {
                    children.splice(0..0, boxed);
                }
            }
        }
        li.with_children(children)
    }

    fn table(&mut self, aligns: &[ColumnAlign], rows: Vec<Node>) -> Element {
        let mut head = Vec::new();
        let mut body = Vec::new();
        for row in rows {
            let is_head = matches!(row.kind, MdKind::TableRow { head: true });
            let cell_tag = if is_head { "th" } else { "td" };
            let cells: Vec<HNode> = row
                .children
                .into_iter()
                .enumerate()
                .map(|(i, cell)| {
                    let mut el = Element::new(cell_tag).with_children(self.all(cell.children));
                    match aligns.get(i) {
                        Some(ColumnAlign::Left) => el.set_attr("align", "left"),
                        Some(ColumnAlign::Center) => el.set_attr("align", "center"),
                        Some(ColumnAlign::Right) => el.set_attr("align", "right"),
                        _ => {}
                    }
                    el.into()
                })
                .collect();
            let tr: HNode = Element::new("tr").with_children(wrap(cells, true)).into();
            if is_head { head.push(tr) } else { body.push(tr) }
        }
        let mut sections = vec![Element::new("thead").with_children(wrap(head, true)).into()];
        if !body.is_empty() {
            sections.push(Element::new("tbody").with_children(wrap(body, true)).into());
        }
        Element::new("table").with_children(wrap(sections, true))
    }

    fn footnote_reference(&mut self, label: &str) -> Vec<HNode> {
        let id = footnote_id(label);
        if !self.definitions.contains_key(&id) {
            return vec![HNode::Text(format!("[^{label}]"))];
        }
        if !self.order.contains(&id) {
            self.order.push(id.clone());
        }
        let count = self.counts.entry(id.clone()).or_insert(0);
        *count += 1;
        let reuse = *count;
        let number = self.order.iter().position(|o| *o == id).map_or(1, |p| p + 1);

        let prefix = &self.options.clobber_prefix;
        let suffix = if reuse > 1 { format!("-{reuse}") } else { String::new() };
        let a = Element::new("a")
            .with_attr("href", format!("#{prefix}fn-{id}"))
            .with_attr("id", format!("{prefix}fnref-{id}{suffix}"))
            .with_attr("data-footnote-ref", "")
            .with_attr("aria-describedby", "footnote-label")
            .with_children(vec![HNode::Text(number.to_string())]);
        vec![Element::new("sup").with_children(vec![a.into()]).into()]
    }

    fn footnote_section(&mut self) -> Option<HNode> {
        if self.order.is_empty() {
            return None;
        }
        let prefix = self.options.clobber_prefix.clone();
        let mut items = Vec::new();
        // Definitions may reference further footnotes, growing `order`.
        let mut index = 0;
        while index < self.order.len() {
            let id = self.order[index].clone();
            index += 1;
            let Some(def) = self.definitions.remove(&id) else {
                continue;
            };
            let mut content = self.all(def.children);
            let backrefs = self.backrefs(&id, index, &prefix);
            match content.iter_mut().rev().find(|c| c.is_element("p")) {
                Some(HNode::Element(p)) => {
                    p.children.push(HNode::text(" "));
                    p.children.extend(backrefs);
                }
                _ => content.extend(backrefs),
            }
            let li = Element::new("li")
                .with_attr("id", format!("{prefix}fn-{id}"))
                .with_children(wrap(content, true));
            items.push(li.into());
        }

        let heading = Element::new("h2")
            .with_classes(&["sr-only"])
            .with_attr("id", "footnote-label")
            .with_children(vec![HNode::Text(self.options.footnote_label.clone())]);
        let list = Element::new("ol").with_children(wrap(items, true));
        let section = Element::new("section")
            .with_classes(&["footnotes"])
            .with_attr("data-footnotes", "")
            .with_children(wrap(vec![heading.into(), list.into()], true));
        Some(section.into())
    }

    fn backrefs(&self, id: &str, number: usize, prefix: &str) -> Vec<HNode> {
        let count = self.counts.get(id).copied().unwrap_or(1);
        let mut out = Vec::new();
        for reuse in 1..=count {
            let suffix = if reuse > 1 { format!("-{reuse}") } else { String::new() };
            let reference = if reuse > 1 {
                format!("{number}-{reuse}")
            } else {
                number.to_string()
            };
            let mut ctx = TemplateContext::new();
            ctx.insert("ref", reference);
            let mut children = vec![HNode::text("\u{21a9}")];
            if reuse > 1 {
                children.push(
                    Element::new("sup")
                        .with_children(vec![HNode::Text(reuse.to_string())])
                        .into(),
                );
            }
            if reuse > 1 {
                out.push(HNode::text(" "));
            }
            let a = Element::new("a")
                .with_classes(&["data-footnote-backref"])
                .with_attr("href", format!("#{prefix}fnref-{id}{suffix}"))
                .with_attr("data-footnote-backref", "")
                .with_attr("aria-label", self.options.footnote_back_label.render(&ctx))
                .with_children(children);
            out.push(a.into());
        }
        out
    }
}

fn code_block(lang: Option<String>, value: String, data: &NodeData) -> HNode {
    let mut code = Element::new("code");
    if let Some(lang) = lang {
        code.add_classes(&[format!("language-{lang}")]);
    }
    if let Some(tab) = &data.code_tabs {
        code.set_attr("data-code-tabs-group", tab.group.clone());
        code.set_attr("data-code-tabs-tab", tab.tab.clone());
    }
    if let Some(meta) = &data.shiki_meta {
        code.set_attr("data-shiki-meta", meta.clone());
    }
    apply_properties(&mut code, data);
    let text = if value.is_empty() { value } else { format!("{value}\n") };
    let code = code.with_children(vec![HNode::Text(text)]);
    let mut pre = Element::new("pre").with_children(vec![code.into()]);
    pre.add_classes(&data.class_names);
    pre.into()
}

fn apply_data(mut el: Element, data: &NodeData) -> Element {
    if let Some(tag) = &data.h_name {
        el.tag_name = tag.clone();
    }
    el.add_classes(&data.class_names);
    if let Some(cite) = &data.cite {
        el.set_attr("cite", cite.clone());
    }
    apply_properties(&mut el, data);
    el
}

fn apply_properties(el: &mut Element, data: &NodeData) {
    if let Some(id) = &data.id {
        el.set_attr("id", id.clone());
    }
    for (name, value) in &data.properties {
        el.set_attr(name, value.clone());
    }
}

/// Separate block siblings with newline text nodes, optionally padding the ends.
fn wrap(nodes: Vec<HNode>, loose: bool) -> Vec<HNode> {
    let mut out = Vec::with_capacity(nodes.len() * 2 + 1);
    if loose && !nodes.is_empty() {
        out.push(HNode::text("\n"));
    }
    let len = nodes.len();
    for (i, node) in nodes.into_iter().enumerate() {
        out.push(node);
        if i + 1 < len {
            out.push(HNode::text("\n"));
        }
    }
    if loose && len > 0 {
        out.push(HNode::text("\n"));
    }
    out
}
