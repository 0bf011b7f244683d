//! Fenced-code meta handling.
//!
//! The grouping pass lifts a `[group:Tab Label]` token out of the fence meta
//! string; the preservation pass keeps whatever meta is left for a syntax
//! highlighter as `data-shiki-meta`. Grouping must run first so the token
//! never leaks into the preserved meta.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::md_passes::for_each_code;
use crate::mdast::{CodeTab, MdKind, Node};

static TAB_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]:\s]+):([^\[\]]+)\]").expect("valid tab token pattern"));

/// Find a `[group:tab]` token. Returns the tab info and the meta with the
/// token removed, or `None` when there is no token.
pub fn extract_tab(meta: &str) -> Option<(CodeTab, Option<String>)> {
    let caps = TAB_TOKEN.captures(meta)?;
    let whole = caps.get(0)?;
    let group = caps.get(1)?.as_str().trim();
    let tab = caps.get(2)?.as_str().trim();
    if group.is_empty() || tab.is_empty() {
        return None;
    }

    let before = meta[..whole.start()].trim_end();
    let after = meta[whole.end()..].trim_start();
    let rest = format!("{before} {after}").trim().to_string();
    let tab = CodeTab {
        group: group.to_string(),
        tab: tab.to_string(),
    };
    Some((tab, if rest.is_empty() { None } else { Some(rest) }))
}

pub fn group_tabs(tree: &mut Node) {
    for_each_code(tree, &mut |code| {
        let MdKind::Code { meta, .. } = &mut code.kind else {
            return;
        };
        let Some((tab, rest)) = meta.as_deref().and_then(extract_tab) else {
            return;
        };
        *meta = rest;
        code.data.code_tabs = Some(tab);
    });
}

pub fn preserve_meta(tree: &mut Node) {
    for_each_code(tree, &mut |code| {
        if let MdKind::Code {
            meta: Some(meta), ..
        } = &code.kind
            && !meta.trim().is_empty()
        {
            code.data.shiki_meta = Some(meta.clone());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use pretty_assertions::assert_eq;

    fn code_of(tree: &Node) -> &Node {
        &tree.children[0]
    }

    #[test]
    fn token_is_lifted_and_rest_preserved() {
        let mut tree = parse("```js [g1:JavaScript] {1,3}\nlet a;\n```\n");
        group_tabs(&mut tree);
        preserve_meta(&mut tree);
        let code = code_of(&tree);
        assert_eq!(
            code.data.code_tabs,
            Some(CodeTab {
                group: "g1".into(),
                tab: "JavaScript".into(),
            })
        );
        assert_eq!(code.data.shiki_meta.as_deref(), Some("{1,3}"));
    }

    #[test]
    fn token_anywhere_in_meta() {
        let (tab, rest) = extract_tab("title=\"a.ts\" [pm:npm install] showLineNumbers").unwrap();
        assert_eq!(tab.group, "pm");
        assert_eq!(tab.tab, "npm install");
        assert_eq!(rest.as_deref(), Some("title=\"a.ts\" showLineNumbers"));
    }

    #[test]
    fn spacing_inside_rest_is_kept() {
        let (_, rest) = extract_tab("[g:T] title=\"a   b\"").unwrap();
        assert_eq!(rest.as_deref(), Some("title=\"a   b\""));

        let (_, rest) = extract_tab("{1,3}  [g:T]   title=\"x  y\"  ").unwrap();
        assert_eq!(rest.as_deref(), Some("{1,3} title=\"x  y\""));
    }

    #[test]
    fn only_token_leaves_no_meta() {
        let mut tree = parse("```sh [pm:yarn]\nyarn\n```\n");
        group_tabs(&mut tree);
        preserve_meta(&mut tree);
        let code = code_of(&tree);
        assert!(code.data.code_tabs.is_some());
        assert_eq!(code.data.shiki_meta, None);
        assert!(matches!(&code.kind, MdKind::Code { meta: None, .. }));
    }

    #[test]
    fn no_token_leaves_block_alone() {
        let mut tree = parse("```js {1,3}\nx\n```\n");
        let before = tree.clone();
        group_tabs(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn meta_without_grouping_is_preserved_verbatim() {
        let mut tree = parse("```js [g1:JS] {2}\nx\n```\n");
        preserve_meta(&mut tree);
        assert_eq!(code_of(&tree).data.shiki_meta.as_deref(), Some("[g1:JS] {2}"));
    }

    #[test]
    fn nested_code_blocks_are_found() {
        let mut tree = parse("> ```py [g:Python]\n> pass\n> ```\n");
        group_tabs(&mut tree);
        let code = &tree.children[0].children[0];
        assert_eq!(code.data.code_tabs.as_ref().map(|t| t.tab.as_str()), Some("Python"));
    }
}
