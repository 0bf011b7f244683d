//! Group fenced code blocks into `<code-tabs>` elements.
//!
//! Sibling `pre` blocks that share a tab group become one tab set; every
//! other block gets a single-panel wrapper so all code renders in the same
//! frame. Diagrams, math and plain text stay bare.

use crate::hast::{Element, HNode};

pub const TAG: &str = "code-tabs";
pub const GROUP_ATTR: &str = "data-code-tabs-group";
pub const TAB_ATTR: &str = "data-code-tabs-tab";

const BARE_LANGUAGES: &[&str] = &["mermaid", "math", "text"];

pub fn run(tree: &mut HNode) {
    match tree {
        HNode::Root(children) => visit(children),
        HNode::Element(el) if el.tag_name != TAG => visit(&mut el.children),
        _ => {}
    }
}

fn visit(children: &mut Vec<HNode>) {
    wrap_runs(children);
    wrap_standalone(children);
    for child in children.iter_mut() {
        if let HNode::Element(el) = child
            && el.tag_name != TAG
        {
            visit(&mut el.children);
        }
    }
}

/// Tab group of a `pre`. Group and tab name are copied up from the `code`
/// child when the `pre` has none; a block needs both to count as a tab.
fn tab_group(pre: &mut Element) -> Option<String> {
    if let (Some(group), Some(tab)) = (pre.attr(GROUP_ATTR), pre.attr(TAB_ATTR))
        && !group.is_empty()
        && !tab.is_empty()
    {
        return Some(group.to_string());
    }
    let code = pre.children.iter().find_map(HNode::as_element)?;
    let group = code.attr(GROUP_ATTR).filter(|g| !g.is_empty())?.to_string();
    let tab = code.attr(TAB_ATTR).filter(|t| !t.is_empty())?.to_string();
    pre.set_attr(GROUP_ATTR, group.clone());
    pre.set_attr(TAB_ATTR, tab);
    Some(group)
}

fn pre_mut(node: &mut HNode) -> Option<&mut Element> {
    node.as_element_mut().filter(|el| el.tag_name == "pre")
}

fn wrap_runs(children: &mut Vec<HNode>) {
    let mut i = 0;
    while i < children.len() {
        let Some(start) = pre_mut(&mut children[i]).and_then(tab_group) else {
            i += 1;
            continue;
        };

        let mut panels = Vec::new();
        let mut last = i;
        for j in i..children.len() {
            if children[j].is_whitespace_text() {
                last = j;
                continue;
            }
            let same_group = pre_mut(&mut children[j])
                .and_then(tab_group)
                .is_some_and(|group| group == start);
            if !same_group {
                break;
            }
            panels.push(j);
            last = j;
        }

        if panels.len() < 2 {
            i += 1;
            continue;
        }
        let run: Vec<HNode> = children
            .drain(i..=last)
            .enumerate()
            .filter(|(offset, _)| panels.contains(&(i + offset)))
            .map(|(_, node)| node)
            .collect();
        log::trace!("grouped {} code blocks into tab set `{start}`", run.len());
        let wrapper = Element::new(TAG)
            .with_classes(&["code-tabs"])
            .with_attr(GROUP_ATTR, start)
            .with_children(run);
        children.insert(i, wrapper.into());
        i += 1;
    }
}

fn wrap_standalone(children: &mut [HNode]) {
    for child in children.iter_mut() {
        let Some(pre) = pre_mut(child) else {
            continue;
        };
        if language(pre).is_some_and(|lang| BARE_LANGUAGES.contains(&lang.to_ascii_lowercase().as_str())) {
            continue;
        }
        let mut wrapper = Element::new(TAG).with_classes(&["code-tabs"]);
        if let Some(group) = tab_group(pre) {
            wrapper.set_attr(GROUP_ATTR, group);
        }
        let pre = std::mem::replace(child, HNode::Text(String::new()));
        wrapper.children.push(pre);
        *child = wrapper.into();
    }
}

fn language(pre: &Element) -> Option<String> {
    if let Some(lang) = pre.attr("data-language").map(str::trim).filter(|l| !l.is_empty()) {
        return Some(lang.to_string());
    }
    let code = pre
        .children
        .iter()
        .filter_map(HNode::as_element)
        .find(|el| el.tag_name == "code")?;
    code.class_names
        .iter()
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .or_else(|| code.attr("data-language").map(str::trim).filter(|l| !l.is_empty()))
        .map(str::to_string)
}
