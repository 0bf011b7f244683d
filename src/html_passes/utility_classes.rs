//! Tailwind utility classes for rendered markdown.
//!
//! Classes are appended after whatever earlier passes put on an element, so
//! alignment and blockquote classes survive.

use crate::hast::{Element, HNode};
use crate::html_passes::code_tabs;

const SIMPLE: &[(&str, &[&str])] = &[
    ("p", &["mb-8", "text-lg", "leading-relaxed"]),
    (
        "img",
        &[
            "block", "mx-auto", "mb-8", "max-w-full", "h-auto", "rounded-lg", "shadow-md",
            "text-gray-500", "italic", "text-center",
        ],
    ),
    ("figure", &["my-8", "mx-auto", "max-w-none", "text-center"]),
    ("figcaption", &["text-base", "italic", "pt-3"]),
    (
        "hr",
        &["bg-gray-300", "border-0", "border-gray-300", "my-16", "mx-auto", "text-center", "w-96", "h-px"],
    ),
    ("ul", &["list-disc", "list-outside", "pl-4", "mb-8"]),
    ("ol", &["list-decimal", "list-outside", "pl-4", "mb-8"]),
    ("li", &["mb-1", "last:mb-0"]),
    ("mark", &["bg-gray-300", "text-gray-900"]),
    (
        "table",
        &[
            "w-full", "border-collapse", "border", "border-gray-300", "dark:border-gray-600", "my-6",
            "rounded-lg", "overflow-hidden",
        ],
    ),
    (
        "th",
        &[
            "bg-gray-100", "dark:bg-gray-700", "px-4", "py-2", "text-left", "font-semibold", "border-b",
            "border-gray-300", "dark:border-gray-600",
        ],
    ),
    ("td", &["px-4", "py-2", "border-b", "border-gray-200", "dark:border-gray-700"]),
    ("summary", &["outline-none", "select-none", "cursor-pointer", "list-none", "marker:hidden"]),
    ("details", &["mb-8", "[&>*:not(summary)]:pl-5"]),
    (
        "blockquote",
        &["border-l-4", "border-blue-600", "my-8", "pl-14", "-ml-14", "font-serif", "text-2xl", "italic"],
    ),
];

const HEADING: &[&str] = &["mb-2", "mt-6", "relative", "first:mt-0", "group"];

const LINK: &[&str] = &[
    "border-b",
    "border-current",
    "shadow-[inset_0_-2px_0_0_currentColor]",
    "hover:border-blue-600",
    "hover:shadow-[inset_0_-2px_0_0_var(--color-link-shadow)]",
    "hover:text-gray-900",
    "focus:border-blue-600",
    "focus:shadow-[inset_0_-2px_0_0_var(--color-link-shadow)]",
    "focus:text-gray-900",
    "focus:outline-none",
    "transition-colors",
];

const HEADING_ANCHOR: &[&str] = &[
    "hidden",
    "md:block",
    "absolute",
    "-left-4",
    "top-0",
    "w-4",
    "opacity-0",
    "group-hover:opacity-75",
    "hover:!opacity-100",
    "focus:!opacity-100",
    "border-0",
    "shadow-none",
];

const INLINE_CODE: &[&str] = &[
    "bg-gray-100",
    "rounded",
    "border",
    "border-gray-300",
    "inline-block",
    "font-mono",
    "text-xs",
    "mx-1",
    "px-2",
    "py-1",
];

const PRE: &[&str] = &[
    "block",
    "text-base",
    "px-6",
    "py-8",
    "overflow-x-auto",
    "bg-gray-900",
    "text-gray-100",
    "rounded-lg",
    "my-8",
    "lg:px-12",
];

const CODE_TABS: &[&str] = &["border", "border-gray-200", "rounded-md", "overflow-hidden"];

/// Shown when the panel's tab input is checked.
const TAB_PANEL: &str = "peer-checked:block";

pub fn run(tree: &mut HNode) {
    match tree {
        HNode::Root(children) => visit(children, None),
        HNode::Element(el) => {
            apply(el, None, 0);
            let tag = el.tag_name.clone();
            visit(&mut el.children, Some(&tag));
        }
        _ => {}
    }
}

fn visit(children: &mut [HNode], parent: Option<&str>) {
    let mut panel = 0;
    for child in children {
        let HNode::Element(el) = child else {
            continue;
        };
        apply(el, parent, panel);
        if el.tag_name == "pre" {
            panel += 1;
        }
        let tag = el.tag_name.clone();
        visit(&mut el.children, Some(&tag));
    }
}

/// Append the classes for one element; `panel` counts the `pre` siblings
/// before it.
fn apply(el: &mut Element, parent: Option<&str>, panel: usize) {
    if let Some(&(_, classes)) = SIMPLE.iter().find(|(tag, _)| *tag == el.tag_name) {
        el.add_classes(classes);
        return;
    }
    match el.tag_name.as_str() {
        "h2" | "h3" | "h4" => el.add_classes(HEADING),
        "a" if el.has_class("heading-anchor") => el.add_classes(HEADING_ANCHOR),
        "a" if !el.has_class("btn") => el.add_classes(LINK),
        "code" if parent != Some("pre") => el.add_classes(INLINE_CODE),
        "pre" => {
            el.add_classes(PRE);
            if parent == Some(code_tabs::TAG) {
                if panel > 0 {
                    el.add_classes(&["hidden"]);
                }
                el.add_classes(&[TAB_PANEL]);
            }
        }
        _ if el.has_class("code-tabs") => el.add_classes(CODE_TABS),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classes(node: &HNode) -> Vec<String> {
        node.as_element().map(|el| el.class_names.clone()).unwrap_or_default()
    }

    #[test]
    fn appends_after_existing_classes() {
        let mut tree = HNode::Root(vec![Element::new("p").with_classes(&["text-center"]).into()]);
        run(&mut tree);
        assert_eq!(
            classes(&tree.children()[0]),
            vec!["text-center", "mb-8", "text-lg", "leading-relaxed"]
        );
    }

    #[test]
    fn headings_keep_their_ids() {
        let mut tree = HNode::Root(vec![
            Element::new("h2").with_attr("id", "intro").into(),
            Element::new("h1").into(),
        ]);
        run(&mut tree);
        let h2 = tree.children()[0].as_element().unwrap();
        assert_eq!(h2.attr("id"), Some("intro"));
        assert_eq!(h2.class_names, HEADING);
        assert!(classes(&tree.children()[1]).is_empty());
    }

    #[test]
    fn inline_and_block_code_differ() {
        let mut tree = HNode::Root(vec![
            Element::new("p")
                .with_children(vec![Element::new("code").into()])
                .into(),
            Element::new("pre")
                .with_children(vec![Element::new("code").with_classes(&["language-rs"]).into()])
                .into(),
        ]);
        run(&mut tree);
        let inline = &tree.children()[0].children()[0];
        assert_eq!(classes(inline), INLINE_CODE);
        let block = &tree.children()[1].children()[0];
        assert_eq!(classes(block), vec!["language-rs"]);
        assert_eq!(classes(&tree.children()[1]), PRE);
    }

    #[test]
    fn links_and_heading_anchors() {
        let mut tree = HNode::Root(vec![
            Element::new("a").with_classes(&["heading-anchor"]).into(),
            Element::new("a").with_classes(&["btn"]).into(),
            Element::new("a").into(),
        ]);
        run(&mut tree);
        assert!(classes(&tree.children()[0]).contains(&"group-hover:opacity-75".to_string()));
        assert_eq!(classes(&tree.children()[1]), vec!["btn"]);
        assert_eq!(classes(&tree.children()[2]), LINK);
    }

    #[test]
    fn code_tab_panels() {
        let pre = |tab: &str| -> HNode {
            Element::new("pre")
                .with_attr(code_tabs::GROUP_ATTR, "g")
                .with_attr(code_tabs::TAB_ATTR, tab)
                .into()
        };
        let mut tree = HNode::Root(vec![
            Element::new(code_tabs::TAG)
                .with_classes(&["code-tabs"])
                .with_attr(code_tabs::GROUP_ATTR, "g")
                .with_children(vec![pre("A"), pre("B")])
                .into(),
        ]);
        run(&mut tree);
        let group = tree.children()[0].as_element().unwrap();
        assert_eq!(group.class_names[1..].to_vec(), CODE_TABS);
        let first = group.children[0].as_element().unwrap();
        let second = group.children[1].as_element().unwrap();
        assert!(!first.has_class("hidden"));
        assert!(first.has_class(TAB_PANEL));
        assert!(second.has_class("hidden"));
        assert_eq!(second.attr(code_tabs::TAB_ATTR), Some("B"));
        assert_eq!(second.attr(code_tabs::GROUP_ATTR), Some("g"));
    }

    #[test]
    fn blockquote_inside_figure_keeps_figure_classes() {
        let mut tree = HNode::Root(vec![
            Element::new("figure")
                .with_classes(&["blockquote"])
                .with_children(vec![Element::new("blockquote").into()])
                .into(),
        ]);
        run(&mut tree);
        let figure = tree.children()[0].as_element().unwrap();
        assert_eq!(figure.class_names[0], "blockquote");
        assert!(figure.has_class("my-8"));
        assert!(classes(&figure.children[0]).contains(&"border-l-4".to_string()));
    }
}
