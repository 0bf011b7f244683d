//! Color swatches after inline code that spells a CSS color.
//!
//! Only `code` elements whose parent is not a `pre` qualify, and only when
//! all of their children are text. The swatch is appended as a trailing
//! `span`, so the visible code text is unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::hast::{Element, HNode};
use crate::html_passes::walk_elements;

static HEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("valid hex color pattern")
});

static RGB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^rgba?\(\s*([0-9]{1,3}%?)\s*(?:,|\s)\s*([0-9]{1,3}%?)\s*(?:,|\s)\s*([0-9]{1,3}%?)(?:\s*(?:,|/)\s*([0-9]*\.?[0-9]+%?))?\s*\)$",
    )
    .expect("valid rgb color pattern")
});

static HSL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^hsla?\(\s*([-+]?[0-9]*\.?[0-9]+)(?:deg|rad|turn|grad)?\s*(?:,|\s)\s*([0-9]{1,3}%?)\s*(?:,|\s)\s*([0-9]{1,3}%?)(?:\s*(?:,|/)\s*([0-9]*\.?[0-9]+%?))?\s*\)$",
    )
    .expect("valid hsl color pattern")
});

const WRAPPER_ATTR: &str = "data-color-swatch-wrapper";

const WRAPPER_CLASSES: &[&str] = &[
    "inline-flex",
    "items-center",
    "justify-center",
    "w-3",
    "h-3",
    "p-px",
    "rounded-sm",
    "bg-text-offset",
    "border",
    "border-border",
    "align-middle",
    "ml-1",
];

pub fn run(tree: &mut HNode) {
    walk_elements(tree, &mut |el, parent| {
        if el.tag_name != "code" || parent == Some("pre") {
            return;
        }
        if el.children.iter().any(|c| matches!(c, HNode::Element(e) if e.has_attr(WRAPPER_ATTR))) {
            return;
        }
        let Some(text) = text_only(el) else {
            return;
        };
        let color = text.trim();
        if is_color(color) {
            el.children.push(swatch(color).into());
        }
    });
}

/// Concatenated text of an element made only of text nodes.
fn text_only(el: &Element) -> Option<String> {
    let mut out = String::new();
    for child in &el.children {
        match child {
            HNode::Text(value) => out.push_str(value),
            _ => return None,
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Whether `text` is a hex, `rgb()` or `hsl()` color with in-range values.
pub fn is_color(text: &str) -> bool {
    let candidate = text.trim();
    if HEX.is_match(candidate) {
        return true;
    }
    if let Some(caps) = RGB.captures(candidate) {
        let channels_ok = (1..=3).all(|i| caps.get(i).is_some_and(|m| valid_channel(m.as_str())));
        return channels_ok && caps.get(4).is_none_or(|a| valid_alpha(a.as_str()));
    }
    if let Some(caps) = HSL.captures(candidate) {
        // Any hue is accepted.
        let percents_ok = (2..=3).all(|i| caps.get(i).is_some_and(|m| valid_percent(m.as_str())));
        return percents_ok && caps.get(4).is_none_or(|a| valid_alpha(a.as_str()));
    }
    false
}

fn number(component: &str) -> Option<f64> {
    component
        .trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn in_range(component: &str, max: f64) -> bool {
    number(component).is_some_and(|v| (0.0..=max).contains(&v))
}

fn valid_channel(component: &str) -> bool {
    if component.ends_with('%') {
        in_range(component, 100.0)
    } else {
        in_range(component, 255.0)
    }
}

fn valid_percent(component: &str) -> bool {
    component.ends_with('%') && in_range(component, 100.0)
}

fn valid_alpha(component: &str) -> bool {
    if component.ends_with('%') {
        in_range(component, 100.0)
    } else {
        in_range(component, 1.0)
    }
}

fn swatch(color: &str) -> Element {
    let inner = Element::new("span")
        .with_classes(&["block", "w-full", "h-full", "rounded-sm"])
        .with_attr("data-color-swatch", "true")
        .with_attr("style", format!("background-color: {color};"));
    Element::new("span")
        .with_classes(WRAPPER_CLASSES)
        .with_attr(WRAPPER_ATTR, "true")
        .with_attr("aria-hidden", "true")
        .with_attr("title", color)
        .with_children(vec![inner.into()])
}
