//! `title` attributes on footnote back-references.

use crate::error::{Error, Result};
use crate::hast::{Element, HNode};
use crate::html_passes::walk_elements;
use crate::options::{FootnoteOptions, HtmlPassKind};
use crate::template::{Template, TemplateContext};

const BACKREF: &str = "data-footnote-backref";

#[derive(Debug, Clone)]
pub struct FootnoteTitles {
    template: Template,
    clobber_prefix: String,
}

impl FootnoteTitles {
    pub fn new(options: &FootnoteOptions) -> Result<Self> {
        if options.title_template.trim().is_empty() {
            return Err(Error::config(
                HtmlPassKind::FootnoteTitles.name(),
                "title template must not be empty",
            ));
        }
        Ok(FootnoteTitles {
            template: Template::new(options.title_template.clone()),
            clobber_prefix: options.clobber_prefix.clone(),
        })
    }

    pub fn run(&self, tree: &mut HNode) {
        walk_elements(tree, &mut |el, _| {
            if el.tag_name != "a" || !is_backref(el) {
                return;
            }
            let Some(id) = el.attr("href").and_then(|href| self.footnote_id(href)) else {
                return;
            };
            let title = self.title(&id);
            el.set_attr("title", title);
        });
    }

    /// Footnote identifier from a back-reference href such as
    /// `#user-content-fnref-note`.
    fn footnote_id(&self, href: &str) -> Option<String> {
        let fragment = href.strip_prefix('#').unwrap_or(href);
        let fragment = fragment.strip_prefix(self.clobber_prefix.as_str()).unwrap_or(fragment);
        let id = fragment.strip_prefix("fnref-").unwrap_or(fragment);
        (!id.is_empty()).then(|| id.to_string())
    }

    fn title(&self, id: &str) -> String {
        if !self.template.contains("id") {
            return id.to_string();
        }
        let mut ctx = TemplateContext::new();
        ctx.insert("id", id);
        self.template.render(&ctx)
    }
}

fn is_backref(el: &Element) -> bool {
    el.has_attr(BACKREF) || el.has_class(BACKREF)
}
