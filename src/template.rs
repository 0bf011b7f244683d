//! `$token` interpolation for caller-supplied label templates.
//!
//! Used for footnote back-reference labels (`$ref`) and titles (`$id`).
//! Values are inserted as plain text; escaping happens when the tree is
//! serialized.
//!
//! ```
//! use mdforge::template::{Template, TemplateContext};
//!
//! let template = Template::new("Back to reference $id");
//! let mut ctx = TemplateContext::new();
//! ctx.insert("id", "note-1");
//! assert_eq!(template.render(&ctx), "Back to reference note-1");
//! ```

/// Variables available to a template. Lookup is by exact token name.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: Vec<(String, String)>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable. Returns `&mut Self` for chaining.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.push((key.into(), value.into()));
        self
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Template {
            source: source.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `$name` appears as a whole token.
    pub fn contains(&self, name: &str) -> bool {
        tokens(&self.source).any(|token| token == name)
    }

    /// Substitute every `$name` with its value.
    ///
    /// A `$` not followed by a known name is kept literally, so `$idx` is not
    /// a partial match for `$id`.
    pub fn render(&self, ctx: &TemplateContext) -> String {
        let mut result = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(dollar) = rest.find('$') {
            result.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];
            let name_len = token_len(after);
            match ctx.get(&after[..name_len]) {
                Some(value) if name_len > 0 => result.push_str(value),
                _ => {
                    result.push('$');
                    result.push_str(&after[..name_len]);
                }
            }
            rest = &after[name_len..];
        }

        result.push_str(rest);
        result
    }
}

fn token_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len())
}

fn tokens(source: &str) -> impl Iterator<Item = &str> {
    source.split('$').skip(1).map(|part| &part[..token_len(part)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(pairs: &[(&str, &str)]) -> TemplateContext {
        let mut ctx = TemplateContext::new();
        for (k, v) in pairs {
            ctx.insert(*k, *v);
        }
        ctx
    }

    #[test]
    fn substitutes_known_token() {
        let t = Template::new("Back to $id");
        assert_eq!(t.render(&ctx(&[("id", "3")])), "Back to 3");
    }

    #[test]
    fn longer_name_is_not_a_partial_match() {
        let t = Template::new("$idx and $id");
        assert_eq!(t.render(&ctx(&[("id", "a")])), "$idx and a");
    }

    #[test]
    fn unknown_token_is_literal() {
        let t = Template::new("cost: $5 $unknown");
        assert_eq!(t.render(&ctx(&[("id", "a")])), "cost: $5 $unknown");
    }

    #[test]
    fn trailing_dollar_is_literal() {
        let t = Template::new("price$");
        assert_eq!(t.render(&ctx(&[])), "price$");
    }

    #[test]
    fn repeated_tokens() {
        let t = Template::new("$ref/$ref");
        assert_eq!(t.render(&ctx(&[("ref", "2")])), "2/2");
    }

    #[test]
    fn contains_matches_whole_tokens_only() {
        assert!(Template::new("Go to $id.").contains("id"));
        assert!(!Template::new("Go to $idx").contains("id"));
        assert!(!Template::new("Go to id").contains("id"));
    }

    #[test]
    fn later_insert_wins() {
        let mut c = TemplateContext::new();
        c.insert("a", "1").insert("a", "2");
        assert_eq!(Template::new("$a").render(&c), "2");
    }
}
