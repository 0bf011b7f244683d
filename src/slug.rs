//! GitHub-style slugs for heading ids.

use std::collections::HashMap;

/// Generate a GitHub-style slug from text.
///
/// Alphanumerics are lowercased and kept; whitespace, `-` and `_` become a
/// single hyphen; everything else is dropped.
///
/// ```
/// use mdforge::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            cleaned.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            cleaned.push('-');
        }
    }
    cleaned
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Hands out unique slugs within one document.
///
/// The first occurrence of a slug is returned as-is; later ones get `-1`,
/// `-2`, … appended, skipping any suffix that is already taken.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id that already exists in the document.
    pub fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }

    /// Slug for `text`, or `None` when nothing sluggable remains.
    pub fn slug(&mut self, text: &str) -> Option<String> {
        let base = slugify(text);
        if base.is_empty() {
            return None;
        }
        let Some(count) = self.seen.get(&base).copied() else {
            self.seen.insert(base.clone(), 0);
            return Some(base);
        };
        let mut n = count + 1;
        let mut candidate = format!("{base}-{n}");
        while self.seen.contains_key(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.seen.insert(base, n);
        self.seen.insert(candidate.clone(), 0);
        Some(candidate)
    }
}
