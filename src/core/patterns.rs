//! Regex-backed text matchers used by the identifier and series extractors.

use regex::Regex;
use std::sync::LazyLock;

/// Labels that mark a book-club-like event category.
pub static BOOK_CLUB_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(book\s*club|book\s*discussion|reading\s*group)\b").unwrap()
});

/// A single heuristic that pulls candidate values out of a page body.
pub trait TextPattern: Send + Sync {
    fn name(&self) -> &'static str;
    fn find(&self, body: &str) -> Vec<String>;
}

/// Yields one capture group per regex match, optionally keeping only the
/// matches whose `label_group` text looks like a book club.
pub struct RegexPattern {
    name: &'static str,
    regex: &'static Regex,
    capture: usize,
    label_group: Option<usize>,
}

impl RegexPattern {
    pub fn new(name: &'static str, regex: &'static Regex, capture: usize) -> Self {
        Self {
            name,
            regex,
            capture,
            label_group: None,
        }
    }

    pub fn with_label_group(mut self, group: usize) -> Self {
        self.label_group = Some(group);
        self
    }
}

impl TextPattern for RegexPattern {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self, body: &str) -> Vec<String> {
        self.regex
            .captures_iter(body)
            .filter(|caps| match self.label_group {
                Some(group) => caps
                    .get(group)
                    .is_some_and(|label| BOOK_CLUB_LABEL.is_match(label.as_str())),
                None => true,
            })
            .filter_map(|caps| caps.get(self.capture).map(|m| m.as_str().to_string()))
            .collect()
    }
}
