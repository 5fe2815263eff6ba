use crate::core::patterns::{RegexPattern, TextPattern};
use crate::utils::text::dedup_preserving_order;
use regex::Regex;
use std::sync::LazyLock;

// {"id":"<24hex>","name":"..."}
static ID_THEN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"id"\s*:\s*"([0-9a-f]{24})"\s*,\s*"name"\s*:\s*"([^"]+)""#).unwrap()
});

// "name":"...book club..." then "id":"<24hex>" within 200 chars
static NAME_THEN_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)("name"\s*:\s*"[^"]*(?:book\s*club|book\s*discussion|reading\s*group)[^"]*")(.{0,200}?)"id"\s*:\s*"([0-9a-f]{24})""#,
    )
    .unwrap()
});

// data-value="<24hex>" ... label text, inside the same tag
static LABELLED_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)data-(?:value|id|filter-id)="([0-9a-f]{24})"[^>]{0,250}(?:book\s*club|book\s*discussion|reading\s*group)"#,
    )
    .unwrap()
});

/// Finds the event-category identifiers of book-club-like categories on a
/// category listing page.
pub struct IdentifierExtractor {
    patterns: Vec<Box<dyn TextPattern>>,
}

impl IdentifierExtractor {
    pub fn new(patterns: Vec<Box<dyn TextPattern>>) -> Self {
        Self { patterns }
    }

    /// Ids from every pattern, in pattern order, first occurrence kept.
    /// An empty result means the library has no distinct book club category.
    pub fn extract(&self, body: &str) -> Vec<String> {
        let found = self.patterns.iter().flat_map(|pattern| {
            let ids = pattern.find(body);
            if !ids.is_empty() {
                tracing::debug!("pattern '{}' matched {} type id(s)", pattern.name(), ids.len());
            }
            ids
        });
        dedup_preserving_order(found)
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(RegexPattern::new("id-then-name", &ID_THEN_NAME, 1).with_label_group(2)),
            Box::new(RegexPattern::new("name-then-id", &NAME_THEN_ID, 3)),
            Box::new(RegexPattern::new("labelled-attribute", &LABELLED_ATTRIBUTE, 1)),
        ])
    }
}
