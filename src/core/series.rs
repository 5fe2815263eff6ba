use crate::core::patterns::{RegexPattern, TextPattern};
use crate::domain::model::SeriesLink;
use crate::utils::text::{html_unescape, join_url, strip_tags};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static SERIES_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href="([^"]*?\bseries=([0-9a-f]{24})[^"]*)""#).unwrap()
});

static SERIES_API_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(/v2/events\?[^"\s<>]*\bseries=([0-9a-f]{24})[^"\s<>]*)"#).unwrap()
});

static SERIES_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bseries=([0-9a-f]{24})").unwrap());

static EVENT_SERIES_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Event series:\s*([^<\n\r]+)").unwrap());

static FIRST_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());

/// Finds links to recurring event series on a filtered listing page.
pub struct SeriesLinkExtractor {
    patterns: Vec<Box<dyn TextPattern>>,
}

impl SeriesLinkExtractor {
    pub fn new(patterns: Vec<Box<dyn TextPattern>>) -> Self {
        Self { patterns }
    }

    /// Resolves every match against `base`, dropping repeated URLs.
    pub fn extract(&self, body: &str, base: &Url) -> Vec<SeriesLink> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for pattern in &self.patterns {
            for raw in pattern.find(body) {
                let Ok(url) = join_url(base, &raw) else {
                    tracing::debug!("skipping unresolvable series link '{}'", raw);
                    continue;
                };
                let Some(series_id) = series_id_of(url.as_str()) else {
                    continue;
                };
                if seen.insert(url.clone()) {
                    links.push(SeriesLink { url, series_id });
                }
            }
        }

        links
    }
}

impl Default for SeriesLinkExtractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(RegexPattern::new("series-href", &SERIES_HREF, 1)),
            Box::new(RegexPattern::new("series-api-path", &SERIES_API_PATH, 1)),
        ])
    }
}

/// The `series=` id carried by a URL.
pub fn series_id_of(url: &str) -> Option<String> {
    SERIES_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Human-readable series title from a series page, if one can be found.
pub fn extract_series_title(body: &str) -> Option<String> {
    if let Some(caps) = EVENT_SERIES_TITLE.captures(body) {
        let title = html_unescape(&caps[1]).trim().to_string();
        if !title.is_empty() {
            return Some(title);
        }
    }

    FIRST_HEADING
        .captures(body)
        .map(|caps| strip_tags(&caps[1]).trim().to_string())
        .filter(|title| !title.is_empty())
}
