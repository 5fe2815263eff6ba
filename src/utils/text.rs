//! Small text helpers shared by the extractors and the event reader.

use regex::Regex;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::LazyLock;
use url::Url;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Decodes the handful of entities event pages actually use.
pub fn html_unescape(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Strips tags, decodes entities and collapses whitespace.
pub fn clean_html(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let text = html_unescape(&strip_tags(s));
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Keeps the first occurrence of every item, preserving order.
pub fn dedup_preserving_order<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Resolves `path` under `base` as if `base` were a directory.
///
/// A leading slash on `path` does not escape the base path, so
/// `https://host/lib` + `/v2/events` gives `https://host/lib/v2/events`.
/// Absolute URLs in `path` are returned as-is.
pub fn join_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut dir = base.clone();
    if !dir.path().ends_with('/') {
        let with_slash = format!("{}/", dir.path());
        dir.set_path(&with_slash);
    }
    dir.set_query(None);
    dir.set_fragment(None);
    dir.join(path.trim_start_matches('/'))
}

pub fn slugify(s: &str) -> String {
    SLUG_RE
        .replace_all(&s.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
