use crate::utils::text::slugify;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Raw input row of the discovery run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryRecord {
    #[serde(default)]
    pub library_name: String,
    #[serde(default)]
    pub library_base_url: String,
}

/// A library whose base URL has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryTarget {
    pub name: String,
    pub base_url: Url,
}

impl LibraryTarget {
    pub fn parse(name: &str, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            name: name.to_string(),
            base_url: Url::parse(base_url.trim())?,
        })
    }
}

/// A recurring event group found on a filtered listing page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesLink {
    pub url: Url,
    pub series_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub accepted: bool,
    pub reason: String,
}

impl ValidationOutcome {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: "ok".to_string(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}

/// One line of the discovery output CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub library_name: String,
    pub book_club_name: String,
    pub book_club_url: String,
    pub rss_url: String,
    pub notes: String,
}

impl ResultRow {
    pub const HEADERS: [&'static str; 5] = [
        "library_name",
        "book_club_name",
        "book_club_url",
        "rss_url",
        "notes",
    ];

    /// Row for a library that stopped before any series was found.
    pub fn placeholder(library_name: &str, notes: impl Into<String>) -> Self {
        Self {
            library_name: library_name.to_string(),
            notes: notes.into(),
            ..Self::default()
        }
    }
}

/// A feed to read events from. Accepts discovery output as well as the
/// older `bookclub_rss_url` column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    #[serde(default)]
    pub library_name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, alias = "bookclub_rss_url")]
    pub rss_url: String,
}

impl FeedSource {
    pub const HEADERS: [&'static str; 3] = ["library_name", "slug", "rss_url"];

    /// Trims the fields and derives a missing slug from the library name.
    pub fn normalized(self) -> Self {
        let library_name = self.library_name.trim().to_string();
        let slug = match self.slug.trim() {
            "" => slugify(&library_name),
            slug => slug.to_string(),
        };
        Self {
            slug,
            rss_url: self.rss_url.trim().to_string(),
            library_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLocation {
    pub name: String,
    pub street: String,
    pub number: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub required: bool,
    pub full: bool,
    pub capacity: String,
    pub registered: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedEvent {
    pub id: String,
    pub title: String,
    pub library: String,
    pub library_slug: String,
    pub description: String,
    pub link: String,
    pub image: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_virtual: bool,
    pub location: EventLocation,
    pub registration: Registration,
    pub categories: Vec<String>,
    pub book: Option<BookInfo>,
    pub state: String,
    pub state_full: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsDocument {
    pub generated_at: String,
    pub total_events: usize,
    pub total_libraries: usize,
    pub events: Vec<FeedEvent>,
}

/// An event prepared for display in one of the filtered views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewEvent {
    #[serde(flatten)]
    pub event: FeedEvent,
    pub formatted_date: String,
    /// 0 = Monday .. 6 = Sunday
    pub weekday_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    pub view: String,
    pub generated_at: String,
    pub total_events: usize,
    pub events: Vec<ViewEvent>,
}

/// Headers and body of a fetched page.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub status: u16,
    /// Lower-cased header names.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl FetchedPage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_source_normalized_derives_slug() {
        let source = FeedSource {
            library_name: " Oakland Public Library ".to_string(),
            slug: String::new(),
            rss_url: " https://oakland.example.org/events/rss/all ".to_string(),
        }
        .normalized();

        assert_eq!(source.library_name, "Oakland Public Library");
        assert_eq!(source.slug, "oakland-public-library");
        assert_eq!(source.rss_url, "https://oakland.example.org/events/rss/all");
    }

    #[test]
    fn test_feed_source_accepts_legacy_column() {
        let source: FeedSource = serde_json::from_str(
            r#"{"library_name":"A","slug":"a","bookclub_rss_url":"https://a.example.org/rss"}"#,
        )
        .unwrap();
        assert_eq!(source.rss_url, "https://a.example.org/rss");
    }

    #[test]
    fn test_fetched_page_header_lookup_is_case_insensitive() {
        let mut page = FetchedPage {
            status: 200,
            ..FetchedPage::default()
        };
        page.headers
            .insert("content-type".to_string(), "application/rss+xml".to_string());

        assert_eq!(page.header("Content-Type"), Some("application/rss+xml"));
        assert!(page.is_ok());
    }
}
