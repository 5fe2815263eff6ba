//! Parses event-platform RSS feeds into [`FeedEvent`] records.
//!
//! Besides the plain RSS item fields, the platform publishes event details in
//! its own namespace (`bc:start_date`, `bc:location`, ...). Elements are
//! matched by local name so the namespace prefix does not matter.

use crate::domain::model::{BookInfo, EventLocation, FeedEvent, Registration};
use crate::domain::ports::RegionLookup;
use crate::utils::error::{CrawlError, Result};
use crate::utils::text::clean_html;
use chrono::DateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use std::sync::LazyLock;

static RECORD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]+href="[^"]*?/record/[^"]*"[^>]*>([^<]+)</a>"#).unwrap()
});

static TITLE_BY_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:discussing|reading|book:?)\s*["']?([^"'<>\n]+?)["']?\s+by\s+([^<>\n]+)"#)
        .unwrap()
});

/// Raw text of one RSS item, before normalization.
#[derive(Debug, Default)]
struct RawItem {
    title: String,
    link: String,
    description: String,
    image: String,
    start_date: String,
    end_date: String,
    is_virtual: bool,
    is_cancelled: bool,
    location: EventLocation,
    registration: Registration,
    categories: Vec<String>,
}

impl RawItem {
    fn set_field(&mut self, parent: &str, name: &str, text: String) {
        match (parent, name) {
            ("item", "title") => self.title = text,
            ("item", "link") => self.link = text,
            ("item", "description") => self.description = text,
            ("item", "start_date") => self.start_date = text,
            ("item", "end_date") => self.end_date = text,
            ("item", "is_virtual") => self.is_virtual = text == "true",
            ("item", "is_cancelled") => self.is_cancelled = text == "true",
            ("item", "category") if !text.is_empty() => self.categories.push(text),
            ("location", "name") => self.location.name = text,
            ("location", "street") => self.location.street = text,
            ("location", "number") => self.location.number = text,
            ("location", "city") => self.location.city = text,
            ("location", "state") => self.location.state = text,
            ("location", "zip") => self.location.zip = text,
            ("location", "location_details") => self.location.details = text,
            ("registration_info", "is_required") => self.registration.required = text == "true",
            ("registration_info", "is_full") => self.registration.full = text == "true",
            ("registration_info", "capacity") => self.registration.capacity = text,
            ("registration_info", "number_registered") => self.registration.registered = text,
            _ => {}
        }
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn attribute(start: &BytesStart<'_>, key: &str) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn xml_error(e: impl std::fmt::Display) -> CrawlError {
    CrawlError::XmlError {
        message: e.to_string(),
    }
}

/// Reads every `<item>` of a feed, in document order.
fn read_items(content: &str) -> Result<Vec<RawItem>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<RawItem> = None;
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => {
                let name = local_name(&start);
                if name == "item" {
                    current = Some(RawItem::default());
                } else if name == "enclosure" {
                    if let (Some(item), Some(url)) = (current.as_mut(), attribute(&start, "url")) {
                        item.image = url;
                    }
                }
                path.push(name);
                text.clear();
            }
            Event::Empty(start) => {
                if local_name(&start) == "enclosure" {
                    if let (Some(item), Some(url)) = (current.as_mut(), attribute(&start, "url")) {
                        item.image = url;
                    }
                }
            }
            Event::Text(t) => match t.unescape() {
                Ok(unescaped) => text.push_str(&unescaped),
                // Unknown entities such as &nbsp; are kept verbatim.
                Err(_) => text.push_str(&String::from_utf8_lossy(&t)),
            },
            Event::CData(data) => text.push_str(&String::from_utf8_lossy(&data.into_inner())),
            Event::End(_) => {
                let name = path.pop().unwrap_or_default();
                if name == "item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                } else if let Some(item) = current.as_mut() {
                    let parent = path.last().map(String::as_str).unwrap_or("");
                    item.set_field(parent, &name, text.trim().to_string());
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

/// Normalizes an ISO-8601 timestamp; unparseable values pass through.
pub fn normalize_date(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.to_rfc3339()),
        Err(_) => Some(value.to_string()),
    }
}

/// Book title (and author when stated) mentioned in an event description.
pub fn extract_book_info(description: &str) -> Option<BookInfo> {
    if description.is_empty() {
        return None;
    }

    if let Some(caps) = RECORD_LINK.captures(description) {
        return Some(BookInfo {
            title: clean_html(&caps[1]),
            author: None,
        });
    }

    TITLE_BY_AUTHOR.captures(description).map(|caps| BookInfo {
        title: clean_html(&caps[1]),
        author: Some(clean_html(&caps[2])),
    })
}

/// Parses one feed. Cancelled events are dropped.
pub fn parse_feed_events(
    content: &str,
    library_name: &str,
    library_slug: &str,
    regions: &dyn RegionLookup,
) -> Result<Vec<FeedEvent>> {
    let mut events = Vec::new();

    for item in read_items(content)? {
        if item.is_cancelled {
            continue;
        }

        let id = match item.link.rsplit('/').next() {
            Some(last) if !item.link.is_empty() => last.to_string(),
            _ => format!("{}_{}", library_slug, events.len()),
        };
        let state = item.location.state.trim().to_string();
        let state_full = if state.is_empty() {
            String::new()
        } else {
            regions.full_name(&state).unwrap_or(&state).to_string()
        };

        events.push(FeedEvent {
            id,
            title: item.title,
            library: library_name.to_string(),
            library_slug: library_slug.to_string(),
            description: clean_html(&item.description),
            book: extract_book_info(&item.description),
            link: item.link,
            image: item.image,
            start_date: normalize_date(&item.start_date),
            end_date: normalize_date(&item.end_date),
            is_virtual: item.is_virtual,
            city: item.location.city.clone(),
            location: item.location,
            registration: item.registration,
            categories: item.categories,
            state,
            state_full,
        });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::regions::RegionTable;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:bc="http://bibliocommons.com/rss/1.0/modules/event/">
  <channel>
    <title>Events</title>
    <item>
      <title>Mystery Readers</title>
      <link>https://lib.example.org/events/64f0a1</link>
      <description><![CDATA[<p>This month we are discussing The Hound by Arthur Conan Doyle</p>]]></description>
      <category>Book Club</category>
      <category>Adults</category>
      <enclosure url="https://cdn.example.org/hound.jpg" type="image/jpeg" />
      <bc:start_date>2026-01-08T03:00:00Z</bc:start_date>
      <bc:end_date>2026-01-08T04:30:00Z</bc:end_date>
      <bc:is_virtual>false</bc:is_virtual>
      <bc:is_cancelled>false</bc:is_cancelled>
      <bc:location>
        <bc:name>Main Branch</bc:name>
        <bc:city>Oakland</bc:city>
        <bc:state>CA</bc:state>
        <bc:zip>94612</bc:zip>
      </bc:location>
      <bc:registration_info>
        <bc:is_required>true</bc:is_required>
        <bc:capacity>20</bc:capacity>
      </bc:registration_info>
    </item>
    <item>
      <title>Cancelled Club</title>
      <link>https://lib.example.org/events/64f0a2</link>
      <bc:is_cancelled>true</bc:is_cancelled>
    </item>
    <item>
      <title>Online Readers &amp; Friends</title>
      <description>&lt;a href="https://lib.example.org/v2/record/S1C123"&gt;Piranesi&lt;/a&gt;</description>
      <bc:start_date>next week</bc:start_date>
      <bc:is_virtual>true</bc:is_virtual>
    </item>
  </channel>
</rss>"#;

    fn regions() -> RegionTable {
        RegionTable::builtin().unwrap()
    }

    #[test]
    fn test_parse_feed_events() {
        let events = parse_feed_events(FEED, "Oakland Public Library", "oakland", &regions()).unwrap();

        assert_eq!(events.len(), 2);

        let first = &events[0];
        assert_eq!(first.id, "64f0a1");
        assert_eq!(first.title, "Mystery Readers");
        assert_eq!(first.library, "Oakland Public Library");
        assert_eq!(first.image, "https://cdn.example.org/hound.jpg");
        assert_eq!(first.start_date.as_deref(), Some("2026-01-08T03:00:00+00:00"));
        assert_eq!(first.end_date.as_deref(), Some("2026-01-08T04:30:00+00:00"));
        assert!(!first.is_virtual);
        assert_eq!(first.location.name, "Main Branch");
        assert_eq!(first.city, "Oakland");
        assert_eq!(first.state, "CA");
        assert_eq!(first.state_full, "California");
        assert!(first.registration.required);
        assert_eq!(first.registration.capacity, "20");
        assert_eq!(first.categories, vec!["Book Club", "Adults"]);
        assert_eq!(
            first.description,
            "This month we are discussing The Hound by Arthur Conan Doyle"
        );
        assert_eq!(
            first.book,
            Some(BookInfo {
                title: "The Hound".to_string(),
                author: Some("Arthur Conan Doyle".to_string()),
            })
        );
    }

    #[test]
    fn test_item_without_link_gets_synthetic_id() {
        let events = parse_feed_events(FEED, "Oakland Public Library", "oakland", &regions()).unwrap();
        let online = &events[1];

        assert_eq!(online.id, "oakland_1");
        assert_eq!(online.title, "Online Readers & Friends");
        assert!(online.is_virtual);
        assert_eq!(online.start_date.as_deref(), Some("next week"));
        assert_eq!(online.end_date, None);
        assert_eq!(online.state_full, "");
        assert_eq!(
            online.book,
            Some(BookInfo {
                title: "Piranesi".to_string(),
                author: None,
            })
        );
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        let result = parse_feed_events("<rss><channel><item></channel>", "L", "l", &regions());
        assert!(matches!(result, Err(CrawlError::XmlError { .. })));
    }

    #[test]
    fn test_unknown_region_code_is_kept() {
        let feed = "<rss><channel><item><link>https://x/events/1</link><bc:location><bc:state>QLD</bc:state></bc:location></item></channel></rss>";
        let events = parse_feed_events(feed, "L", "l", &regions()).unwrap();

        assert_eq!(events[0].state_full, "QLD");
    }
}
