//! Date-window views over the consolidated events.
//!
//! Day windows are deliberately wide: they start 12 hours before UTC
//! midnight and last 38 hours so that every time zone's "today" falls
//! inside. Events are compared by their start instant.

use crate::core::{Pipeline, Storage};
use crate::domain::model::{EventView, EventsDocument, FeedEvent, ViewEvent};
use crate::utils::error::Result;
use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveTime, Utc};
use std::path::Path;

/// Events without an end date are assumed to last this long.
const ASSUMED_DURATION_HOURS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Today,
    Tomorrow,
    ThisMonth,
    NextMonth,
    Online,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::Today,
        ViewKind::Tomorrow,
        ViewKind::ThisMonth,
        ViewKind::NextMonth,
        ViewKind::Online,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Today => "today",
            ViewKind::Tomorrow => "tomorrow",
            ViewKind::ThisMonth => "this-month",
            ViewKind::NextMonth => "next-month",
            ViewKind::Online => "online",
        }
    }

    /// Half-open `[start, end)` interval of start times, `None` for views
    /// that are not date based.
    pub fn window(self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        match self {
            ViewKind::Today => {
                let start = midnight - Duration::hours(12);
                Some((start, start + Duration::hours(38)))
            }
            ViewKind::Tomorrow => {
                let start = midnight + Duration::days(1) - Duration::hours(12);
                Some((start, start + Duration::hours(38)))
            }
            ViewKind::ThisMonth => Some((midnight, month_start(now, 1)?)),
            ViewKind::NextMonth => Some((month_start(now, 1)?, month_start(now, 2)?)),
            ViewKind::Online => None,
        }
    }

    pub fn matches(self, event: &FeedEvent, now: DateTime<Utc>) -> bool {
        if self == ViewKind::Online {
            return event.is_virtual;
        }

        let Some(start) = event.start_date.as_deref().and_then(parse_event_date) else {
            return false;
        };
        match self.window(now) {
            Some((from, until)) => from <= start && start < until,
            None => false,
        }
    }
}

/// First day of the month `months_ahead` months after `now`'s month.
fn month_start(now: DateTime<Utc>, months_ahead: u32) -> Option<DateTime<Utc>> {
    let first = now
        .date_naive()
        .with_day(1)?
        .checked_add_months(Months::new(months_ahead))?;
    Some(first.and_time(NaiveTime::MIN).and_utc())
}

pub fn parse_event_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).ok()
}

/// Drops events that are over: ended before `now`, or started more than
/// three hours ago when no end is known. Undated events are kept.
pub fn filter_expired(events: Vec<FeedEvent>, now: DateTime<Utc>) -> Vec<FeedEvent> {
    events
        .into_iter()
        .filter(|event| {
            let end = match event.end_date.as_deref() {
                Some(end) if !end.is_empty() => parse_event_date(end),
                _ => event
                    .start_date
                    .as_deref()
                    .and_then(parse_event_date)
                    .map(|start| start + Duration::hours(ASSUMED_DURATION_HOURS)),
            };
            !matches!(end, Some(end) if end < now)
        })
        .collect()
}

/// `Thu · Jan 8 · 3:00 AM`, in the event's own offset. Empty when the date
/// does not parse.
pub fn formatted_date(start_date: Option<&str>) -> String {
    start_date
        .and_then(parse_event_date)
        .map(|dt| dt.format("%a · %b %-d · %-I:%M %p").to_string())
        .unwrap_or_default()
}

/// Day of week of the start date, 0 = Monday.
pub fn weekday_index(start_date: Option<&str>) -> Option<u32> {
    start_date
        .and_then(parse_event_date)
        .map(|dt| dt.weekday().num_days_from_monday())
}

pub fn build_view(kind: ViewKind, events: &[FeedEvent], now: DateTime<Utc>) -> EventView {
    let mut selected: Vec<ViewEvent> = events
        .iter()
        .filter(|event| kind.matches(event, now))
        .map(|event| ViewEvent {
            formatted_date: formatted_date(event.start_date.as_deref()),
            weekday_index: weekday_index(event.start_date.as_deref()),
            event: event.clone(),
        })
        .collect();
    selected.sort_by(|a, b| {
        let a = a.event.start_date.as_deref().unwrap_or("");
        let b = b.event.start_date.as_deref().unwrap_or("");
        a.cmp(b)
    });

    EventView {
        view: kind.name().to_string(),
        generated_at: now.format("%Y-%m-%d %H:%M UTC").to_string(),
        total_events: selected.len(),
        events: selected,
    }
}

/// Removes expired events, then builds every view.
pub fn build_views(events: Vec<FeedEvent>, now: DateTime<Utc>) -> Vec<EventView> {
    let before = events.len();
    let events = filter_expired(events, now);
    tracing::info!("After filtering expired: {} of {} events", events.len(), before);

    ViewKind::ALL
        .iter()
        .map(|kind| {
            let view = build_view(*kind, &events, now);
            tracing::debug!("{}: {} events", view.view, view.total_events);
            view
        })
        .collect()
}

/// Reads an events document and writes one JSON file per view into
/// `output_dir`.
pub struct EventViewsPipeline<S: Storage> {
    storage: S,
    input_path: String,
    output_dir: String,
    now: DateTime<Utc>,
}

impl<S: Storage> EventViewsPipeline<S> {
    pub fn new(storage: S, input_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            storage,
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            now: Utc::now(),
        }
    }

    /// Evaluates the date windows against `now` instead of the wall clock.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for EventViewsPipeline<S> {
    type Input = FeedEvent;
    type Output = EventView;

    async fn extract(&self) -> Result<Vec<FeedEvent>> {
        let data = self.storage.read_file(&self.input_path).await?;
        let document: EventsDocument = serde_json::from_slice(&data)?;
        Ok(document.events)
    }

    async fn transform(&self, data: Vec<FeedEvent>) -> Result<Vec<EventView>> {
        Ok(build_views(data, self.now))
    }

    async fn load(&self, result: Vec<EventView>) -> Result<String> {
        for view in &result {
            let path = Path::new(&self.output_dir).join(format!("{}.json", view.view));
            let bytes = serde_json::to_vec_pretty(view)?;
            self.storage
                .write_file(&path.to_string_lossy(), &bytes)
                .await?;
            tracing::info!("✓ {}: {} events", path.display(), view.total_events);
        }
        Ok(self.output_dir.clone())
    }
}
