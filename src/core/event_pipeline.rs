use crate::core::csv_io::read_records;
use crate::core::events::parse_feed_events;
use crate::core::pacing::PacedFetcher;
use crate::core::progress::Progress;
use crate::core::{ConfigProvider, PageFetcher, Pipeline, Storage};
use crate::domain::model::{EventsDocument, FeedEvent, FeedSource};
use crate::domain::ports::RegionLookup;
use crate::utils::error::Result;
use chrono::{SecondsFormat, Utc};
use futures::stream::{self, StreamExt};

/// Sort key for events without a start date; places them last.
const UNDATED: &str = "9999-12-31";

/// Reads every verified feed and consolidates the events into one JSON
/// document.
pub struct EventFeedPipeline<S: Storage, C: ConfigProvider, F: PageFetcher, R: RegionLookup> {
    storage: S,
    config: C,
    fetcher: PacedFetcher<F>,
    regions: R,
}

impl<S: Storage, C: ConfigProvider, F: PageFetcher, R: RegionLookup> EventFeedPipeline<S, C, F, R> {
    pub fn new(storage: S, config: C, fetcher: F, regions: R) -> Self {
        let fetcher = PacedFetcher::new(fetcher, config.request_delay());
        Self {
            storage,
            config,
            fetcher,
            regions,
        }
    }

    /// Events of one feed. A feed that cannot be fetched or parsed
    /// contributes nothing.
    pub async fn read_feed(&self, source: &FeedSource) -> Vec<FeedEvent> {
        let fetched = self.fetcher.fetch(&source.rss_url).await;
        let delay = self.config.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let page = match fetched {
            Ok(page) if page.is_ok() => page,
            Ok(page) => {
                tracing::warn!("⚠️ {}: HTTP {}", source.library_name, page.status);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("⚠️ Error fetching {}: {}", source.rss_url, e);
                return Vec::new();
            }
        };

        match parse_feed_events(&page.body, &source.library_name, &source.slug, &self.regions) {
            Ok(events) => {
                if events.is_empty() {
                    tracing::info!("{}: no events found", source.library_name);
                } else {
                    tracing::info!("✓ {}: {} events", source.library_name, events.len());
                }
                events
            }
            Err(e) => {
                tracing::warn!("⚠️ Error parsing RSS for {}: {}", source.library_name, e);
                Vec::new()
            }
        }
    }
}

/// Orders events by start date, undated ones last. The sort is stable so
/// feed order breaks ties.
pub fn sort_events(events: &mut [FeedEvent]) {
    events.sort_by(|a, b| {
        let a = a.start_date.as_deref().unwrap_or(UNDATED);
        let b = b.start_date.as_deref().unwrap_or(UNDATED);
        a.cmp(b)
    });
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: PageFetcher, R: RegionLookup> Pipeline
    for EventFeedPipeline<S, C, F, R>
{
    type Input = FeedSource;
    type Output = Vec<FeedEvent>;

    async fn extract(&self) -> Result<Vec<FeedSource>> {
        let data = self.storage.read_file(self.config.input_path()).await?;
        let sources: Vec<FeedSource> = read_records(&data)?;

        let sources: Vec<FeedSource> = sources
            .into_iter()
            .map(FeedSource::normalized)
            .filter(|s| !s.rss_url.is_empty())
            .collect();

        tracing::info!("📚 Found {} feeds to fetch", sources.len());
        Ok(sources)
    }

    async fn transform(&self, data: Vec<FeedSource>) -> Result<Vec<Vec<FeedEvent>>> {
        let progress = Progress::new("feeds", data.len(), self.config.progress_every());

        let per_feed = stream::iter(data)
            .map(|source| {
                let progress = &progress;
                async move {
                    let events = self.read_feed(&source).await;
                    progress.tick();
                    events
                }
            })
            .buffered(self.config.concurrent_libraries().max(1))
            .collect()
            .await;

        Ok(per_feed)
    }

    async fn load(&self, result: Vec<Vec<FeedEvent>>) -> Result<String> {
        let total_libraries = result.iter().filter(|events| !events.is_empty()).count();
        let mut events: Vec<FeedEvent> = result.into_iter().flatten().collect();
        sort_events(&mut events);

        let document = EventsDocument {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            total_events: events.len(),
            total_libraries,
            events,
        };

        let bytes = serde_json::to_vec_pretty(&document)?;
        self.storage
            .write_file(self.config.output_path(), &bytes)
            .await?;

        tracing::info!(
            "✅ Generated {} events from {} libraries",
            document.total_events,
            document.total_libraries
        );
        Ok(self.config.output_path().to_string())
    }
}
