use crate::core::candidates::feed_candidates;
use crate::core::csv_io::{read_records, write_records};
use crate::core::identifiers::IdentifierExtractor;
use crate::core::pacing::PacedFetcher;
use crate::core::progress::Progress;
use crate::core::series::{extract_series_title, SeriesLinkExtractor};
use crate::core::validator::FeedValidator;
use crate::core::{ConfigProvider, PageFetcher, Pipeline, Storage};
use crate::domain::model::{LibraryRecord, LibraryTarget, ResultRow, SeriesLink};
use crate::utils::error::Result;
use crate::utils::text::join_url;
use futures::stream::{self, StreamExt};
use url::Url;

/// Events listing of the platform; unfiltered it also lists the event types.
pub const EVENTS_PAGE_PATH: &str = "/v2/events";

pub const NOTE_NO_TYPE_IDS: &str = "no book-club-like type id found";
pub const NOTE_NO_SERIES: &str = "no series links found (maybe single events)";
pub const NOTE_VALIDATED: &str = "validated";

/// Discovers book club series and a working feed for each, one library at
/// a time. Every library ends in at least one [`ResultRow`].
pub struct DiscoveryPipeline<S: Storage, C: ConfigProvider, F: PageFetcher> {
    storage: S,
    config: C,
    fetcher: PacedFetcher<F>,
    identifiers: IdentifierExtractor,
    series: SeriesLinkExtractor,
}

impl<S: Storage, C: ConfigProvider, F: PageFetcher> DiscoveryPipeline<S, C, F> {
    pub fn new(storage: S, config: C, fetcher: F) -> Self {
        let fetcher = PacedFetcher::new(fetcher, config.request_delay());
        Self {
            storage,
            config,
            fetcher,
            identifiers: IdentifierExtractor::default(),
            series: SeriesLinkExtractor::default(),
        }
    }

    async fn pause(&self) {
        let delay = self.config.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs discovery for one library. Faults never escape: they become a
    /// single `error: ...` row.
    pub async fn discover_library(&self, record: &LibraryRecord) -> Vec<ResultRow> {
        let name = match record.library_name.trim() {
            "" => "(unknown)",
            name => name,
        };

        match self.try_discover(name, &record.library_base_url).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("⚠️ {}: {}", name, e);
                vec![ResultRow::placeholder(name, format!("error: {}", e))]
            }
        }
    }

    async fn try_discover(&self, name: &str, base_url: &str) -> Result<Vec<ResultRow>> {
        let target = LibraryTarget::parse(name, base_url)?;
        let base = &target.base_url;

        let events_url = join_url(base, EVENTS_PAGE_PATH)?;
        let page = self.fetcher.fetch(events_url.as_str()).await;
        self.pause().await;
        let page = page?;
        if !page.is_ok() {
            return Ok(vec![ResultRow::placeholder(
                name,
                format!("{} HTTP {}", EVENTS_PAGE_PATH, page.status),
            )]);
        }

        let type_ids = self.identifiers.extract(&page.body);
        if type_ids.is_empty() {
            tracing::info!("{}: {}", name, NOTE_NO_TYPE_IDS);
            return Ok(vec![ResultRow::placeholder(name, NOTE_NO_TYPE_IDS)]);
        }
        tracing::debug!("{}: book club type ids {:?}", name, type_ids);

        let filtered_url = join_url(
            base,
            &format!("{}?types={}", EVENTS_PAGE_PATH, type_ids.join(",")),
        )?;
        let page = self.fetcher.fetch(filtered_url.as_str()).await;
        self.pause().await;
        let page = page?;
        if !page.is_ok() {
            return Ok(vec![ResultRow::placeholder(
                name,
                format!("types page HTTP {}", page.status),
            )]);
        }

        let links = self.series.extract(&page.body, base);
        if links.is_empty() {
            tracing::info!("{}: {}", name, NOTE_NO_SERIES);
            return Ok(vec![ResultRow::placeholder(name, NOTE_NO_SERIES)]);
        }
        tracing::info!("📚 {}: {} series found", name, links.len());

        let mut rows = Vec::with_capacity(links.len());
        for link in &links {
            rows.push(self.resolve_series(&target, link, &type_ids).await);
        }
        Ok(rows)
    }

    async fn resolve_series(
        &self,
        target: &LibraryTarget,
        link: &SeriesLink,
        type_ids: &[String],
    ) -> ResultRow {
        let title = match self.series_title(&link.url).await {
            Some(title) => title,
            None => format!("(series {})", link.series_id),
        };

        let validator = FeedValidator::new(&self.fetcher);
        let mut rss_url = String::new();
        let mut notes = String::new();

        for candidate in feed_candidates(&target.base_url, &link.series_id, type_ids) {
            let outcome = validator.validate(candidate.as_str()).await;
            self.pause().await;
            if outcome.accepted {
                rss_url = candidate.to_string();
                notes = NOTE_VALIDATED.to_string();
                break;
            }
            notes = outcome.reason;
        }

        if rss_url.is_empty() {
            tracing::info!("{} / {}: no feed validated ({})", target.name, title, notes);
        } else {
            tracing::info!("✅ {} / {}: {}", target.name, title, rss_url);
        }

        ResultRow {
            library_name: target.name.clone(),
            book_club_name: title,
            book_club_url: link.url.to_string(),
            rss_url,
            notes,
        }
    }

    /// Best effort; any failure just means no title.
    async fn series_title(&self, url: &Url) -> Option<String> {
        let page = self.fetcher.fetch(url.as_str()).await;
        self.pause().await;
        match page {
            Ok(page) if page.is_ok() => extract_series_title(&page.body),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("series title fetch failed for {}: {}", url, e);
                None
            }
        }
    }

    async fn discover_counted(&self, record: LibraryRecord, progress: &Progress) -> Vec<ResultRow> {
        let rows = self.discover_library(&record).await;
        progress.tick();
        rows
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: PageFetcher> Pipeline for DiscoveryPipeline<S, C, F> {
    type Input = LibraryRecord;
    type Output = ResultRow;

    async fn extract(&self) -> Result<Vec<LibraryRecord>> {
        let data = self.storage.read_file(self.config.input_path()).await?;
        let records: Vec<LibraryRecord> = read_records(&data)?;
        let total = records.len();

        let libraries: Vec<LibraryRecord> = records
            .into_iter()
            .filter(|r| !r.library_base_url.trim().is_empty())
            .collect();

        tracing::debug!(
            "Read {} rows, {} with a base URL",
            total,
            libraries.len()
        );
        Ok(libraries)
    }

    async fn transform(&self, data: Vec<LibraryRecord>) -> Result<Vec<ResultRow>> {
        let progress = Progress::new("libraries", data.len(), self.config.progress_every());
        let concurrency = self.config.concurrent_libraries().max(1);

        // `buffered` keeps input order, so rows stay grouped per library.
        // Requests to one host stay paced by the fetcher.
        let per_library: Vec<Vec<ResultRow>> = stream::iter(data)
            .map(|record| self.discover_counted(record, &progress))
            .buffered(concurrency)
            .collect()
            .await;

        Ok(per_library.into_iter().flatten().collect())
    }

    async fn load(&self, result: Vec<ResultRow>) -> Result<String> {
        let bytes = write_records(&ResultRow::HEADERS, &result)?;
        self.storage
            .write_file(self.config.output_path(), &bytes)
            .await?;

        tracing::debug!("Wrote {} rows to {}", result.len(), self.config.output_path());
        Ok(self.config.output_path().to_string())
    }
}
