use crate::core::csv_io::{read_records, write_records};
use crate::core::validator::FeedValidator;
use crate::core::{ConfigProvider, PageFetcher, Pipeline, Storage};
use crate::domain::model::FeedSource;
use crate::utils::error::Result;

/// Re-checks discovered feeds and keeps only the ones that still validate.
pub struct VerifyPipeline<S: Storage, C: ConfigProvider, F: PageFetcher> {
    storage: S,
    config: C,
    fetcher: F,
}

impl<S: Storage, C: ConfigProvider, F: PageFetcher> VerifyPipeline<S, C, F> {
    pub fn new(storage: S, config: C, fetcher: F) -> Self {
        Self {
            storage,
            config,
            fetcher,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: PageFetcher> Pipeline for VerifyPipeline<S, C, F> {
    type Input = FeedSource;
    type Output = FeedSource;

    async fn extract(&self) -> Result<Vec<FeedSource>> {
        let data = self.storage.read_file(self.config.input_path()).await?;
        let sources: Vec<FeedSource> = read_records(&data)?;

        Ok(sources
            .into_iter()
            .map(FeedSource::normalized)
            .filter(|s| !s.rss_url.is_empty())
            .collect())
    }

    async fn transform(&self, data: Vec<FeedSource>) -> Result<Vec<FeedSource>> {
        let validator = FeedValidator::new(&self.fetcher);
        let delay = self.config.request_delay();
        let mut kept = Vec::with_capacity(data.len());

        for source in data {
            let outcome = validator.validate(&source.rss_url).await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if outcome.accepted {
                kept.push(source);
            } else {
                tracing::info!(
                    "dropping {} ({}): {}",
                    source.library_name,
                    source.rss_url,
                    outcome.reason
                );
            }
        }

        tracing::info!("✅ verified: {}", kept.len());
        Ok(kept)
    }

    async fn load(&self, result: Vec<FeedSource>) -> Result<String> {
        let bytes = write_records(&FeedSource::HEADERS, &result)?;
        self.storage
            .write_file(self.config.output_path(), &bytes)
            .await?;
        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::tests::{MockConfig, MockFetcher, MockStorage};

    const FEED: &str = "<rss><channel><item><title>x</title></item></channel></rss>";

    #[tokio::test]
    async fn test_keeps_only_valid_feeds() {
        let fetcher = MockFetcher::default()
            .page("https://a.example.org/rss", 200, "application/rss+xml", FEED)
            .page("https://b.example.org/rss", 200, "text/html", "<html></html>")
            .unreachable("https://c.example.org/rss");
        let pipeline = VerifyPipeline::new(MockStorage::default(), MockConfig::new(), fetcher);
        pipeline
            .storage
            .put(
                "libraries.csv",
                "library_name,book_club_name,book_club_url,rss_url,notes\n\
                 Alpha Library,Club,https://a.example.org/club,https://a.example.org/rss,validated\n\
                 Beta,Club,https://b.example.org/club,https://b.example.org/rss,validated\n\
                 Gamma,Club,https://c.example.org/club,https://c.example.org/rss,validated\n\
                 Delta,,,,no book-club-like type id found\n",
            )
            .await;

        let sources = pipeline.extract().await.unwrap();
        assert_eq!(sources.len(), 3);

        let kept = pipeline.transform(sources).await.unwrap();
        pipeline.load(kept).await.unwrap();

        let bytes = pipeline.storage.get_file("bookclubs.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "library_name,slug,rss_url\nAlpha Library,alpha-library,https://a.example.org/rss\n"
        );
    }
}
