use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// Drives a [`Pipeline`] through extract, transform and load.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting run");
        if self.monitor.is_enabled() {
            tracing::debug!("Run monitoring enabled");
        }

        tracing::debug!("Extracting...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", raw_data.len());
        self.monitor.log_phase("Extract", raw_data.len());

        tracing::debug!("Transforming...");
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!("🔄 Transformed into {} records", transformed.len());
        self.monitor.log_phase("Transform", transformed.len());

        tracing::debug!("Loading...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("💾 Output saved to: {}", output_path);

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::tests::{MockConfig, MockFetcher, MockStorage};
    use crate::core::discovery::DiscoveryPipeline;

    #[tokio::test]
    async fn test_engine_runs_all_phases() {
        let fetcher = MockFetcher::default().page(
            "https://lib.example.org/v2/events",
            200,
            "text/html",
            "<h1>Events</h1>",
        );
        let storage = MockStorage::default();
        storage
            .put(
                "libraries.csv",
                "library_name,library_base_url\nQuiet,https://lib.example.org\n",
            )
            .await;

        let engine = EtlEngine::new_with_monitoring(
            DiscoveryPipeline::new(storage.clone(), MockConfig::new(), fetcher),
            true,
        );
        let output = engine.run().await.unwrap();

        assert_eq!(output, "bookclubs.csv");
        let written = String::from_utf8(storage.get_file("bookclubs.csv").await.unwrap()).unwrap();
        assert_eq!(
            written,
            "library_name,book_club_name,book_club_url,rss_url,notes\nQuiet,,,,no book-club-like type id found\n"
        );
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let engine = EtlEngine::new(DiscoveryPipeline::new(
            MockStorage::default(),
            MockConfig::new(),
            MockFetcher::default(),
        ));

        assert!(engine.run().await.is_err());
    }
}
