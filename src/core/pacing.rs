use crate::core::fetcher::FetchError;
use crate::domain::model::FetchedPage;
use crate::domain::ports::PageFetcher;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

/// Spaces out requests to the same host by at least `delay`, however many
/// libraries are crawled at once. Different hosts never wait on each other.
pub struct PacedFetcher<F: PageFetcher> {
    inner: F,
    delay: Duration,
    hosts: Mutex<HashMap<String, Arc<Mutex<Option<Instant>>>>>,
}

impl<F: PageFetcher> PacedFetcher<F> {
    pub fn new(inner: F, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    async fn host_gate(&self, host: &str) -> Arc<Mutex<Option<Instant>>> {
        let mut hosts = self.hosts.lock().await;
        Arc::clone(hosts.entry(host.to_string()).or_default())
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for PacedFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if self.delay.is_zero() {
            return self.inner.fetch(url).await;
        }
        let Some(host) = host_of(url) else {
            return self.inner.fetch(url).await;
        };

        // The host lock is held only until this request's start time is
        // claimed; the request itself runs unlocked.
        let gate = self.host_gate(&host).await;
        {
            let mut last_start = gate.lock().await;
            if let Some(last) = *last_start {
                let ready = last + self.delay;
                if ready > Instant::now() {
                    tracing::debug!("pacing {} for {:?}", host, ready - Instant::now());
                    tokio::time::sleep_until(ready).await;
                }
            }
            *last_start = Some(Instant::now());
        }

        self.inner.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::tests::MockFetcher;
    use futures::future::join_all;

    const DELAY: Duration = Duration::from_millis(60);
    // Slack for the few microseconds between claiming a slot and recording it.
    const SLACK: Duration = Duration::from_millis(5);

    #[tokio::test]
    async fn test_same_host_requests_are_spaced() {
        let mock = MockFetcher::default();
        let fetcher = PacedFetcher::new(mock.clone(), DELAY);

        join_all((0..4).map(|i| {
            let fetcher = &fetcher;
            async move {
                let _ = fetcher
                    .fetch(&format!("https://same.example.org/v2/events?page={}", i))
                    .await;
            }
        }))
        .await;

        let times = mock.request_times().await;
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] + SLACK >= DELAY, "gap {:?}", pair[1] - pair[0]);
        }
    }

    #[tokio::test]
    async fn test_other_hosts_do_not_wait() {
        let mock = MockFetcher::default();
        let fetcher = PacedFetcher::new(mock.clone(), Duration::from_secs(5));

        let started = Instant::now();
        join_all(["https://a.example.org/x", "https://b.example.org/x", "https://c.example.org/x"]
            .map(|url| fetcher.fetch(url)))
        .await;

        assert_eq!(mock.requests().await.len(), 3);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_zero_delay_passes_through() {
        let mock = MockFetcher::default();
        let fetcher = PacedFetcher::new(mock.clone(), Duration::ZERO);

        let started = Instant::now();
        for _ in 0..3 {
            let _ = fetcher.fetch("https://same.example.org/v2/events").await;
        }

        assert_eq!(mock.requests().await.len(), 3);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
