use crate::domain::model::FetchedPage;
use crate::domain::ports::PageFetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; BookClubRSSBot/1.0)";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Any transport-level failure: DNS, connect, TLS, timeout or body read.
/// Messages carry the whole cause chain, so a refused connection and a
/// failed DNS lookup read differently.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let message = describe_chain(&err);
        if err.is_timeout() {
            FetchError::Timeout(message)
        } else if err.is_connect() {
            FetchError::Connect(message)
        } else {
            FetchError::Transport(message)
        }
    }
}

/// Joins an error and its sources with `: `, skipping causes the outer
/// message already repeats.
fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Single-attempt GET with a fixed identity header and timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(USER_AGENT, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let bytes = response.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        tracing::debug!("{} -> HTTP {} ({} bytes)", url, status, bytes.len());
        Ok(FetchedPage {
            status,
            headers,
            body,
        })
    }
}
