use crate::core::fetcher::FetchError;
use crate::domain::model::FetchedPage;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn timeout(&self) -> Duration;
    /// Pause after every network call.
    fn request_delay(&self) -> Duration;
    fn progress_every(&self) -> usize;
    fn concurrent_libraries(&self) -> usize;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchedPage, FetchError>;
}

/// Maps a region code (state, province) to its full name.
pub trait RegionLookup: Send + Sync {
    fn full_name(&self, code: &str) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Input: Send;
    type Output: Send;

    async fn extract(&self) -> Result<Vec<Self::Input>>;
    async fn transform(&self, data: Vec<Self::Input>) -> Result<Vec<Self::Output>>;
    async fn load(&self, result: Vec<Self::Output>) -> Result<String>;
}
