use crate::error::FetchError;
use async_trait::async_trait;

/// Common trait for everything that turns a URL into page HTML
/// Plain HTTP and headless Chrome both sit behind it, so the pipeline
/// can be driven by stubs in tests
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page and return its HTML
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Get the name of the fetcher for logging
    fn name(&self) -> &'static str;
}
