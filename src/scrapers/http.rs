use crate::error::FetchError;
use crate::scrapers::sites::USER_AGENT;
use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Plain HTTP page fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!(url, status = %response.status(), "Page returned non-success status");
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
