use super::detail::DetailFetcher;
use super::pool::run_indexed;
use super::search::SearchFetcher;
use super::site::SiteProcessor;
use crate::config::ScrapeConfig;
use crate::models::{ListingRecord, RunReport};
use crate::scrapers::{BrowserFetcher, HttpFetcher, PageFetcher};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Fans the site list out to [`SiteProcessor`]s and gathers one dataset
pub struct RunOrchestrator {
    config: ScrapeConfig,
    processor: SiteProcessor,
}

impl RunOrchestrator {
    /// Wire the production HTTP and browser fetchers from `config`
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let http: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(config.request_timeout)?);
        let browser: Arc<dyn PageFetcher> = Arc::new(BrowserFetcher::new(config.headless));
        Ok(Self::with_fetchers(config, http, browser))
    }

    pub fn with_fetchers(
        config: ScrapeConfig,
        http: Arc<dyn PageFetcher>,
        browser: Arc<dyn PageFetcher>,
    ) -> Self {
        let search = SearchFetcher::new(http.clone(), browser, config.listings_per_page);
        let details = DetailFetcher::new(http, config.max_images);
        let processor = SiteProcessor::new(
            search,
            details,
            config.detail_fetch_limit,
            config.detail_workers,
        );
        Self { config, processor }
    }

    pub async fn run(&self) -> RunReport {
        let started_at = Utc::now();
        let sites = self.config.sites.clone();
        info!(
            sites = sites.len(),
            concurrency = self.config.site_concurrency,
            "Starting scrape run"
        );

        let processor = self.processor.clone();
        let results = run_indexed(sites.clone(), self.config.site_concurrency, move |site| {
            let processor = processor.clone();
            async move { processor.process(&site).await }
        })
        .await;

        let mut records: Vec<ListingRecord> = Vec::new();
        for (site, result) in sites.iter().zip(results) {
            match result {
                Some(site_records) if !site_records.is_empty() => {
                    info!(site = %site, count = site_records.len(), "✓ Site scraped");
                    records.extend(site_records);
                }
                Some(_) => info!(site = %site, "✗ No listings found"),
                None => warn!(site = %site, "✗ Site task aborted"),
            }
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            sites: sites.len(),
            records,
        };
        info!(
            records = report.records.len(),
            elapsed_secs = (report.finished_at - report.started_at).num_seconds(),
            "Scrape run finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;

    /// Each site lists one house; `bad.test` is unreachable
    struct Sites;

    #[async_trait]
    impl PageFetcher for Sites {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if url.contains("bad.test") {
                return Err(FetchError::Network("dns failure".to_string()));
            }
            if url.ends_with(".test/") {
                return Ok(r#"<ul><li class="result"><a href="/sale/1">Detached house for sale</a> £495,000</li></ul>"#
                    .to_string());
            }
            Ok("<html><body><div class=\"agent\">Harbour Homes</div></body></html>".to_string())
        }

        fn name(&self) -> &'static str {
            "sites"
        }
    }

    #[tokio::test]
    async fn dataset_follows_site_order() {
        let config = ScrapeConfig {
            site_concurrency: 2,
            sites: vec![
                "https://one.test/".to_string(),
                "https://bad.test/".to_string(),
                "https://two.test/".to_string(),
            ],
            ..ScrapeConfig::default()
        };
        let orchestrator = RunOrchestrator::with_fetchers(config, Arc::new(Sites), Arc::new(Sites));

        let report = orchestrator.run().await;
        assert_eq!(report.sites, 3);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].source, "https://one.test/");
        assert_eq!(report.records[1].source, "https://two.test/");
        assert_eq!(report.records[1].link, "https://two.test/sale/1");
        assert_eq!(report.records[0].agent, "Harbour Homes");
        assert!(report.finished_at >= report.started_at);
    }
}
