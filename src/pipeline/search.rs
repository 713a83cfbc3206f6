use crate::error::FetchError;
use crate::extract::listings::extract_listings;
use crate::models::ListingCandidate;
use crate::scrapers::sites::is_dynamic;
use crate::scrapers::PageFetcher;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns a site's search page into candidate listings.
///
/// Plain HTTP is tried first. Only when that yields nothing and the site is a
/// known JavaScript-rendered portal is the page loaded in the browser.
#[derive(Clone)]
pub struct SearchFetcher {
    http: Arc<dyn PageFetcher>,
    browser: Arc<dyn PageFetcher>,
    per_page: usize,
}

impl SearchFetcher {
    pub fn new(http: Arc<dyn PageFetcher>, browser: Arc<dyn PageFetcher>, per_page: usize) -> Self {
        Self {
            http,
            browser,
            per_page,
        }
    }

    pub async fn fetch(&self, site: &str) -> Result<Vec<ListingCandidate>, FetchError> {
        // A blocked or failed HTTP fetch counts as zero listings for dynamic sites
        let http_failed = match self.http.fetch(site).await {
            Ok(html) => {
                let listings = extract_listings(&html, site, self.per_page);
                debug!(
                    site,
                    count = listings.len(),
                    fetcher = self.http.name(),
                    "Search page parsed"
                );
                if !listings.is_empty() || !is_dynamic(site) {
                    return Ok(listings);
                }
                false
            }
            Err(e) if is_dynamic(site) => {
                warn!(site, error = %e, "HTTP search fetch failed");
                true
            }
            Err(e) => return Err(e),
        };

        info!(site, fetcher = self.browser.name(), "No listings over HTTP, rendering page");
        match self.browser.fetch(site).await {
            Ok(html) => Ok(extract_listings(&html, site, self.per_page)),
            Err(e) => {
                warn!(site, error = %e, "Rendered fetch failed");
                if http_failed {
                    Err(e)
                } else {
                    Ok(Vec::new())
                }
            }
        }
    }
}
