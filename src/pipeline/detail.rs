use crate::extract::detail::parse_detail;
use crate::models::PropertyDetail;
use crate::scrapers::PageFetcher;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fetches one listing page and turns it into a [`PropertyDetail`].
///
/// Never fails: any fetch error is logged and the all-sentinel detail is
/// returned instead, so one bad page cannot sink the rest of a site.
#[derive(Clone)]
pub struct DetailFetcher {
    fetcher: Arc<dyn PageFetcher>,
    max_images: usize,
}

impl DetailFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_images: usize) -> Self {
        Self { fetcher, max_images }
    }

    pub async fn fetch(&self, url: &str) -> PropertyDetail {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, error = %e, "Detail fetch failed");
                return PropertyDetail::default();
            }
        };

        let detail = parse_detail(&html, url, self.max_images);
        debug!(
            url,
            images = detail.images.len(),
            chars = detail.description.chars().count(),
            bedrooms = %detail.bedrooms,
            bathrooms = %detail.bathrooms,
            "Parsed detail page"
        );
        detail
    }
}
