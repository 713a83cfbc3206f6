use super::detail::DetailFetcher;
use super::pool::run_indexed;
use super::search::SearchFetcher;
use crate::models::{ListingRecord, DESCRIPTION_NOT_FETCHED, NOT_AVAILABLE};
use tracing::{debug, info, warn};

/// Scrapes one site: search page, then detail pages for the first
/// `detail_fetch_limit` listings on a pool of `detail_workers`.
#[derive(Clone)]
pub struct SiteProcessor {
    search: SearchFetcher,
    details: DetailFetcher,
    detail_fetch_limit: usize,
    detail_workers: usize,
}

impl SiteProcessor {
    pub fn new(
        search: SearchFetcher,
        details: DetailFetcher,
        detail_fetch_limit: usize,
        detail_workers: usize,
    ) -> Self {
        Self {
            search,
            details,
            detail_fetch_limit,
            detail_workers,
        }
    }

    pub async fn process(&self, site: &str) -> Vec<ListingRecord> {
        info!(site, "Fetching search page");
        let candidates = match self.search.fetch(site).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(site, error = %e, "Search page failed");
                Vec::new()
            }
        };

        let mut records: Vec<ListingRecord> =
            candidates.into_iter().map(ListingRecord::pending).collect();
        let fetch_count = records.len().min(self.detail_fetch_limit);

        if fetch_count > 0 {
            info!(site, count = fetch_count, total = records.len(), "Fetching detail pages");
            let links: Vec<String> =
                records[..fetch_count].iter().map(|r| r.link.clone()).collect();
            let details = self.details.clone();
            let results = run_indexed(links, self.detail_workers, move |link| {
                let details = details.clone();
                async move { details.fetch(&link).await }
            })
            .await;

            for (record, detail) in records.iter_mut().zip(results) {
                record.merge_detail(detail.unwrap_or_default());
            }
        }

        for record in records.iter_mut().skip(fetch_count) {
            record.description = DESCRIPTION_NOT_FETCHED.to_string();
        }

        Self::finalize(site, &mut records);
        debug!(site, count = records.len(), "Site done");
        records
    }

    fn finalize(site: &str, records: &mut [ListingRecord]) {
        for record in records {
            record.source = site.to_string();
            record.published = NOT_AVAILABLE.to_string();
            record.category = crate::extract::text::categorize(&record.title, &record.link);
        }
    }
}
