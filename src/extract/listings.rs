//! Candidate listings on a search results page.

use super::{class_contains, compact_text, resolve_url, spaced_text, text};
use crate::models::ListingCandidate;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

pub const DEFAULT_LISTINGS_PER_PAGE: usize = 60;
const FALLBACK_TITLE: &str = "Property Listing";
const CURRENCY: &str = "£";

const CONTAINER_KEYWORDS: &[&str] = &["property", "listing", "result", "card", "search-result"];

static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article, div, li").expect("container selector"));
static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector"));

/// Scan listing-like containers for priced links, keeping at most `limit`
pub fn extract_listings(html: &str, base_url: &str, limit: usize) -> Vec<ListingCandidate> {
    let doc = Html::parse_document(html);

    let mut containers: Vec<_> = doc
        .select(&CONTAINER_SEL)
        .filter(|el| class_contains(el, CONTAINER_KEYWORDS))
        .collect();
    if containers.is_empty() {
        containers = doc.select(&CONTAINER_SEL).collect();
    }

    let mut seen = HashSet::new();
    let mut listings = Vec::new();

    for container in containers {
        if listings.len() >= limit {
            break;
        }

        let body = spaced_text(&container);
        if !body.contains(CURRENCY) {
            continue;
        }

        let Some(anchor) = container.select(&LINK_SEL).next() else {
            continue;
        };
        let Some(link) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_url(base_url, href))
        else {
            continue;
        };

        let mut title = compact_text(&anchor);
        if title.is_empty() {
            title = FALLBACK_TITLE.to_string();
        }

        if !text::is_listing(&title, &link) {
            continue;
        }
        // nested cards repeat the same anchor
        if !seen.insert(link.clone()) {
            continue;
        }

        listings.push(ListingCandidate {
            price: text::extract_price(&body),
            category: text::categorize(&title, &link),
            source: base_url.to_string(),
            title,
            link,
        });
    }

    listings
}
