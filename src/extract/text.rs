//! Keyword and pattern heuristics over raw listing text.

use crate::models::{Category, NOT_AVAILABLE};
use regex::Regex;
use std::sync::LazyLock;

const NEWS_KEYWORDS: &[&str] = &[
    "news",
    "blog",
    "press",
    "article",
    "insight",
    "update",
    "story",
    "advice",
    "guide",
    "report",
    "market",
    "event",
    "tips",
    "announcement",
];

const PROPERTY_KEYWORDS: &[&str] = &[
    "for sale",
    "to rent",
    "flat",
    "house",
    "£",
    "property",
    "apartment",
    "studio",
];

const SALE_KEYWORDS: &[&str] = &["for sale", "buy", "sale"];
const RENT_KEYWORDS: &[&str] = &["to rent", "for rent", "letting", "lease"];

/// Checked in order; the first hit wins regardless of where it sits in the text.
const GAZETTEER: &[&str] = &[
    "London",
    "Manchester",
    "Birmingham",
    "Leeds",
    "Glasgow",
    "Bristol",
    "Edinburgh",
    "Liverpool",
    "Newcastle",
    "Sheffield",
    "Cambridge",
    "Oxford",
    "York",
    "Bath",
    "Brighton",
    "Canterbury",
    "Windsor",
    "Kew",
    "Surrey",
    "Sussex",
    "Kent",
    "Essex",
];

static BEDROOM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(\d+)\s*(?:bed|bedroom|bed-?room)s?(?:\s|,|$)").expect("bedroom pattern"),
        Regex::new(r"(\d+)\s*br\b").expect("bedroom abbreviation pattern"),
    ]
});

static BATHROOM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(\d+)\s*(?:bath|bathroom|bath-?room)s?(?:\s|,|$)").expect("bathroom pattern"),
        Regex::new(r"(\d+)\s*ba\b").expect("bathroom abbreviation pattern"),
    ]
});

static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"£\s?[\d,]+(?:\s?(?:pcm|pw|per month|per week))?").expect("price pattern")
});

fn haystack(title: &str, link: &str) -> String {
    format!("{title} {link}").to_lowercase()
}

/// Reject news and blog content, then require at least one property keyword
pub fn is_listing(title: &str, link: &str) -> bool {
    let text = haystack(title, link);
    if NEWS_KEYWORDS.iter().any(|k| text.contains(k)) {
        return false;
    }
    PROPERTY_KEYWORDS.iter().any(|k| text.contains(k))
}

pub fn categorize(title: &str, link: &str) -> Category {
    let text = haystack(title, link);
    if SALE_KEYWORDS.iter().any(|k| text.contains(k)) {
        Category::ForSale
    } else if RENT_KEYWORDS.iter().any(|k| text.contains(k)) {
        Category::ForRent
    } else {
        Category::Unknown
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> String {
    let lowered = text.to_lowercase();
    patterns
        .iter()
        .find_map(|re| re.captures(&lowered))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

// First match wins, so "3 bed, 2 bath, sleeps 6" style text is taken at face value.
pub fn extract_bedrooms(text: &str) -> String {
    first_capture(&BEDROOM_PATTERNS, text)
}

pub fn extract_bathrooms(text: &str) -> String {
    first_capture(&BATHROOM_PATTERNS, text)
}

pub fn extract_city(text: &str) -> String {
    let lowered = text.to_lowercase();
    GAZETTEER
        .iter()
        .find(|place| lowered.contains(&place.to_lowercase()))
        .map(|place| place.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// First "£" amount in `text`, keeping a pcm/pw style suffix when present
pub fn extract_price(text: &str) -> String {
    PRICE_PATTERN
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_filter_rejects_news_first() {
        assert!(is_listing("3 bed house for sale", "/listing/1"));
        assert!(!is_listing("Market News: prices rise", "/news/1"));
        // property words do not rescue a news link
        assert!(!is_listing("Flat for sale", "https://example.co.uk/blog/flat"));
    }

    #[test]
    fn listing_filter_requires_property_keyword() {
        assert!(!is_listing("Contact us", "/contact"));
        assert!(is_listing("£450,000", "/p/99"));
        assert!(is_listing("Riverside Studio", "/p/100"));
    }

    #[test]
    fn categorize_prefers_sale() {
        assert_eq!(categorize("Flat to rent in London", "/p/1"), Category::ForRent);
        assert_eq!(categorize("House for sale", "/p/2"), Category::ForSale);
        assert_eq!(categorize("Property update", "/p/3"), Category::Unknown);
        assert_eq!(categorize("Flat to rent", "/for-sale/4"), Category::ForSale);
        assert_eq!(categorize("Office", "/lettings/5"), Category::ForRent);
    }

    #[test]
    fn bedrooms_full_and_abbreviated() {
        assert_eq!(extract_bedrooms("Spacious 3 bedroom flat"), "3");
        assert_eq!(extract_bedrooms("Studio apartment"), NOT_AVAILABLE);
        assert_eq!(extract_bedrooms("4 Beds, garden"), "4");
        assert_eq!(extract_bedrooms("2br condo"), "2");
        assert_eq!(extract_bedrooms("a 5 bed-room house"), "5");
        assert_eq!(extract_bedrooms("Huge 99 bed mansion"), "99");
    }

    #[test]
    fn bedrooms_take_first_match() {
        assert_eq!(extract_bedrooms("3 bed, 2 bath, sleeps 6"), "3");
        assert_eq!(extract_bathrooms("3 bed, 2 bath, sleeps 6"), "2");
    }

    #[test]
    fn bathrooms_full_and_abbreviated() {
        assert_eq!(extract_bathrooms("two floors, 2 bathrooms"), "2");
        assert_eq!(extract_bathrooms("1ba"), "1");
        assert_eq!(extract_bathrooms("no washroom info"), NOT_AVAILABLE);
    }

    #[test]
    fn city_uses_list_order_not_text_order() {
        assert_eq!(extract_city("Near Oxford, 50 miles from London"), "London");
        assert_eq!(extract_city("12 High Street, BRIGHTON"), "Brighton");
        assert_eq!(extract_city("Somewhere rural"), NOT_AVAILABLE);
    }

    #[test]
    fn price_with_frequency() {
        assert_eq!(extract_price("Rent £1,250 pcm, available now"), "£1,250 pcm");
        assert_eq!(extract_price("Offers over £ 350,000"), "£ 350,000");
        assert_eq!(extract_price("£900 per week"), "£900 per week");
        assert_eq!(extract_price("POA"), NOT_AVAILABLE);
    }
}
