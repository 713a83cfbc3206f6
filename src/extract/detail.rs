//! Detail page parsing: runs every extractor over one listing page.

use super::{
    class_contains, compact_text, description, images, text, text_fragments, truncate_chars,
};
use crate::models::{PropertyDetail, NOT_AVAILABLE};
use scraper::{Html, Selector};
use std::sync::LazyLock;

pub const MAX_AGENT_CHARS: usize = 150;

/// Element selector plus the class keywords it must carry
type ElementRule = (&'static str, &'static [&'static str]);

const ADDRESS_RULES: &[ElementRule] = &[
    ("h1, h2", &["address", "title", "heading"]),
    ("span", &["address"]),
    ("div", &["address"]),
];

const AGENT_RULES: &[ElementRule] = &[
    ("div", &["agent", "agency", "seller", "publisher"]),
    ("p", &["agent"]),
    ("span", &["agent"]),
];

static ADDRESS_SELECTORS: LazyLock<Vec<(Selector, &'static [&'static str])>> =
    LazyLock::new(|| compile(ADDRESS_RULES));
static AGENT_SELECTORS: LazyLock<Vec<(Selector, &'static [&'static str])>> =
    LazyLock::new(|| compile(AGENT_RULES));
static ROOT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("html").expect("root selector"));

fn compile(rules: &[ElementRule]) -> Vec<(Selector, &'static [&'static str])> {
    rules
        .iter()
        .map(|(css, keywords)| (Selector::parse(css).expect("detail rule selector"), *keywords))
        .collect()
}

/// Text of the first element matched by the first rule that matches anything
fn first_rule_match(doc: &Html, rules: &[(Selector, &'static [&'static str])]) -> Option<String> {
    rules.iter().find_map(|(selector, keywords)| {
        doc.select(selector)
            .find(|el| class_contains(el, keywords))
            .map(|el| compact_text(&el))
            .filter(|text| !text.is_empty())
    })
}

pub fn extract_address(doc: &Html) -> Option<String> {
    first_rule_match(doc, &ADDRESS_SELECTORS)
}

pub fn extract_agent(doc: &Html) -> Option<String> {
    first_rule_match(doc, &AGENT_SELECTORS).map(|agent| truncate_chars(&agent, MAX_AGENT_CHARS))
}

/// Visible text of the whole page joined with spaces
pub fn page_text(doc: &Html) -> String {
    doc.select(&ROOT_SEL)
        .next()
        .map(|root| text_fragments(&root).join(" "))
        .unwrap_or_default()
}

/// Run every detail extractor over a fetched listing page
pub fn parse_detail(html: &str, page_url: &str, max_images: usize) -> PropertyDetail {
    let doc = Html::parse_document(html);

    let description = description::synthesize(&doc);
    let address = extract_address(&doc).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let agent = extract_agent(&doc).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let full_text = page_text(&doc);
    let bedrooms = text::extract_bedrooms(&full_text);
    let bathrooms = text::extract_bathrooms(&full_text);

    let mut city = NOT_AVAILABLE.to_string();
    if address != NOT_AVAILABLE {
        city = text::extract_city(&address);
    }
    if city == NOT_AVAILABLE {
        city = text::extract_city(&full_text);
    }

    let images = images::extract_images(&doc, page_url, max_images);

    PropertyDetail {
        description,
        images,
        address,
        agent,
        bedrooms,
        bathrooms,
        city,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DESCRIPTION_MISSING;

    const PAGE: &str = r#"
        <html><head><title>Listing</title></head><body>
          <h1 class="property-title">14 Orchard Lane, Canterbury</h1>
          <div class="key-info">3 bedrooms | 2 bathrooms | Garden</div>
          <div class="property-description">
            <p>A charming family home in a quiet lane. It offers generous living space. The garden faces south.</p>
          </div>
          <div class="agent-card"><span>Brown &amp; Co Estate Agents</span></div>
          <div class="gallery"><img data-src="/photos/1.jpg"><img data-src="/photos/2.jpg"></div>
          <p>Popular with commuters heading into London.</p>
        </body></html>
    "#;

    #[test]
    fn parses_all_fields() {
        let detail = parse_detail(PAGE, "https://homes.example.com/listing/14", 5);

        assert_eq!(detail.address, "14 Orchard Lane, Canterbury");
        assert_eq!(detail.agent, "Brown & Co Estate Agents");
        assert_eq!(detail.bedrooms, "3");
        assert_eq!(detail.bathrooms, "2");
        // address beats the page text, which also mentions London
        assert_eq!(detail.city, "Canterbury");
        assert_eq!(
            detail.images,
            vec![
                "https://homes.example.com/photos/1.jpg",
                "https://homes.example.com/photos/2.jpg"
            ]
        );
        assert!(detail.description.starts_with("A charming family home"));
    }

    #[test]
    fn city_falls_back_to_page_text() {
        let page = r#"<html><body><span class="address">1 Mill Road</span>
            <p>Ten minutes from Leeds.</p></body></html>"#;
        let detail = parse_detail(page, "https://example.com/p/1", 5);
        assert_eq!(detail.address, "1 Mill Road");
        assert_eq!(detail.city, "Leeds");
    }

    #[test]
    fn agent_is_truncated() {
        let long_name = "x".repeat(400);
        let page = format!(r#"<html><body><p class="agent-name">{long_name}</p></body></html>"#);
        let detail = parse_detail(&page, "https://example.com/p/1", 5);
        assert_eq!(detail.agent.chars().count(), MAX_AGENT_CHARS);
    }

    #[test]
    fn empty_page_yields_sentinels() {
        let detail = parse_detail("<html><body></body></html>", "https://example.com/p/1", 5);
        assert_eq!(detail, PropertyDetail::default());
        assert_eq!(detail.description, DESCRIPTION_MISSING);
    }
}
