//! Pure extraction over parsed HTML. Nothing in here performs I/O.

pub mod description;
pub mod detail;
pub mod images;
pub mod listings;
pub mod text;

use scraper::ElementRef;
use url::Url;

/// True when the element's class attribute contains any of `keywords`
pub(crate) fn class_contains(element: &ElementRef<'_>, keywords: &[&str]) -> bool {
    element
        .value()
        .attr("class")
        .map(|class| {
            let class = class.to_lowercase();
            keywords.iter().any(|k| class.contains(k))
        })
        .unwrap_or(false)
}

/// Non-empty text fragments of `element`, trimmed, skipping script and style bodies
pub(crate) fn text_fragments<'a>(element: &ElementRef<'a>) -> Vec<&'a str> {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .map(|parent| matches!(parent.name(), "script" | "style" | "noscript"))
                .unwrap_or(false);
            if hidden {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect()
}

/// Text fragments joined with single spaces
pub(crate) fn spaced_text(element: &ElementRef<'_>) -> String {
    text_fragments(element).join(" ")
}

/// Text fragments glued together without separators
pub(crate) fn compact_text(element: &ElementRef<'_>) -> String {
    text_fragments(element).concat()
}

/// Resolve `href` against `base`, the way a browser would
pub(crate) fn resolve_url(base: &str, href: &str) -> Option<String> {
    match Url::parse(base) {
        Ok(base) => base.join(href.trim()).ok().map(String::from),
        Err(_) => Url::parse(href.trim()).ok().map(String::from),
    }
}

/// Truncate to at most `max` characters without splitting a code point
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
