//! Description synthesis: an ordered chain of extraction strategies followed by
//! paragraph segmentation.

use super::{class_contains, compact_text, spaced_text, truncate_chars};
use crate::models::DESCRIPTION_MISSING;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Shortest text a strategy must produce to end the chain
pub const MIN_DESCRIPTION_CHARS: usize = 50;
/// Input to segmentation is cut to this many characters
pub const MAX_DESCRIPTION_CHARS: usize = 5000;

const CONTAINER_KEYWORDS: &[&str] = &[
    "description",
    "property-description",
    "property-detail",
    "details",
    "summary",
    "about",
    "property-text",
];
const FEATURE_LIST_KEYWORDS: &[&str] = &["feature", "highlight", "specification", "spec"];
const FEATURES_PER_LIST: usize = 10;
const MIN_PARAGRAPH_CHARS: usize = 80;
const BOILERPLATE: &[&str] = &[
    "click here",
    "read more",
    "contact",
    "cookie",
    "javascript",
    "search",
];

static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section, article").expect("container selector"));
static META_DESCRIPTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).expect("meta selector"));
static OG_DESCRIPTION_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:description"]"#).expect("og selector")
});
static LIST_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul, ol").expect("list selector"));
static LIST_ITEM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("list item selector"));
static PARAGRAPH_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("paragraph selector"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace"));
static LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Property details|Description|About|Details)[\s:]+").expect("label prefix")
});

/// A single way of pulling description text out of a page
pub type Strategy = fn(&Html) -> Option<String>;

/// Strategies in priority order. `keep_short` strategies are remembered as a
/// fallback even when they produce less than [`MIN_DESCRIPTION_CHARS`].
pub const STRATEGIES: &[(&str, Strategy, bool)] = &[
    ("main container", main_container, false),
    ("meta description", meta_description, false),
    ("og description", og_description, false),
    ("key features", key_features, true),
    ("long paragraphs", long_paragraphs, true),
];

fn main_container(doc: &Html) -> Option<String> {
    doc.select(&CONTAINER_SEL)
        .find(|el| class_contains(el, CONTAINER_KEYWORDS))
        .map(|el| spaced_text(&el))
}

fn meta_content(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
}

fn meta_description(doc: &Html) -> Option<String> {
    meta_content(doc, &META_DESCRIPTION_SEL)
}

fn og_description(doc: &Html) -> Option<String> {
    meta_content(doc, &OG_DESCRIPTION_SEL)
}

fn key_features(doc: &Html) -> Option<String> {
    let features: Vec<String> = doc
        .select(&LIST_SEL)
        .filter(|list| class_contains(list, FEATURE_LIST_KEYWORDS))
        .flat_map(|list| {
            list.select(&LIST_ITEM_SEL)
                .take(FEATURES_PER_LIST)
                .map(|li| compact_text(&li))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
        })
        .collect();

    (!features.is_empty()).then(|| format!("Key Features: {}", features.join("; ")))
}

fn long_paragraphs(doc: &Html) -> Option<String> {
    let blocks: Vec<String> = doc
        .select(&PARAGRAPH_SEL)
        .map(|p| spaced_text(&p))
        .filter(|text| {
            let lowered = text.to_lowercase();
            text.chars().count() > MIN_PARAGRAPH_CHARS
                && !BOILERPLATE.iter().any(|k| lowered.contains(k))
        })
        .collect();

    (!blocks.is_empty()).then(|| blocks.join(" "))
}

/// Run the strategy chain and return the raw, unformatted text it settles on
pub fn select_text(doc: &Html) -> Option<String> {
    let mut fallback: Option<String> = None;

    for (name, strategy, keep_short) in STRATEGIES {
        let Some(text) = strategy(doc).filter(|t| !t.is_empty()) else {
            continue;
        };
        if text.chars().count() >= MIN_DESCRIPTION_CHARS {
            tracing::trace!(strategy = *name, "description strategy matched");
            return Some(text);
        }
        if *keep_short {
            fallback = Some(text);
        }
    }

    fallback
}

/// Split after sentence punctuation that is followed by whitespace
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = idx + c.len_utf8();
        if !matches!(chars.peek(), Some((_, next)) if next.is_whitespace()) {
            continue;
        }
        sentences.push(&text[start..end]);
        while matches!(chars.peek(), Some((_, next)) if next.is_whitespace()) {
            chars.next();
        }
        start = chars.peek().map(|(i, _)| *i).unwrap_or(text.len());
    }
    sentences.push(&text[start..]);
    sentences
}

/// Clean `text` and regroup its sentences into blank-line separated paragraphs
pub fn format_paragraphs(text: &str) -> String {
    let text = truncate_chars(text, MAX_DESCRIPTION_CHARS);
    let text = WHITESPACE.replace_all(&text, " ");
    let text = LABEL_PREFIX.replace(&text, "");

    let sentences = split_sentences(&text);
    let last = sentences.len().saturating_sub(1);

    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for (i, sentence) in sentences.iter().enumerate() {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        current.push(sentence);
        if current.len() >= 3 && (i % 4 == 0 || i == last) {
            paragraphs.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    if paragraphs.is_empty() {
        DESCRIPTION_MISSING.to_string()
    } else {
        paragraphs.join("\n\n")
    }
}

/// Description of a listing page, or the "no description" sentinel
pub fn synthesize(doc: &Html) -> String {
    match select_text(doc) {
        Some(text) => format_paragraphs(&text),
        None => DESCRIPTION_MISSING.to_string(),
    }
}
