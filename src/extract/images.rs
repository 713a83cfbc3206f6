//! Ranked image candidates for a listing page.

use super::{class_contains, resolve_url};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

pub const DEFAULT_MAX_IMAGES: usize = 5;

/// Lazy-loading attributes are preferred over `src`, which often holds a placeholder.
const URL_ATTRIBUTES: &[&str] = &[
    "data-src",
    "data-lazy-src",
    "data-original",
    "data-lazy",
    "data-full-url",
    "data-large-src",
    "srcset",
    "src",
];
const PLACEHOLDER_MARKERS: &[&str] = &["loading", "placeholder", "blank", "1x1", "pixel"];

const GALLERY_KEYWORDS: &[&str] = &[
    "gallery",
    "carousel",
    "slider",
    "photos",
    "images",
    "property-images",
    "image-gallery",
    "photo-gallery",
];
const PHOTO_CLASS_KEYWORDS: &[&str] = &["property", "photo", "image", "picture"];
const DENYLIST: &[&str] = &["logo", "icon", "avatar", "agent"];
const LOOSE_DENYLIST: &[&str] = &["logo", "icon", "avatar", "agent", "banner"];

static GALLERY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section, ul").expect("gallery selector"));
static IMG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("img selector"));
static IMG_WITH_SRC_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("img[src] selector"));

/// Best absolute URL for one `<img>`, or `None` when it is a placeholder
pub fn extract_image_url(img: &ElementRef<'_>, base_url: &str) -> Option<String> {
    let (attr, raw) = URL_ATTRIBUTES.iter().find_map(|attr| {
        img.value()
            .attr(attr)
            .filter(|value| !value.trim().is_empty())
            .map(|value| (*attr, value))
    })?;

    let candidate = if attr == "srcset" {
        // largest candidate is listed last
        raw.rsplit(',').next()?.split_whitespace().next()?
    } else {
        raw.trim()
    };

    let url = resolve_url(base_url, candidate)?;
    let lowered = url.to_lowercase();
    if lowered.starts_with("data:") || PLACEHOLDER_MARKERS.iter().any(|m| lowered.contains(m)) {
        return None;
    }
    Some(url)
}

struct Collector<'b> {
    base_url: &'b str,
    cap: usize,
    seen: HashSet<String>,
    images: Vec<String>,
}

impl<'b> Collector<'b> {
    fn full(&self) -> bool {
        self.images.len() >= self.cap
    }

    fn offer(&mut self, img: &ElementRef<'_>, denylist: &[&str]) {
        if self.full() {
            return;
        }
        let Some(url) = extract_image_url(img, self.base_url) else {
            return;
        };
        if self.seen.contains(&url) {
            return;
        }
        let lowered = url.to_lowercase();
        if denylist.iter().any(|skip| lowered.contains(skip)) {
            return;
        }
        self.seen.insert(url.clone());
        self.images.push(url);
    }
}

/// Up to `cap` unique image URLs: gallery containers first, then photo-classed
/// images, then any image with a `src`
pub fn extract_images(doc: &Html, base_url: &str, cap: usize) -> Vec<String> {
    let mut collector = Collector {
        base_url,
        cap,
        seen: HashSet::new(),
        images: Vec::new(),
    };

    for container in doc
        .select(&GALLERY_SEL)
        .filter(|el| class_contains(el, GALLERY_KEYWORDS))
    {
        if collector.full() {
            break;
        }
        for img in container.select(&IMG_SEL).take(cap * 2) {
            collector.offer(&img, DENYLIST);
        }
    }

    if !collector.full() {
        for img in doc
            .select(&IMG_SEL)
            .filter(|el| class_contains(el, PHOTO_CLASS_KEYWORDS))
        {
            collector.offer(&img, DENYLIST);
        }
    }

    if !collector.full() {
        for img in doc.select(&IMG_WITH_SRC_SEL) {
            collector.offer(&img, LOOSE_DENYLIST);
        }
    }

    collector.images
}
