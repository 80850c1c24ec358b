//! Metadata resolution.
//!
//! Every field resolves through an explicit priority cascade: the first
//! non-empty source wins. Site-icon selection is the one scored field,
//! ranking every icon-link candidate by format, declared size, icon type,
//! and cascade position. Metadata never blocks on content conversion; the
//! pipeline runs the two independently and merges at assembly time.

use url::Url;

use crate::dom::{self, Document, Selection};
use crate::images::ImageResolver;
use crate::patterns;
use crate::result::RawArticle;

/// Title used when every source in the cascade is empty.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Resolved document metadata.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Always present; defaulted when nothing resolved.
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub favicon: Option<String>,
    pub site_icon: Option<String>,
    pub featured_image: Option<String>,
}

/// Resolve all metadata fields for a document.
#[must_use]
pub fn extract_metadata(
    doc: &Document,
    article: &RawArticle,
    base: Option<&Url>,
    resolver: &ImageResolver,
) -> Metadata {
    Metadata {
        title: resolve_title(doc, article),
        author: resolve_author(doc, article),
        description: resolve_description(doc, article),
        favicon: resolve_favicon(doc, base),
        site_icon: resolve_site_icon(doc, base),
        featured_image: resolve_featured_image(doc, resolver),
    }
}

/// Title cascade: upstream article title, document title, literal default.
#[must_use]
pub fn resolve_title(doc: &Document, article: &RawArticle) -> String {
    if let Some(title) = &article.title {
        if !title.trim().is_empty() {
            return title.trim().to_string();
        }
    }
    let doc_title = dom::text_content(&doc.select("title")).trim().to_string();
    if !doc_title.is_empty() {
        return doc_title;
    }
    DEFAULT_TITLE.to_string()
}

/// Author cascade: upstream byline, then meta tags in fixed order.
#[must_use]
pub fn resolve_author(doc: &Document, article: &RawArticle) -> Option<String> {
    if let Some(byline) = &article.byline {
        if !byline.trim().is_empty() {
            return Some(byline.trim().to_string());
        }
    }
    meta_content(doc, "meta[name=\"author\"]")
        .or_else(|| meta_content(doc, "meta[property=\"article:author\"]"))
        .or_else(|| meta_content(doc, "meta[name=\"twitter:creator\"]"))
}

/// Description cascade: upstream excerpt, then meta tags in fixed order.
#[must_use]
pub fn resolve_description(doc: &Document, article: &RawArticle) -> Option<String> {
    if let Some(excerpt) = &article.excerpt {
        if !excerpt.trim().is_empty() {
            return Some(excerpt.trim().to_string());
        }
    }
    meta_content(doc, "meta[name=\"description\"]")
        .or_else(|| meta_content(doc, "meta[property=\"og:description\"]"))
        .or_else(|| meta_content(doc, "meta[name=\"twitter:description\"]"))
}

fn meta_content(doc: &Document, selector: &str) -> Option<String> {
    let sel = doc.select(selector);
    if sel.is_empty() {
        return None;
    }
    dom::attr(&sel, "content")
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Favicon cascade: first matching icon link, else the `/favicon.ico`
/// convention against the page origin.
#[must_use]
pub fn resolve_favicon(doc: &Document, base: Option<&Url>) -> Option<String> {
    for selector in patterns::FAVICON_SELECTORS {
        let sel = doc.select(selector);
        if sel.is_empty() {
            continue;
        }
        if let Some(href) = dom::attr(&sel, "href") {
            if let Some(absolute) = absolutize(&href, base) {
                return Some(absolute);
            }
        }
    }
    base.map(|b| format!("{}://{}/favicon.ico", b.scheme(), b.host_str().unwrap_or_default()))
}

// === Site icon scoring ===

/// One icon-link candidate gathered for scoring.
#[derive(Debug)]
struct IconCandidate {
    url: String,
    /// Cascade position of the rel type; lower is earlier.
    priority: u32,
    rel: &'static str,
    sizes: Option<String>,
}

/// Icon-link rel types with their base priorities.
const ICON_RELS: &[(&str, u32)] = &[
    ("apple-touch-icon", 1),
    ("apple-touch-icon-precomposed", 2),
    ("icon", 3),
    ("shortcut icon", 4),
];

/// Collect every icon-link candidate and pick the best by score.
///
/// Score = format bonus (svg > png > jpeg > ico) + size bonus (peaking at
/// 180-256px, "any" treated as maximal for vector icons) + apple-touch
/// bonus + inverse-priority bonus.
#[must_use]
pub fn resolve_site_icon(doc: &Document, base: Option<&Url>) -> Option<String> {
    let mut candidates = Vec::new();

    for (rel, priority) in ICON_RELS {
        let selector = format!("link[rel=\"{rel}\"]");
        for node in doc.select(&selector).nodes() {
            let link = Selection::from(*node);
            let Some(href) = dom::attr(&link, "href") else {
                continue;
            };
            let Some(url) = absolutize(&href, base) else {
                continue;
            };
            candidates.push(IconCandidate {
                url,
                priority: *priority,
                rel,
                sizes: dom::attr(&link, "sizes"),
            });
        }
    }

    candidates
        .into_iter()
        .max_by_key(score_icon)
        .map(|c| c.url)
}

fn score_icon(candidate: &IconCandidate) -> i64 {
    let mut score: i64 = 0;

    let lowered = candidate.url.to_lowercase();
    let is_vector = lowered.ends_with(".svg") || lowered.contains(".svg?");
    score += if is_vector {
        40
    } else if lowered.contains(".png") {
        30
    } else if lowered.contains(".jpg") || lowered.contains(".jpeg") {
        20
    } else if lowered.contains(".ico") {
        10
    } else {
        15
    };

    score += size_bonus(candidate.sizes.as_deref(), is_vector);

    if candidate.rel.starts_with("apple-touch") {
        score += 15;
    }

    // Earlier cascade positions get a small edge at score ties
    score += i64::from(5 - candidate.priority.min(4)) * 5;

    score
}

/// Size bonus peaks in the 180-256px band the publishing API renders at.
fn size_bonus(sizes: Option<&str>, is_vector: bool) -> i64 {
    let Some(sizes) = sizes else {
        return if is_vector { 30 } else { 0 };
    };
    let sizes = sizes.trim().to_lowercase();
    if sizes == "any" {
        return if is_vector { 30 } else { 15 };
    }

    let px = sizes
        .split(['x', ' '])
        .filter_map(|part| part.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let px = if px == 999 { 256 } else { px };

    match px {
        180..=256 => 30,
        120..=179 | 257..=512 => 20,
        64..=119 => 10,
        1..=63 => 5,
        _ => 0,
    }
}

// === Featured image ===

/// Featured-image cascade over hero/cover selectors, skipping avatars and
/// anything that fails image-URL validation.
#[must_use]
pub fn resolve_featured_image(doc: &Document, resolver: &ImageResolver) -> Option<String> {
    for selector in patterns::FEATURED_IMAGE_SELECTORS {
        for node in doc.select(selector).nodes() {
            let img = Selection::from(*node);
            if is_avatar(&img) {
                continue;
            }
            match resolver.resolve(&img) {
                Ok(Some(url)) => return Some(url),
                Ok(None) => continue,
                Err(err) => {
                    log::debug!("featured image candidate failed: {err}");
                    continue;
                }
            }
        }
    }
    None
}

/// Avatar classification: keyword match on the image or up to three
/// ancestor levels, or declared natural dimensions both under 200px.
fn is_avatar(img: &Selection) -> bool {
    if dom::looks_like_avatar(img) {
        return true;
    }
    if dom::find_in_ancestors(img, 3, |a| dom::looks_like_avatar(a).then_some(())).is_some() {
        return true;
    }

    let width = dom::attr(img, "width").and_then(|w| w.parse::<u32>().ok());
    let height = dom::attr(img, "height").and_then(|h| h.parse::<u32>().ok());
    matches!((width, height), (Some(w), Some(h)) if w < 200 && h < 200)
}

fn absolutize(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = base?;
    if href.starts_with("//") {
        return Some(format!("{}:{href}", base.scheme()));
    }
    base.join(href).ok().map(|u| u.to_string())
}
