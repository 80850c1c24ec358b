//! Image URL resolution and canonicalization.
//!
//! Lazy-load libraries, responsive markup, and CDN proxies encode the real
//! image URL in a dozen competing places. The resolver runs an ordered
//! strategy chain over them and returns the first candidate that cleans and
//! validates; competing candidates never survive past resolution.
//!
//! The only hard failure in this module is `Error::ProxyDepthExceeded`:
//! a proxy chain nested past the configured cap is treated as adversarial
//! input, not as ordinary missing data.

use url::Url;

use crate::dom::{self, Selection};
use crate::error::{Error, Result};
use crate::options::Heuristics;
use crate::patterns;

/// How many ancestor levels are scanned for CSS background images.
const BACKGROUND_ANCESTOR_LEVELS: usize = 3;

/// All image-bearing data captured from one element, detached from the DOM.
///
/// Captured synchronously while the tree is available; resolution afterwards
/// is pure string work, which is what lets the supplementary-image batch run
/// concurrently.
#[derive(Debug, Clone, Default)]
pub struct ImageCapture {
    /// `srcset` or `data-srcset` of the element itself.
    pub srcset: Option<String>,
    /// Values of the standard/lazy-load source attributes, in priority order.
    pub attr_sources: Vec<String>,
    /// `srcset` and source URL of an ancestor `<picture>`'s `<source>`.
    pub picture_srcset: Option<String>,
    pub picture_src: Option<String>,
    /// Inline `style` of the element and its nearest ancestors.
    pub styles: Vec<String>,
    /// Literal markup of a sibling/parent `<noscript>` fallback.
    pub noscript_html: Option<String>,
}

/// Resolves a best-effort canonical image URL from an image-bearing node.
///
/// One resolver is constructed per extraction run and shared by the block
/// converters and metadata collection.
#[derive(Debug)]
pub struct ImageResolver {
    base: Option<Url>,
    heuristics: Heuristics,
}

impl ImageResolver {
    #[must_use]
    pub fn new(base: Option<Url>, heuristics: &Heuristics) -> Self {
        Self {
            base,
            heuristics: heuristics.clone(),
        }
    }

    /// Resolve a canonical URL for an image element.
    ///
    /// Returns `Ok(None)` when no strategy yields a valid URL. The only
    /// error is the proxy-depth hard failure.
    pub fn resolve(&self, img: &Selection) -> Result<Option<String>> {
        let capture = Self::capture(img);
        self.resolve_capture(&capture)
    }

    /// Snapshot every image-bearing source on the element and its vicinity.
    #[must_use]
    pub fn capture(img: &Selection) -> ImageCapture {
        let mut capture = ImageCapture {
            srcset: dom::attr(img, "srcset").or_else(|| dom::attr(img, "data-srcset")),
            ..ImageCapture::default()
        };

        for name in patterns::IMAGE_SRC_ATTRIBUTES {
            if let Some(value) = dom::attr(img, name) {
                if !value.trim().is_empty() {
                    capture.attr_sources.push(value);
                }
            }
        }

        // Ancestor <picture>/<source> resolution
        dom::find_in_ancestors(img, 2, |ancestor| {
            if dom::is_one_of_tags(ancestor, &["picture"]) {
                let source = ancestor.select("source");
                if !source.is_empty() {
                    capture.picture_srcset = dom::attr(&source, "srcset");
                    capture.picture_src = dom::attr(&source, "src")
                        .or_else(|| dom::attr(&source, "data-src"));
                }
                Some(())
            } else {
                None
            }
        });

        if let Some(style) = dom::attr(img, "style") {
            capture.styles.push(style);
        }
        dom::find_in_ancestors(img, BACKGROUND_ANCESTOR_LEVELS, |ancestor| {
            if let Some(style) = dom::attr(ancestor, "style") {
                capture.styles.push(style);
            }
            None::<()>
        });

        let parent = dom::parent(img);
        if !parent.is_empty() {
            let noscript = parent.select("noscript");
            if !noscript.is_empty() {
                capture.noscript_html = Some(dom::text_content(&noscript).to_string());
            }
        }

        capture
    }

    /// Run the strategy chain over a captured element; first valid URL wins.
    pub fn resolve_capture(&self, capture: &ImageCapture) -> Result<Option<String>> {
        // 1. Responsive-source attribute
        if let Some(srcset) = &capture.srcset {
            if let Some(candidate) = pick_from_srcset(srcset) {
                if let Some(url) = self.clean_image_url(&candidate)? {
                    return Ok(Some(url));
                }
            }
        }

        // 2. Standard/lazy-load attributes in fixed order
        for candidate in &capture.attr_sources {
            if let Some(url) = self.clean_image_url(candidate)? {
                return Ok(Some(url));
            }
        }

        // 3. Ancestor <picture>/<source>
        if let Some(srcset) = &capture.picture_srcset {
            if let Some(candidate) = pick_from_srcset(srcset) {
                if let Some(url) = self.clean_image_url(&candidate)? {
                    return Ok(Some(url));
                }
            }
        }
        if let Some(src) = &capture.picture_src {
            if let Some(url) = self.clean_image_url(src)? {
                return Ok(Some(url));
            }
        }

        // 4. CSS background-image on the element or nearby ancestors
        for style in &capture.styles {
            if let Some(caps) = patterns::CSS_URL.captures(style) {
                if let Some(url) = self.clean_image_url(&caps[1])? {
                    return Ok(Some(url));
                }
            }
        }

        // 5. <noscript> fallback markup
        if let Some(html) = &capture.noscript_html {
            if let Some(candidate) = url_from_noscript(html) {
                if let Some(url) = self.clean_image_url(&candidate)? {
                    return Ok(Some(url));
                }
            }
        }

        Ok(None)
    }

    /// Canonicalize and validate a raw candidate URL.
    ///
    /// Resolves relative candidates against the page base, unwraps known
    /// proxy shapes (bounded by the configured depth), deduplicates repeated
    /// query keys, then validates. Returns `Ok(None)` for anything that does
    /// not survive validation.
    pub fn clean_image_url(&self, raw: &str) -> Result<Option<String>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if raw.starts_with("data:") || raw.starts_with("blob:") {
            return Ok(None);
        }

        let absolute = self.to_absolute(raw);
        let Some(mut url) = Url::parse(&absolute).ok() else {
            return Ok(None);
        };

        url = self.unwrap_proxy(url, 0)?;
        let url = dedup_query_keys(&url);

        let text = url.to_string();
        if self.is_valid_image_url(&text) {
            Ok(Some(text))
        } else {
            Ok(None)
        }
    }

    /// Validation rules for a canonical absolute URL.
    ///
    /// Scheme, length, publishing-API character set, exclusion list, and
    /// finally a requirement of either a known image extension or an
    /// image-ish path segment.
    #[must_use]
    pub fn is_valid_image_url(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }
        if parsed.host_str().is_none() {
            return false;
        }
        if url.chars().count() > self.heuristics.max_image_url_len {
            return false;
        }
        if url.contains(patterns::URL_DISALLOWED_CHARS) || url.contains(char::is_whitespace) {
            return false;
        }
        if patterns::IMAGE_URL_EXCLUSION.is_match(url) {
            return false;
        }

        let path = parsed.path();
        patterns::IMAGE_EXTENSION.is_match(path) || patterns::IMAGE_PATH_HINT.is_match(path)
    }

    fn to_absolute(&self, raw: &str) -> String {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return raw.to_string();
        }
        if let Some(base) = &self.base {
            if raw.starts_with("//") {
                return format!("{}:{raw}", base.scheme());
            }
            if let Ok(joined) = base.join(raw) {
                return joined.to_string();
            }
        }
        raw.to_string()
    }

    /// Recursively substitute the nested origin URL out of proxy shapes.
    ///
    /// Depth is an explicit counter; exceeding the cap is the module's one
    /// hard failure.
    fn unwrap_proxy(&self, url: Url, depth: usize) -> Result<Url> {
        if depth > self.heuristics.max_proxy_depth {
            return Err(Error::ProxyDepthExceeded(self.heuristics.max_proxy_depth));
        }

        let nested = url.query_pairs().find_map(|(key, value)| {
            if !patterns::PROXY_URL_PARAMS.contains(&key.as_ref()) {
                return None;
            }
            let value = value.into_owned();
            if value.starts_with("http://") || value.starts_with("https://") {
                return Some(value);
            }
            // Double-encoded origins show up in some rewriters
            let decoded = urlencoding::decode(&value).map(|c| c.into_owned()).ok()?;
            if decoded.starts_with("http://") || decoded.starts_with("https://") {
                return Some(decoded);
            }
            None
        });

        match nested {
            Some(inner) => match Url::parse(&inner) {
                Ok(parsed) => self.unwrap_proxy(parsed, depth + 1),
                Err(_) => Ok(url),
            },
            None => Ok(url),
        }
    }
}

/// Select the winning candidate out of a `srcset` declaration.
///
/// Width-tagged candidates beat density-tagged ones; within a tag class the
/// largest descriptor wins; with neither, the last listed entry wins.
#[must_use]
pub fn pick_from_srcset(srcset: &str) -> Option<String> {
    let mut best_width: Option<(u32, String)> = None;
    let mut best_density: Option<(f64, String)> = None;
    let mut last: Option<String> = None;

    for entry in srcset.split(',') {
        let mut parts = entry.split_whitespace();
        let Some(url) = parts.next() else { continue };
        if url.is_empty() {
            continue;
        }
        last = Some(url.to_string());

        match parts.next() {
            Some(desc) if desc.ends_with('w') => {
                if let Ok(width) = desc.trim_end_matches('w').parse::<u32>() {
                    if best_width.as_ref().is_none_or(|(w, _)| width > *w) {
                        best_width = Some((width, url.to_string()));
                    }
                }
            }
            Some(desc) if desc.ends_with('x') => {
                if let Ok(density) = desc.trim_end_matches('x').parse::<f64>() {
                    if best_density.as_ref().is_none_or(|(d, _)| density > *d) {
                        best_density = Some((density, url.to_string()));
                    }
                }
            }
            _ => {}
        }
    }

    best_width
        .map(|(_, url)| url)
        .or(best_density.map(|(_, url)| url))
        .or(last)
}

/// Remove repeated query-parameter keys; the first occurrence wins.
///
/// Untouched when no key repeats, so canonical URLs round-trip unchanged.
fn dedup_query_keys(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut seen = std::collections::HashSet::new();
    let deduped: Vec<&(String, String)> =
        pairs.iter().filter(|(k, _)| seen.insert(k.clone())).collect();

    if deduped.len() == pairs.len() {
        return url.clone();
    }

    let mut cleaned = url.clone();
    cleaned.set_query(None);
    {
        let mut qp = cleaned.query_pairs_mut();
        for (k, v) in deduped {
            qp.append_pair(k, v);
        }
    }
    cleaned
}

/// Extract an image URL out of literal `<noscript>` markup.
///
/// Parses for an `<img>` tag first, then falls back to scanning for a bare
/// image-extension URL.
fn url_from_noscript(html: &str) -> Option<String> {
    let doc = dom::parse(&format!("<div>{html}</div>"));
    let img = doc.select("img");
    if !img.is_empty() {
        for name in patterns::IMAGE_SRC_ATTRIBUTES {
            if let Some(src) = dom::attr(&img, name) {
                if !src.trim().is_empty() {
                    return Some(src);
                }
            }
        }
    }
    patterns::BARE_IMAGE_URL
        .find(html)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Heuristics;

    fn resolver() -> ImageResolver {
        ImageResolver::new(
            Url::parse("https://example.com/article/page").ok(),
            &Heuristics::default(),
        )
    }

    #[test]
    fn srcset_largest_width_wins_over_order() {
        let picked = pick_from_srcset("a.jpg 400w, b.jpg 1200w");
        assert_eq!(picked.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn srcset_width_beats_density() {
        let picked = pick_from_srcset("low.jpg 2x, wide.jpg 800w");
        assert_eq!(picked.as_deref(), Some("wide.jpg"));
    }

    #[test]
    fn srcset_last_entry_wins_without_descriptors() {
        let picked = pick_from_srcset("first.jpg, second.jpg");
        assert_eq!(picked.as_deref(), Some("second.jpg"));
    }

    #[test]
    fn clean_is_idempotent_on_canonical_url() {
        let r = resolver();
        let input = "https://cdn.example.com/media/photo.jpg";
        let once = r.clean_image_url(input).ok().flatten();
        assert!(once.is_some());
        let once = once.unwrap_or_default();
        let twice = r.clean_image_url(&once).ok().flatten().unwrap_or_default();
        assert_eq!(once, twice);
    }

    #[test]
    fn proxy_unwrap_substitutes_nested_origin() {
        let r = resolver();
        let input = "https://proxy.example.com/resize?url=https%3A%2F%2Forigin.net%2Fimg%2Freal.png&w=640";
        let cleaned = r.clean_image_url(input).ok().flatten();
        assert_eq!(cleaned.as_deref(), Some("https://origin.net/img/real.png"));
    }

    #[test]
    fn self_referential_proxy_chain_fails_at_depth_cap() {
        let r = resolver();
        // Nest deeper than the cap allows; every unwrap exposes another proxy.
        let mut url = "https://proxy.example.com/media/a.png".to_string();
        for _ in 0..8 {
            url = format!(
                "https://proxy.example.com/p?url={}",
                urlencoding::encode(&url)
            );
        }
        let result = r.clean_image_url(&url);
        assert!(matches!(result, Err(crate::Error::ProxyDepthExceeded(5))));
    }

    #[test]
    fn repeated_query_keys_first_occurrence_wins() {
        let r = resolver();
        let input = "https://cdn.example.com/media/pic.jpg?w=100&w=999";
        let cleaned = r.clean_image_url(input).ok().flatten().unwrap_or_default();
        assert!(cleaned.contains("w=100"));
        assert!(!cleaned.contains("w=999"));
    }

    #[test]
    fn validation_rejects_non_http_and_tracking() {
        let r = resolver();
        assert!(!r.is_valid_image_url("ftp://example.com/a.png"));
        assert!(!r.is_valid_image_url("https://example.com/pixel/1x1.gif"));
        assert!(!r.is_valid_image_url("https://example.com/api/photo.jpg"));
        assert!(r.is_valid_image_url("https://example.com/uploads/photo.jpg"));
    }

    #[test]
    fn extensionless_url_needs_path_hint() {
        let r = resolver();
        assert!(r.is_valid_image_url("https://example.com/media/photo"));
        assert!(!r.is_valid_image_url("https://example.com/about/team"));
    }

    #[test]
    fn relative_candidates_resolve_against_base() {
        let r = resolver();
        let cleaned = r.clean_image_url("/images/cat.webp").ok().flatten();
        assert_eq!(
            cleaned.as_deref(),
            Some("https://example.com/images/cat.webp")
        );
    }

    #[test]
    fn data_uris_are_rejected_as_invalid() {
        let r = resolver();
        let cleaned = r.clean_image_url("data:image/png;base64,AAAA").ok().flatten();
        assert!(cleaned.is_none());
    }

    #[test]
    fn resolve_prefers_srcset_over_lazy_attributes() {
        let doc = dom::parse(
            r#"<img data-src="/media/lazy.jpg" srcset="/media/s.jpg 320w, /media/l.jpg 1280w">"#,
        );
        let r = resolver();
        let resolved = r.resolve(&doc.select("img")).ok().flatten();
        assert_eq!(resolved.as_deref(), Some("https://example.com/media/l.jpg"));
    }

    #[test]
    fn resolve_falls_back_to_background_style() {
        let doc = dom::parse(
            r#"<div style="background-image: url('/media/bg.png')"><span class="img-placeholder"></span></div>"#,
        );
        let r = resolver();
        let span = doc.select("span");
        let capture = ImageResolver::capture(&span);
        let resolved = r.resolve_capture(&capture).ok().flatten();
        assert_eq!(resolved.as_deref(), Some("https://example.com/media/bg.png"));
    }

    #[test]
    fn noscript_markup_yields_url() {
        let got = url_from_noscript(r#"<img src="https://x.com/media/n.jpg">"#);
        assert_eq!(got.as_deref(), Some("https://x.com/media/n.jpg"));
        let bare = url_from_noscript("see https://x.com/photos/p.png here");
        assert_eq!(bare.as_deref(), Some("https://x.com/photos/p.png"));
    }
}
