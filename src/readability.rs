//! Readability adapter.
//!
//! Wraps the external readability algorithm behind a content-quality gate.
//! The algorithm itself is a black box; this module only decides whether
//! its output is trustworthy enough to convert. Rejections and exceptions
//! both route the pipeline into the fallback chain.

use crate::dom;
use crate::options::Heuristics;
use crate::result::{RawArticle, RawExtraction};

/// Quality gate for readability output.
///
/// Rejects missing/empty content and content under the minimum length.
/// Documents with at least the list-exception item count are accepted
/// unconditionally (legitimately list-heavy pages are link-dense by
/// nature); everything else must clear the link-density ceiling.
#[must_use]
pub fn is_content_good(content_html: &str, heuristics: &Heuristics) -> bool {
    if content_html.trim().is_empty() {
        return false;
    }

    let doc = dom::parse(&format!("<div id=\"bc-gate\">{content_html}</div>"));
    let root = doc.select("#bc-gate");

    let text_len = dom::text_len(&root);
    if text_len < heuristics.min_content_length {
        return false;
    }

    let list_items = dom::count(&root, "li");
    if list_items >= heuristics.list_exception_items {
        return true;
    }

    dom::link_density(&root) <= heuristics.max_link_density
}

/// Run the external readability algorithm over the document HTML.
///
/// Returns the content markup and the pass-through article fields, or
/// `None` on any algorithm failure (which the caller treats as a gate
/// rejection). Compiled out without the `readability` feature.
#[cfg(feature = "readability")]
#[must_use]
pub fn run_readability(html: &str, url: Option<&str>) -> Option<(String, RawArticle)> {
    use dom_smoothie::Readability;

    let mut reader = match Readability::new(html, url, None) {
        Ok(reader) => reader,
        Err(err) => {
            log::debug!("readability construction failed: {err:?}");
            return None;
        }
    };

    match reader.parse() {
        Ok(article) => {
            let raw = RawArticle {
                title: Some(article.title.clone()).filter(|t| !t.trim().is_empty()),
                byline: article.byline.clone(),
                excerpt: article.excerpt.clone(),
            };
            Some((article.content.to_string(), raw))
        }
        Err(err) => {
            log::debug!("readability parse failed: {err:?}");
            None
        }
    }
}

#[cfg(not(feature = "readability"))]
#[must_use]
pub fn run_readability(_html: &str, _url: Option<&str>) -> Option<(String, RawArticle)> {
    None
}

/// Readability extraction guarded by the quality gate.
///
/// `Ok`-shaped output only: a gate rejection or algorithm failure is
/// `None`, and the caller falls through to the CMS/largest-block chain.
#[must_use]
pub fn extract_readable(
    html: &str,
    url: Option<&str>,
    heuristics: &Heuristics,
) -> Option<RawExtraction> {
    let (content, article) = run_readability(html, url)?;
    if !is_content_good(&content, heuristics) {
        log::debug!("readability output rejected by content gate");
        return None;
    }
    Some(RawExtraction::markup(content, article))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristics() -> Heuristics {
        Heuristics::default()
    }

    #[test]
    fn gate_is_monotonic_in_length_at_zero_density() {
        let short = format!("<p>{}</p>", "a".repeat(249));
        let exact = format!("<p>{}</p>", "a".repeat(250));
        assert!(!is_content_good(&short, &heuristics()));
        assert!(is_content_good(&exact, &heuristics()));
    }

    #[test]
    fn gate_rejects_empty_content() {
        assert!(!is_content_good("", &heuristics()));
        assert!(!is_content_good("   ", &heuristics()));
    }

    #[test]
    fn list_exception_overrides_density_rejection() {
        // ~0.35 link density: 350 linked chars out of 1000 total
        let linked = "x".repeat(350);
        let plain = "y".repeat(650);
        let items: String = (0..8).map(|i| format!("<li>item {i}</li>")).collect();
        let listy = format!("<a href=\"#\">{linked}</a><p>{plain}</p><ul>{items}</ul>");
        assert!(is_content_good(&listy, &heuristics()));

        let few_items: String = (0..5).map(|i| format!("<li>item {i}</li>")).collect();
        let sparse = format!("<a href=\"#\">{linked}</a><p>{plain}</p><ul>{few_items}</ul>");
        assert!(!is_content_good(&sparse, &heuristics()));
    }

    #[test]
    fn density_at_ceiling_passes() {
        let linked = "x".repeat(300);
        let plain = "y".repeat(700);
        let html = format!("<a href=\"#\">{linked}</a><p>{plain}</p>");
        assert!(is_content_good(&html, &heuristics()));
    }

    #[cfg(feature = "readability")]
    #[test]
    fn readability_runs_over_article_markup() {
        let para = "This is a substantive sentence with meaningful words. ".repeat(20);
        let html = format!(
            "<html><head><title>T</title></head><body><article><h1>Header</h1>\
             <p>{para}</p><p>{para}</p></article></body></html>"
        );
        let extraction = extract_readable(&html, Some("https://example.com/a"), &heuristics());
        assert!(extraction.is_some_and(|e| e.content.contains("substantive")));
    }
}
