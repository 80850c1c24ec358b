//! Structured-payload extraction.
//!
//! Framework-rendered pages embed the article as machine-readable data
//! rather than visible markup. This module detects and parses those
//! payloads, locates the article object, validates it against the live
//! document (stale single-page-app state is a real hazard), and converts
//! it into blocks.

pub mod convert;
pub mod detect;
pub mod locate;

use url::Url;

use crate::dom::{self, Document};
use crate::error::Result;
use crate::images::ImageResolver;
use crate::options::Options;
use crate::result::RawExtraction;

/// True when the document carries a recognizable embedded payload.
///
/// Used as the barrier check before strategy dispatch: a present payload is
/// always probed first regardless of the selected strategy.
#[must_use]
pub fn detect_payload(doc: &Document) -> bool {
    detect::has_payload(doc)
}

/// Run the full structured extraction chain.
///
/// Returns `Ok(None)` when no payload exists, the payload has no
/// article-shaped node, or the payload fails freshness validation. Only the
/// image proxy-depth hard failure is an error.
pub fn extract_structured(
    doc: &Document,
    options: &Options,
    resolver: &ImageResolver,
) -> Result<Option<RawExtraction>> {
    let Some(payload) = detect::find_payload(doc, &options.heuristics) else {
        return Ok(None);
    };

    let Some(article) = locate::locate_article(&payload, &options.heuristics) else {
        log::debug!("payload present but no article-shaped node found");
        return Ok(None);
    };

    let live_path = options
        .url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
        .map(|u| u.path().to_string());
    let live_title = dom::text_content(&doc.select("title")).trim().to_string();

    if !locate::is_fresh(&article, live_path.as_deref(), &live_title) {
        log::debug!("rejecting stale structured payload");
        return Ok(None);
    }

    let extraction = convert::convert_article(&article, resolver)?;

    // A payload that converts to nothing is no extraction at all.
    if extraction.blocks.is_empty() && extraction.content.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(extraction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Heuristics;

    fn setup(html: &str, url: &str) -> (Document, Options, ImageResolver) {
        let doc = dom::parse(html);
        let options = Options {
            url: Some(url.to_string()),
            ..Options::default()
        };
        let resolver = ImageResolver::new(Url::parse(url).ok(), &Heuristics::default());
        (doc, options, resolver)
    }

    #[test]
    fn fresh_payload_extracts_blocks() {
        let html = r##"<html><head><title>Hello Article - Site</title></head><body>
            <script id="__NEXT_DATA__" type="application/json">
            {"props":{"pageProps":{"article":{
                "title":"Hello Article",
                "path":"/hello",
                "blocks":[{"type":"text","text":"Paragraph one."}]
            }}}}
            </script></body></html>"##;
        let (doc, options, resolver) = setup(html, "https://example.com/hello");
        let extraction = extract_structured(&doc, &options, &resolver).unwrap();
        assert!(extraction.is_some_and(|e| e.blocks.len() == 1));
    }

    #[test]
    fn stale_path_rejects_whole_payload() {
        let html = r##"<html><head><title>Hello Article</title></head><body>
            <script id="__NEXT_DATA__" type="application/json">
            {"props":{"pageProps":{"article":{
                "title":"Hello Article",
                "path":"/previous-page",
                "blocks":[{"type":"text","text":"Old content."}]
            }}}}
            </script></body></html>"##;
        let (doc, options, resolver) = setup(html, "https://example.com/current-page");
        let extraction = extract_structured(&doc, &options, &resolver).unwrap();
        assert!(extraction.is_none());
    }

    #[test]
    fn stale_title_rejects_whole_payload() {
        let html = r##"<html><head><title>Completely Different Title</title></head><body>
            <script id="__NEXT_DATA__" type="application/json">
            {"props":{"pageProps":{"article":{
                "title":"Leftover Navigation Target",
                "blocks":[{"type":"text","text":"Old content."}]
            }}}}
            </script></body></html>"##;
        let (doc, options, resolver) = setup(html, "https://example.com/x");
        let extraction = extract_structured(&doc, &options, &resolver).unwrap();
        assert!(extraction.is_none());
    }

    #[test]
    fn documents_without_payload_return_none() {
        let (doc, options, resolver) =
            setup("<html><body><p>plain</p></body></html>", "https://example.com/x");
        assert!(!detect_payload(&doc));
        let extraction = extract_structured(&doc, &options, &resolver).unwrap();
        assert!(extraction.is_none());
    }
}
