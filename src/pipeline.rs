//! End-to-end extraction pipeline.
//!
//! One run: parse, expand collapsed regions, profile the document, pick a
//! strategy, probe the structured payload, run the selected primary path,
//! then convert whatever survived into typed blocks and attach metadata. The chain degrades step
//! by step and never returns an empty result; when everything fails the
//! caller gets a single explanatory paragraph instead.

use std::thread;

use dom_query::Document;
use log::debug;
use url::Url;

use crate::batch;
use crate::blocks::Block;
use crate::convert::{self, TreeConverter};
use crate::dom;
use crate::error::Result;
use crate::expand::{DomExpander, Expander};
use crate::fallback;
use crate::images::{ImageCapture, ImageResolver};
use crate::lru::LruSet;
use crate::metadata;
use crate::options::{Heuristics, Options};
use crate::profile;
use crate::readability;
use crate::result::{ContentKind, DebugInfo, ExtractResult, RawArticle, RawExtraction};
use crate::strategy::{self, ExtractionStrategy};
use crate::structured;

/// Message emitted as the sole block when the whole chain comes up empty.
const EXHAUSTION_MESSAGE: &str =
    "No readable content could be extracted from this page. The page may be \
     empty, fully scripted, or behind an interaction gate.";

/// Run the pipeline with the default expander.
pub fn run(html: &str, options: &Options) -> Result<ExtractResult> {
    run_with_expander(html, options, &DomExpander)
}

/// Run the pipeline with a caller-supplied expander.
pub fn run_with_expander(
    html: &str,
    options: &Options,
    expander: &dyn Expander,
) -> Result<ExtractResult> {
    let doc = dom::parse(html);

    let expanded = expander.expand(&doc);
    if expanded > 0 && !options.settle_delay.is_zero() {
        thread::sleep(options.settle_delay);
    }
    // Expansion mutates the tree; readability must see the expanded markup.
    let readable_html = if expanded > 0 {
        doc.html().to_string()
    } else {
        html.to_string()
    };

    let profile = profile::analyze_document(&doc);
    let selection = strategy::select_strategy(&profile);
    debug!(
        "strategy {:?} confidence {} verify={}",
        selection.strategy, selection.confidence, selection.needs_fallback_verification
    );

    let base = options.url.as_deref().and_then(|u| Url::parse(u).ok());
    let resolver = ImageResolver::new(base.clone(), &options.heuristics);
    let mut steps: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    // A present payload is always probed first regardless of strategy.
    let mut raw: Option<RawExtraction> = None;
    if structured::detect_payload(&doc) {
        steps.push("structured".to_string());
        raw = structured::extract_structured(&doc, options, &resolver)?;
        if raw.is_none() {
            warnings.push("structured payload present but unusable".to_string());
        }
    }

    if let Some(extraction) = &raw {
        if selection.needs_fallback_verification && !verify_extraction(extraction, options) {
            warnings.push("primary extraction failed verification".to_string());
            raw = None;
        }
    }

    // The selected primary path runs only when no payload was usable.
    if raw.is_none() && selection.strategy == ExtractionStrategy::Structured {
        steps.push("markdown".to_string());
        raw = extract_markdown(&doc, &options.heuristics);
    }

    if raw.is_none() {
        steps.push("readability".to_string());
        raw = readability::extract_readable(
            &readable_html,
            options.url.as_deref(),
            &options.heuristics,
        );
    }

    if raw.is_none() {
        steps.push("fallbacks".to_string());
        raw = fallback::extract_with_fallbacks(&doc, &options.heuristics);
    }

    let article = raw
        .as_ref()
        .map_or_else(RawArticle::default, |r| r.article.clone());
    let meta = metadata::extract_metadata(&doc, &article, base.as_ref(), &resolver);

    let mut seen_images = LruSet::default();
    let mut blocks = match raw {
        Some(extraction) => convert_extraction(extraction, &resolver, options, &mut seen_images)?,
        None => Vec::new(),
    };

    if options.collect_images {
        collect_supplementary_images(&doc, &resolver, options, &mut seen_images, &mut blocks);
    }

    if blocks.is_empty() {
        warnings.push("extraction chain exhausted".to_string());
        if let Some(block) = Block::paragraph(EXHAUSTION_MESSAGE) {
            blocks.push(block);
        }
    }

    let debug_info = options.debug.then(|| DebugInfo {
        profile,
        selection,
        steps,
    });

    Ok(ExtractResult {
        title: meta.title,
        blocks,
        site_icon: meta.site_icon,
        cover_image: meta.featured_image,
        warnings,
        debug: debug_info,
    })
}

/// Markup source for the direct markdown path.
///
/// Hands the tightest main-content container to the tree converter without
/// a minimum-length gate; short clean pages are exactly what this path is
/// selected for. Link-dominated containers are still rejected so a
/// chrome-heavy body falls through to readability instead.
fn extract_markdown(doc: &Document, heuristics: &Heuristics) -> Option<RawExtraction> {
    let container = ["article", "main", "[role=\"main\"]", "body"]
        .into_iter()
        .map(|css| doc.select(css))
        .find(|sel| !sel.is_empty() && !dom::text_content(sel).trim().is_empty())?;

    let list_items = dom::count(&container, "li");
    if dom::link_density(&container) > heuristics.max_link_density
        && list_items < heuristics.list_exception_items
    {
        return None;
    }

    Some(RawExtraction::markup(
        dom::outer_html(&container).to_string(),
        RawArticle::default(),
    ))
}

/// Cross-check a suspicious primary extraction before trusting it.
fn verify_extraction(extraction: &RawExtraction, options: &Options) -> bool {
    match extraction.kind {
        ContentKind::Markup => {
            readability::is_content_good(&extraction.content, &options.heuristics)
        }
        ContentKind::MarkdownLike => {
            extraction.content.trim().len() >= options.heuristics.min_content_length
                || !extraction.blocks.is_empty()
        }
        ContentKind::Structured => !extraction.blocks.is_empty(),
    }
}

/// Convert one raw extraction into blocks, seeding the dedup set with any
/// image blocks the extractor already produced.
fn convert_extraction(
    extraction: RawExtraction,
    resolver: &ImageResolver,
    options: &Options,
    seen_images: &mut LruSet,
) -> Result<Vec<Block>> {
    let mut blocks = extraction.blocks;
    for block in &blocks {
        if let Some(url) = block.image_url() {
            seen_images.insert(url);
        }
    }

    match extraction.kind {
        ContentKind::Structured => {}
        ContentKind::Markup => {
            let mut converter = TreeConverter::new(resolver, &options.heuristics, seen_images);
            blocks.extend(converter.convert(&extraction.content)?);
        }
        ContentKind::MarkdownLike => {
            blocks.extend(convert::convert_lines(
                &extraction.content,
                resolver,
                seen_images,
            )?);
        }
    }
    Ok(blocks)
}

/// Append in-content images the converters did not already emit.
///
/// Candidates are captured in document order, resolved concurrently, and
/// appended in that same order.
fn collect_supplementary_images(
    doc: &Document,
    resolver: &ImageResolver,
    options: &Options,
    seen_images: &mut LruSet,
    blocks: &mut Vec<Block>,
) {
    let imgs = doc.select("img");
    let captures: Vec<ImageCapture> = imgs
        .nodes()
        .iter()
        .map(|node| {
            let sel = dom_query::Selection::from(*node);
            if dom::looks_like_avatar(&sel) {
                ImageCapture::default()
            } else {
                ImageResolver::capture(&sel)
            }
        })
        .collect();

    let resolved = batch::resolve_captures(&captures, resolver, &options.heuristics);
    for url in resolved.into_iter().flatten() {
        if seen_images.insert(&url) {
            blocks.push(Block::Image { url });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> Options {
        Options {
            url: Some("https://example.com/post".to_string()),
            collect_images: false,
            ..Options::default()
        }
    }

    fn long_article(extra: &str) -> String {
        let body = "Paragraph of real article text that is long enough to pass the \
                    minimum content gate when repeated a few times. "
            .repeat(8);
        format!(
            "<html><head><title>Test</title></head><body>\
             <article><h1>Title</h1><p>{body}</p><p>{body}</p>{extra}</article>\
             </body></html>"
        )
    }

    #[test]
    fn result_is_never_empty() {
        let result = run("<html><body></body></html>", &opts()).unwrap_or_default();
        assert!(!result.blocks.is_empty());
        assert!(result.blocks[0].plain_text().contains("No readable content"));
    }

    #[test]
    fn exhaustion_is_reported_as_a_warning() {
        let result = run("<html><body><nav>x</nav></body></html>", &opts()).unwrap_or_default();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("exhausted")));
    }

    #[test]
    fn debug_info_is_attached_only_on_request() {
        let html = long_article("");
        let plain = run(&html, &opts()).unwrap_or_default();
        assert!(plain.debug.is_none());

        let debug_opts = Options {
            debug: true,
            ..opts()
        };
        let debugged = run(&html, &debug_opts).unwrap_or_default();
        let info = debugged.debug.unwrap_or_else(|| panic!("debug info missing"));
        assert!(!info.steps.is_empty());
    }

    #[test]
    fn short_clean_document_converts_directly() {
        let html = "<html><head><title>Test</title></head><body>\
                    <h1>Title</h1><p>A</p><p>B</p></body></html>";
        let result = run(html, &opts()).unwrap_or_default();
        let texts: Vec<String> = result.blocks.iter().map(Block::plain_text).collect();
        assert_eq!(texts, vec!["Title", "A", "B"]);
        assert!(matches!(result.blocks[0], Block::Heading1 { .. }));
    }

    #[test]
    fn link_dominated_short_body_is_not_converted_directly() {
        let html = "<html><body><a href=\"/a\">Home</a> <a href=\"/b\">About</a> \
                    <a href=\"/c\">Contact</a></body></html>";
        let result = run(html, &opts()).unwrap_or_default();
        assert!(result.blocks[0].plain_text().contains("No readable content"));
    }

    #[test]
    fn title_falls_back_to_document_title() {
        let result = run(&long_article(""), &opts()).unwrap_or_default();
        assert_eq!(result.title, "Test");
    }

    #[test]
    fn supplementary_images_respect_dedup() {
        let html = long_article(
            "<img src=\"/media/pic.jpg\"><img src=\"https://example.com/media/pic.jpg\">",
        );
        let options = Options {
            collect_images: true,
            ..opts()
        };
        let result = run(&html, &options).unwrap_or_default();
        let image_count = result
            .blocks
            .iter()
            .filter(|b| b.image_url() == Some("https://example.com/media/pic.jpg"))
            .count();
        assert_eq!(image_count, 1);
    }
}
