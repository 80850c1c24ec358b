//! Document complexity analysis.
//!
//! Computes structural metrics and boolean signals from one document
//! snapshot. The profile is computed once per run and never mutated; every
//! derived flag is a deterministic function of the counts, so strategy
//! selection stays reproducible for a given snapshot.

use serde::Serialize;

use crate::dom::{self, Document};
use crate::patterns;

/// Structural metrics and derived signals for one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComplexityProfile {
    pub ad_count: usize,
    pub nav_count: usize,
    pub content_count: usize,
    pub code_count: usize,
    pub list_count: usize,
    pub image_count: usize,
    pub video_count: usize,
    pub markdown_container_count: usize,
    pub text_length: usize,
    pub technical_hits: usize,
    pub technical_ratio: f64,

    pub is_clean: bool,
    pub has_markdown_features: bool,
    pub has_technical_content: bool,
    pub has_ads: bool,
    pub is_complex_layout: bool,
    pub is_long_form: bool,
    pub has_rich_media: bool,
}

/// Ratio of technical-term hits to words above which content is technical.
const TECHNICAL_RATIO_THRESHOLD: f64 = 0.02;

/// Raw technical-term hit count that marks content technical on its own.
const TECHNICAL_HITS_THRESHOLD: usize = 10;

/// Compute the complexity profile for a document.
///
/// Pure over the snapshot: no mutation, no caching across runs. Degrades to
/// [`hostile_profile`] instead of raising if any counting step fails.
#[must_use]
pub fn analyze_document(doc: &Document) -> ComplexityProfile {
    match try_analyze(doc) {
        Some(profile) => profile,
        None => {
            log::warn!("complexity analysis failed, assuming hostile layout");
            hostile_profile()
        }
    }
}

fn try_analyze(doc: &Document) -> Option<ComplexityProfile> {
    let body = doc.select("body");
    if body.is_empty() {
        return None;
    }

    let ad_count = dom::count(&body, patterns::AD_SELECTOR);
    let nav_count = dom::count(&body, patterns::NAV_SELECTOR);
    let content_count = dom::count(&body, patterns::CONTENT_CONTAINER_SELECTOR);
    let code_count = dom::count(&body, patterns::CODE_SELECTOR);
    let list_count = dom::count(&body, "ul, ol");
    let image_count = dom::count(&body, "img");
    let video_count = dom::count(&body, patterns::VIDEO_SELECTOR);
    let markdown_container_count = dom::count(&body, patterns::MARKDOWN_CONTAINER_SELECTOR);

    let text = dom::text_content(&body);
    let text = text.trim();
    let text_length = text.chars().count();
    let lowered = text.to_lowercase();

    let mut technical_hits = 0usize;
    for term in patterns::TECHNICAL_TERMS {
        technical_hits += lowered.matches(term).count();
    }
    let word_count = lowered.split_whitespace().count();
    let technical_ratio = if word_count == 0 {
        0.0
    } else {
        technical_hits as f64 / word_count as f64
    };

    // Threshold rules for the derived flags. All counts refer to one body
    // snapshot; two nav-like containers (a header and a footer) are normal
    // on otherwise clean pages.
    let has_ads = ad_count >= 2;
    let is_clean = ad_count == 0 && nav_count <= 3;
    let has_markdown_features = markdown_container_count > 0 || code_count >= 2;
    let has_technical_content =
        technical_ratio > TECHNICAL_RATIO_THRESHOLD || technical_hits > TECHNICAL_HITS_THRESHOLD;
    let is_complex_layout = nav_count >= 6 || ad_count + nav_count >= 9;
    let is_long_form = text_length > 4000;
    let has_rich_media = video_count > 0 || image_count > 15;

    Some(ComplexityProfile {
        ad_count,
        nav_count,
        content_count,
        code_count,
        list_count,
        image_count,
        video_count,
        markdown_container_count,
        text_length,
        technical_hits,
        technical_ratio,
        is_clean,
        has_markdown_features,
        has_technical_content,
        has_ads,
        is_complex_layout,
        is_long_form,
        has_rich_media,
    })
}

/// Safe default when analysis itself fails: treat the page as hostile so
/// strategy selection routes through the defensive readability path.
#[must_use]
pub fn hostile_profile() -> ComplexityProfile {
    ComplexityProfile {
        has_ads: true,
        is_complex_layout: true,
        ..ComplexityProfile::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_minimal_document_is_clean() {
        let doc = dom::parse("<html><body><h1>Title</h1><p>A</p><p>B</p></body></html>");
        let profile = analyze_document(&doc);
        assert!(profile.is_clean);
        assert!(!profile.has_ads);
        assert!(!profile.is_complex_layout);
    }

    #[test]
    fn ad_markers_flip_has_ads() {
        let doc = dom::parse(
            r#"<body><div class="advert-top">x</div><div class="ad-slot">y</div><p>text</p></body>"#,
        );
        let profile = analyze_document(&doc);
        assert!(profile.has_ads);
        assert!(!profile.is_clean);
    }

    #[test]
    fn markdown_container_is_counted() {
        let doc = dom::parse(r#"<body><div class="markdown-body"><p>docs</p></div></body>"#);
        let profile = analyze_document(&doc);
        assert_eq!(profile.markdown_container_count, 1);
        assert!(profile.has_markdown_features);
    }

    #[test]
    fn technical_vocabulary_sets_flag_on_raw_hits() {
        let tech = "function async await compiler runtime api endpoint database query \
                    server struct regex"
            .repeat(2);
        let doc = dom::parse(&format!("<body><p>{tech}</p></body>"));
        let profile = analyze_document(&doc);
        assert!(profile.technical_hits > 10);
        assert!(profile.has_technical_content);
    }

    #[test]
    fn long_form_threshold_uses_text_length() {
        let body = "word ".repeat(1200);
        let doc = dom::parse(&format!("<body><article><p>{body}</p></article></body>"));
        let profile = analyze_document(&doc);
        assert!(profile.is_long_form);
    }

    #[test]
    fn hostile_profile_routes_defensively() {
        let profile = hostile_profile();
        assert!(profile.has_ads);
        assert!(profile.is_complex_layout);
        assert!(!profile.is_clean);
    }
}
