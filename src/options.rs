//! Configuration options for block extraction.
//!
//! The `Options` struct controls pipeline behavior. Empirically chosen
//! heuristic constants live in the nested `Heuristics` struct so callers can
//! override them instead of relying on inline literals.

use std::time::Duration;

/// Configuration options for the extraction pipeline.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_blockclip::Options;
///
/// let options = Options {
///     url: Some("https://example.com/article".to_string()),
///     debug: true,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Live page URL of the document snapshot.
    ///
    /// Used for relative-URL resolution, favicon defaulting, and
    /// structured-payload freshness validation. Extraction still works
    /// without it, but image and icon URLs then stay unresolved unless
    /// already absolute.
    ///
    /// Default: `None`
    pub url: Option<String>,

    /// Attach `DebugInfo` (complexity profile, strategy selection, fallback
    /// trail) to the result.
    ///
    /// Default: `false`
    pub debug: bool,

    /// Collect supplementary in-content images that the block converters did
    /// not already emit, appending them as image blocks in document order.
    ///
    /// Default: `true`
    pub collect_images: bool,

    /// One-shot settle delay applied after a non-zero collapsible-content
    /// expansion, before the main extraction reads the tree.
    ///
    /// Meaningful only when the snapshot may still be reacting to the
    /// expansion; for static fixtures leave it at zero.
    ///
    /// Default: `Duration::ZERO`
    pub settle_delay: Duration,

    /// Tunable heuristic constants.
    pub heuristics: Heuristics,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            url: None,
            debug: false,
            collect_images: true,
            settle_delay: Duration::ZERO,
            heuristics: Heuristics::default(),
        }
    }
}

/// Named heuristic constants used across the pipeline.
///
/// These values are empirically chosen; none of them is a load-bearing
/// invariant. They are grouped here so product-level validation can tune
/// them without touching decision code.
#[derive(Debug, Clone)]
pub struct Heuristics {
    /// Minimum character count for readability output to pass the quality
    /// gate, and for fallback containers to be considered at all.
    ///
    /// Default: `250`
    pub min_content_length: usize,

    /// Maximum anchor-text share of total text before readability output is
    /// rejected as link-dominated.
    ///
    /// Default: `0.3`
    pub max_link_density: f64,

    /// List-item count at which a document bypasses the link-density check
    /// (legitimately list-heavy pages are link-dense by nature).
    ///
    /// Default: `8`
    pub list_exception_items: usize,

    /// Share of a paragraph's lines that must look like bullet/numbered
    /// entries before the paragraph is re-emitted as list items.
    ///
    /// Default: `0.6`
    pub list_line_ratio: f64,

    /// Minimum score for a node visited by the structured-payload heuristic
    /// search to be accepted as the article object.
    ///
    /// Default: `35`
    pub article_score_threshold: i32,

    /// Maximum recursion depth for the structured-payload heuristic search.
    ///
    /// Default: `6`
    pub max_search_depth: usize,

    /// Byte ceiling for a whole-blob embedded payload; larger blobs are
    /// rejected and the extractor falls through.
    ///
    /// Default: `2_000_000`
    pub max_payload_bytes: usize,

    /// Maximum number of nested proxy URLs unwrapped by `clean_image_url`
    /// before the hard `ProxyDepthExceeded` failure.
    ///
    /// Default: `5`
    pub max_proxy_depth: usize,

    /// Maximum accepted image URL length in characters.
    ///
    /// Default: `2000`
    pub max_image_url_len: usize,

    /// Minimum effective item count for the largest-list fallback.
    ///
    /// Default: `4`
    pub min_list_items: usize,

    /// Share of a pseudo-list container's lines that must carry a bullet or
    /// numbered prefix.
    ///
    /// Default: `0.4`
    pub pseudo_list_line_ratio: f64,

    /// Largest-block score added per paragraph in a candidate.
    ///
    /// Default: `50`
    pub block_paragraph_weight: usize,

    /// Largest-block score added per image in a candidate.
    ///
    /// Default: `30`
    pub block_image_weight: usize,

    /// Largest-block score subtracted per link in a candidate.
    ///
    /// Default: `25`
    pub block_link_penalty: usize,

    /// Largest-list score added per list item.
    ///
    /// Default: `10`
    pub list_item_weight: usize,

    /// Ceiling on the text-length component of the largest-list score so a
    /// wall of prose never outranks a denser list.
    ///
    /// Default: `500`
    pub list_text_score_cap: usize,

    /// Per-candidate attempt cap for the supplementary-image probe batch.
    ///
    /// Default: `2`
    pub image_probe_attempts: usize,

    /// Thread cap for the supplementary-image probe batch.
    ///
    /// Default: `4`
    pub image_probe_concurrency: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            min_content_length: 250,
            max_link_density: 0.3,
            list_exception_items: 8,
            list_line_ratio: 0.6,
            article_score_threshold: 35,
            max_search_depth: 6,
            max_payload_bytes: 2_000_000,
            max_proxy_depth: 5,
            max_image_url_len: 2000,
            min_list_items: 4,
            pseudo_list_line_ratio: 0.4,
            block_paragraph_weight: 50,
            block_image_weight: 30,
            block_link_penalty: 25,
            list_item_weight: 10,
            list_text_score_cap: 500,
            image_probe_attempts: 2,
            image_probe_concurrency: 4,
        }
    }
}
