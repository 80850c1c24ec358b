//! # rs-blockclip
//!
//! Main-content extraction from rendered web pages into typed content blocks.
//!
//! The pipeline profiles a page, picks an extraction strategy, probes
//! framework-embedded JSON payloads, falls back through readability and
//! DOM heuristics, and converts whatever survives into a flat sequence of
//! blocks (paragraphs, headings, lists, quotes, images, code, dividers)
//! with page metadata attached.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_blockclip::{extract, Options};
//!
//! let html = r#"<html><head><title>My Article</title></head>
//! <body><article><h1>My Article</h1><p>Main content here.</p></article></body></html>"#;
//!
//! let result = extract(html)?;
//! println!("Title: {}", result.title);
//! println!("Blocks: {}", result.blocks.len());
//! # Ok::<(), rs_blockclip::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Strategy Selection**: Complexity profiling picks the extraction path
//! - **Structured Payloads**: SSR/ISR JSON payloads are probed before any
//!   DOM heuristic, with freshness validation against the live page
//! - **Fallback Chain**: Readability, CMS patterns, largest text block,
//!   and largest list, in order
//! - **Typed Blocks**: Output is a flat block sequence, never raw HTML

mod error;
mod options;
mod patterns;
mod pipeline;

/// Intermediate and final result types.
pub mod result;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// LRU set for image URL deduplication.
pub mod lru;

/// Document complexity profiling.
pub mod profile;

/// Extraction strategy selection and confidence scoring.
pub mod strategy;

/// Embedded structured payload detection, location, and conversion.
pub mod structured;

/// Readability-backed extraction and the content quality gate.
pub mod readability;

/// DOM heuristic fallback chain (CMS patterns, largest block, largest list).
pub mod fallback;

/// Page metadata resolution (title, author, icons, featured image).
pub mod metadata;

/// Typed content block model.
pub mod blocks;

/// Block converters for markup trees and markdown-like text.
pub mod convert;

/// Image candidate capture, proxy unwrapping, and URL validation.
pub mod images;

/// Bounded-concurrency image candidate resolution.
pub mod batch;

/// Pre-extraction expansion of collapsed page regions.
pub mod expand;

// Public API - re-exports
pub use blocks::{Annotations, Block, RichTextSpan};
pub use error::{Error, Result};
pub use expand::{DomExpander, Expander, NoopExpander};
pub use options::{Heuristics, Options};
pub use result::{DebugInfo, ExtractResult};

/// Extracts typed content blocks from an HTML document using default options.
///
/// # Arguments
///
/// * `html` - The HTML document as a string slice
///
/// # Returns
///
/// Returns `Ok(ExtractResult)` with the block sequence and metadata. The
/// block sequence is never empty; when every extraction step fails it holds
/// a single explanatory paragraph. The only hard error is an image proxy
/// chain nested past the configured depth cap.
///
/// # Example
///
/// ```rust
/// use rs_blockclip::extract;
///
/// let html = "<html><body><article><p>Content</p></article></body></html>";
/// let result = extract(html)?;
/// assert!(!result.blocks.is_empty());
/// # Ok::<(), rs_blockclip::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn extract(html: &str) -> Result<ExtractResult> {
    extract_with_options(html, &Options::default())
}

/// Extracts typed content blocks from an HTML document with custom options.
///
/// # Arguments
///
/// * `html` - The HTML document as a string slice
/// * `options` - Configuration for URL resolution, debugging, and heuristics
///
/// # Example
///
/// ```rust
/// use rs_blockclip::{extract_with_options, Options};
///
/// let html = "<html><body><article><p>Content</p></article></body></html>";
/// let options = Options {
///     url: Some("https://example.com/post".to_string()),
///     debug: true,
///     ..Options::default()
/// };
/// let result = extract_with_options(html, &options)?;
/// assert!(result.debug.is_some());
/// # Ok::<(), rs_blockclip::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn extract_with_options(html: &str, options: &Options) -> Result<ExtractResult> {
    pipeline::run(html, options)
}

/// Extracts typed content blocks with a caller-supplied collapse expander.
///
/// Use this when the snapshot source has its own notion of revealing hidden
/// content, or pass [`NoopExpander`] to skip expansion entirely.
#[allow(clippy::missing_errors_doc)]
pub fn extract_with_expander(
    html: &str,
    options: &Options,
    expander: &dyn Expander,
) -> Result<ExtractResult> {
    pipeline::run_with_expander(html, options, expander)
}
