//! Result types for extraction output.
//!
//! `RawExtraction` is the intermediate handoff between the strategy layer
//! and the block converters; `ExtractResult` is the final assembled shape
//! the downstream publishing layer consumes.

use serde::Serialize;

use crate::blocks::Block;
use crate::profile::ComplexityProfile;
use crate::strategy::ExtractionSelection;

/// What kind of raw content an extraction strategy produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A markup tree serialized as HTML; goes through the tree converter.
    Markup,
    /// Plain/markdown-like text; goes through the line converter.
    MarkdownLike,
    /// Already converted to blocks by the structured extractor.
    Structured,
}

/// Opaque upstream article fields passed through for metadata resolution.
///
/// Filled by whichever strategy produced the content; every field may be
/// missing and the metadata cascades treat them as the highest-priority
/// source only when present.
#[derive(Debug, Clone, Default)]
pub struct RawArticle {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
}

/// Output of one extraction strategy, before block conversion.
#[derive(Debug, Clone)]
pub struct RawExtraction {
    pub kind: ContentKind,
    /// Raw content for the converters; empty when `blocks` is pre-filled.
    pub content: String,
    /// Pre-converted blocks (structured path only).
    pub blocks: Vec<Block>,
    pub article: RawArticle,
}

impl RawExtraction {
    /// Markup-tree extraction result.
    #[must_use]
    pub fn markup(content: String, article: RawArticle) -> Self {
        Self {
            kind: ContentKind::Markup,
            content,
            blocks: Vec::new(),
            article,
        }
    }

    /// Markdown-like text extraction result.
    #[must_use]
    pub fn markdown_like(content: String, article: RawArticle) -> Self {
        Self {
            kind: ContentKind::MarkdownLike,
            content,
            blocks: Vec::new(),
            article,
        }
    }

    /// Pre-converted block sequence from the structured extractor.
    #[must_use]
    pub fn structured(blocks: Vec<Block>, article: RawArticle) -> Self {
        Self {
            kind: ContentKind::Structured,
            content: String::new(),
            blocks,
            article,
        }
    }
}

/// Diagnostic payload attached when `Options.debug` is set.
///
/// Never required for correctness; exists so a failed page can be diagnosed
/// from its result alone.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub profile: ComplexityProfile,
    pub selection: ExtractionSelection,
    /// Names of extraction/fallback steps that ran, in order.
    pub steps: Vec<String>,
}

/// Final assembled result of one extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    /// Page title; always present, defaulted when nothing resolved.
    pub title: String,

    /// Flat block sequence (single `children` level on list items only).
    pub blocks: Vec<Block>,

    /// Best-scoring site icon URL, if any candidate validated.
    pub site_icon: Option<String>,

    /// Featured/cover image URL, if one resolved.
    pub cover_image: Option<String>,

    /// Non-fatal issues encountered during extraction.
    pub warnings: Vec<String>,

    /// Diagnostics, present only when requested via options.
    pub debug: Option<DebugInfo>,
}
