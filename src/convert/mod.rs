//! Conversion of extracted content into typed blocks.
//!
//! Two converters share the block vocabulary: [`tree`] walks sanitized HTML
//! top to bottom, [`lines`] runs a per-line state machine over markdown-like
//! text. Both resolve images through the same resolver and dedup set.

pub mod lines;
pub mod tree;

pub use lines::convert_lines;
pub use tree::TreeConverter;
