//! Typed content blocks and rich text.
//!
//! The final output of the pipeline is a flat sequence of `Block` values.
//! List-item variants may carry one level of `children`; nothing nests
//! deeper. Every rich-text-bearing field obeys the downstream API caps:
//! span text <= 2000 characters, <= 100 spans per field.

use serde::{Deserialize, Serialize};

/// Maximum character count of a single rich text span.
pub const MAX_SPAN_CHARS: usize = 2000;

/// Maximum number of spans in one rich-text field.
pub const MAX_SPANS: usize = 100;

/// Formatting annotations for one rich text span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub code: bool,
}

impl Annotations {
    /// Bold-only annotation, used when deep headings degrade to paragraphs.
    #[must_use]
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }
}

/// One run of text with uniform formatting and an optional link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextSpan {
    pub text: String,
    #[serde(default)]
    pub annotations: Annotations,
    /// Absolute URL, when the span is a link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// One typed unit of output content.
///
/// The sequence is flat: apart from the single `children` level on list
/// items, blocks never contain blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        rich_text: Vec<RichTextSpan>,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        rich_text: Vec<RichTextSpan>,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        rich_text: Vec<RichTextSpan>,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        rich_text: Vec<RichTextSpan>,
    },
    BulletedListItem {
        rich_text: Vec<RichTextSpan>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Block>,
    },
    NumberedListItem {
        rich_text: Vec<RichTextSpan>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Block>,
    },
    Quote {
        rich_text: Vec<RichTextSpan>,
    },
    Image {
        /// Canonical, validated absolute http(s) URL.
        url: String,
    },
    Code {
        rich_text: Vec<RichTextSpan>,
        language: String,
    },
    Divider,
}

impl Block {
    /// Plain paragraph from text; returns `None` for empty input.
    #[must_use]
    pub fn paragraph(text: &str) -> Option<Self> {
        let spans = chunk_text(text);
        if spans.is_empty() {
            return None;
        }
        Some(Self::Paragraph { rich_text: spans })
    }

    /// Heading at levels 1-3; deeper levels degrade to a bold paragraph.
    #[must_use]
    pub fn heading(level: u8, text: &str) -> Option<Self> {
        let spans = chunk_text(text);
        if spans.is_empty() {
            return None;
        }
        Some(match level {
            1 => Self::Heading1 { rich_text: spans },
            2 => Self::Heading2 { rich_text: spans },
            3 => Self::Heading3 { rich_text: spans },
            _ => {
                let bold = spans
                    .into_iter()
                    .map(|mut s| {
                        s.annotations = Annotations::bold();
                        s
                    })
                    .collect();
                Self::Paragraph { rich_text: bold }
            }
        })
    }

    /// Quote block; returns `None` for empty input.
    #[must_use]
    pub fn quote(text: &str) -> Option<Self> {
        let spans = chunk_text(text);
        if spans.is_empty() {
            return None;
        }
        Some(Self::Quote { rich_text: spans })
    }

    /// Bulleted list item without children.
    #[must_use]
    pub fn bulleted_item(text: &str) -> Option<Self> {
        let spans = chunk_text(text);
        if spans.is_empty() {
            return None;
        }
        Some(Self::BulletedListItem {
            rich_text: spans,
            children: Vec::new(),
        })
    }

    /// Numbered list item without children.
    #[must_use]
    pub fn numbered_item(text: &str) -> Option<Self> {
        let spans = chunk_text(text);
        if spans.is_empty() {
            return None;
        }
        Some(Self::NumberedListItem {
            rich_text: spans,
            children: Vec::new(),
        })
    }

    /// Code block with a normalized language label.
    #[must_use]
    pub fn code(text: &str, language: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Self::Code {
            rich_text: chunk_text(text),
            language: language.to_string(),
        })
    }

    /// The URL carried by an image block, if this is one.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Image { url } => Some(url),
            _ => None,
        }
    }

    /// Concatenated plain text of the block's rich text field.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph { rich_text }
            | Self::Heading1 { rich_text }
            | Self::Heading2 { rich_text }
            | Self::Heading3 { rich_text }
            | Self::Quote { rich_text }
            | Self::Code { rich_text, .. }
            | Self::BulletedListItem { rich_text, .. }
            | Self::NumberedListItem { rich_text, .. } => {
                rich_text.iter().map(|s| s.text.as_str()).collect()
            }
            Self::Image { .. } | Self::Divider => String::new(),
        }
    }
}

/// Split text into plain spans obeying the span caps.
///
/// Splitting happens at character boundaries, never inside a code point.
/// Input longer than `MAX_SPAN_CHARS * MAX_SPANS` is truncated at the span
/// cap rather than producing an oversized field.
#[must_use]
pub fn chunk_text(text: &str) -> Vec<RichTextSpan> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut current = String::with_capacity(MAX_SPAN_CHARS.min(trimmed.len()));
    let mut count = 0usize;

    for ch in trimmed.chars() {
        current.push(ch);
        count += 1;
        if count == MAX_SPAN_CHARS {
            spans.push(RichTextSpan {
                text: std::mem::take(&mut current),
                ..RichTextSpan::default()
            });
            count = 0;
            if spans.len() == MAX_SPANS {
                return spans;
            }
        }
    }

    if !current.is_empty() {
        spans.push(RichTextSpan {
            text: current,
            ..RichTextSpan::default()
        });
    }

    spans
}
