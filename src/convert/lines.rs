//! Line-oriented block conversion.
//!
//! A two-state machine over plain/markdown-like text. Outside code fences
//! every line is classified independently; there is no soft-wrap merging,
//! so each classified line terminates the previous block.

use crate::blocks::Block;
use crate::error::Result;
use crate::images::ImageResolver;
use crate::lru::LruSet;
use crate::patterns;

/// Generic label used when a fence carries no recognizable language.
const DEFAULT_LANGUAGE: &str = "plain text";

/// Language tags accepted as-is.
const KNOWN_LANGUAGES: &[&str] = &[
    "javascript", "typescript", "python", "ruby", "rust", "go", "java", "c", "cpp", "c#",
    "shell", "sql", "html", "css", "json", "yaml", "toml", "xml", "markdown", "kotlin",
    "swift", "php", "scala", "haskell", "lua", "r", "dart", "elixir",
];

/// Alias table from short/colloquial names to canonical labels.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("golang", "go"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("shell-session", "shell"),
    ("yml", "yaml"),
    ("c++", "cpp"),
    ("cs", "c#"),
    ("csharp", "c#"),
    ("md", "markdown"),
    ("kt", "kotlin"),
];

/// Normalize a fence language tag to a canonical label.
#[must_use]
pub fn normalize_language(tag: &str) -> String {
    let lowered = tag.trim().to_lowercase();
    if lowered.is_empty() {
        return DEFAULT_LANGUAGE.to_string();
    }
    if let Some((_, canonical)) = LANGUAGE_ALIASES.iter().find(|(alias, _)| *alias == lowered) {
        return (*canonical).to_string();
    }
    if KNOWN_LANGUAGES.contains(&lowered.as_str()) {
        return lowered;
    }
    DEFAULT_LANGUAGE.to_string()
}

enum State {
    Default,
    InCodeBlock {
        language: String,
        lines: Vec<String>,
    },
}

/// Convert markdown-like text into blocks.
pub fn convert_lines(
    text: &str,
    resolver: &ImageResolver,
    seen_images: &mut LruSet,
) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut state = State::Default;

    for line in text.lines() {
        match &mut state {
            State::InCodeBlock { language, lines } => {
                if patterns::CODE_FENCE.is_match(line) {
                    if let Some(block) = Block::code(&lines.join("\n"), language) {
                        blocks.push(block);
                    }
                    state = State::Default;
                } else {
                    lines.push(line.to_string());
                }
            }
            State::Default => {
                if let Some(caps) = patterns::CODE_FENCE.captures(line) {
                    state = State::InCodeBlock {
                        language: normalize_language(&caps[1]),
                        lines: Vec::new(),
                    };
                    continue;
                }
                classify_line(line, resolver, seen_images, &mut blocks)?;
            }
        }
    }

    // unclosed fence at EOF still flushes captured lines
    if let State::InCodeBlock { language, lines } = state {
        if let Some(block) = Block::code(&lines.join("\n"), &language) {
            blocks.push(block);
        }
    }

    Ok(blocks)
}

/// Classification order for one default-state line: image line, heading,
/// list, quote, thematic break, paragraph.
fn classify_line(
    line: &str,
    resolver: &ImageResolver,
    seen_images: &mut LruSet,
    blocks: &mut Vec<Block>,
) -> Result<()> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    if is_image_only_line(trimmed) {
        for caps in patterns::INLINE_IMAGE.captures_iter(trimmed) {
            if let Some(url) = resolver.clean_image_url(&caps[1])? {
                if seen_images.insert(&url) {
                    blocks.push(Block::Image { url });
                }
            }
        }
        return Ok(());
    }

    if let Some(caps) = patterns::HEADING_LINE.captures(trimmed) {
        let level = caps[1].len() as u8;
        if let Some(block) = Block::heading(level, caps[2].trim()) {
            blocks.push(block);
        }
        return Ok(());
    }

    if let Some(caps) = patterns::UNORDERED_LINE.captures(trimmed) {
        if let Some(block) = Block::bulleted_item(caps[1].trim()) {
            blocks.push(block);
        }
        return Ok(());
    }

    if let Some(caps) = patterns::ORDERED_LINE.captures(trimmed) {
        if let Some(block) = Block::numbered_item(caps[2].trim()) {
            blocks.push(block);
        }
        return Ok(());
    }

    if let Some(rest) = trimmed.strip_prefix('>') {
        if let Some(block) = Block::quote(rest.trim()) {
            blocks.push(block);
        }
        return Ok(());
    }

    if patterns::THEMATIC_BREAK.is_match(trimmed) {
        blocks.push(Block::Divider);
        return Ok(());
    }

    if let Some(block) = Block::paragraph(trimmed) {
        blocks.push(block);
    }
    Ok(())
}

/// True when the line consists only of inline image references.
fn is_image_only_line(line: &str) -> bool {
    let remainder = patterns::INLINE_IMAGE.replace_all(line, "");
    let has_image = remainder.len() != line.len();
    has_image && remainder.trim().is_empty()
}
