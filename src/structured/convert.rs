//! Conversion of located article objects into blocks.
//!
//! Article nodes come in several field shapes, tried in priority order: a
//! site-specific atom list, raw body/markup HTML strings, and a generic
//! `blocks` array with per-type handlers. Text lifted out of embedded HTML
//! fragments is always script/style-stripped first.

use serde_json::Value;

use crate::blocks::Block;
use crate::dom;
use crate::error::Result;
use crate::images::ImageResolver;
use crate::result::{RawArticle, RawExtraction};

use super::locate;

/// Convert an article node into a raw extraction.
///
/// Atom lists convert directly to blocks; body/markup strings become a
/// markdown-like extraction for the line converter; generic `blocks` arrays
/// are dispatched per entry. A present teaser is unshifted as a summary
/// quote before the main conversion.
pub fn convert_article(article: &Value, resolver: &ImageResolver) -> Result<RawExtraction> {
    let raw_article = pass_through_article(article);

    // (1) Site-specific atom list skips every other shape.
    if let Some(Value::Array(atoms)) = article.get("storyAtoms") {
        let blocks = convert_atoms(atoms, resolver)?;
        return Ok(RawExtraction::structured(blocks, raw_article));
    }

    let mut leading = Vec::new();
    if let Some(teaser) = teaser_text(article) {
        if let Some(block) = Block::quote(&teaser) {
            leading.push(block);
        }
    }

    // (2) Raw HTML strings normalize into line-oriented text.
    for field in ["body", "markup"] {
        if let Some(Value::String(html)) = article.get(field) {
            if html.trim().is_empty() {
                continue;
            }
            let mut extraction =
                RawExtraction::markdown_like(normalize_embedded_html(html), raw_article);
            extraction.blocks = leading;
            return Ok(extraction);
        }
    }

    // (3) Generic blocks array, one handler per block-type tag.
    if let Some(Value::Array(entries)) = article.get("blocks") {
        let mut blocks = leading;
        for entry in entries {
            blocks.extend(convert_block_entry(entry, resolver)?);
        }
        return Ok(RawExtraction::structured(blocks, raw_article));
    }

    // Long plain-text content is still usable via the line converter.
    if let Some(Value::String(content)) = article.get("content") {
        let mut extraction =
            RawExtraction::markdown_like(content.trim().to_string(), raw_article);
        extraction.blocks = leading;
        return Ok(extraction);
    }

    Ok(RawExtraction::structured(leading, raw_article))
}

/// Upstream fields forwarded to metadata resolution.
fn pass_through_article(article: &Value) -> RawArticle {
    RawArticle {
        title: locate::article_title(article),
        byline: author_name(article),
        excerpt: first_string(article, &["description", "excerpt", "standfirst"]),
    }
}

fn author_name(article: &Value) -> Option<String> {
    match article.get("author") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Object(map)) => match map.get("name") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        },
        _ => first_string(article, &["byline"]),
    }
}

fn first_string(node: &Value, fields: &[&str]) -> Option<String> {
    for field in fields {
        if let Some(Value::String(s)) = node.get(*field) {
            if !s.trim().is_empty() {
                return Some(s.trim().to_string());
            }
        }
    }
    None
}

fn teaser_text(article: &Value) -> Option<String> {
    match article.get("teaser") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(obj @ Value::Object(_)) => first_string(obj, &["text", "content"]),
        _ => None,
    }
}

// === Atom list conversion ===

/// Tag-name mapping for text atoms.
fn atom_text_block(tag: &str, text: &str) -> Option<Block> {
    match tag {
        "h1" => Block::heading(1, text),
        "h2" => Block::heading(2, text),
        "h3" => Block::heading(3, text),
        "blockquote" => Block::quote(text),
        _ => Block::paragraph(text),
    }
}

/// Nested size-variant locations probed for an image atom's URL.
const ATOM_IMAGE_PATHS: &[&[&str]] = &[
    &["image", "large", "url"],
    &["image", "landscape", "url"],
    &["image", "url"],
    &["sizes", "large", "url"],
    &["url"],
    &["src"],
];

fn convert_atoms(atoms: &[Value], resolver: &ImageResolver) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();

    for atom in atoms {
        match atom.get("type").and_then(Value::as_str) {
            Some("text") => {
                let tag = atom
                    .get("tag")
                    .or_else(|| atom.get("tagName"))
                    .and_then(Value::as_str)
                    .unwrap_or("p");
                let text = entry_text(atom);
                if let Some(block) = atom_text_block(tag, &text) {
                    blocks.push(block);
                }
            }
            Some("image") => {
                if let Some(raw) = atom_image_url(atom) {
                    if let Some(url) = resolver.clean_image_url(&raw)? {
                        blocks.push(Block::Image { url });
                    }
                }
            }
            _ => {}
        }
    }

    Ok(blocks)
}

fn atom_image_url(atom: &Value) -> Option<String> {
    for path in ATOM_IMAGE_PATHS {
        let mut current = atom;
        let mut matched = true;
        for segment in *path {
            match current.get(segment) {
                Some(next) => current = next,
                None => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            if let Value::String(s) = current {
                if !s.trim().is_empty() {
                    return Some(s.clone());
                }
            }
        }
    }

    // Variant objects without a known name: scan the sizes map for any URL.
    if let Some(Value::Object(sizes)) = atom.get("image").and_then(|i| i.get("sizes")) {
        for variant in sizes.values() {
            if let Some(Value::String(url)) = variant.get("url") {
                if !url.trim().is_empty() {
                    return Some(url.clone());
                }
            }
        }
    }

    None
}

// === Generic blocks array conversion ===

fn convert_block_entry(entry: &Value, resolver: &ImageResolver) -> Result<Vec<Block>> {
    let Some(kind) = entry.get("type").and_then(Value::as_str) else {
        // Untyped entries with text still become a paragraph.
        return Ok(Block::paragraph(&entry_text(entry)).into_iter().collect());
    };

    let blocks = match kind {
        "text" if entry.get("tokens").is_some() => token_group_paragraphs(entry),
        "summary" => summary_quote(entry).into_iter().collect(),
        "list" => list_items(entry),
        "image" => {
            let mut out = Vec::new();
            if let Some(raw) = first_string(entry, &["url", "src", "image"]) {
                if let Some(url) = resolver.clean_image_url(&raw)? {
                    out.push(Block::Image { url });
                }
            }
            out
        }
        "heading" | "header" => {
            let level = entry
                .get("level")
                .and_then(Value::as_u64)
                .map_or(2, |l| l.min(6) as u8);
            Block::heading(level, &entry_text(entry)).into_iter().collect()
        }
        "quote" | "pullquote" => Block::quote(&entry_text(entry)).into_iter().collect(),
        _ => Block::paragraph(&entry_text(entry)).into_iter().collect(),
    };

    Ok(blocks)
}

/// Concatenate token `content` fields per group, one paragraph per group.
fn token_group_paragraphs(entry: &Value) -> Vec<Block> {
    let Some(Value::Array(groups)) = entry.get("tokens") else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    for group in groups {
        let Value::Array(tokens) = group else { continue };
        let mut text = String::new();
        for token in tokens {
            if let Some(Value::String(content)) = token.get("content") {
                text.push_str(content);
            }
        }
        if let Some(block) = Block::paragraph(&dom::fragment_text(&text)) {
            blocks.push(block);
        }
    }
    blocks
}

/// Join a summary array into one quote block.
fn summary_quote(entry: &Value) -> Option<Block> {
    let Some(Value::Array(lines)) = entry.get("summary").or_else(|| entry.get("items")) else {
        return None;
    };
    let joined: Vec<String> = lines
        .iter()
        .filter_map(|line| match line {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            other => {
                let text = entry_text(other);
                (!text.is_empty()).then_some(text)
            }
        })
        .collect();
    if joined.is_empty() {
        return None;
    }
    Block::quote(&joined.join(" "))
}

/// One list-item block per entry item; ordered flag picks the variant.
fn list_items(entry: &Value) -> Vec<Block> {
    let ordered = entry.get("ordered").and_then(Value::as_bool).unwrap_or(false)
        || matches!(
            entry.get("list_type").or_else(|| entry.get("style")).and_then(Value::as_str),
            Some("ordered" | "numbered")
        );

    let Some(Value::Array(items)) = entry.get("items") else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let text = match item {
                Value::String(s) => dom::fragment_text(s),
                other => entry_text(other),
            };
            if ordered {
                Block::numbered_item(&text)
            } else {
                Block::bulleted_item(&text)
            }
        })
        .collect()
}

/// Plain text of one entry, preferring explicit text fields and stripping
/// embedded markup.
fn entry_text(entry: &Value) -> String {
    if let Some(Value::String(s)) = entry.get("text") {
        return dom::fragment_text(s);
    }
    if let Some(Value::String(s)) = entry.get("content") {
        return dom::fragment_text(s);
    }
    if let Some(Value::String(s)) = entry.get("html") {
        return dom::fragment_text(s);
    }
    if let Value::String(s) = entry {
        return dom::fragment_text(s);
    }
    String::new()
}

/// Convert tag-based paragraph and line breaks into text markers.
///
/// `</p>` boundaries become blank lines, `<br>` becomes a line break, then
/// the remainder is script/style-stripped down to plain text for the line
/// converter.
#[must_use]
pub fn normalize_embedded_html(html: &str) -> String {
    let mut text = html.to_string();
    for tag in ["</p>", "</P>", "</div>", "</h1>", "</h2>", "</h3>", "</li>"] {
        text = text.replace(tag, &format!("{tag}\n\n"));
    }
    text = text
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n");

    let stripped = dom::fragment_text(&text);

    // Collapse runs of 3+ newlines left over from nested containers
    let mut out = String::with_capacity(stripped.len());
    let mut blank_run = 0usize;
    for line in stripped.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == 1 {
                out.push('\n');
            }
        } else {
            blank_run = 0;
            out.push_str(line.trim());
            out.push('\n');
        }
    }
    out.trim().to_string()
}
