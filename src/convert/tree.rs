//! Tree-based block conversion.
//!
//! Walks a markup tree with a closed node-kind dispatch. Recognized nodes
//! emit blocks; unrecognized nodes are flattened by visiting their element
//! children. The paragraph handler carries the bullet-line heuristic that
//! rescues lists flattened into `<p>` text by sloppy markup.

use crate::blocks::Block;
use crate::dom::{self, Selection};
use crate::error::Result;
use crate::images::ImageResolver;
use crate::lru::LruSet;
use crate::options::Heuristics;
use crate::patterns;

/// Closed set of node kinds the converter handles directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Heading(u8),
    Paragraph,
    UnorderedList,
    OrderedList,
    Blockquote,
    Image,
    Other,
}

fn classify(tag: &str) -> NodeKind {
    match tag {
        "h1" => NodeKind::Heading(1),
        "h2" => NodeKind::Heading(2),
        "h3" => NodeKind::Heading(3),
        "p" => NodeKind::Paragraph,
        "ul" => NodeKind::UnorderedList,
        "ol" => NodeKind::OrderedList,
        "blockquote" => NodeKind::Blockquote,
        "img" => NodeKind::Image,
        _ => NodeKind::Other,
    }
}

/// Converter state for one markup tree walk.
pub struct TreeConverter<'a> {
    resolver: &'a ImageResolver,
    heuristics: &'a Heuristics,
    seen_images: &'a mut LruSet,
}

impl<'a> TreeConverter<'a> {
    pub fn new(
        resolver: &'a ImageResolver,
        heuristics: &'a Heuristics,
        seen_images: &'a mut LruSet,
    ) -> Self {
        Self {
            resolver,
            heuristics,
            seen_images,
        }
    }

    /// Convert an HTML fragment into blocks.
    pub fn convert(&mut self, html: &str) -> Result<Vec<Block>> {
        let doc = dom::parse(&format!("<div id=\"bc-tree-root\">{html}</div>"));
        let root = doc.select("#bc-tree-root");
        let mut blocks = Vec::new();
        self.visit_children(&root, &mut blocks)?;
        Ok(blocks)
    }

    fn visit_children(&mut self, sel: &Selection, blocks: &mut Vec<Block>) -> Result<()> {
        let children = dom::children(sel).nodes().to_vec();
        for node in children {
            let child = Selection::from(node);
            self.visit(&child, blocks)?;
        }
        Ok(())
    }

    fn visit(&mut self, sel: &Selection, blocks: &mut Vec<Block>) -> Result<()> {
        let Some(tag) = dom::tag_name(sel) else {
            return Ok(());
        };

        match classify(&tag) {
            NodeKind::Heading(level) => {
                // Empty headings are decoration, not content
                if let Some(block) = Block::heading(level, dom::text_content(sel).trim()) {
                    blocks.push(block);
                }
            }
            NodeKind::Paragraph => self.paragraph(sel, blocks),
            NodeKind::UnorderedList => self.list(sel, false, blocks),
            NodeKind::OrderedList => self.list(sel, true, blocks),
            NodeKind::Blockquote => {
                if let Some(block) = Block::quote(dom::text_content(sel).trim()) {
                    blocks.push(block);
                }
            }
            NodeKind::Image => self.image(sel, blocks)?,
            NodeKind::Other => self.visit_children(sel, blocks)?,
        }
        Ok(())
    }

    /// Paragraph handler with the pseudo-list detection heuristic.
    ///
    /// Lines split on explicit breaks or literal newlines; when at least
    /// the configured share of them carries a bullet/number prefix (or a
    /// single line wholly matches), the paragraph is re-emitted as one
    /// bulleted item per cleaned line.
    fn paragraph(&mut self, sel: &Selection, blocks: &mut Vec<Block>) {
        let had_break_marker = dom::inner_html(sel).contains("<br");
        let text = dom::text_with_breaks(sel);
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        if lines.is_empty() {
            return;
        }

        let matching = lines
            .iter()
            .filter(|l| patterns::BULLET_LINE.is_match(l) || patterns::NUMBERED_LINE.is_match(l))
            .count();

        let is_list = if lines.len() == 1 {
            matching == 1
        } else {
            (lines.len() >= 2 || had_break_marker)
                && (matching as f64) / (lines.len() as f64) >= self.heuristics.list_line_ratio
        };

        if is_list {
            for line in lines {
                let cleaned = patterns::LIST_PREFIX.replace(line, "");
                if let Some(block) = Block::bulleted_item(cleaned.trim()) {
                    blocks.push(block);
                }
            }
        } else if let Some(block) = Block::paragraph(text.trim()) {
            blocks.push(block);
        }
    }

    /// One list-item block per `<li>`, nested lists becoming one level of
    /// children.
    fn list(&mut self, sel: &Selection, ordered: bool, blocks: &mut Vec<Block>) {
        let items = dom::children(sel).nodes().to_vec();
        for node in items {
            let li = Selection::from(node);
            if dom::tag_name(&li).as_deref() != Some("li") {
                continue;
            }

            let own_text = item_own_text(&li);
            let mut children = Vec::new();
            for nested in li.select("li").nodes() {
                let nested_sel = Selection::from(*nested);
                if let Some(block) = Block::bulleted_item(dom::text_content(&nested_sel).trim()) {
                    children.push(block);
                }
            }

            let spans = crate::blocks::chunk_text(&own_text);
            if spans.is_empty() {
                continue;
            }
            blocks.push(if ordered {
                Block::NumberedListItem {
                    rich_text: spans,
                    children,
                }
            } else {
                Block::BulletedListItem {
                    rich_text: spans,
                    children,
                }
            });
        }
    }

    /// Image handler: resolve, deduplicate by canonical URL, drop silently
    /// when no strategy yields a URL.
    fn image(&mut self, sel: &Selection, blocks: &mut Vec<Block>) -> Result<()> {
        if let Some(url) = self.resolver.resolve(sel)? {
            if self.seen_images.insert(&url) {
                blocks.push(Block::Image { url });
            }
        }
        Ok(())
    }
}

/// Text of a list item excluding any nested list subtree.
fn item_own_text(li: &Selection) -> String {
    let html = dom::outer_html(li).to_string();
    let scratch = dom::parse(&format!("<div id=\"bc-li\">{html}</div>"));
    dom::remove_all(&scratch, "#bc-li li ul, #bc-li li ol");
    scratch.select("#bc-li").text().trim().to_string()
}
