//! DOM Operations Adapter
//!
//! Thin wrappers over the `dom_query` crate giving the pipeline a stable,
//! named vocabulary for the handful of tree operations it performs. All
//! decision logic lives above this layer; nothing here owns policy.

// Re-export core types for internal use
pub use dom_query::{Document, Selection};

// Re-export StrTendril for zero-copy text returns
pub use tendril::StrTendril;

use crate::patterns;

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

// === Attribute Operations ===

/// Get any attribute value.
#[inline]
#[must_use]
pub fn attr(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get the class attribute, defaulting to empty.
#[inline]
#[must_use]
pub fn class_name(sel: &Selection) -> String {
    sel.attr("class").map(|s| s.to_string()).unwrap_or_default()
}

/// Set an attribute value.
#[inline]
pub fn set_attribute(sel: &Selection, name: &str, value: &str) {
    sel.set_attr(name, value);
}

/// Remove an attribute.
#[inline]
pub fn remove_attribute(sel: &Selection, name: &str) {
    sel.remove_attr(name);
}

// === Tag/Node Information ===

/// Get tag name (lowercase).
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_ascii_lowercase())
}

/// Check if the first node carries one of the given tag names.
#[must_use]
pub fn is_one_of_tags(sel: &Selection, tags: &[&str]) -> bool {
    tag_name(sel).is_some_and(|t| tags.contains(&t.as_str()))
}

// === Text Content ===

/// Get all text content of node and descendants.
///
/// Returns `StrTendril` for zero-copy passing; call `.to_string()` only when
/// owned storage is needed.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get inner HTML content.
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

/// Get outer HTML content.
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

/// Text content with `<br>` tags preserved as literal newlines.
///
/// `Selection::text()` flattens explicit line breaks, which the
/// paragraph-as-list heuristic needs to see. Re-parsing through a scratch
/// element also resolves entities.
#[must_use]
pub fn text_with_breaks(sel: &Selection) -> String {
    let html = inner_html(sel).to_string();
    let html = html
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n");
    let scratch = Document::from(format!("<div>{html}</div>"));
    scratch.select("div").text().to_string()
}

/// Text content of an HTML fragment with `script`/`style` subtrees removed.
#[must_use]
pub fn fragment_text(html: &str) -> String {
    let scratch = Document::from(format!("<div id=\"bc-root\">{html}</div>"));
    remove_all(&scratch, "script, style, noscript");
    scratch.select("#bc-root").text().trim().to_string()
}

// === Tree Navigation ===

/// Get parent element.
#[inline]
#[must_use]
pub fn parent<'a>(sel: &Selection<'a>) -> Selection<'a> {
    sel.parent()
}

/// Get direct element children.
#[inline]
#[must_use]
pub fn children<'a>(sel: &Selection<'a>) -> Selection<'a> {
    sel.children()
}

/// Get previous element sibling (skipping text nodes).
#[must_use]
pub fn previous_element_sibling<'a>(sel: &Selection<'a>) -> Option<Selection<'a>> {
    sel.nodes().first().and_then(|node| {
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.is_element() {
                return Some(Selection::from(s));
            }
            sibling = s.prev_sibling();
        }
        None
    })
}

/// Walk ancestors up to `max_levels`, applying `f` until it returns `Some`.
pub fn find_in_ancestors<T>(
    sel: &Selection,
    max_levels: usize,
    mut f: impl FnMut(&Selection) -> Option<T>,
) -> Option<T> {
    let mut current = sel.parent();
    for _ in 0..max_levels {
        if current.is_empty() {
            return None;
        }
        if let Some(found) = f(&current) {
            return Some(found);
        }
        current = current.parent();
    }
    None
}

/// True when `ancestor` contains `descendant` (strictly above it).
#[must_use]
pub fn is_ancestor_of(ancestor: &Selection, descendant: &Selection) -> bool {
    let Some(anc) = ancestor.nodes().first() else {
        return false;
    };
    let Some(node) = descendant.nodes().first() else {
        return false;
    };
    let mut parent = node.parent();
    while let Some(p) = parent {
        if p.id == anc.id {
            return true;
        }
        parent = p.parent();
    }
    false
}

// === Tree Manipulation ===

/// Remove every element matching `selector` from the document.
pub fn remove_all(doc: &Document, selector: &str) {
    let nodes = doc.select(selector).nodes().to_vec();
    for node in nodes.into_iter().rev() {
        Selection::from(node).remove();
    }
}

// === Measurements ===

/// Character count of trimmed text content.
#[must_use]
pub fn text_len(sel: &Selection) -> usize {
    text_content(sel).trim().chars().count()
}

/// Number of descendants matching a selector.
#[must_use]
pub fn count(sel: &Selection, selector: &str) -> usize {
    sel.select(selector).nodes().len()
}

/// Sum of anchor-text lengths divided by total text length.
///
/// Returns 0.0 for empty content so short selections never divide by zero.
#[must_use]
pub fn link_density(sel: &Selection) -> f64 {
    let total = text_content(sel).trim().chars().count();
    if total == 0 {
        return 0.0;
    }
    let mut anchor_chars = 0usize;
    for node in sel.select("a").nodes() {
        anchor_chars += Selection::from(*node).text().trim().chars().count();
    }
    anchor_chars as f64 / total as f64
}

/// True when class, id, or alt text of the element matches the avatar keyword set.
#[must_use]
pub fn looks_like_avatar(sel: &Selection) -> bool {
    let hay = format!(
        "{} {} {}",
        class_name(sel),
        attr(sel, "id").unwrap_or_default(),
        attr(sel, "alt").unwrap_or_default()
    );
    patterns::AVATAR_KEYWORD.is_match(&hay)
}
