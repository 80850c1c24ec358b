//! Pre-extraction expansion of collapsed page regions.
//!
//! Pages frequently hide body content behind disclosure widgets or
//! class-toggled collapses. An [`Expander`] mutates the parsed document so
//! that hidden content is visible to every downstream pass.

use dom_query::{Document, Selection};
use log::debug;

use crate::dom;

/// Capability seam for revealing collapsed content before extraction.
pub trait Expander {
    /// Expand collapsed regions in place, returning how many were touched.
    fn expand(&self, doc: &Document) -> usize;
}

/// No-op expander for callers that want the document untouched.
#[derive(Debug, Default)]
pub struct NoopExpander;

impl Expander for NoopExpander {
    fn expand(&self, _doc: &Document) -> usize {
        0
    }
}

/// Default expander covering the common collapse idioms.
#[derive(Debug, Default)]
pub struct DomExpander;

/// Class fragments that mark a collapsed container.
const COLLAPSED_CLASS_MARKERS: &[&str] = &["collapsed", "truncated", "read-more-hidden"];

impl Expander for DomExpander {
    fn expand(&self, doc: &Document) -> usize {
        let mut touched = 0;

        for node in doc.select("details:not([open])").nodes() {
            dom::set_attribute(&Selection::from(*node), "open", "");
            touched += 1;
        }

        for node in doc.select("[hidden]").nodes() {
            dom::remove_attribute(&Selection::from(*node), "hidden");
            touched += 1;
        }

        for node in doc.select("[aria-expanded=\"false\"]").nodes() {
            dom::set_attribute(&Selection::from(*node), "aria-expanded", "true");
            touched += 1;
        }

        for marker in COLLAPSED_CLASS_MARKERS {
            for node in doc.select(&format!("[class*=\"{marker}\"]")).nodes() {
                let selection = Selection::from(*node);
                let class = dom::class_name(&selection);
                let kept: Vec<&str> = class
                    .split_whitespace()
                    .filter(|c| !c.contains(marker))
                    .collect();
                if kept.len() != class.split_whitespace().count() {
                    dom::set_attribute(&selection, "class", &kept.join(" "));
                    touched += 1;
                }
            }
        }

        if touched > 0 {
            debug!("expanded {touched} collapsed regions");
        }
        touched
    }
}
