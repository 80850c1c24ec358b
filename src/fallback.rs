//! Fallback extraction chain.
//!
//! Runs when readability output fails the quality gate or the algorithm
//! throws. Each step only runs if the previous produced nothing, and every
//! step resolves to "no result" on failure rather than raising:
//!
//! 1. CMS-pattern containers (composite hero shape first, then ordered
//!    selector lists).
//! 2. Generic largest-content-block scoring over `article/section/main/div`
//!    candidates, with a half-threshold emergency retry.
//! 3. Largest-list recovery, covering true lists and pseudo-list markup.

use crate::dom::{self, Document, Selection};
use crate::options::Heuristics;
use crate::patterns;
use crate::result::{RawArticle, RawExtraction};

/// Run the fallback chain, returning the first step's result.
#[must_use]
pub fn extract_with_fallbacks(doc: &Document, heuristics: &Heuristics) -> Option<RawExtraction> {
    if let Some(extraction) = cms_pattern_fallback(doc, heuristics) {
        log::debug!("fallback chain: cms-pattern container matched");
        return Some(extraction);
    }
    if let Some(extraction) = largest_block_fallback(doc, heuristics) {
        log::debug!("fallback chain: largest content block matched");
        return Some(extraction);
    }
    if let Some(extraction) = largest_list_fallback(doc, heuristics) {
        log::debug!("fallback chain: largest list matched");
        return Some(extraction);
    }
    None
}

/// Step 1: known CMS content containers.
///
/// The composite two-field shape (hero image + body) is checked before the
/// ordered selector lists so platforms that split the hero out of the body
/// still get their cover carried along.
#[must_use]
pub fn cms_pattern_fallback(doc: &Document, heuristics: &Heuristics) -> Option<RawExtraction> {
    let (image_sel, body_sel) = patterns::CMS_COMPOSITE_SHAPE;
    let body = doc.select(body_sel);
    if !body.is_empty() && dom::text_len(&body) >= heuristics.min_content_length {
        let image = doc.select(image_sel);
        let mut content = String::new();
        if !image.is_empty() {
            content.push_str(&dom::outer_html(&image));
        }
        content.push_str(&dom::outer_html(&body));
        return Some(RawExtraction::markup(content, RawArticle::default()));
    }

    for selector in patterns::CMS_CONTENT_SELECTORS {
        if let Some(extraction) = accept_container(doc, selector, heuristics) {
            return Some(extraction);
        }
    }
    for selector in patterns::GENERIC_CONTENT_SELECTORS {
        if let Some(extraction) = accept_container(doc, selector, heuristics) {
            return Some(extraction);
        }
    }
    None
}

fn accept_container(
    doc: &Document,
    selector: &str,
    heuristics: &Heuristics,
) -> Option<RawExtraction> {
    let sel = doc.select(selector);
    if sel.is_empty() {
        return None;
    }
    for node in sel.nodes() {
        let candidate = Selection::from(*node);
        if dom::text_len(&candidate) >= heuristics.min_content_length {
            return Some(RawExtraction::markup(
                dom::outer_html(&candidate).to_string(),
                RawArticle::default(),
            ));
        }
    }
    None
}

/// Step 2: biggest content block by weighted structural score.
///
/// score = text length + paragraph weight x paragraphs + image weight x
/// images - link penalty x links, all from `Heuristics`. Ancestors of the
/// current best are skipped so an outer wrapper never displaces the tighter
/// block inside it. If nothing clears the threshold, one emergency retry
/// runs at half the threshold.
#[must_use]
pub fn largest_block_fallback(doc: &Document, heuristics: &Heuristics) -> Option<RawExtraction> {
    select_largest_block(doc, heuristics, heuristics.min_content_length)
        .or_else(|| select_largest_block(doc, heuristics, heuristics.min_content_length / 2))
        .map(|html| RawExtraction::markup(html, RawArticle::default()))
}

fn select_largest_block(
    doc: &Document,
    heuristics: &Heuristics,
    min_len: usize,
) -> Option<String> {
    let candidates = doc.select("article, section, main, div");
    let mut best: Option<(i64, Selection)> = None;

    for node in candidates.nodes() {
        let candidate = Selection::from(*node);
        let text_len = dom::text_len(&candidate);
        if text_len < min_len {
            continue;
        }
        // An ancestor of the current best can only add chrome around it.
        if let Some((_, best_sel)) = &best {
            if dom::is_ancestor_of(&candidate, best_sel) {
                continue;
            }
        }

        let paragraphs = dom::count(&candidate, "p");
        let images = dom::count(&candidate, "img");
        let links = dom::count(&candidate, "a");
        let score = text_len as i64
            + (heuristics.block_paragraph_weight * paragraphs) as i64
            + (heuristics.block_image_weight * images) as i64
            - (heuristics.block_link_penalty * links) as i64;

        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((score, candidate));
        }
    }

    best.map(|(_, sel)| dom::outer_html(&sel).to_string())
}

/// Step 3: largest-list recovery.
///
/// Considers true `<ul>/<ol>` elements and pseudo-list containers whose
/// lines are mostly bullet/numbered-prefixed. On success the immediately
/// preceding heading sibling, if any, is prepended.
#[must_use]
pub fn largest_list_fallback(doc: &Document, heuristics: &Heuristics) -> Option<RawExtraction> {
    let mut best: Option<(usize, String)> = None;

    for node in doc.select("ul, ol").nodes() {
        let list = Selection::from(*node);
        let items = dom::count(&list, "li");
        if items < heuristics.min_list_items {
            continue;
        }
        let score = score_list(heuristics, items, dom::text_len(&list));
        let html = with_preceding_heading(&list);
        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((score, html));
        }
    }

    for node in doc.select("div, section, article").nodes() {
        let container = Selection::from(*node);
        if let Some(items) = pseudo_list_items(&container, heuristics) {
            let score = score_list(heuristics, items, dom::text_len(&container));
            let html = with_preceding_heading(&container);
            if best.as_ref().is_none_or(|(s, _)| score > *s) {
                best = Some((score, html));
            }
        }
    }

    best.map(|(_, html)| RawExtraction::markup(html, RawArticle::default()))
}

fn score_list(heuristics: &Heuristics, items: usize, text_len: usize) -> usize {
    heuristics.list_item_weight * items + (text_len / 10).min(heuristics.list_text_score_cap)
}

/// Effective item count of a pseudo-list container, or `None` when its
/// lines are not list-like enough.
fn pseudo_list_items(container: &Selection, heuristics: &Heuristics) -> Option<usize> {
    let text = dom::text_with_breaks(container);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    let matching = lines
        .iter()
        .filter(|l| patterns::BULLET_LINE.is_match(l) || patterns::NUMBERED_LINE.is_match(l))
        .count();

    if matching < heuristics.min_list_items {
        return None;
    }
    if (matching as f64) / (lines.len() as f64) < heuristics.pseudo_list_line_ratio {
        return None;
    }
    Some(matching)
}

/// Outer HTML of a list plus its immediately preceding `h1`-`h3` sibling.
fn with_preceding_heading(list: &Selection) -> String {
    let mut html = String::new();
    if let Some(prev) = dom::previous_element_sibling(list) {
        if dom::is_one_of_tags(&prev, &["h1", "h2", "h3"]) {
            html.push_str(&dom::outer_html(&prev));
        }
    }
    html.push_str(&dom::outer_html(list));
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristics() -> Heuristics {
        Heuristics::default()
    }

    #[test]
    fn cms_container_with_enough_text_wins() {
        let para = "Meaningful sentence content here. ".repeat(20);
        let html = format!(
            r#"<body><div class="entry-content"><p>CMS_MARKER {para}</p></div></body>"#
        );
        let doc = dom::parse(&html);
        let extraction = cms_pattern_fallback(&doc, &heuristics());
        assert!(extraction.is_some_and(|e| e.content.contains("CMS_MARKER")));
    }

    #[test]
    fn composite_hero_shape_carries_image_and_body() {
        let para = "Meaningful sentence content here. ".repeat(20);
        let html = format!(
            r#"<body>
              <figure class="post-full-image"><img src="/media/hero.jpg"></figure>
              <section class="post-full-content"><p>{para}</p></section>
            </body>"#
        );
        let doc = dom::parse(&html);
        let extraction = cms_pattern_fallback(&doc, &heuristics());
        let Some(extraction) = extraction else {
            panic!("composite shape should match");
        };
        assert!(extraction.content.contains("hero.jpg"));
        assert!(extraction.content.contains("Meaningful"));
    }

    #[test]
    fn short_cms_containers_fall_through() {
        let doc = dom::parse(r#"<body><div class="entry-content"><p>too short</p></div></body>"#);
        assert!(cms_pattern_fallback(&doc, &heuristics()).is_none());
    }

    #[test]
    fn largest_block_prefers_inner_content_over_wrapper() {
        let para = "Substantive words in a sentence. ".repeat(15);
        let html = format!(
            r#"<body><div id="wrapper">
                 <div id="inner"><p>INNER {para}</p><p>{para}</p></div>
                 <div id="linkfarm">{}</div>
               </div></body>"#,
            (0..30)
                .map(|i| format!("<a href='#'>link {i} text</a>"))
                .collect::<String>()
        );
        let doc = dom::parse(&html);
        let extraction = largest_block_fallback(&doc, &heuristics());
        let Some(extraction) = extraction else {
            panic!("expected a block");
        };
        assert!(extraction.content.contains("INNER"));
    }

    #[test]
    fn emergency_retry_halves_the_threshold() {
        // 150 chars: under 250 but over 125
        let para = "z".repeat(150);
        let html = format!("<body><div><p>{para}</p></div></body>");
        let doc = dom::parse(&html);
        let extraction = largest_block_fallback(&doc, &heuristics());
        assert!(extraction.is_some());
    }

    #[test]
    fn largest_list_requires_minimum_items() {
        let small = "<body><ul><li>a</li><li>b</li><li>c</li></ul></body>";
        let doc = dom::parse(small);
        assert!(largest_list_fallback(&doc, &heuristics()).is_none());

        let big = "<body><h2>Top Picks</h2><ul><li>alpha</li><li>beta</li><li>gamma</li><li>delta</li><li>epsilon</li></ul></body>";
        let doc = dom::parse(big);
        let extraction = largest_list_fallback(&doc, &heuristics());
        let Some(extraction) = extraction else {
            panic!("expected list extraction");
        };
        assert!(extraction.content.contains("alpha"));
        assert!(extraction.content.contains("Top Picks"));
    }

    #[test]
    fn pseudo_list_container_is_recognized() {
        let html = r#"<body><div id="fake-list">
            • first entry<br>
            • second entry<br>
            • third entry<br>
            • fourth entry<br>
        </div></body>"#;
        let doc = dom::parse(html);
        let extraction = largest_list_fallback(&doc, &heuristics());
        assert!(extraction.is_some_and(|e| e.content.contains("fake-list")));
    }

    #[test]
    fn block_weights_are_read_from_heuristics() {
        // First div: 300 chars in one paragraph. Second: 260 chars over
        // four. The paragraph weight decides which wins.
        let html = format!(
            "<body><div id=\"few\"><p>{}</p></div>\
             <div id=\"many\"><p>{p}</p><p>{p}</p><p>{p}</p><p>{p}</p></div></body>",
            "a".repeat(300),
            p = "b".repeat(65)
        );
        let doc = dom::parse(&html);

        let extraction = largest_block_fallback(&doc, &heuristics());
        assert!(extraction.is_some_and(|e| e.content.contains("id=\"many\"")));

        let flat = Heuristics {
            block_paragraph_weight: 0,
            ..heuristics()
        };
        let extraction = largest_block_fallback(&doc, &flat);
        assert!(extraction.is_some_and(|e| e.content.contains("id=\"few\"")));
    }

    #[test]
    fn list_weights_are_read_from_heuristics() {
        // A wordy four-item list against a terse six-item one. The text
        // score cap decides which wins.
        let wordy_item = format!("<li>{}</li>", "long entry text ".repeat(70));
        let html = format!(
            "<body><ul id=\"wordy\">{}</ul>\
             <ul id=\"terse\"><li>a1</li><li>b2</li><li>c3</li>\
             <li>d4</li><li>e5</li><li>f6</li></ul></body>",
            wordy_item.repeat(4)
        );
        let doc = dom::parse(&html);

        let extraction = largest_list_fallback(&doc, &heuristics());
        assert!(extraction.is_some_and(|e| e.content.contains("id=\"wordy\"")));

        let capped = Heuristics {
            list_text_score_cap: 0,
            ..heuristics()
        };
        let extraction = largest_list_fallback(&doc, &capped);
        assert!(extraction.is_some_and(|e| e.content.contains("id=\"terse\"")));
    }

    #[test]
    fn chain_returns_none_on_empty_document() {
        let doc = dom::parse("<body><p>tiny</p></body>");
        assert!(extract_with_fallbacks(&doc, &heuristics()).is_none());
    }
}
