//! Article-object location inside framework payloads.
//!
//! Known dotted paths are the fast path; when none of them yields an
//! article-shaped object the payload is searched recursively, bounded by an
//! explicit depth counter and a key deny-list, scoring every visited node
//! by a weighted rubric and accepting the first node over the threshold.

use serde_json::Value;

use crate::options::Heuristics;
use crate::patterns;

/// Find the article object in a payload root.
#[must_use]
pub fn locate_article(root: &Value, heuristics: &Heuristics) -> Option<Value> {
    // Fast path: known dotted locations
    for path in patterns::ARTICLE_PATHS {
        if let Some(node) = follow_path(root, path) {
            if is_article_shaped(node) {
                log::debug!("article located at known path {path}");
                return Some(node.clone());
            }
        }
    }

    // Bounded heuristic search
    search_scored(root, heuristics, patterns::SEARCH_DENY_KEYS, 0)
}

/// Walk a dotted path through nested objects.
fn follow_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// True when the node carries any of the article marker fields.
#[must_use]
pub fn is_article_shaped(node: &Value) -> bool {
    let Value::Object(map) = node else {
        return false;
    };
    patterns::ARTICLE_MARKER_FIELDS
        .iter()
        .any(|field| map.contains_key(*field))
}

/// Depth-first scored search, depth and deny-list as hard parameters.
fn search_scored(
    node: &Value,
    heuristics: &Heuristics,
    deny_keys: &[&str],
    depth: usize,
) -> Option<Value> {
    if depth > heuristics.max_search_depth {
        return None;
    }

    if let Value::Object(map) = node {
        if score_node(node) >= heuristics.article_score_threshold {
            return Some(node.clone());
        }
        for (key, child) in map {
            if is_denied_key(key, deny_keys) {
                continue;
            }
            if let Some(found) = search_scored(child, heuristics, deny_keys, depth + 1) {
                return Some(found);
            }
        }
    } else if let Value::Array(items) = node {
        for child in items {
            if let Some(found) = search_scored(child, heuristics, deny_keys, depth + 1) {
                return Some(found);
            }
        }
    }

    None
}

/// Case-insensitive substring match against the deny-list.
fn is_denied_key(key: &str, deny_keys: &[&str]) -> bool {
    let lowered = key.to_lowercase();
    deny_keys.iter().any(|deny| lowered.contains(deny))
}

/// Weighted article-likeness rubric for one payload node.
#[must_use]
pub fn score_node(node: &Value) -> i32 {
    let Value::Object(map) = node else {
        return 0;
    };

    let mut score = 0;

    if let Some(Value::Array(blocks)) = map.get("blocks") {
        if !blocks.is_empty() {
            score += 30;
            if blocks.len() >= 5 {
                score += 5;
            }
        }
    }
    if let Some(Value::Array(atoms)) = map.get("storyAtoms") {
        if !atoms.is_empty() {
            score += 30;
        }
    }
    if let Some(Value::Array(elements)) = map.get("content_elements") {
        if !elements.is_empty() {
            score += 25;
        }
    }
    if let Some(Value::Array(rich)) = map.get("rich_text") {
        if !rich.is_empty() {
            score += 20;
        }
    }
    if let Some(Value::Array(paragraphs)) = map.get("paragraphs") {
        if !paragraphs.is_empty() {
            score += 20;
        }
    }
    if matches!(map.get("title"), Some(Value::String(s)) if !s.trim().is_empty()) {
        score += 10;
    }
    if map.get("author").is_some() || map.get("byline").is_some() {
        score += 5;
    }
    if matches!(map.get("content"), Some(Value::String(s)) if s.chars().count() >= 200) {
        score += 15;
    }
    if matches!(map.get("body"), Some(Value::String(s)) if s.chars().count() >= 200) {
        score += 15;
    }
    if matches!(map.get("markup"), Some(Value::String(s)) if !s.trim().is_empty()) {
        score += 15;
    }

    score
}

// === Freshness validation ===

/// Fields under which payloads capture the path they were rendered for.
const CAPTURED_PATH_FIELDS: &[&str] = &["path", "asPath", "pathname", "url", "canonical"];

/// Fields under which payloads carry the article title.
const TITLE_FIELDS: &[&str] = &["title", "headline"];

/// Length of the title prefix compared against the live document title.
const TITLE_PREFIX_CHARS: usize = 15;

/// Guard against stale single-page-app navigation state.
///
/// A payload whose captured path disagrees with the live location, or whose
/// title is absent from the live document title, is left over from a
/// previous client-side navigation and must not be extracted.
#[must_use]
pub fn is_fresh(article: &Value, live_path: Option<&str>, live_title: &str) -> bool {
    if let (Some(live), Some(captured)) = (live_path, captured_path(article)) {
        if normalize_path(&captured) != normalize_path(live) {
            log::debug!("stale payload: captured path {captured} != live {live}");
            return false;
        }
    }

    if let Some(title) = article_title(article) {
        if title.chars().count() > 4 {
            let prefix: String = title.chars().take(TITLE_PREFIX_CHARS).collect();
            if !live_title.contains(&prefix) {
                log::debug!("stale payload: title prefix {prefix:?} not in live title");
                return false;
            }
        }
    }

    true
}

fn captured_path(article: &Value) -> Option<String> {
    for field in CAPTURED_PATH_FIELDS {
        if let Some(Value::String(s)) = article.get(*field) {
            if !s.trim().is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

/// First present title field of the article node.
#[must_use]
pub fn article_title(article: &Value) -> Option<String> {
    for field in TITLE_FIELDS {
        if let Some(Value::String(s)) = article.get(*field) {
            if !s.trim().is_empty() {
                return Some(s.trim().to_string());
            }
        }
    }
    None
}

/// Query-stripped, percent-decoded, trailing-slash-insensitive path form.
fn normalize_path(path: &str) -> String {
    let without_query = path.split(['?', '#']).next().unwrap_or(path);
    // Absolute URLs captured in `url` fields reduce to their path component
    let without_origin = if let Some(rest) = without_query
        .strip_prefix("https://")
        .or_else(|| without_query.strip_prefix("http://"))
    {
        rest.split_once('/').map_or("/", |(_, p)| p)
    } else {
        without_query.trim_start_matches('/')
    };
    let decoded = urlencoding::decode(without_origin)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| without_origin.to_string());
    format!("/{}", decoded.trim_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_path_wins_over_search() {
        let root = json!({
            "props": {"pageProps": {"article": {"title": "T", "content": "c"}}}
        });
        let found = locate_article(&root, &Heuristics::default());
        assert!(found.is_some_and(|a| a.get("title").is_some()));
    }

    #[test]
    fn scored_search_accepts_threshold_nodes() {
        let body = "b".repeat(300);
        let root = json!({
            "misc": {"deep": {"thing": {
                "title": "Scored Article",
                "body": body,
                "paragraphs": ["one", "two"]
            }}}
        });
        let found = locate_article(&root, &Heuristics::default());
        assert!(found.is_some_and(|a| a.get("paragraphs").is_some()));
    }

    #[test]
    fn search_skips_denied_keys() {
        let body = "b".repeat(300);
        let root = json!({
            "analytics": {"title": "Not an article", "body": body, "paragraphs": ["x"]}
        });
        let found = locate_article(&root, &Heuristics::default());
        assert!(found.is_none());
    }

    #[test]
    fn search_respects_depth_cap() {
        let article = json!({"title": "Deep", "body": "b".repeat(300), "paragraphs": ["x"]});
        let mut nested = article;
        for i in 0..10 {
            let mut wrapper = serde_json::Map::new();
            wrapper.insert(format!("level{i}"), nested);
            nested = Value::Object(wrapper);
        }
        let found = locate_article(&nested, &Heuristics::default());
        assert!(found.is_none());
    }

    #[test]
    fn score_rubric_weighs_block_arrays_highest() {
        let with_blocks = json!({"blocks": [1, 2, 3, 4, 5], "title": "x"});
        let with_title_only = json!({"title": "x"});
        assert!(score_node(&with_blocks) >= 35);
        assert!(score_node(&with_title_only) < 35);
    }

    #[test]
    fn path_mismatch_marks_stale() {
        let article = json!({"title": "Current", "path": "/old-post?ref=nav"});
        assert!(!is_fresh(&article, Some("/new-post"), "Current page"));
        assert!(is_fresh(&article, Some("/old-post"), "Current page"));
    }

    #[test]
    fn path_compare_is_encoding_insensitive() {
        let article = json!({"path": "/caf%C3%A9-review"});
        assert!(is_fresh(&article, Some("/café-review"), ""));
    }

    #[test]
    fn stale_title_rejects_payload() {
        let article = json!({"title": "A previous navigation target"});
        assert!(!is_fresh(&article, None, "Completely different page"));
    }

    #[test]
    fn short_titles_skip_the_prefix_check() {
        let article = json!({"title": "Hi"});
        assert!(is_fresh(&article, None, "Unrelated"));
    }
}
