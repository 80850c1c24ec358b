//! Compiled regex patterns and CSS selector sets for the pipeline.
//!
//! All patterns are compiled once at startup using `LazyLock`. Selector
//! lists are ordered: earlier entries win, so keep priority order intact
//! when editing.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Complexity analysis selector sets
// =============================================================================

/// Elements counted as advertisement containers.
pub const AD_SELECTOR: &str = "[class*=\"advert\"], [id*=\"advert\"], [class*=\"sponsor\"], \
     [id*=\"sponsor\"], [class*=\"ad-slot\"], [class*=\"ad-container\"], [id*=\"google_ads\"], \
     ins.adsbygoogle, [data-ad-client], [class*=\"promo-box\"], [class*=\"taboola\"], \
     [class*=\"outbrain\"]";

/// Elements counted as navigation-like containers.
pub const NAV_SELECTOR: &str =
    "nav, [role=\"navigation\"], [class*=\"navbar\"], [class*=\"breadcrumb\"], \
     [class*=\"menu-\"], [id*=\"sidebar\"], [class*=\"sidebar\"], header, footer";

/// Elements counted as content containers.
pub const CONTENT_CONTAINER_SELECTOR: &str =
    "article, main, [role=\"main\"], [class*=\"article\"], [class*=\"post-content\"], \
     [class*=\"entry-content\"], [itemprop=\"articleBody\"]";

/// Code-bearing elements.
pub const CODE_SELECTOR: &str = "pre, code, [class*=\"highlight\"], [class*=\"codeblock\"]";

/// Containers that only appear on markdown-rendered/technical-doc pages.
///
/// A match on any of these short-circuits strategy selection.
pub const MARKDOWN_CONTAINER_SELECTOR: &str =
    ".markdown-body, .markdown-section, [class*=\"prose\"], .rst-content, .rendered-markdown, \
     article.md-content, .docMainContainer, .theme-doc-markdown";

/// Video/embed elements counted toward rich-media detection.
pub const VIDEO_SELECTOR: &str =
    "video, iframe[src*=\"youtube\"], iframe[src*=\"vimeo\"], iframe[src*=\"player\"], \
     [class*=\"video-player\"]";

/// Fixed technical-term vocabulary scanned against visible text.
pub const TECHNICAL_TERMS: &[&str] = &[
    "function", "variable", "const ", "async", "await", "runtime", "compiler", "api",
    "endpoint", "database", "query", "server", "deploy", "docker", "kubernetes", "git ",
    "commit", "repository", "npm", "cargo", "struct", "interface", "algorithm", "thread",
    "mutex", "cli", "sdk", "regex", "json", "http", "boolean", "integer", "null",
    "undefined", "exception", "stack trace", "debugger",
];

// =============================================================================
// Structured payload patterns
// =============================================================================

/// Ids of whole-blob embedded-data containers, in probe order.
pub const PAYLOAD_CONTAINER_IDS: &[&str] = &["__NEXT_DATA__", "__NUXT_DATA__", "initial-state"];

/// Matches one streamed push-style payload call, capturing the string
/// argument. Non-greedy body with an escaped-quote-tolerant character class.
pub static STREAM_PUSH_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"self\.__next_f\.push\(\[\s*\d+\s*,\s*"((?:[^"\\]|\\.)*)"\s*\]\)"#)
        .expect("STREAM_PUSH_CALL regex")
});

/// Quick marker used for detection before the full capture pass runs.
pub const STREAM_MARKER: &str = "self.__next_f.push";

/// Known dotted paths to article-shaped objects inside framework payloads.
pub const ARTICLE_PATHS: &[&str] = &[
    "props.pageProps.article",
    "props.pageProps.post",
    "props.pageProps.story",
    "props.pageProps.data.article",
    "props.pageProps.data.post",
    "props.pageProps.content",
    "props.initialState.article",
    "props.initialProps.pageProps.article",
    "data.article",
    "article",
];

/// Fields whose presence marks a payload node as article-shaped.
pub const ARTICLE_MARKER_FIELDS: &[&str] = &["blocks", "content", "body", "markup", "storyAtoms"];

/// Key substrings excluded from the heuristic payload search (case-insensitive).
pub const SEARCH_DENY_KEYS: &[&str] = &[
    "config", "env", "i18n", "locale", "translation", "route", "analytics", "tracking",
    "experiment", "flags", "header", "footer", "nav", "menu", "ads", "telemetry", "webpack",
];

// =============================================================================
// Fallback container selector lists
// =============================================================================

/// CMS-specific content containers, in priority order.
pub const CMS_CONTENT_SELECTORS: &[&str] = &[
    ".post-full-content",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".article-body",
    ".article__body",
    ".story-body",
    ".c-entry-content",
    ".post-body",
    "#article-body",
    ".rich-text",
];

/// Generic article-structure containers tried after the CMS list.
pub const GENERIC_CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    "main",
    "#content",
    ".content",
];

/// Composite CMS hero shape: image container paired with a body container.
pub const CMS_COMPOSITE_SHAPE: (&str, &str) = (".post-full-image", ".post-full-content");

// =============================================================================
// Line classification patterns
// =============================================================================

/// Leading bullet character for a pseudo-list line.
pub static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[•·▪◦‣*+-]\s+\S").expect("BULLET_LINE regex")
});

/// Leading numbered prefix (`1.` / `2)` style) for a pseudo-list line.
pub static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,3}[.)]\s+\S").expect("NUMBERED_LINE regex"));

/// Strips the bullet/number prefix off a matched list line.
pub static LIST_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[•·▪◦‣*+-]|\d{1,3}[.)])\s+").expect("LIST_PREFIX regex")
});

/// ATX heading line (`#` through `######`).
pub static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("HEADING_LINE regex"));

/// Markdown inline image reference.
pub static INLINE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]*\]\(([^)\s]+)(?:\s+\x22[^\x22]*\x22)?\)").expect("INLINE_IMAGE regex")
});

/// Thematic break line (`---`, `***`, `___`).
pub static THEMATIC_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").expect("THEMATIC_BREAK regex")
});

/// Ordered-list line in markdown-like text.
pub static ORDERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,3})[.)]\s+(.*)$").expect("ORDERED_LINE regex"));

/// Unordered-list line in markdown-like text.
pub static UNORDERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("UNORDERED_LINE regex"));

/// Code fence with optional language tag.
pub static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```\s*([A-Za-z0-9+#._-]*)\s*$").expect("CODE_FENCE regex"));

// =============================================================================
// Image URL patterns
// =============================================================================

/// Known image file extensions (query string already stripped when matched).
pub static IMAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:jpe?g|png|gif|webp|avif|svg|bmp|ico)$").expect("IMAGE_EXTENSION regex")
});

/// Broad allow-list of image-ish path segments for extension-less URLs.
pub static IMAGE_PATH_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:/cdn/|/media/|/uploads?/|/images?/|/img/|/photos?/|/thumbs?/|/assets?/|/picture/|/wp-content/|/\d{4}/\d{2}/)",
    )
    .expect("IMAGE_PATH_HINT regex")
});

/// Paths that are never content images (tracking, analytics, API plumbing).
pub static IMAGE_URL_EXCLUSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:/pixel\b|/beacon\b|/track(?:ing)?\b|/analytics\b|/api/|/ajax/|doubleclick\.|adsystem\.|/sprite\b|spacer\.gif|blank\.gif|1x1\.)")
        .expect("IMAGE_URL_EXCLUSION regex")
});

/// Query parameter names under which proxy/rewriter URLs carry the origin URL.
pub const PROXY_URL_PARAMS: &[&str] = &["url", "src", "image", "img", "u", "q"];

/// Characters the downstream publishing API rejects inside URLs.
pub const URL_DISALLOWED_CHARS: &[char] = &['{', '}', '|', '\\', '^', '[', ']', '`', '"', '<', '>'];

/// Lazy-load and standard source attributes, in resolution order.
pub const IMAGE_SRC_ATTRIBUTES: &[&str] = &[
    "src",
    "data-src",
    "data-original",
    "data-lazy-src",
    "data-lazy",
    "data-url",
    "data-img-src",
    "data-actualsrc",
    "data-echo",
    "data-hi-res-src",
];

/// Bare image URL inside noscript text when no `<img>` tag parses out.
pub static BARE_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s"'<>]+\.(?:jpe?g|png|gif|webp|avif)[^\s"'<>]*"#)
        .expect("BARE_IMAGE_URL regex")
});

/// `url(...)` value inside a CSS background-image declaration.
pub static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"background(?:-image)?\s*:[^;]*url\(\s*['"]?([^'")]+)['"]?\s*\)"#)
        .expect("CSS_URL regex")
});

// =============================================================================
// Avatar / icon classification
// =============================================================================

/// Class/id/alt keywords that mark an image as an avatar rather than content.
pub static AVATAR_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(avatar|gravatar|profile[-_]?(?:pic|photo|image)|author[-_]?(?:pic|photo|image|avatar)|user[-_]?icon|headshot)")
        .expect("AVATAR_KEYWORD regex")
});

/// Featured-image container selectors, in priority order.
pub const FEATURED_IMAGE_SELECTORS: &[&str] = &[
    ".post-hero img",
    ".post-full-image img",
    ".featured-image img",
    ".article-hero img",
    ".hero-image img",
    "[class*=\"cover-image\"] img",
    ".entry-thumbnail img",
    "figure.wp-block-post-featured-image img",
    "article img",
    ".post img",
];

/// Favicon link selectors, in cascade order.
pub const FAVICON_SELECTORS: &[&str] = &[
    "link[rel=\"icon\"]",
    "link[rel=\"shortcut icon\"]",
    "link[rel=\"apple-touch-icon\"]",
    "link[rel=\"apple-touch-icon-precomposed\"]",
    "link[rel=\"mask-icon\"]",
];
