use rs_blockclip::dom;
use rs_blockclip::profile::analyze_document;
use rs_blockclip::strategy::{select_strategy, ExtractionStrategy};

#[test]
fn markdown_container_is_decisive() {
    let doc = dom::parse(
        r#"<html><body>
            <div class="markdown-body"><h1>Docs</h1><p>Content.</p></div>
        </body></html>"#,
    );
    let selection = select_strategy(&analyze_document(&doc));
    assert_eq!(selection.strategy, ExtractionStrategy::Structured);
    assert_eq!(selection.confidence, 95);
    assert!(selection
        .reasons
        .iter()
        .any(|r| r.contains("markdown container")));
}

#[test]
fn clean_page_prefers_structured_with_raised_confidence() {
    let body = "Ordinary readable prose for a clean page fixture. ".repeat(20);
    let doc = dom::parse(&format!(
        "<html><body><article><h1>T</h1><p>{body}</p></article></body></html>"
    ));
    let profile = analyze_document(&doc);
    assert!(profile.is_clean);

    let selection = select_strategy(&profile);
    assert_eq!(selection.strategy, ExtractionStrategy::Structured);
    assert_eq!(selection.confidence, 70);
}

#[test]
fn ad_heavy_page_requires_readability() {
    let body = "Content surrounded by advertising units on every side. ".repeat(20);
    let doc = dom::parse(&format!(
        r#"<html><body>
            <div class="ad-slot-top">x</div>
            <div class="sponsor-banner">y</div>
            <article><p>{body}</p></article>
        </body></html>"#
    ));
    let profile = analyze_document(&doc);
    assert!(profile.has_ads);

    let selection = select_strategy(&profile);
    assert_eq!(selection.strategy, ExtractionStrategy::Readability);
    assert!(selection.confidence >= 70);
}

#[test]
fn short_document_flags_verification() {
    let doc = dom::parse("<html><body><p>Tiny.</p></body></html>");
    let selection = select_strategy(&analyze_document(&doc));
    assert!(selection.needs_fallback_verification);
}

#[test]
fn long_clean_document_does_not_flag_verification() {
    let body = "A full sentence of body prose with no hostile signals at all. ".repeat(30);
    let doc = dom::parse(&format!(
        "<html><body><article><p>{body}</p></article></body></html>"
    ));
    let selection = select_strategy(&analyze_document(&doc));
    assert!(!selection.needs_fallback_verification);
}

#[test]
fn confidence_never_leaves_bounds() {
    let fixtures = [
        "<html><body></body></html>",
        "<html><body><div class=\"markdown-body\"><pre>code</pre></div></body></html>",
        &format!(
            "<html><body>{}<p>{}</p></body></html>",
            "<nav>n</nav>".repeat(8),
            "word ".repeat(1000)
        ),
    ];
    for html in fixtures {
        let selection = select_strategy(&analyze_document(&dom::parse(html)));
        assert!(selection.confidence <= 100);
    }
}
