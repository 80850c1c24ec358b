use rs_blockclip::result::ContentKind;
use rs_blockclip::{extract_with_options, Block, Options};

fn options_for(url: &str) -> Options {
    Options {
        url: Some(url.to_string()),
        collect_images: false,
        ..Options::default()
    }
}

fn filler_paragraphs(marker: &str) -> String {
    let body = format!(
        "{marker} live document prose repeated so the page is comfortably \
         past the short-document ambiguity threshold in visible length. "
    )
    .repeat(8);
    format!("<p>{body}</p>")
}

#[test]
fn fresh_payload_blocks_win_over_dom_content() {
    let payload = r#"{"props":{"pageProps":{"article":{
        "title":"Payload Title",
        "path":"/post",
        "blocks":[
            {"type":"heading","level":1,"text":"Payload Title"},
            {"type":"paragraph","text":"PAYLOAD_PARAGRAPH body text."},
            {"type":"list","ordered":false,"items":["first item","second item"]}
        ]
    }}}}"#;
    let html = format!(
        r#"<html>
          <head><title>Payload Title - Site</title></head>
          <body>
            <script id="__NEXT_DATA__" type="application/json">{payload}</script>
            <article>{}</article>
          </body>
        </html>"#,
        filler_paragraphs("LIVE_DOM_MARKER")
    );

    let result = match extract_with_options(&html, &options_for("https://example.com/post")) {
        Ok(result) => result,
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    };

    assert!(matches!(result.blocks[0], Block::Heading1 { .. }));
    assert_eq!(result.blocks[0].plain_text(), "Payload Title");
    assert!(matches!(result.blocks[1], Block::Paragraph { .. }));
    assert!(result.blocks[1].plain_text().contains("PAYLOAD_PARAGRAPH"));
    assert!(matches!(result.blocks[2], Block::BulletedListItem { .. }));

    let all_text: String = result
        .blocks
        .iter()
        .map(Block::plain_text)
        .collect::<Vec<_>>()
        .join("\n");
    assert!(!all_text.contains("LIVE_DOM_MARKER"));
    assert_eq!(result.title, "Payload Title");
}

#[test]
fn stale_path_payload_is_rejected_in_favor_of_dom() {
    let payload = r#"{"props":{"pageProps":{"article":{
        "title":"Payload Title - Site",
        "path":"/some-older-post",
        "blocks":[{"type":"paragraph","text":"STALE_PAYLOAD_MARKER"}]
    }}}}"#;
    let html = format!(
        r#"<html>
          <head><title>Payload Title - Site</title></head>
          <body>
            <script id="__NEXT_DATA__" type="application/json">{payload}</script>
            <article>{}{}</article>
          </body>
        </html>"#,
        filler_paragraphs("LIVE_DOM_MARKER"),
        filler_paragraphs("LIVE_DOM_MARKER")
    );

    let result = match extract_with_options(&html, &options_for("https://example.com/post")) {
        Ok(result) => result,
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    };

    let all_text: String = result
        .blocks
        .iter()
        .map(Block::plain_text)
        .collect::<Vec<_>>()
        .join("\n");
    assert!(!all_text.contains("STALE_PAYLOAD_MARKER"));
    assert!(all_text.contains("LIVE_DOM_MARKER"));
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("structured payload")));
}

#[test]
fn stale_title_payload_is_rejected() {
    let payload = r#"{"props":{"pageProps":{"article":{
        "title":"A Completely Different Headline",
        "path":"/post",
        "blocks":[{"type":"paragraph","text":"STALE_TITLE_MARKER"}]
    }}}}"#;
    let html = format!(
        r#"<html>
          <head><title>Current Page Title</title></head>
          <body>
            <script id="__NEXT_DATA__" type="application/json">{payload}</script>
            <article>{}{}</article>
          </body>
        </html>"#,
        filler_paragraphs("LIVE_DOM_MARKER"),
        filler_paragraphs("LIVE_DOM_MARKER")
    );

    let result = match extract_with_options(&html, &options_for("https://example.com/post")) {
        Ok(result) => result,
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    };

    let all_text: String = result
        .blocks
        .iter()
        .map(Block::plain_text)
        .collect::<Vec<_>>()
        .join("\n");
    assert!(!all_text.contains("STALE_TITLE_MARKER"));
    assert_ne!(result.title, "A Completely Different Headline");
}

#[test]
fn plain_content_payload_goes_through_line_converter() {
    let content = "# Section Heading\\n\\nOpening paragraph of the payload article, \
                   written with enough length to be worth keeping on its own.\\n\\n\
                   - alpha point\\n- beta point";
    let payload = format!(
        r#"{{"props":{{"pageProps":{{"article":{{
            "title":"Line Fixture",
            "path":"/post",
            "content":"{content}"
        }}}}}}}}"#
    );
    let html = format!(
        r#"<html>
          <head><title>Line Fixture - Site</title></head>
          <body>
            <script id="__NEXT_DATA__" type="application/json">{payload}</script>
            <article>{}{}</article>
          </body>
        </html>"#,
        filler_paragraphs("LIVE_DOM_MARKER"),
        filler_paragraphs("LIVE_DOM_MARKER")
    );

    let result = match extract_with_options(&html, &options_for("https://example.com/post")) {
        Ok(result) => result,
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    };

    assert!(matches!(result.blocks[0], Block::Heading1 { .. }));
    assert_eq!(result.blocks[0].plain_text(), "Section Heading");
    assert!(result
        .blocks
        .iter()
        .any(|b| matches!(b, Block::BulletedListItem { .. }) && b.plain_text() == "alpha point"));
}

#[test]
fn story_atoms_convert_directly() {
    use rs_blockclip::images::ImageResolver;
    use rs_blockclip::structured;
    use rs_blockclip::{dom, Heuristics};

    let payload = r#"{"props":{"pageProps":{"article":{
        "title":"Atom Fixture",
        "storyAtoms":[
            {"type":"text","tag":"h2","text":"Atom Section"},
            {"type":"text","text":"Atom paragraph body."},
            {"type":"image","image":{"large":{"url":"https://example.com/media/hero.jpg"}}}
        ]
    }}}}"#;
    let html = format!(
        r#"<html><head><title>Atom Fixture - Site</title></head><body>
          <script id="__NEXT_DATA__" type="application/json">{payload}</script>
        </body></html>"#
    );

    let doc = dom::parse(&html);
    let options = options_for("https://example.com/post");
    let resolver = ImageResolver::new(None, &Heuristics::default());
    let extraction = match structured::extract_structured(&doc, &options, &resolver) {
        Ok(Some(extraction)) => extraction,
        other => panic!("expected Ok(Some(_)), got {other:?}"),
    };

    assert_eq!(extraction.kind, ContentKind::Structured);
    assert!(matches!(extraction.blocks[0], Block::Heading2 { .. }));
    assert!(matches!(extraction.blocks[1], Block::Paragraph { .. }));
    assert_eq!(
        extraction.blocks[2].image_url(),
        Some("https://example.com/media/hero.jpg")
    );
    assert_eq!(extraction.article.title.as_deref(), Some("Atom Fixture"));
}

#[test]
fn streamed_push_payload_is_detected() {
    use rs_blockclip::{dom, structured};

    let html = r#"<html><body>
        <script>self.__next_f.push([1,"{\"x\":1}"])</script>
        <p>body</p>
    </body></html>"#;
    let doc = dom::parse(html);
    assert!(structured::detect_payload(&doc));

    let plain = dom::parse("<html><body><p>no payload here</p></body></html>");
    assert!(!structured::detect_payload(&plain));
}
