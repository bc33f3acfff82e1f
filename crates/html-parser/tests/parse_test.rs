//! Document-level parse tests: structure normalisation, text handling,
//! and parser configuration.

use html_parser::{parse, ParseSettings, Parser};
use pretty_assertions::assert_eq;

#[test]
fn parses_simple_document() {
    let doc = parse("<html><head><title>First!</title></head><body><p>One</p></body></html>", "");
    assert_eq!(
        doc.html(),
        "<html><head><title>First!</title></head><body><p>One</p></body></html>"
    );
}

#[test]
fn creates_structure_from_body_snippet() {
    let doc = parse("foo <b>bar</b> baz", "");
    assert_eq!(
        doc.html(),
        "<html><head></head><body>foo <b>bar</b> baz</body></html>"
    );
}

#[test]
fn normalises_tag_and_attribute_case() {
    let doc = parse("<DIV ID=1 Class=big>One</DIV>", "");
    assert_eq!(
        doc.html(),
        "<html><head></head><body><div id=\"1\" class=\"big\">One</div></body></html>"
    );
}

#[test]
fn preserve_case_settings_keep_source_case() {
    let mut parser = Parser::html_parser();
    parser.set_settings(ParseSettings::PRESERVE_CASE);
    let doc = parser.parse_input("<DIV ID=1>One</DIV>", "");
    assert!(doc.html().contains("<DIV ID=\"1\">One</DIV>"));
}

#[test]
fn boolean_attributes_have_no_value() {
    let doc = parse("<input disabled>", "");
    assert!(doc.html().contains("<input disabled>"));
}

#[test]
fn title_content_is_rcdata() {
    let doc = parse("<title>a<b>c</title><p>One</p>", "");
    let root = doc.root();
    let html = doc.children(root)[0];
    let head = doc.children(html)[0];
    let title = doc.children(head)[0];
    assert_eq!(doc.text(title), "a<b>c");
    assert_eq!(doc.outer_html(title), "<title>a&lt;b&gt;c</title>");
}

#[test]
fn script_content_is_not_escaped() {
    let doc = parse("<script>if (a < b) run();</script>", "");
    assert!(doc.html().contains("<script>if (a < b) run();</script>"));
}

#[test]
fn comments_are_preserved() {
    let doc = parse("<p>One</p><!-- comment --><p>Two</p>", "");
    assert!(doc
        .html()
        .contains("<p>One</p><!-- comment --><p>Two</p>"));
}

#[test]
fn doctype_with_public_and_system_ids() {
    let doc = parse(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1.dtd\"><p>One</p>",
        "",
    );
    assert!(doc.html().starts_with(
        "<!doctype html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1.dtd\">"
    ));
}

#[test]
fn named_entities_resolve_in_text() {
    let doc = parse("<p>One &amp; two &lt;three&gt; &copy;</p>", "");
    let root = doc.root();
    assert_eq!(doc.text(root), "One & two <three> ©");
}

#[test]
fn entities_resolve_in_attributes() {
    let doc = parse("<a href=\"/x?a=1&amp;b=2\">link</a>", "");
    let root = doc.root();
    let html = doc.children(root)[0];
    let body = doc.children(html)[1];
    let a = doc.children(body)[0];
    let attrs = doc.attributes(a).expect("element attrs");
    assert_eq!(attrs.get("href"), Some("/x?a=1&b=2"));
}

#[test]
fn numeric_entities_resolve() {
    let doc = parse("<p>&#65;&#x42;&#128;</p>", "");
    let root = doc.root();
    // 128 is remapped per the windows-1252 table
    assert_eq!(doc.text(root), "AB€");
}

#[test]
fn base_href_sets_document_base() {
    let doc = parse(
        "<head><base href=\"https://example.com/\" target=\"_blank\"></head><p>One</p>",
        "http://start.example/",
    );
    assert_eq!(doc.base_uri(), "https://example.com/");

    // only the first base sets it
    let doc = parse(
        "<base href=\"https://one.example/\"><base href=\"https://two.example/\">",
        "",
    );
    assert_eq!(doc.base_uri(), "https://one.example/");
}

#[test]
fn duplicate_attributes_are_dropped_first_wins() {
    let mut parser = Parser::html_parser();
    parser.set_track_errors(10);
    let doc = parser.parse_input("<p One=One ONE=Two Two=two one=Three>Text</p>", "");
    assert!(doc.html().contains("<p one=\"One\" two=\"two\">Text</p>"));
    assert!(!parser.errors().is_empty());
}

#[test]
fn tracked_errors_carry_position_and_message() {
    let mut parser = Parser::html_parser();
    parser.set_track_errors(10);
    parser.parse_input("<p>One</div>", "");
    let errors: Vec<_> = parser.errors().iter().collect();
    assert!(!errors.is_empty());
    assert!(errors[0].msg().contains("Unexpected"));
}

#[test]
fn position_tracking_spans_open_and_close() {
    let mut parser = Parser::html_parser();
    parser.set_track_position(true);
    let doc = parser.parse_input("<p>One</p>\n<p>Two</p>", "");
    let root = doc.root();
    let html = doc.children(root)[0];
    let body = doc.children(html)[1];
    let first = doc.children(body)[0];
    let second = doc.children(body)[1];

    let range = doc.source_range(first).expect("tracked");
    assert_eq!(range.start.pos, 0);
    assert_eq!(range.start.line, 1);
    assert_eq!(range.start.col, 1);
    assert_eq!(range.end.pos, 10);

    let range = doc.source_range(second).expect("tracked");
    assert_eq!(range.start.pos, 11);
    assert_eq!(range.start.line, 2);
    assert_eq!(range.start.col, 1);
}

#[test]
fn implied_elements_have_no_range() {
    let mut parser = Parser::html_parser();
    parser.set_track_position(true);
    let doc = parser.parse_input("<p>One</p>", "");
    let root = doc.root();
    let html = doc.children(root)[0];
    assert!(doc.source_range(html).is_none());
}

#[test]
fn nbsp_is_preserved_and_escaped() {
    let doc = parse("<p>a\u{A0}b</p>", "");
    assert!(doc.html().contains("a&nbsp;b"));
}

#[test]
fn normalised_output_is_stable() {
    for input in [
        "<p>1<b>2<i>3</b>4</i>5</p>",
        "<ul><li>One<li>Two</ul>",
        "text<table><tr><td>cell</table>after",
        "<b>one<p>two</b>three</p>",
        "<select><option>a<option>b</select>",
    ] {
        let first = parse(input, "").html();
        let second = parse(&first, "").html();
        assert_eq!(first, second, "unstable for {input}");
    }
}
