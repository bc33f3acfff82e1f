//! The parser must complete on any input: truncated markup, misnesting,
//! and adversarial nesting depths all produce a document.

use html_parser::{parse, parse_xml_fragment, unescape_entities, Parser};
use quickcheck_macros::quickcheck;

#[test]
fn truncated_and_malformed_inputs_complete() {
    for input in [
        "",
        "<",
        "<!",
        "</",
        "<html",
        "<!-- unterminated",
        "<![CDATA[ unterminated",
        "<p",
        "<p Attribute=",
        "<p Attribute=\"unterminated",
        "&",
        "&amp",
        "&#",
        "&#x",
        "one\u{0}two",
        "</p></div></span>",
        "<table><table><table>",
        "<select><table><tr><td>",
        "<a href='<p>weird</a>",
        "<?php echo 'hi'; ?>",
    ] {
        let doc = parse(input, "");
        let root = doc.root();
        // every parse yields the implied document scaffolding
        assert!(doc
            .children(root)
            .iter()
            .any(|&n| doc.normal_name(n) == "html"));
    }
}

#[test]
fn deeply_nested_divs_complete() {
    let input = "<div>".repeat(2048) + "deep";
    let doc = parse(&input, "");
    assert!(doc.text(doc.root()).contains("deep"));
}

#[test]
fn hundred_thousand_nested_divs_complete() {
    // construction, teardown, and serialization are all iterative over
    // the arena, so depth costs memory but never blows the call stack
    let input = "<div>".repeat(100_000);
    let doc = parse(&input, "");
    let root = doc.root();
    let html = doc.children(root)[0];
    let body = doc.children(html)[1];
    assert_eq!(doc.normal_name(doc.children(body)[0]), "div");

    let out = doc.html();
    assert!(out.starts_with("<html><head></head><body><div><div>"));
    assert!(out.ends_with("</div></div></body></html>"));
}

#[test]
fn runaway_formatting_elements_are_capped() {
    // identical formatting elements collapse (three of a kind) rather
    // than growing the active list without bound
    let input = "<b>".repeat(300) + "text";
    let doc = parse(&input, "");
    assert!(doc.text(doc.root()).contains("text"));

    // and reconstructing across blocks still completes
    let input = "<b><i>".repeat(100) + "<p>middle</p>";
    let doc = parse(&input, "");
    assert!(doc.text(doc.root()).contains("middle"));
}

#[test]
fn misnested_tables_complete() {
    let input = "<table><td><table><td><table><td>innermost".repeat(32);
    let doc = parse(&input, "");
    assert!(doc.text(doc.root()).contains("innermost"));
}

#[test]
fn adoption_agency_on_long_misnesting_completes() {
    let mut input = String::from("<p>");
    for _ in 0..64 {
        input.push_str("<b><i>text");
    }
    input.push_str("</p>");
    for _ in 0..64 {
        input.push_str("</b>tail");
    }
    let doc = parse(&input, "");
    assert!(doc.text(doc.root()).contains("tail"));
}

#[test]
fn unclosed_template_at_eof_completes() {
    let input = "<template>".repeat(20) + "inner";
    let doc = parse(&input, "");
    assert!(doc.html().contains("template"));
}

#[test]
fn huge_attribute_count_is_bounded() {
    let mut input = String::from("<div");
    for i in 0..1000 {
        input.push_str(&format!(" a{i}=v"));
    }
    input.push('>');
    let doc = parse(&input, "");
    let root = doc.root();
    let html = doc.children(root)[0];
    let body = doc.children(html)[1];
    let div = doc.children(body)[0];
    let attrs = doc.attributes(div).expect("element attrs");
    assert!(attrs.len() <= 512);
}

#[test]
fn multibyte_declarations_complete() {
    // declarations whose final char is multibyte must not split it
    for input in [
        "<?\u{e9}>",
        "<!\u{e9}>",
        "<?xml encoding=\u{e9}>",
        "<?\u{3c0} version='1'?>",
    ] {
        let (doc, _nodes) = parse_xml_fragment(input, "");
        assert!(!doc.html().is_empty());
    }
}

#[quickcheck]
fn html_parse_never_panics(input: String) -> bool {
    let doc = parse(&input, "");
    let root = doc.root();
    doc.children(root)
        .iter()
        .any(|&n| doc.normal_name(n) == "html")
}

#[quickcheck]
fn xml_parse_never_panics(input: String) -> bool {
    let (_doc, _nodes) = parse_xml_fragment(&input, "");
    true
}

#[quickcheck]
fn unescape_never_panics(input: String) -> bool {
    let _ = unescape_entities(&input, false);
    let _ = unescape_entities(&input, true);
    true
}

#[quickcheck]
fn serialized_output_reparses_to_itself(input: String) -> bool {
    let first = parse(&input, "").html();
    let second = parse(&first, "").html();
    first == second
}

#[quickcheck]
fn error_tracking_stays_bounded(input: String) -> bool {
    let mut parser = Parser::html_parser();
    parser.set_track_errors(5);
    parser.parse_input(&input, "");
    parser.errors().len() <= 5
}
