//! Fragment parsing: context-sensitive stack setup and node extraction.

use html_parser::{parse_body_fragment, parse_fragment, parse_xml_fragment};
use pretty_assertions::assert_eq;

#[test]
fn table_row_context_keeps_cells() {
    let (doc, nodes) = parse_fragment("<td>One</td><td>Two</td>", Some("tr"), "");
    assert_eq!(nodes.len(), 2);
    assert_eq!(doc.outer_html(nodes[0]), "<td>One</td>");
    assert_eq!(doc.outer_html(nodes[1]), "<td>Two</td>");
}

#[test]
fn table_context_builds_scaffolding() {
    let (doc, nodes) = parse_fragment("<tr><td>One</td></tr>", Some("table"), "");
    assert_eq!(nodes.len(), 1);
    assert_eq!(
        doc.outer_html(nodes[0]),
        "<tbody><tr><td>One</td></tr></tbody>"
    );
}

#[test]
fn block_content_in_inline_context_is_folded_back() {
    // a div can't sit in a p; it gets pushed out of the context element,
    // then folded back into the returned node list
    let (doc, nodes) = parse_fragment("one<div>two</div>", Some("p"), "");
    let html: String = nodes.iter().map(|&n| doc.outer_html(n)).collect();
    assert_eq!(html, "one<div>two</div>");
}

#[test]
fn script_context_parses_as_data() {
    let (doc, nodes) = parse_fragment("var a = 1 < 2;", Some("script"), "");
    assert_eq!(nodes.len(), 1);
    assert_eq!(doc.normal_name(nodes[0]), "#data");
}

#[test]
fn title_context_parses_as_text() {
    let (doc, nodes) = parse_fragment("one<b>two", Some("title"), "");
    assert_eq!(nodes.len(), 1);
    assert_eq!(doc.normal_name(nodes[0]), "#text");
    assert_eq!(doc.text(nodes[0]), "one<b>two");
}

#[test]
fn form_context_associates_controls() {
    let (doc, nodes) = parse_fragment("<input name=\"q\"><textarea>x</textarea>", Some("form"), "");
    assert_eq!(nodes.len(), 2);
    let form = doc.parent(nodes[0]).expect("context parent");
    let controls = doc.form_controls(form).expect("form controls");
    assert_eq!(controls.len(), 2);
}

#[test]
fn template_context_accepts_table_parts() {
    let (doc, nodes) = parse_fragment("<tr><td>One</td></tr>", Some("template"), "");
    assert!(!nodes.is_empty());
    let html: String = nodes.iter().map(|&n| doc.outer_html(n)).collect();
    assert!(html.contains("<td>One</td>"), "{html}");
}

#[test]
fn no_context_parses_a_full_document() {
    let (doc, nodes) = parse_fragment("<p>One</p>", None, "");
    assert_eq!(nodes.len(), 1);
    assert_eq!(
        doc.outer_html(nodes[0]),
        "<html><head></head><body><p>One</p></body></html>"
    );
}

#[test]
fn body_fragment_wraps_in_shell() {
    let doc = parse_body_fragment("<div>One</div>two", "");
    assert_eq!(
        doc.html(),
        "<html><head></head><body><div>One</div>two</body></html>"
    );
}

#[test]
fn xml_fragment_has_no_html_rules() {
    let (doc, nodes) = parse_xml_fragment("<tr><td>One</td></tr>", "");
    assert_eq!(nodes.len(), 1);
    assert_eq!(doc.outer_html(nodes[0]), "<tr><td>One</td></tr>");
}
