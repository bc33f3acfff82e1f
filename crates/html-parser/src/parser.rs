//! The parser facade: entry points for parsing documents and fragments,
//! with per-parser configuration of error tracking, position tracking,
//! and case preservation.

use log::trace;

use crate::character_reader::CharacterReader;
use crate::dom::{Attributes, Document, NodeId};
use crate::html_tree_builder::HtmlTreeBuilder;
use crate::parse_error::ParseErrorList;
use crate::settings::ParseSettings;
use crate::tag::Tag;
use crate::tokeniser::Tokeniser;
use crate::xml_tree_builder::XmlTreeBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeBuilderKind {
    Html,
    Xml,
}

/// Parses HTML or XML into a [Document]. Obtain one via [Parser::html_parser]
/// or [Parser::xml_parser], or use the top level functions in this module
/// for one-shot parses.
pub struct Parser {
    kind: TreeBuilderKind,
    settings: ParseSettings,
    max_errors: usize,
    track_position: bool,
    errors: ParseErrorList,
}

impl Parser {
    /// Creates a new HTML parser. This parser treats input as HTML5, and
    /// enforces the creation of a normalised document, based on a
    /// knowledge of the semantics of the incoming tags.
    pub fn html_parser() -> Parser {
        Parser {
            kind: TreeBuilderKind::Html,
            settings: ParseSettings::HTML_DEFAULT,
            max_errors: 0,
            track_position: false,
            errors: ParseErrorList::no_tracking(),
        }
    }

    /// Creates a new XML parser. This parser assumes no knowledge of the
    /// incoming tags and does not treat it as HTML, rather creates a
    /// simple tree directly from the input.
    pub fn xml_parser() -> Parser {
        Parser {
            kind: TreeBuilderKind::Xml,
            settings: ParseSettings::PRESERVE_CASE,
            max_errors: 0,
            track_position: false,
            errors: ParseErrorList::no_tracking(),
        }
    }

    /// Creates a new Parser with this one's configuration, but none of
    /// its parse state. Allows independent reuse.
    pub fn new_instance(&self) -> Parser {
        Parser {
            kind: self.kind,
            settings: self.settings,
            max_errors: self.max_errors,
            track_position: self.track_position,
            errors: ParseErrorList::no_tracking(),
        }
    }

    pub fn parse_input(&mut self, input: &str, base_uri: &str) -> Document {
        trace!("parsing {} bytes as {:?}", input.len(), self.kind);
        let errors = self.new_error_list();
        let (doc, errors) = match self.kind {
            TreeBuilderKind::Html => {
                HtmlTreeBuilder::new(input, base_uri, self.settings, errors, self.track_position)
                    .run()
            }
            TreeBuilderKind::Xml => {
                XmlTreeBuilder::new(input, base_uri, self.settings, errors, self.track_position)
                    .run()
            }
        };
        self.errors = errors;
        doc
    }

    /// Parses a fragment, yielding the backing document and the top level
    /// parsed nodes. For HTML, `context` optionally names the element the
    /// fragment is being parsed within (i.e. for inner HTML), which
    /// provides stack context for implicit element creation.
    pub fn parse_fragment_input(
        &mut self,
        fragment: &str,
        context: Option<&str>,
        base_uri: &str,
    ) -> (Document, Vec<NodeId>) {
        trace!(
            "parsing {} byte fragment as {:?} in context {:?}",
            fragment.len(),
            self.kind,
            context
        );
        let errors = self.new_error_list();
        let (doc, nodes, errors) = match self.kind {
            TreeBuilderKind::Html => HtmlTreeBuilder::new(
                fragment,
                base_uri,
                self.settings,
                errors,
                self.track_position,
            )
            .run_fragment(context),
            TreeBuilderKind::Xml => {
                XmlTreeBuilder::new(fragment, base_uri, self.settings, errors, self.track_position)
                    .run_fragment()
            }
        };
        self.errors = errors;
        (doc, nodes)
    }

    /// Enables or disables parse error tracking for the next parse, up to
    /// the given maximum. Set to 0 to disable.
    pub fn set_track_errors(&mut self, max_errors: usize) -> &mut Parser {
        self.max_errors = max_errors;
        self
    }

    pub fn is_track_errors(&self) -> bool {
        self.max_errors > 0
    }

    /// Enables or disables source position tracking. If enabled, nodes
    /// will have a range to track where in the original input source they
    /// were created from.
    pub fn set_track_position(&mut self, track_position: bool) -> &mut Parser {
        self.track_position = track_position;
        self
    }

    pub fn is_track_position(&self) -> bool {
        self.track_position
    }

    /// The parse errors from the most recent parse, up to the maximum
    /// tracked.
    pub fn errors(&self) -> &ParseErrorList {
        &self.errors
    }

    /// Updates the settings of this parser, to control the case
    /// sensitivity of tags and attributes.
    pub fn set_settings(&mut self, settings: ParseSettings) -> &mut Parser {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> ParseSettings {
        self.settings
    }

    fn new_error_list(&self) -> ParseErrorList {
        if self.max_errors > 0 {
            ParseErrorList::tracking(self.max_errors)
        } else {
            ParseErrorList::no_tracking()
        }
    }
}

/// Parses HTML into a [Document].
///
/// `base_uri` is the original fetch location, kept on the document for
/// resolving relative URLs.
pub fn parse(html: &str, base_uri: &str) -> Document {
    Parser::html_parser().parse_input(html, base_uri)
}

/// Parses a fragment of HTML into a list of nodes, held by the returned
/// document. The context element name, if supplied, supplies parsing
/// context.
pub fn parse_fragment(
    fragment_html: &str,
    context: Option<&str>,
    base_uri: &str,
) -> (Document, Vec<NodeId>) {
    Parser::html_parser().parse_fragment_input(fragment_html, context, base_uri)
}

/// Parses a fragment of XML into a list of nodes, held by the returned
/// document.
pub fn parse_xml_fragment(fragment_xml: &str, base_uri: &str) -> (Document, Vec<NodeId>) {
    Parser::xml_parser().parse_fragment_input(fragment_xml, None, base_uri)
}

/// Parses a fragment of HTML into the `body` of a Document: the result has
/// an empty head, and the input parsed into the body.
pub fn parse_body_fragment(body_html: &str, base_uri: &str) -> Document {
    let mut parser = Parser::html_parser();
    let (mut doc, _nodes) = parser.parse_fragment_input(body_html, Some("body"), base_uri);
    // wrap the parsed body in a document shell
    let root = doc.root();
    let body = doc.children(root).first().copied();
    let html_tag = Tag::value_of("html", &ParseSettings::HTML_DEFAULT);
    let head_tag = Tag::value_of("head", &ParseSettings::HTML_DEFAULT);
    let html = doc.new_element(html_tag, Attributes::new());
    let head = doc.new_element(head_tag, Attributes::new());
    doc.append_child(root, html);
    doc.append_child(html, head);
    if let Some(body) = body {
        doc.append_child(html, body);
    }
    doc
}

/// Unescapes HTML entities from a string.
///
/// `in_attribute` applies the stricter attribute rules (a trailing `=`
/// stops a prefix match).
pub fn unescape_entities(string: &str, in_attribute: bool) -> String {
    let mut tokeniser = Tokeniser::new(
        CharacterReader::new(string),
        ParseErrorList::no_tracking(),
    );
    tokeniser.unescape_entities(in_attribute)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_simple_document() {
        let doc = parse("<p>One</p>", "");
        assert_eq!(
            doc.html(),
            "<html><head></head><body><p>One</p></body></html>"
        );
    }

    #[test]
    fn fragment_uses_context() {
        let (doc, nodes) = parse_fragment("<td>One</td><td>Two</td>", Some("tr"), "");
        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.normal_name(nodes[0]), "td");
        assert_eq!(doc.outer_html(nodes[1]), "<td>Two</td>");
    }

    #[test]
    fn fragment_without_context_builds_document_shape() {
        let (doc, nodes) = parse_fragment("<p>One</p>", None, "");
        assert_eq!(nodes.len(), 1);
        assert_eq!(doc.normal_name(nodes[0]), "html");
    }

    #[test]
    fn body_fragment_builds_shell() {
        let doc = parse_body_fragment("<p>One</p><p>Two</p>", "");
        assert_eq!(
            doc.html(),
            "<html><head></head><body><p>One</p><p>Two</p></body></html>"
        );
    }

    #[test]
    fn xml_fragment_keeps_shape() {
        let (doc, nodes) = parse_xml_fragment("<one>hi</one><two/>", "");
        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.outer_html(nodes[0]), "<one>hi</one>");
    }

    #[test]
    fn error_tracking_is_opt_in() {
        let mut parser = Parser::html_parser();
        parser.parse_input("<div x=1 x=2></div>", "");
        assert!(parser.errors().is_empty());

        parser.set_track_errors(10);
        parser.parse_input("<div x=1 x=2></div>", "");
        assert!(!parser.errors().is_empty());
        assert!(parser.is_track_errors());
    }

    #[test]
    fn position_tracking_is_opt_in() {
        let mut parser = Parser::html_parser();
        parser.set_track_position(true);
        let doc = parser.parse_input("<p>One</p>", "");
        let root = doc.root();
        let html = doc.children(root)[0];
        let body = doc.children(html)[1];
        let p = doc.children(body)[0];
        let range = doc.source_range(p).expect("range tracked");
        assert_eq!(range.start.pos, 0);
        assert_eq!(range.start.line, 1);
        assert_eq!(range.start.col, 1);
    }

    #[test]
    fn new_instance_copies_config_not_errors() {
        let mut parser = Parser::html_parser();
        parser.set_track_errors(5).set_track_position(true);
        parser.parse_input("<div x=1 x=2>", "");
        assert!(!parser.errors().is_empty());

        let copy = parser.new_instance();
        assert!(copy.is_track_errors());
        assert!(copy.is_track_position());
        assert!(copy.errors().is_empty());
    }

    #[test]
    fn unescapes_entities() {
        assert_eq!(unescape_entities("One &amp; Two", false), "One & Two");
        assert_eq!(unescape_entities("&lt;html&gt;", false), "<html>");
        // without a trailing semi, attribute mode requires a clean stop
        assert_eq!(unescape_entities("x=y&amp=z", true), "x=y&amp=z");
    }
}
