//! A simple XML tree builder. Applies no HTML structural rules: elements
//! nest exactly as they appear, and tag case is preserved.

use crate::dom::{Document, NodeId};
use crate::parse_error::ParseErrorList;
use crate::settings::ParseSettings;
use crate::token::{CharacterToken, CommentToken, DoctypeToken, TagToken, Token};
use crate::tree_builder::TreeBuilderCore;

// close-tag search depth cap, prevents runaway on crafted input
const MAX_QUEUE_DEPTH: usize = 256;

pub(crate) struct XmlTreeBuilder {
    pub(crate) core: TreeBuilderCore,
}

impl XmlTreeBuilder {
    pub(crate) fn new(
        input: &str,
        base_uri: &str,
        settings: ParseSettings,
        errors: ParseErrorList,
        track_source_range: bool,
    ) -> XmlTreeBuilder {
        XmlTreeBuilder {
            core: TreeBuilderCore::new(input, base_uri, settings, errors, track_source_range),
        }
    }

    pub(crate) fn run(mut self) -> (Document, ParseErrorList) {
        self.run_parser();
        (self.core.doc, self.core.tokeniser.errors)
    }

    /// Parses a fragment, yielding the document and its top level nodes.
    pub(crate) fn run_fragment(mut self) -> (Document, Vec<NodeId>, ParseErrorList) {
        self.run_parser();
        let nodes = self.core.doc.children(self.core.doc.root()).to_vec();
        (self.core.doc, nodes, self.core.tokeniser.errors)
    }

    fn run_parser(&mut self) {
        loop {
            let mut token = self.core.tokeniser.read();
            let eof = token.is_eof();
            self.process(&mut token);
            if eof {
                break;
            }
        }
    }

    fn process(&mut self, t: &mut Token) -> bool {
        self.core.remember_token(t);
        match t {
            Token::StartTag(start) => {
                self.insert_start(start);
            }
            Token::EndTag(end) => self.pop_stack_to_close(end),
            Token::Comment(comment) => self.insert_comment(comment),
            Token::Character(c) => self.insert_character(c),
            Token::Doctype(d) => self.insert_doctype(d),
            Token::Eof(_) => {}
        }
        true
    }

    fn insert_node(&mut self, node: NodeId, span: Option<(usize, usize)>) {
        let parent = self.core.current_element();
        self.core.doc.append_child(parent, node);
        self.core.on_node_inserted(node, span);
    }

    pub(crate) fn insert_start(&mut self, start_tag: &mut TagToken) -> NodeId {
        let parse_settings = self.core.settings;
        let mut tag = self.core.tag_for(start_tag.name(), &parse_settings);
        let mut attrs = start_tag.attributes.take().unwrap_or_default();
        parse_settings.normalize_attributes(&mut attrs);
        if !attrs.is_empty() {
            let dupes = attrs.deduplicate(&parse_settings);
            if dupes > 0 {
                let name = start_tag.normal_name().to_string();
                self.core
                    .error(format!("Dropped duplicate attribute(s) in tag [{}]", name));
            }
        }
        if start_tag.self_closing && !tag.is_known() {
            // unknown tag: remember it is self closing, for output
            tag.set_self_closing();
        }
        let el = self.core.doc.new_element(tag, attrs);
        self.insert_node(el, Some((start_tag.start_pos, start_tag.end_pos)));
        if !start_tag.self_closing {
            self.core.stack.push(el);
        }
        el
    }

    pub(crate) fn insert_comment(&mut self, comment_token: &CommentToken) {
        let span = Some((comment_token.start_pos, comment_token.end_pos));
        if comment_token.bogus {
            // xml declarations are emitted as bogus comments (which is
            // right for html, but not xml). parse the data as an element
            // to pull the attributes out
            let data = &comment_token.data;
            if data.len() > 1 && (data.starts_with('!') || data.starts_with('?')) {
                // the leading marker is one byte, but the trailing char may
                // not be; trim it by char boundary
                let inner_end =
                    data.len() - data.chars().next_back().map_or(0, char::len_utf8);
                let fragment = format!("<{}>", &data[1..inner_end]);
                let inner = XmlTreeBuilder::new(
                    &fragment,
                    &self.core.base_uri,
                    ParseSettings::PRESERVE_CASE,
                    ParseErrorList::no_tracking(),
                    false,
                );
                let (inner_doc, _errors) = inner.run();
                let declared = inner_doc
                    .children(inner_doc.root())
                    .iter()
                    .copied()
                    .find(|&node| inner_doc.is_element(node));
                if let Some(declared) = declared {
                    let name = self
                        .core
                        .settings
                        .normalize_tag(inner_doc.normal_name(declared));
                    let attrs = inner_doc.attributes(declared).cloned().unwrap_or_default();
                    let node = self.core.doc.new_xml_declaration(
                        name,
                        data.starts_with('!'),
                        attrs,
                    );
                    self.insert_node(node, span);
                    return;
                }
            }
        }
        let node = self.core.doc.new_comment(comment_token.data.clone());
        self.insert_node(node, span);
    }

    pub(crate) fn insert_character(&mut self, character_token: &CharacterToken) {
        let data = character_token.data.clone();
        let node = if character_token.cdata {
            self.core.doc.new_cdata(data)
        } else {
            self.core.doc.new_text(data)
        };
        self.insert_node(
            node,
            Some((character_token.start_pos, character_token.end_pos)),
        );
    }

    pub(crate) fn insert_doctype(&mut self, d: &DoctypeToken) {
        let name = self.core.settings.normalize_tag(&d.name);
        let node = self.core.doc.new_doctype(
            name,
            d.pub_sys_key.clone(),
            d.public_identifier.clone(),
            d.system_identifier.clone(),
        );
        self.insert_node(node, Some((d.start_pos, d.end_pos)));
    }

    /// If the stack contains an element with this tag's name, pops up the
    /// stack to remove the first occurrence. If not found, skips.
    fn pop_stack_to_close(&mut self, end_tag: &TagToken) {
        // matches on the as-written tag name; xml is case sensitive
        let el_name = end_tag.name();
        let bottom = self.core.stack.len();
        let upper = bottom.saturating_sub(MAX_QUEUE_DEPTH);
        let found = self.core.stack[upper..]
            .iter()
            .rposition(|&el| {
                self.core
                    .doc
                    .tag(el)
                    .map(|tag| tag.name() == el_name)
                    .unwrap_or(false)
            })
            .map(|pos| upper + pos);
        let Some(found) = found else {
            return; // not found, skip
        };
        let span = self.core.current_token_span();
        self.core.stack.truncate(found + 1);
        if let Some(popped) = self.core.stack.pop() {
            self.core.on_node_closed(popped, span);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Document {
        let builder = XmlTreeBuilder::new(
            input,
            "",
            ParseSettings::PRESERVE_CASE,
            ParseErrorList::no_tracking(),
            false,
        );
        let (doc, _errors) = builder.run();
        doc
    }

    #[test]
    fn no_implied_structure() {
        let doc = parse("<one src='/foo'>Hello<two><three/></two></one>");
        assert_eq!(
            doc.html(),
            "<one src=\"/foo\">Hello<two><three /></two></one>"
        );
    }

    #[test]
    fn case_is_preserved() {
        let doc = parse("<CHECK>One</CHECK><TEST ID=1>Check</TEST>");
        assert_eq!(
            doc.html(),
            "<CHECK>One</CHECK><TEST ID=\"1\">Check</TEST>"
        );
    }

    #[test]
    fn xml_declaration_is_recognised() {
        let doc = parse("<?xml version='1.0' encoding='UTF-8'?><val>One</val>");
        assert_eq!(
            doc.html(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><val>One</val>"
        );
    }

    #[test]
    fn multibyte_final_declaration_completes() {
        // the trailing char of a declaration is trimmed by char
        // boundary, not byte offset
        let doc = parse("<?\u{e9}>");
        assert_eq!(doc.html(), "<!--?\u{e9}-->");

        let doc = parse("<?xml-stylesheet href='\u{e9}'?><val>One</val>");
        assert_eq!(
            doc.html(),
            "<?xml-stylesheet href=\"\u{e9}\"?><val>One</val>"
        );
    }

    #[test]
    fn mismatched_close_is_skipped() {
        let doc = parse("<doc><val>One<val>Two</val></bar>Three</doc>");
        assert_eq!(
            doc.html(),
            "<doc><val>One<val>Two</val>Three</val></doc>"
        );
    }

    #[test]
    fn doctype_is_kept() {
        let doc = parse("<!DOCTYPE html><p>One</p>");
        assert_eq!(doc.html(), "<!doctype html><p>One</p>");
    }

    #[test]
    fn comments_and_cdata() {
        let doc = parse("<data><!-- note --><![CDATA[x < y]]></data>");
        assert_eq!(doc.html(), "<data><!-- note --><![CDATA[x < y]]></data>");
    }
}
