//! State shared by the HTML and XML tree builders: the tokeniser, the
//! document under construction, the stack of open elements, and source
//! position bookkeeping.

use rustc_hash::FxHashMap;

use crate::character_reader::CharacterReader;
use crate::dom::{Document, NodeId, Position};
use crate::parse_error::{ParseError, ParseErrorList};
use crate::settings::ParseSettings;
use crate::tag::Tag;
use crate::token::{Token, UNSET};
use crate::tokeniser::Tokeniser;

pub(crate) struct TreeBuilderCore {
    pub(crate) tokeniser: Tokeniser,
    pub(crate) doc: Document,
    // the stack of open elements
    pub(crate) stack: Vec<NodeId>,
    // current base uri, for creating new elements
    pub(crate) base_uri: String,
    pub(crate) settings: ParseSettings,
    // retained only for error messages and close-position tracking
    pub(crate) current_token: Option<Token>,
    // tags seen in this parse; saves re-deriving properties for repeats
    seen_tags: FxHashMap<String, Tag>,
    track_source_range: bool,
    // only snapshot tokens when errors or ranges need them
    pub(crate) track_tokens: bool,
}

impl TreeBuilderCore {
    pub(crate) fn new(
        input: &str,
        base_uri: &str,
        settings: ParseSettings,
        errors: ParseErrorList,
        track_source_range: bool,
    ) -> TreeBuilderCore {
        let track_errors = errors.max_size() > 0;
        let mut reader = CharacterReader::new(input);
        // newline tracking gives errors and ranges legible line numbers
        reader.track_newlines(track_errors || track_source_range);
        TreeBuilderCore {
            tokeniser: Tokeniser::new(reader, errors),
            doc: Document::new(base_uri),
            stack: Vec::with_capacity(32),
            base_uri: base_uri.to_string(),
            settings,
            current_token: None,
            seen_tags: FxHashMap::default(),
            track_source_range,
            track_tokens: track_errors || track_source_range,
        }
    }

    /// Snapshots the token under process, for error messages and close
    /// position tracking. Skipped entirely when neither is enabled.
    pub(crate) fn remember_token(&mut self, token: &Token) {
        if self.track_tokens {
            self.current_token = Some(token.clone());
        }
    }

    /// The source span of the token under process, if one was captured.
    pub(crate) fn current_token_span(&self) -> Option<(usize, usize)> {
        self.current_token
            .as_ref()
            .map(|t| (t.start_pos(), t.end_pos()))
    }

    /// The current element (last on the stack), or the document if the
    /// stack has emptied.
    pub(crate) fn current_element(&self) -> NodeId {
        match self.stack.last() {
            Some(&el) => el,
            None => self.doc.root(),
        }
    }

    /// Does the current element's normal name equal the supplied name?
    /// False when the stack is empty.
    pub(crate) fn current_element_is(&self, normal_name: &str) -> bool {
        match self.stack.last() {
            Some(&el) => self.doc.normal_name(el) == normal_name,
            None => false,
        }
    }

    /// Gets a Tag for the name, via a per-parse cache. The cache key is
    /// not normalized; `Tag::value_of` normalizes per the settings.
    pub(crate) fn tag_for(&mut self, tag_name: &str, settings: &ParseSettings) -> Tag {
        if let Some(tag) = self.seen_tags.get(tag_name) {
            return tag.clone();
        }
        let tag = Tag::value_of(tag_name, settings);
        self.seen_tags.insert(tag_name.to_string(), tag.clone());
        tag
    }

    /// If the parser is tracking errors, adds an error at the current
    /// read position.
    pub(crate) fn error(&mut self, msg: impl Into<String>) {
        if self.tokeniser.errors.can_add_error() {
            let pos = self.tokeniser.reader.pos();
            self.tokeniser.errors.add(ParseError::new(pos, msg));
        }
    }

    pub(crate) fn on_node_inserted(&mut self, node: NodeId, span: Option<(usize, usize)>) {
        self.track_node_position(node, span, true);
    }

    pub(crate) fn on_node_closed(&mut self, node: NodeId, span: Option<(usize, usize)>) {
        self.track_node_position(node, span, false);
    }

    fn track_node_position(&mut self, node: NodeId, span: Option<(usize, usize)>, start: bool) {
        if !self.track_source_range {
            return;
        }
        let Some((start_pos, end_pos)) = span else {
            return;
        };
        if start_pos == UNSET {
            return; // untracked, virtual token
        }
        if start {
            let at = self.position_of(start_pos);
            self.doc.set_range_start(node, at);
        }
        let at = self.position_of(end_pos);
        self.doc.set_range_end(node, at);
    }

    fn position_of(&self, pos: usize) -> Position {
        Position {
            pos,
            line: self.tokeniser.reader.line_number_at(pos),
            col: self.tokeniser.reader.column_number_at(pos),
        }
    }
}

/// Membership test against a sorted name table.
pub(crate) fn in_sorted(name: &str, sorted: &[&str]) -> bool {
    sorted.binary_search(&name).is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    fn core(input: &str) -> TreeBuilderCore {
        TreeBuilderCore::new(
            input,
            "",
            ParseSettings::HTML_DEFAULT,
            ParseErrorList::no_tracking(),
            false,
        )
    }

    #[test]
    fn current_element_falls_back_to_doc() {
        let mut c = core("<div>");
        assert_eq!(c.current_element(), c.doc.root());
        assert!(!c.current_element_is("div"));

        let tag = c.tag_for("div", &ParseSettings::HTML_DEFAULT);
        let el = c.doc.new_element(tag, Default::default());
        let root = c.doc.root();
        c.doc.append_child(root, el);
        c.stack.push(el);
        assert_eq!(c.current_element(), el);
        assert!(c.current_element_is("div"));
    }

    #[test]
    fn tag_cache_preserves_given_case() {
        let mut c = core("");
        let first = c.tag_for("DIV", &ParseSettings::HTML_DEFAULT);
        let second = c.tag_for("DIV", &ParseSettings::HTML_DEFAULT);
        assert_eq!(first, second);
        assert_eq!(first.normal_name(), "div");
    }

    #[test]
    fn errors_respect_tracking_limit() {
        let mut c = TreeBuilderCore::new(
            "",
            "",
            ParseSettings::HTML_DEFAULT,
            ParseErrorList::tracking(1),
            false,
        );
        c.error("one");
        c.error("two");
        assert_eq!(c.tokeniser.errors.len(), 1);
    }
}
