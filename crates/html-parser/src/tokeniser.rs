//! Reads the input stream into tokens.

use crate::character_reader::CharacterReader;
use crate::parse_error::{ParseError, ParseErrorList};
use crate::token::{
    CharacterToken, CommentToken, DoctypeToken, EofToken, TagToken, Token, UNSET,
};
use crate::tokeniser_state::TokeniserState;

/// Replaces the null character in emitted data.
pub(crate) const REPLACEMENT_CHAR: char = '\u{FFFD}';

// Characters that terminate a character-reference scan before it starts.
// Sorted for binary search.
const NOT_CHAR_REF_CHARS_SORTED: &[u8] = &[b'\t', b'\n', b'\x0C', b'\r', b' ', b'&', b'<'];

// Some illegal character escapes are parsed by browsers as windows-1252
// instead.
// https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state
const WIN1252_EXTENSIONS_START: u32 = 0x80;
const WIN1252_EXTENSIONS: [u32; 32] = [
    0x20AC, 0x0081, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, //
    0x02C6, 0x2030, 0x0160, 0x2039, 0x0152, 0x008D, 0x017D, 0x008F, //
    0x0090, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, //
    0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x009D, 0x017E, 0x0178,
];

pub struct Tokeniser {
    pub(crate) reader: CharacterReader,
    pub(crate) errors: ParseErrorList,
    state: TokeniserState,
    // the token we are about to emit on next read
    emit_pending: Option<Token>,
    // buffers characters to output as one token for a run of emits
    chars_builder: String,
    char_pending_start: usize,
    char_pending_end: usize,
    // buffers data looking for </script>
    pub(crate) data_buffer: String,
    // the tag we are building up: start or end pending
    pub(crate) tag_pending: TagToken,
    pub(crate) tag_pending_start: bool,
    pub(crate) doctype_pending: DoctypeToken,
    pub(crate) comment_pending: CommentToken,
    // the last start tag emitted, to test appropriate end tags
    last_start_tag: Option<String>,
    // "</" + lastStartTag, so we can quickly check for it in RCData
    last_start_close_seq: Option<String>,
    // reader pos at the start of markup / characters, updated on state
    // transition
    markup_start_pos: usize,
    char_start_pos: usize,
}

impl Tokeniser {
    pub fn new(reader: CharacterReader, errors: ParseErrorList) -> Tokeniser {
        Tokeniser {
            reader,
            errors,
            state: TokeniserState::DATA,
            emit_pending: None,
            chars_builder: String::with_capacity(1024),
            char_pending_start: UNSET,
            char_pending_end: UNSET,
            data_buffer: String::with_capacity(1024),
            tag_pending: TagToken::default(),
            tag_pending_start: true,
            doctype_pending: DoctypeToken::default(),
            comment_pending: CommentToken::default(),
            last_start_tag: None,
            last_start_close_seq: None,
            markup_start_pos: 0,
            char_start_pos: UNSET,
        }
    }

    pub fn state(&self) -> TokeniserState {
        self.state
    }

    /// Runs state transitions until one token is ready, and returns it.
    /// Buffered character runs flush as a single token before any
    /// pending non-character token.
    pub fn read(&mut self) -> Token {
        while self.emit_pending.is_none() {
            let state = self.state;
            state.read(self);
        }

        // a non-character token was found: return any chars in buffer,
        // and leave the token for the next read
        if !self.chars_builder.is_empty() {
            let data = std::mem::take(&mut self.chars_builder);
            let mut token = CharacterToken::new(data);
            token.start_pos = self.char_pending_start;
            token.end_pos = self.char_pending_end;
            return Token::Character(token);
        }

        self.emit_pending.take().expect("token pending")
    }

    pub(crate) fn emit(&mut self, mut token: Token) {
        debug_assert!(self.emit_pending.is_none(), "emit with token already pending");
        if token.start_pos() == UNSET {
            token.set_start_pos(self.markup_start_pos);
        }
        token.set_end_pos(self.reader.pos());
        self.char_start_pos = UNSET;

        match &token {
            Token::StartTag(tag) => {
                self.last_start_tag = Some(tag.name().to_string());
                self.last_start_close_seq = None; // only lazy inits
            }
            Token::EndTag(tag) => {
                if tag.has_attributes() {
                    let msg = format!(
                        "Attributes incorrectly present on end tag [/{}]",
                        tag.normal_name()
                    );
                    self.error_msg(msg);
                }
            }
            _ => {}
        }
        self.emit_pending = Some(token);
    }

    /// Buffers characters up until the last string token found, to emit
    /// only one token for a run of character refs etc.
    pub(crate) fn emit_str(&mut self, s: &str) {
        self.chars_builder.push_str(s);
        self.char_pending_start = self.char_start_pos;
        self.char_pending_end = self.reader.pos();
    }

    pub(crate) fn emit_char(&mut self, c: char) {
        self.chars_builder.push(c);
        self.char_pending_start = self.char_start_pos;
        self.char_pending_end = self.reader.pos();
    }

    pub(crate) fn emit_codepoints(&mut self, codepoints: &[char]) {
        for &c in codepoints {
            self.chars_builder.push(c);
        }
        self.char_pending_start = self.char_start_pos;
        self.char_pending_end = self.reader.pos();
    }

    pub(crate) fn transition(&mut self, new_state: TokeniserState) {
        // track markup / data positions on state transitions
        match new_state {
            TokeniserState::TAG_OPEN => self.markup_start_pos = self.reader.pos(),
            TokeniserState::DATA => {
                // don't reset when jumping between e.g. data -> char ref -> data
                if self.char_start_pos == UNSET {
                    self.char_start_pos = self.reader.pos();
                }
            }
            _ => {}
        }
        self.state = new_state;
    }

    pub(crate) fn advance_transition(&mut self, new_state: TokeniserState) {
        self.transition(new_state);
        self.reader.advance();
    }

    /// Consumes a character reference at the cursor (the `&` itself has
    /// been consumed), returning the decoded codepoint(s), or `None`
    /// with the cursor rewound when the text is not a reference.
    pub(crate) fn consume_character_reference(
        &mut self,
        additional_allowed_character: Option<char>,
        in_attribute: bool,
    ) -> Option<Vec<char>> {
        if self.reader.is_empty() {
            return None;
        }
        if additional_allowed_character == Some(self.reader.current()) {
            return None;
        }
        if self.reader.matches_any_sorted(NOT_CHAR_REF_CHARS_SORTED) {
            return None;
        }
        self.reader.mark_pos();
        if self.reader.match_consume("#") {
            // numbered
            let is_hex_mode = self.reader.match_consume_ignore_case("X");
            let num_ref = if is_hex_mode {
                self.reader.consume_hex_sequence()
            } else {
                self.reader.consume_digit_sequence()
            };
            if num_ref.is_empty() {
                // didn't match anything
                self.char_ref_error("numeric reference with no numerals".to_string());
                self.reader.rewind_to_mark();
                return None;
            }
            self.reader.unmark();
            if !self.reader.match_consume(";") {
                self.char_ref_error(format!("missing semicolon on [&#{num_ref}]"));
            }
            let base = if is_hex_mode { 16 } else { 10 };
            let charval = u32::from_str_radix(&num_ref, base).ok();
            match charval {
                None | Some(0xD800..=0xDFFF) => {
                    self.char_ref_error("character outside of valid range".to_string());
                    Some(vec![REPLACEMENT_CHAR])
                }
                Some(charval) if charval > 0x10FFFF => {
                    self.char_ref_error("character outside of valid range".to_string());
                    Some(vec![REPLACEMENT_CHAR])
                }
                Some(mut charval) => {
                    // fix illegal unicode characters to match browser behavior
                    if (WIN1252_EXTENSIONS_START
                        ..WIN1252_EXTENSIONS_START + WIN1252_EXTENSIONS.len() as u32)
                        .contains(&charval)
                    {
                        self.char_ref_error(format!(
                            "character [{charval}] is not a valid unicode code point"
                        ));
                        charval = WIN1252_EXTENSIONS[(charval - WIN1252_EXTENSIONS_START) as usize];
                    }
                    Some(vec![char::from_u32(charval).unwrap_or(REPLACEMENT_CHAR)])
                }
            }
        } else {
            // named: get as many letters as possible, and look for
            // matching entities
            let name_ref = self.reader.consume_letter_then_digit_sequence();
            let looks_legit = self.reader.matches(';');
            // found if a base named entity without a ;, or an extended
            // entity with the ;
            let found = entities::is_base_named_entity(&name_ref)
                || (entities::is_named_entity(&name_ref) && looks_legit);
            if !found {
                self.reader.rewind_to_mark();
                if looks_legit {
                    // named with semicolon
                    self.char_ref_error(format!("invalid named reference [{name_ref}]"));
                }
                return None;
            }
            if in_attribute
                && (self.reader.matches_letter()
                    || self.reader.matches_digit()
                    || self.reader.matches_any(&['=', '-', '_']))
            {
                // don't want that to match
                self.reader.rewind_to_mark();
                return None;
            }
            self.reader.unmark();
            if !self.reader.match_consume(";") {
                self.char_ref_error(format!("missing semicolon on [&{name_ref}]"));
            }
            let mut codepoints = [0u32; 2];
            let count = entities::codepoints_for_name(&name_ref, &mut codepoints);
            debug_assert!(count > 0, "unexpected characters returned for {name_ref}");
            Some(
                codepoints[..count]
                    .iter()
                    .map(|&cp| char::from_u32(cp).unwrap_or(REPLACEMENT_CHAR))
                    .collect(),
            )
        }
    }

    pub(crate) fn create_tag_pending(&mut self, start: bool) -> &mut TagToken {
        self.tag_pending = TagToken::default();
        self.tag_pending_start = start;
        &mut self.tag_pending
    }

    pub(crate) fn emit_tag_pending(&mut self) {
        self.tag_pending.finalise_tag();
        let tag = std::mem::take(&mut self.tag_pending);
        if self.tag_pending_start {
            self.emit(Token::StartTag(tag));
        } else {
            self.emit(Token::EndTag(tag));
        }
    }

    pub(crate) fn create_comment_pending(&mut self) {
        self.comment_pending = CommentToken::default();
    }

    pub(crate) fn create_bogus_comment_pending(&mut self) {
        self.comment_pending = CommentToken::default();
        self.comment_pending.bogus = true;
    }

    pub(crate) fn emit_comment_pending(&mut self) {
        let comment = std::mem::take(&mut self.comment_pending);
        self.emit(Token::Comment(comment));
    }

    pub(crate) fn create_doctype_pending(&mut self) {
        self.doctype_pending = DoctypeToken::default();
    }

    pub(crate) fn emit_doctype_pending(&mut self) {
        let doctype = std::mem::take(&mut self.doctype_pending);
        self.emit(Token::Doctype(doctype));
    }

    pub(crate) fn emit_eof(&mut self) {
        self.emit(Token::Eof(EofToken::default()));
    }

    pub(crate) fn create_temp_buffer(&mut self) {
        self.data_buffer.clear();
    }

    /// Does the pending end tag match the last emitted start tag?
    pub(crate) fn is_appropriate_end_tag_token(&self) -> bool {
        match &self.last_start_tag {
            Some(last) => self.tag_pending.name().eq_ignore_ascii_case(last),
            None => false,
        }
    }

    pub(crate) fn appropriate_end_tag_name(&self) -> Option<&str> {
        self.last_start_tag.as_deref()
    }

    /// The closer sequence `</lastStart`.
    pub(crate) fn appropriate_end_tag_seq(&mut self) -> String {
        if self.last_start_close_seq.is_none() {
            // reset on start tag emit
            self.last_start_close_seq = Some(format!(
                "</{}",
                self.last_start_tag.as_deref().unwrap_or("")
            ));
        }
        self.last_start_close_seq.clone().unwrap_or_default()
    }

    pub(crate) fn error_state(&mut self, state: TokeniserState) {
        if self.errors.can_add_error() {
            let msg = format!(
                "Unexpected character '{}' in input state [{state:?}]",
                self.reader.current()
            );
            let err = ParseError::new(self.reader.pos(), msg);
            self.errors.add(err);
        }
    }

    pub(crate) fn eof_error(&mut self, state: TokeniserState) {
        if self.errors.can_add_error() {
            let msg =
                format!("Unexpectedly reached end of file (EOF) in input state [{state:?}]");
            let err = ParseError::new(self.reader.pos(), msg);
            self.errors.add(err);
        }
    }

    fn char_ref_error(&mut self, msg: String) {
        if self.errors.can_add_error() {
            let err = ParseError::new(
                self.reader.pos(),
                format!("Invalid character reference: {msg}"),
            );
            self.errors.add(err);
        }
    }

    pub(crate) fn error_msg(&mut self, msg: impl Into<String>) {
        if self.errors.can_add_error() {
            let err = ParseError::new(self.reader.pos(), msg);
            self.errors.add(err);
        }
    }

    /// Consumes the rest of the reader, unescaping entities found within.
    pub(crate) fn unescape_entities(&mut self, in_attribute: bool) -> String {
        let mut builder = String::new();
        while !self.reader.is_empty() {
            builder.push_str(&self.reader.consume_to('&'));
            if self.reader.matches('&') {
                self.reader.consume();
                match self.consume_character_reference(None, in_attribute) {
                    Some(chars) if !chars.is_empty() => builder.extend(chars),
                    _ => builder.push('&'),
                }
            }
        }
        builder
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokeniser(input: &str) -> Tokeniser {
        Tokeniser::new(
            CharacterReader::new(input),
            ParseErrorList::tracking(10),
        )
    }

    fn read_all(input: &str) -> Vec<Token> {
        let mut t = tokeniser(input);
        let mut tokens = Vec::new();
        loop {
            let token = t.read();
            let eof = token.is_eof();
            tokens.push(token);
            if eof {
                break;
            }
        }
        tokens
    }

    #[test]
    fn character_runs_coalesce() {
        let tokens = read_all("one &amp; two");
        assert_eq!(tokens.len(), 2);
        match &tokens[0] {
            Token::Character(c) => assert_eq!(c.data, "one & two"),
            other => panic!("expected character token, got {}", other.token_type()),
        }
        assert!(tokens[1].is_eof());
    }

    #[test]
    fn simple_tags() {
        let tokens = read_all("<p class=x>Hi</p>");
        assert_eq!(tokens.len(), 4);
        match &tokens[0] {
            Token::StartTag(tag) => {
                assert_eq!(tag.normal_name(), "p");
                assert_eq!(tag.attribute("class"), Some("x"));
            }
            other => panic!("expected start tag, got {}", other.token_type()),
        }
        assert!(tokens[1].is_character());
        assert!(tokens[2].is_end_tag());
    }

    #[test]
    fn numeric_references() {
        for input in ["&#38;", "&#x26;", "&#X26;"] {
            let mut t = tokeniser(input);
            let token = t.read();
            match token {
                Token::Character(c) => assert_eq!(c.data, "&", "for {input}"),
                other => panic!("expected character token, got {}", other.token_type()),
            }
        }
    }

    #[test]
    fn numeric_reference_out_of_range() {
        let mut t = tokeniser("&#x110000;");
        match t.read() {
            Token::Character(c) => assert_eq!(c.data, "\u{FFFD}"),
            other => panic!("expected character token, got {}", other.token_type()),
        }
        assert_eq!(t.errors.len(), 1);
    }

    #[test]
    fn win1252_remapping() {
        // &#128; is remapped to the euro sign, as browsers do
        let mut t = tokeniser("&#128;");
        match t.read() {
            Token::Character(c) => assert_eq!(c.data, "\u{20AC}"),
            other => panic!("expected character token, got {}", other.token_type()),
        }
    }

    #[test]
    fn unknown_named_reference_is_literal() {
        let tokens = read_all("&notareference; x");
        match &tokens[0] {
            Token::Character(c) => assert_eq!(c.data, "&notareference; x"),
            other => panic!("expected character token, got {}", other.token_type()),
        }
    }

    #[test]
    fn base_entity_without_semicolon() {
        let tokens = read_all("fish &amp chips");
        match &tokens[0] {
            Token::Character(c) => assert_eq!(c.data, "fish & chips"),
            other => panic!("expected character token, got {}", other.token_type()),
        }
    }

    #[test]
    fn multipoint_entity() {
        let tokens = read_all("&NotEqualTilde;");
        match &tokens[0] {
            Token::Character(c) => assert_eq!(c.data, "\u{2242}\u{338}"),
            other => panic!("expected character token, got {}", other.token_type()),
        }
    }

    #[test]
    fn end_tag_attributes_error() {
        let mut t = tokeniser("</div class=x>");
        let token = t.read();
        assert!(token.is_end_tag());
        assert_eq!(t.errors.len(), 1);
        assert!(t.errors[0].msg().contains("end tag"));
    }

    #[test]
    fn unescape_entities() {
        let mut t = tokeniser("One &amp; Two &lt;3&gt;");
        assert_eq!(t.unescape_entities(false), "One & Two <3>");
    }

    #[test]
    fn ambiguous_attribute_entity_not_decoded() {
        // &amp without ; followed by = must stay literal in attributes
        let mut t = tokeniser("One &amp=2");
        assert_eq!(t.unescape_entities(true), "One &amp=2");

        let mut t = tokeniser("One &amp;=2");
        assert_eq!(t.unescape_entities(true), "One &=2");
    }
}
