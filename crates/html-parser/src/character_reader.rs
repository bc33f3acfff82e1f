//! A rewindable character cursor over the document source.
//!
//! The reader holds the full input as UTF-8 and exposes a byte-offset
//! cursor with single-slot mark/rewind, lookahead predicates, and
//! specialized consume fast paths driven by `memchr`. Every delimiter
//! the scanners stop at is ASCII, so byte scanning never lands inside a
//! multi-byte sequence.
//!
//! Short consumed spans are interned through a small fixed-size cache so
//! repeated tag and attribute names share one allocation. Newline
//! tracking is opt-in; when enabled, line and column lookups are a
//! binary search over the recorded newline offsets.

use std::rc::Rc;

use crate::dom::Position;

/// Distinguished end-of-input sentinel; never a valid content character.
pub const EOF: char = '\u{FFFF}';

const STRING_CACHE_SIZE: usize = 512;
const MAX_STRING_CACHE_LEN: usize = 12;

pub struct CharacterReader {
    input: Box<str>,
    pos: usize,
    mark: Option<usize>,
    string_cache: Vec<Option<Rc<str>>>,
    newline_positions: Option<Vec<usize>>,
    // single-entry cache for repeated containsIgnoreCase scans, which
    // would otherwise be quadratic on inputs like <title>a<p<p<p...
    last_ic_seq: Option<Box<str>>,
    last_ic_index: Option<usize>,
}

impl CharacterReader {
    pub fn new(input: &str) -> CharacterReader {
        CharacterReader {
            input: Box::from(input),
            pos: 0,
            mark: None,
            string_cache: vec![None; STRING_CACHE_SIZE],
            newline_positions: None,
            last_ic_seq: None,
            last_ic_index: None,
        }
    }

    /// Enables or disables newline tracking. Enabling scans the input
    /// once; it is off by default because most parses never ask for
    /// line/column info.
    pub fn track_newlines(&mut self, track: bool) {
        if track && self.newline_positions.is_none() {
            let positions = memchr::memchr_iter(b'\n', self.input.as_bytes()).collect();
            self.newline_positions = Some(positions);
        } else if !track {
            self.newline_positions = None;
        }
    }

    pub fn is_tracking_newlines(&self) -> bool {
        self.newline_positions.is_some()
    }

    /// Absolute byte offset of the cursor.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// 1-based line number at the cursor; 1 when tracking is disabled.
    pub fn line_number(&self) -> usize {
        self.line_number_at(self.pos)
    }

    pub fn line_number_at(&self, pos: usize) -> usize {
        match &self.newline_positions {
            None => 1,
            Some(newlines) => {
                let before = match newlines.binary_search(&pos) {
                    Ok(i) | Err(i) => i,
                };
                before + 1
            }
        }
    }

    /// 1-based column at the cursor; `pos + 1` when tracking is disabled.
    pub fn column_number(&self) -> usize {
        self.column_number_at(self.pos)
    }

    pub fn column_number_at(&self, pos: usize) -> usize {
        match &self.newline_positions {
            None => pos + 1,
            Some(newlines) => {
                let before = match newlines.binary_search(&pos) {
                    Ok(i) | Err(i) => i,
                };
                if before == 0 {
                    pos + 1
                } else {
                    pos - newlines[before - 1]
                }
            }
        }
    }

    /// The cursor as a tracked source position.
    pub fn cursor_pos(&self) -> Position {
        Position {
            pos: self.pos,
            line: self.line_number(),
            col: self.column_number(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The character at the cursor, without advancing. EOF past the end.
    pub fn current(&self) -> char {
        if self.is_empty() {
            EOF
        } else {
            self.char_at(self.pos)
        }
    }

    pub fn consume(&mut self) -> char {
        if self.is_empty() {
            return EOF;
        }
        let c = self.char_at(self.pos);
        self.pos += c.len_utf8();
        c
    }

    /// Steps back exactly one character. Only valid right after a
    /// `consume()`.
    pub fn unconsume(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
            while self.pos > 0 && !self.input.is_char_boundary(self.pos) {
                self.pos -= 1;
            }
        }
    }

    /// Steps forward one character without reading it.
    pub fn advance(&mut self) {
        if !self.is_empty() {
            let c = self.char_at(self.pos);
            self.pos += c.len_utf8();
        }
    }

    pub fn mark_pos(&mut self) {
        self.mark = Some(self.pos);
    }

    pub fn unmark(&mut self) {
        self.mark = None;
    }

    pub fn rewind_to_mark(&mut self) {
        debug_assert!(self.mark.is_some(), "rewind with no mark set");
        if let Some(mark) = self.mark.take() {
            self.pos = mark;
        }
    }

    /// Offset of the next occurrence of `c` at or after the cursor.
    pub fn next_index_of(&self, c: char) -> Option<usize> {
        let bytes = self.input.as_bytes();
        if c.is_ascii() {
            memchr::memchr(c as u8, &bytes[self.pos..]).map(|i| self.pos + i)
        } else {
            self.input[self.pos..].find(c).map(|i| self.pos + i)
        }
    }

    /// Offset of the next occurrence of `seq` at or after the cursor.
    pub fn next_index_of_seq(&self, seq: &str) -> Option<usize> {
        let first = *seq.as_bytes().first()?;
        let bytes = self.input.as_bytes();
        let mut start = self.pos;
        while start < bytes.len() {
            let found = memchr::memchr(first, &bytes[start..])? + start;
            if bytes.len() - found >= seq.len() && &bytes[found..found + seq.len()] == seq.as_bytes()
            {
                return Some(found);
            }
            start = found + 1;
        }
        None
    }

    /// Consumes up to, but not including, the next occurrence of `c`;
    /// to the end if `c` never occurs.
    pub fn consume_to(&mut self, c: char) -> Rc<str> {
        match self.next_index_of(c) {
            Some(ix) => {
                let consumed = self.cache_string(self.pos, ix);
                self.pos = ix;
                consumed
            }
            None => self.consume_to_end(),
        }
    }

    pub fn consume_to_seq(&mut self, seq: &str) -> Rc<str> {
        match self.next_index_of_seq(seq) {
            Some(ix) => {
                let consumed = self.cache_string(self.pos, ix);
                self.pos = ix;
                consumed
            }
            None => self.consume_to_end(),
        }
    }

    pub fn consume_to_any(&mut self, chars: &[char]) -> Rc<str> {
        let start = self.pos;
        while !self.is_empty() {
            let c = self.char_at(self.pos);
            if chars.contains(&c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.cache_string(start, self.pos)
    }

    /// Consumes up to any byte in the sorted ASCII set, binary searching
    /// each position.
    pub fn consume_to_any_sorted(&mut self, sorted: &[u8]) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b < 0x80 && sorted.binary_search(&b).is_ok() {
                break;
            }
            self.pos += 1;
        }
        self.cache_string(start, self.pos)
    }

    /// Data-state run: stops at `&`, `<` or NUL.
    pub fn consume_data(&mut self) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        self.pos = match memchr::memchr3(b'&', b'<', 0, &bytes[start..]) {
            Some(i) => start + i,
            None => bytes.len(),
        };
        self.cache_string(start, self.pos)
    }

    /// Rawtext run: stops at `<` or NUL.
    pub fn consume_raw_data(&mut self) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        self.pos = match memchr::memchr2(b'<', 0, &bytes[start..]) {
            Some(i) => start + i,
            None => bytes.len(),
        };
        self.cache_string(start, self.pos)
    }

    /// Tag-name run: stops at whitespace, `/`, `<`, `>` or NUL.
    pub fn consume_tag_name(&mut self) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\t' | b'\n' | b'\r' | b'\x0C' | b' ' | b'/' | b'<' | b'>' | 0 => break,
                _ => self.pos += 1,
            }
        }
        self.cache_string(start, self.pos)
    }

    /// Quoted attribute value run: stops at the quote, `&` or NUL.
    pub fn consume_attribute_quoted(&mut self, single: bool) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let quote = if single { b'\'' } else { b'"' };
        self.pos = match memchr::memchr3(quote, b'&', 0, &bytes[start..]) {
            Some(i) => start + i,
            None => bytes.len(),
        };
        self.cache_string(start, self.pos)
    }

    pub fn consume_to_end(&mut self) -> Rc<str> {
        let consumed = self.cache_string(self.pos, self.input.len());
        self.pos = self.input.len();
        consumed
    }

    pub fn consume_letter_sequence(&mut self) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_alphabetic() {
                self.pos += 1;
            } else if b >= 0x80 {
                let c = self.char_at(self.pos);
                if c.is_alphabetic() {
                    self.pos += c.len_utf8();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        self.cache_string(start, self.pos)
    }

    pub fn consume_letter_then_digit_sequence(&mut self) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_alphabetic() {
                self.pos += 1;
            } else if b >= 0x80 {
                let c = self.char_at(self.pos);
                if c.is_alphabetic() {
                    self.pos += c.len_utf8();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        self.cache_string(start, self.pos)
    }

    pub fn consume_hex_sequence(&mut self) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_hexdigit() {
            self.pos += 1;
        }
        self.cache_string(start, self.pos)
    }

    pub fn consume_digit_sequence(&mut self) -> Rc<str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        self.cache_string(start, self.pos)
    }

    pub fn matches(&self, c: char) -> bool {
        !self.is_empty() && self.char_at(self.pos) == c
    }

    pub fn matches_seq(&self, seq: &str) -> bool {
        self.input[self.pos..].starts_with(seq)
    }

    /// Case-insensitive prefix match; `seq` must be ASCII.
    pub fn matches_ignore_case(&self, seq: &str) -> bool {
        let bytes = self.input.as_bytes();
        bytes.len() - self.pos >= seq.len()
            && bytes[self.pos..self.pos + seq.len()].eq_ignore_ascii_case(seq.as_bytes())
    }

    pub fn matches_any(&self, chars: &[char]) -> bool {
        !self.is_empty() && chars.contains(&self.char_at(self.pos))
    }

    /// Binary search over a sorted ASCII byte set.
    pub fn matches_any_sorted(&self, sorted: &[u8]) -> bool {
        if self.is_empty() {
            return false;
        }
        let b = self.input.as_bytes()[self.pos];
        b < 0x80 && sorted.binary_search(&b).is_ok()
    }

    pub fn matches_ascii_alpha(&self) -> bool {
        !self.is_empty() && self.input.as_bytes()[self.pos].is_ascii_alphabetic()
    }

    pub fn matches_letter(&self) -> bool {
        !self.is_empty() && self.char_at(self.pos).is_alphabetic()
    }

    pub fn matches_digit(&self) -> bool {
        !self.is_empty() && self.char_at(self.pos).is_numeric()
    }

    pub fn match_consume(&mut self, seq: &str) -> bool {
        if self.matches_seq(seq) {
            self.pos += seq.len();
            true
        } else {
            false
        }
    }

    pub fn match_consume_ignore_case(&mut self, seq: &str) -> bool {
        if self.matches_ignore_case(seq) {
            self.pos += seq.len();
            true
        } else {
            false
        }
    }

    /// Does the remaining input contain `seq`, case insensitively?
    ///
    /// Scans for the all-lower then all-upper form, and caches the last
    /// query so that a repeated identical query while the cursor is
    /// before the cached hit is O(1).
    pub fn contains_ignore_case(&mut self, seq: &str) -> bool {
        if self.last_ic_seq.as_deref() == Some(seq) {
            match self.last_ic_index {
                None => return false,
                Some(ix) if ix >= self.pos => return true,
                _ => {}
            }
        }
        self.last_ic_seq = Some(Box::from(seq));
        let lo_scan = seq.to_lowercase();
        let hi_scan = seq.to_uppercase();
        let found = match (
            self.next_index_of_seq(&lo_scan),
            self.next_index_of_seq(&hi_scan),
        ) {
            (Some(lo), Some(hi)) => Some(lo.min(hi)),
            (Some(lo), None) => Some(lo),
            (None, hi) => hi,
        };
        self.last_ic_index = found;
        found.is_some()
    }

    fn char_at(&self, pos: usize) -> char {
        let b = self.input.as_bytes()[pos];
        if b < 0x80 {
            b as char
        } else {
            self.input[pos..].chars().next().unwrap_or(EOF)
        }
    }

    /// Returns the span as a shared string, interning short spans so
    /// repeated tag/attribute names share one allocation.
    fn cache_string(&mut self, start: usize, end: usize) -> Rc<str> {
        let s = &self.input[start..end];
        if s.len() > MAX_STRING_CACHE_LEN {
            return Rc::from(s);
        }
        let mut hash = 0u32;
        for &b in s.as_bytes() {
            hash = hash.wrapping_mul(31).wrapping_add(b as u32);
        }
        let index = hash as usize & (STRING_CACHE_SIZE - 1);
        match &self.string_cache[index] {
            Some(cached) if &**cached == s => Rc::clone(cached),
            _ => {
                let rc: Rc<str> = Rc::from(s);
                self.string_cache[index] = Some(Rc::clone(&rc));
                rc
            }
        }
    }
}

impl std::fmt::Debug for CharacterReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterReader")
            .field("pos", &self.pos)
            .field("len", &self.input.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn consume_and_unconsume() {
        let mut r = CharacterReader::new("one");
        assert_eq!(r.current(), 'o');
        assert_eq!(r.consume(), 'o');
        assert_eq!(r.consume(), 'n');
        r.unconsume();
        assert_eq!(r.consume(), 'n');
        assert_eq!(r.consume(), 'e');
        assert!(r.is_empty());
        assert_eq!(r.consume(), EOF);
        assert_eq!(r.consume(), EOF);
    }

    #[test]
    fn multibyte_chars() {
        let mut r = CharacterReader::new("a\u{20AC}b");
        assert_eq!(r.consume(), 'a');
        assert_eq!(r.consume(), '\u{20AC}');
        r.unconsume();
        assert_eq!(r.consume(), '\u{20AC}');
        assert_eq!(r.consume(), 'b');
    }

    #[test]
    fn consume_to() {
        let mut r = CharacterReader::new("one two three");
        assert_eq!(&*r.consume_to(' '), "one");
        assert_eq!(r.consume(), ' ');
        assert_eq!(&*r.consume_to_seq("three"), "two ");
        assert_eq!(&*r.consume_to('x'), "three");
        assert!(r.is_empty());
    }

    #[test]
    fn consume_data_stops_at_terminators() {
        let mut r = CharacterReader::new("hello &amp; <b>");
        assert_eq!(&*r.consume_data(), "hello ");
        assert_eq!(r.current(), '&');
        r.advance();
        assert_eq!(&*r.consume_data(), "amp; ");
        assert_eq!(r.current(), '<');
    }

    #[test]
    fn consume_tag_name_stops() {
        let mut r = CharacterReader::new("title>x");
        assert_eq!(&*r.consume_tag_name(), "title");
        assert_eq!(r.current(), '>');

        let mut r = CharacterReader::new("br/>");
        assert_eq!(&*r.consume_tag_name(), "br");
        assert_eq!(r.current(), '/');
    }

    #[test]
    fn mark_and_rewind() {
        let mut r = CharacterReader::new("abcdef");
        r.consume();
        r.mark_pos();
        r.consume();
        r.consume();
        r.rewind_to_mark();
        assert_eq!(r.consume(), 'b');
    }

    #[test]
    fn letter_sequences() {
        let mut r = CharacterReader::new("One&bar;");
        assert_eq!(&*r.consume_letter_sequence(), "One");
        let mut r = CharacterReader::new("frac12;");
        assert_eq!(&*r.consume_letter_then_digit_sequence(), "frac12");
        assert_eq!(r.current(), ';');
    }

    #[test]
    fn digit_and_hex_sequences() {
        let mut r = CharacterReader::new("1234x");
        assert_eq!(&*r.consume_digit_sequence(), "1234");
        let mut r = CharacterReader::new("1Fa;");
        assert_eq!(&*r.consume_hex_sequence(), "1Fa");
    }

    #[test]
    fn match_family() {
        let mut r = CharacterReader::new("DocType html");
        assert!(r.matches('D'));
        assert!(r.matches_ignore_case("doctype"));
        assert!(!r.matches_seq("doctype"));
        assert!(r.match_consume_ignore_case("DOCTYPE"));
        assert_eq!(r.current(), ' ');
        assert!(r.matches_any(&[' ', '\t']));
    }

    #[test]
    fn matches_any_sorted() {
        // tab, nl, ff, cr, space, &, <
        let sorted: &[u8] = &[b'\t', b'\n', b'\x0C', b'\r', b' ', b'&', b'<'];
        let r = CharacterReader::new("<x");
        assert!(r.matches_any_sorted(sorted));
        let r = CharacterReader::new("ax");
        assert!(!r.matches_any_sorted(sorted));
    }

    #[test]
    fn contains_ignore_case_caches() {
        let mut r = CharacterReader::new("a<p<P<p something</TITLE>");
        assert!(r.contains_ignore_case("</title"));
        // repeated query before the hit is served from the cache
        r.consume();
        assert!(r.contains_ignore_case("</title"));
        assert!(!r.contains_ignore_case("</script"));
    }

    #[test]
    fn string_interning() {
        let mut r = CharacterReader::new("div>div>div>");
        let a = r.consume_to('>');
        r.advance();
        let b = r.consume_to('>');
        assert_eq!(a, b);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn line_numbers_disabled_by_default() {
        let mut r = CharacterReader::new("a\nb\nc");
        assert_eq!(r.line_number(), 1);
        r.consume_to_end();
        assert_eq!(r.line_number(), 1);
    }

    #[test]
    fn line_and_column_tracking() {
        let mut r = CharacterReader::new("ab\ncd\nef");
        r.track_newlines(true);
        assert_eq!(r.line_number(), 1);
        assert_eq!(r.column_number(), 1);
        r.consume_to('c');
        assert_eq!(r.line_number(), 2);
        assert_eq!(r.column_number(), 1);
        r.consume();
        assert_eq!(r.column_number(), 2);
        r.consume_to('f');
        assert_eq!(r.line_number(), 3);
        assert_eq!(r.column_number(), 2);
    }
}
