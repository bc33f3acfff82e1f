//! States and transition activations for the tokeniser.

use crate::character_reader::EOF;
use crate::token::{CharacterToken, Token};
use crate::tokeniser::{Tokeniser, REPLACEMENT_CHAR};

use TokeniserState::*;

const NULL_CHAR: char = '\0';

// char searches. must be sorted, used in consume_to_any_sorted
const ATTRIBUTE_NAME_CHARS_SORTED: &[u8] = &[
    b'\t', b'\n', b'\x0C', b'\r', b' ', b'"', b'\'', b'/', b'<', b'=', b'>',
];
const ATTRIBUTE_VALUE_UNQUOTED_SORTED: &[u8] = &[
    0, b'\t', b'\n', b'\x0C', b'\r', b' ', b'"', b'&', b'\'', b'<', b'=', b'>', b'`',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokeniserState {
    DATA,
    CHARACTER_REFERENCE_IN_DATA,
    RCDATA,
    CHARACTER_REFERENCE_IN_RCDATA,
    RAWTEXT,
    SCRIPT_DATA,
    PLAINTEXT,
    TAG_OPEN,
    END_TAG_OPEN,
    TAG_NAME,
    RCDATA_LESSTHAN_SIGN,
    RCDATA_END_TAG_OPEN,
    RCDATA_END_TAG_NAME,
    RAWTEXT_LESSTHAN_SIGN,
    RAWTEXT_END_TAG_OPEN,
    RAWTEXT_END_TAG_NAME,
    SCRIPT_DATA_LESSTHAN_SIGN,
    SCRIPT_DATA_END_TAG_OPEN,
    SCRIPT_DATA_END_TAG_NAME,
    SCRIPT_DATA_ESCAPE_START,
    SCRIPT_DATA_ESCAPE_START_DASH,
    SCRIPT_DATA_ESCAPED,
    SCRIPT_DATA_ESCAPED_DASH,
    SCRIPT_DATA_ESCAPED_DASH_DASH,
    SCRIPT_DATA_ESCAPED_LESSTHAN_SIGN,
    SCRIPT_DATA_ESCAPED_END_TAG_OPEN,
    SCRIPT_DATA_ESCAPED_END_TAG_NAME,
    SCRIPT_DATA_DOUBLE_ESCAPE_START,
    SCRIPT_DATA_DOUBLE_ESCAPED,
    SCRIPT_DATA_DOUBLE_ESCAPED_DASH,
    SCRIPT_DATA_DOUBLE_ESCAPED_DASH_DASH,
    SCRIPT_DATA_DOUBLE_ESCAPED_LESSTHAN_SIGN,
    SCRIPT_DATA_DOUBLE_ESCAPE_END,
    BEFORE_ATTRIBUTE_NAME,
    ATTRIBUTE_NAME,
    AFTER_ATTRIBUTE_NAME,
    BEFORE_ATTRIBUTE_VALUE,
    ATTRIBUTE_VALUE_DOUBLE_QUOTED,
    ATTRIBUTE_VALUE_SINGLE_QUOTED,
    ATTRIBUTE_VALUE_UNQUOTED,
    AFTER_ATTRIBUTE_VALUE_QUOTED,
    SELF_CLOSING_START_TAG,
    BOGUS_COMMENT,
    MARKUP_DECLARATION_OPEN,
    COMMENT_START,
    COMMENT_START_DASH,
    COMMENT,
    COMMENT_END_DASH,
    COMMENT_END,
    COMMENT_END_BANG,
    DOCTYPE,
    BEFORE_DOCTYPE_NAME,
    DOCTYPE_NAME,
    AFTER_DOCTYPE_NAME,
    AFTER_DOCTYPE_PUBLIC_KEYWORD,
    BEFORE_DOCTYPE_PUBLIC_IDENTIFIER,
    DOCTYPE_PUBLIC_IDENTIFIER_DOUBLE_QUOTED,
    DOCTYPE_PUBLIC_IDENTIFIER_SINGLE_QUOTED,
    AFTER_DOCTYPE_PUBLIC_IDENTIFIER,
    BETWEEN_DOCTYPE_PUBLIC_AND_SYSTEM_IDENTIFIERS,
    AFTER_DOCTYPE_SYSTEM_KEYWORD,
    BEFORE_DOCTYPE_SYSTEM_IDENTIFIER,
    DOCTYPE_SYSTEM_IDENTIFIER_DOUBLE_QUOTED,
    DOCTYPE_SYSTEM_IDENTIFIER_SINGLE_QUOTED,
    AFTER_DOCTYPE_SYSTEM_IDENTIFIER,
    BOGUS_DOCTYPE,
    CDATA_SECTION,
}

impl TokeniserState {
    pub(crate) fn read(self, t: &mut Tokeniser) {
        match self {
            // in data state, gather characters until a character
            // reference or tag is found
            DATA => match t.reader.current() {
                '&' => t.advance_transition(CHARACTER_REFERENCE_IN_DATA),
                '<' => t.advance_transition(TAG_OPEN),
                NULL_CHAR => {
                    t.error_state(self); // NOT replacement character (oddly?)
                    let c = t.reader.consume();
                    t.emit_char(c);
                }
                EOF => t.emit_eof(),
                _ => {
                    let data = t.reader.consume_data();
                    t.emit_str(&data);
                }
            },
            // from & in data
            CHARACTER_REFERENCE_IN_DATA => read_char_ref(t, DATA),
            // handles data in title, textarea etc
            RCDATA => match t.reader.current() {
                '&' => t.advance_transition(CHARACTER_REFERENCE_IN_RCDATA),
                '<' => t.advance_transition(RCDATA_LESSTHAN_SIGN),
                NULL_CHAR => {
                    t.error_state(self);
                    t.reader.advance();
                    t.emit_char(REPLACEMENT_CHAR);
                }
                EOF => t.emit_eof(),
                _ => {
                    let data = t.reader.consume_data();
                    t.emit_str(&data);
                }
            },
            CHARACTER_REFERENCE_IN_RCDATA => read_char_ref(t, RCDATA),
            RAWTEXT => read_raw_data(t, self, RAWTEXT_LESSTHAN_SIGN),
            SCRIPT_DATA => read_raw_data(t, self, SCRIPT_DATA_LESSTHAN_SIGN),
            PLAINTEXT => match t.reader.current() {
                NULL_CHAR => {
                    t.error_state(self);
                    t.reader.advance();
                    t.emit_char(REPLACEMENT_CHAR);
                }
                EOF => t.emit_eof(),
                _ => {
                    let data = t.reader.consume_to(NULL_CHAR);
                    t.emit_str(&data);
                }
            },
            // from < in data
            TAG_OPEN => match t.reader.current() {
                '!' => t.advance_transition(MARKUP_DECLARATION_OPEN),
                '/' => t.advance_transition(END_TAG_OPEN),
                '?' => {
                    t.create_bogus_comment_pending();
                    t.transition(BOGUS_COMMENT);
                }
                _ => {
                    if t.reader.matches_ascii_alpha() {
                        t.create_tag_pending(true);
                        t.transition(TAG_NAME);
                    } else {
                        t.error_state(self);
                        t.emit_char('<'); // char that got us here
                        t.transition(DATA);
                    }
                }
            },
            END_TAG_OPEN => {
                if t.reader.is_empty() {
                    t.eof_error(self);
                    t.emit_str("</");
                    t.transition(DATA);
                } else if t.reader.matches_ascii_alpha() {
                    t.create_tag_pending(false);
                    t.transition(TAG_NAME);
                } else if t.reader.matches('>') {
                    t.error_state(self);
                    t.advance_transition(DATA);
                } else {
                    t.error_state(self);
                    t.create_bogus_comment_pending();
                    t.comment_pending.append_char('/'); // push the / back on that got us here
                    t.transition(BOGUS_COMMENT);
                }
            }
            // from < or </ in data, will have start or end tag pending
            TAG_NAME => {
                // previous TagOpen state did NOT consume, will have a letter char in current
                let tag_name = t.reader.consume_tag_name();
                t.tag_pending.append_tag_name(&tag_name);
                match t.reader.consume() {
                    '\t' | '\n' | '\r' | '\u{000C}' | ' ' => t.transition(BEFORE_ATTRIBUTE_NAME),
                    '/' => t.transition(SELF_CLOSING_START_TAG),
                    '<' => {
                        t.reader.unconsume();
                        t.error_state(self);
                        t.emit_tag_pending();
                        t.transition(DATA);
                    }
                    '>' => {
                        t.emit_tag_pending();
                        t.transition(DATA);
                    }
                    NULL_CHAR => t.tag_pending.append_tag_name("\u{FFFD}"),
                    EOF => {
                        t.eof_error(self);
                        t.transition(DATA);
                    }
                    c => t.tag_pending.append_tag_name_char(c),
                }
            }
            // from < in rcdata
            RCDATA_LESSTHAN_SIGN => {
                if t.reader.matches('/') {
                    t.create_temp_buffer();
                    t.advance_transition(RCDATA_END_TAG_OPEN);
                } else {
                    let appropriate = t.appropriate_end_tag_name().map(str::to_string);
                    let diverge = t.reader.matches_ascii_alpha() && appropriate.is_some() && {
                        let seq = t.appropriate_end_tag_seq();
                        !t.reader.contains_ignore_case(&seq)
                    };
                    if diverge {
                        // diverge from spec: got a start tag, but there's
                        // no appropriate end tag (</title>), so rather
                        // than consuming to EOF, break out here
                        let name = appropriate.unwrap_or_default();
                        t.create_tag_pending(false).set_name(&name);
                        t.emit_tag_pending();
                        // straight into TagOpen, as we came from < and
                        // looks like we're on a start tag
                        t.transition(TAG_OPEN);
                    } else {
                        t.emit_str("<");
                        t.transition(RCDATA);
                    }
                }
            }
            RCDATA_END_TAG_OPEN => {
                if t.reader.matches_ascii_alpha() {
                    t.create_tag_pending(false);
                    let c = t.reader.current();
                    t.tag_pending.append_tag_name_char(c);
                    t.data_buffer.push(c);
                    t.advance_transition(RCDATA_END_TAG_NAME);
                } else {
                    t.emit_str("</");
                    t.transition(RCDATA);
                }
            }
            RCDATA_END_TAG_NAME => {
                if t.reader.matches_ascii_alpha() {
                    let name = t.reader.consume_letter_sequence();
                    t.tag_pending.append_tag_name(&name);
                    t.data_buffer.push_str(&name);
                    return;
                }
                fn anything_else(t: &mut Tokeniser) {
                    let buffer = t.data_buffer.clone();
                    t.emit_str("</");
                    t.emit_str(&buffer);
                    t.reader.unconsume();
                    t.transition(RCDATA);
                }
                match t.reader.consume() {
                    '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {
                        if t.is_appropriate_end_tag_token() {
                            t.transition(BEFORE_ATTRIBUTE_NAME);
                        } else {
                            anything_else(t);
                        }
                    }
                    '/' => {
                        if t.is_appropriate_end_tag_token() {
                            t.transition(SELF_CLOSING_START_TAG);
                        } else {
                            anything_else(t);
                        }
                    }
                    '>' => {
                        if t.is_appropriate_end_tag_token() {
                            t.emit_tag_pending();
                            t.transition(DATA);
                        } else {
                            anything_else(t);
                        }
                    }
                    _ => anything_else(t),
                }
            }
            RAWTEXT_LESSTHAN_SIGN => {
                if t.reader.matches('/') {
                    t.create_temp_buffer();
                    t.advance_transition(RAWTEXT_END_TAG_OPEN);
                } else {
                    t.emit_char('<');
                    t.transition(RAWTEXT);
                }
            }
            RAWTEXT_END_TAG_OPEN => read_end_tag(t, RAWTEXT_END_TAG_NAME, RAWTEXT),
            RAWTEXT_END_TAG_NAME => handle_data_end_tag(t, RAWTEXT),
            SCRIPT_DATA_LESSTHAN_SIGN => match t.reader.consume() {
                '/' => {
                    t.create_temp_buffer();
                    t.transition(SCRIPT_DATA_END_TAG_OPEN);
                }
                '!' => {
                    t.emit_str("<!");
                    t.transition(SCRIPT_DATA_ESCAPE_START);
                }
                EOF => {
                    t.emit_str("<");
                    t.eof_error(self);
                    t.transition(DATA);
                }
                _ => {
                    t.emit_str("<");
                    t.reader.unconsume();
                    t.transition(SCRIPT_DATA);
                }
            },
            SCRIPT_DATA_END_TAG_OPEN => read_end_tag(t, SCRIPT_DATA_END_TAG_NAME, SCRIPT_DATA),
            SCRIPT_DATA_END_TAG_NAME => handle_data_end_tag(t, SCRIPT_DATA),
            SCRIPT_DATA_ESCAPE_START => {
                if t.reader.matches('-') {
                    t.emit_char('-');
                    t.advance_transition(SCRIPT_DATA_ESCAPE_START_DASH);
                } else {
                    t.transition(SCRIPT_DATA);
                }
            }
            SCRIPT_DATA_ESCAPE_START_DASH => {
                if t.reader.matches('-') {
                    t.emit_char('-');
                    t.advance_transition(SCRIPT_DATA_ESCAPED_DASH_DASH);
                } else {
                    t.transition(SCRIPT_DATA);
                }
            }
            SCRIPT_DATA_ESCAPED => {
                if t.reader.is_empty() {
                    t.eof_error(self);
                    t.transition(DATA);
                    return;
                }
                match t.reader.current() {
                    '-' => {
                        t.emit_char('-');
                        t.advance_transition(SCRIPT_DATA_ESCAPED_DASH);
                    }
                    '<' => t.advance_transition(SCRIPT_DATA_ESCAPED_LESSTHAN_SIGN),
                    NULL_CHAR => {
                        t.error_state(self);
                        t.reader.advance();
                        t.emit_char(REPLACEMENT_CHAR);
                    }
                    _ => {
                        let data = t.reader.consume_to_any(&['-', '<', NULL_CHAR]);
                        t.emit_str(&data);
                    }
                }
            }
            SCRIPT_DATA_ESCAPED_DASH => {
                if t.reader.is_empty() {
                    t.eof_error(self);
                    t.transition(DATA);
                    return;
                }
                match t.reader.consume() {
                    '-' => {
                        t.emit_char('-');
                        t.transition(SCRIPT_DATA_ESCAPED_DASH_DASH);
                    }
                    '<' => t.transition(SCRIPT_DATA_ESCAPED_LESSTHAN_SIGN),
                    NULL_CHAR => {
                        t.error_state(self);
                        t.emit_char(REPLACEMENT_CHAR);
                        t.transition(SCRIPT_DATA_ESCAPED);
                    }
                    c => {
                        t.emit_char(c);
                        t.transition(SCRIPT_DATA_ESCAPED);
                    }
                }
            }
            SCRIPT_DATA_ESCAPED_DASH_DASH => {
                if t.reader.is_empty() {
                    t.eof_error(self);
                    t.transition(DATA);
                    return;
                }
                match t.reader.consume() {
                    '-' => t.emit_char('-'),
                    '<' => t.transition(SCRIPT_DATA_ESCAPED_LESSTHAN_SIGN),
                    '>' => {
                        t.emit_char('>');
                        t.transition(SCRIPT_DATA);
                    }
                    NULL_CHAR => {
                        t.error_state(self);
                        t.emit_char(REPLACEMENT_CHAR);
                        t.transition(SCRIPT_DATA_ESCAPED);
                    }
                    c => {
                        t.emit_char(c);
                        t.transition(SCRIPT_DATA_ESCAPED);
                    }
                }
            }
            SCRIPT_DATA_ESCAPED_LESSTHAN_SIGN => {
                if t.reader.matches_ascii_alpha() {
                    t.create_temp_buffer();
                    let c = t.reader.current();
                    t.data_buffer.push(c);
                    t.emit_str("<");
                    t.emit_char(c);
                    t.advance_transition(SCRIPT_DATA_DOUBLE_ESCAPE_START);
                } else if t.reader.matches('/') {
                    t.create_temp_buffer();
                    t.advance_transition(SCRIPT_DATA_ESCAPED_END_TAG_OPEN);
                } else {
                    t.emit_char('<');
                    t.transition(SCRIPT_DATA_ESCAPED);
                }
            }
            SCRIPT_DATA_ESCAPED_END_TAG_OPEN => {
                if t.reader.matches_ascii_alpha() {
                    t.create_tag_pending(false);
                    let c = t.reader.current();
                    t.tag_pending.append_tag_name_char(c);
                    t.data_buffer.push(c);
                    t.advance_transition(SCRIPT_DATA_ESCAPED_END_TAG_NAME);
                } else {
                    t.emit_str("</");
                    t.transition(SCRIPT_DATA_ESCAPED);
                }
            }
            SCRIPT_DATA_ESCAPED_END_TAG_NAME => handle_data_end_tag(t, SCRIPT_DATA_ESCAPED),
            SCRIPT_DATA_DOUBLE_ESCAPE_START => {
                handle_data_double_escape_tag(t, SCRIPT_DATA_DOUBLE_ESCAPED, SCRIPT_DATA_ESCAPED)
            }
            SCRIPT_DATA_DOUBLE_ESCAPED => match t.reader.current() {
                '-' => {
                    t.emit_char('-');
                    t.advance_transition(SCRIPT_DATA_DOUBLE_ESCAPED_DASH);
                }
                '<' => {
                    t.emit_char('<');
                    t.advance_transition(SCRIPT_DATA_DOUBLE_ESCAPED_LESSTHAN_SIGN);
                }
                NULL_CHAR => {
                    t.error_state(self);
                    t.reader.advance();
                    t.emit_char(REPLACEMENT_CHAR);
                }
                EOF => {
                    t.eof_error(self);
                    t.transition(DATA);
                }
                _ => {
                    let data = t.reader.consume_to_any(&['-', '<', NULL_CHAR]);
                    t.emit_str(&data);
                }
            },
            SCRIPT_DATA_DOUBLE_ESCAPED_DASH => match t.reader.consume() {
                '-' => {
                    t.emit_char('-');
                    t.transition(SCRIPT_DATA_DOUBLE_ESCAPED_DASH_DASH);
                }
                '<' => {
                    t.emit_char('<');
                    t.transition(SCRIPT_DATA_DOUBLE_ESCAPED_LESSTHAN_SIGN);
                }
                NULL_CHAR => {
                    t.error_state(self);
                    t.emit_char(REPLACEMENT_CHAR);
                    t.transition(SCRIPT_DATA_DOUBLE_ESCAPED);
                }
                EOF => {
                    t.eof_error(self);
                    t.transition(DATA);
                }
                c => {
                    t.emit_char(c);
                    t.transition(SCRIPT_DATA_DOUBLE_ESCAPED);
                }
            },
            SCRIPT_DATA_DOUBLE_ESCAPED_DASH_DASH => match t.reader.consume() {
                '-' => t.emit_char('-'),
                '<' => {
                    t.emit_char('<');
                    t.transition(SCRIPT_DATA_DOUBLE_ESCAPED_LESSTHAN_SIGN);
                }
                '>' => {
                    t.emit_char('>');
                    t.transition(SCRIPT_DATA);
                }
                NULL_CHAR => {
                    t.error_state(self);
                    t.emit_char(REPLACEMENT_CHAR);
                    t.transition(SCRIPT_DATA_DOUBLE_ESCAPED);
                }
                EOF => {
                    t.eof_error(self);
                    t.transition(DATA);
                }
                c => {
                    t.emit_char(c);
                    t.transition(SCRIPT_DATA_DOUBLE_ESCAPED);
                }
            },
            SCRIPT_DATA_DOUBLE_ESCAPED_LESSTHAN_SIGN => {
                if t.reader.matches('/') {
                    t.emit_char('/');
                    t.create_temp_buffer();
                    t.advance_transition(SCRIPT_DATA_DOUBLE_ESCAPE_END);
                } else {
                    t.transition(SCRIPT_DATA_DOUBLE_ESCAPED);
                }
            }
            SCRIPT_DATA_DOUBLE_ESCAPE_END => {
                handle_data_double_escape_tag(t, SCRIPT_DATA_ESCAPED, SCRIPT_DATA_DOUBLE_ESCAPED)
            }
            // from tagname <xxx
            BEFORE_ATTRIBUTE_NAME => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {}
                '/' => t.transition(SELF_CLOSING_START_TAG),
                '<' => {
                    t.reader.unconsume();
                    t.error_state(self);
                    t.emit_tag_pending();
                    t.transition(DATA);
                }
                '>' => {
                    t.emit_tag_pending();
                    t.transition(DATA);
                }
                NULL_CHAR => {
                    t.reader.unconsume();
                    t.error_state(self);
                    t.tag_pending.new_attribute();
                    t.transition(ATTRIBUTE_NAME);
                }
                EOF => {
                    t.eof_error(self);
                    t.transition(DATA);
                }
                c @ ('"' | '\'' | '=') => {
                    t.error_state(self);
                    t.tag_pending.new_attribute();
                    t.tag_pending.append_attribute_name_char(c);
                    t.transition(ATTRIBUTE_NAME);
                }
                _ => {
                    t.tag_pending.new_attribute();
                    t.reader.unconsume();
                    t.transition(ATTRIBUTE_NAME);
                }
            },
            // from before attribute name
            ATTRIBUTE_NAME => {
                // deviation: consume the run including nulls in one hit,
                // the append replaces them
                let name = t.reader.consume_to_any_sorted(ATTRIBUTE_NAME_CHARS_SORTED);
                t.tag_pending.append_attribute_name(&name);
                match t.reader.consume() {
                    '\t' | '\n' | '\r' | '\u{000C}' | ' ' => t.transition(AFTER_ATTRIBUTE_NAME),
                    '/' => t.transition(SELF_CLOSING_START_TAG),
                    '=' => t.transition(BEFORE_ATTRIBUTE_VALUE),
                    '>' => {
                        t.emit_tag_pending();
                        t.transition(DATA);
                    }
                    EOF => {
                        t.eof_error(self);
                        t.transition(DATA);
                    }
                    c @ ('"' | '\'' | '<') => {
                        t.error_state(self);
                        t.tag_pending.append_attribute_name_char(c);
                    }
                    c => t.tag_pending.append_attribute_name_char(c),
                }
            }
            AFTER_ATTRIBUTE_NAME => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {}
                '/' => t.transition(SELF_CLOSING_START_TAG),
                '=' => t.transition(BEFORE_ATTRIBUTE_VALUE),
                '>' => {
                    t.emit_tag_pending();
                    t.transition(DATA);
                }
                NULL_CHAR => {
                    t.error_state(self);
                    t.tag_pending.append_attribute_name_char(REPLACEMENT_CHAR);
                    t.transition(ATTRIBUTE_NAME);
                }
                EOF => {
                    t.eof_error(self);
                    t.transition(DATA);
                }
                c @ ('"' | '\'' | '<') => {
                    t.error_state(self);
                    t.tag_pending.new_attribute();
                    t.tag_pending.append_attribute_name_char(c);
                    t.transition(ATTRIBUTE_NAME);
                }
                _ => {
                    t.tag_pending.new_attribute();
                    t.reader.unconsume();
                    t.transition(ATTRIBUTE_NAME);
                }
            },
            BEFORE_ATTRIBUTE_VALUE => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {}
                '"' => t.transition(ATTRIBUTE_VALUE_DOUBLE_QUOTED),
                '&' => {
                    t.reader.unconsume();
                    t.transition(ATTRIBUTE_VALUE_UNQUOTED);
                }
                '\'' => t.transition(ATTRIBUTE_VALUE_SINGLE_QUOTED),
                NULL_CHAR => {
                    t.error_state(self);
                    t.tag_pending.append_attribute_value_char(REPLACEMENT_CHAR);
                    t.transition(ATTRIBUTE_VALUE_UNQUOTED);
                }
                EOF => {
                    t.eof_error(self);
                    t.emit_tag_pending();
                    t.transition(DATA);
                }
                '>' => {
                    t.error_state(self);
                    t.emit_tag_pending();
                    t.transition(DATA);
                }
                c @ ('<' | '=' | '`') => {
                    t.error_state(self);
                    t.tag_pending.append_attribute_value_char(c);
                    t.transition(ATTRIBUTE_VALUE_UNQUOTED);
                }
                _ => {
                    t.reader.unconsume();
                    t.transition(ATTRIBUTE_VALUE_UNQUOTED);
                }
            },
            ATTRIBUTE_VALUE_DOUBLE_QUOTED => {
                let value = t.reader.consume_attribute_quoted(false);
                if !value.is_empty() {
                    t.tag_pending.append_attribute_value(&value);
                } else {
                    t.tag_pending.set_empty_attribute_value();
                }
                match t.reader.consume() {
                    '"' => t.transition(AFTER_ATTRIBUTE_VALUE_QUOTED),
                    '&' => match t.consume_character_reference(Some('"'), true) {
                        Some(chars) => t.tag_pending.append_attribute_value_codepoints(&chars),
                        None => t.tag_pending.append_attribute_value_char('&'),
                    },
                    NULL_CHAR => {
                        t.error_state(self);
                        t.tag_pending.append_attribute_value_char(REPLACEMENT_CHAR);
                    }
                    EOF => {
                        t.eof_error(self);
                        t.transition(DATA);
                    }
                    c => t.tag_pending.append_attribute_value_char(c),
                }
            }
            ATTRIBUTE_VALUE_SINGLE_QUOTED => {
                let value = t.reader.consume_attribute_quoted(true);
                if !value.is_empty() {
                    t.tag_pending.append_attribute_value(&value);
                } else {
                    t.tag_pending.set_empty_attribute_value();
                }
                match t.reader.consume() {
                    '\'' => t.transition(AFTER_ATTRIBUTE_VALUE_QUOTED),
                    '&' => match t.consume_character_reference(Some('\''), true) {
                        Some(chars) => t.tag_pending.append_attribute_value_codepoints(&chars),
                        None => t.tag_pending.append_attribute_value_char('&'),
                    },
                    NULL_CHAR => {
                        t.error_state(self);
                        t.tag_pending.append_attribute_value_char(REPLACEMENT_CHAR);
                    }
                    EOF => {
                        t.eof_error(self);
                        t.transition(DATA);
                    }
                    c => t.tag_pending.append_attribute_value_char(c),
                }
            }
            ATTRIBUTE_VALUE_UNQUOTED => {
                let value = t
                    .reader
                    .consume_to_any_sorted(ATTRIBUTE_VALUE_UNQUOTED_SORTED);
                if !value.is_empty() {
                    t.tag_pending.append_attribute_value(&value);
                }
                match t.reader.consume() {
                    '\t' | '\n' | '\r' | '\u{000C}' | ' ' => t.transition(BEFORE_ATTRIBUTE_NAME),
                    '&' => match t.consume_character_reference(Some('>'), true) {
                        Some(chars) => t.tag_pending.append_attribute_value_codepoints(&chars),
                        None => t.tag_pending.append_attribute_value_char('&'),
                    },
                    '>' => {
                        t.emit_tag_pending();
                        t.transition(DATA);
                    }
                    NULL_CHAR => {
                        t.error_state(self);
                        t.tag_pending.append_attribute_value_char(REPLACEMENT_CHAR);
                    }
                    EOF => {
                        t.eof_error(self);
                        t.transition(DATA);
                    }
                    c @ ('"' | '\'' | '<' | '=' | '`') => {
                        t.error_state(self);
                        t.tag_pending.append_attribute_value_char(c);
                    }
                    c => t.tag_pending.append_attribute_value_char(c),
                }
            }
            AFTER_ATTRIBUTE_VALUE_QUOTED => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => t.transition(BEFORE_ATTRIBUTE_NAME),
                '/' => t.transition(SELF_CLOSING_START_TAG),
                '>' => {
                    t.emit_tag_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.transition(DATA);
                }
                _ => {
                    t.reader.unconsume();
                    t.error_state(self);
                    t.transition(BEFORE_ATTRIBUTE_NAME);
                }
            },
            SELF_CLOSING_START_TAG => match t.reader.consume() {
                '>' => {
                    t.tag_pending.self_closing = true;
                    t.emit_tag_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.transition(DATA);
                }
                _ => {
                    t.reader.unconsume();
                    t.error_state(self);
                    t.transition(BEFORE_ATTRIBUTE_NAME);
                }
            },
            BOGUS_COMMENT => {
                let data = t.reader.consume_to('>');
                t.comment_pending.append(&data);
                let next = t.reader.current();
                if next == '>' || next == EOF {
                    t.reader.consume();
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
            }
            MARKUP_DECLARATION_OPEN => {
                if t.reader.match_consume("--") {
                    t.create_comment_pending();
                    t.transition(COMMENT_START);
                } else if t.reader.match_consume_ignore_case("DOCTYPE") {
                    t.transition(DOCTYPE);
                } else if t.reader.match_consume("[CDATA[") {
                    // should check the current namespace, and only
                    // non-html allows cdata. until namespaces are
                    // tracked, keep handling as cdata
                    t.create_temp_buffer();
                    t.transition(CDATA_SECTION);
                } else {
                    t.error_state(self);
                    t.create_bogus_comment_pending();
                    t.transition(BOGUS_COMMENT);
                }
            }
            COMMENT_START => match t.reader.consume() {
                '-' => t.transition(COMMENT_START_DASH),
                NULL_CHAR => {
                    t.error_state(self);
                    t.comment_pending.append_char(REPLACEMENT_CHAR);
                    t.transition(COMMENT);
                }
                '>' => {
                    t.error_state(self);
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.reader.unconsume();
                    t.transition(COMMENT);
                }
            },
            COMMENT_START_DASH => match t.reader.consume() {
                '-' => t.transition(COMMENT_END),
                NULL_CHAR => {
                    t.error_state(self);
                    t.comment_pending.append_char(REPLACEMENT_CHAR);
                    t.transition(COMMENT);
                }
                '>' => {
                    t.error_state(self);
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                c => {
                    t.comment_pending.append_char(c);
                    t.transition(COMMENT);
                }
            },
            COMMENT => match t.reader.current() {
                '-' => t.advance_transition(COMMENT_END_DASH),
                NULL_CHAR => {
                    t.error_state(self);
                    t.reader.advance();
                    t.comment_pending.append_char(REPLACEMENT_CHAR);
                }
                EOF => {
                    t.eof_error(self);
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                _ => {
                    let data = t.reader.consume_to_any(&['-', NULL_CHAR]);
                    t.comment_pending.append(&data);
                }
            },
            COMMENT_END_DASH => match t.reader.consume() {
                '-' => t.transition(COMMENT_END),
                NULL_CHAR => {
                    t.error_state(self);
                    t.comment_pending.append_char('-');
                    t.comment_pending.append_char(REPLACEMENT_CHAR);
                    t.transition(COMMENT);
                }
                EOF => {
                    t.eof_error(self);
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                c => {
                    t.comment_pending.append_char('-');
                    t.comment_pending.append_char(c);
                    t.transition(COMMENT);
                }
            },
            COMMENT_END => match t.reader.consume() {
                '>' => {
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                NULL_CHAR => {
                    t.error_state(self);
                    t.comment_pending.append("--");
                    t.comment_pending.append_char(REPLACEMENT_CHAR);
                    t.transition(COMMENT);
                }
                '!' => t.transition(COMMENT_END_BANG),
                '-' => t.comment_pending.append_char('-'),
                EOF => {
                    t.eof_error(self);
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                c => {
                    t.comment_pending.append("--");
                    t.comment_pending.append_char(c);
                    t.transition(COMMENT);
                }
            },
            COMMENT_END_BANG => match t.reader.consume() {
                '-' => {
                    t.comment_pending.append("--!");
                    t.transition(COMMENT_END_DASH);
                }
                '>' => {
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                NULL_CHAR => {
                    t.error_state(self);
                    t.comment_pending.append("--!");
                    t.comment_pending.append_char(REPLACEMENT_CHAR);
                    t.transition(COMMENT);
                }
                EOF => {
                    t.eof_error(self);
                    t.emit_comment_pending();
                    t.transition(DATA);
                }
                c => {
                    t.comment_pending.append("--!");
                    t.comment_pending.append_char(c);
                    t.transition(COMMENT);
                }
            },
            DOCTYPE => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => t.transition(BEFORE_DOCTYPE_NAME),
                EOF => {
                    t.eof_error(self);
                    t.error_state(self);
                    t.create_doctype_pending();
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                '>' => {
                    t.error_state(self);
                    t.create_doctype_pending();
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.error_state(self);
                    t.transition(BEFORE_DOCTYPE_NAME);
                }
            },
            BEFORE_DOCTYPE_NAME => {
                if t.reader.matches_ascii_alpha() {
                    t.create_doctype_pending();
                    t.transition(DOCTYPE_NAME);
                    return;
                }
                match t.reader.consume() {
                    '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {}
                    NULL_CHAR => {
                        t.error_state(self);
                        t.create_doctype_pending();
                        t.doctype_pending.name.push(REPLACEMENT_CHAR);
                        t.transition(DOCTYPE_NAME);
                    }
                    EOF => {
                        t.eof_error(self);
                        t.create_doctype_pending();
                        t.doctype_pending.force_quirks = true;
                        t.emit_doctype_pending();
                        t.transition(DATA);
                    }
                    c => {
                        t.create_doctype_pending();
                        t.doctype_pending.name.push(c);
                        t.transition(DOCTYPE_NAME);
                    }
                }
            }
            DOCTYPE_NAME => {
                if t.reader.matches_letter() {
                    let name = t.reader.consume_letter_sequence();
                    t.doctype_pending.name.push_str(&name);
                    return;
                }
                match t.reader.consume() {
                    '>' => {
                        t.emit_doctype_pending();
                        t.transition(DATA);
                    }
                    '\t' | '\n' | '\r' | '\u{000C}' | ' ' => t.transition(AFTER_DOCTYPE_NAME),
                    NULL_CHAR => {
                        t.error_state(self);
                        t.doctype_pending.name.push(REPLACEMENT_CHAR);
                    }
                    EOF => {
                        t.eof_error(self);
                        t.doctype_pending.force_quirks = true;
                        t.emit_doctype_pending();
                        t.transition(DATA);
                    }
                    c => t.doctype_pending.name.push(c),
                }
            }
            AFTER_DOCTYPE_NAME => {
                if t.reader.is_empty() {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                    return;
                }
                if t
                    .reader
                    .matches_any(&['\t', '\n', '\r', '\u{000C}', ' '])
                {
                    t.reader.advance(); // ignore whitespace
                } else if t.reader.matches('>') {
                    t.emit_doctype_pending();
                    t.advance_transition(DATA);
                } else if t.reader.match_consume_ignore_case("PUBLIC") {
                    t.doctype_pending.pub_sys_key = Some("PUBLIC".to_string());
                    t.transition(AFTER_DOCTYPE_PUBLIC_KEYWORD);
                } else if t.reader.match_consume_ignore_case("SYSTEM") {
                    t.doctype_pending.pub_sys_key = Some("SYSTEM".to_string());
                    t.transition(AFTER_DOCTYPE_SYSTEM_KEYWORD);
                } else {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.advance_transition(BOGUS_DOCTYPE);
                }
            }
            AFTER_DOCTYPE_PUBLIC_KEYWORD => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {
                    t.transition(BEFORE_DOCTYPE_PUBLIC_IDENTIFIER)
                }
                '"' => {
                    t.error_state(self);
                    // set id to empty string
                    t.transition(DOCTYPE_PUBLIC_IDENTIFIER_DOUBLE_QUOTED);
                }
                '\'' => {
                    t.error_state(self);
                    t.transition(DOCTYPE_PUBLIC_IDENTIFIER_SINGLE_QUOTED);
                }
                '>' => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.transition(BOGUS_DOCTYPE);
                }
            },
            BEFORE_DOCTYPE_PUBLIC_IDENTIFIER => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {}
                '"' => t.transition(DOCTYPE_PUBLIC_IDENTIFIER_DOUBLE_QUOTED),
                '\'' => t.transition(DOCTYPE_PUBLIC_IDENTIFIER_SINGLE_QUOTED),
                '>' => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.transition(BOGUS_DOCTYPE);
                }
            },
            DOCTYPE_PUBLIC_IDENTIFIER_DOUBLE_QUOTED => match t.reader.consume() {
                '"' => t.transition(AFTER_DOCTYPE_PUBLIC_IDENTIFIER),
                NULL_CHAR => {
                    t.error_state(self);
                    t.doctype_pending.public_identifier.push(REPLACEMENT_CHAR);
                }
                '>' => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                c => t.doctype_pending.public_identifier.push(c),
            },
            DOCTYPE_PUBLIC_IDENTIFIER_SINGLE_QUOTED => match t.reader.consume() {
                '\'' => t.transition(AFTER_DOCTYPE_PUBLIC_IDENTIFIER),
                NULL_CHAR => {
                    t.error_state(self);
                    t.doctype_pending.public_identifier.push(REPLACEMENT_CHAR);
                }
                '>' => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                c => t.doctype_pending.public_identifier.push(c),
            },
            AFTER_DOCTYPE_PUBLIC_IDENTIFIER => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {
                    t.transition(BETWEEN_DOCTYPE_PUBLIC_AND_SYSTEM_IDENTIFIERS)
                }
                '>' => {
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                '"' => {
                    t.error_state(self);
                    // system id empty
                    t.transition(DOCTYPE_SYSTEM_IDENTIFIER_DOUBLE_QUOTED);
                }
                '\'' => {
                    t.error_state(self);
                    t.transition(DOCTYPE_SYSTEM_IDENTIFIER_SINGLE_QUOTED);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.transition(BOGUS_DOCTYPE);
                }
            },
            BETWEEN_DOCTYPE_PUBLIC_AND_SYSTEM_IDENTIFIERS => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {}
                '>' => {
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                '"' => {
                    t.error_state(self);
                    t.transition(DOCTYPE_SYSTEM_IDENTIFIER_DOUBLE_QUOTED);
                }
                '\'' => {
                    t.error_state(self);
                    t.transition(DOCTYPE_SYSTEM_IDENTIFIER_SINGLE_QUOTED);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.transition(BOGUS_DOCTYPE);
                }
            },
            AFTER_DOCTYPE_SYSTEM_KEYWORD => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {
                    t.transition(BEFORE_DOCTYPE_SYSTEM_IDENTIFIER)
                }
                '>' => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                '"' => {
                    t.error_state(self);
                    t.transition(DOCTYPE_SYSTEM_IDENTIFIER_DOUBLE_QUOTED);
                }
                '\'' => {
                    t.error_state(self);
                    t.transition(DOCTYPE_SYSTEM_IDENTIFIER_SINGLE_QUOTED);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                }
            },
            BEFORE_DOCTYPE_SYSTEM_IDENTIFIER => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {}
                '"' => t.transition(DOCTYPE_SYSTEM_IDENTIFIER_DOUBLE_QUOTED),
                '\'' => t.transition(DOCTYPE_SYSTEM_IDENTIFIER_SINGLE_QUOTED),
                '>' => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.transition(BOGUS_DOCTYPE);
                }
            },
            DOCTYPE_SYSTEM_IDENTIFIER_DOUBLE_QUOTED => match t.reader.consume() {
                '"' => t.transition(AFTER_DOCTYPE_SYSTEM_IDENTIFIER),
                NULL_CHAR => {
                    t.error_state(self);
                    t.doctype_pending.system_identifier.push(REPLACEMENT_CHAR);
                }
                '>' => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                c => t.doctype_pending.system_identifier.push(c),
            },
            DOCTYPE_SYSTEM_IDENTIFIER_SINGLE_QUOTED => match t.reader.consume() {
                '\'' => t.transition(AFTER_DOCTYPE_SYSTEM_IDENTIFIER),
                NULL_CHAR => {
                    t.error_state(self);
                    t.doctype_pending.system_identifier.push(REPLACEMENT_CHAR);
                }
                '>' => {
                    t.error_state(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                c => t.doctype_pending.system_identifier.push(c),
            },
            AFTER_DOCTYPE_SYSTEM_IDENTIFIER => match t.reader.consume() {
                '\t' | '\n' | '\r' | '\u{000C}' | ' ' => {}
                '>' => {
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                EOF => {
                    t.eof_error(self);
                    t.doctype_pending.force_quirks = true;
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {
                    t.error_state(self);
                    t.transition(BOGUS_DOCTYPE);
                    // NOT force quirks
                }
            },
            BOGUS_DOCTYPE => match t.reader.consume() {
                '>' | EOF => {
                    t.emit_doctype_pending();
                    t.transition(DATA);
                }
                _ => {}
            },
            CDATA_SECTION => {
                let data = t.reader.consume_to_seq("]]>");
                t.data_buffer.push_str(&data);
                if t.reader.match_consume("]]>") || t.reader.is_empty() {
                    let data = std::mem::take(&mut t.data_buffer);
                    t.emit(Token::Character(CharacterToken::cdata(data)));
                    t.transition(DATA);
                } // otherwise, buffer underrun, stay in data section
            }
        }
    }
}

/// Handles RawtextEndTagName, ScriptDataEndTagName, and
/// ScriptDataEscapedEndTagName. Same body impl, just different else exit
/// transitions.
fn handle_data_end_tag(t: &mut Tokeniser, else_transition: TokeniserState) {
    if t.reader.matches_letter() {
        let name = t.reader.consume_letter_sequence();
        t.tag_pending.append_tag_name(&name);
        t.data_buffer.push_str(&name);
        return;
    }
    let mut needs_exit_transition = false;
    if t.is_appropriate_end_tag_token() && !t.reader.is_empty() {
        match t.reader.consume() {
            '\t' | '\n' | '\r' | '\u{000C}' | ' ' => t.transition(BEFORE_ATTRIBUTE_NAME),
            '/' => t.transition(SELF_CLOSING_START_TAG),
            '>' => {
                t.emit_tag_pending();
                t.transition(DATA);
            }
            c => {
                t.data_buffer.push(c);
                needs_exit_transition = true;
            }
        }
    } else {
        needs_exit_transition = true;
    }
    if needs_exit_transition {
        let buffer = t.data_buffer.clone();
        t.emit_str("</");
        t.emit_str(&buffer);
        t.transition(else_transition);
    }
}

fn read_raw_data(t: &mut Tokeniser, current: TokeniserState, advance: TokeniserState) {
    match t.reader.current() {
        '<' => t.advance_transition(advance),
        NULL_CHAR => {
            t.error_state(current);
            t.reader.advance();
            t.emit_char(REPLACEMENT_CHAR);
        }
        EOF => t.emit_eof(),
        _ => {
            let data = t.reader.consume_raw_data();
            t.emit_str(&data);
        }
    }
}

fn read_char_ref(t: &mut Tokeniser, advance: TokeniserState) {
    match t.consume_character_reference(None, false) {
        Some(chars) => t.emit_codepoints(&chars),
        None => t.emit_char('&'),
    }
    t.transition(advance);
}

fn read_end_tag(t: &mut Tokeniser, a: TokeniserState, b: TokeniserState) {
    if t.reader.matches_ascii_alpha() {
        t.create_tag_pending(false);
        t.transition(a);
    } else {
        t.emit_str("</");
        t.transition(b);
    }
}

fn handle_data_double_escape_tag(
    t: &mut Tokeniser,
    primary: TokeniserState,
    fallback: TokeniserState,
) {
    if t.reader.matches_letter() {
        let name = t.reader.consume_letter_sequence();
        t.data_buffer.push_str(&name);
        t.emit_str(&name);
        return;
    }
    match t.reader.consume() {
        c @ ('\t' | '\n' | '\r' | '\u{000C}' | ' ' | '/' | '>') => {
            if t.data_buffer == "script" {
                t.transition(primary);
            } else {
                t.transition(fallback);
            }
            t.emit_char(c);
        }
        _ => {
            t.reader.unconsume();
            t.transition(fallback);
        }
    }
}

#[cfg(test)]
mod test {
    use crate::character_reader::CharacterReader;
    use crate::parse_error::ParseErrorList;
    use crate::token::Token;
    use crate::tokeniser::Tokeniser;
    use crate::tokeniser_state::TokeniserState;

    fn read_all(input: &str) -> Vec<Token> {
        read_all_from(input, TokeniserState::DATA)
    }

    fn read_all_from(input: &str, state: TokeniserState) -> Vec<Token> {
        let mut t = Tokeniser::new(CharacterReader::new(input), ParseErrorList::no_tracking());
        t.transition(state);
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

    fn text_of(tokens: &[Token]) -> String {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Character(c) => Some(c.data.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn comment_variants() {
        let tokens = read_all("<!-- a -- b -->");
        match &tokens[0] {
            Token::Comment(c) => assert_eq!(c.data, " a -- b "),
            other => panic!("expected comment, got {}", other.token_type()),
        }

        // unterminated comment closes at eof
        let tokens = read_all("<!--hi");
        match &tokens[0] {
            Token::Comment(c) => assert_eq!(c.data, "hi"),
            other => panic!("expected comment, got {}", other.token_type()),
        }
    }

    #[test]
    fn bogus_comment_from_qmark() {
        let tokens = read_all("<?xml version=\"1.0\"?>ok");
        match &tokens[0] {
            Token::Comment(c) => {
                assert!(c.bogus);
                assert_eq!(c.data, "?xml version=\"1.0\"?");
            }
            other => panic!("expected comment, got {}", other.token_type()),
        }
        assert_eq!(text_of(&tokens), "ok");
    }

    #[test]
    fn doctype_with_public_identifier() {
        let tokens =
            read_all("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\" \"xhtml1.dtd\">");
        match &tokens[0] {
            Token::Doctype(d) => {
                assert_eq!(d.name, "html");
                assert_eq!(d.pub_sys_key.as_deref(), Some("PUBLIC"));
                assert_eq!(d.public_identifier, "-//W3C//DTD XHTML 1.0//EN");
                assert_eq!(d.system_identifier, "xhtml1.dtd");
                assert!(!d.force_quirks);
            }
            other => panic!("expected doctype, got {}", other.token_type()),
        }
    }

    #[test]
    fn truncated_doctype_forces_quirks() {
        let tokens = read_all("<!DOCTYPE");
        match &tokens[0] {
            Token::Doctype(d) => assert!(d.force_quirks),
            other => panic!("expected doctype, got {}", other.token_type()),
        }
    }

    #[test]
    fn rcdata_end_tag_must_be_appropriate() {
        let mut t = Tokeniser::new(
            CharacterReader::new("<title>one</i>two</title>"),
            ParseErrorList::no_tracking(),
        );
        let mut tokens = Vec::new();
        loop {
            let token = t.read();
            if let Token::StartTag(tag) = &token {
                if tag.normal_name() == "title" {
                    t.transition(TokeniserState::RCDATA);
                }
            }
            let eof = token.is_eof();
            tokens.push(token);
            if eof {
                break;
            }
        }
        assert_eq!(text_of(&tokens), "one</i>two");
        assert!(tokens
            .iter()
            .any(|tok| matches!(tok, Token::EndTag(tag) if tag.normal_name() == "title")));
    }

    #[test]
    fn script_double_escape() {
        let tokens = read_all_from(
            "<!--<script>a</script>-->x</script>",
            TokeniserState::SCRIPT_DATA,
        );
        assert_eq!(text_of(&tokens), "<!--<script>a</script>-->x");
        assert!(tokens
            .iter()
            .any(|tok| matches!(tok, Token::EndTag(tag) if tag.normal_name() == "script")));
    }

    #[test]
    fn cdata_section() {
        let tokens = read_all("<![CDATA[one <two> & three]]>");
        assert!(tokens[0].is_cdata());
        match &tokens[0] {
            Token::Character(c) => assert_eq!(c.data, "one <two> & three"),
            other => panic!("expected cdata, got {}", other.token_type()),
        }
    }

    #[test]
    fn null_in_tag_name_replaced() {
        let tokens = read_all("<di\0v>");
        match &tokens[0] {
            Token::StartTag(tag) => assert_eq!(tag.name(), "di\u{FFFD}v"),
            other => panic!("expected start tag, got {}", other.token_type()),
        }
    }

    #[test]
    fn lone_lt_emitted_as_text() {
        let tokens = read_all("a < b");
        assert_eq!(text_of(&tokens), "a < b");
    }

    #[test]
    fn unquoted_attribute_values() {
        let tokens = read_all("<a href=/foo class=bar>");
        match &tokens[0] {
            Token::StartTag(tag) => {
                assert_eq!(tag.attribute("href"), Some("/foo"));
                assert_eq!(tag.attribute("class"), Some("bar"));
            }
            other => panic!("expected start tag, got {}", other.token_type()),
        }
    }

    #[test]
    fn self_closing_flag() {
        let tokens = read_all("<img src=x />");
        match &tokens[0] {
            Token::StartTag(tag) => {
                assert!(tag.self_closing);
                assert_eq!(tag.attribute("src"), Some("x"));
            }
            other => panic!("expected start tag, got {}", other.token_type()),
        }
    }
}
