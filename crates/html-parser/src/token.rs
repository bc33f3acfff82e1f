//! Lexical tokens produced by the tokeniser.

use std::fmt;

use crate::dom::Attributes;
use crate::settings;

/// Position value for tokens with no source range (synthetic tokens).
pub const UNSET: usize = usize::MAX;

/* Limits runaway crafted HTML from spewing attributes. Real-world HTML
will P99 around 8 attributes, so plenty of headroom. */
const MAX_ATTRIBUTES: usize = 512;

#[derive(Debug, Clone)]
pub enum Token {
    Doctype(DoctypeToken),
    StartTag(TagToken),
    EndTag(TagToken),
    Comment(CommentToken),
    Character(CharacterToken),
    Eof(EofToken),
}

impl Token {
    pub fn is_doctype(&self) -> bool {
        matches!(self, Token::Doctype(_))
    }

    pub fn is_start_tag(&self) -> bool {
        matches!(self, Token::StartTag(_))
    }

    pub fn is_end_tag(&self) -> bool {
        matches!(self, Token::EndTag(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    pub fn is_character(&self) -> bool {
        matches!(self, Token::Character(_))
    }

    pub fn is_cdata(&self) -> bool {
        matches!(self, Token::Character(c) if c.cdata)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof(_))
    }

    pub fn token_type(&self) -> &'static str {
        match self {
            Token::Doctype(_) => "Doctype",
            Token::StartTag(_) => "StartTag",
            Token::EndTag(_) => "EndTag",
            Token::Comment(_) => "Comment",
            Token::Character(c) if c.cdata => "CData",
            Token::Character(_) => "Character",
            Token::Eof(_) => "EOF",
        }
    }

    pub fn start_pos(&self) -> usize {
        match self {
            Token::Doctype(t) => t.start_pos,
            Token::StartTag(t) | Token::EndTag(t) => t.start_pos,
            Token::Comment(t) => t.start_pos,
            Token::Character(t) => t.start_pos,
            Token::Eof(t) => t.start_pos,
        }
    }

    pub fn end_pos(&self) -> usize {
        match self {
            Token::Doctype(t) => t.end_pos,
            Token::StartTag(t) | Token::EndTag(t) => t.end_pos,
            Token::Comment(t) => t.end_pos,
            Token::Character(t) => t.end_pos,
            Token::Eof(t) => t.end_pos,
        }
    }

    pub(crate) fn set_start_pos(&mut self, pos: usize) {
        match self {
            Token::Doctype(t) => t.start_pos = pos,
            Token::StartTag(t) | Token::EndTag(t) => t.start_pos = pos,
            Token::Comment(t) => t.start_pos = pos,
            Token::Character(t) => t.start_pos = pos,
            Token::Eof(t) => t.start_pos = pos,
        }
    }

    pub(crate) fn set_end_pos(&mut self, pos: usize) {
        match self {
            Token::Doctype(t) => t.end_pos = pos,
            Token::StartTag(t) | Token::EndTag(t) => t.end_pos = pos,
            Token::Comment(t) => t.end_pos = pos,
            Token::Character(t) => t.end_pos = pos,
            Token::Eof(t) => t.end_pos = pos,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Doctype(t) => write!(f, "<!doctype {}>", t.name),
            Token::StartTag(t) => write!(f, "<{}>", t.to_string_name()),
            Token::EndTag(t) => write!(f, "</{}>", t.to_string_name()),
            Token::Comment(t) => write!(f, "<!--{}-->", t.data),
            Token::Character(t) if t.cdata => write!(f, "<![CDATA[{}]]>", t.data),
            Token::Character(t) => f.write_str(&t.data),
            Token::Eof(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DoctypeToken {
    pub name: String,
    pub pub_sys_key: Option<String>,
    pub public_identifier: String,
    pub system_identifier: String,
    pub force_quirks: bool,
    pub start_pos: usize,
    pub end_pos: usize,
}

impl Default for DoctypeToken {
    fn default() -> Self {
        DoctypeToken {
            name: String::new(),
            pub_sys_key: None,
            public_identifier: String::new(),
            system_identifier: String::new(),
            force_quirks: false,
            start_pos: UNSET,
            end_pos: UNSET,
        }
    }
}

/// A start or end tag, built up incrementally by the tokeniser.
///
/// Attribute name/value fragments accumulate in scratch buffers until
/// [`new_attribute`](TagToken::new_attribute) pushes a completed
/// attribute; `finalise_tag` flushes any pending one before emit.
#[derive(Debug, Clone)]
pub struct TagToken {
    tag_name: Option<String>,
    // lc version of tag name, for case insensitive tree build
    norm_name: Option<String>,
    attr_name: String,
    has_attr_name: bool,
    attr_value: String,
    has_attr_value: bool,
    // distinguish boolean attribute from empty string value
    has_empty_attr_value: bool,
    pub self_closing: bool,
    pub attributes: Option<Attributes>,
    pub start_pos: usize,
    pub end_pos: usize,
}

impl Default for TagToken {
    fn default() -> Self {
        TagToken {
            tag_name: None,
            norm_name: None,
            attr_name: String::new(),
            has_attr_name: false,
            attr_value: String::new(),
            has_attr_value: false,
            has_empty_attr_value: false,
            self_closing: false,
            attributes: None,
            start_pos: UNSET,
            end_pos: UNSET,
        }
    }
}

impl TagToken {
    pub fn named(name: &str) -> TagToken {
        let mut tag = TagToken::default();
        tag.set_name(name);
        tag
    }

    pub fn named_with_attributes(name: &str, attributes: Attributes) -> TagToken {
        let mut tag = TagToken::named(name);
        tag.attributes = Some(attributes);
        tag
    }

    /// The tag name, preserving case (for input into `Tag::value_of`).
    pub fn name(&self) -> &str {
        debug_assert!(
            self.tag_name.as_ref().is_some_and(|n| !n.is_empty()),
            "tag name not set"
        );
        self.tag_name.as_deref().unwrap_or("")
    }

    /// Lower case, used in tree building to work out where it should go.
    pub fn normal_name(&self) -> &str {
        self.norm_name.as_deref().unwrap_or("")
    }

    pub fn set_name(&mut self, name: &str) {
        self.tag_name = Some(name.to_string());
        self.norm_name = Some(settings::normal_name(name));
    }

    fn to_string_name(&self) -> &str {
        self.tag_name.as_deref().unwrap_or("[unset]")
    }

    pub(crate) fn append_tag_name(&mut self, append: &str) {
        // might have null chars - need to replace with null replacement character
        let append = append.replace('\0', "\u{FFFD}");
        match &mut self.tag_name {
            Some(name) => name.push_str(&append),
            None => self.tag_name = Some(append),
        }
        self.norm_name = self
            .tag_name
            .as_deref()
            .map(settings::normal_name);
    }

    pub(crate) fn append_tag_name_char(&mut self, append: char) {
        let mut buf = [0u8; 4];
        self.append_tag_name(append.encode_utf8(&mut buf));
    }

    pub(crate) fn append_attribute_name(&mut self, append: &str) {
        // might have null chars because we eat in one pass
        self.has_attr_name = true;
        let append = append.replace('\0', "\u{FFFD}");
        self.attr_name.push_str(&append);
    }

    pub(crate) fn append_attribute_name_char(&mut self, append: char) {
        self.has_attr_name = true;
        self.attr_name.push(append);
    }

    pub(crate) fn append_attribute_value(&mut self, append: &str) {
        self.has_attr_value = true;
        self.attr_value.push_str(append);
    }

    pub(crate) fn append_attribute_value_char(&mut self, append: char) {
        self.has_attr_value = true;
        self.attr_value.push(append);
    }

    pub(crate) fn append_attribute_value_codepoints(&mut self, codepoints: &[char]) {
        self.has_attr_value = true;
        for &c in codepoints {
            self.attr_value.push(c);
        }
    }

    pub(crate) fn set_empty_attribute_value(&mut self) {
        self.has_empty_attr_value = true;
    }

    /// Pushes the pending attribute name/value pair into the attribute
    /// list. First attribute wins on duplicates: deduplication happens
    /// later, once in a context where case sensitivity is known (the
    /// appropriate tree builder).
    pub(crate) fn new_attribute(&mut self) {
        let attributes = self.attributes.get_or_insert_with(Attributes::new);
        if self.has_attr_name && attributes.len() < MAX_ATTRIBUTES {
            // the tokeniser has skipped whitespace control chars, but
            // trimming could collapse to empty for other control codes
            let name = self
                .attr_name
                .trim_matches(|c: char| c <= ' ')
                .to_string();
            if !name.is_empty() {
                let value = if self.has_attr_value {
                    Some(std::mem::take(&mut self.attr_value))
                } else if self.has_empty_attr_value {
                    Some(String::new())
                } else {
                    None
                };
                attributes.add(name, value);
            }
        }
        self.attr_name.clear();
        self.has_attr_name = false;
        self.attr_value.clear();
        self.has_attr_value = false;
        self.has_empty_attr_value = false;
    }

    /// Finalises for emit.
    pub(crate) fn finalise_tag(&mut self) {
        if self.has_attr_name {
            self.new_attribute();
        }
    }

    pub fn has_attributes(&self) -> bool {
        self.attributes.is_some()
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.as_ref().is_some_and(|a| a.has_key(key))
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.as_ref().and_then(|a| a.get(key))
    }

    pub fn attribute_ignore_case(&self, key: &str) -> Option<&str> {
        self.attributes.as_ref().and_then(|a| a.get_ignore_case(key))
    }
}

#[derive(Debug, Clone)]
pub struct CommentToken {
    pub data: String,
    pub bogus: bool,
    pub start_pos: usize,
    pub end_pos: usize,
}

impl Default for CommentToken {
    fn default() -> Self {
        CommentToken {
            data: String::new(),
            bogus: false,
            start_pos: UNSET,
            end_pos: UNSET,
        }
    }
}

impl CommentToken {
    pub(crate) fn append(&mut self, append: &str) {
        self.data.push_str(append);
    }

    pub(crate) fn append_char(&mut self, append: char) {
        self.data.push(append);
    }
}

#[derive(Debug, Clone)]
pub struct CharacterToken {
    pub data: String,
    /// CData is treated in the builders as an extension of Character.
    pub cdata: bool,
    pub start_pos: usize,
    pub end_pos: usize,
}

impl CharacterToken {
    pub fn new(data: impl Into<String>) -> CharacterToken {
        CharacterToken {
            data: data.into(),
            cdata: false,
            start_pos: UNSET,
            end_pos: UNSET,
        }
    }

    pub fn cdata(data: impl Into<String>) -> CharacterToken {
        CharacterToken {
            cdata: true,
            ..CharacterToken::new(data)
        }
    }
}

#[derive(Debug, Clone)]
pub struct EofToken {
    pub start_pos: usize,
    pub end_pos: usize,
}

impl Default for EofToken {
    fn default() -> Self {
        EofToken {
            start_pos: UNSET,
            end_pos: UNSET,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tag_name_normalizes() {
        let mut tag = TagToken::default();
        tag.append_tag_name("DI");
        tag.append_tag_name("V");
        assert_eq!(tag.name(), "DIV");
        assert_eq!(tag.normal_name(), "div");
    }

    #[test]
    fn nulls_replaced_in_names() {
        let mut tag = TagToken::default();
        tag.append_tag_name("di\0v");
        assert_eq!(tag.name(), "di\u{FFFD}v");
    }

    #[test]
    fn attribute_accumulation() {
        let mut tag = TagToken::default();
        tag.append_attribute_name("href");
        tag.append_attribute_value("/a");
        tag.new_attribute();
        tag.append_attribute_name("checked");
        tag.finalise_tag();
        let attrs = tag.attributes.as_ref().unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("href"), Some("/a"));
        assert!(attrs.has_key("checked"));
        assert!(!attrs.iter().nth(1).unwrap().has_declared_value());
    }

    #[test]
    fn empty_attribute_value_is_declared() {
        let mut tag = TagToken::default();
        tag.append_attribute_name("value");
        tag.set_empty_attribute_value();
        tag.new_attribute();
        let attrs = tag.attributes.as_ref().unwrap();
        assert_eq!(attrs.get("value"), Some(""));
        assert!(attrs.iter().next().unwrap().has_declared_value());
    }

    #[test]
    fn blank_attribute_names_dropped() {
        let mut tag = TagToken::default();
        tag.append_attribute_name(" ");
        tag.new_attribute();
        assert_eq!(tag.attributes.as_ref().unwrap().len(), 0);
    }

    #[test]
    fn synthetic_tokens_have_unset_positions() {
        let tag = TagToken::named("div");
        assert_eq!(tag.start_pos, UNSET);
        assert_eq!(tag.end_pos, UNSET);
        assert_eq!(tag.normal_name(), "div");
    }
}
