//! HTML tag capabilities.
//!
//! A process-wide registry of known HTML tags and their properties
//! (block/inline, void, whitespace handling, form participation),
//! populated once and read-only thereafter. Unknown tags get a default
//! "go anywhere, do anything" entry that is not registered.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::settings::{self, ParseSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    normal_name: String,
    is_block: bool,
    format_as_block: bool,
    empty: bool,
    self_closing: bool,
    preserve_whitespace: bool,
    form_listed: bool,
    form_submittable: bool,
}

impl Tag {
    fn new(name: &str) -> Tag {
        Tag {
            name: name.to_string(),
            normal_name: settings::normal_name(name),
            is_block: true,
            format_as_block: true,
            empty: false,
            self_closing: false,
            preserve_whitespace: false,
            form_listed: false,
            form_submittable: false,
        }
    }

    /// Get a Tag by name. If not previously defined (unknown), returns a
    /// new generic tag that can go anywhere.
    ///
    /// Pre-defined tags are looked up by normalized name; when tag case
    /// is preserved, a copy carrying the original case is returned.
    pub fn value_of(tag_name: &str, settings: &ParseSettings) -> Tag {
        if let Some(tag) = TAGS.get(tag_name) {
            return tag.clone();
        }
        let tag_name = settings.normalize_tag(tag_name);
        debug_assert!(!tag_name.is_empty());
        let normal_name = settings::normal_name(&tag_name);
        match TAGS.get(normal_name.as_str()) {
            None => {
                // not defined: create default; go anywhere, do anything
                let mut tag = Tag::new(&tag_name);
                tag.is_block = false;
                tag
            }
            Some(known) if settings.preserve_tag_case() && tag_name != normal_name => {
                let mut tag = known.clone();
                tag.name = tag_name;
                tag
            }
            Some(known) => known.clone(),
        }
    }

    /// Is this a known HTML tag name?
    pub fn is_known_tag(tag_name: &str) -> bool {
        TAGS.contains_key(tag_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lower-case name of this tag, regardless of case preservation.
    pub fn normal_name(&self) -> &str {
        &self.normal_name
    }

    pub fn is_block(&self) -> bool {
        self.is_block
    }

    pub fn is_inline(&self) -> bool {
        !self.is_block
    }

    pub fn format_as_block(&self) -> bool {
        self.format_as_block
    }

    /// Is this a void (empty) element, e.g. `<img>`?
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Should this tag be output as self closing?
    pub fn is_self_closing(&self) -> bool {
        self.empty || self.self_closing
    }

    /// Is this tag registered (vs auto-created during parsing)?
    pub fn is_known(&self) -> bool {
        TAGS.contains_key(self.name.as_str())
    }

    pub fn preserve_whitespace(&self) -> bool {
        self.preserve_whitespace
    }

    /// A control that appears in forms: input, textarea, output etc.
    pub fn is_form_listed(&self) -> bool {
        self.form_listed
    }

    /// A control that can be submitted in a form: input etc.
    pub fn is_form_submittable(&self) -> bool {
        self.form_submittable
    }

    pub(crate) fn set_self_closing(&mut self) {
        self.self_closing = true;
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

// prepped from http://www.w3.org/TR/REC-html40/sgml/dtd.html and other sources
static BLOCK_TAGS: &[&str] = &[
    "html", "head", "body", "frameset", "script", "noscript", "style", "meta", "link", "title",
    "frame", "noframes", "section", "nav", "aside", "hgroup", "header", "footer", "p", "h1", "h2",
    "h3", "h4", "h5", "h6", "ul", "ol", "pre", "div", "blockquote", "hr", "address", "figure",
    "figcaption", "form", "fieldset", "ins", "del", "dl", "dt", "dd", "li", "table", "caption",
    "thead", "tfoot", "tbody", "colgroup", "col", "tr", "th", "td", "video", "audio", "canvas",
    "details", "menu", "plaintext", "template", "article", "main", "svg", "math", "center", "dir",
    "applet", "marquee", "listing",
];

static INLINE_TAGS: &[&str] = &[
    "object", "base", "font", "tt", "i", "b", "u", "big", "small", "em", "strong", "dfn", "code",
    "samp", "kbd", "var", "cite", "abbr", "time", "acronym", "mark", "ruby", "rt", "rp", "a",
    "img", "br", "wbr", "map", "q", "sub", "sup", "bdo", "iframe", "embed", "span", "input",
    "select", "textarea", "label", "button", "optgroup", "option", "legend", "datalist", "keygen",
    "output", "progress", "meter", "area", "param", "source", "track", "summary", "command",
    "device", "basefont", "bgsound", "menuitem", "data", "bdi", "s", "strike", "nobr",
];

static EMPTY_TAGS: &[&str] = &[
    "meta", "link", "base", "frame", "img", "br", "wbr", "embed", "hr", "input", "keygen", "col",
    "command", "device", "area", "basefont", "bgsound", "menuitem", "param", "source", "track",
];

static FORMAT_AS_INLINE_TAGS: &[&str] = &[
    "title", "a", "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "address", "li", "th", "td",
    "script", "style", "ins", "del", "s",
];

// script is not here as it is a data node, which always preserves whitespace
static PRESERVE_WHITESPACE_TAGS: &[&str] = &["pre", "plaintext", "title", "textarea"];

static FORM_LISTED_TAGS: &[&str] = &[
    "button", "fieldset", "input", "keygen", "object", "output", "select", "textarea",
];

static FORM_SUBMIT_TAGS: &[&str] = &["input", "keygen", "object", "select", "textarea"];

lazy_static! {
    static ref TAGS: FxHashMap<&'static str, Tag> = {
        let mut tags = FxHashMap::default();
        for &name in BLOCK_TAGS {
            tags.insert(name, Tag::new(name));
        }
        for &name in INLINE_TAGS {
            let mut tag = Tag::new(name);
            tag.is_block = false;
            tag.format_as_block = false;
            tags.insert(name, tag);
        }
        for &name in EMPTY_TAGS {
            tags.get_mut(name).unwrap().empty = true;
        }
        for &name in FORMAT_AS_INLINE_TAGS {
            tags.get_mut(name).unwrap().format_as_block = false;
        }
        for &name in PRESERVE_WHITESPACE_TAGS {
            tags.get_mut(name).unwrap().preserve_whitespace = true;
        }
        for &name in FORM_LISTED_TAGS {
            tags.get_mut(name).unwrap().form_listed = true;
        }
        for &name in FORM_SUBMIT_TAGS {
            tags.get_mut(name).unwrap().form_submittable = true;
        }
        tags
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_tags() {
        let div = Tag::value_of("div", &ParseSettings::HTML_DEFAULT);
        assert!(div.is_block());
        assert!(!div.is_empty());
        assert!(div.is_known());

        let img = Tag::value_of("img", &ParseSettings::HTML_DEFAULT);
        assert!(img.is_empty());
        assert!(img.is_self_closing());
        assert!(img.is_inline());
    }

    #[test]
    fn unknown_tags_are_inline() {
        let tag = Tag::value_of("widget", &ParseSettings::HTML_DEFAULT);
        assert!(tag.is_inline());
        assert!(!tag.is_known());
        assert_eq!(tag.name(), "widget");
    }

    #[test]
    fn case_preservation_copies() {
        let tag = Tag::value_of("DIV", &ParseSettings::PRESERVE_CASE);
        assert_eq!(tag.name(), "DIV");
        assert_eq!(tag.normal_name(), "div");
        assert!(tag.is_block());

        let folded = Tag::value_of("DIV", &ParseSettings::HTML_DEFAULT);
        assert_eq!(folded.name(), "div");
    }

    #[test]
    fn form_participation() {
        assert!(Tag::value_of("input", &ParseSettings::HTML_DEFAULT).is_form_listed());
        assert!(Tag::value_of("input", &ParseSettings::HTML_DEFAULT).is_form_submittable());
        assert!(Tag::value_of("fieldset", &ParseSettings::HTML_DEFAULT).is_form_listed());
        assert!(!Tag::value_of("fieldset", &ParseSettings::HTML_DEFAULT).is_form_submittable());
    }

    #[test]
    fn whitespace_preservation() {
        assert!(Tag::value_of("pre", &ParseSettings::HTML_DEFAULT).preserve_whitespace());
        assert!(!Tag::value_of("div", &ParseSettings::HTML_DEFAULT).preserve_whitespace());
    }
}
