//! Case-normalization policy for tag and attribute names.

use crate::dom::attributes::Attributes;

/// Controls parser case sensitivity for tag and attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSettings {
    preserve_tag_case: bool,
    preserve_attribute_case: bool,
}

impl ParseSettings {
    /// HTML default: both tag and attribute names are lower-cased.
    pub const HTML_DEFAULT: ParseSettings = ParseSettings {
        preserve_tag_case: false,
        preserve_attribute_case: false,
    };

    /// Preserve both tag and attribute case. The XML default.
    pub const PRESERVE_CASE: ParseSettings = ParseSettings {
        preserve_tag_case: true,
        preserve_attribute_case: true,
    };

    pub fn new(preserve_tag_case: bool, preserve_attribute_case: bool) -> Self {
        ParseSettings {
            preserve_tag_case,
            preserve_attribute_case,
        }
    }

    pub fn preserve_tag_case(&self) -> bool {
        self.preserve_tag_case
    }

    pub fn preserve_attribute_case(&self) -> bool {
        self.preserve_attribute_case
    }

    /// Normalize a tag name per this policy: trimmed, and lower-cased
    /// unless tag case is preserved.
    pub fn normalize_tag(&self, name: &str) -> String {
        let name = name.trim();
        if self.preserve_tag_case {
            name.to_string()
        } else {
            lower_case(name)
        }
    }

    /// Normalize an attribute name per this policy.
    pub fn normalize_attribute(&self, name: &str) -> String {
        let name = name.trim();
        if self.preserve_attribute_case {
            name.to_string()
        } else {
            lower_case(name)
        }
    }

    /// Normalize the names of every attribute in the set, in place.
    pub fn normalize_attributes(&self, attributes: &mut Attributes) {
        if !self.preserve_attribute_case {
            attributes.normalize();
        }
    }
}

/// The normalized (trimmed, lower-cased) form of a tag or attribute name.
pub fn normal_name(name: &str) -> String {
    lower_case(name.trim())
}

fn lower_case(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn html_default_folds_case() {
        let settings = ParseSettings::HTML_DEFAULT;
        assert_eq!(settings.normalize_tag(" DIV "), "div");
        assert_eq!(settings.normalize_attribute("HREF"), "href");
    }

    #[test]
    fn preserve_case_keeps_case() {
        let settings = ParseSettings::PRESERVE_CASE;
        assert_eq!(settings.normalize_tag("FooBar"), "FooBar");
        assert_eq!(settings.normalize_attribute("viewBox"), "viewBox");
    }

    #[test]
    fn normal_name_always_folds() {
        assert_eq!(normal_name(" TITLE"), "title");
    }
}
