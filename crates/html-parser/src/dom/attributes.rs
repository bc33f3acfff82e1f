//! Element attributes: an ordered name/value list.
//!
//! Order is the document order attributes were parsed in. On duplicate
//! names the first attribute wins; later duplicates are dropped by
//! [`Attributes::deduplicate`].

use crate::settings::ParseSettings;

/// A single attribute. A value of `None` means the attribute was
/// declared without a value (`<input checked>`), distinct from an empty
/// value (`<input value="">`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Attribute {
        Attribute {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute value, or "" if the attribute has no declared value.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn has_declared_value(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    attrs: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Attributes {
        Attributes::default()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Appends without checking for duplicates; the parser checks before
    /// adding, and [`deduplicate`](Attributes::deduplicate) catches the rest.
    pub fn add(&mut self, name: impl Into<String>, value: Option<String>) {
        self.attrs.push(Attribute::new(name, value));
    }

    /// Sets the attribute, replacing the value of an existing one with
    /// the same name.
    pub fn put(&mut self, name: &str, value: Option<String>) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.add(name, value),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value())
    }

    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value())
    }

    pub fn has_key(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    pub fn has_key_ignore_case(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn remove(&mut self, name: &str) {
        self.attrs.retain(|a| a.name != name);
    }

    /// Lower-cases every attribute name, in place.
    pub fn normalize(&mut self) {
        for attr in &mut self.attrs {
            attr.name = attr.name.to_lowercase();
        }
    }

    /// Drops duplicate attributes, first wins. Matching is case
    /// insensitive unless the settings preserve attribute case. Returns
    /// the number of attributes dropped.
    pub fn deduplicate(&mut self, settings: &ParseSettings) -> usize {
        if self.attrs.len() < 2 {
            return 0;
        }
        let preserve = settings.preserve_attribute_case();
        let before = self.attrs.len();
        let mut kept: Vec<Attribute> = Vec::with_capacity(before);
        for attr in self.attrs.drain(..) {
            let dupe = kept.iter().any(|k| {
                if preserve {
                    k.name == attr.name
                } else {
                    k.name.eq_ignore_ascii_case(&attr.name)
                }
            });
            if !dupe {
                kept.push(attr);
            }
        }
        let dropped = before - kept.len();
        self.attrs = kept;
        dropped
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attrs.iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_attribute_wins() {
        let mut attrs = Attributes::new();
        attrs.add("id", Some("one".into()));
        attrs.add("class", Some("a".into()));
        attrs.add("id", Some("two".into()));
        let dropped = attrs.deduplicate(&ParseSettings::HTML_DEFAULT);
        assert_eq!(dropped, 1);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("id"), Some("one"));
    }

    #[test]
    fn dedupe_is_case_insensitive_by_default() {
        let mut attrs = Attributes::new();
        attrs.add("ID", Some("one".into()));
        attrs.add("id", Some("two".into()));
        assert_eq!(attrs.deduplicate(&ParseSettings::HTML_DEFAULT), 1);
        assert_eq!(attrs.len(), 1);

        let mut attrs = Attributes::new();
        attrs.add("ID", Some("one".into()));
        attrs.add("id", Some("two".into()));
        assert_eq!(attrs.deduplicate(&ParseSettings::PRESERVE_CASE), 0);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn declared_vs_empty_values() {
        let mut attrs = Attributes::new();
        attrs.add("checked", None);
        attrs.add("value", Some(String::new()));
        assert_eq!(attrs.get("checked"), Some(""));
        assert!(!attrs.iter().next().unwrap().has_declared_value());
        assert!(attrs.iter().nth(1).unwrap().has_declared_value());
    }

    #[test]
    fn put_replaces() {
        let mut attrs = Attributes::new();
        attrs.add("href", Some("a".into()));
        attrs.put("href", Some("b".into()));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("href"), Some("b"));
    }
}
