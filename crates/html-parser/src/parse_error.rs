//! Parse error tracking.
//!
//! Errors are diagnostics only: parsing always recovers and continues.
//! The list is bounded so that adversarial documents cannot accumulate
//! unbounded error storage, and a zero-capacity list never allocates.

use std::fmt;

/// A single parse error: the absolute offset it occurred at, and a
/// description of what went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pos: usize,
    msg: String,
}

impl ParseError {
    pub(crate) fn new(pos: usize, msg: impl Into<String>) -> Self {
        ParseError {
            pos,
            msg: msg.into(),
        }
    }

    /// Absolute offset into the input where the error occurred.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The error message.
    pub fn msg(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pos, self.msg)
    }
}

/// A bounded list of parse errors.
#[derive(Debug, Clone, Default)]
pub struct ParseErrorList {
    errors: Vec<ParseError>,
    max_size: usize,
}

impl ParseErrorList {
    const INITIAL_CAPACITY: usize = 16;

    /// A list that records up to `max_size` errors.
    pub fn tracking(max_size: usize) -> Self {
        ParseErrorList {
            errors: Vec::with_capacity(Self::INITIAL_CAPACITY.min(max_size)),
            max_size,
        }
    }

    /// A list that records nothing. Appends are no-ops.
    pub fn no_tracking() -> Self {
        ParseErrorList {
            errors: Vec::new(),
            max_size: 0,
        }
    }

    pub(crate) fn can_add_error(&self) -> bool {
        self.errors.len() < self.max_size
    }

    pub(crate) fn add(&mut self, error: ParseError) {
        if self.can_add_error() {
            self.errors.push(error);
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }
}

impl std::ops::Index<usize> for ParseErrorList {
    type Output = ParseError;

    fn index(&self, index: usize) -> &ParseError {
        &self.errors[index]
    }
}

impl<'a> IntoIterator for &'a ParseErrorList {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bounded() {
        let mut list = ParseErrorList::tracking(2);
        list.add(ParseError::new(0, "one"));
        list.add(ParseError::new(5, "two"));
        list.add(ParseError::new(9, "three"));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].msg(), "two");
    }

    #[test]
    fn no_tracking_never_appends() {
        let mut list = ParseErrorList::no_tracking();
        assert!(!list.can_add_error());
        list.add(ParseError::new(0, "dropped"));
        assert!(list.is_empty());
    }

    #[test]
    fn display() {
        let err = ParseError::new(7, "Unexpected character");
        assert_eq!(err.to_string(), "7: Unexpected character");
    }
}
