//! A character queue with parsing helpers.

// escape char for chomp_balanced
const ESC: char = '\\';

pub struct TokenQueue {
    queue: String,
    pos: usize,
}

impl TokenQueue {
    pub fn new(data: impl Into<String>) -> TokenQueue {
        TokenQueue {
            queue: data.into(),
            pos: 0,
        }
    }

    /// Is the queue empty?
    pub fn is_empty(&self) -> bool {
        self.pos >= self.queue.len()
    }

    /// Adds a string to the start of the queue.
    pub fn add_first(&mut self, seq: &str) {
        // not very performant, but an edge case
        let mut queue = String::with_capacity(seq.len() + self.queue.len() - self.pos);
        queue.push_str(seq);
        queue.push_str(&self.queue[self.pos..]);
        self.queue = queue;
        self.pos = 0;
    }

    /// Tests if the next characters on the queue match the sequence. Case
    /// insensitive.
    pub fn matches(&self, seq: &str) -> bool {
        match self.queue.get(self.pos..self.pos + seq.len()) {
            Some(head) => head.eq_ignore_ascii_case(seq),
            None => false,
        }
    }

    /// Tests if the next characters match any of the sequences. Case
    /// insensitive.
    pub fn matches_any(&self, seq: &[&str]) -> bool {
        seq.iter().any(|s| self.matches(s))
    }

    pub fn matches_any_char(&self, chars: &[char]) -> bool {
        match self.peek() {
            Some(c) => chars.contains(&c),
            None => false,
        }
    }

    /// Tests if the queue matches the sequence (as with matches), and if
    /// it does, removes the matched string from the queue.
    pub fn match_chomp(&mut self, seq: &str) -> bool {
        if self.matches(seq) {
            self.pos += seq.len();
            true
        } else {
            false
        }
    }

    /// Tests if the queue starts with a whitespace character.
    pub fn matches_whitespace(&self) -> bool {
        matches!(self.peek(), Some(' ' | '\t' | '\n' | '\x0C' | '\r'))
    }

    /// Tests if the queue starts with a word character (letter or digit).
    pub fn matches_word(&self) -> bool {
        matches!(self.peek(), Some(c) if c.is_alphanumeric())
    }

    /// Drops the next character off the queue.
    pub fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Consumes one character off the queue, if there is one.
    pub fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Pulls a string off the queue, up to but exclusive of the match
    /// sequence, or to the queue running out. Case sensitive.
    pub fn consume_to(&mut self, seq: &str) -> String {
        match self.queue[self.pos..].find(seq) {
            Some(offset) => {
                let consumed = self.queue[self.pos..self.pos + offset].to_string();
                self.pos += offset;
                consumed
            }
            None => self.remainder(),
        }
    }

    /// Consumes to the first of the sequences provided, or to the end of
    /// the queue. Leaves the terminator on the queue. Case insensitive.
    pub fn consume_to_any(&mut self, seq: &[&str]) -> String {
        let start = self.pos;
        while !self.is_empty() && !self.matches_any(seq) {
            self.advance();
        }
        self.queue[start..self.pos].to_string()
    }

    /// Pulls a string off the queue (like consume_to), and then pulls off
    /// the matched string (but does not return it). Case sensitive.
    pub fn chomp_to(&mut self, seq: &str) -> String {
        let data = self.consume_to(seq);
        self.match_chomp(seq);
        data
    }

    /// Pulls a balanced string off the queue. E.g. if the queue is
    /// "(one (two) three) four", (,) will return "one (two) three", and
    /// leave " four" on the queue. Unbalanced openers and closers can be
    /// quoted (with ' or ") or escaped (with \). Those escapes will be
    /// left in the returned string, which is suitable for regexes, but
    /// unsuitable for contains text strings; use unescape for that.
    ///
    /// Returns None if the queue runs out before the balance closes.
    pub fn chomp_balanced(&mut self, open: char, close: char) -> Option<String> {
        let mut start = None;
        let mut end = None;
        let mut depth = 0;
        let mut last = '\0';
        let mut in_single_quote = false;
        let mut in_double_quote = false;
        let mut in_regex_qe = false; // regex \Q .. \E escapes

        loop {
            let Some(c) = self.consume() else { break };
            if last != ESC {
                if c == '\'' && c != open && !in_double_quote {
                    in_single_quote = !in_single_quote;
                } else if c == '"' && c != open && !in_single_quote {
                    in_double_quote = !in_double_quote;
                }
                if in_single_quote || in_double_quote || in_regex_qe {
                    last = c;
                    continue;
                }
                if c == open {
                    depth += 1;
                    if start.is_none() {
                        start = Some(self.pos);
                    }
                } else if c == close {
                    depth -= 1;
                }
            } else if c == 'Q' {
                in_regex_qe = true;
            } else if c == 'E' {
                in_regex_qe = false;
            }
            if depth > 0 && last != '\0' {
                // don't include the outer match pair in the return
                end = Some(self.pos);
            }
            last = c;
            if depth <= 0 {
                break;
            }
        }
        if depth > 0 {
            // ran out of queue before seeing enough closers
            return None;
        }
        match (start, end) {
            (Some(start), Some(end)) if end > start => Some(self.queue[start..end].to_string()),
            _ => Some(String::new()),
        }
    }

    /// Pulls the next run of whitespace characters off the queue.
    pub fn consume_whitespace(&mut self) -> bool {
        let mut seen = false;
        while self.matches_whitespace() {
            self.advance();
            seen = true;
        }
        seen
    }

    /// The next run of word type (letter or digit) characters off the
    /// queue, or an empty string if none.
    pub fn consume_word(&mut self) -> String {
        let start = self.pos;
        while self.matches_word() {
            self.advance();
        }
        self.queue[start..self.pos].to_string()
    }

    /// Consumes an element selector: a tag name, but with | instead of :
    /// for namespaces (or *| for a wildcard namespace), to not conflict
    /// with :pseudo selectors.
    pub fn consume_element_selector(&mut self) -> String {
        let start = self.pos;
        while !self.is_empty()
            && (self.matches_word() || self.matches_any(&["*|", "|", "_", "-"]))
        {
            self.advance();
        }
        self.queue[start..self.pos].to_string()
    }

    /// Consumes a CSS identifier (ID or class): letter, digit, -, _.
    pub fn consume_css_identifier(&mut self) -> String {
        let start = self.pos;
        while !self.is_empty() && (self.matches_word() || self.matches_any_char(&['-', '_'])) {
            self.advance();
        }
        self.queue[start..self.pos].to_string()
    }

    /// Consumes and returns whatever is left on the queue.
    pub fn remainder(&mut self) -> String {
        let remainder = self.queue[self.pos..].to_string();
        self.pos = self.queue.len();
        remainder
    }

    fn peek(&self) -> Option<char> {
        self.queue[self.pos..].chars().next()
    }
}

impl std::fmt::Display for TokenQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.queue[self.pos..])
    }
}

/// Unescapes a \ escaped string.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = '\0';
    for c in input.chars() {
        if c == ESC {
            if last == ESC {
                out.push(c);
                // treat the pair as consumed
                last = '\0';
                continue;
            }
        } else {
            out.push(c);
        }
        last = c;
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chomp_balanced() {
        let mut tq = TokenQueue::new(":contains(one (two) three) four");
        let pre = tq.consume_to("(");
        let guts = tq.chomp_balanced('(', ')').expect("balanced");
        let remainder = tq.remainder();

        assert_eq!(pre, ":contains");
        assert_eq!(guts, "one (two) three");
        assert_eq!(remainder, " four");
    }

    #[test]
    fn chomp_escaped_balanced() {
        let mut tq = TokenQueue::new(":contains(one (two) \\( \\) \\) three) four");
        let pre = tq.consume_to("(");
        let guts = tq.chomp_balanced('(', ')').expect("balanced");
        let remainder = tq.remainder();

        assert_eq!(pre, ":contains");
        assert_eq!(guts, "one (two) \\( \\) \\) three");
        assert_eq!(unescape(&guts), "one (two) ( ) ) three");
        assert_eq!(remainder, " four");
    }

    #[test]
    fn chomp_balanced_matches_as_much_as_possible() {
        let mut tq = TokenQueue::new("unbalanced(something(or another)) else");
        tq.consume_to("(");
        let match_str = tq.chomp_balanced('(', ')').expect("balanced");
        assert_eq!(match_str, "something(or another)");
    }

    #[test]
    fn chomp_balanced_handles_quotes() {
        let mut tq = TokenQueue::new("(one \"two)\" three) four");
        let guts = tq.chomp_balanced('(', ')').expect("balanced");
        assert_eq!(guts, "one \"two)\" three");
        assert_eq!(tq.remainder(), " four");
    }

    #[test]
    fn unbalanced_yields_none() {
        let mut tq = TokenQueue::new("(a(b)");
        assert_eq!(tq.chomp_balanced('(', ')'), None);
    }

    #[test]
    fn unescape_strings() {
        assert_eq!(unescape("one \\( \\) \\\\"), "one ( ) \\");
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn consume_to_ignores_case_in_matches() {
        let mut tq = TokenQueue::new("<textarea>one < two </TEXTarea>");
        assert!(tq.matches("<textarea"));
        tq.consume_to(">");
        assert!(tq.match_chomp(">"));
        assert_eq!(tq.consume_to("</"), "one < two ");
        assert!(tq.matches("</TEXTAREA"));
    }

    #[test]
    fn word_and_selector_consumption() {
        let mut tq = TokenQueue::new("h2.menu-item");
        assert_eq!(tq.consume_element_selector(), "h2");
        assert!(tq.match_chomp("."));
        assert_eq!(tq.consume_css_identifier(), "menu-item");
        assert!(tq.is_empty());
    }

    #[test]
    fn add_first_restores_content() {
        let mut tq = TokenQueue::new("one two");
        assert_eq!(tq.consume_word(), "one");
        tq.add_first("three ");
        assert_eq!(tq.consume_word(), "three");
        tq.consume_whitespace();
        assert_eq!(tq.remainder(), "two");
    }
}
