//! HTML tree builder; creates a DOM from tokens.
//!
//! Runs the insertion-mode state machine over the token stream, keeping
//! the stack of open elements and the list of active formatting
//! elements. Several stack walks are depth-bounded so crafted input
//! with thousands of unclosed elements degrades gracefully instead of
//! bogging the parser down.

use log::debug;

use crate::dom::{Attributes, Document, NodeId};
use crate::html_tree_builder_state::constants::IN_TABLE_FOSTER;
use crate::html_tree_builder_state::HtmlTreeBuilderState;
use crate::parse_error::{ParseError, ParseErrorList};
use crate::settings::{self, ParseSettings};
use crate::token::{CharacterToken, CommentToken, TagToken, Token};
use crate::tokeniser_state::TokeniserState;
use crate::tree_builder::{in_sorted, TreeBuilderCore};

// tag searches. must be sorted, used with in_sorted.
const TAGS_SEARCH_IN_SCOPE: &[&str] = &[
    "applet", "caption", "html", "marquee", "object", "table", "td", "th",
];
const TAG_SEARCH_LIST: &[&str] = &["ol", "ul"];
const TAG_SEARCH_BUTTON: &[&str] = &["button"];
const TAG_SEARCH_TABLE_SCOPE: &[&str] = &["html", "table"];
const TAG_SEARCH_SELECT_SCOPE: &[&str] = &["optgroup", "option"];
const TAG_SEARCH_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];
const TAG_THOROUGH_SEARCH_END_TAGS: &[&str] = &[
    "caption", "colgroup", "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
    "tbody", "td", "tfoot", "th", "thead", "tr",
];
const TAG_SEARCH_SPECIAL: &[&str] = &[
    "address", "applet", "area", "article", "aside", "base", "basefont", "bgsound", "blockquote",
    "body", "br", "button", "caption", "center", "col", "colgroup", "command", "dd", "details",
    "dir", "div", "dl", "dt", "embed", "fieldset", "figcaption", "figure", "footer", "form",
    "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr",
    "html", "iframe", "img", "input", "isindex", "li", "link", "listing", "marquee", "menu",
    "meta", "nav", "noembed", "noframes", "noscript", "object", "ol", "p", "param", "plaintext",
    "pre", "script", "section", "select", "style", "summary", "table", "tbody", "td", "textarea",
    "tfoot", "th", "thead", "title", "tr", "ul", "wbr", "xmp",
];

// prevents the parser bogging down in exceptionally broken pages
pub(crate) const MAX_SCOPE_SEARCH_DEPTH: usize = 100;
// an arbitrary tension point between real HTML and crafted pain
const MAX_QUEUE_DEPTH: usize = 256;
// limit how many formatting elements get recreated
const MAX_USED_FORMATTING_ELEMENTS: usize = 12;

pub(crate) struct HtmlTreeBuilder {
    pub(crate) core: TreeBuilderCore,
    state: HtmlTreeBuilderState,
    original_state: HtmlTreeBuilderState,
    base_uri_set_from_doc: bool,
    pub(crate) head_element: Option<NodeId>,
    pub(crate) form_element: Option<NodeId>,
    // fragment parse context; the synthesized root carrying the context
    // tag name
    context_element: Option<NodeId>,
    // active (open) formatting elements; None entries are scope markers
    formatting_elements: Vec<Option<NodeId>>,
    tmpl_insert_mode: Vec<HtmlTreeBuilderState>,
    pub(crate) pending_table_characters: Vec<String>,
    frameset_ok: bool,
    pub(crate) foster_inserts: bool,
    pub(crate) fragment_parsing: bool,
}

impl HtmlTreeBuilder {
    pub(crate) fn new(
        input: &str,
        base_uri: &str,
        settings: ParseSettings,
        errors: ParseErrorList,
        track_source_range: bool,
    ) -> HtmlTreeBuilder {
        HtmlTreeBuilder {
            core: TreeBuilderCore::new(input, base_uri, settings, errors, track_source_range),
            state: HtmlTreeBuilderState::INITIAL,
            original_state: HtmlTreeBuilderState::INITIAL,
            base_uri_set_from_doc: false,
            head_element: None,
            form_element: None,
            context_element: None,
            formatting_elements: Vec::new(),
            tmpl_insert_mode: Vec::new(),
            pending_table_characters: Vec::new(),
            frameset_ok: true,
            foster_inserts: false,
            fragment_parsing: false,
        }
    }

    /// Parses to completion and yields the document and any collected
    /// errors.
    pub(crate) fn run(mut self) -> (Document, ParseErrorList) {
        self.run_parser();
        (self.core.doc, self.core.tokeniser.errors)
    }

    /// Parses a fragment in the given context element, yielding the
    /// document, the parsed nodes, and any collected errors.
    pub(crate) fn run_fragment(
        mut self,
        context: Option<&str>,
    ) -> (Document, Vec<NodeId>, ParseErrorList) {
        self.fragment_parsing = true;
        let mut root = None;
        if let Some(context_tag) = context {
            let context_tag = settings::normal_name(context_tag);
            // initialise the tokeniser state per the context
            match context_tag.as_str() {
                "title" | "textarea" => {
                    self.core.tokeniser.transition(TokeniserState::RCDATA);
                }
                "iframe" | "noembed" | "noframes" | "style" | "xml" => {
                    self.core.tokeniser.transition(TokeniserState::RAWTEXT);
                }
                "script" => {
                    self.core.tokeniser.transition(TokeniserState::SCRIPT_DATA);
                }
                "plaintext" => {
                    self.core.tokeniser.transition(TokeniserState::PLAINTEXT);
                }
                "template" => {
                    self.core.tokeniser.transition(TokeniserState::DATA);
                    self.push_template_mode(HtmlTreeBuilderState::IN_TEMPLATE);
                }
                // noscript parses as data (scripting flag off), as does
                // everything else
                _ => self.core.tokeniser.transition(TokeniserState::DATA),
            }
            let parse_settings = self.core.settings;
            let tag = self.core.tag_for(&context_tag, &parse_settings);
            let el = self.core.doc.new_element(tag, Attributes::new());
            let doc_root = self.core.doc.root();
            self.core.doc.append_child(doc_root, el);
            self.core.stack.push(el);
            self.context_element = Some(el);
            self.reset_insertion_mode();
            // form controls parsed in a form context get associated with
            // that form
            if context_tag == "form" {
                self.form_element = Some(el);
            }
            root = Some(el);
        }
        self.run_parser();
        let nodes = match root {
            Some(root) => {
                // depending on context and the input html, content may
                // have been added outside of the root el, e.g.
                // context=p, input=div; the div gets pushed out. Fold
                // those back in.
                let doc_root = self.core.doc.root();
                let siblings: Vec<NodeId> = self
                    .core
                    .doc
                    .children(doc_root)
                    .iter()
                    .copied()
                    .filter(|&n| n != root)
                    .collect();
                if !siblings.is_empty() {
                    let at = self.core.doc.children(root).len();
                    self.core.doc.insert_children(root, at, &siblings);
                }
                self.core.doc.children(root).to_vec()
            }
            None => {
                let doc_root = self.core.doc.root();
                self.core.doc.children(doc_root).to_vec()
            }
        };
        (self.core.doc, nodes, self.core.tokeniser.errors)
    }

    fn run_parser(&mut self) {
        loop {
            let mut token = self.core.tokeniser.read();
            let at_eof = token.is_eof();
            self.process(&mut token);
            if at_eof {
                break;
            }
        }
    }

    pub(crate) fn process(&mut self, token: &mut Token) -> bool {
        self.core.remember_token(token);
        let state = self.state;
        state.process(token, self)
    }

    pub(crate) fn process_in(&mut self, token: &mut Token, state: HtmlTreeBuilderState) -> bool {
        self.core.remember_token(token);
        state.process(token, self)
    }

    // virtual start tags, auto-created by the builder; these carry no
    // source position
    pub(crate) fn process_start_tag(&mut self, name: &str) -> bool {
        let mut token = Token::StartTag(TagToken::named(name));
        self.process(&mut token)
    }

    pub(crate) fn process_start_tag_with_attributes(
        &mut self,
        name: &str,
        attributes: Attributes,
    ) -> bool {
        let mut token = Token::StartTag(TagToken::named_with_attributes(name, attributes));
        self.process(&mut token)
    }

    pub(crate) fn process_end_tag(&mut self, name: &str) -> bool {
        let mut token = Token::EndTag(TagToken::named(name));
        self.process(&mut token)
    }

    pub(crate) fn transition(&mut self, state: HtmlTreeBuilderState) {
        self.state = state;
    }

    pub(crate) fn state(&self) -> HtmlTreeBuilderState {
        self.state
    }

    pub(crate) fn mark_insertion_mode(&mut self) {
        self.original_state = self.state;
    }

    pub(crate) fn original_state(&self) -> HtmlTreeBuilderState {
        self.original_state
    }

    pub(crate) fn set_frameset_ok(&mut self, frameset_ok: bool) {
        self.frameset_ok = frameset_ok;
    }

    pub(crate) fn frameset_ok(&self) -> bool {
        self.frameset_ok
    }

    /// Only the first `<base href>` in the parse sets the document base.
    pub(crate) fn maybe_set_base_uri(&mut self, base: NodeId) {
        if self.base_uri_set_from_doc {
            return;
        }
        let href = self
            .core
            .doc
            .attributes(base)
            .and_then(|attrs| attrs.get("href"))
            .unwrap_or("")
            .to_string();
        if !href.is_empty() {
            // ignore <base target> etc
            self.core.base_uri = href.clone();
            self.base_uri_set_from_doc = true;
            self.core.doc.set_base_uri(&href);
        }
    }

    pub(crate) fn error(&mut self, state: HtmlTreeBuilderState) {
        if self.core.tokeniser.errors.can_add_error() {
            let msg = match &self.core.current_token {
                Some(token) => format!(
                    "Unexpected {} token [{}] when in state [{:?}]",
                    token.token_type(),
                    token,
                    state
                ),
                None => format!("Unexpected token when in state [{:?}]", state),
            };
            let pos = self.core.tokeniser.reader.pos();
            self.core.tokeniser.errors.add(ParseError::new(pos, msg));
        }
    }

    pub(crate) fn insert_start(&mut self, start_tag: &mut TagToken) -> NodeId {
        // cleanup duplicate attributes
        if let Some(attrs) = &mut start_tag.attributes {
            if !attrs.is_empty() {
                let dupes = attrs.deduplicate(&self.core.settings);
                if dupes > 0 {
                    let name = start_tag.normal_name().to_string();
                    self.core
                        .error(format!("Dropped duplicate attribute(s) in tag [{}]", name));
                }
            }
        }

        // handle empty unknown tags: when a void tag is expected the
        // states hit insert_empty directly, so this fake end tag is only
        // generated for the <foo /> form
        if start_tag.self_closing {
            let el = self.insert_empty(start_tag);
            self.core.stack.push(el);
            // get out of whatever tokeniser state we are in (handles
            // <script /> and friends), then yield the close
            self.core.tokeniser.transition(TokeniserState::DATA);
            let name = match self.core.doc.tag(el) {
                Some(tag) => tag.name().to_string(),
                None => String::new(),
            };
            self.core.tokeniser.emit(Token::EndTag(TagToken::named(&name)));
            return el;
        }

        let parse_settings = self.core.settings;
        let tag = self.core.tag_for(start_tag.name(), &parse_settings);
        let mut attrs = start_tag.attributes.take().unwrap_or_default();
        parse_settings.normalize_attributes(&mut attrs);
        let el = self.core.doc.new_element(tag, attrs);
        self.insert_node(el, Some((start_tag.start_pos, start_tag.end_pos)));
        self.core.stack.push(el);
        el
    }

    pub(crate) fn insert_start_tag(&mut self, name: &str) -> NodeId {
        let parse_settings = self.core.settings;
        let tag = self.core.tag_for(name, &parse_settings);
        let el = self.core.doc.new_element(tag, Attributes::new());
        self.insert_element(el);
        el
    }

    pub(crate) fn insert_element(&mut self, el: NodeId) {
        self.insert_node(el, None);
        self.core.stack.push(el);
    }

    pub(crate) fn insert_empty(&mut self, start_tag: &mut TagToken) -> NodeId {
        let parse_settings = self.core.settings;
        let mut tag = self.core.tag_for(start_tag.name(), &parse_settings);
        let mut attrs = start_tag.attributes.take().unwrap_or_default();
        parse_settings.normalize_attributes(&mut attrs);
        if start_tag.self_closing {
            if tag.is_known() {
                if !tag.is_empty() {
                    let msg = format!(
                        "Tag [{}] cannot be self closing; not a void tag",
                        tag.normal_name()
                    );
                    self.core.tokeniser.error_msg(msg);
                }
            } else {
                // unknown tag: remember it is self closing, for output
                tag.set_self_closing();
            }
        }
        let el = self.core.doc.new_element(tag, attrs);
        self.insert_node(el, Some((start_tag.start_pos, start_tag.end_pos)));
        el
    }

    pub(crate) fn insert_form(
        &mut self,
        start_tag: &mut TagToken,
        on_stack: bool,
        check_template_stack: bool,
    ) -> NodeId {
        let parse_settings = self.core.settings;
        let tag = self.core.tag_for(start_tag.name(), &parse_settings);
        let mut attrs = start_tag.attributes.take().unwrap_or_default();
        parse_settings.normalize_attributes(&mut attrs);
        let el = self.core.doc.new_element(tag, attrs);
        if check_template_stack {
            if !self.on_stack_name("template") {
                self.form_element = Some(el);
            }
        } else {
            self.form_element = Some(el);
        }
        self.insert_node(el, Some((start_tag.start_pos, start_tag.end_pos)));
        if on_stack {
            self.core.stack.push(el);
        }
        el
    }

    pub(crate) fn insert_comment(&mut self, comment_token: &CommentToken) {
        let node = self.core.doc.new_comment(comment_token.data.clone());
        self.insert_node(node, Some((comment_token.start_pos, comment_token.end_pos)));
    }

    /// Character data goes into the current element directly, never
    /// fostered; fostered table text is routed through the pending table
    /// characters replay instead.
    pub(crate) fn insert_character(&mut self, character_token: &CharacterToken) {
        // will be the doc if nothing is on the stack, which allows for
        // whitespace to land in the doc root
        let el = self.core.current_element();
        let data = character_token.data.clone();
        let node = if character_token.cdata {
            self.core.doc.new_cdata(data)
        } else if is_content_for_tag_data(self.core.doc.normal_name(el)) {
            self.core.doc.new_data(data)
        } else {
            self.core.doc.new_text(data)
        };
        self.core.doc.append_child(el, node);
        self.core.on_node_inserted(
            node,
            Some((character_token.start_pos, character_token.end_pos)),
        );
    }

    fn insert_node(&mut self, node: NodeId, span: Option<(usize, usize)>) {
        // if the stack hasn't been set up yet, elements (doctype,
        // comments) go into the doc
        if self.core.stack.is_empty() {
            let root = self.core.doc.root();
            self.core.doc.append_child(root, node);
        } else if self.foster_inserts
            && in_sorted(
                self.core.doc.normal_name(self.core.current_element()),
                IN_TABLE_FOSTER,
            )
        {
            self.insert_in_foster_parent(node);
        } else {
            let current = self.core.current_element();
            self.core.doc.append_child(current, node);
        }

        // connect form controls to their form element
        let form_listed = self
            .core
            .doc
            .tag(node)
            .map(|tag| tag.is_form_listed())
            .unwrap_or(false);
        if form_listed {
            if let Some(form) = self.form_element {
                self.core.doc.add_form_control(form, node);
            }
        }
        self.core.on_node_inserted(node, span);
    }

    pub(crate) fn pop(&mut self) -> Option<NodeId> {
        self.core.stack.pop()
    }

    pub(crate) fn push(&mut self, element: NodeId) {
        self.core.stack.push(element);
    }

    pub(crate) fn on_stack(&self, el: NodeId) -> bool {
        let bottom = match self.core.stack.len().checked_sub(1) {
            Some(bottom) => bottom,
            None => return false,
        };
        let upper = if bottom >= MAX_QUEUE_DEPTH {
            bottom - MAX_QUEUE_DEPTH
        } else {
            0
        };
        self.core.stack[upper..=bottom].iter().any(|&e| e == el)
    }

    pub(crate) fn on_stack_name(&self, el_name: &str) -> bool {
        self.get_from_stack(el_name).is_some()
    }

    pub(crate) fn get_from_stack(&self, el_name: &str) -> Option<NodeId> {
        let bottom = self.core.stack.len().checked_sub(1)?;
        let upper = if bottom >= MAX_QUEUE_DEPTH {
            bottom - MAX_QUEUE_DEPTH
        } else {
            0
        };
        for pos in (upper..=bottom).rev() {
            let next = self.core.stack[pos];
            if self.core.doc.normal_name(next) == el_name {
                return Some(next);
            }
        }
        None
    }

    pub(crate) fn remove_from_stack(&mut self, el: NodeId) -> bool {
        match self.core.stack.iter().rposition(|&e| e == el) {
            Some(pos) => {
                self.core.stack.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn pop_stack_to_close(&mut self, el_name: &str) -> Option<NodeId> {
        while let Some(el) = self.core.stack.pop() {
            if self.core.doc.normal_name(el) == el_name {
                if matches!(self.core.current_token, Some(Token::EndTag(_))) {
                    let span = self.core.current_token_span();
                    self.core.on_node_closed(el, span);
                }
                return Some(el);
            }
        }
        None
    }

    // el_names is sorted, comes from the state constants
    pub(crate) fn pop_stack_to_close_any(&mut self, el_names: &[&str]) {
        while let Some(el) = self.core.stack.pop() {
            if in_sorted(self.core.doc.normal_name(el), el_names) {
                break;
            }
        }
    }

    pub(crate) fn pop_stack_to_before(&mut self, el_name: &str) {
        while let Some(&el) = self.core.stack.last() {
            if self.core.doc.normal_name(el) == el_name {
                break;
            }
            self.core.stack.pop();
        }
    }

    pub(crate) fn clear_stack_to_table_context(&mut self) {
        self.clear_stack_to_context(&["table", "template"]);
    }

    pub(crate) fn clear_stack_to_table_body_context(&mut self) {
        self.clear_stack_to_context(&["tbody", "tfoot", "thead", "template"]);
    }

    pub(crate) fn clear_stack_to_table_row_context(&mut self) {
        self.clear_stack_to_context(&["tr", "template"]);
    }

    fn clear_stack_to_context(&mut self, node_names: &[&str]) {
        while let Some(&el) = self.core.stack.last() {
            let name = self.core.doc.normal_name(el);
            if node_names.contains(&name) || name == "html" {
                break;
            }
            self.core.stack.pop();
        }
    }

    pub(crate) fn above_on_stack(&self, el: NodeId) -> Option<NodeId> {
        let pos = self.core.stack.iter().rposition(|&e| e == el)?;
        pos.checked_sub(1).map(|above| self.core.stack[above])
    }

    pub(crate) fn insert_on_stack_after(&mut self, after: NodeId, el: NodeId) {
        let i = self
            .core
            .stack
            .iter()
            .rposition(|&e| e == after)
            .expect("element not on stack");
        self.core.stack.insert(i + 1, el);
    }

    pub(crate) fn replace_on_stack(&mut self, out: NodeId, el: NodeId) {
        let i = self
            .core
            .stack
            .iter()
            .rposition(|&e| e == out)
            .expect("element not on stack");
        self.core.stack[i] = el;
    }

    /// Resets the insertion mode by searching up the stack for an
    /// appropriate mode. The search depth is bounded. Returns true if
    /// the mode actually changed.
    pub(crate) fn reset_insertion_mode(&mut self) -> bool {
        // https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode
        use HtmlTreeBuilderState::*;
        let orig_state = self.state;
        if self.core.stack.is_empty() {
            // nothing left of stack, just get to body
            self.transition(IN_BODY);
            return self.state != orig_state;
        }
        let mut last = false;
        let bottom = self.core.stack.len() - 1;
        let upper = if bottom >= MAX_QUEUE_DEPTH {
            bottom - MAX_QUEUE_DEPTH
        } else {
            0
        };
        for pos in (upper..=bottom).rev() {
            let mut node = self.core.stack[pos];
            if pos == upper {
                last = true;
                if self.fragment_parsing {
                    if let Some(context) = self.context_element {
                        node = context;
                    }
                }
            }
            match self.core.doc.normal_name(node) {
                "select" => {
                    self.transition(IN_SELECT);
                    break;
                }
                "td" | "th" if !last => {
                    self.transition(IN_CELL);
                    break;
                }
                "tr" => {
                    self.transition(IN_ROW);
                    break;
                }
                "tbody" | "thead" | "tfoot" => {
                    self.transition(IN_TABLE_BODY);
                    break;
                }
                "caption" => {
                    self.transition(IN_CAPTION);
                    break;
                }
                "colgroup" => {
                    self.transition(IN_COLUMN_GROUP);
                    break;
                }
                "table" => {
                    self.transition(IN_TABLE);
                    break;
                }
                "template" => {
                    let tmpl_state = self
                        .current_template_mode()
                        .expect("no template insertion mode on stack");
                    self.transition(tmpl_state);
                    break;
                }
                "head" if !last => {
                    self.transition(IN_HEAD);
                    break;
                }
                "body" => {
                    self.transition(IN_BODY);
                    break;
                }
                "frameset" => {
                    self.transition(IN_FRAMESET);
                    break;
                }
                "html" => {
                    self.transition(if self.head_element.is_none() {
                        BEFORE_HEAD
                    } else {
                        AFTER_HEAD
                    });
                    break;
                }
                _ => {}
            }
            if last {
                self.transition(IN_BODY);
                break;
            }
        }
        self.state != orig_state
    }

    /// Places the body back onto the stack and moves to InBody, for the
    /// AfterBody / AfterAfterBody cases where more content arrives.
    pub(crate) fn reset_body(&mut self) {
        if !self.on_stack_name("body") {
            if let Some(body) = self.document_body() {
                self.core.stack.push(body);
            }
        }
        self.transition(HtmlTreeBuilderState::IN_BODY);
    }

    /// The document's body (or frameset) element, if one was created.
    fn document_body(&self) -> Option<NodeId> {
        let root = self.core.doc.root();
        let html = self
            .core
            .doc
            .children(root)
            .iter()
            .copied()
            .find(|&n| self.core.doc.normal_name(n) == "html")?;
        self.core.doc.children(html).iter().copied().find(|&n| {
            let name = self.core.doc.normal_name(n);
            name == "body" || name == "frameset"
        })
    }

    // https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope
    fn in_specific_scope(
        &self,
        target_name: &str,
        base_types: &[&str],
        extra_types: Option<&[&str]>,
    ) -> bool {
        let bottom = match self.core.stack.len().checked_sub(1) {
            Some(bottom) => bottom,
            None => return false,
        };
        // don't walk too far up the tree
        let top = if bottom > MAX_SCOPE_SEARCH_DEPTH {
            bottom - MAX_SCOPE_SEARCH_DEPTH
        } else {
            0
        };
        for pos in (top..=bottom).rev() {
            let el_name = self.core.doc.normal_name(self.core.stack[pos]);
            if el_name == target_name {
                return true;
            }
            if in_sorted(el_name, base_types) {
                return false;
            }
            if let Some(extra) = extra_types {
                if in_sorted(el_name, extra) {
                    return false;
                }
            }
        }
        // would hit 'html' at the root (in the base types) first
        false
    }

    fn in_specific_scope_any(
        &self,
        target_names: &[&str],
        base_types: &[&str],
        extra_types: Option<&[&str]>,
    ) -> bool {
        let bottom = match self.core.stack.len().checked_sub(1) {
            Some(bottom) => bottom,
            None => return false,
        };
        let top = if bottom > MAX_SCOPE_SEARCH_DEPTH {
            bottom - MAX_SCOPE_SEARCH_DEPTH
        } else {
            0
        };
        for pos in (top..=bottom).rev() {
            let el_name = self.core.doc.normal_name(self.core.stack[pos]);
            if in_sorted(el_name, target_names) {
                return true;
            }
            if in_sorted(el_name, base_types) {
                return false;
            }
            if let Some(extra) = extra_types {
                if in_sorted(el_name, extra) {
                    return false;
                }
            }
        }
        false
    }

    pub(crate) fn in_scope(&self, target_name: &str) -> bool {
        self.in_specific_scope(target_name, TAGS_SEARCH_IN_SCOPE, None)
    }

    pub(crate) fn in_scope_any(&self, target_names: &[&str]) -> bool {
        self.in_specific_scope_any(target_names, TAGS_SEARCH_IN_SCOPE, None)
    }

    fn in_scope_with(&self, target_name: &str, extras: &[&str]) -> bool {
        self.in_specific_scope(target_name, TAGS_SEARCH_IN_SCOPE, Some(extras))
    }

    pub(crate) fn in_list_item_scope(&self, target_name: &str) -> bool {
        self.in_scope_with(target_name, TAG_SEARCH_LIST)
    }

    pub(crate) fn in_button_scope(&self, target_name: &str) -> bool {
        self.in_scope_with(target_name, TAG_SEARCH_BUTTON)
    }

    pub(crate) fn in_table_scope(&self, target_name: &str) -> bool {
        self.in_specific_scope(target_name, TAG_SEARCH_TABLE_SCOPE, None)
    }

    pub(crate) fn in_select_scope(&self, target_name: &str) -> bool {
        for &el in self.core.stack.iter().rev() {
            let el_name = self.core.doc.normal_name(el);
            if el_name == target_name {
                return true;
            }
            // all elements except the select sub-tags break the scope
            if !in_sorted(el_name, TAG_SEARCH_SELECT_SCOPE) {
                return false;
            }
        }
        false
    }

    pub(crate) fn new_pending_table_characters(&mut self) {
        self.pending_table_characters = Vec::new();
    }

    /// Pops elements off the stack according to the implied end tag
    /// rules; thorough additionally covers the table sub-elements.
    pub(crate) fn generate_implied_end_tags(&mut self, thorough: bool) {
        let search = if thorough {
            TAG_THOROUGH_SEARCH_END_TAGS
        } else {
            TAG_SEARCH_END_TAGS
        };
        while !self.core.stack.is_empty()
            && in_sorted(
                self.core.doc.normal_name(self.core.current_element()),
                search,
            )
        {
            self.pop();
        }
    }

    /// As [`generate_implied_end_tags`](Self::generate_implied_end_tags),
    /// but performs the steps as if the excluded tag was not in the list.
    pub(crate) fn generate_implied_end_tags_excluding(&mut self, exclude_tag: &str) {
        while !self.core.stack.is_empty()
            && in_sorted(
                self.core.doc.normal_name(self.core.current_element()),
                TAG_SEARCH_END_TAGS,
            )
        {
            if self.core.current_element_is(exclude_tag) {
                break;
            }
            self.pop();
        }
    }

    pub(crate) fn close_element(&mut self, name: &str) {
        self.generate_implied_end_tags_excluding(name);
        if self.core.doc.normal_name(self.core.current_element()) != name {
            let state = self.state;
            self.error(state);
        }
        self.pop_stack_to_close(name);
    }

    pub(crate) fn is_special(&self, el: NodeId) -> bool {
        in_sorted(self.core.doc.normal_name(el), TAG_SEARCH_SPECIAL)
    }

    pub(crate) fn last_formatting_element(&self) -> Option<NodeId> {
        self.formatting_elements.last().copied().flatten()
    }

    pub(crate) fn position_of_element(&self, el: NodeId) -> Option<usize> {
        self.formatting_elements.iter().position(|&e| e == Some(el))
    }

    pub(crate) fn push_active_formatting_elements(&mut self, el: NodeId) {
        self.check_active_formatting_elements(el);
        self.formatting_elements.push(Some(el));
    }

    pub(crate) fn push_with_bookmark(&mut self, el: NodeId, bookmark: usize) {
        self.check_active_formatting_elements(el);
        if bookmark <= self.formatting_elements.len() {
            self.formatting_elements.insert(bookmark, Some(el));
        } else {
            // bookmark was out of range; append instead
            self.formatting_elements.push(Some(el));
        }
    }

    // the Noah's Ark clause: the third matching element in the window
    // gets removed
    fn check_active_formatting_elements(&mut self, new_el: NodeId) {
        let size = match self.formatting_elements.len().checked_sub(1) {
            Some(size) => size,
            None => return,
        };
        let ceil = size.saturating_sub(MAX_USED_FORMATTING_ELEMENTS);
        let mut num_seen = 0;
        for pos in (ceil..=size).rev() {
            let el = match self.formatting_elements[pos] {
                Some(el) => el,
                None => break, // marker
            };
            if self.is_same_formatting_element(new_el, el) {
                num_seen += 1;
            }
            if num_seen == 3 {
                self.formatting_elements.remove(pos);
                break;
            }
        }
    }

    fn is_same_formatting_element(&self, a: NodeId, b: NodeId) -> bool {
        // same if: same tag and attributes
        self.core.doc.normal_name(a) == self.core.doc.normal_name(b)
            && self.core.doc.attributes(a) == self.core.doc.attributes(b)
    }

    pub(crate) fn reconstruct_formatting_elements(&mut self) {
        if self.core.stack.len() > MAX_QUEUE_DEPTH {
            debug!(
                "skipping formatting reconstruction, open elements depth {} over {}",
                self.core.stack.len(),
                MAX_QUEUE_DEPTH
            );
            return;
        }
        let last = match self.last_formatting_element() {
            Some(last) if !self.on_stack(last) => last,
            _ => return,
        };
        let size = self.formatting_elements.len();
        let ceil = size.saturating_sub(MAX_USED_FORMATTING_ELEMENTS);
        let mut pos = size - 1;
        let mut skip = false;
        let mut entry = Some(last);
        loop {
            if pos == ceil {
                // step 4. if none before, skip to 8
                skip = true;
                break;
            }
            // step 5. one earlier than entry
            pos -= 1;
            entry = self.formatting_elements[pos];
            match entry {
                // step 6 - neither marker nor on stack: jump to 8, else
                // continue back to 4
                None => break,
                Some(el) if self.on_stack(el) => break,
                _ => {}
            }
        }
        loop {
            if !skip {
                // step 7: on later than entry
                pos += 1;
                entry = self.formatting_elements[pos];
            }
            // can only skip the increment from step 4
            skip = false;
            let el = entry.expect("formatting element entry");

            // 8. create new element from entry, 9. insert into current
            // node, onto stack
            let name = self.core.doc.normal_name(el).to_string();
            let parse_settings = self.core.settings;
            let tag = self.core.tag_for(&name, &parse_settings);
            let attrs = self
                .core
                .doc
                .attributes(el)
                .cloned()
                .unwrap_or_default();
            let new_el = self.core.doc.new_element(tag, attrs);
            self.insert_element(new_el);

            // 10. replace entry with new entry
            self.formatting_elements[pos] = Some(new_el);

            // 11. if not the last entry in the list, jump back to 7
            if pos == size - 1 {
                break;
            }
        }
    }

    pub(crate) fn clear_formatting_elements_to_last_marker(&mut self) {
        while let Some(entry) = self.formatting_elements.pop() {
            if entry.is_none() {
                break;
            }
        }
    }

    pub(crate) fn remove_from_active_formatting_elements(&mut self, el: NodeId) {
        if let Some(pos) = self
            .formatting_elements
            .iter()
            .rposition(|&e| e == Some(el))
        {
            self.formatting_elements.remove(pos);
        }
    }

    pub(crate) fn is_in_active_formatting_elements(&self, el: NodeId) -> bool {
        let bottom = match self.formatting_elements.len().checked_sub(1) {
            Some(bottom) => bottom,
            None => return false,
        };
        let upper = if bottom >= MAX_QUEUE_DEPTH {
            bottom - MAX_QUEUE_DEPTH
        } else {
            0
        };
        self.formatting_elements[upper..=bottom]
            .iter()
            .any(|&e| e == Some(el))
    }

    pub(crate) fn get_active_formatting_element(&self, node_name: &str) -> Option<NodeId> {
        for &entry in self.formatting_elements.iter().rev() {
            match entry {
                None => break, // scope marker
                Some(el) if self.core.doc.normal_name(el) == node_name => return Some(el),
                _ => {}
            }
        }
        None
    }

    pub(crate) fn replace_active_formatting_element(&mut self, out: NodeId, el: NodeId) {
        let i = self
            .formatting_elements
            .iter()
            .rposition(|&e| e == Some(out))
            .expect("element not in formatting list");
        self.formatting_elements[i] = Some(el);
    }

    pub(crate) fn insert_marker_to_formatting_elements(&mut self) {
        self.formatting_elements.push(None);
    }

    pub(crate) fn insert_in_foster_parent(&mut self, node: NodeId) {
        match self.get_from_stack("table") {
            Some(last_table) => {
                if self.core.doc.parent(last_table).is_some() {
                    self.core.doc.insert_before(node, last_table);
                } else if let Some(above) = self.above_on_stack(last_table) {
                    self.core.doc.append_child(above, node);
                }
            }
            None => {
                // no table == frag
                let first = self.core.stack[0];
                self.core.doc.append_child(first, node);
            }
        }
    }

    // template insertion mode stack
    pub(crate) fn push_template_mode(&mut self, state: HtmlTreeBuilderState) {
        self.tmpl_insert_mode.push(state);
    }

    pub(crate) fn pop_template_mode(&mut self) -> Option<HtmlTreeBuilderState> {
        self.tmpl_insert_mode.pop()
    }

    pub(crate) fn template_mode_size(&self) -> usize {
        self.tmpl_insert_mode.len()
    }

    pub(crate) fn current_template_mode(&self) -> Option<HtmlTreeBuilderState> {
        self.tmpl_insert_mode.last().copied()
    }
}

/// For the HTML parse, script and style text is data, not text nodes.
pub(crate) fn is_content_for_tag_data(normal_name: &str) -> bool {
    normal_name == "script" || normal_name == "style"
}

#[cfg(test)]
mod test {
    use super::*;

    fn builder(input: &str) -> HtmlTreeBuilder {
        HtmlTreeBuilder::new(
            input,
            "",
            ParseSettings::HTML_DEFAULT,
            ParseErrorList::no_tracking(),
            false,
        )
    }

    #[test]
    fn search_tables_are_sorted() {
        for table in [
            TAGS_SEARCH_IN_SCOPE,
            TAG_SEARCH_LIST,
            TAG_SEARCH_BUTTON,
            TAG_SEARCH_TABLE_SCOPE,
            TAG_SEARCH_SELECT_SCOPE,
            TAG_SEARCH_END_TAGS,
            TAG_THOROUGH_SEARCH_END_TAGS,
            TAG_SEARCH_SPECIAL,
        ] {
            let mut sorted = table.to_vec();
            sorted.sort_unstable();
            assert_eq!(table, sorted.as_slice());
        }
    }

    #[test]
    fn scope_search_finds_and_blocks() {
        let mut tb = builder("");
        for name in ["html", "body", "table", "td", "b"] {
            tb.insert_start_tag(name);
        }
        assert!(tb.in_scope("b"));
        assert!(tb.in_scope("td"));
        // the td scope boundary hides the table's surroundings
        assert!(!tb.in_scope("body"));
        assert!(tb.in_table_scope("td"));
        assert!(!tb.in_table_scope("body"));
    }

    #[test]
    fn noahs_ark_caps_identical_formatting_elements() {
        let mut tb = builder("");
        tb.insert_start_tag("html");
        let mut els = Vec::new();
        for _ in 0..4 {
            let el = tb.insert_start_tag("b");
            tb.push_active_formatting_elements(el);
            els.push(el);
        }
        // the first of the four identical entries was evicted
        assert_eq!(tb.formatting_elements.len(), 3);
        assert!(!tb.is_in_active_formatting_elements(els[0]));
        assert!(tb.is_in_active_formatting_elements(els[3]));
    }

    #[test]
    fn formatting_markers_block_lookup() {
        let mut tb = builder("");
        tb.insert_start_tag("html");
        let a = tb.insert_start_tag("a");
        tb.push_active_formatting_elements(a);
        tb.insert_marker_to_formatting_elements();
        assert_eq!(tb.get_active_formatting_element("a"), None);
        tb.clear_formatting_elements_to_last_marker();
        assert!(tb.is_in_active_formatting_elements(a));
    }

    #[test]
    fn reset_insertion_mode_from_stack() {
        let mut tb = builder("");
        for name in ["html", "body", "table", "tbody", "tr"] {
            tb.insert_start_tag(name);
        }
        tb.reset_insertion_mode();
        assert_eq!(tb.state(), HtmlTreeBuilderState::IN_ROW);
        tb.pop();
        tb.reset_insertion_mode();
        assert_eq!(tb.state(), HtmlTreeBuilderState::IN_TABLE_BODY);
    }

    #[test]
    fn foster_parent_inserts_before_table() {
        let mut tb = builder("");
        tb.insert_start_tag("html");
        let body = tb.insert_start_tag("body");
        let table = tb.insert_start_tag("table");
        let text = tb.core.doc.new_text("fostered".into());
        tb.insert_in_foster_parent(text);
        let children = tb.core.doc.children(body);
        assert_eq!(children, &[text, table]);
    }
}
