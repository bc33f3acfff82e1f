//! The tree builder's current insertion mode. Each state embodies the
//! processing for that mode and the transitions out of it.

use log::debug;

use crate::dom::{Attributes, NodeId, QuirksMode};
use crate::html_tree_builder::HtmlTreeBuilder;
use crate::settings::ParseSettings;
use crate::token::{CharacterToken, TagToken, Token};
use crate::tokeniser_state::TokeniserState;
use crate::tree_builder::in_sorted;

use constants::*;
use HtmlTreeBuilderState::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTreeBuilderState {
    INITIAL,
    BEFORE_HTML,
    BEFORE_HEAD,
    IN_HEAD,
    IN_HEAD_NOSCRIPT,
    AFTER_HEAD,
    IN_BODY,
    TEXT,
    IN_TABLE,
    IN_TABLE_TEXT,
    IN_CAPTION,
    IN_COLUMN_GROUP,
    IN_TABLE_BODY,
    IN_ROW,
    IN_CELL,
    IN_SELECT,
    IN_SELECT_IN_TABLE,
    IN_TEMPLATE,
    AFTER_BODY,
    IN_FRAMESET,
    AFTER_FRAMESET,
    AFTER_AFTER_BODY,
    AFTER_AFTER_FRAMESET,
    FOREIGN_CONTENT,
}

impl HtmlTreeBuilderState {
    pub(crate) fn process(self, t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        match self {
            INITIAL => initial(t, tb),
            BEFORE_HTML => before_html(t, tb),
            BEFORE_HEAD => before_head(t, tb),
            IN_HEAD => in_head(t, tb),
            IN_HEAD_NOSCRIPT => in_head_noscript(t, tb),
            AFTER_HEAD => after_head(t, tb),
            IN_BODY => in_body(t, tb),
            TEXT => text(t, tb),
            IN_TABLE => in_table(t, tb),
            IN_TABLE_TEXT => in_table_text(t, tb),
            IN_CAPTION => in_caption(t, tb),
            IN_COLUMN_GROUP => in_column_group(t, tb),
            IN_TABLE_BODY => in_table_body(t, tb),
            IN_ROW => in_row(t, tb),
            IN_CELL => in_cell(t, tb),
            IN_SELECT => in_select(t, tb),
            IN_SELECT_IN_TABLE => in_select_in_table(t, tb),
            IN_TEMPLATE => in_template(t, tb),
            AFTER_BODY => after_body(t, tb),
            IN_FRAMESET => in_frameset(t, tb),
            AFTER_FRAMESET => after_frameset(t, tb),
            AFTER_AFTER_BODY => after_after_body(t, tb),
            AFTER_AFTER_FRAMESET => after_after_frameset(t, tb),
            FOREIGN_CONTENT => foreign_content(t, tb),
        }
    }
}

const NULL_STRING: &str = "\u{0}";
// used for the dd / dt scan, prevents runaway
const MAX_STACK_SCAN: usize = 24;

fn initial(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    if is_whitespace(t) {
        return true; // ignore whitespace until we get the first content
    }
    match t {
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(d) => {
            let name = tb.core.settings.normalize_tag(&d.name);
            let doctype = tb.core.doc.new_doctype(
                name,
                d.pub_sys_key.clone(),
                d.public_identifier.clone(),
                d.system_identifier.clone(),
            );
            let root = tb.core.doc.root();
            tb.core.doc.append_child(root, doctype);
            tb.core
                .on_node_inserted(doctype, Some((d.start_pos, d.end_pos)));
            if d.force_quirks {
                tb.core.doc.set_quirks_mode(QuirksMode::QUIRKS);
            }
            tb.transition(BEFORE_HTML);
            true
        }
        _ => {
            tb.transition(BEFORE_HTML);
            tb.process(t) // re-process token
        }
    }
}

fn before_html(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        tb.insert_start_tag("html");
        tb.transition(BEFORE_HEAD);
        tb.process(t)
    }

    match t {
        Token::Doctype(_) => {
            tb.error(BEFORE_HTML);
            false
        }
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Character(c) if is_blank(&c.data) => {
            // out of spec - include whitespace
            tb.insert_character(c);
            true
        }
        Token::StartTag(start) if start.normal_name() == "html" => {
            tb.insert_start(start);
            tb.transition(BEFORE_HEAD);
            true
        }
        Token::EndTag(end) if in_sorted(end.normal_name(), BEFORE_HTML_TO_HEAD) => {
            anything_else(t, tb)
        }
        Token::EndTag(_) => {
            tb.error(BEFORE_HTML);
            false
        }
        _ => anything_else(t, tb),
    }
}

fn before_head(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Character(c) if is_blank(&c.data) => {
            // out of spec - include whitespace
            tb.insert_character(c);
            true
        }
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(BEFORE_HEAD);
            false
        }
        Token::StartTag(start) if start.normal_name() == "html" => {
            in_body(t, tb) // does not transition
        }
        Token::StartTag(start) if start.normal_name() == "head" => {
            let head = tb.insert_start(start);
            tb.head_element = Some(head);
            tb.transition(IN_HEAD);
            true
        }
        Token::EndTag(end) if in_sorted(end.normal_name(), BEFORE_HTML_TO_HEAD) => {
            tb.process_start_tag("head");
            tb.process(t)
        }
        Token::EndTag(_) => {
            tb.error(BEFORE_HEAD);
            false
        }
        _ => {
            tb.process_start_tag("head");
            tb.process(t)
        }
    }
}

fn in_head(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        tb.process_end_tag("head");
        tb.process(t)
    }

    if is_whitespace(t) {
        if let Token::Character(c) = t {
            // out of spec - include whitespace
            tb.insert_character(c);
        }
        return true;
    }
    match t {
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(IN_HEAD);
            false
        }
        Token::StartTag(start) => {
            let name = start.normal_name().to_string();
            if name == "html" {
                return in_body(t, tb);
            } else if in_sorted(&name, IN_HEAD_EMPTY) {
                let el = tb.insert_empty(start);
                // the first <base href> in the parse updates the base uri
                if name == "base"
                    && tb
                        .core
                        .doc
                        .attributes(el)
                        .map(|attrs| attrs.has_key("href"))
                        .unwrap_or(false)
                {
                    tb.maybe_set_base_uri(el);
                }
            } else if name == "meta" {
                tb.insert_empty(start);
            } else if name == "title" {
                handle_rc_data(start, tb);
            } else if in_sorted(&name, IN_HEAD_RAW) {
                handle_rawtext(start, tb);
            } else if name == "noscript" {
                // as scripts aren't executed, handle as noscript content
                tb.insert_start(start);
                tb.transition(IN_HEAD_NOSCRIPT);
            } else if name == "script" {
                // skips some script rules as the scripts won't execute
                tb.core.tokeniser.transition(TokeniserState::SCRIPT_DATA);
                tb.mark_insertion_mode();
                tb.transition(TEXT);
                tb.insert_start(start);
            } else if name == "head" {
                tb.error(IN_HEAD);
                return false;
            } else if name == "template" {
                tb.insert_start(start);
                tb.insert_marker_to_formatting_elements();
                tb.set_frameset_ok(false);
                tb.transition(IN_TEMPLATE);
                tb.push_template_mode(IN_TEMPLATE);
            } else {
                return anything_else(t, tb);
            }
            true
        }
        Token::EndTag(end) => {
            let name = end.normal_name().to_string();
            if name == "head" {
                tb.pop();
                tb.transition(AFTER_HEAD);
            } else if in_sorted(&name, IN_HEAD_END) {
                return anything_else(t, tb);
            } else if name == "template" {
                if !tb.on_stack_name(&name) {
                    tb.error(IN_HEAD);
                } else {
                    tb.generate_implied_end_tags(true);
                    if !tb.core.current_element_is(&name) {
                        tb.error(IN_HEAD);
                    }
                    tb.pop_stack_to_close(&name);
                    tb.clear_formatting_elements_to_last_marker();
                    tb.pop_template_mode();
                    tb.reset_insertion_mode();
                }
            } else {
                tb.error(IN_HEAD);
                return false;
            }
            true
        }
        _ => anything_else(t, tb),
    }
}

fn in_head_noscript(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        // deviates from spec, which is to pop out of noscript and
        // reprocess in head; this allows the content in as data
        tb.error(IN_HEAD_NOSCRIPT);
        let data = t.to_string();
        tb.insert_character(&CharacterToken::new(data));
        true
    }

    match t {
        Token::Doctype(_) => {
            tb.error(IN_HEAD_NOSCRIPT);
            true
        }
        Token::StartTag(start) if start.normal_name() == "html" => tb.process_in(t, IN_BODY),
        Token::EndTag(end) if end.normal_name() == "noscript" => {
            tb.pop();
            tb.transition(IN_HEAD);
            true
        }
        Token::Comment(_) => tb.process_in(t, IN_HEAD),
        Token::Character(c) if is_blank(&c.data) => tb.process_in(t, IN_HEAD),
        Token::StartTag(start) if in_sorted(start.normal_name(), IN_HEAD_NOSCRIPT_HEAD) => {
            tb.process_in(t, IN_HEAD)
        }
        Token::EndTag(end) if end.normal_name() == "br" => anything_else(t, tb),
        Token::StartTag(start) if in_sorted(start.normal_name(), IN_HEAD_NOSCRIPT_IGNORE) => {
            tb.error(IN_HEAD_NOSCRIPT);
            false
        }
        Token::EndTag(_) => {
            tb.error(IN_HEAD_NOSCRIPT);
            false
        }
        _ => anything_else(t, tb),
    }
}

fn after_head(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        tb.process_start_tag("body");
        tb.set_frameset_ok(true);
        tb.process(t)
    }

    match t {
        Token::Character(c) if is_blank(&c.data) => {
            tb.insert_character(c);
            true
        }
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(AFTER_HEAD);
            true
        }
        Token::StartTag(start) => {
            let name = start.normal_name().to_string();
            if name == "html" {
                return tb.process_in(t, IN_BODY);
            } else if name == "body" {
                tb.insert_start(start);
                tb.set_frameset_ok(false);
                tb.transition(IN_BODY);
            } else if name == "frameset" {
                tb.insert_start(start);
                tb.transition(IN_FRAMESET);
            } else if in_sorted(&name, IN_BODY_START_TO_HEAD) {
                tb.error(AFTER_HEAD);
                if let Some(head) = tb.head_element {
                    tb.push(head);
                    tb.process_in(t, IN_HEAD);
                    tb.remove_from_stack(head);
                }
            } else if name == "head" {
                tb.error(AFTER_HEAD);
                return false;
            } else {
                return anything_else(t, tb);
            }
            true
        }
        Token::EndTag(end) => {
            let name = end.normal_name().to_string();
            if in_sorted(&name, AFTER_HEAD_BODY) {
                anything_else(t, tb)
            } else if name == "template" {
                tb.process_in(t, IN_HEAD)
            } else {
                tb.error(AFTER_HEAD);
                false
            }
        }
        _ => anything_else(t, tb),
    }
}

fn in_body(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Character(c) => {
            if c.data == NULL_STRING {
                tb.error(IN_BODY);
                false
            } else if tb.frameset_ok() && is_blank(&c.data) {
                // don't check for whitespace if frames already closed
                tb.reconstruct_formatting_elements();
                tb.insert_character(c);
                true
            } else {
                tb.reconstruct_formatting_elements();
                tb.insert_character(c);
                tb.set_frameset_ok(false);
                true
            }
        }
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(IN_BODY);
            false
        }
        Token::StartTag(_) => in_body_start_tag(t, tb),
        Token::EndTag(_) => in_body_end_tag(t, tb),
        Token::Eof(_) => {
            if tb.template_mode_size() > 0 {
                return tb.process_in(t, IN_TEMPLATE);
            }
            true
        }
    }
}

fn in_body_start_tag(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    let Token::StartTag(start) = t else {
        return false;
    };
    let name = start.normal_name().to_string();
    match name.as_str() {
        "a" => {
            if tb.get_active_formatting_element("a").is_some() {
                tb.error(IN_BODY);
                tb.process_end_tag("a");

                // still on stack?
                if let Some(remaining_a) = tb.get_from_stack("a") {
                    tb.remove_from_active_formatting_elements(remaining_a);
                    tb.remove_from_stack(remaining_a);
                }
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.reconstruct_formatting_elements();
            let el = tb.insert_start(start);
            tb.push_active_formatting_elements(el);
        }
        "span" => {
            // same as the final else, but short circuits lots of checks
            tb.reconstruct_formatting_elements();
            tb.insert_start(start);
        }
        "li" => {
            tb.set_frameset_ok(false);
            let mut i = tb.core.stack.len();
            while i > 1 {
                i -= 1;
                let el = tb.core.stack[i];
                if tb.core.doc.normal_name(el) == "li" {
                    tb.process_end_tag("li");
                    break;
                }
                if tb.is_special(el)
                    && !in_sorted(tb.core.doc.normal_name(el), IN_BODY_START_LI_BREAKERS)
                {
                    break;
                }
            }
            if tb.in_button_scope("p") {
                tb.process_end_tag("p");
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.insert_start(start);
        }
        "html" => {
            tb.error(IN_BODY);
            if tb.on_stack_name("template") {
                return false; // ignore
            }
            // otherwise, merge attributes onto the real html (if present)
            if !tb.core.stack.is_empty() {
                let html = tb.core.stack[0];
                if let Some(attrs) = &start.attributes {
                    for attr in attrs.iter() {
                        let present = tb
                            .core
                            .doc
                            .attributes(html)
                            .map(|existing| existing.has_key(attr.name()))
                            .unwrap_or(false);
                        if !present {
                            if let Some(existing) = tb.core.doc.attributes_mut(html) {
                                existing.add(attr.name(), declared_value(attr));
                            }
                        }
                    }
                }
            }
        }
        "body" => {
            tb.error(IN_BODY);
            let stack_len = tb.core.stack.len();
            if stack_len == 1
                || (stack_len > 2 && tb.core.doc.normal_name(tb.core.stack[1]) != "body")
                || tb.on_stack_name("template")
            {
                // only in fragment case
                return false; // ignore
            }
            tb.set_frameset_ok(false);
            // will be on stack if this is a nested body. won't be if
            // closed, which is a variance from spec (it leaves it on)
            if start.has_attributes() {
                if let Some(body) = tb.get_from_stack("body") {
                    if let Some(attrs) = &start.attributes {
                        for attr in attrs.iter() {
                            let present = tb
                                .core
                                .doc
                                .attributes(body)
                                .map(|existing| existing.has_key(attr.name()))
                                .unwrap_or(false);
                            if !present {
                                if let Some(existing) = tb.core.doc.attributes_mut(body) {
                                    existing.add(attr.name(), declared_value(attr));
                                }
                            }
                        }
                    }
                }
            }
        }
        "frameset" => {
            tb.error(IN_BODY);
            let stack_len = tb.core.stack.len();
            if stack_len == 1
                || (stack_len > 2 && tb.core.doc.normal_name(tb.core.stack[1]) != "body")
            {
                // only in fragment case
                return false; // ignore
            }
            if !tb.frameset_ok() {
                return false; // ignore frameset
            }
            let second = tb.core.stack[1];
            if tb.core.doc.parent(second).is_some() {
                tb.core.doc.remove(second);
            }
            // pop up to the html element
            while tb.core.stack.len() > 1 {
                tb.core.stack.pop();
            }
            tb.insert_start(start);
            tb.transition(IN_FRAMESET);
        }
        "form" => {
            if tb.form_element.is_some() && !tb.on_stack_name("template") {
                tb.error(IN_BODY);
                return false;
            }
            if tb.in_button_scope("p") {
                tb.close_element("p");
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            // won't associate to any template
            tb.insert_form(start, true, true);
        }
        "plaintext" => {
            if tb.in_button_scope("p") {
                tb.process_end_tag("p");
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.insert_start(start);
            // once in, never gets out
            tb.core.tokeniser.transition(TokeniserState::PLAINTEXT);
        }
        "button" => {
            if tb.in_button_scope("button") {
                // close and reprocess
                tb.error(IN_BODY);
                tb.process_end_tag("button");
                tb.process(t);
            } else {
                tb.reconstruct_formatting_elements();
                tb.insert_start(start);
                tb.set_frameset_ok(false);
            }
        }
        "nobr" => {
            tb.reconstruct_formatting_elements();
            if tb.in_scope("nobr") {
                tb.error(IN_BODY);
                tb.process_end_tag("nobr");
                tb.reconstruct_formatting_elements();
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            let el = tb.insert_start(start);
            tb.push_active_formatting_elements(el);
        }
        "table" => {
            if tb.core.doc.quirks_mode() != QuirksMode::QUIRKS && tb.in_button_scope("p") {
                tb.process_end_tag("p");
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.insert_start(start);
            tb.set_frameset_ok(false);
            tb.transition(IN_TABLE);
        }
        "input" => {
            tb.reconstruct_formatting_elements();
            let el = tb.insert_empty(start);
            let hidden = tb
                .core
                .doc
                .attributes(el)
                .and_then(|attrs| attrs.get("type"))
                .map(|ty| ty.eq_ignore_ascii_case("hidden"))
                .unwrap_or(false);
            if !hidden {
                tb.set_frameset_ok(false);
            }
        }
        "hr" => {
            if tb.in_button_scope("p") {
                tb.process_end_tag("p");
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.insert_empty(start);
            tb.set_frameset_ok(false);
        }
        "image" => {
            if tb.get_from_stack("svg").is_none() {
                // change <image> to <img>, unless in svg
                start.set_name("img");
                return tb.process(t);
            }
            tb.insert_start(start);
        }
        "isindex" => {
            // how much do we care about the early 90s?
            tb.error(IN_BODY);
            if tb.form_element.is_some() {
                return false;
            }
            tb.process_start_tag("form");
            let Token::StartTag(start) = t else {
                return false;
            };
            if let Some(action) = start.attribute("action") {
                let action = action.to_string();
                if let Some(form) = tb.form_element {
                    if let Some(attrs) = tb.core.doc.attributes_mut(form) {
                        attrs.put("action", Some(action));
                    }
                }
            }
            tb.process_start_tag("hr");
            tb.process_start_tag("label");
            // hope you like english
            let Token::StartTag(start) = t else {
                return false;
            };
            let prompt = start
                .attribute("prompt")
                .unwrap_or("This is a searchable index. Enter search keywords: ")
                .to_string();
            let mut prompt_token = Token::Character(CharacterToken::new(prompt));
            tb.process(&mut prompt_token);

            // input
            let Token::StartTag(start) = t else {
                return false;
            };
            let mut input_attribs = Attributes::new();
            if let Some(attrs) = &start.attributes {
                for attr in attrs.iter() {
                    if !in_sorted(attr.name(), IN_BODY_START_INPUT_ATTRIBS) {
                        input_attribs.put(attr.name(), declared_value(attr));
                    }
                }
            }
            input_attribs.put("name", Some("isindex".to_string()));
            tb.process_start_tag_with_attributes("input", input_attribs);
            tb.process_end_tag("label");
            tb.process_start_tag("hr");
            tb.process_end_tag("form");
        }
        "textarea" => {
            let self_closing = start.self_closing;
            tb.insert_start(start);
            if !self_closing {
                tb.core.tokeniser.transition(TokeniserState::RCDATA);
                tb.mark_insertion_mode();
                tb.set_frameset_ok(false);
                tb.transition(TEXT);
            }
        }
        "xmp" => {
            if tb.in_button_scope("p") {
                tb.process_end_tag("p");
            }
            tb.reconstruct_formatting_elements();
            tb.set_frameset_ok(false);
            let Token::StartTag(start) = t else {
                return false;
            };
            handle_rawtext(start, tb);
        }
        "iframe" => {
            tb.set_frameset_ok(false);
            handle_rawtext(start, tb);
        }
        "noembed" => {
            // would also handle noscript here, if scripts were enabled
            handle_rawtext(start, tb);
        }
        "select" => {
            tb.reconstruct_formatting_elements();
            let self_closing = start.self_closing;
            tb.insert_start(start);
            tb.set_frameset_ok(false);
            if !self_closing {
                // don't change states if not added to the stack
                let state = tb.state();
                if state == IN_TABLE
                    || state == IN_CAPTION
                    || state == IN_TABLE_BODY
                    || state == IN_ROW
                    || state == IN_CELL
                {
                    tb.transition(IN_SELECT_IN_TABLE);
                } else {
                    tb.transition(IN_SELECT);
                }
            }
        }
        "math" | "svg" => {
            // foreign content elements parse as any other element here
            tb.reconstruct_formatting_elements();
            tb.insert_start(start);
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            if tb.in_button_scope("p") {
                tb.process_end_tag("p");
            }
            if in_sorted(
                tb.core.doc.normal_name(tb.core.current_element()),
                HEADINGS,
            ) {
                tb.error(IN_BODY);
                tb.pop();
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.insert_start(start);
        }
        "pre" | "listing" => {
            if tb.in_button_scope("p") {
                tb.process_end_tag("p");
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.insert_start(start);
            // ignore LF if it is the next token
            tb.core.tokeniser.reader.match_consume("\n");
            tb.set_frameset_ok(false);
        }
        "dd" | "dt" => {
            tb.set_frameset_ok(false);
            if !tb.core.stack.is_empty() {
                let bottom = tb.core.stack.len() - 1;
                let upper = if bottom >= MAX_STACK_SCAN {
                    bottom - MAX_STACK_SCAN
                } else {
                    0
                };
                let mut i = bottom;
                loop {
                    let el = tb.core.stack[i];
                    let el_name = tb.core.doc.normal_name(el).to_string();
                    if in_sorted(&el_name, DD_DT) {
                        tb.process_end_tag(&el_name);
                        break;
                    }
                    if tb.is_special(el) && !in_sorted(&el_name, IN_BODY_START_LI_BREAKERS) {
                        break;
                    }
                    if i == upper {
                        break;
                    }
                    i -= 1;
                }
            }
            if tb.in_button_scope("p") {
                tb.process_end_tag("p");
            }
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.insert_start(start);
        }
        "optgroup" | "option" => {
            if tb.core.current_element_is("option") {
                tb.process_end_tag("option");
            }
            tb.reconstruct_formatting_elements();
            let Token::StartTag(start) = t else {
                return false;
            };
            tb.insert_start(start);
        }
        "rp" | "rt" => {
            if tb.in_scope("ruby") {
                tb.generate_implied_end_tags(false);
                if !tb.core.current_element_is("ruby") {
                    tb.error(IN_BODY);
                    // close up to but not including the ruby
                    tb.pop_stack_to_before("ruby");
                }
                let Token::StartTag(start) = t else {
                    return false;
                };
                tb.insert_start(start);
            }
        }
        "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
            tb.reconstruct_formatting_elements();
            tb.insert_empty(start);
            tb.set_frameset_ok(false);
        }
        "b" | "big" | "code" | "em" | "font" | "i" | "s" | "small" | "strike" | "strong"
        | "tt" | "u" => {
            tb.reconstruct_formatting_elements();
            let el = tb.insert_start(start);
            tb.push_active_formatting_elements(el);
        }
        _ => {
            if !crate::tag::Tag::is_known_tag(&name) {
                // no special rules for custom tags
                tb.insert_start(start);
            } else if in_sorted(&name, IN_BODY_START_P_CLOSERS) {
                if tb.in_button_scope("p") {
                    tb.process_end_tag("p");
                }
                let Token::StartTag(start) = t else {
                    return false;
                };
                tb.insert_start(start);
            } else if in_sorted(&name, IN_BODY_START_TO_HEAD) {
                return tb.process_in(t, IN_HEAD);
            } else if in_sorted(&name, IN_BODY_START_APPLETS) {
                tb.reconstruct_formatting_elements();
                tb.insert_start(start);
                tb.insert_marker_to_formatting_elements();
                tb.set_frameset_ok(false);
            } else if in_sorted(&name, IN_BODY_START_MEDIA) {
                tb.insert_empty(start);
            } else if in_sorted(&name, IN_BODY_START_DROP) {
                tb.error(IN_BODY);
                return false;
            } else {
                tb.reconstruct_formatting_elements();
                tb.insert_start(start);
            }
        }
    }
    true
}

fn in_body_end_tag(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    let Token::EndTag(end) = t else {
        return false;
    };
    let name = end.normal_name().to_string();
    match name.as_str() {
        "template" => {
            tb.process_in(t, IN_HEAD);
        }
        "sarcasm" | "span" => {
            // same as the final fall through, but saves the short circuit
            return any_other_end_tag(t, tb);
        }
        "li" => {
            if !tb.in_list_item_scope(&name) {
                tb.error(IN_BODY);
                return false;
            }
            tb.generate_implied_end_tags_excluding(&name);
            if !tb.core.current_element_is(&name) {
                tb.error(IN_BODY);
            }
            tb.pop_stack_to_close(&name);
        }
        "body" => {
            if !tb.in_scope("body") {
                tb.error(IN_BODY);
                return false;
            }
            any_other_end_tag(t, tb);
            tb.transition(AFTER_BODY);
        }
        "html" => {
            let not_ignored = tb.process_end_tag("body");
            if not_ignored {
                return tb.process(t);
            }
        }
        "form" => {
            if !tb.on_stack_name("template") {
                let current_form = tb.form_element.take();
                let current_form = match current_form {
                    Some(form) if tb.in_scope(&name) => form,
                    _ => {
                        tb.error(IN_BODY);
                        return false;
                    }
                };
                tb.generate_implied_end_tags(false);
                if !tb.core.current_element_is(&name) {
                    tb.error(IN_BODY);
                }
                // remove the form from the stack; anything under it
                // shifts up
                tb.remove_from_stack(current_form);
            } else {
                // template on stack
                if !tb.in_scope(&name) {
                    tb.error(IN_BODY);
                    return false;
                }
                tb.generate_implied_end_tags(false);
                if !tb.core.current_element_is(&name) {
                    tb.error(IN_BODY);
                }
                tb.pop_stack_to_close(&name);
            }
        }
        "p" => {
            if !tb.in_button_scope(&name) {
                tb.error(IN_BODY);
                // no p to close; creates an empty <p></p>
                tb.process_start_tag(&name);
                return tb.process(t);
            }
            tb.generate_implied_end_tags_excluding(&name);
            if !tb.core.current_element_is(&name) {
                tb.error(IN_BODY);
            }
            tb.pop_stack_to_close(&name);
        }
        "dd" | "dt" => {
            if !tb.in_scope(&name) {
                tb.error(IN_BODY);
                return false;
            }
            tb.generate_implied_end_tags_excluding(&name);
            if !tb.core.current_element_is(&name) {
                tb.error(IN_BODY);
            }
            tb.pop_stack_to_close(&name);
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            if !tb.in_scope_any(HEADINGS) {
                tb.error(IN_BODY);
                return false;
            }
            tb.generate_implied_end_tags_excluding(&name);
            if !tb.core.current_element_is(&name) {
                tb.error(IN_BODY);
            }
            tb.pop_stack_to_close_any(HEADINGS);
        }
        "br" => {
            tb.error(IN_BODY);
            tb.process_start_tag("br");
            return false;
        }
        _ => {
            if in_sorted(&name, IN_BODY_END_ADOPTION_FORMATTERS) {
                return in_body_end_tag_adoption(t, tb);
            } else if in_sorted(&name, IN_BODY_END_CLOSERS) {
                if !tb.in_scope(&name) {
                    // nothing to close
                    tb.error(IN_BODY);
                    return false;
                }
                tb.generate_implied_end_tags(false);
                if !tb.core.current_element_is(&name) {
                    tb.error(IN_BODY);
                }
                tb.pop_stack_to_close(&name);
            } else if in_sorted(&name, IN_BODY_START_APPLETS) {
                if !tb.in_scope("name") {
                    if !tb.in_scope(&name) {
                        tb.error(IN_BODY);
                        return false;
                    }
                    tb.generate_implied_end_tags(false);
                    if !tb.core.current_element_is(&name) {
                        tb.error(IN_BODY);
                    }
                    tb.pop_stack_to_close(&name);
                    tb.clear_formatting_elements_to_last_marker();
                }
            } else {
                return any_other_end_tag(t, tb);
            }
        }
    }
    true
}

fn any_other_end_tag(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    let Token::EndTag(end) = t else {
        return false;
    };
    // case insensitive search - the goal is to preserve output case, not
    // for the parse to be case sensitive
    let name = end.normal_name().to_string();

    // deviate from spec slightly to speed when super deeply nested
    if tb.get_from_stack(&name).is_none() {
        tb.error(IN_BODY);
        return false;
    }
    for pos in (0..tb.core.stack.len()).rev() {
        let node = tb.core.stack[pos];
        if tb.core.doc.normal_name(node) == name {
            tb.generate_implied_end_tags_excluding(&name);
            if !tb.core.current_element_is(&name) {
                tb.error(IN_BODY);
            }
            tb.pop_stack_to_close(&name);
            break;
        } else if tb.is_special(node) {
            tb.error(IN_BODY);
            return false;
        }
    }
    true
}

// the adoption agency algorithm
fn in_body_end_tag_adoption(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    let Token::EndTag(end) = t else {
        return false;
    };
    let name = end.normal_name().to_string();
    for _ in 0..8 {
        let format_el = match tb.get_active_formatting_element(&name) {
            Some(el) => el,
            None => return any_other_end_tag(t, tb),
        };
        if !tb.on_stack(format_el) {
            tb.error(IN_BODY);
            tb.remove_from_active_formatting_elements(format_el);
            return true;
        }
        let format_name = tb.core.doc.normal_name(format_el).to_string();
        if !tb.in_scope(&format_name) {
            tb.error(IN_BODY);
            return false;
        }
        if tb.core.current_element() != format_el {
            tb.error(IN_BODY);
        }

        let mut furthest_block: Option<NodeId> = None;
        let mut common_ancestor: Option<NodeId> = None;
        let mut seen_formatting_element = false;
        let mut bookmark = 0;
        // the walk is unbounded in the parsing algorithm, but in
        // degenerate cases (9000+ stack depth) this prevents run-aways
        if tb.core.stack.len() > 64 {
            debug!(
                "clamping adoption agency stack walk at 64 of {}",
                tb.core.stack.len()
            );
        }
        let stack_size = tb.core.stack.len().min(64);
        let mut si = 1;
        while si < stack_size {
            let el = tb.core.stack[si];
            if el == format_el {
                common_ancestor = Some(tb.core.stack[si - 1]);
                seen_formatting_element = true;
                // a bookmark notes the position of the formatting
                // element in the list of active formatting elements
                bookmark = tb.position_of_element(el).unwrap_or(0);
            } else if seen_formatting_element && tb.is_special(el) {
                furthest_block = Some(el);
                break;
            }
            si += 1;
        }
        let furthest_block = match furthest_block {
            Some(el) => el,
            None => {
                tb.pop_stack_to_close(&format_name);
                tb.remove_from_active_formatting_elements(format_el);
                return true;
            }
        };

        let mut node = furthest_block;
        let mut last_node = furthest_block;
        for _ in 0..3 {
            if tb.on_stack(node) {
                if let Some(above) = tb.above_on_stack(node) {
                    node = above;
                }
            }
            if !tb.is_in_active_formatting_elements(node) {
                // note no bookmark check
                tb.remove_from_stack(node);
                continue;
            } else if node == format_el {
                break;
            }
            // case will follow the original node (so honours the parse
            // settings)
            let node_name = match tb.core.doc.tag(node) {
                Some(tag) => tag.name().to_string(),
                None => continue,
            };
            let replacement_tag = tb.core.tag_for(&node_name, &ParseSettings::PRESERVE_CASE);
            let replacement = tb.core.doc.new_element(replacement_tag, Attributes::new());
            tb.replace_active_formatting_element(node, replacement);
            tb.replace_on_stack(node, replacement);
            node = replacement;
            if last_node == furthest_block {
                // the bookmark moves to be immediately after the new
                // node in the list of active formatting elements. not
                // getting how the bookmark both straddles the element
                // above, but is inbetween here...
                bookmark = tb.position_of_element(node).map(|p| p + 1).unwrap_or(0);
            }
            tb.core.doc.append_child(node, last_node);
            last_node = node;
        }
        if let Some(common_ancestor) = common_ancestor {
            // safety check; it would be an error for this to be absent
            if in_sorted(
                tb.core.doc.normal_name(common_ancestor),
                IN_BODY_END_TABLE_FOSTERS,
            ) {
                tb.core.doc.remove(last_node);
                tb.insert_in_foster_parent(last_node);
            } else {
                tb.core.doc.append_child(common_ancestor, last_node);
            }
        }

        let adopter_tag = match tb.core.doc.tag(format_el) {
            Some(tag) => tag.clone(),
            None => return true,
        };
        let adopter_attrs = tb.core.doc.attributes(format_el).cloned().unwrap_or_default();
        let adopter = tb.core.doc.new_element(adopter_tag, adopter_attrs);
        let children: Vec<NodeId> = tb.core.doc.children(furthest_block).to_vec();
        for child in children {
            tb.core.doc.append_child(adopter, child);
        }
        tb.core.doc.append_child(furthest_block, adopter);
        tb.remove_from_active_formatting_elements(format_el);
        // the new element goes into the list of active formatting
        // elements at the position of the bookmark
        tb.push_with_bookmark(adopter, bookmark);
        tb.remove_from_stack(format_el);
        tb.insert_on_stack_after(furthest_block, adopter);
    }
    true
}

// in script, style etc; normally treated as data tags
fn text(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Character(c) => {
            tb.insert_character(c);
            true
        }
        Token::Eof(_) => {
            tb.error(TEXT);
            // if the current node is script: already started
            tb.pop();
            let original = tb.original_state();
            tb.transition(original);
            tb.process(t)
        }
        Token::EndTag(_) => {
            tb.pop();
            let original = tb.original_state();
            tb.transition(original);
            true
        }
        _ => true,
    }
}

fn in_table(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        tb.error(IN_TABLE);
        tb.foster_inserts = true;
        tb.process_in(t, IN_BODY);
        tb.foster_inserts = false;
        true
    }

    match t {
        Token::Character(_)
            if in_sorted(
                tb.core.doc.normal_name(tb.core.current_element()),
                IN_TABLE_FOSTER,
            ) =>
        {
            tb.new_pending_table_characters();
            tb.mark_insertion_mode();
            tb.transition(IN_TABLE_TEXT);
            tb.process(t)
        }
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(IN_TABLE);
            false
        }
        Token::StartTag(start) => {
            let name = start.normal_name().to_string();
            if name == "caption" {
                tb.clear_stack_to_table_context();
                tb.insert_marker_to_formatting_elements();
                tb.insert_start(start);
                tb.transition(IN_CAPTION);
            } else if name == "colgroup" {
                tb.clear_stack_to_table_context();
                tb.insert_start(start);
                tb.transition(IN_COLUMN_GROUP);
            } else if name == "col" {
                tb.clear_stack_to_table_context();
                tb.process_start_tag("colgroup");
                return tb.process(t);
            } else if in_sorted(&name, IN_TABLE_TO_BODY) {
                tb.clear_stack_to_table_context();
                tb.insert_start(start);
                tb.transition(IN_TABLE_BODY);
            } else if in_sorted(&name, IN_TABLE_ADD_BODY) {
                tb.clear_stack_to_table_context();
                tb.process_start_tag("tbody");
                return tb.process(t);
            } else if name == "table" {
                tb.error(IN_TABLE);
                if !tb.in_table_scope(&name) {
                    return false; // ignore it
                }
                tb.pop_stack_to_close(&name);
                if !tb.reset_insertion_mode() {
                    // not per spec - but haven't transitioned out of the
                    // table, so try something else
                    let Token::StartTag(start) = t else {
                        return false;
                    };
                    tb.insert_start(start);
                    return true;
                }
                return tb.process(t);
            } else if in_sorted(&name, IN_TABLE_TO_HEAD) {
                return tb.process_in(t, IN_HEAD);
            } else if name == "input" {
                let hidden = start
                    .attribute("type")
                    .map(|ty| ty.eq_ignore_ascii_case("hidden"))
                    .unwrap_or(false);
                if !hidden {
                    return anything_else(t, tb);
                }
                tb.insert_empty(start);
            } else if name == "form" {
                tb.error(IN_TABLE);
                if tb.form_element.is_some() || tb.on_stack_name("template") {
                    return false;
                }
                // not added to the stack; can associate to a template
                tb.insert_form(start, false, false);
            } else {
                return anything_else(t, tb);
            }
            true
        }
        Token::EndTag(end) => {
            let name = end.normal_name().to_string();
            if name == "table" {
                if !tb.in_table_scope(&name) {
                    tb.error(IN_TABLE);
                    return false;
                }
                tb.pop_stack_to_close("table");
                tb.reset_insertion_mode();
            } else if in_sorted(&name, IN_TABLE_END_ERR) {
                tb.error(IN_TABLE);
                return false;
            } else if name == "template" {
                tb.process_in(t, IN_HEAD);
            } else {
                return anything_else(t, tb);
            }
            true
        }
        Token::Eof(_) => {
            if tb.core.current_element_is("html") {
                tb.error(IN_TABLE);
            }
            true // stops parsing
        }
        _ => anything_else(t, tb),
    }
}

fn in_table_text(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Character(c) => {
            if c.data == NULL_STRING {
                tb.error(IN_TABLE_TEXT);
                return false;
            }
            tb.pending_table_characters.push(c.data.clone());
            true
        }
        _ => {
            if !tb.pending_table_characters.is_empty() {
                let pending = std::mem::take(&mut tb.pending_table_characters);
                for character in &pending {
                    if !is_blank(character) {
                        // the InTable anything-else steps
                        tb.error(IN_TABLE_TEXT);
                        let mut char_token =
                            Token::Character(CharacterToken::new(character.clone()));
                        if in_sorted(
                            tb.core.doc.normal_name(tb.core.current_element()),
                            IN_TABLE_FOSTER,
                        ) {
                            tb.foster_inserts = true;
                            tb.process_in(&mut char_token, IN_BODY);
                            tb.foster_inserts = false;
                        } else {
                            tb.process_in(&mut char_token, IN_BODY);
                        }
                    } else {
                        tb.insert_character(&CharacterToken::new(character.clone()));
                    }
                }
                tb.new_pending_table_characters();
            }
            let original = tb.original_state();
            tb.transition(original);
            tb.process(t)
        }
    }
}

fn in_caption(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::EndTag(end) if end.normal_name() == "caption" => {
            let name = end.normal_name().to_string();
            if !tb.in_table_scope(&name) {
                tb.error(IN_CAPTION);
                return false;
            }
            tb.generate_implied_end_tags(false);
            if !tb.core.current_element_is("caption") {
                tb.error(IN_CAPTION);
            }
            tb.pop_stack_to_close("caption");
            tb.clear_formatting_elements_to_last_marker();
            tb.transition(IN_TABLE);
            true
        }
        Token::StartTag(start) if in_sorted(start.normal_name(), IN_CELL_COL) => {
            tb.error(IN_CAPTION);
            let processed = tb.process_end_tag("caption");
            if processed {
                return tb.process(t);
            }
            true
        }
        Token::EndTag(end) if end.normal_name() == "table" => {
            tb.error(IN_CAPTION);
            let processed = tb.process_end_tag("caption");
            if processed {
                return tb.process(t);
            }
            true
        }
        Token::EndTag(end) if in_sorted(end.normal_name(), IN_CAPTION_IGNORE) => {
            tb.error(IN_CAPTION);
            false
        }
        _ => tb.process_in(t, IN_BODY),
    }
}

fn in_column_group(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        if !tb.core.current_element_is("colgroup") {
            tb.error(IN_COLUMN_GROUP);
            return false;
        }
        tb.pop();
        tb.transition(IN_TABLE);
        tb.process(t);
        true
    }

    if is_whitespace(t) {
        if let Token::Character(c) = t {
            tb.insert_character(c);
        }
        return true;
    }
    match t {
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(IN_COLUMN_GROUP);
            true
        }
        Token::StartTag(start) => match start.normal_name() {
            "html" => tb.process_in(t, IN_BODY),
            "col" => {
                tb.insert_empty(start);
                true
            }
            "template" => {
                tb.process_in(t, IN_HEAD);
                true
            }
            _ => anything_else(t, tb),
        },
        Token::EndTag(end) => match end.normal_name() {
            "colgroup" => {
                if !tb.core.current_element_is("colgroup") {
                    tb.error(IN_COLUMN_GROUP);
                    false
                } else {
                    tb.pop();
                    tb.transition(IN_TABLE);
                    true
                }
            }
            "template" => {
                tb.process_in(t, IN_HEAD);
                true
            }
            _ => anything_else(t, tb),
        },
        Token::Eof(_) => {
            if tb.core.current_element_is("html") {
                true // stop parsing; frag case
            } else {
                anything_else(t, tb)
            }
        }
        _ => anything_else(t, tb),
    }
}

fn in_table_body(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn exit_table_body(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        if !(tb.in_table_scope("tbody") || tb.in_table_scope("thead") || tb.in_scope("tfoot")) {
            // frag case
            tb.error(IN_TABLE_BODY);
            return false;
        }
        tb.clear_stack_to_table_body_context();
        let name = tb
            .core
            .doc
            .normal_name(tb.core.current_element())
            .to_string();
        tb.process_end_tag(&name); // tbody, tfoot, thead
        tb.process(t)
    }

    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        tb.process_in(t, IN_TABLE)
    }

    match t {
        Token::StartTag(start) => {
            let name = start.normal_name().to_string();
            if name == "tr" {
                tb.clear_stack_to_table_body_context();
                tb.insert_start(start);
                tb.transition(IN_ROW);
                true
            } else if in_sorted(&name, IN_CELL_NAMES) {
                tb.error(IN_TABLE_BODY);
                tb.process_start_tag("tr");
                tb.process(t)
            } else if in_sorted(&name, IN_TABLE_BODY_EXIT) {
                exit_table_body(t, tb)
            } else {
                anything_else(t, tb)
            }
        }
        Token::EndTag(end) => {
            let name = end.normal_name().to_string();
            if in_sorted(&name, IN_TABLE_END_IGNORE) {
                if !tb.in_table_scope(&name) {
                    tb.error(IN_TABLE_BODY);
                    false
                } else {
                    tb.clear_stack_to_table_body_context();
                    tb.pop();
                    tb.transition(IN_TABLE);
                    true
                }
            } else if name == "table" {
                exit_table_body(t, tb)
            } else if in_sorted(&name, IN_TABLE_BODY_END_IGNORE) {
                tb.error(IN_TABLE_BODY);
                false
            } else {
                anything_else(t, tb)
            }
        }
        _ => anything_else(t, tb),
    }
}

fn in_row(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        tb.process_in(t, IN_TABLE)
    }

    fn handle_missing_tr(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        let processed = tb.process_end_tag("tr");
        if processed {
            tb.process(t)
        } else {
            false
        }
    }

    match t {
        Token::StartTag(start) => {
            let name = start.normal_name().to_string();
            if in_sorted(&name, IN_CELL_NAMES) {
                tb.clear_stack_to_table_row_context();
                tb.insert_start(start);
                tb.transition(IN_CELL);
                tb.insert_marker_to_formatting_elements();
                true
            } else if in_sorted(&name, IN_ROW_MISSING) {
                handle_missing_tr(t, tb)
            } else {
                anything_else(t, tb)
            }
        }
        Token::EndTag(end) => {
            let name = end.normal_name().to_string();
            if name == "tr" {
                if !tb.in_table_scope(&name) {
                    tb.error(IN_ROW); // frag
                    return false;
                }
                tb.clear_stack_to_table_row_context();
                tb.pop(); // tr
                tb.transition(IN_TABLE_BODY);
                true
            } else if name == "table" {
                handle_missing_tr(t, tb)
            } else if in_sorted(&name, IN_TABLE_TO_BODY) {
                if !tb.in_table_scope(&name) || !tb.in_table_scope("tr") {
                    tb.error(IN_ROW);
                    return false;
                }
                tb.clear_stack_to_table_row_context();
                tb.pop(); // tr
                tb.transition(IN_TABLE_BODY);
                true
            } else if in_sorted(&name, IN_ROW_IGNORE) {
                tb.error(IN_ROW);
                false
            } else {
                anything_else(t, tb)
            }
        }
        _ => anything_else(t, tb),
    }
}

fn in_cell(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        tb.process_in(t, IN_BODY)
    }

    fn close_cell(tb: &mut HtmlTreeBuilder) {
        // only here if th or td in scope
        if tb.in_table_scope("td") {
            tb.process_end_tag("td");
        } else {
            tb.process_end_tag("th");
        }
    }

    match t {
        Token::EndTag(end) => {
            let name = end.normal_name().to_string();
            if in_sorted(&name, IN_CELL_NAMES) {
                if !tb.in_table_scope(&name) {
                    tb.error(IN_CELL);
                    // might not be in scope if empty: <td /> processing
                    // a fake end tag
                    tb.transition(IN_ROW);
                    return false;
                }
                tb.generate_implied_end_tags(false);
                if !tb.core.current_element_is(&name) {
                    tb.error(IN_CELL);
                }
                tb.pop_stack_to_close(&name);
                tb.clear_formatting_elements_to_last_marker();
                tb.transition(IN_ROW);
                true
            } else if in_sorted(&name, IN_CELL_BODY) {
                tb.error(IN_CELL);
                false
            } else if in_sorted(&name, IN_CELL_TABLE) {
                if !tb.in_table_scope(&name) {
                    tb.error(IN_CELL);
                    return false;
                }
                close_cell(tb);
                tb.process(t)
            } else {
                anything_else(t, tb)
            }
        }
        Token::StartTag(start) if in_sorted(start.normal_name(), IN_CELL_COL) => {
            if !(tb.in_table_scope("td") || tb.in_table_scope("th")) {
                tb.error(IN_CELL);
                return false;
            }
            close_cell(tb);
            tb.process(t)
        }
        _ => anything_else(t, tb),
    }
}

fn in_select(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    fn anything_else(_t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
        tb.error(IN_SELECT);
        false
    }

    match t {
        Token::Character(c) => {
            if c.data == NULL_STRING {
                tb.error(IN_SELECT);
                false
            } else {
                tb.insert_character(c);
                true
            }
        }
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(IN_SELECT);
            false
        }
        Token::StartTag(start) => {
            let name = start.normal_name().to_string();
            if name == "html" {
                return tb.process_in(t, IN_BODY);
            } else if name == "option" {
                if tb.core.current_element_is("option") {
                    tb.process_end_tag("option");
                }
                let Token::StartTag(start) = t else {
                    return false;
                };
                tb.insert_start(start);
            } else if name == "optgroup" {
                // pop the option, and flow on to pop the optgroup
                if tb.core.current_element_is("option") {
                    tb.process_end_tag("option");
                }
                if tb.core.current_element_is("optgroup") {
                    tb.process_end_tag("optgroup");
                }
                let Token::StartTag(start) = t else {
                    return false;
                };
                tb.insert_start(start);
            } else if name == "select" {
                tb.error(IN_SELECT);
                return tb.process_end_tag("select");
            } else if in_sorted(&name, IN_SELECT_END) {
                tb.error(IN_SELECT);
                if !tb.in_select_scope("select") {
                    return false; // frag
                }
                tb.process_end_tag("select");
                return tb.process(t);
            } else if name == "script" || name == "template" {
                return tb.process_in(t, IN_HEAD);
            } else {
                return anything_else(t, tb);
            }
            true
        }
        Token::EndTag(end) => {
            let name = end.normal_name().to_string();
            match name.as_str() {
                "optgroup" => {
                    if tb.core.current_element_is("option") {
                        let above = tb.above_on_stack(tb.core.current_element());
                        if above
                            .map(|el| tb.core.doc.normal_name(el) == "optgroup")
                            .unwrap_or(false)
                        {
                            tb.process_end_tag("option");
                        }
                    }
                    if tb.core.current_element_is("optgroup") {
                        tb.pop();
                    } else {
                        tb.error(IN_SELECT);
                    }
                    true
                }
                "option" => {
                    if tb.core.current_element_is("option") {
                        tb.pop();
                    } else {
                        tb.error(IN_SELECT);
                    }
                    true
                }
                "select" => {
                    if !tb.in_select_scope(&name) {
                        tb.error(IN_SELECT);
                        false
                    } else {
                        tb.pop_stack_to_close(&name);
                        tb.reset_insertion_mode();
                        true
                    }
                }
                "template" => tb.process_in(t, IN_HEAD),
                _ => anything_else(t, tb),
            }
        }
        Token::Eof(_) => {
            if !tb.core.current_element_is("html") {
                tb.error(IN_SELECT);
            }
            true
        }
    }
}

fn in_select_in_table(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::StartTag(start) if in_sorted(start.normal_name(), IN_SELECT_TABLE_END) => {
            tb.error(IN_SELECT_IN_TABLE);
            tb.pop_stack_to_close("select");
            tb.reset_insertion_mode();
            tb.process(t)
        }
        Token::EndTag(end) if in_sorted(end.normal_name(), IN_SELECT_TABLE_END) => {
            tb.error(IN_SELECT_IN_TABLE);
            let name = end.normal_name().to_string();
            if tb.in_table_scope(&name) {
                tb.pop_stack_to_close("select");
                tb.reset_insertion_mode();
                tb.process(t)
            } else {
                false
            }
        }
        _ => tb.process_in(t, IN_SELECT),
    }
}

fn in_template(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Character(_) | Token::Comment(_) | Token::Doctype(_) => {
            tb.process_in(t, IN_BODY);
            true
        }
        Token::StartTag(start) => {
            let name = start.normal_name().to_string();
            if in_sorted(&name, IN_TEMPLATE_TO_HEAD) {
                tb.process_in(t, IN_HEAD);
                true
            } else if in_sorted(&name, IN_TEMPLATE_TO_TABLE) {
                tb.pop_template_mode();
                tb.push_template_mode(IN_TABLE);
                tb.transition(IN_TABLE);
                tb.process(t)
            } else if name == "col" {
                tb.pop_template_mode();
                tb.push_template_mode(IN_COLUMN_GROUP);
                tb.transition(IN_COLUMN_GROUP);
                tb.process(t)
            } else if name == "tr" {
                tb.pop_template_mode();
                tb.push_template_mode(IN_TABLE_BODY);
                tb.transition(IN_TABLE_BODY);
                tb.process(t)
            } else if name == "td" || name == "th" {
                tb.pop_template_mode();
                tb.push_template_mode(IN_ROW);
                tb.transition(IN_ROW);
                tb.process(t)
            } else {
                tb.pop_template_mode();
                tb.push_template_mode(IN_BODY);
                tb.transition(IN_BODY);
                tb.process(t)
            }
        }
        Token::EndTag(end) => {
            if end.normal_name() == "template" {
                tb.process_in(t, IN_HEAD);
                true
            } else {
                tb.error(IN_TEMPLATE);
                false
            }
        }
        Token::Eof(_) => {
            if !tb.on_stack_name("template") {
                return true; // stop parsing
            }
            tb.error(IN_TEMPLATE);
            tb.pop_stack_to_close("template");
            tb.clear_formatting_elements_to_last_marker();
            tb.pop_template_mode();
            tb.reset_insertion_mode();
            // if we did not break out of Template, stop processing, and
            // don't try to clean up ultra-deep template stacks; the
            // reprocess can recurse
            if tb.state() != IN_TEMPLATE && tb.template_mode_size() < 12 {
                tb.process(t)
            } else {
                debug!(
                    "halting template EOF reprocess at template depth {}",
                    tb.template_mode_size()
                );
                true
            }
        }
    }
}

fn after_body(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Character(c) if is_blank(&c.data) => {
            // out of spec - include whitespace; spec would move it into
            // the body
            tb.insert_character(c);
            true
        }
        Token::Comment(c) => {
            // goes into the html node
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(AFTER_BODY);
            false
        }
        Token::StartTag(start) if start.normal_name() == "html" => tb.process_in(t, IN_BODY),
        Token::EndTag(end) if end.normal_name() == "html" => {
            if tb.fragment_parsing {
                tb.error(AFTER_BODY);
                false
            } else {
                if tb.on_stack_name("html") {
                    tb.pop_stack_to_close("html");
                }
                tb.transition(AFTER_AFTER_BODY);
                true
            }
        }
        Token::Eof(_) => true, // chillax! we're done
        _ => {
            tb.error(AFTER_BODY);
            tb.reset_body();
            tb.process(t)
        }
    }
}

fn in_frameset(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Character(c) if is_blank(&c.data) => {
            tb.insert_character(c);
            true
        }
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(IN_FRAMESET);
            false
        }
        Token::StartTag(start) => match start.normal_name() {
            "html" => tb.process_in(t, IN_BODY),
            "frameset" => {
                tb.insert_start(start);
                true
            }
            "frame" => {
                tb.insert_empty(start);
                true
            }
            "noframes" => tb.process_in(t, IN_HEAD),
            _ => {
                tb.error(IN_FRAMESET);
                false
            }
        },
        Token::EndTag(end) if end.normal_name() == "frameset" => {
            if tb.core.current_element_is("html") {
                // frag
                tb.error(IN_FRAMESET);
                false
            } else {
                tb.pop();
                if !tb.fragment_parsing && !tb.core.current_element_is("frameset") {
                    tb.transition(AFTER_FRAMESET);
                }
                true
            }
        }
        Token::Eof(_) => {
            if !tb.core.current_element_is("html") {
                tb.error(IN_FRAMESET);
            }
            true
        }
        _ => {
            tb.error(IN_FRAMESET);
            false
        }
    }
}

fn after_frameset(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Character(c) if is_blank(&c.data) => {
            tb.insert_character(c);
            true
        }
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => {
            tb.error(AFTER_FRAMESET);
            false
        }
        Token::StartTag(start) if start.normal_name() == "html" => tb.process_in(t, IN_BODY),
        Token::EndTag(end) if end.normal_name() == "html" => {
            tb.transition(AFTER_AFTER_FRAMESET);
            true
        }
        Token::StartTag(start) if start.normal_name() == "noframes" => tb.process_in(t, IN_HEAD),
        Token::Eof(_) => true, // cool your heels, we're complete
        _ => {
            tb.error(AFTER_FRAMESET);
            false
        }
    }
}

fn after_after_body(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => tb.process_in(t, IN_BODY),
        Token::StartTag(start) if start.normal_name() == "html" => tb.process_in(t, IN_BODY),
        Token::Character(c) if is_blank(&c.data) => {
            tb.insert_character(c);
            true
        }
        Token::Eof(_) => true, // nice work chuck
        _ => {
            tb.error(AFTER_AFTER_BODY);
            tb.reset_body();
            tb.process(t)
        }
    }
}

fn after_after_frameset(t: &mut Token, tb: &mut HtmlTreeBuilder) -> bool {
    match t {
        Token::Comment(c) => {
            tb.insert_comment(c);
            true
        }
        Token::Doctype(_) => tb.process_in(t, IN_BODY),
        Token::Character(c) if is_blank(&c.data) => tb.process_in(t, IN_BODY),
        Token::StartTag(start) if start.normal_name() == "html" => tb.process_in(t, IN_BODY),
        Token::Eof(_) => true, // nice work chuck
        Token::StartTag(start) if start.normal_name() == "noframes" => tb.process_in(t, IN_HEAD),
        _ => {
            tb.error(AFTER_AFTER_FRAMESET);
            false
        }
    }
}

fn foreign_content(_t: &mut Token, _tb: &mut HtmlTreeBuilder) -> bool {
    // foreign (svg / mathml) elements parse as ordinary elements, so
    // nothing routes here yet
    true
}

fn is_whitespace(t: &Token) -> bool {
    match t {
        Token::Character(c) => is_blank(&c.data),
        _ => false,
    }
}

fn is_blank(data: &str) -> bool {
    data.chars()
        .all(|c| matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r'))
}

fn handle_rc_data(start_tag: &mut TagToken, tb: &mut HtmlTreeBuilder) {
    tb.core.tokeniser.transition(TokeniserState::RCDATA);
    tb.mark_insertion_mode();
    tb.transition(TEXT);
    tb.insert_start(start_tag);
}

fn handle_rawtext(start_tag: &mut TagToken, tb: &mut HtmlTreeBuilder) {
    tb.core.tokeniser.transition(TokeniserState::RAWTEXT);
    tb.mark_insertion_mode();
    tb.transition(TEXT);
    tb.insert_start(start_tag);
}

fn declared_value(attr: &crate::dom::Attribute) -> Option<String> {
    if attr.has_declared_value() {
        Some(attr.value().to_string())
    } else {
        None
    }
}

// lists of tags to search through. all sorted, for in_sorted.
pub(crate) mod constants {
    pub(crate) const IN_HEAD_EMPTY: &[&str] = &["base", "basefont", "bgsound", "command", "link"];
    pub(crate) const IN_HEAD_RAW: &[&str] = &["noframes", "style"];
    pub(crate) const IN_HEAD_END: &[&str] = &["body", "br", "html"];
    pub(crate) const AFTER_HEAD_BODY: &[&str] = &["body", "br", "html"];
    pub(crate) const BEFORE_HTML_TO_HEAD: &[&str] = &["body", "br", "head", "html"];
    pub(crate) const IN_HEAD_NOSCRIPT_HEAD: &[&str] =
        &["basefont", "bgsound", "link", "meta", "noframes", "style"];
    pub(crate) const IN_BODY_START_TO_HEAD: &[&str] = &[
        "base", "basefont", "bgsound", "command", "link", "meta", "noframes", "script", "style",
        "template", "title",
    ];
    pub(crate) const IN_BODY_START_P_CLOSERS: &[&str] = &[
        "address",
        "article",
        "aside",
        "blockquote",
        "center",
        "details",
        "dir",
        "div",
        "dl",
        "fieldset",
        "figcaption",
        "figure",
        "footer",
        "header",
        "hgroup",
        "menu",
        "nav",
        "ol",
        "p",
        "section",
        "summary",
        "ul",
    ];
    pub(crate) const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
    pub(crate) const IN_BODY_START_LI_BREAKERS: &[&str] = &["address", "div", "p"];
    pub(crate) const DD_DT: &[&str] = &["dd", "dt"];
    pub(crate) const IN_BODY_START_APPLETS: &[&str] = &["applet", "marquee", "object"];
    pub(crate) const IN_BODY_START_MEDIA: &[&str] = &["param", "source", "track"];
    pub(crate) const IN_BODY_START_INPUT_ATTRIBS: &[&str] = &["action", "name", "prompt"];
    pub(crate) const IN_BODY_START_DROP: &[&str] = &[
        "caption", "col", "colgroup", "frame", "head", "tbody", "td", "tfoot", "th", "thead", "tr",
    ];
    pub(crate) const IN_BODY_END_CLOSERS: &[&str] = &[
        "address",
        "article",
        "aside",
        "blockquote",
        "button",
        "center",
        "details",
        "dir",
        "div",
        "dl",
        "fieldset",
        "figcaption",
        "figure",
        "footer",
        "header",
        "hgroup",
        "listing",
        "menu",
        "nav",
        "ol",
        "pre",
        "section",
        "summary",
        "ul",
    ];
    pub(crate) const IN_BODY_END_ADOPTION_FORMATTERS: &[&str] = &[
        "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong",
        "tt", "u",
    ];
    pub(crate) const IN_BODY_END_TABLE_FOSTERS: &[&str] =
        &["table", "tbody", "tfoot", "thead", "tr"];
    pub(crate) const IN_TABLE_TO_BODY: &[&str] = &["tbody", "tfoot", "thead"];
    pub(crate) const IN_TABLE_ADD_BODY: &[&str] = &["td", "th", "tr"];
    pub(crate) const IN_TABLE_TO_HEAD: &[&str] = &["script", "style", "template"];
    pub(crate) const IN_CELL_NAMES: &[&str] = &["td", "th"];
    pub(crate) const IN_CELL_BODY: &[&str] = &["body", "caption", "col", "colgroup", "html"];
    pub(crate) const IN_CELL_TABLE: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];
    pub(crate) const IN_CELL_COL: &[&str] = &[
        "caption", "col", "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr",
    ];
    pub(crate) const IN_TABLE_END_ERR: &[&str] = &[
        "body", "caption", "col", "colgroup", "html", "tbody", "td", "tfoot", "th", "thead", "tr",
    ];
    pub(crate) const IN_TABLE_FOSTER: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];
    pub(crate) const IN_TABLE_BODY_EXIT: &[&str] =
        &["caption", "col", "colgroup", "tbody", "tfoot", "thead"];
    pub(crate) const IN_TABLE_BODY_END_IGNORE: &[&str] = &[
        "body", "caption", "col", "colgroup", "html", "td", "th", "tr",
    ];
    pub(crate) const IN_ROW_MISSING: &[&str] = &[
        "caption", "col", "colgroup", "tbody", "tfoot", "thead", "tr",
    ];
    pub(crate) const IN_ROW_IGNORE: &[&str] =
        &["body", "caption", "col", "colgroup", "html", "td", "th"];
    pub(crate) const IN_SELECT_END: &[&str] = &["input", "keygen", "textarea"];
    pub(crate) const IN_SELECT_TABLE_END: &[&str] = &[
        "caption", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    ];
    pub(crate) const IN_TABLE_END_IGNORE: &[&str] = &["tbody", "tfoot", "thead"];
    pub(crate) const IN_HEAD_NOSCRIPT_IGNORE: &[&str] = &["head", "noscript"];
    pub(crate) const IN_CAPTION_IGNORE: &[&str] = &[
        "body", "col", "colgroup", "html", "tbody", "td", "tfoot", "th", "thead", "tr",
    ];
    pub(crate) const IN_TEMPLATE_TO_HEAD: &[&str] = &[
        "base", "basefont", "bgsound", "link", "meta", "noframes", "script", "style", "template",
        "title",
    ];
    pub(crate) const IN_TEMPLATE_TO_TABLE: &[&str] =
        &["caption", "colgroup", "tbody", "tfoot", "thead"];
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::{Document, NodeData};
    use crate::parse_error::ParseErrorList;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Document {
        let tb = HtmlTreeBuilder::new(
            input,
            "",
            ParseSettings::HTML_DEFAULT,
            ParseErrorList::no_tracking(),
            false,
        );
        let (doc, _errors) = tb.run();
        doc
    }

    #[test]
    fn creates_implied_structure() {
        let doc = parse("<p>One</p>");
        assert_eq!(
            doc.html(),
            "<html><head></head><body><p>One</p></body></html>"
        );
    }

    #[test]
    fn doctype_sets_quirks() {
        let doc = parse("<!doctype html><p>One</p>");
        assert_eq!(doc.quirks_mode(), crate::dom::QuirksMode::NO_QUIRKS);
        assert!(doc.html().starts_with("<!doctype html>"));

        let doc = parse("<!doctype");
        assert_eq!(doc.quirks_mode(), crate::dom::QuirksMode::QUIRKS);
    }

    #[test]
    fn list_items_close_implicitly() {
        let doc = parse("<ul><li>One<li>Two</ul>");
        assert_eq!(
            doc.html(),
            "<html><head></head><body><ul><li>One</li><li>Two</li></ul></body></html>"
        );
    }

    #[test]
    fn table_text_is_fostered() {
        let doc = parse("<table><tr>text<td>cell</td></tr></table>");
        assert_eq!(
            doc.html(),
            "<html><head></head><body>text<table><tbody><tr><td>cell</td></tr></tbody></table></body></html>"
        );
    }

    #[test]
    fn missing_table_scaffolding_is_created() {
        let doc = parse("<table><td>one</td></table>");
        assert_eq!(
            doc.html(),
            "<html><head></head><body><table><tbody><tr><td>one</td></tr></tbody></table></body></html>"
        );
    }

    #[test]
    fn adoption_agency_restructures_misnesting() {
        let doc = parse("<p>1<b>2<i>3</b>4</i>5</p>");
        assert_eq!(
            doc.html(),
            "<html><head></head><body><p>1<b>2<i>3</i></b><i>4</i>5</p></body></html>"
        );
    }

    #[test]
    fn formatting_elements_reconstruct_across_blocks() {
        let doc = parse("<b>one<p>two</b>three</p>");
        assert_eq!(
            doc.html(),
            "<html><head></head><body><b>one</b><p><b>two</b>three</p></body></html>"
        );
    }

    #[test]
    fn head_content_routed_to_head() {
        let doc = parse("<title>T</title><p>Body</p>");
        assert_eq!(
            doc.html(),
            "<html><head><title>T</title></head><body><p>Body</p></body></html>"
        );
    }

    #[test]
    fn script_text_is_data_node() {
        let doc = parse("<script>var a = 1 < 2;</script>");
        let root = doc.root();
        let html = doc.children(root)[0];
        let head = doc.children(html)[0];
        let script = doc.children(head)[0];
        let data = doc.children(script)[0];
        assert!(matches!(doc.data(data), NodeData::Data { .. }));
        assert_eq!(doc.text(root), "");
    }

    #[test]
    fn end_br_becomes_start_br() {
        let doc = parse("one</br>two");
        assert_eq!(
            doc.html(),
            "<html><head></head><body>one<br>two</body></html>"
        );
    }

    #[test]
    fn unknown_self_closing_tag_is_kept_closed() {
        let doc = parse("<widget />text");
        assert_eq!(
            doc.html(),
            "<html><head></head><body><widget />text</body></html>"
        );
    }

    #[test]
    fn isindex_expands_to_form() {
        let doc = parse("<isindex action=\"/search\">");
        let html = doc.html();
        assert!(html.contains("<form action=\"/search\">"), "{html}");
        assert!(html.contains("This is a searchable index."), "{html}");
        assert!(html.contains("<input name=\"isindex\">"), "{html}");
    }

    #[test]
    fn frameset_replaces_body_when_ok() {
        let doc = parse("<html><frameset><frame src=\"a\"></frameset></html>");
        assert_eq!(
            doc.html(),
            "<html><head></head><frameset><frame src=\"a\"></frameset></html>"
        );
    }

    #[test]
    fn select_in_table_pops_out_for_table_parts() {
        let doc = parse("<table><tr><td><select><td>two</table>");
        let html = doc.html();
        assert!(html.contains("<select></select>"), "{html}");
        assert!(html.contains("<td>two</td>"), "{html}");
    }

    #[test]
    fn template_contents_kept() {
        let doc = parse("<template><p>hi</p></template>");
        assert_eq!(
            doc.html(),
            "<html><head><template><p>hi</p></template></head><body></body></html>"
        );
    }

    #[test]
    fn constants_are_sorted() {
        use constants::*;
        for table in [
            IN_HEAD_EMPTY,
            IN_HEAD_RAW,
            IN_HEAD_END,
            AFTER_HEAD_BODY,
            BEFORE_HTML_TO_HEAD,
            IN_HEAD_NOSCRIPT_HEAD,
            IN_BODY_START_TO_HEAD,
            IN_BODY_START_P_CLOSERS,
            HEADINGS,
            IN_BODY_START_LI_BREAKERS,
            DD_DT,
            IN_BODY_START_APPLETS,
            IN_BODY_START_MEDIA,
            IN_BODY_START_INPUT_ATTRIBS,
            IN_BODY_START_DROP,
            IN_BODY_END_CLOSERS,
            IN_BODY_END_ADOPTION_FORMATTERS,
            IN_BODY_END_TABLE_FOSTERS,
            IN_TABLE_TO_BODY,
            IN_TABLE_ADD_BODY,
            IN_TABLE_TO_HEAD,
            IN_CELL_NAMES,
            IN_CELL_BODY,
            IN_CELL_TABLE,
            IN_CELL_COL,
            IN_TABLE_END_ERR,
            IN_TABLE_FOSTER,
            IN_TABLE_BODY_EXIT,
            IN_TABLE_BODY_END_IGNORE,
            IN_ROW_MISSING,
            IN_ROW_IGNORE,
            IN_SELECT_END,
            IN_SELECT_TABLE_END,
            IN_TABLE_END_IGNORE,
            IN_HEAD_NOSCRIPT_IGNORE,
            IN_CAPTION_IGNORE,
            IN_TEMPLATE_TO_HEAD,
            IN_TEMPLATE_TO_TABLE,
        ] {
            let mut sorted = table.to_vec();
            sorted.sort_unstable();
            assert_eq!(table, sorted.as_slice());
        }
    }
}
