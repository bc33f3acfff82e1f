//! An HTML5 parser. Tokenises and tree-builds real-world HTML into a
//! normalised document, per the WHATWG parsing algorithm, with a simple
//! XML mode alongside.

#![allow(non_camel_case_types)]

mod character_reader;
pub mod dom;
mod html_tree_builder;
mod html_tree_builder_state;
mod parse_error;
pub mod parser;
mod settings;
mod tag;
mod token;
pub mod token_queue;
mod tokeniser;
mod tokeniser_state;
mod tree_builder;
mod xml_tree_builder;

pub use dom::{
    Attribute, Attributes, Document, NodeData, NodeId, Position, QuirksMode, Range,
};
pub use parse_error::{ParseError, ParseErrorList};
pub use parser::{
    parse, parse_body_fragment, parse_fragment, parse_xml_fragment, unescape_entities, Parser,
};
pub use settings::ParseSettings;
pub use tag::Tag;
