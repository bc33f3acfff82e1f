//! A compact arena DOM.
//!
//! The `Document` owns every node in a single arena; nodes refer to each
//! other by `NodeId` index. The tree builders only need a narrow surface
//! here: create nodes, append/insert/remove children, look up parents,
//! names and attributes, and record source ranges. A minimal serializer
//! (`outer_html`) supports round-trip testing.

pub mod attributes;

use crate::tag::Tag;

pub use attributes::{Attribute, Attributes};

/// Index of a node within its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A tracked source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub pos: usize,
    pub line: usize,
    pub col: usize,
}

/// The source span a node was parsed from, when position tracking is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Document quirks mode, determined by the doctype in the Initial
/// insertion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuirksMode {
    #[default]
    NO_QUIRKS,
    QUIRKS,
    LIMITED_QUIRKS,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element {
        tag: Tag,
        attrs: Attributes,
        /// For `<form>` elements: the form-listed controls associated
        /// with this form during parsing.
        form_controls: Option<Vec<NodeId>>,
    },
    Text {
        text: String,
    },
    /// Non-text character data, e.g. inside `<script>`/`<style>`.
    Data {
        text: String,
    },
    CData {
        text: String,
    },
    Comment {
        text: String,
    },
    Doctype {
        name: String,
        /// "PUBLIC" or "SYSTEM" when the doctype declared one.
        pub_sys_key: Option<String>,
        public_id: String,
        system_id: String,
    },
    /// An XML declaration or processing instruction, e.g. `<?xml ...?>`.
    XmlDeclaration {
        name: String,
        is_processing_instruction: bool,
        attrs: Attributes,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
    range: Option<Range>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    base_uri: String,
    quirks_mode: QuirksMode,
}

impl Document {
    pub fn new(base_uri: &str) -> Document {
        Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
                range: None,
            }],
            base_uri: base_uri.to_string(),
            quirks_mode: QuirksMode::default(),
        }
    }

    /// The document node itself.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn set_base_uri(&mut self, base_uri: &str) {
        self.base_uri = base_uri.to_string();
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    pub fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    fn new_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
            range: None,
        });
        id
    }

    pub fn new_element(&mut self, tag: Tag, attrs: Attributes) -> NodeId {
        let form_controls = if tag.normal_name() == "form" {
            Some(Vec::new())
        } else {
            None
        };
        self.new_node(NodeData::Element {
            tag,
            attrs,
            form_controls,
        })
    }

    pub fn new_text(&mut self, text: String) -> NodeId {
        self.new_node(NodeData::Text { text })
    }

    pub fn new_data(&mut self, text: String) -> NodeId {
        self.new_node(NodeData::Data { text })
    }

    pub fn new_cdata(&mut self, text: String) -> NodeId {
        self.new_node(NodeData::CData { text })
    }

    pub fn new_comment(&mut self, text: String) -> NodeId {
        self.new_node(NodeData::Comment { text })
    }

    pub fn new_doctype(
        &mut self,
        name: String,
        pub_sys_key: Option<String>,
        public_id: String,
        system_id: String,
    ) -> NodeId {
        self.new_node(NodeData::Doctype {
            name,
            pub_sys_key,
            public_id,
            system_id,
        })
    }

    pub fn new_xml_declaration(
        &mut self,
        name: String,
        is_processing_instruction: bool,
        attrs: Attributes,
    ) -> NodeId {
        self.new_node(NodeData::XmlDeclaration {
            name,
            is_processing_instruction,
            attrs,
        })
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The node's normalized name: the lower-case tag name for elements,
    /// `#text`, `#comment` etc. for leaf nodes.
    pub fn normal_name(&self, id: NodeId) -> &str {
        match &self.nodes[id.0].data {
            NodeData::Document => "#document",
            NodeData::Element { tag, .. } => tag.normal_name(),
            NodeData::Text { .. } => "#text",
            NodeData::Data { .. } => "#data",
            NodeData::CData { .. } => "#cdata",
            NodeData::Comment { .. } => "#comment",
            NodeData::Doctype { .. } => "#doctype",
            NodeData::XmlDeclaration { .. } => "#declaration",
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Element { .. })
    }

    pub fn tag(&self, id: NodeId) -> Option<&Tag> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } | NodeData::XmlDeclaration { attrs, .. } => {
                Some(attrs)
            }
            _ => None,
        }
    }

    pub fn attributes_mut(&mut self, id: NodeId) -> Option<&mut Attributes> {
        match &mut self.nodes[id.0].data {
            NodeData::Element { attrs, .. } | NodeData::XmlDeclaration { attrs, .. } => {
                Some(attrs)
            }
            _ => None,
        }
    }

    /// Appends `child` as the last child of `parent`, detaching it from
    /// any previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_ne!(parent, child);
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `children` into `parent` at `index`, preserving their order.
    pub fn insert_children(&mut self, parent: NodeId, index: usize, children: &[NodeId]) {
        for (offset, &child) in children.iter().enumerate() {
            self.remove(child);
            self.nodes[child.0].parent = Some(parent);
            let at = (index + offset).min(self.nodes[parent.0].children.len());
            self.nodes[parent.0].children.insert(at, child);
        }
    }

    /// Inserts `node` as the previous sibling of `sibling`.
    /// `sibling` must have a parent.
    pub fn insert_before(&mut self, node: NodeId, sibling: NodeId) {
        let parent = self.nodes[sibling.0]
            .parent
            .expect("insert_before target has no parent");
        self.remove(node);
        self.nodes[node.0].parent = Some(parent);
        let at = self.index_in_parent(sibling).unwrap_or(0);
        self.nodes[parent.0].children.insert(at, node);
    }

    /// Detaches a node from its parent. The node and its subtree stay in
    /// the arena and may be re-attached.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// The position of `id` within its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.nodes[id.0].parent?;
        self.nodes[parent.0].children.iter().position(|&c| c == id)
    }

    pub(crate) fn add_form_control(&mut self, form: NodeId, control: NodeId) {
        if let NodeData::Element {
            form_controls: Some(controls),
            ..
        } = &mut self.nodes[form.0].data
        {
            controls.push(control);
        }
    }

    pub fn form_controls(&self, form: NodeId) -> Option<&[NodeId]> {
        match &self.nodes[form.0].data {
            NodeData::Element {
                form_controls: Some(controls),
                ..
            } => Some(controls),
            _ => None,
        }
    }

    pub fn source_range(&self, id: NodeId) -> Option<Range> {
        self.nodes[id.0].range
    }

    pub(crate) fn set_range_start(&mut self, id: NodeId, start: Position) {
        let range = self.nodes[id.0].range.get_or_insert(Range {
            start,
            end: start,
        });
        range.start = start;
    }

    pub(crate) fn set_range_end(&mut self, id: NodeId, end: Position) {
        if let Some(range) = &mut self.nodes[id.0].range {
            range.end = end;
        } else {
            self.nodes[id.0].range = Some(Range {
                start: Position::default(),
                end,
            });
        }
    }

    /// Appends a run of text to the node's last child if that child is a
    /// text node, else creates a new text node. Keeps adjacent character
    /// tokens from fragmenting into many nodes.
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeData::Text { text: existing } = &mut self.nodes[last.0].data {
                existing.push_str(text);
                return last;
            }
        }
        let node = self.new_text(text.to_string());
        self.append_child(parent, node);
        node
    }

    /// Concatenated text of the subtree, without markup.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let mut work = vec![id];
        while let Some(id) = work.pop() {
            match &self.nodes[id.0].data {
                NodeData::Text { text } => out.push_str(text),
                _ => work.extend(self.nodes[id.0].children.iter().rev()),
            }
        }
    }

    /// Serializes the whole document.
    pub fn html(&self) -> String {
        let mut out = String::new();
        for &child in &self.nodes[0].children {
            self.serialize(child, &mut out);
        }
        out
    }

    /// Serializes one node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize(id, &mut out);
        out
    }

    // explicit work stack, so document depth never limits serialization
    fn serialize(&self, id: NodeId, out: &mut String) {
        enum Op {
            Open(NodeId),
            Close(NodeId),
        }
        let mut work = vec![Op::Open(id)];
        while let Some(op) = work.pop() {
            let id = match op {
                Op::Close(id) => {
                    if let NodeData::Element { tag, .. } = &self.nodes[id.0].data {
                        out.push_str("</");
                        out.push_str(tag.name());
                        out.push('>');
                    }
                    continue;
                }
                Op::Open(id) => id,
            };
            match &self.nodes[id.0].data {
                NodeData::Document => {
                    for &child in self.nodes[id.0].children.iter().rev() {
                        work.push(Op::Open(child));
                    }
                }
                NodeData::Element { tag, attrs, .. } => {
                    out.push('<');
                    out.push_str(tag.name());
                    for attr in attrs {
                        out.push(' ');
                        out.push_str(attr.name());
                        if attr.has_declared_value() {
                            out.push_str("=\"");
                            escape_into(attr.value(), true, out);
                            out.push('"');
                        }
                    }
                    if self.nodes[id.0].children.is_empty() && tag.is_self_closing() {
                        if tag.is_empty() {
                            out.push('>');
                        } else {
                            out.push_str(" />");
                        }
                        continue;
                    }
                    out.push('>');
                    work.push(Op::Close(id));
                    for &child in self.nodes[id.0].children.iter().rev() {
                        work.push(Op::Open(child));
                    }
                }
                NodeData::Text { text } => escape_into(text, false, out),
                NodeData::Data { text } => out.push_str(text),
                NodeData::CData { text } => {
                    out.push_str("<![CDATA[");
                    out.push_str(text);
                    out.push_str("]]>");
                }
                NodeData::Comment { text } => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                NodeData::Doctype {
                    name,
                    pub_sys_key,
                    public_id,
                    system_id,
                } => {
                    out.push_str("<!doctype");
                    if !name.is_empty() {
                        out.push(' ');
                        out.push_str(name);
                    }
                    if let Some(key) = pub_sys_key {
                        out.push(' ');
                        out.push_str(key);
                    }
                    if !public_id.is_empty() {
                        out.push_str(" \"");
                        out.push_str(public_id);
                        out.push('"');
                    }
                    if !system_id.is_empty() {
                        out.push_str(" \"");
                        out.push_str(system_id);
                        out.push('"');
                    }
                    out.push('>');
                }
                NodeData::XmlDeclaration {
                    name,
                    is_processing_instruction,
                    attrs,
                } => {
                    out.push_str(if *is_processing_instruction {
                        "<!"
                    } else {
                        "<?"
                    });
                    out.push_str(name);
                    for attr in attrs {
                        out.push(' ');
                        out.push_str(attr.name());
                        if attr.has_declared_value() {
                            out.push_str("=\"");
                            escape_into(attr.value(), true, out);
                            out.push('"');
                        }
                    }
                    out.push_str(if *is_processing_instruction {
                        ">"
                    } else {
                        "?>"
                    });
                }
            }
        }
    }
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::settings::ParseSettings;

    fn el(doc: &mut Document, name: &str) -> NodeId {
        let tag = Tag::value_of(name, &ParseSettings::HTML_DEFAULT);
        doc.new_element(tag, Attributes::new())
    }

    #[test]
    fn build_and_serialize() {
        let mut doc = Document::new("");
        let root = doc.root();
        let div = el(&mut doc, "div");
        doc.append_child(root, div);
        let text = doc.new_text("a < b".into());
        doc.append_child(div, text);
        assert_eq!(doc.html(), "<div>a &lt; b</div>");
        assert_eq!(doc.text(root), "a < b");
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let mut doc = Document::new("");
        let root = doc.root();
        let img = el(&mut doc, "img");
        doc.append_child(root, img);
        assert_eq!(doc.html(), "<img>");
    }

    #[test]
    fn insert_before_and_remove() {
        let mut doc = Document::new("");
        let root = doc.root();
        let a = el(&mut doc, "a");
        let b = el(&mut doc, "b");
        doc.append_child(root, a);
        doc.insert_before(b, a);
        assert_eq!(doc.children(root), &[b, a]);
        doc.remove(b);
        assert_eq!(doc.children(root), &[a]);
        assert_eq!(doc.parent(b), None);
    }

    #[test]
    fn insert_children_preserves_order() {
        let mut doc = Document::new("");
        let root = doc.root();
        let div = el(&mut doc, "div");
        doc.append_child(root, div);
        let x = doc.new_text("x".into());
        let y = doc.new_text("y".into());
        doc.insert_children(div, 0, &[x, y]);
        assert_eq!(doc.children(div), &[x, y]);
    }

    #[test]
    fn append_text_coalesces() {
        let mut doc = Document::new("");
        let root = doc.root();
        let div = el(&mut doc, "div");
        doc.append_child(root, div);
        let first = doc.append_text(div, "one");
        let second = doc.append_text(div, " two");
        assert_eq!(first, second);
        assert_eq!(doc.text(div), "one two");
    }

    #[test]
    fn form_controls_tracked() {
        let mut doc = Document::new("");
        let root = doc.root();
        let form = el(&mut doc, "form");
        doc.append_child(root, form);
        let input = el(&mut doc, "input");
        doc.append_child(form, input);
        doc.add_form_control(form, input);
        assert_eq!(doc.form_controls(form), Some(&[input][..]));
    }
}
