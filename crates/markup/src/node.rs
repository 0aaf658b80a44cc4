use crate::attributes::AttributeList;
use crate::collection::NodeCollection;

/// Index of a node inside its [`Document`](crate::Document) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// # Panics
    ///
    /// When `index` does not fit in a `u32`; a document holds at most
    /// `u32::MAX + 1` nodes.
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(u32::try_from(index).expect("node arena exceeds u32::MAX nodes"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    /// Comment body without the `<!--` / `-->` delimiters.
    Comment(String),
    /// The whole declaration as written, e.g. `<!DOCTYPE html>`.
    Doctype(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: NodeCollection,
    pub(crate) depth: i32,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: NodeCollection::default(),
            depth: 0,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &NodeCollection {
        &self.children
    }

    /// Distance from the document root; the root is `-1`, top-level nodes `0`.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn is_document(&self) -> bool {
        matches!(self.kind, NodeKind::Document)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment(_))
    }

    pub fn is_doctype(&self) -> bool {
        matches!(self.kind, NodeKind::Doctype(_))
    }

    /// Only the document and elements own children.
    pub fn can_have_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element(_))
    }

    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(element) => Some(element.name()),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match &mut self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: AttributeList,
    whitespace_after: String,
    self_closing: bool,
    end_tag: Option<String>,
    unterminated: bool,
}

impl Element {
    /// Does not validate `name`; [`Document::create_element`](crate::Document::create_element) does.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeList::new(),
            whitespace_after: String::new(),
            self_closing: false,
            end_tag: None,
            unterminated: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeList {
        &mut self.attributes
    }

    pub(crate) fn set_attributes(&mut self, attributes: AttributeList) {
        self.attributes = attributes;
    }

    /// Whitespace written before `>` / `/>` of a tag with no attributes.
    pub fn whitespace_after(&self) -> &str {
        &self.whitespace_after
    }

    pub fn set_whitespace_after(&mut self, whitespace: impl Into<String>) {
        self.whitespace_after = whitespace.into();
    }

    /// Whether the source tag ended in `/>`.
    pub fn has_self_closing_slash(&self) -> bool {
        self.self_closing
    }

    pub fn set_self_closing(&mut self, self_closing: bool) {
        self.self_closing = self_closing;
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }

    pub fn is_self_closing_tag(&self) -> bool {
        self.self_closing || self.is_void()
    }

    /// `script`, `style` and `template` bodies are kept verbatim.
    pub fn is_raw_text(&self) -> bool {
        is_raw_text_element(&self.name)
    }

    /// Raw closing tag as written, e.g. `</DIV >`.
    pub fn end_tag(&self) -> Option<&str> {
        self.end_tag.as_deref()
    }

    pub fn set_end_tag(&mut self, end_tag: Option<String>) {
        self.end_tag = end_tag;
    }

    /// The source never closed this element.
    pub fn is_unterminated(&self) -> bool {
        self.unterminated
    }

    pub fn set_unterminated(&mut self, unterminated: bool) {
        self.unterminated = unterminated;
    }

    pub(crate) fn write_start_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        self.attributes.write_html(out);
        out.push_str(&self.whitespace_after);
        if self.self_closing {
            out.push('/');
        }
        out.push('>');
    }

    /// Writes the closing tag: the captured one, or `</name>` when the
    /// element rendered inner content and was closed without one.
    pub(crate) fn write_end_tag(&self, out: &mut String, has_inner: bool) {
        if let Some(end_tag) = &self.end_tag {
            out.push_str(end_tag);
        } else if has_inner && !self.unterminated && !self.is_self_closing_tag() {
            out.push_str("</");
            out.push_str(&self.name);
            out.push('>');
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "menuitem", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "template"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// ASCII letter first, then ASCII alphanumerics, `-`, `_`, `:`, `.` or any
/// non-ASCII character.
pub fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| !c.is_ascii() || c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_round_trips_its_index() {
        assert_eq!(NodeId::from_index(0), NodeId::ROOT);
        assert_eq!(NodeId::from_index(u32::MAX as usize).index(), u32::MAX as usize);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "node arena exceeds u32::MAX nodes")]
    fn node_id_rejects_indices_past_u32() {
        let _ = NodeId::from_index(u32::MAX as usize + 1);
    }

    #[test]
    fn void_set_is_case_insensitive() {
        for name in ["br", "BR", "Img", "menuitem", "keygen", "command"] {
            assert!(is_void_element(name), "{name}");
        }
        assert!(!is_void_element("div"));
        assert!(!is_void_element("!doctype"));
    }

    #[test]
    fn self_closing_tag_covers_void_and_slash() {
        assert!(Element::new("br").is_self_closing_tag());
        let mut div = Element::new("div");
        assert!(!div.is_self_closing_tag());
        div.set_self_closing(true);
        assert!(div.is_self_closing_tag());
    }

    #[test]
    fn element_names() {
        for name in ["div", "my-widget", "svg:rect", "h1", "x.y", "\u{00e9}l\u{00e9}ment", "a\u{00e9}"] {
            assert_eq!(is_valid_element_name(name), name.starts_with(|c: char| c.is_ascii_alphabetic()), "{name}");
        }
        for name in ["", "1div", "-x", "a=b", "a\"b", "a<b", "%", "\u{00e9}"] {
            assert!(!is_valid_element_name(name), "{name}");
        }
    }

    #[test]
    fn end_tag_is_synthesized_only_for_closed_elements_with_content() {
        let mut div = Element::new("div");
        let mut out = String::new();
        div.write_end_tag(&mut out, false);
        assert_eq!(out, "");
        div.write_end_tag(&mut out, true);
        assert_eq!(out, "</div>");

        out.clear();
        div.set_unterminated(true);
        div.write_end_tag(&mut out, true);
        assert_eq!(out, "");

        out.clear();
        div.set_end_tag(Some("</DIV >".to_string()));
        div.write_end_tag(&mut out, false);
        assert_eq!(out, "</DIV >");
    }

    #[test]
    fn start_tag_keeps_padding_and_slash() {
        let mut br = Element::new("br");
        br.set_whitespace_after(" ");
        br.set_self_closing(true);
        let mut out = String::new();
        br.write_start_tag(&mut out);
        assert_eq!(out, "<br />");
    }
}
