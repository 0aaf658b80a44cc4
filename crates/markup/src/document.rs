//! Arena-backed document tree.
//!
//! Nodes live in one vector and refer to each other by [`NodeId`]. Removing a
//! node empties its slot (and those of its whole subtree), so stale ids are
//! detected instead of pointing at reused storage.

use crate::attribute::Attribute;
use crate::collection::NodeCollection;
use crate::entities::normalize_entities;
use crate::error::DomError;
use crate::node::{is_valid_element_name, Element, Node, NodeId, NodeKind};
use crate::serialize;
use crate::vault::ScriptVault;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    leading_text: String,
    vault: ScriptVault,
    auto_escape: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut root = Node::new(NodeKind::Document);
        root.depth = -1;
        Self {
            nodes: vec![Some(root)],
            leading_text: String::new(),
            vault: ScriptVault::new(),
            auto_escape: false,
        }
    }

    pub(crate) fn from_source(leading_text: &str, vault: ScriptVault, auto_escape: bool) -> Self {
        let mut doc = Self::new();
        doc.leading_text = leading_text.to_string();
        doc.vault = vault;
        doc.auto_escape = auto_escape;
        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn live(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::StaleNode(id))
    }

    fn live_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.get_mut(id).ok_or(DomError::StaleNode(id))
    }

    fn element_or_err(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        self.live_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    pub fn children(&self, id: NodeId) -> Option<&NodeCollection> {
        self.get(id).map(Node::children)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn depth(&self, id: NodeId) -> Option<i32> {
        self.get(id).map(Node::depth)
    }

    /// Sets the depth of `id` and renumbers its subtree below it.
    pub fn set_depth(&mut self, id: NodeId, depth: i32) -> Result<(), DomError> {
        self.live_mut(id)?.depth = depth;
        self.renumber_subtree(id);
        Ok(())
    }

    fn renumber_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            let depth = node.depth + 1;
            let children: Vec<NodeId> = node.children.iter().collect();
            for child in children {
                if let Some(child_node) = self.get_mut(child) {
                    child_node.depth = depth;
                    stack.push(child);
                }
            }
        }
    }

    /// Pre-order walk over everything below `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        if let Some(node) = self.get(id) {
            stack.extend(node.children.iter().rev());
        }
        Descendants { doc: self, stack }
    }

    /// First element named `name` (ASCII case-insensitive) in document order.
    pub fn find_element(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root()).find(|&id| {
            self.element(id)
                .is_some_and(|element| element.name().eq_ignore_ascii_case(name))
        })
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Some(Node::new(kind)));
        id
    }

    /// Allocates a node and appends it to `parent` without the checks
    /// [`append_child`](Self::append_child) does. `parent` must be a live
    /// container.
    pub(crate) fn attach(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind);
        let Some(parent_node) = self.get_mut(parent) else {
            debug_assert!(false, "attach to a removed node");
            return id;
        };
        debug_assert!(parent_node.can_have_children());
        parent_node.children.push(id);
        let depth = parent_node.depth + 1;
        if let Some(node) = self.get_mut(id) {
            node.parent = Some(parent);
            node.depth = depth;
        }
        id
    }

    pub fn create_element(&mut self, name: &str) -> Result<NodeId, DomError> {
        if !is_valid_element_name(name) {
            return Err(DomError::InvalidName(name.to_string()));
        }
        Ok(self.alloc(NodeKind::Element(Element::new(name))))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let text = self.escape(text);
        self.alloc(NodeKind::Text(text))
    }

    /// `body` goes between `<!--` and `-->`.
    pub fn create_comment(&mut self, body: &str) -> NodeId {
        self.alloc(NodeKind::Comment(body.to_string()))
    }

    /// `raw` is the full declaration, e.g. `<!DOCTYPE html>`.
    pub fn create_doctype(&mut self, raw: &str) -> NodeId {
        self.alloc(NodeKind::Doctype(raw.to_string()))
    }

    /// Appends `child` as the last child of `parent`, detaching it from its
    /// current parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.place_child(parent, None, child)
    }

    /// Inserts `child` at `index` among the children of `parent` (clamped to
    /// the end), detaching it from its current parent first. The index is
    /// taken after the detach.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), DomError> {
        self.place_child(parent, Some(index), child)
    }

    fn place_child(&mut self, parent: NodeId, index: Option<usize>, child: NodeId) -> Result<(), DomError> {
        if child == self.root() {
            return Err(DomError::RootNode);
        }
        if !self.live(parent)?.can_have_children() {
            return Err(DomError::NotAContainer(parent));
        }
        self.live(child)?;
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(DomError::CyclicAppend { parent, child });
            }
            ancestor = self.parent(current);
        }

        self.detach(child);
        let depth = self.live(parent)?.depth + 1;
        let children = &mut self.live_mut(parent)?.children;
        match index {
            Some(index) if index < children.len() => children.insert(index, child),
            _ => children.push(child),
        }
        let node = self.live_mut(child)?;
        node.parent = Some(parent);
        node.depth = depth;
        self.renumber_subtree(child);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.remove(id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Detaches `id` and invalidates it together with its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root() {
            return Err(DomError::RootNode);
        }
        self.live(id)?;
        self.detach(id);
        self.invalidate_subtree(id);
        Ok(())
    }

    /// Removes every child of `parent`; returns how many were removed.
    pub fn remove_children(&mut self, parent: NodeId) -> Result<usize, DomError> {
        let children = self.live_mut(parent)?.children.take();
        for &child in &children {
            self.invalidate_subtree(child);
        }
        Ok(children.len())
    }

    fn invalidate_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.index()).and_then(Option::take) {
                stack.extend(node.children.iter());
            }
        }
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attributes().get(name)?.value()
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id)
            .is_some_and(|element| element.attributes().contains(name))
    }

    /// Updates the first attribute named `name`, or appends a new one.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Option<&str>) -> Result<(), DomError> {
        let value = value.map(|v| self.escape(v));
        let attributes = self.element_or_err(id)?.attributes_mut();
        match attributes.get_mut(name) {
            Some(attribute) => attribute.set_value(value.as_deref()),
            None => attributes.push(Attribute::new(name, value.as_deref())),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<usize, DomError> {
        Ok(self.element_or_err(id)?.attributes_mut().remove(name))
    }

    pub fn clear_attributes(&mut self, id: NodeId) -> Result<(), DomError> {
        self.element_or_err(id)?.attributes_mut().clear();
        Ok(())
    }

    /// Replaces the content of a text node, or all children of an element
    /// with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        let node = self.live(id)?;
        let raw = node.as_element().is_some_and(Element::is_raw_text);
        let text = if raw { text.to_string() } else { self.escape(text) };
        match &mut self.live_mut(id)?.kind {
            NodeKind::Text(content) => {
                *content = text;
                return Ok(());
            }
            NodeKind::Element(_) => {}
            _ => return Err(DomError::NotAContainer(id)),
        }
        self.remove_children(id)?;
        self.attach(id, NodeKind::Text(text));
        Ok(())
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.get(id).and_then(Node::text) {
            out.push_str(text);
        }
        for descendant in self.descendants(id) {
            if let Some(text) = self.get(descendant).and_then(Node::text) {
                out.push_str(text);
            }
        }
        out
    }

    pub fn end_tag(&self, id: NodeId) -> Option<&str> {
        self.element(id)?.end_tag()
    }

    pub fn set_end_tag(&mut self, id: NodeId, end_tag: Option<String>) -> Result<(), DomError> {
        self.element_or_err(id)?.set_end_tag(end_tag);
        Ok(())
    }

    pub fn set_self_closing(&mut self, id: NodeId, self_closing: bool) -> Result<(), DomError> {
        self.element_or_err(id)?.set_self_closing(self_closing);
        Ok(())
    }

    /// Raw text of the first doctype declaration.
    pub fn doctype(&self) -> Option<&str> {
        self.descendants(self.root())
            .find_map(|id| match self.get(id).map(Node::kind) {
                Some(NodeKind::Doctype(raw)) => Some(raw.as_str()),
                _ => None,
            })
    }

    /// Text before the first tag of the source.
    pub fn leading_text(&self) -> &str {
        &self.leading_text
    }

    pub fn set_leading_text(&mut self, text: impl Into<String>) {
        self.leading_text = text.into();
    }

    pub fn vault(&self) -> &ScriptVault {
        &self.vault
    }

    pub fn auto_escape_text_nodes(&self) -> bool {
        self.auto_escape
    }

    pub fn set_auto_escape_text_nodes(&mut self, enabled: bool) {
        self.auto_escape = enabled;
    }

    fn escape(&self, text: &str) -> String {
        if self.auto_escape {
            normalize_entities(text)
        } else {
            text.to_string()
        }
    }

    /// Serializes the whole document.
    pub fn to_html(&self) -> String {
        let mut out = self.leading_text.clone();
        serialize::write_children(self, self.root(), &mut out);
        self.vault.restore(&out)
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize::write_node(self, id, &mut out);
        self.vault.restore(&out)
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize::write_children(self, id, &mut out);
        self.vault.restore(&out)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.doc.get(id) {
            self.stack.extend(node.children.iter().rev());
        }
        Some(id)
    }
}
