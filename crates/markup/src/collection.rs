//! Ordered child list of one node.
//!
//! The collection only holds ids; the nodes themselves live in the
//! [`Document`](crate::Document) arena, which is also the only place that can
//! add or remove entries so parent links and depths stay in sync.

use crate::node::NodeId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeCollection {
    ids: Vec<NodeId>,
}

impl NodeCollection {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.ids.get(index).copied()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.ids.last().copied()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeId>> {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.ids.iter().position(|&c| c == id)
    }

    pub(crate) fn push(&mut self, id: NodeId) {
        self.ids.push(id);
    }

    pub(crate) fn insert(&mut self, index: usize, id: NodeId) {
        self.ids.insert(index, id);
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.ids)
    }
}

impl<'a> IntoIterator for &'a NodeCollection {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
