//! Tree-to-text writer.
//!
//! Uses an explicit stack rather than recursion so arbitrarily deep documents
//! serialize without exhausting the call stack. Placeholder restoration is
//! left to the caller ([`Document::to_html`](crate::Document::to_html)).

use crate::document::Document;
use crate::node::{NodeId, NodeKind};

enum Step {
    Open(NodeId),
    /// Closing tag of an element whose inner output started at `inner_start`.
    Close { id: NodeId, inner_start: usize },
}

/// Writes `id` itself and everything below it.
pub(crate) fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    run(doc, vec![Step::Open(id)], out);
}

/// Writes only the children of `id`.
pub(crate) fn write_children(doc: &Document, id: NodeId, out: &mut String) {
    let Some(children) = doc.children(id) else {
        return;
    };
    let stack = children.iter().rev().map(Step::Open).collect();
    run(doc, stack, out);
}

fn run(doc: &Document, mut stack: Vec<Step>, out: &mut String) {
    while let Some(step) = stack.pop() {
        match step {
            Step::Open(id) => {
                let Some(node) = doc.get(id) else {
                    continue;
                };
                match node.kind() {
                    NodeKind::Document => {
                        stack.extend(node.children().iter().rev().map(Step::Open));
                    }
                    NodeKind::Text(text) => out.push_str(text),
                    NodeKind::Comment(body) => {
                        out.push_str("<!--");
                        out.push_str(body);
                        out.push_str("-->");
                    }
                    NodeKind::Doctype(raw) => out.push_str(raw),
                    NodeKind::Element(element) => {
                        element.write_start_tag(out);
                        stack.push(Step::Close {
                            id,
                            inner_start: out.len(),
                        });
                        stack.extend(node.children().iter().rev().map(Step::Open));
                    }
                }
            }
            Step::Close { id, inner_start } => {
                if let Some(element) = doc.element(id) {
                    element.write_end_tag(out, out.len() > inner_start);
                }
            }
        }
    }
}
