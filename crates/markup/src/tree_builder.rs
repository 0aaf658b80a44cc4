//! Stack machine turning a token stream into a [`Document`].
//!
//! The open-element stack starts with the document root, which is never
//! popped. Start tags attach to the top and are pushed unless self-closing or
//! void; end tags close the nearest open element with the same name, marking
//! anything above it as unterminated. Trailing text always attaches to
//! whatever is on top after the token has been applied.
//!
//! Builder recovery never drops source bytes except for processing
//! instructions, end tags that match nothing, and malformed attribute
//! fragments.

use crate::attributes::AttributeList;
use crate::document::Document;
use crate::entities::normalize_entities;
use crate::node::{Element, NodeId, NodeKind};
use crate::parser::{ParseContext, ParseStats};
use crate::tokenizer::{Token, TokenKind, TokenStream};
use memchr::{memchr, memrchr};

pub fn build(stream: &TokenStream<'_>, ctx: ParseContext) -> (Document, ParseStats) {
    let ParseContext {
        vault,
        auto_escape,
        mut stats,
    } = ctx;
    stats.tokens = stream.len();

    let mut doc = Document::from_source(stream.leading(), vault, auto_escape);
    let root = doc.root();
    let mut open_elements: Vec<NodeId> = vec![root];
    let mut open_angle = ends_in_open_angle(false, stream.leading());

    for token in stream.iter() {
        let parent = current(&open_elements, root);
        let mut kept = true;
        match &token.kind {
            TokenKind::Comment { body } => {
                doc.attach(parent, NodeKind::Comment(body.to_string()));
                stats.comments += 1;
            }
            TokenKind::Cdata => {
                doc.attach(parent, NodeKind::Text(token.raw.to_string()));
                stats.text_nodes += 1;
            }
            TokenKind::Doctype => {
                doc.attach(parent, NodeKind::Doctype(token.raw.to_string()));
            }
            TokenKind::ProcessingInstruction if open_angle => {
                keep_as_text(&mut doc, parent, token, &mut stats);
            }
            TokenKind::ProcessingInstruction => {
                log::debug!(
                    target: "markup.tree_builder",
                    "dropping processing instruction {:?}",
                    token.raw
                );
                stats.dropped_processing_instructions += 1;
                kept = false;
            }
            TokenKind::InvalidTag => {
                log::debug!(
                    target: "markup.tree_builder",
                    "invalid tag name, keeping {:?} as text",
                    token.raw
                );
                doc.attach(parent, NodeKind::Text(token.raw.to_string()));
                stats.invalid_tags += 1;
                stats.text_nodes += 1;
            }
            TokenKind::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let mut element = Element::new(*name);
                if attributes.bytes().all(|b| b.is_ascii_whitespace()) {
                    element.set_whitespace_after(*attributes);
                } else {
                    let mut list: AttributeList = AttributeList::new();
                    stats.dropped_attribute_fragments += list.parse(attributes);
                    element.set_attributes(list);
                }
                element.set_self_closing(*self_closing);
                let keeps_open = !element.is_self_closing_tag();
                let id = doc.attach(parent, NodeKind::Element(element));
                stats.elements += 1;
                if keeps_open {
                    open_elements.push(id);
                }
            }
            TokenKind::EndTag { name } => {
                if !close_element(&mut doc, &mut open_elements, name, token, &mut stats) {
                    if open_angle {
                        keep_as_text(&mut doc, parent, token, &mut stats);
                    } else {
                        log::debug!(
                            target: "markup.tree_builder",
                            "dropping unmatched end tag {:?}",
                            token.raw
                        );
                        stats.dropped_end_tags += 1;
                        kept = false;
                    }
                }
            }
        }
        if kept {
            open_angle = ends_in_open_angle(open_angle, token.raw);
        }
        open_angle = ends_in_open_angle(open_angle, token.trailing);

        if !token.trailing.is_empty() {
            let parent = current(&open_elements, root);
            let text = text_for(&doc, parent, token.trailing);
            doc.attach(parent, NodeKind::Text(text));
            stats.text_nodes += 1;
        }
    }

    for &id in &open_elements[1..] {
        if let Some(element) = doc.element_mut(id) {
            element.set_unterminated(true);
            stats.unterminated_elements += 1;
        }
    }

    (doc, stats)
}

fn current(open_elements: &[NodeId], root: NodeId) -> NodeId {
    open_elements.last().copied().unwrap_or(root)
}

fn is_element_named(doc: &Document, id: NodeId, name: &str) -> bool {
    doc.element(id)
        .is_some_and(|element| element.name().eq_ignore_ascii_case(name))
}

/// Text under a raw-text element is swapped back from the vault and never
/// escaped; elsewhere it is normalized when auto-escaping is on.
fn text_for(doc: &Document, parent: NodeId, text: &str) -> String {
    let raw_parent = doc.element(parent).is_some_and(Element::is_raw_text);
    if raw_parent {
        return doc
            .vault()
            .resolve_placeholder(text)
            .unwrap_or(text)
            .to_string();
    }
    if doc.auto_escape_text_nodes() {
        normalize_entities(text)
    } else {
        text.to_string()
    }
}

/// Whether output ending in `text` (after output that ended in an open `<`
/// when `before` is set) still has a `<` with no `>` after it. Dropping a
/// token there could splice that `<` onto the following text and make a tag
/// the source never had.
fn ends_in_open_angle(before: bool, text: &str) -> bool {
    let bytes = text.as_bytes();
    match memrchr(b'<', bytes) {
        Some(lt) => memchr(b'>', &bytes[lt..]).is_none(),
        None => before && memchr(b'>', bytes).is_none(),
    }
}

/// Keeps a token the builder would otherwise drop as a literal text node.
fn keep_as_text(doc: &mut Document, parent: NodeId, token: &Token<'_>, stats: &mut ParseStats) {
    log::debug!(
        target: "markup.tree_builder",
        "keeping {:?} as text after an open `<`",
        token.raw
    );
    doc.attach(parent, NodeKind::Text(token.raw.to_string()));
    stats.text_nodes += 1;
}

/// Applies an end tag to the open-element stack. Returns `false` when
/// nothing claimed it.
fn close_element(
    doc: &mut Document,
    open_elements: &mut Vec<NodeId>,
    name: &str,
    token: &Token<'_>,
    stats: &mut ParseStats,
) -> bool {
    if let Some(pos) = open_elements
        .iter()
        .rposition(|&id| is_element_named(doc, id, name))
    {
        for &skipped in &open_elements[pos + 1..] {
            if let Some(element) = doc.element_mut(skipped) {
                log::debug!(
                    target: "markup.tree_builder",
                    "</{name}> implicitly closes <{}>",
                    element.name()
                );
                element.set_unterminated(true);
                stats.unterminated_elements += 1;
            }
        }
        if let Some(element) = doc.element_mut(open_elements[pos]) {
            element.set_end_tag(Some(token.raw.to_string()));
        }
        open_elements.truncate(pos);
        return true;
    }

    // `<input></input>`: the end tag belongs to the void element right before it.
    let parent = current(open_elements, doc.root());
    let previous = doc.children(parent).and_then(|children| children.last());
    if let Some(previous) = previous {
        let childless = doc.children(previous).is_some_and(|c| c.is_empty());
        if let Some(element) = doc.element_mut(previous) {
            if childless
                && element.is_self_closing_tag()
                && element.end_tag().is_none()
                && element.name().eq_ignore_ascii_case(name)
            {
                element.set_end_tag(Some(token.raw.to_string()));
                return true;
            }
        }
    }
    false
}
