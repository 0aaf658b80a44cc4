//! Lenient, format-preserving HTML parser.
//!
//! `serialize(&parse(html)) == html` for any input without processing
//! instructions, orphan end tags or malformed attribute fragments: whitespace,
//! attribute quoting, `=` spacing, self-closing slashes and the exact text of
//! closing tags all survive. Script, style and template bodies are kept
//! opaque, so markup-looking text inside them never becomes nodes.

pub mod attribute;
pub mod attributes;
pub mod collection;
pub mod debug;
pub mod document;
pub mod entities;
pub mod error;
pub mod node;
pub mod parser;
pub mod perf_fixtures;
pub mod tokenizer;
pub mod tree_builder;
pub mod vault;

mod serialize;

pub use crate::attribute::{Attribute, AttributeNode, AttributeParts, Quote};
pub use crate::attributes::AttributeList;
pub use crate::collection::NodeCollection;
pub use crate::document::{Descendants, Document};
pub use crate::error::DomError;
pub use crate::node::{Element, Node, NodeId, NodeKind, is_void_element};
pub use crate::parser::{ParseContext, ParseStats, Parser, ParserConfig, parse, serialize};
pub use crate::tokenizer::{Token, TokenKind, TokenStream, tokenize};
pub use crate::vault::ScriptVault;
