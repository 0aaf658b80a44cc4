//! Ordered attribute collection plus the whitespace around it.
//!
//! `<div  id="a" >` keeps `"  "` on the `id` attribute and `" "` as the
//! list's trailing whitespace; a whitespace-only region (no attributes at all)
//! lands in the leading whitespace.

use crate::attribute::{Attribute, AttributeNode, AttributeParts, Quote};
use memchr::memchr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeList<A = Attribute> {
    items: Vec<A>,
    begin_whitespace: String,
    end_whitespace: String,
}

impl<A> Default for AttributeList<A> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            begin_whitespace: String::new(),
            end_whitespace: String::new(),
        }
    }
}

impl<A: AttributeNode> AttributeList<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an attribute region, e.g. ` id="abc" class='red' disabled `.
    pub fn from_html(region: &str) -> Self {
        let mut list = Self::new();
        list.parse(region);
        list
    }

    /// Parses `region` and appends what it finds.
    ///
    /// Fragments that cannot be read as an attribute (a stray quoted string,
    /// `=value` without a name) are dropped; the attributes around them are
    /// still parsed. Returns the number of dropped fragments.
    pub fn parse(&mut self, region: &str) -> usize {
        let bytes = region.as_bytes();
        let len = bytes.len();
        let mut dropped = 0;
        let mut i = 0;

        let skip_whitespace = |k: &mut usize| {
            while *k < len && bytes[*k].is_ascii_whitespace() {
                *k += 1;
            }
        };

        while i < len {
            let ws_start = i;
            skip_whitespace(&mut i);
            let whitespace = &region[ws_start..i];
            if i >= len {
                self.push_padding(whitespace);
                break;
            }

            let name_start = i;
            while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'"' | b'\'') {
                i += 1;
            }
            let name = &region[name_start..i];

            let mut j = i;
            skip_whitespace(&mut j);
            let mut separator = None;
            let mut value = None;
            let mut quote = Quote::None;
            if j < len && bytes[j] == b'=' {
                j += 1;
                skip_whitespace(&mut j);
                separator = Some(&region[i..j]);
                i = j;
                if j < len && matches!(bytes[j], b'"' | b'\'') {
                    if let Some(rel) = memchr(bytes[j], &bytes[j + 1..]) {
                        let end = j + 1 + rel;
                        value = Some(&region[j + 1..end]);
                        quote = Quote::from_char(char::from(bytes[j]));
                        i = end + 1;
                    }
                } else {
                    while j < len && !bytes[j].is_ascii_whitespace() && !matches!(bytes[j], b'"' | b'\'' | b'>') {
                        j += 1;
                    }
                    if j > i {
                        value = Some(&region[i..j]);
                        i = j;
                    }
                }
            }

            if name.is_empty() {
                if separator.is_none() {
                    // Stray quote: skip the quoted run, or just the quote when it never closes.
                    i = match memchr(bytes[i], &bytes[i + 1..]) {
                        Some(rel) => i + 1 + rel + 1,
                        None => i + 1,
                    };
                }
                log::debug!(
                    target: "markup.attributes",
                    "dropping malformed attribute fragment {:?}",
                    &region[ws_start..i]
                );
                dropped += 1;
                continue;
            }

            self.items.push(A::from_parts(AttributeParts {
                whitespace,
                name,
                separator,
                value,
                quote,
            }));
        }
        dropped
    }

    fn push_padding(&mut self, whitespace: &str) {
        if whitespace.is_empty() {
            return;
        }
        if self.items.is_empty() {
            self.begin_whitespace = whitespace.to_string();
        } else {
            self.end_whitespace = whitespace.to_string();
        }
    }

    pub fn push(&mut self, attribute: A) {
        self.items.push(attribute);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, A> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, A> {
        self.items.iter_mut()
    }

    /// First attribute with this name (ASCII case-insensitive).
    pub fn get(&self, name: &str) -> Option<&A> {
        self.items.iter().find(|a| a.name().eq_ignore_ascii_case(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut A> {
        self.items
            .iter_mut()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes every attribute with this name and returns how many went.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|a| !a.name().eq_ignore_ascii_case(name));
        let removed = before - self.items.len();
        if removed > 0 && self.items.is_empty() {
            self.clear();
        }
        removed
    }

    /// Drops all attributes together with the preserved whitespace.
    pub fn clear(&mut self) {
        self.items.clear();
        self.begin_whitespace.clear();
        self.end_whitespace.clear();
    }

    pub fn begin_whitespace(&self) -> &str {
        &self.begin_whitespace
    }

    pub fn set_begin_whitespace(&mut self, whitespace: impl Into<String>) {
        self.begin_whitespace = whitespace.into();
    }

    pub fn end_whitespace(&self) -> &str {
        &self.end_whitespace
    }

    pub fn set_end_whitespace(&mut self, whitespace: impl Into<String>) {
        self.end_whitespace = whitespace.into();
    }

    pub fn write_html(&self, out: &mut String) {
        out.push_str(&self.begin_whitespace);
        for attribute in &self.items {
            attribute.write_html(out);
        }
        out.push_str(&self.end_whitespace);
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

impl<'a, A> IntoIterator for &'a AttributeList<A> {
    type Item = &'a A;
    type IntoIter = std::slice::Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
