//! Side-table for raw-text element bodies.
//!
//! Before tokenizing, the body of every `<script>`, `<style>` and
//! `<template>` element is swapped for a placeholder (`XRMG83jy_` followed by
//! a content digest) so markup-looking text inside it never turns into nodes.
//! The tree builder resolves placeholders back when it creates the text node;
//! [`ScriptVault::restore`] undoes any that survive elsewhere in the output.

use crate::node::is_raw_text_element;
use crate::tokenizer::{ScanLimits, TokenKind, find_rawtext_close_tag, scan_token};
use memchr::{memchr, memmem};
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};

pub const PLACEHOLDER_PREFIX: &str = "XRMG83jy_";
const DIGEST_LEN: usize = 16;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptVault {
    bodies: FxHashMap<String, String>,
}

impl ScriptVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps raw-text element bodies in `html` for placeholders.
    ///
    /// Markup is walked with the tokenizer's own token scanner, so a
    /// `<script>` inside a comment or inside another tag's attribute value is
    /// left alone. An element with no closing tag ends the scan and leaves the
    /// rest of the input as is.
    pub fn hide(html: &str) -> (String, ScriptVault) {
        let mut vault = ScriptVault::new();
        let bytes = html.as_bytes();
        let limits = ScanLimits::new(bytes);
        let mut out = String::with_capacity(html.len());
        let mut copied = 0;
        let mut i = 0;

        while let Some(rel) = memchr(b'<', &bytes[i..]) {
            let lt = i + rel;
            let Some((kind, end)) = scan_token(html, lt, &limits) else {
                i = lt + 1;
                continue;
            };
            i = end;
            let name = match kind {
                TokenKind::StartTag {
                    name,
                    self_closing: false,
                    ..
                } if is_raw_text_element(name) => name,
                _ => continue,
            };
            let Some((close_start, close_end)) = find_rawtext_close_tag(bytes, end, name.as_bytes()) else {
                log::warn!(
                    target: "markup.vault",
                    "unterminated <{name}> at byte {lt}; leaving the rest of the input as is"
                );
                break;
            };
            if close_start > end {
                let body = &html[end..close_start];
                let digest = vault.insert(body);
                log::debug!(
                    target: "markup.vault",
                    "vaulted {} bytes of <{name}> as {digest}",
                    body.len()
                );
                out.push_str(&html[copied..end]);
                out.push_str(PLACEHOLDER_PREFIX);
                out.push_str(&digest);
                copied = close_start;
            }
            i = close_end;
        }
        out.push_str(&html[copied..]);
        (out, vault)
    }

    /// Records `body` and returns its digest.
    fn insert(&mut self, body: &str) -> String {
        let mut salt = 0u64;
        loop {
            let digest = digest(body, salt);
            match self.bodies.get(&digest) {
                Some(existing) if existing != body => salt += 1,
                Some(_) => return digest,
                None => {
                    self.bodies.insert(digest.clone(), body.to_string());
                    return digest;
                }
            }
        }
    }

    pub fn get(&self, digest: &str) -> Option<&str> {
        self.bodies.get(digest).map(String::as_str)
    }

    /// Returns the original body when `text` is exactly one placeholder.
    pub fn resolve_placeholder(&self, text: &str) -> Option<&str> {
        self.get(text.strip_prefix(PLACEHOLDER_PREFIX)?)
    }

    /// Replaces every known placeholder in `rendered` with its body, in one
    /// pass. Unknown digests are left in place.
    pub fn restore(&self, rendered: &str) -> String {
        if self.bodies.is_empty() {
            return rendered.to_string();
        }
        let finder = memmem::Finder::new(PLACEHOLDER_PREFIX);
        let bytes = rendered.as_bytes();
        let mut out = String::with_capacity(rendered.len());
        let mut copied = 0;
        let mut i = 0;
        while let Some(rel) = finder.find(&bytes[i..]) {
            let start = i + rel;
            let digest_start = start + PLACEHOLDER_PREFIX.len();
            let digest_end = digest_start + DIGEST_LEN;
            let body = rendered
                .get(digest_start..digest_end)
                .and_then(|digest| self.bodies.get(digest));
            match body {
                Some(body) => {
                    out.push_str(&rendered[copied..start]);
                    out.push_str(body);
                    copied = digest_end;
                    i = digest_end;
                }
                None => {
                    log::warn!(
                        target: "markup.vault",
                        "placeholder at byte {start} does not name a vaulted body"
                    );
                    i = digest_start;
                }
            }
        }
        out.push_str(&rendered[copied..]);
        out
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

fn digest(body: &str, salt: u64) -> String {
    let mut hasher = FxHasher::default();
    salt.hash(&mut hasher);
    body.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hides_script_style_and_template_bodies() {
        let html = "<script>var a = \"<body></body>\";</script><style>p>a{}</style><template><p>x</p></TEMPLATE>";
        let (hidden, vault) = ScriptVault::hide(html);
        assert_eq!(vault.len(), 3);
        assert!(!hidden.contains("<body>"));
        assert!(!hidden.contains("<p>"));
        assert!(hidden.starts_with("<script>XRMG83jy_"));
        assert!(hidden.ends_with("</TEMPLATE>"));
        assert_eq!(vault.restore(&hidden), html);
    }

    #[test]
    fn placeholder_resolves_to_original_body() {
        let (hidden, vault) = ScriptVault::hide("<script type=\"x\">if (a<b) {}</script>");
        let start = hidden.find(PLACEHOLDER_PREFIX).unwrap();
        let end = hidden.find("</script>").unwrap();
        assert_eq!(end - start, PLACEHOLDER_PREFIX.len() + DIGEST_LEN);
        assert_eq!(vault.resolve_placeholder(&hidden[start..end]), Some("if (a<b) {}"));
        assert_eq!(vault.resolve_placeholder("if (a<b) {}"), None);
    }

    #[test]
    fn empty_and_self_closing_bodies_are_not_vaulted() {
        let html = "<script></script><script src=x/><style> </style>";
        let (hidden, vault) = ScriptVault::hide(html);
        assert_eq!(vault.len(), 1);
        assert!(hidden.starts_with("<script></script><script src=x/><style>XRMG83jy_"));
    }

    #[test]
    fn identical_bodies_share_one_entry() {
        let (hidden, vault) = ScriptVault::hide("<script>a()</script><script>a()</script>");
        assert_eq!(vault.len(), 1);
        assert_eq!(hidden.matches(PLACEHOLDER_PREFIX).count(), 2);
    }

    #[test]
    fn comments_are_skipped() {
        let html = "<!--<script>x</script>--><script>y</script>";
        let (hidden, vault) = ScriptVault::hide(html);
        assert_eq!(vault.len(), 1);
        assert!(hidden.starts_with("<!--<script>x</script>--><script>XRMG83jy_"));
    }

    #[test]
    fn unterminated_script_leaves_rest_untouched() {
        let html = "<style>a{}</style><script>never closed <b>";
        let (hidden, vault) = ScriptVault::hide(html);
        assert_eq!(vault.len(), 1);
        assert!(hidden.ends_with("<script>never closed <b>"));
        assert_eq!(vault.restore(&hidden), html);
    }

    #[test]
    fn quoted_gt_in_start_tag_does_not_open_the_body() {
        let html = "<script data-x=\"a>b\">c</script>";
        let (hidden, vault) = ScriptVault::hide(html);
        assert_eq!(vault.len(), 1);
        assert!(hidden.starts_with("<script data-x=\"a>b\">XRMG83jy_"));
    }

    #[test]
    fn raw_text_tags_inside_attribute_values_are_left_alone() {
        let html = "<div data-tpl=\"<style>p{}</style>\" title='<script>x</script>'>y</div><style>q{}</style>";
        let (hidden, vault) = ScriptVault::hide(html);
        assert_eq!(vault.len(), 1);
        assert!(hidden.starts_with("<div data-tpl=\"<style>p{}</style>\" title='<script>x</script>'>y</div><style>XRMG83jy_"));
        assert_eq!(vault.restore(&hidden), html);
    }

    #[test]
    fn similar_tag_names_are_ignored() {
        let html = "<scripts>x</scripts><styled>y</styled>";
        let (hidden, vault) = ScriptVault::hide(html);
        assert!(vault.is_empty());
        assert_eq!(hidden, html);
    }

    #[test]
    fn restore_leaves_unknown_placeholders() {
        let (_, vault) = ScriptVault::hide("<script>x</script>");
        let text = "XRMG83jy_0000000000000000 XRMG83jy_";
        assert_eq!(vault.restore(text), text);
    }

    #[test]
    fn colliding_digest_is_salted() {
        let mut vault = ScriptVault::new();
        let taken = digest("b", 0);
        vault.bodies.insert(taken.clone(), "a".to_string());
        let assigned = vault.insert("b");
        assert_ne!(assigned, taken);
        assert_eq!(vault.get(&assigned), Some("b"));
    }
}
