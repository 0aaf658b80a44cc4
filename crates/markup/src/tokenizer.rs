//! Lenient, lossless HTML tokenizer.
//!
//! The tokenizer never rewrites input. Every token carries the exact slice it
//! matched plus the free text that follows it up to the next token, so
//! concatenating `leading` with each token's `raw` and `trailing` reproduces
//! the input byte for byte.
//!
//! Recognized forms, tried in order at every `<`:
//! - `<!-- ... -->` comments (non-greedy, across lines)
//! - `<![CDATA[ ... ]]>` sections
//! - `<? ... >` processing instructions
//! - `<!doctype ...>` (case-insensitive)
//! - generic start/end tags: `<name ...>`, `</name ...>`, `<name .../>`
//!
//! A `>` inside a quoted attribute value does not end a tag. Anything that
//! does not match (unterminated comment, unterminated quote, no closing `>`,
//! `<` followed by whitespace) stays literal text.
//!
//! Script, style and template bodies are not special-cased here; they are
//! swapped out by the vault before tokenizing.
use crate::node::is_valid_element_name;
use memchr::{memchr, memchr3, memmem, memrchr};

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"-->";
const CDATA_START: &[u8] = b"<![CDATA[";
const CDATA_END: &[u8] = b"]]>";
const DOCTYPE_START: &[u8] = b"<!doctype";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Comment {
        body: &'a str,
    },
    Cdata,
    ProcessingInstruction,
    Doctype,
    StartTag {
        name: &'a str,
        /// Everything between the name and `>`, without a trailing `/`.
        attributes: &'a str,
        self_closing: bool,
    },
    EndTag {
        name: &'a str,
    },
    /// Well-formed tag syntax around a name that cannot name an element.
    InvalidTag,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub raw: &'a str,
    /// Text after this token up to the next token or end of input.
    pub trailing: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenStream<'a> {
    leading: &'a str,
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenStream<'a> {
    /// Text before the first token.
    pub fn leading(&self) -> &'a str {
        self.leading
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token<'a>> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Reassembles the source text.
    pub fn to_source(&self) -> String {
        let mut out = String::from(self.leading);
        for token in &self.tokens {
            out.push_str(token.raw);
            out.push_str(token.trailing);
        }
        out
    }
}

pub(crate) fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

/// Finds the `>` closing a tag whose attribute region starts at `from`,
/// skipping over quoted strings. `None` when a quote or the tag never closes.
pub(crate) fn scan_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    loop {
        let rel = memchr3(b'>', b'"', b'\'', bytes.get(i..)?)?;
        let pos = i + rel;
        if bytes[pos] == b'>' {
            return Some(pos);
        }
        let close = memchr(bytes[pos], &bytes[pos + 1..])?;
        i = pos + 1 + close + 1;
    }
}

/// Finds `</name` (ASCII case-insensitive) followed by optional ASCII
/// whitespace and `>`, searching from `from`. Returns the closing tag's
/// start and end offsets.
pub(crate) fn find_rawtext_close_tag(bytes: &[u8], from: usize, name: &[u8]) -> Option<(usize, usize)> {
    debug_assert!(name.is_ascii());
    let len = bytes.len();
    let n = name.len() + 2;
    let mut i = from;
    while i + n <= len {
        let rel = memchr(b'<', &bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if bytes[i + 1] == b'/' && starts_with_ignore_ascii_case_at(bytes, i + 2, name) {
            let mut k = i + n;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Positions after which a terminator cannot occur, so hopeless scans bail
/// out in O(1) instead of walking to the end of input again.
pub(crate) struct ScanLimits {
    last_gt: Option<usize>,
    last_comment_end: Option<usize>,
    last_cdata_end: Option<usize>,
}

impl ScanLimits {
    pub(crate) fn new(bytes: &[u8]) -> Self {
        Self {
            last_gt: memrchr(b'>', bytes),
            last_comment_end: memmem::rfind(bytes, COMMENT_END),
            last_cdata_end: memmem::rfind(bytes, CDATA_END),
        }
    }

    fn reachable(limit: Option<usize>, from: usize) -> bool {
        limit.is_some_and(|end| end >= from)
    }
}

pub fn tokenize(input: &str) -> TokenStream<'_> {
    let bytes = input.as_bytes();
    let limits = ScanLimits::new(bytes);
    let mut stream = TokenStream::default();
    let mut text_start = 0;
    let mut i = 0;

    // Slices are only cut at ASCII structural bytes, which are always UTF-8
    // char boundaries.
    while let Some(rel) = memchr(b'<', &bytes[i..]) {
        let lt = i + rel;
        let Some((kind, end)) = scan_token(input, lt, &limits) else {
            i = lt + 1;
            continue;
        };
        debug_assert!(input.is_char_boundary(lt));
        debug_assert!(input.is_char_boundary(end));
        let text = &input[text_start..lt];
        match stream.tokens.last_mut() {
            Some(prev) => prev.trailing = text,
            None => stream.leading = text,
        }
        let raw = &input[lt..end];
        log::trace!(target: "markup.tokenizer", "{kind:?} at {lt}: {raw:?}");
        stream.tokens.push(Token {
            kind,
            raw,
            trailing: "",
        });
        i = end;
        text_start = end;
        if i >= bytes.len() {
            break;
        }
    }

    let text = &input[text_start..];
    match stream.tokens.last_mut() {
        Some(prev) => prev.trailing = text,
        None => stream.leading = text,
    }
    stream
}

/// Tries to read one token at `lt` (which holds `<`). Returns the token kind
/// and the offset just past it.
pub(crate) fn scan_token<'a>(input: &'a str, lt: usize, limits: &ScanLimits) -> Option<(TokenKind<'a>, usize)> {
    let bytes = input.as_bytes();

    if bytes[lt..].starts_with(COMMENT_START) {
        let body_start = lt + COMMENT_START.len();
        if !ScanLimits::reachable(limits.last_comment_end, body_start) {
            return None;
        }
        let body_len = memmem::find(&bytes[body_start..], COMMENT_END)?;
        let body_end = body_start + body_len;
        return Some((
            TokenKind::Comment {
                body: &input[body_start..body_end],
            },
            body_end + COMMENT_END.len(),
        ));
    }

    if bytes[lt..].starts_with(CDATA_START) {
        let body_start = lt + CDATA_START.len();
        if !ScanLimits::reachable(limits.last_cdata_end, body_start) {
            return None;
        }
        let body_len = memmem::find(&bytes[body_start..], CDATA_END)?;
        return Some((TokenKind::Cdata, body_start + body_len + CDATA_END.len()));
    }

    if !ScanLimits::reachable(limits.last_gt, lt + 1) {
        return None;
    }

    if bytes.get(lt + 1) == Some(&b'?') {
        let gt = scan_tag_end(bytes, lt + 2)?;
        return Some((TokenKind::ProcessingInstruction, gt + 1));
    }

    if starts_with_ignore_ascii_case_at(bytes, lt, DOCTYPE_START) {
        let gt = scan_tag_end(bytes, lt + DOCTYPE_START.len())?;
        return Some((TokenKind::Doctype, gt + 1));
    }

    let mut p = lt + 1;
    let closing = bytes.get(p) == Some(&b'/');
    if closing {
        p += 1;
    }
    let name_start = p;
    match bytes.get(p) {
        None => return None,
        Some(&b) if b.is_ascii_whitespace() || matches!(b, b'/' | b'>' | b'<' | b'!' | b'?' | b'"' | b'\'') => {
            return None;
        }
        Some(_) => {}
    }
    while p < bytes.len() && !bytes[p].is_ascii_whitespace() && !matches!(bytes[p], b'/' | b'>' | b'"' | b'\'') {
        p += 1;
    }
    let name = &input[name_start..p];
    let gt = scan_tag_end(bytes, p)?;
    let end = gt + 1;

    if !is_valid_element_name(name) {
        return Some((TokenKind::InvalidTag, end));
    }
    if closing {
        return Some((TokenKind::EndTag { name }, end));
    }

    let region = &input[p..gt];
    let (attributes, self_closing) = match region.strip_suffix('/') {
        Some(attributes) => (attributes, true),
        None => (region, false),
    };
    Some((
        TokenKind::StartTag {
            name,
            attributes,
            self_closing,
        },
        end,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "perf-tests")]
    use std::time::{Duration, Instant};

    fn kinds<'a>(stream: &TokenStream<'a>) -> Vec<TokenKind<'a>> {
        stream.iter().map(|t| t.kind.clone()).collect()
    }

    #[test]
    fn tokenize_is_lossless() {
        let inputs = [
            "",
            "plain text",
            "  <div  id=\"abc\" >x</div>\n",
            "<!DOCTYPE html><html><!-- c --><body class='a'>t<br/></body></html>",
            "a < b > c",
            "<div title=\"a>b\">x",
            "<p>unterminated <!-- comment",
            "<a href='x",
            "<<<>>>",
            "<?xml version=\"1.0\"?><root/>",
            "<![CDATA[<x>]]>tail",
            "<1bad>ok</1bad>",
        ];
        for input in inputs {
            assert_eq!(tokenize(input).to_source(), input, "{input:?}");
        }
    }

    #[test]
    fn tokenize_splits_tags_and_trailing_text() {
        let stream = tokenize("  <div class=\"a\">hello</div> tail");
        assert_eq!(stream.leading(), "  ");
        assert_eq!(
            kinds(&stream),
            [
                TokenKind::StartTag {
                    name: "div",
                    attributes: " class=\"a\"",
                    self_closing: false
                },
                TokenKind::EndTag { name: "div" },
            ]
        );
        assert_eq!(stream.tokens()[0].trailing, "hello");
        assert_eq!(stream.tokens()[1].trailing, " tail");
    }

    #[test]
    fn tokenize_handles_self_closing_slash() {
        let stream = tokenize("<br /><img src=a/>");
        assert_eq!(
            kinds(&stream),
            [
                TokenKind::StartTag {
                    name: "br",
                    attributes: " ",
                    self_closing: true
                },
                TokenKind::StartTag {
                    name: "img",
                    attributes: " src=a",
                    self_closing: true
                },
            ]
        );
    }

    #[test]
    fn tokenize_keeps_gt_inside_quotes() {
        let stream = tokenize("<a title='1 > 0' data-x=\"<b>\">k</a>");
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.tokens()[0].raw, "<a title='1 > 0' data-x=\"<b>\">");
        assert_eq!(stream.tokens()[0].trailing, "k");
    }

    #[test]
    fn tokenize_handles_uppercase_doctype() {
        let stream = tokenize("<!DOCTYPE html>\n<!DoCtYpE html>");
        assert_eq!(kinds(&stream), [TokenKind::Doctype, TokenKind::Doctype]);
        assert_eq!(stream.tokens()[0].raw, "<!DOCTYPE html>");
        assert_eq!(stream.tokens()[0].trailing, "\n");
    }

    #[test]
    fn tokenize_reads_comments_non_greedily_across_lines() {
        let stream = tokenize("<!-- a\n<p> --><!-- b -->");
        assert_eq!(
            kinds(&stream),
            [
                TokenKind::Comment { body: " a\n<p> " },
                TokenKind::Comment { body: " b " },
            ]
        );
    }

    #[test]
    fn tokenize_reads_conditional_comments() {
        let stream = tokenize("<!--[if gt IE 8]><!--><html><!--<![endif]-->\n</html>");
        assert_eq!(
            kinds(&stream),
            [
                TokenKind::Comment {
                    body: "[if gt IE 8]><!"
                },
                TokenKind::StartTag {
                    name: "html",
                    attributes: "",
                    self_closing: false
                },
                TokenKind::Comment { body: "<![endif]" },
                TokenKind::EndTag { name: "html" },
            ]
        );
    }

    #[test]
    fn unterminated_constructs_stay_text() {
        let stream = tokenize("x <!-- never closed <b>bold</b>");
        assert_eq!(stream.leading(), "x <!-- never closed ");
        assert_eq!(stream.len(), 2);

        let stream = tokenize("<a href=\"x>y");
        assert!(stream.is_empty());
        assert_eq!(stream.leading(), "<a href=\"x>y");
    }

    #[test]
    fn invalid_names_become_inert_tokens() {
        let stream = tokenize("<1abc>x</%y>");
        assert_eq!(kinds(&stream), [TokenKind::InvalidTag, TokenKind::InvalidTag]);
        assert_eq!(stream.tokens()[0].raw, "<1abc>");
    }

    #[test]
    fn tokenize_recognizes_processing_instructions_and_cdata() {
        let stream = tokenize("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<![CDATA[a<b]]>");
        assert_eq!(kinds(&stream), [TokenKind::ProcessingInstruction, TokenKind::Cdata]);
        assert_eq!(stream.tokens()[0].trailing, "\n");
        assert_eq!(stream.tokens()[1].raw, "<![CDATA[a<b]]>");
    }

    #[test]
    fn tokenize_preserves_utf8_text() {
        let stream = tokenize("¡Hola <b>café</b> 😊");
        assert_eq!(stream.leading(), "¡Hola ");
        assert_eq!(stream.tokens()[0].trailing, "café");
        assert_eq!(stream.tokens()[1].trailing, " 😊");
    }

    #[test]
    fn tokenize_allows_custom_element_and_namespaced_tags() {
        let stream = tokenize("<my-widget></my-widget><svg:rect/>");
        assert_eq!(
            kinds(&stream),
            [
                TokenKind::StartTag {
                    name: "my-widget",
                    attributes: "",
                    self_closing: false
                },
                TokenKind::EndTag { name: "my-widget" },
                TokenKind::StartTag {
                    name: "svg:rect",
                    attributes: "",
                    self_closing: true
                },
            ]
        );
    }

    #[test]
    fn rawtext_close_tag_matching() {
        let body = b"x</scripX></ScRiPt \t>";
        assert_eq!(find_rawtext_close_tag(body, 0, b"script"), Some((10, body.len())));
        assert_eq!(find_rawtext_close_tag(b"</scriptx>", 0, b"script"), None);
        assert_eq!(find_rawtext_close_tag(b"</script", 0, b"script"), None);
    }

    #[test]
    fn scan_tag_end_skips_quoted_runs() {
        assert_eq!(scan_tag_end(b" a='>' b=\">\">", 0), Some(12));
        assert_eq!(scan_tag_end(b" a='>", 0), None);
        assert_eq!(scan_tag_end(b"", 0), None);
    }

    #[test]
    fn tokenize_handles_many_simple_tags_linearly() {
        let input = "<a></a>".repeat(20_000);
        assert_eq!(tokenize(&input).len(), 40_000);
    }

    #[test]
    fn tokenize_handles_tons_of_angle_brackets() {
        let input = "<".repeat(200_000);
        let stream = tokenize(&input);
        assert!(stream.is_empty());
        assert_eq!(stream.leading().len(), input.len());
    }

    #[test]
    fn tokenize_handles_many_unterminated_comments() {
        let input = "<!-- x ".repeat(50_000);
        let stream = tokenize(&input);
        assert!(stream.is_empty());
    }

    #[cfg(feature = "perf-tests")]
    #[test]
    fn tokenize_scales_roughly_linearly_on_repeated_tags() {
        fn measure_total(input: &str) -> Duration {
            let _ = tokenize(input);
            let mut total = Duration::ZERO;
            for _ in 0..5 {
                let start = Instant::now();
                let _ = tokenize(input);
                total += start.elapsed();
            }
            total
        }

        let small = "<a href='x'>t</a>".repeat(5_000);
        let large = "<a href='x'>t</a>".repeat(20_000);

        let t_small = measure_total(&small);
        let t_large = measure_total(&large);
        assert!(!t_small.is_zero(), "timer resolution too coarse for test");
        // Allow generous slack to avoid flakiness while still catching quadratic regressions.
        assert!(
            t_large <= t_small.saturating_mul(12),
            "expected near-linear scaling; t_small={t_small:?} t_large={t_large:?}"
        );
    }
}
