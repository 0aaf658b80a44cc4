use crate::document::Document;
use crate::node::{NodeId, NodeKind};

const INDENT_STEP: &str = "  ";
const PREVIEW_CHARS: usize = 40;

/// One line per node, indented by depth, at most `cap` lines.
///
/// Elements show their `id`/`class`, and an `(unclosed)` marker when the
/// source never closed them. Whitespace-only text nodes are skipped.
pub fn outline(doc: &Document, cap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut left = cap;
    let mut stack: Vec<(NodeId, usize)> = vec![(doc.root(), 0)];

    while let Some((id, level)) = stack.pop() {
        if left == 0 {
            break;
        }
        let Some(node) = doc.get(id) else {
            continue;
        };
        let mut line = String::with_capacity(level * INDENT_STEP.len() + 64);
        for _ in 0..level {
            line.push_str(INDENT_STEP);
        }
        match node.kind() {
            NodeKind::Document => line.push_str("#document"),
            NodeKind::Doctype(raw) => line.push_str(raw),
            NodeKind::Element(element) => {
                line.push('<');
                line.push_str(element.name());
                for name in ["id", "class"] {
                    if let Some(value) = element.attributes().get(name).and_then(|a| a.value()) {
                        line.push(' ');
                        line.push_str(name);
                        line.push_str("=\"");
                        line.push_str(value);
                        line.push('"');
                    }
                }
                line.push('>');
                if element.is_unterminated() {
                    line.push_str(" (unclosed)");
                }
            }
            NodeKind::Text(text) => {
                let Some(trimmed) = trimmed_nonempty_slice(text) else {
                    continue;
                };
                line.push('"');
                push_preview_replace_newlines(&mut line, trimmed, PREVIEW_CHARS);
                line.push('"');
            }
            NodeKind::Comment(body) => {
                line.push_str("<!-- ");
                push_preview_replace_newlines(&mut line, body.trim(), PREVIEW_CHARS);
                line.push_str(" -->");
            }
        }
        out.push(line);
        left -= 1;
        stack.extend(node.children().iter().rev().map(|child| (child, level + 1)));
    }
    out
}

fn trimmed_nonempty_slice(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn push_preview_replace_newlines(out: &mut String, s: &str, max_chars: usize) {
    let mut truncated = false;
    for (i, ch) in s.chars().enumerate() {
        if i == max_chars {
            truncated = true;
            break;
        }
        out.push(if ch == '\n' { ' ' } else { ch });
    }
    if truncated {
        out.push('…');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn outline_indents_by_depth() {
        let doc = parse("<!DOCTYPE html>\n<div id=a class='b c'><p>Hi\nthere</p><!-- note --></div><span>");
        assert_eq!(
            outline(&doc, 100),
            [
                "#document",
                "  <!DOCTYPE html>",
                "  <div id=\"a\" class=\"b c\">",
                "    <p>",
                "      \"Hi there\"",
                "    <!-- note -->",
                "  <span> (unclosed)",
            ]
        );
    }

    #[test]
    fn outline_respects_cap() {
        let doc = parse("<ul><li>1</li><li>2</li></ul>");
        assert_eq!(outline(&doc, 3).len(), 3);
    }

    #[test]
    fn long_text_is_truncated() {
        let doc = parse(&format!("<p>{}</p>", "x".repeat(100)));
        let lines = outline(&doc, 10);
        assert_eq!(lines[2].chars().count(), 4 + 1 + PREVIEW_CHARS + 1 + 1);
        assert!(lines[2].ends_with("…\""));
    }
}
