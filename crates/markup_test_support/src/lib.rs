use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const ROUNDTRIP_FORMAT_V1: &str = "roundtrip-v1";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Active,
    Xfail,
}

/// One fixture: `input` is parsed and serialized; the result must equal
/// `expected`, or `input` itself when no expectation is given.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RoundtripCase {
    pub id: String,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub reason: Option<String>,
    pub input: String,
    #[serde(default)]
    pub expected: Option<String>,
}

impl RoundtripCase {
    pub fn expected(&self) -> &str {
        self.expected.as_deref().unwrap_or(&self.input)
    }
}

#[derive(Clone, Debug, Deserialize)]
struct RoundtripManifest {
    format: String,
    cases: Vec<RoundtripCase>,
}

/// Loads and validates a fixture manifest. Panics with the file path on any
/// read, parse or validation error.
pub fn load_roundtrip_cases(path: &Path) -> Vec<RoundtripCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read fixture manifest {path:?}: {err}"));
    let manifest: RoundtripManifest = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse fixture manifest {path:?}: {err}"));
    assert_eq!(
        manifest.format, ROUNDTRIP_FORMAT_V1,
        "unsupported fixture manifest format in {path:?}"
    );

    let mut seen = BTreeSet::new();
    for case in &manifest.cases {
        assert!(
            seen.insert(case.id.as_str()),
            "duplicate fixture id in {path:?}: {}",
            case.id
        );
        if case.status == CaseStatus::Xfail {
            assert!(
                case.reason.as_deref().is_some_and(|r| !r.trim().is_empty()),
                "xfail fixture '{}' in {path:?} needs a reason",
                case.id
            );
        }
    }
    manifest.cases
}

/// Splits text into lines for [`diff_lines`], keeping escapes visible.
pub fn html_lines(text: &str) -> Vec<String> {
    text.split('\n').map(escape_text).collect()
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;
    let max = expected.len().max(actual.len());
    let missing = "<missing>";
    let mut out = String::new();
    let mismatch = (0..max).find(|&i| expected.get(i) != actual.get(i));

    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for line_idx in start..end {
            let left = expected.get(line_idx).map(String::as_str).unwrap_or(missing);
            let right = actual.get(line_idx).map(String::as_str).unwrap_or(missing);
            let marker = if line_idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {left}", line_idx + 1);
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {right}", line_idx + 1);
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}
