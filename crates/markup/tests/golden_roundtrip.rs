use markup::{parse, serialize};
use markup_test_support::{CaseStatus, RoundtripCase, diff_lines, html_lines, load_roundtrip_cases};
use std::env;
use std::path::{Path, PathBuf};

fn manifest_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("roundtrip.toml")
}

struct FixtureFilter {
    raw: Option<String>,
}

impl FixtureFilter {
    fn matches(&self, id: &str) -> bool {
        self.raw.as_deref().is_none_or(|needle| id.contains(needle))
    }
}

fn fixture_filter() -> FixtureFilter {
    FixtureFilter {
        raw: env::var("MARKUP_ROUNDTRIP_FIXTURE").ok(),
    }
}

fn enforce_expected(case: &RoundtripCase, actual: &str) {
    let expected = case.expected();
    match case.status {
        CaseStatus::Active => {
            if actual != expected {
                panic!(
                    "round-trip mismatch in fixture '{}'\n{}",
                    case.id,
                    diff_lines(&html_lines(expected), &html_lines(actual))
                );
            }
        }
        CaseStatus::Xfail => {
            let reason = case.reason.as_deref().unwrap_or_default();
            if actual == case.input {
                panic!(
                    "fixture '{}' round-trips but is marked xfail; reason: {reason}",
                    case.id
                );
            }
            if actual != expected {
                panic!(
                    "fixture '{}' ({reason}) lost different bytes than expected\n{}",
                    case.id,
                    diff_lines(&html_lines(expected), &html_lines(actual))
                );
            }
        }
    }
}

#[test]
fn golden_roundtrip_fixtures() {
    let cases = load_roundtrip_cases(&manifest_path());
    let filter = fixture_filter();
    let mut ran = 0usize;
    for case in &cases {
        if !filter.matches(&case.id) {
            continue;
        }
        ran += 1;
        let actual = serialize(&parse(&case.input));
        enforce_expected(case, &actual);
    }
    assert!(ran > 0, "no fixtures matched filter");
}

#[test]
fn golden_fixtures_are_idempotent() {
    for case in load_roundtrip_cases(&manifest_path()) {
        let once = serialize(&parse(&case.input));
        let twice = serialize(&parse(&once));
        assert_eq!(once, twice, "second pass changed fixture '{}'", case.id);
    }
}
