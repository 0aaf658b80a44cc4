//! `verbatim`: checks that files survive a parse/serialize round trip.

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use markup::debug::outline;
use markup::{Parser, ParserConfig, serialize};
use mimalloc::MiMalloc;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const OUTLINE_CAP: usize = 200;

#[derive(ClapParser, Debug)]
#[command(name = "verbatim", version, about = "Round-trip HTML files through the markup parser")]
struct Args {
    /// HTML files to check.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print a node outline for each file.
    #[arg(short, long)]
    verbose: bool,

    /// Parse with entity normalization enabled (lossy for bare `&`, `<`, `>`).
    #[arg(long)]
    auto_escape: bool,
}

enum Outcome {
    Identical,
    Changed,
}

fn check_file(parser: &mut Parser, path: &Path, verbose: bool) -> Result<Outcome> {
    let html = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc = parser.parse(&html);
    let rendered = serialize(&doc);
    let stats = parser.stats();

    let outcome = if rendered == html {
        Outcome::Identical
    } else {
        Outcome::Changed
    };
    let status = match outcome {
        Outcome::Identical => "ok",
        Outcome::Changed => "CHANGED",
    };
    println!(
        "{status:<8} {} ({} bytes, {:.3} ms)",
        path.display(),
        html.len(),
        parser.elapsed_time() * 1000.0
    );
    println!(
        "         tokens={} elements={} text={} comments={} vaulted={} unterminated={}",
        stats.tokens,
        stats.elements,
        stats.text_nodes,
        stats.comments,
        stats.vaulted_blocks,
        stats.unterminated_elements
    );
    if matches!(outcome, Outcome::Changed) {
        println!(
            "         dropped: end_tags={} processing_instructions={} attribute_fragments={}",
            stats.dropped_end_tags,
            stats.dropped_processing_instructions,
            stats.dropped_attribute_fragments
        );
        if let Some(offset) = first_difference(&html, &rendered) {
            println!("         first difference at byte {offset}");
        }
    }
    if verbose {
        for line in outline(&doc, OUTLINE_CAP) {
            println!("    {line}");
        }
    }
    Ok(outcome)
}

fn first_difference(a: &str, b: &str) -> Option<usize> {
    a.bytes()
        .zip(b.bytes())
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut parser = Parser::with_config(ParserConfig {
        auto_escape_text_nodes: args.auto_escape,
    });
    let mut changed = 0usize;
    for path in &args.files {
        match check_file(&mut parser, path, args.verbose) {
            Ok(Outcome::Identical) => {}
            Ok(Outcome::Changed) => changed += 1,
            Err(err) => {
                eprintln!("verbatim: {err:#}");
                return ExitCode::from(2);
            }
        }
    }

    log::info!("{} of {} files round-tripped", args.files.len() - changed, args.files.len());
    if changed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_difference_reports_prefix_length() {
        assert_eq!(first_difference("abc", "abc"), None);
        assert_eq!(first_difference("abc", "abd"), Some(2));
        assert_eq!(first_difference("abc", "ab"), Some(2));
    }

    #[test]
    fn args_require_at_least_one_file() {
        assert!(Args::try_parse_from(["verbatim"]).is_err());
        let args = Args::try_parse_from(["verbatim", "-v", "a.html", "b.html"]).unwrap();
        assert!(args.verbose);
        assert_eq!(args.files.len(), 2);
    }
}
