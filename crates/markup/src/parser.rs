use crate::document::Document;
use crate::tokenizer::tokenize;
use crate::tree_builder::build;
use crate::vault::ScriptVault;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Normalize entities in text nodes (and in later attribute/text writes)
    /// so bare `&`, `<`, `>` and quotes come out escaped. Off by default,
    /// which keeps text byte-for-byte.
    pub auto_escape_text_nodes: bool,
}

/// Counters for one parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub tokens: usize,
    pub elements: usize,
    pub text_nodes: usize,
    pub comments: usize,
    pub vaulted_blocks: usize,
    pub unterminated_elements: usize,
    pub dropped_end_tags: usize,
    pub dropped_processing_instructions: usize,
    pub invalid_tags: usize,
    pub dropped_attribute_fragments: usize,
}

/// State owned by a single parse: the vault produced for this input and the
/// counters collected while building.
#[derive(Debug, Default)]
pub struct ParseContext {
    pub(crate) vault: ScriptVault,
    pub(crate) auto_escape: bool,
    pub(crate) stats: ParseStats,
}

impl ParseContext {
    pub fn new(vault: ScriptVault, auto_escape: bool) -> Self {
        let stats = ParseStats {
            vaulted_blocks: vault.len(),
            ..ParseStats::default()
        };
        Self {
            vault,
            auto_escape,
            stats,
        }
    }
}

/// Reusable parser. Each call to [`Parser::parse`] starts from scratch; only
/// the configuration and the measurements of the last call are kept.
#[derive(Clone, Debug, Default)]
pub struct Parser {
    config: ParserConfig,
    last_elapsed: Duration,
    last_stats: ParseStats,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse(&mut self, html: &str) -> Document {
        let start = Instant::now();
        let (hidden, vault) = ScriptVault::hide(html);
        let ctx = ParseContext::new(vault, self.config.auto_escape_text_nodes);
        let stream = tokenize(&hidden);
        let (doc, stats) = build(&stream, ctx);
        self.last_elapsed = start.elapsed();
        self.last_stats = stats;
        log::debug!(
            target: "markup.parser",
            "parsed {} bytes into {} tokens in {:?}",
            html.len(),
            stats.tokens,
            self.last_elapsed
        );
        doc
    }

    /// Wall-clock time of the most recent [`parse`](Self::parse).
    pub fn elapsed(&self) -> Duration {
        self.last_elapsed
    }

    /// Same as [`elapsed`](Self::elapsed), in seconds.
    pub fn elapsed_time(&self) -> f64 {
        self.last_elapsed.as_secs_f64()
    }

    pub fn stats(&self) -> ParseStats {
        self.last_stats
    }

    pub fn auto_escape_text_nodes(&self) -> bool {
        self.config.auto_escape_text_nodes
    }

    pub fn set_auto_escape_text_nodes(&mut self, enabled: bool) {
        self.config.auto_escape_text_nodes = enabled;
    }
}

/// Parses with the default configuration.
pub fn parse(html: &str) -> Document {
    Parser::new().parse(html)
}

pub fn serialize(doc: &Document) -> String {
    doc.to_html()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_records_stats_and_time() {
        let mut parser = Parser::new();
        let doc = parser.parse("<p>a</p><script>x<y</script></b>");
        assert_eq!(serialize(&doc), "<p>a</p><script>x<y</script>");
        let stats = parser.stats();
        assert_eq!(stats.elements, 2);
        assert_eq!(stats.vaulted_blocks, 1);
        assert_eq!(stats.dropped_end_tags, 1);
        assert_eq!(stats.tokens, 5);
        assert!(parser.elapsed_time() >= 0.0);
        assert_eq!(parser.elapsed().as_secs_f64(), parser.elapsed_time());
    }

    #[test]
    fn parse_resets_between_calls() {
        let mut parser = Parser::new();
        parser.parse("<script>one</script>");
        let doc = parser.parse("<b>two</b>");
        assert_eq!(parser.stats().vaulted_blocks, 0);
        assert!(doc.vault().is_empty());
        assert_eq!(doc.to_html(), "<b>two</b>");
    }

    #[test]
    fn auto_escape_flag_round_trips_through_parser_and_document() {
        let mut parser = Parser::new();
        assert!(!parser.auto_escape_text_nodes());
        parser.set_auto_escape_text_nodes(true);
        let doc = parser.parse("<p>1 < 2</p>");
        assert!(doc.auto_escape_text_nodes());
        assert_eq!(doc.to_html(), "<p>1 &lt; 2</p>");

        let doc = Parser::with_config(ParserConfig::default()).parse("<p>1 < 2</p>");
        assert_eq!(doc.to_html(), "<p>1 < 2</p>");
    }
}
