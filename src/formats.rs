//! Format trait for locating headings in manuscript files.
//!
//! This module defines the `Format` trait which abstracts over document formats by
//! providing the tree-sitter grammar and heading query specific to each one. The provided
//! [`Format::first_heading`] runs the query, so headings inside code blocks or other
//! literal content are never mistaken for the section title.

pub mod markdown;

use crate::error::BookError;
use crate::section::Level;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The title line of a manuscript file.
pub struct Heading {
    /// Number of heading markers, clamped to the outline's S1..S4 range.
    pub level: Level,
    /// Heading text without markers, including any numeric prefix.
    pub text: String,
    /// Marker count before clamping, to report headings deeper than S4.
    pub depth: usize,
}

/// Grammar and queries for one document format.
pub trait Format {
    /// Tree-sitter grammar of the format.
    fn language(&self) -> tree_sitter::Language;

    /// Query capturing every heading node.
    fn heading_query(&self) -> &str;

    /// Heading marker character, e.g. `#` for markdown.
    fn marker(&self) -> char;

    /// Finds the first heading of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::Grammar`] if the grammar cannot be loaded or the query does
    /// not compile.
    fn first_heading(&self, source: &str) -> Result<Option<Heading>, BookError> {
        let language = self.language();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| BookError::Grammar(e.to_string()))?;
        let Some(tree) = parser.parse(source, None) else {
            return Ok(None);
        };

        let query = Query::new(&language, self.heading_query())
            .map_err(|e| BookError::Grammar(e.to_string()))?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

        let mut first: Option<(usize, String)> = None;
        while let Some(found) = matches.next() {
            for capture in found.captures {
                let start = capture.node.start_byte();
                if first.as_ref().is_none_or(|(earliest, _)| start < *earliest) {
                    let text = capture
                        .node
                        .utf8_text(source.as_bytes())
                        .map_err(|e| BookError::Grammar(e.to_string()))?;
                    first = Some((start, text.to_string()));
                }
            }
        }

        Ok(first.map(|(_, text)| self.heading_from(&text)))
    }

    #[must_use]
    /// Splits a raw heading node into its level and text.
    fn heading_from(&self, raw: &str) -> Heading {
        let marker = self.marker();
        let trimmed = raw.trim();
        let depth = trimmed.chars().take_while(|c| *c == marker).count();
        let clamped = u8::try_from(depth.clamp(1, 4)).unwrap_or(4);
        let content = trimmed.trim_start_matches(marker).trim();
        // An optional closing sequence must be separated from the title by a space.
        let text = match content.trim_end_matches(marker) {
            stripped if stripped.ends_with(' ') => stripped.trim_end(),
            _ => content,
        }
        .to_string();
        Heading {
            level: Level::new(clamped).unwrap_or(Level::S4),
            text,
            depth,
        }
    }
}
