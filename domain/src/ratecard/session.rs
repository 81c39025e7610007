//! Parse result aggregation for whole submissions.

use super::parser::{LineOutcome, ParseSession};
use serde::Serialize;
use std::collections::BTreeSet;

/// Line delimiter of the wire format for rate and note channels
pub const LINE_DELIMITER: &str = "\r\n";

/// One non-blank input line and what the parser made of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLine {
    pub raw: String,
    #[serde(flatten)]
    pub outcome: LineOutcome,
}

/// Parsed form of one multi-line submission.
///
/// Lines keep their input order. A submission with any rejected line is
/// rejected as a whole; see [`ParseResult::is_rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParseResult {
    /// Reference to the judgment this text came from (assignment id)
    pub source: String,
    pub lines: Vec<RateLine>,
    pub notes: Vec<String>,
}

impl ParseResult {
    /// True if any line failed to parse (all-or-nothing rule)
    pub fn is_rejected(&self) -> bool {
        self.lines.iter().any(|line| line.outcome.is_rejected())
    }

    /// True if the submission had no non-blank lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn rejected_lines(&self) -> impl Iterator<Item = &RateLine> {
        self.lines.iter().filter(|line| line.outcome.is_rejected())
    }

    /// Canonical rate lines in input order
    pub fn canonical_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| line.outcome.canonical())
    }

    /// Canonical rate lines as a set, for set-equality voting
    pub fn parsed_rates(&self) -> BTreeSet<String> {
        self.canonical_lines().map(str::to_string).collect()
    }

    pub fn rates_str(&self) -> String {
        self.canonical_lines()
            .collect::<Vec<_>>()
            .join(LINE_DELIMITER)
    }

    pub fn notes_str(&self) -> String {
        self.notes.join(LINE_DELIMITER)
    }
}

impl ParseSession<'_> {
    /// Parse a whole submission.
    ///
    /// Notes are cleared before the first line, so a session can be reused
    /// across submissions without leaking notes between them. Blank lines are
    /// dropped; every other line is parsed in order.
    pub fn parse_submission(&mut self, source: impl Into<String>, raw_text: &str) -> ParseResult {
        self.reset();

        let lines = raw_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| RateLine {
                raw: line.to_string(),
                outcome: self.parse_line(line),
            })
            .collect();

        ParseResult {
            source: source.into(),
            lines,
            notes: self.take_notes(),
        }
    }
}

/// Parse a submission in a fresh session.
pub fn parse_submission(source: impl Into<String>, raw_text: &str) -> ParseResult {
    ParseSession::new().parse_submission(source, raw_text)
}
