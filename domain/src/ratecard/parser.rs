//! Line parser.
//!
//! [`ParseSession`] matches single lines against the grammar and keeps the
//! notes seen while doing so. A session is an explicit value owned by the
//! caller; there is no process-wide notes list.

use super::grammar::{Attempt, Grammar, Recognized};
use serde::{Deserialize, Serialize};

/// Outcome of parsing one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "canonical", rename_all = "snake_case")]
pub enum LineOutcome {
    /// Canonical `"<phrase>: $<price>"` text
    Rate(String),
    /// Line was a note; its text went to the session notes
    Note,
    /// No alternative accepted the whole line
    Rejected,
}

impl LineOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, LineOutcome::Rejected)
    }

    /// Canonical rate text, if this line produced one
    pub fn canonical(&self) -> Option<&str> {
        match self {
            LineOutcome::Rate(text) => Some(text),
            _ => None,
        }
    }
}

/// Parse context for a single submission.
#[derive(Debug, Clone)]
pub struct ParseSession<'g> {
    grammar: Option<&'g Grammar>,
    notes: Vec<String>,
}

impl ParseSession<'static> {
    /// Session over the standard grammar.
    ///
    /// If the standard grammar failed to compile every line is rejected.
    pub fn new() -> Self {
        Self {
            grammar: Grammar::standard().ok(),
            notes: Vec::new(),
        }
    }
}

impl Default for ParseSession<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'g> ParseSession<'g> {
    pub fn with_grammar(grammar: &'g Grammar) -> Self {
        Self {
            grammar: Some(grammar),
            notes: Vec::new(),
        }
    }

    /// Match one line against every alternative in priority order.
    ///
    /// Never fails: anything the grammar cannot fully consume is `Rejected`.
    pub fn parse_line(&mut self, line: &str) -> LineOutcome {
        let Some(grammar) = self.grammar else {
            return LineOutcome::Rejected;
        };

        match grammar.recognize(line.trim()) {
            Attempt::Recognized(Recognized::Rate { canonical, .. }) => LineOutcome::Rate(canonical),
            Attempt::Recognized(Recognized::Note { text, .. }) => {
                self.notes.push(text);
                LineOutcome::Note
            }
            Attempt::Unmatched | Attempt::Malformed => LineOutcome::Rejected,
        }
    }

    /// Notes accumulated since the last reset
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Clear accumulated notes
    pub fn reset(&mut self) {
        self.notes.clear();
    }

    pub(crate) fn take_notes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notes)
    }
}

/// Parse a single line in a throwaway session.
///
/// ```
/// use ratecard_domain::ratecard::{LineOutcome, parse_or_reject};
///
/// assert_eq!(
///     parse_or_reject("0 - 1 Hour :: $11"),
///     LineOutcome::Rate("0-1 Hour: $11.00".to_string())
/// );
/// assert_eq!(parse_or_reject("zzz not a rate"), LineOutcome::Rejected);
/// ```
pub fn parse_or_reject(line: &str) -> LineOutcome {
    ParseSession::new().parse_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_canonical() {
        let mut session = ParseSession::new();
        assert_eq!(
            session.parse_line("  0 - 1 Hour :: $11  "),
            LineOutcome::Rate("0-1 Hour: $11.00".to_string())
        );
        assert!(session.notes().is_empty());
    }

    #[test]
    fn test_parse_line_is_deterministic() {
        let mut session = ParseSession::new();
        let first = session.parse_line("Evenings (After 9PM) :: $21");
        let second = session.parse_line("Evenings (After 9PM) :: $21");
        assert_eq!(first, second);
        assert_eq!(first.canonical(), Some("Evening (In After 9PM): $21.00"));
    }

    #[test]
    fn test_long_price_is_not_rejected() {
        assert_eq!(
            parse_or_reject("1 hour $99999999999999999999999"),
            LineOutcome::Rate("1 Hour: $99999999999999999999999.00".to_string())
        );
    }

    #[test]
    fn test_rejected_line() {
        let outcome = parse_or_reject("zzz not a rate");
        assert!(outcome.is_rejected());
        assert_eq!(outcome.canonical(), None);
    }

    #[test]
    fn test_notes_collected_in_session() {
        let mut session = ParseSession::new();
        assert_eq!(session.parse_line("No overnight parking"), LineOutcome::Note);
        assert_eq!(session.parse_line("Lost tickets pay $40"), LineOutcome::Note);
        assert_eq!(
            session.notes(),
            ["No overnight parking", "Lost tickets pay $40"]
        );

        session.reset();
        assert!(session.notes().is_empty());
    }

    #[test]
    fn test_sessions_do_not_share_notes() {
        let mut a = ParseSession::new();
        let mut b = ParseSession::new();
        a.parse_line("free on sundays");
        assert_eq!(a.notes().len(), 1);
        assert!(b.notes().is_empty());
        b.parse_line("1 hr $2");
        assert!(b.notes().is_empty());
    }

    #[test]
    fn test_custom_grammar_session() {
        let grammar = Grammar::compile().unwrap();
        let mut session = ParseSession::with_grammar(&grammar);
        assert_eq!(
            session.parse_line("Weekends $5"),
            LineOutcome::Rate("Sat-Sun: $5.00".to_string())
        );
    }

    #[test]
    fn test_line_outcome_serialization() {
        let json = serde_json::to_string(&LineOutcome::Rate("Evening: $5.00".into())).unwrap();
        assert_eq!(json, r#"{"status":"rate","canonical":"Evening: $5.00"}"#);
        let json = serde_json::to_string(&LineOutcome::Rejected).unwrap();
        assert_eq!(json, r#"{"status":"rejected"}"#);
    }
}
