//! Rate-card grammar and parsing
//!
//! Free-form transcriptions of parking rate signs are normalized into
//! canonical `"<Phrase>: $<price>"` lines.
//!
//! ```text
//! tokens ──▶ grammar ──▶ parser (one line) ──▶ session (whole submission)
//! ```
//!
//! - [`tokens`]: lexical fragments and their normalizers
//! - [`grammar`]: the prioritized table of phrase shapes
//! - [`parser`]: [`ParseSession`] and [`parse_or_reject`]
//! - [`session`]: [`ParseResult`] with the all-or-nothing rule

pub mod grammar;
pub mod parser;
pub mod session;
pub mod tokens;

pub use grammar::{Grammar, NoteShape, RateShape};
pub use parser::{LineOutcome, ParseSession, parse_or_reject};
pub use session::{LINE_DELIMITER, ParseResult, RateLine, parse_submission};
