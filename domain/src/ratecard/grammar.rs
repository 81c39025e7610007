//! Grammar composer for rate-card lines.
//!
//! The grammar is an explicit, prioritized table of alternatives. Each
//! alternative pairs a full-line matcher with a normalizer; the first
//! alternative whose matcher accepts the whole line decides the outcome.
//! There is no backtracking into later alternatives once one has matched,
//! so more specific shapes are listed ahead of generic ones.
//!
//! ```text
//! Monthly > Flat Rate > Early Bird > Hourly > Each > Evening
//!         > Daily Max > Weekend > Weekday Range > Flat Duration
//!         > (notes) No Overnight Parking > Lost Ticket > Free > Taxes
//! ```

use super::tokens::{
    self, DAY_CONNECTOR, FIRST_N, HALF_HOUR, HOUR_UNIT, MINUTE_UNIT, NUMBER, NUMBER_RANGE, PRICE,
    SEPARATOR, WEEKDAY,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STANDARD: LazyLock<Result<Grammar, regex::Error>> = LazyLock::new(Grammar::compile);

/// A priced rate phrase shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateShape {
    Monthly,
    FlatRate,
    EarlyBird,
    Hourly,
    EachIncrement,
    Evening,
    DailyMax,
    Weekend,
    WeekdayRange,
    FlatDuration,
}

impl RateShape {
    /// Rate shapes in match priority order
    pub const PRIORITY: [RateShape; 10] = [
        RateShape::Monthly,
        RateShape::FlatRate,
        RateShape::EarlyBird,
        RateShape::Hourly,
        RateShape::EachIncrement,
        RateShape::Evening,
        RateShape::DailyMax,
        RateShape::Weekend,
        RateShape::WeekdayRange,
        RateShape::FlatDuration,
    ];

    fn phrase_pattern(self) -> String {
        let paren = tokens::parenthetical_pattern();
        match self {
            RateShape::Monthly => r"monthly(?:\s+rate)?".to_string(),
            RateShape::FlatRate => format!(
                r".*?flat\s+rate(?:\s*(?P<window>{}))?",
                tokens::after_before_pattern()
            ),
            RateShape::EarlyBird => format!(r"early\s*bird(?:\s*(?P<window>{paren}))?"),
            RateShape::Hourly => format!(
                r"(?P<count>(?:{NUMBER_RANGE})|(?:{FIRST_N})|(?:{NUMBER}))\s*(?P<unit>{HOUR_UNIT})"
            ),
            RateShape::EachIncrement => format!(
                r"each(?P<addl>\s+add(?:itional|'l|l)?)?\s+(?:(?P<half>{HALF_HOUR})|(?P<count>{NUMBER})\s*(?P<unit>(?:{HOUR_UNIT})|(?:{MINUTE_UNIT})))(?:\s*,?\s*or\s+frac[a-z]*(?:\s+thereof)?)?"
            ),
            RateShape::Evening => format!(
                r"(?:evenings?|nights?|overnight)(?:\s*(?P<window>{paren}))?"
            ),
            RateShape::DailyMax => {
                r"(?:all\s*)?days?|(?:daily\s+)?max(?:imum)?(?:\s+daily)?(?:\s+pay[^$]*?)?"
                    .to_string()
            }
            RateShape::Weekend => {
                format!(r"weekends?(?:\s+rates?)?(?:\s*(?P<window>{paren}))?")
            }
            RateShape::WeekdayRange => format!(
                r"(?P<first>{WEEKDAY})(?:\s*(?:{DAY_CONNECTOR})\s*(?P<last>{WEEKDAY}))?(?:\s*(?P<window>{paren}))?"
            ),
            RateShape::FlatDuration => {
                format!(r"(?P<count>{NUMBER})\s*(?P<unit>{MINUTE_UNIT})")
            }
        }
    }

    /// Turn the matched phrase into its canonical tokens.
    fn normalize(self, caps: &Captures<'_>) -> Option<Vec<String>> {
        let group = |name: &str| caps.name(name).map(|m| m.as_str());
        let window = || -> Option<Option<String>> {
            match group("window") {
                Some(raw) => tokens::normalize_parenthetical(raw).map(Some),
                None => Some(None),
            }
        };

        let mut parts: Vec<String> = Vec::new();
        match self {
            RateShape::Monthly => parts.push("Monthly".to_string()),
            RateShape::FlatRate => {
                parts.push("Flat Rate".to_string());
                parts.extend(window()?);
            }
            RateShape::EarlyBird => {
                parts.push("Early Bird".to_string());
                parts.extend(window()?);
            }
            RateShape::Hourly => {
                parts.push(tokens::normalize_count(group("count")?));
                parts.push(tokens::normalize_hour_unit(group("unit")?).to_string());
            }
            RateShape::EachIncrement => {
                parts.push("Each".to_string());
                if group("addl").is_some() {
                    parts.push("Add'l".to_string());
                }
                if group("half").is_some() {
                    parts.push("30".to_string());
                    parts.push("Min".to_string());
                } else {
                    parts.push(group("count")?.to_string());
                    parts.push(tokens::normalize_time_unit(group("unit")?).to_string());
                }
            }
            RateShape::Evening => {
                parts.push("Evening".to_string());
                parts.extend(window()?);
            }
            RateShape::DailyMax => parts.push("Daily Max".to_string()),
            RateShape::Weekend => {
                parts.push("Sat-Sun".to_string());
                parts.extend(window()?);
            }
            RateShape::WeekdayRange => {
                let first = tokens::normalize_weekday(group("first")?)?;
                let days = match group("last") {
                    Some(last) => format!("{first}-{}", tokens::normalize_weekday(last)?),
                    None => first.to_string(),
                };
                parts.push(days);
                parts.extend(window()?);
            }
            RateShape::FlatDuration => {
                parts.push("Each Add'l".to_string());
                parts.push(group("count")?.to_string());
                parts.push(tokens::normalize_minute_unit(group("unit")?).to_string());
            }
        }
        Some(parts)
    }
}

/// A non-priced line that becomes a note instead of a rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteShape {
    NoOvernightParking,
    LostTicket,
    Free,
    Taxes,
}

impl NoteShape {
    /// Note shapes in match priority order (tried after every rate shape)
    pub const PRIORITY: [NoteShape; 4] = [
        NoteShape::NoOvernightParking,
        NoteShape::LostTicket,
        NoteShape::Free,
        NoteShape::Taxes,
    ];

    fn pattern(self) -> &'static str {
        match self {
            NoteShape::NoOvernightParking => r"(?i)^\s*no\s+overnight\s+parking\W*$",
            NoteShape::LostTicket => r"(?i)^\s*lost\s+tickets?\s+pays?\b.*$",
            NoteShape::Free => r"(?i)^.*free.*$",
            NoteShape::Taxes => r"(?i)^.*taxes.*$",
        }
    }
}

/// What an alternative produces when it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Rate(RateShape),
    Note(NoteShape),
}

/// A line recognized by the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognized {
    /// Canonical `"<phrase>: $<price>"` text
    Rate { shape: RateShape, canonical: String },
    /// Free-form note, kept verbatim (trimmed)
    Note { shape: NoteShape, text: String },
}

/// Result of trying a single alternative against a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// The matcher did not accept the line
    Unmatched,
    /// The line matched and normalized
    Recognized(Recognized),
    /// The matcher accepted the line but a token failed to normalize
    Malformed,
}

/// One `(matcher, normalizer)` entry of the grammar table
#[derive(Debug, Clone)]
pub struct Alternative {
    production: Production,
    matcher: Regex,
}

impl Alternative {
    fn rate(shape: RateShape) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"(?i)^\s*(?:{})\s*{SEPARATOR}\$\s*(?P<price>{PRICE})\s*$",
            shape.phrase_pattern()
        );
        Ok(Self {
            production: Production::Rate(shape),
            matcher: Regex::new(&pattern)?,
        })
    }

    fn note(shape: NoteShape) -> Result<Self, regex::Error> {
        Ok(Self {
            production: Production::Note(shape),
            matcher: Regex::new(shape.pattern())?,
        })
    }

    pub fn production(&self) -> Production {
        self.production
    }

    /// Try this alternative against the entire line.
    pub fn attempt(&self, line: &str) -> Attempt {
        let Some(caps) = self.matcher.captures(line) else {
            return Attempt::Unmatched;
        };

        let recognized = match self.production {
            Production::Rate(shape) => shape.normalize(&caps).and_then(|parts| {
                let price = tokens::normalize_price(caps.name("price")?.as_str())?;
                Some(Recognized::Rate {
                    shape,
                    canonical: assemble(&parts, &price),
                })
            }),
            Production::Note(shape) => Some(Recognized::Note {
                shape,
                text: line.trim().to_string(),
            }),
        };

        recognized.map_or(Attempt::Malformed, Attempt::Recognized)
    }
}

/// Join phrase tokens with single spaces, append a colon, then the price.
fn assemble(parts: &[String], price: &str) -> String {
    let phrase = parts.join(" ") + ":";
    format!("{phrase} ${price}")
}

/// The ordered grammar table
#[derive(Debug, Clone)]
pub struct Grammar {
    alternatives: Vec<Alternative>,
}

impl Grammar {
    /// Build the standard table: every rate shape, then every note shape.
    pub fn compile() -> Result<Self, regex::Error> {
        let mut alternatives = Vec::with_capacity(RateShape::PRIORITY.len() + NoteShape::PRIORITY.len());
        for shape in RateShape::PRIORITY {
            alternatives.push(Alternative::rate(shape)?);
        }
        for shape in NoteShape::PRIORITY {
            alternatives.push(Alternative::note(shape)?);
        }
        Ok(Self { alternatives })
    }

    /// Process-wide compiled grammar. Immutable, so sharing it is safe.
    pub fn standard() -> Result<&'static Grammar, &'static regex::Error> {
        STANDARD.as_ref()
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// First alternative that accepts the line decides; `Unmatched` if none do.
    pub fn recognize(&self, line: &str) -> Attempt {
        self.alternatives
            .iter()
            .map(|alt| alt.attempt(line))
            .find(|attempt| *attempt != Attempt::Unmatched)
            .unwrap_or(Attempt::Unmatched)
    }
}
