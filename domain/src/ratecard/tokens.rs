//! Token library for rate-card phrases.
//!
//! Each lexical concept has a regex fragment (used by the grammar to build
//! full-line matchers) and a normalizer that maps every accepted spelling to
//! one canonical form. Fragments are written lowercase; the grammar compiles
//! them case-insensitively.
//!
//! | Concept | Accepted | Canonical |
//! |---------|----------|-----------|
//! | hour unit | `hr`, `hour`, `Hr` | `Hour` |
//! | hours unit | `hrs`, `hours` | `Hours` |
//! | minute unit | `min`, `minute`, `mins` | `Min` |
//! | weekday | `monday`, `Tue`, `thurs`, ... | `Mon`, `Tues`, `Wed`, `Thurs`, `Fri`, `Sat`, `Sun` |
//! | time of day | `5 pm`, `7:30a.m.`, `noon`, `midnight` | `5PM`, `7:30AM`, `12PM`, `12AM` |
//! | price | `2`, `2.5`, `11.00` | `2.00`, `2.50`, `11.00` |

/// A bare count, e.g. `2`
pub const NUMBER: &str = r"\d+";

/// A numeric range with optional spacing, e.g. `0 - 1`
pub const NUMBER_RANGE: &str = r"\d+\s*-\s*\d+";

/// Ordinal shorthand for the first hour
pub const FIRST_N: &str = r"1st|first";

/// `hr`, `hrs`, `hour`, `hours`
pub const HOUR_UNIT: &str = r"h(?:ou)?rs?";

/// `min`, `mins`, `minute`, `minutes`
pub const MINUTE_UNIT: &str = r"min(?:ute)?s?";

/// `1/2 hour`, `1/2 hr`
pub const HALF_HOUR: &str = r"1/2\s*h(?:ou)?r";

/// Clock times plus the `noon` / `midnight` words
pub const TIME_OF_DAY: &str = r"\d{1,2}(?::\d{2})?\s*[ap]\.?m\.?|noon|midnight";

/// Long and short weekday names
pub const WEEKDAY: &str = r"mon(?:day)?|tue(?:s|sday)?|wed(?:s|nesday)?|thu(?:r|rs|rsday)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?";

/// Words joining two weekdays into a range
pub const DAY_CONNECTOR: &str = r"-|&|through|thru|to";

/// Price digits (the `$` is matched by the grammar)
pub const PRICE: &str = r"\d+(?:\.\d{1,2})?";

/// Punctuation allowed between a phrase and its price, e.g. `::`, `=`, `-`
pub const SEPARATOR: &str = r"[:=\-\s]*";

/// `after 5PM`, `(In Before 7am)`; the brackets are optional.
pub fn after_before_pattern() -> String {
    format!(r"\(?\s*(?:in\s+)?(?:after|before)\s+(?:{TIME_OF_DAY})\s*\)?")
}

/// `(7AM-Noon)`, `(5pm to midnight)`, `(6PM)`
pub fn time_window_pattern() -> String {
    format!(
        r"\(\s*(?:{TIME_OF_DAY})(?:\s*(?:-|to)\s*(?:{TIME_OF_DAY}))?\s*\)"
    )
}

/// Either parenthetical qualifier form.
pub fn parenthetical_pattern() -> String {
    format!(
        "(?:{})|(?:{})",
        after_before_pattern(),
        time_window_pattern()
    )
}

/// Normalize a price to exactly two decimal digits.
///
/// ```
/// use ratecard_domain::ratecard::tokens::normalize_price;
///
/// assert_eq!(normalize_price("2").as_deref(), Some("2.00"));
/// assert_eq!(normalize_price("2.5").as_deref(), Some("2.50"));
/// assert_eq!(normalize_price("11.00").as_deref(), Some("11.00"));
/// assert_eq!(normalize_price("1.234"), None);
/// ```
pub fn normalize_price(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole = match whole.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    Some(format!("{whole}.{fraction:0<2}"))
}

/// Normalize an hourly count: `1st` / `first` become `0-1`, ranges lose
/// their inner spacing.
pub fn normalize_count(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    if lower == "1st" || lower == "first" {
        return "0-1".to_string();
    }
    lower.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `hr` / `hour` → `Hour`, `hrs` / `hours` → `Hours`
pub fn normalize_hour_unit(raw: &str) -> &'static str {
    if raw.trim().to_ascii_lowercase().ends_with('s') {
        "Hours"
    } else {
        "Hour"
    }
}

/// Every minute spelling collapses to `Min`.
pub fn normalize_minute_unit(_raw: &str) -> &'static str {
    "Min"
}

/// Hour or minute unit, dispatched on the leading letter.
pub fn normalize_time_unit(raw: &str) -> &'static str {
    if raw.trim_start().to_ascii_lowercase().starts_with('h') {
        normalize_hour_unit(raw)
    } else {
        normalize_minute_unit(raw)
    }
}

/// Map a long or short weekday name to its canonical abbreviation.
pub fn normalize_weekday(raw: &str) -> Option<&'static str> {
    let lower = raw.trim().to_ascii_lowercase();
    let canonical = match lower.get(..3)? {
        "mon" => "Mon",
        "tue" => "Tues",
        "wed" => "Wed",
        "thu" => "Thurs",
        "fri" => "Fri",
        "sat" => "Sat",
        "sun" => "Sun",
        _ => return None,
    };
    Some(canonical)
}

/// Normalize a time of day: `5 pm` → `5PM`, `noon` → `12PM`.
pub fn normalize_time(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase();
    match lower.as_str() {
        "noon" => return Some("12PM".to_string()),
        "midnight" => return Some("12AM".to_string()),
        _ => {}
    }

    let compact: String = lower
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    let (clock, meridiem) = if let Some(clock) = compact.strip_suffix("am") {
        (clock, "AM")
    } else if let Some(clock) = compact.strip_suffix("pm") {
        (clock, "PM")
    } else {
        return None;
    };

    let (hour, minute) = clock.split_once(':').unwrap_or((clock, ""));
    let valid_hour = !hour.is_empty() && hour.len() <= 2 && hour.chars().all(|c| c.is_ascii_digit());
    let valid_minute = minute.is_empty()
        || (minute.len() == 2 && minute.chars().all(|c| c.is_ascii_digit()));
    if !valid_hour || !valid_minute {
        return None;
    }

    Some(format!("{clock}{meridiem}"))
}

/// Normalize a parenthetical qualifier.
///
/// After/before forms become `(In After 5PM)`; time windows become
/// `(7AM-12PM)`.
pub fn normalize_parenthetical(raw: &str) -> Option<String> {
    let body = raw
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_ascii_lowercase();

    let rest = match body.strip_prefix("in") {
        Some(r) if r.starts_with(char::is_whitespace) => r.trim_start(),
        _ => body.as_str(),
    };
    for (keyword, label) in [("after", "After"), ("before", "Before")] {
        if let Some(time) = rest.strip_prefix(keyword) {
            return Some(format!("(In {label} {})", normalize_time(time)?));
        }
    }

    let window = body
        .split_once('-')
        .or_else(|| body.split_once(" to "));
    match window {
        Some((start, end)) => Some(format!(
            "({}-{})",
            normalize_time(start)?,
            normalize_time(end)?
        )),
        None => Some(format!("({})", normalize_time(&body)?)),
    }
}
