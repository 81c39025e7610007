//! Quorum rules for consensus determination
//!
//! This module defines the rules used to decide whether enough judgments
//! agree on an answer.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Rule for deciding whether a count of agreeing judgments is enough
///
/// - `Majority`: More than half must agree
/// - `Unanimous`: All must agree
/// - `AtLeast(n)`: At least n must agree, regardless of the total
/// - `Percentage(p)`: At least p% must agree
///
/// # Example
///
/// ```
/// use ratecard_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::Percentage(51);
/// assert!(rule.is_satisfied(2, 3));  // 66% >= 51%
/// assert!(!rule.is_satisfied(1, 2)); // 50% < 51%
///
/// let labels = QuorumRule::AtLeast(2);
/// assert!(labels.is_satisfied(2, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuorumRule {
    /// More than half must agree (n/2 + 1)
    #[default]
    Majority,

    /// Every participant must agree
    Unanimous,

    /// At least n must agree
    AtLeast(usize),

    /// At least this percentage must agree (0-100)
    Percentage(u8),
}

impl QuorumRule {
    /// Check if the rule is satisfied given agreeing count and total count
    pub fn is_satisfied(&self, agreeing: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }

        match self {
            QuorumRule::Majority => agreeing > total / 2,
            QuorumRule::Unanimous => agreeing == total,
            QuorumRule::AtLeast(n) => agreeing >= *n,
            // Integer form of agreeing / total >= p / 100
            QuorumRule::Percentage(p) => agreeing * 100 >= total * usize::from(*p),
        }
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (all must agree)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} in agreement", n),
            QuorumRule::Percentage(p) => format!("at least {}% in agreement", p),
        }
    }

    /// The rule in the string form accepted by `FromStr`
    pub fn to_config_string(&self) -> String {
        match self {
            QuorumRule::Majority => "majority".to_string(),
            QuorumRule::Unanimous => "unanimous".to_string(),
            QuorumRule::AtLeast(n) => format!("atleast:{}", n),
            QuorumRule::Percentage(p) => format!("{}%", p),
        }
    }

    /// Minimum agreeing count needed for this rule given a total count
    pub fn min_agreement_needed(&self, total: usize) -> usize {
        match self {
            QuorumRule::Majority => total / 2 + 1,
            QuorumRule::Unanimous => total,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => (total * usize::from(*p)).div_ceil(100),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidRule(s.to_string());

        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(invalid)?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| invalid())?;
                if p > 100 {
                    return Err(invalid());
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(invalid()),
        }
    }
}
