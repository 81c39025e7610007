//! Consensus result type
//!
//! "Not enough responses" and "no consensus" are distinct states, and
//! neither carries a default value.

use serde::{Deserialize, Serialize};

/// Outcome of applying a consensus policy to one group of judgments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ConsensusResult<T> {
    /// Quorum met and the judgments agree on this value
    Reached(T),
    /// Quorum met but no agreement
    NoConsensus,
    /// Quorum not met yet
    NotEnoughResponses { received: usize, required: usize },
}

impl<T> ConsensusResult<T> {
    pub fn is_reached(&self) -> bool {
        matches!(self, ConsensusResult::Reached(_))
    }

    pub fn is_no_consensus(&self) -> bool {
        matches!(self, ConsensusResult::NoConsensus)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ConsensusResult::Reached(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            ConsensusResult::Reached(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConsensusResult<U> {
        match self {
            ConsensusResult::Reached(value) => ConsensusResult::Reached(f(value)),
            ConsensusResult::NoConsensus => ConsensusResult::NoConsensus,
            ConsensusResult::NotEnoughResponses { received, required } => {
                ConsensusResult::NotEnoughResponses { received, required }
            }
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            ConsensusResult::Reached(_) => "reached",
            ConsensusResult::NoConsensus => "no consensus",
            ConsensusResult::NotEnoughResponses { .. } => "not enough responses",
        }
    }
}
