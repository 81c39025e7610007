//! Vote types for boolean questions
//!
//! One [`Vote`] is one worker's yes/not-yes on one question; a
//! [`VoteResult`] is the tally of a question under a [`QuorumRule`].

use super::rule::QuorumRule;
use crate::judgment::Answer;
use serde::{Deserialize, Serialize};

/// A single worker's vote on one question
///
/// # Example
///
/// ```
/// use ratecard_domain::judgment::Answer;
/// use ratecard_domain::quorum::Vote;
///
/// assert!(Vote::from_answer("W1", Answer::Yes).approved);
/// // Blank answers count as not-yes
/// assert!(!Vote::from_answer("W2", Answer::Blank).approved);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    /// Worker identifier
    pub voter: String,
    /// Whether the worker answered yes
    pub approved: bool,
}

impl Vote {
    pub fn new(voter: impl Into<String>, approved: bool) -> Self {
        Self {
            voter: voter.into(),
            approved,
        }
    }

    pub fn yes(voter: impl Into<String>) -> Self {
        Self::new(voter, true)
    }

    pub fn no(voter: impl Into<String>) -> Self {
        Self::new(voter, false)
    }

    pub fn from_answer(voter: impl Into<String>, answer: Answer) -> Self {
        Self::new(voter, answer.is_yes())
    }
}

/// Aggregated tally of one question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteResult {
    /// Whether the rule was satisfied
    pub passed: bool,
    pub approve_count: usize,
    pub reject_count: usize,
    pub total_votes: usize,
    pub votes: Vec<Vote>,
}

impl VoteResult {
    /// Tally votes under the given rule
    pub fn from_votes_with_rule(votes: Vec<Vote>, rule: &QuorumRule) -> Self {
        let approve_count = votes.iter().filter(|v| v.approved).count();
        let total_votes = votes.len();

        Self {
            passed: rule.is_satisfied(approve_count, total_votes),
            approve_count,
            reject_count: total_votes - approve_count,
            total_votes,
            votes,
        }
    }

    pub fn is_unanimous(&self) -> bool {
        self.approve_count == self.total_votes || self.reject_count == self.total_votes
    }

    /// Get the approval ratio (0.0 to 1.0)
    pub fn approval_ratio(&self) -> f64 {
        if self.total_votes == 0 {
            0.0
        } else {
            self.approve_count as f64 / self.total_votes as f64
        }
    }

    /// Generate a visual vote summary (e.g., "[●●○]")
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(if vote.approved { '●' } else { '○' });
        }
        summary.push(']');
        summary
    }
}
