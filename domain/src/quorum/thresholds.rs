//! Consensus thresholds

use super::rule::QuorumRule;
use serde::{Deserialize, Serialize};

/// Every numeric threshold the consensus policies use.
///
/// Defaults are the production values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusThresholds {
    /// Judgments required before rate or category consensus is attempted
    pub min_responses: usize,
    /// Identical parsed sets needed for rate consensus
    pub pair_quorum: usize,
    /// Occurrences a label needs to join the category consensus
    pub label_min_votes: usize,
    /// Rule applied per photo-change question
    pub boolean_rule: QuorumRule,
    /// Valid photo-change judgments required before voting
    pub min_valid_photo_change: usize,
    /// "No rates present" flags that settle a rate unit without transcription
    pub no_rates_quorum: usize,
    /// Parse failures that mark a rate unit as too difficult
    pub too_difficult_failures: usize,
}

impl Default for ConsensusThresholds {
    fn default() -> Self {
        Self {
            min_responses: 3,
            pair_quorum: 2,
            label_min_votes: 2,
            boolean_rule: QuorumRule::Percentage(51),
            min_valid_photo_change: 3,
            no_rates_quorum: 2,
            too_difficult_failures: 2,
        }
    }
}
