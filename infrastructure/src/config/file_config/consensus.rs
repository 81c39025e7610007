//! Consensus configuration from TOML (`[consensus]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [consensus]
//! min_responses = 3
//! pair_quorum = 2
//! label_min_votes = 2
//! boolean_rule = "51%"        # or "majority", "unanimous", "atleast:2"
//! min_valid_photo_change = 3
//! no_rates_quorum = 2
//! too_difficult_failures = 2
//! ```

use ratecard_domain::{ConfigIssue, ConfigIssueCode, ConsensusThresholds, QuorumRule};
use serde::{Deserialize, Serialize};

/// Raw consensus thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    pub min_responses: usize,
    pub pair_quorum: usize,
    pub label_min_votes: usize,
    /// Rule string: "majority", "unanimous", "atleast:N", "N%"
    pub boolean_rule: String,
    pub min_valid_photo_change: usize,
    pub no_rates_quorum: usize,
    pub too_difficult_failures: usize,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        let defaults = ConsensusThresholds::default();
        Self {
            min_responses: defaults.min_responses,
            pair_quorum: defaults.pair_quorum,
            label_min_votes: defaults.label_min_votes,
            boolean_rule: defaults.boolean_rule.to_config_string(),
            min_valid_photo_change: defaults.min_valid_photo_change,
            no_rates_quorum: defaults.no_rates_quorum,
            too_difficult_failures: defaults.too_difficult_failures,
        }
    }
}

impl FileConsensusConfig {
    /// Parse `boolean_rule`, falling back to the default rule on error.
    pub fn parse_boolean_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        match self.boolean_rule.parse::<QuorumRule>() {
            Ok(rule) => (rule, Vec::new()),
            Err(e) => (
                ConsensusThresholds::default().boolean_rule,
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidBooleanRule,
                    format!("consensus.boolean_rule: {e}"),
                )],
            ),
        }
    }

    /// Convert to domain thresholds, collecting every issue found.
    pub fn to_thresholds(&self) -> (ConsensusThresholds, Vec<ConfigIssue>) {
        let (boolean_rule, mut issues) = self.parse_boolean_rule();

        let positive = [
            ("min_responses", self.min_responses),
            ("pair_quorum", self.pair_quorum),
            ("label_min_votes", self.label_min_votes),
            ("min_valid_photo_change", self.min_valid_photo_change),
            ("no_rates_quorum", self.no_rates_quorum),
            ("too_difficult_failures", self.too_difficult_failures),
        ];
        for (field, value) in positive {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroThreshold,
                    format!("consensus.{field} must be at least 1"),
                ));
            }
        }

        for (field, value) in [
            ("pair_quorum", self.pair_quorum),
            ("label_min_votes", self.label_min_votes),
        ] {
            if value > self.min_responses {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::QuorumExceedsResponses,
                    format!(
                        "consensus.{field} ({value}) exceeds consensus.min_responses ({})",
                        self.min_responses
                    ),
                ));
            }
        }

        let thresholds = ConsensusThresholds {
            min_responses: self.min_responses,
            pair_quorum: self.pair_quorum,
            label_min_votes: self.label_min_votes,
            boolean_rule,
            min_valid_photo_change: self.min_valid_photo_change,
            no_rates_quorum: self.no_rates_quorum,
            too_difficult_failures: self.too_difficult_failures,
        };
        (thresholds, issues)
    }
}
