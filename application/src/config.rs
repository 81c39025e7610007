//! Application-level configuration.
//!
//! This module provides the configuration that controls how the batch use
//! cases behave: consensus thresholds and worker feedback messages.

use ratecard_domain::{ConsensusThresholds, FeedbackCatalog};

/// Processing configuration.
///
/// Built by the infrastructure config loader; defaults match the
/// production thresholds and the built-in feedback messages.
#[derive(Debug, Clone, Default)]
pub struct ProcessingConfig {
    /// Quorum sizes and vote rules for every task kind.
    pub thresholds: ConsensusThresholds,
    /// Messages sent with each accept/reject.
    pub feedback: FeedbackCatalog,
}

impl ProcessingConfig {
    pub fn new(thresholds: ConsensusThresholds, feedback: FeedbackCatalog) -> Self {
        Self {
            thresholds,
            feedback,
        }
    }

    pub fn with_thresholds(mut self, thresholds: ConsensusThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_feedback(mut self, feedback: FeedbackCatalog) -> Self {
        self.feedback = feedback;
        self
    }
}
