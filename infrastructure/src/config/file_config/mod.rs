//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod consensus;
mod feedback;
mod logging;
mod marketplace;
mod output;
mod storage;

pub use consensus::FileConsensusConfig;
pub use feedback::FileFeedbackConfig;
pub use logging::FileLoggingConfig;
pub use marketplace::FileMarketplaceConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use storage::FileStorageConfig;

use ratecard_application::ProcessingConfig;
use ratecard_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration that cannot be used
#[derive(Error, Debug)]
pub enum ConfigValidationError {
    #[error("invalid configuration: {}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Quorum sizes and vote rules
    pub consensus: FileConsensusConfig,
    /// Decision store location
    pub storage: FileStorageConfig,
    /// Marketplace export location
    pub marketplace: FileMarketplaceConfig,
    /// Audit trail settings
    pub logging: FileLoggingConfig,
    /// Worker feedback message overrides
    pub feedback: FileFeedbackConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.consensus.to_thresholds().1);
        issues.extend(self.feedback.to_catalog().1);
        issues
    }

    /// Build the processing configuration.
    ///
    /// Fails if any issue is an error; warnings are left to the caller
    /// (see [`FileConfig::validate`]).
    pub fn to_processing_config(&self) -> Result<ProcessingConfig, ConfigValidationError> {
        let (thresholds, mut issues) = self.consensus.to_thresholds();
        let (feedback, feedback_issues) = self.feedback.to_catalog();
        issues.extend(feedback_issues);

        if ConfigIssue::has_errors(&issues) {
            issues.retain(|i| i.severity == ratecard_domain::Severity::Error);
            return Err(ConfigValidationError::Invalid(issues));
        }

        Ok(ProcessingConfig::new(thresholds, feedback))
    }
}
