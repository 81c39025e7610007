//! Feedback message overrides from TOML (`[feedback]` section)
//!
//! ```toml
//! [feedback]
//! parse_failed = "We could not read your transcription. Please follow the format guide."
//! did_not_select_any_options = "Please pick at least one option."
//! ```

use ratecard_domain::{ConfigIssue, ConfigIssueCode, FeedbackCatalog, FeedbackReason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message overrides keyed by feedback reason
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileFeedbackConfig {
    pub messages: BTreeMap<String, String>,
}

impl FileFeedbackConfig {
    /// Build the catalog; unknown keys are skipped with a warning.
    pub fn to_catalog(&self) -> (FeedbackCatalog, Vec<ConfigIssue>) {
        let mut catalog = FeedbackCatalog::new();
        let mut issues = Vec::new();

        for (key, message) in &self.messages {
            match key.parse::<FeedbackReason>() {
                Ok(reason) => catalog = catalog.with_override(reason, message.clone()),
                Err(_) => issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownFeedbackReason,
                    format!("feedback.{key}: unknown reason, ignored"),
                )),
            }
        }

        (catalog, issues)
    }
}
