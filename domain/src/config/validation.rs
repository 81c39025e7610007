//! Configuration issues
//!
//! Loaded configuration is checked for values that cannot work (errors) or
//! that probably do not do what was intended (warnings). Checks return
//! structured issues instead of failing on the first one.
//!
//! # Examples
//!
//! ```
//! use ratecard_domain::config::{ConfigIssue, ConfigIssueCode, Severity};
//!
//! let issues = vec![ConfigIssue::warning(
//!     ConfigIssueCode::QuorumExceedsResponses,
//!     "consensus.pair_quorum is larger than consensus.min_responses",
//! )];
//! assert!(!ConfigIssue::has_errors(&issues));
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `boolean_rule` does not parse as a quorum rule.
    InvalidBooleanRule,
    /// A threshold that must be positive is zero.
    ZeroThreshold,
    /// A vote quorum exceeds `min_responses`; minimum-size groups can never agree.
    QuorumExceedsResponses,
    /// A `[feedback]` key names no known reason.
    UnknownFeedbackReason,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// True if any issue is fatal
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
