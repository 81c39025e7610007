//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid quorum rule: {0}")]
    InvalidRule(String),

    #[error("Invalid answer value: {0}")]
    InvalidAnswer(String),

    #[error("Invalid task kind: {0}")]
    InvalidTaskKind(String),

    #[error("Unknown feedback reason: {0}")]
    InvalidFeedbackReason(String),
}

impl DomainError {
    /// Check if this error came from a malformed worker answer
    pub fn is_invalid_answer(&self) -> bool {
        matches!(self, DomainError::InvalidAnswer(_))
    }
}
