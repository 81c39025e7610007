//! Marketplace gateway port
//!
//! The crowd-task marketplace hands out judgments and receives the
//! accept/reject verdict for each one.

use async_trait::async_trait;
use ratecard_domain::Judgment;
use thiserror::Error;

/// Errors returned by marketplace adapters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceError {
    /// The assignment was already accepted or rejected
    #[error("Assignment already settled: {0}")]
    AlreadyTerminal(String),

    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    /// Retryable failure (throttling, timeouts, 5xx)
    #[error("Transient marketplace error: {0}")]
    Transient(String),

    #[error("Marketplace error: {0}")]
    Other(String),
}

impl MarketplaceError {
    pub fn is_already_terminal(&self) -> bool {
        matches!(self, MarketplaceError::AlreadyTerminal(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, MarketplaceError::Transient(_))
    }
}

/// Gateway to the crowd-task marketplace
#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    /// All submitted judgments of a batch
    async fn list_judgments(&self, batch_id: &str) -> Result<Vec<Judgment>, MarketplaceError>;

    /// Approve an assignment with feedback for the worker
    async fn accept(&self, assignment_id: &str, feedback: &str) -> Result<(), MarketplaceError>;

    /// Reject an assignment with feedback for the worker
    async fn reject(&self, assignment_id: &str, feedback: &str) -> Result<(), MarketplaceError>;
}
