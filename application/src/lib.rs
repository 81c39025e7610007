//! Application layer for ratecard-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ProcessingConfig;
pub use ports::{
    audit_log::{AuditEvent, AuditLogger, NoAuditLogger},
    decision_store::{DecisionStore, StoreError},
    marketplace::{MarketplaceError, MarketplaceGateway},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::mark_show_quality::{MarkShowQualityUseCase, ShowQualityReport};
pub use use_cases::process_batch::{
    BatchReport, ProcessBatchError, ProcessBatchInput, ProcessBatchUseCase,
};
