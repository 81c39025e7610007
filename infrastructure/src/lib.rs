//! Infrastructure layer for ratecard-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod marketplace;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileConsensusConfig, FileFeedbackConfig,
    FileLoggingConfig, FileMarketplaceConfig, FileOutputConfig, FileOutputFormat,
    FileStorageConfig,
};
pub use logging::JsonlAuditLogger;
pub use marketplace::{FileMarketplace, SettledAssignment, Verdict};
pub use storage::{JsonDecisionStore, StoreDocument};
