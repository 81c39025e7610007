//! Configuration file loading for ratecard-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `RATECARD_*` environment variables
//! 3. Project root: `./ratecard.toml` or `./.ratecard.toml`
//! 4. Global: `$XDG_CONFIG_HOME/ratecard-quorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileConsensusConfig, FileFeedbackConfig,
    FileLoggingConfig, FileMarketplaceConfig, FileOutputConfig, FileOutputFormat,
    FileStorageConfig,
};
pub use loader::ConfigLoader;
