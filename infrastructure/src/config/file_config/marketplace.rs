//! Marketplace configuration from TOML (`[marketplace]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw marketplace configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMarketplaceConfig {
    /// Directory holding `<batch_id>.json` exports
    pub path: PathBuf,
}

impl Default for FileMarketplaceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("batches"),
        }
    }
}
