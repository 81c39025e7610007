//! Marketplace adapters

mod file_marketplace;

pub use file_marketplace::{FileMarketplace, SettledAssignment, Verdict};
