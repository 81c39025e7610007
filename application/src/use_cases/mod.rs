//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod mark_show_quality;
pub mod process_batch;
pub(crate) mod shared;

#[cfg(test)]
pub(crate) mod test_support;
