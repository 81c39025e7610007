//! Persistence adapters
//!
//! [`JsonDecisionStore`] implements the
//! [`DecisionStore`](ratecard_application::DecisionStore) port on top of a
//! single JSON document.

mod atomic;
mod json_store;

pub(crate) use atomic::{read_json, write_json_atomic};
pub use json_store::{JsonDecisionStore, StoreDocument};
