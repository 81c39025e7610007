//! Decision engine
//!
//! Consensus outcomes become operational actions:
//!
//! - [`engine`]: per-task decision plans (persist + settle)
//! - [`photo_change`]: classification of agreed photo comparisons
//! - [`show_quality`]: representative photo per lot and category
//! - [`feedback`]: message catalog keyed by [`FeedbackReason`]

pub mod engine;
pub mod entities;
pub mod feedback;
pub mod photo_change;
pub mod show_quality;

pub use engine::DecisionEngine;
pub use entities::{
    Decision, DecisionPayload, DecisionPlan, Outcome, PhotoChangeClass, PlanStatus, ReviewReason,
    Settlement,
};
pub use feedback::{FeedbackCatalog, FeedbackReason};
pub use photo_change::classify;
pub use show_quality::{CategorizedAsset, ShowQualitySelection, select_show_quality};
