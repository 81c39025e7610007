//! Domain layer for ratecard-quorum
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Rate cards
//!
//! Workers transcribe parking rate signs as free text. The [`ratecard`]
//! grammar normalizes each line to a canonical `"<Phrase>: $<price>"` form;
//! a single unparseable line rejects the whole transcription.
//!
//! ## Quorum
//!
//! Every photo is judged by several workers. The [`quorum`] policies decide
//! whether their judgments agree, and the [`decision`] engine turns the
//! result into accept / reject / manual-review actions.

pub mod config;
pub mod core;
pub mod decision;
pub mod judgment;
pub mod quorum;
pub mod ratecard;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::DomainError;
pub use decision::{
    CategorizedAsset, Decision, DecisionEngine, DecisionPayload, DecisionPlan, FeedbackCatalog,
    FeedbackReason, Outcome, PhotoChangeClass, PlanStatus, ReviewReason, Settlement,
    ShowQualitySelection, select_show_quality,
};
pub use judgment::{
    Answer, CorrelationKey, InvalidPattern, Judgment, JudgmentAnswer, PhotoChangeAnswers,
    PhotoChangeQuestion, TaskKind,
};
pub use quorum::{ConsensusResult, ConsensusThresholds, QuorumRule, Vote, VoteResult};
pub use ratecard::{LineOutcome, ParseResult, ParseSession, RateLine, parse_or_reject, parse_submission};
