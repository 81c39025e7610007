//! Decision entities
//!
//! A [`DecisionPlan`] is the pure result of judging one work unit: what to
//! persist (if anything) and how to settle each judgment with the
//! marketplace. Executing the plan is left to the application layer.

use super::feedback::FeedbackReason;
use crate::quorum::PhotoChangeConsensus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Operational outcome of a work unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Accept,
    Reject,
    ManualReview,
    AutoApply,
    NeedsPricing,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Accept => "ACCEPT",
            Outcome::Reject => "REJECT",
            Outcome::ManualReview => "MANUAL_REVIEW",
            Outcome::AutoApply => "AUTO_APPLY",
            Outcome::NeedsPricing => "NEEDS_PRICING",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a work unit was sent to manual review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    /// Quorum met, judgments disagree
    NoConsensus,
    /// Too many workers produced unparseable transcriptions
    TooDifficult,
    /// Photo changed in a way that needs a human to re-transcribe
    NeedsManualUpdate,
}

impl std::fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewReason::NoConsensus => write!(f, "no consensus"),
            ReviewReason::TooDifficult => write!(f, "too difficult"),
            ReviewReason::NeedsManualUpdate => write!(f, "needs manual update"),
        }
    }
}

/// Classification of an agreed photo comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoChangeClass {
    NeedsManualUpdate,
    AutoApply,
    NeedsPricing,
}

impl PhotoChangeClass {
    pub fn outcome(&self) -> Outcome {
        match self {
            PhotoChangeClass::NeedsManualUpdate => Outcome::ManualReview,
            PhotoChangeClass::AutoApply => Outcome::AutoApply,
            PhotoChangeClass::NeedsPricing => Outcome::NeedsPricing,
        }
    }
}

/// What gets persisted for a decided work unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionPayload {
    /// Agreed canonical transcription (CRLF-delimited channels)
    TranscribedRates {
        rates: String,
        notes: String,
        source_assignment: String,
    },
    /// Workers agreed the photo has no rates
    NoRates,
    ManualReview { reason: ReviewReason },
    Categories { labels: BTreeSet<String> },
    /// Workers agreed the photo matches no category
    Uncategorizable,
    PhotoChange {
        new_asset_id: String,
        old_asset_id: String,
        class: PhotoChangeClass,
        consensus: PhotoChangeConsensus,
    },
}

impl DecisionPayload {
    /// Review reason if this payload requires a human
    pub fn review_reason(&self) -> Option<ReviewReason> {
        match self {
            DecisionPayload::ManualReview { reason } => Some(*reason),
            DecisionPayload::PhotoChange {
                class: PhotoChangeClass::NeedsManualUpdate,
                ..
            } => Some(ReviewReason::NeedsManualUpdate),
            _ => None,
        }
    }
}

/// The persisted decision for one work unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub work_unit_id: String,
    pub outcome: Outcome,
    pub payload: DecisionPayload,
}

impl Decision {
    pub fn new(work_unit_id: impl Into<String>, outcome: Outcome, payload: DecisionPayload) -> Self {
        Self {
            work_unit_id: work_unit_id.into(),
            outcome,
            payload,
        }
    }

    pub fn manual_review(work_unit_id: impl Into<String>, reason: ReviewReason) -> Self {
        Self::new(
            work_unit_id,
            Outcome::ManualReview,
            DecisionPayload::ManualReview { reason },
        )
    }

    pub fn needs_review(&self) -> bool {
        self.payload.review_reason().is_some()
    }
}

/// How one judgment should be settled with the marketplace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Settlement {
    Accept {
        assignment_id: String,
        reason: FeedbackReason,
    },
    Reject {
        assignment_id: String,
        reason: FeedbackReason,
    },
}

impl Settlement {
    pub fn accept(assignment_id: impl Into<String>, reason: FeedbackReason) -> Self {
        Settlement::Accept {
            assignment_id: assignment_id.into(),
            reason,
        }
    }

    pub fn reject(assignment_id: impl Into<String>, reason: FeedbackReason) -> Self {
        Settlement::Reject {
            assignment_id: assignment_id.into(),
            reason,
        }
    }

    pub fn assignment_id(&self) -> &str {
        match self {
            Settlement::Accept { assignment_id, .. } | Settlement::Reject { assignment_id, .. } => {
                assignment_id
            }
        }
    }

    pub fn reason(&self) -> FeedbackReason {
        match self {
            Settlement::Accept { reason, .. } | Settlement::Reject { reason, .. } => *reason,
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Settlement::Accept { .. })
    }
}

/// Whether a work unit was decided or must wait for more judgments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanStatus {
    Decided { decision: Decision },
    /// Quorum not met; nothing persisted
    Deferred { received: usize, required: usize },
}

/// Everything the engine concluded about one work unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPlan {
    pub work_unit_id: String,
    pub status: PlanStatus,
    /// Accept/reject calls to send to the marketplace
    pub settlements: Vec<Settlement>,
}

impl DecisionPlan {
    pub fn decided(decision: Decision, settlements: Vec<Settlement>) -> Self {
        Self {
            work_unit_id: decision.work_unit_id.clone(),
            status: PlanStatus::Decided { decision },
            settlements,
        }
    }

    pub fn deferred(
        work_unit_id: impl Into<String>,
        received: usize,
        required: usize,
        settlements: Vec<Settlement>,
    ) -> Self {
        Self {
            work_unit_id: work_unit_id.into(),
            status: PlanStatus::Deferred { received, required },
            settlements,
        }
    }

    pub fn decision(&self) -> Option<&Decision> {
        match &self.status {
            PlanStatus::Decided { decision } => Some(decision),
            PlanStatus::Deferred { .. } => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.status, PlanStatus::Deferred { .. })
    }

    pub fn accepted(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter().filter(|s| s.is_accept())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter().filter(|s| !s.is_accept())
    }
}
