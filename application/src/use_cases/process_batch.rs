//! Process Batch use case
//!
//! Fetches one marketplace batch, decides every work unit, persists the
//! decisions and settles every judgment. Rate transcription, categorization
//! and photo-change batches share this flow; only the decision differs.

use crate::config::ProcessingConfig;
use crate::ports::audit_log::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::decision_store::{DecisionStore, StoreError};
use crate::ports::marketplace::{MarketplaceError, MarketplaceGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::shared::{SettleCounts, apply_plan, group_by_key};
use chrono::{DateTime, Utc};
use ratecard_domain::{DecisionEngine, DecisionPlan, FeedbackCatalog, ReviewReason, TaskKind};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while processing a batch
#[derive(Error, Debug)]
pub enum ProcessBatchError {
    #[error("Marketplace error: {0}")]
    Marketplace(#[from] MarketplaceError),

    #[error("Decision store error: {0}")]
    Store(#[from] StoreError),
}

/// Input for the ProcessBatch use case
#[derive(Debug, Clone)]
pub struct ProcessBatchInput {
    pub batch_id: String,
    pub kind: TaskKind,
}

impl ProcessBatchInput {
    pub fn new(batch_id: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            batch_id: batch_id.into(),
            kind,
        }
    }
}

/// Summary of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub kind: TaskKind,
    /// Judgments returned by the marketplace
    pub judgments: usize,
    /// Work units decided or deferred in this run
    pub work_units: usize,
    /// Work units with nothing newer than the watermark
    pub skipped: usize,
    /// Decided without a disagreement (includes photo changes flagged for update)
    pub consensus: usize,
    pub no_consensus: usize,
    pub too_difficult: usize,
    pub deferred: usize,
    /// Decisions that need a human, for any reason
    pub manual_review: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub already_settled: usize,
    /// Watermark after the run
    pub watermark: Option<DateTime<Utc>>,
    pub plans: Vec<DecisionPlan>,
}

impl BatchReport {
    pub fn new(batch_id: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            batch_id: batch_id.into(),
            kind,
            judgments: 0,
            work_units: 0,
            skipped: 0,
            consensus: 0,
            no_consensus: 0,
            too_difficult: 0,
            deferred: 0,
            manual_review: 0,
            accepted: 0,
            rejected: 0,
            already_settled: 0,
            watermark: None,
            plans: Vec::new(),
        }
    }

    /// consensus / (consensus + no consensus), or `None` if neither happened
    pub fn effectiveness(&self) -> Option<f64> {
        let decided = self.consensus + self.no_consensus;
        (decided > 0).then(|| self.consensus as f64 / decided as f64)
    }

    fn record(&mut self, plan: DecisionPlan, counts: SettleCounts) {
        self.work_units += 1;
        match plan.decision() {
            None => self.deferred += 1,
            Some(decision) => {
                match decision.payload.review_reason() {
                    Some(ReviewReason::NoConsensus) => self.no_consensus += 1,
                    Some(ReviewReason::TooDifficult) => self.too_difficult += 1,
                    _ => self.consensus += 1,
                }
                if decision.needs_review() {
                    self.manual_review += 1;
                }
            }
        }
        self.accepted += counts.accepted;
        self.rejected += counts.rejected;
        self.already_settled += counts.already_settled;
        self.plans.push(plan);
    }
}

/// Use case for deciding and settling one marketplace batch
pub struct ProcessBatchUseCase<M: MarketplaceGateway + 'static, S: DecisionStore + 'static> {
    marketplace: Arc<M>,
    store: Arc<S>,
    engine: DecisionEngine,
    feedback: FeedbackCatalog,
    audit: Arc<dyn AuditLogger>,
}

impl<M: MarketplaceGateway + 'static, S: DecisionStore + 'static> ProcessBatchUseCase<M, S> {
    pub fn new(marketplace: Arc<M>, store: Arc<S>, config: ProcessingConfig) -> Self {
        Self {
            marketplace,
            store,
            engine: DecisionEngine::new(config.thresholds),
            feedback: config.feedback,
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: ProcessBatchInput) -> Result<BatchReport, ProcessBatchError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ProcessBatchInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<BatchReport, ProcessBatchError> {
        let ProcessBatchInput { batch_id, kind } = input;
        info!("Processing {} batch {}", kind, batch_id);

        let mut report = BatchReport::new(&batch_id, kind);
        let watermark = self.store.watermark(kind, &batch_id).await?;
        report.watermark = watermark;

        let judgments = self.marketplace.list_judgments(&batch_id).await?;
        report.judgments = judgments.len();

        let mut groups = group_by_key(judgments, kind);
        if let Some(mark) = watermark {
            let before = groups.len();
            groups.retain(|g| g.judgments.iter().any(|j| j.submitted_at > mark));
            report.skipped = before - groups.len();
            debug!("Watermark {} skipped {} work units", mark, report.skipped);
        }

        progress.on_batch_start(kind, groups.len());

        let mut newest = watermark;
        for group in groups {
            let plan = self.engine.decide(kind, &group.key, &group.judgments);
            debug!(
                "{}: {} judgment(s), {} settlement(s)",
                plan.work_unit_id,
                group.judgments.len(),
                plan.settlements.len()
            );

            let counts = apply_plan(
                self.marketplace.as_ref(),
                self.store.as_ref(),
                &self.feedback,
                self.audit.as_ref(),
                &plan,
            )
            .await?;

            if let Some(latest) = group.judgments.iter().map(|j| j.submitted_at).max() {
                newest = newest.max(Some(latest));
            }

            progress.on_group_complete(&plan);
            report.record(plan, counts);
        }

        if newest > watermark
            && let Some(mark) = newest
        {
            self.store.set_watermark(kind, &batch_id, mark).await?;
            report.watermark = Some(mark);
        }

        self.audit.log(AuditEvent::new(
            "batch_complete",
            json!({
                "batch_id": report.batch_id,
                "kind": kind,
                "work_units": report.work_units,
                "consensus": report.consensus,
                "no_consensus": report.no_consensus,
                "deferred": report.deferred,
                "watermark": report.watermark,
            }),
        ));

        info!(
            "Batch {}: {} consensus, {} no consensus, {} deferred",
            report.batch_id, report.consensus, report.no_consensus, report.deferred
        );
        progress.on_batch_complete(&report);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        MockMarketplace, MockStore, RecordingAuditLogger, at, judgment, rate,
    };
    use ratecard_domain::{Answer, DecisionPayload, FeedbackReason, JudgmentAnswer, PhotoChangeAnswers};

    fn use_case(
        marketplace: MockMarketplace,
        store: MockStore,
    ) -> (
        ProcessBatchUseCase<MockMarketplace, MockStore>,
        Arc<MockMarketplace>,
        Arc<MockStore>,
    ) {
        let marketplace = Arc::new(marketplace);
        let store = Arc::new(store);
        let use_case =
            ProcessBatchUseCase::new(marketplace.clone(), store.clone(), ProcessingConfig::default());
        (use_case, marketplace, store)
    }

    fn agreeing_rates() -> Vec<ratecard_domain::Judgment> {
        vec![
            rate("asset-1", 1, 1, "Evenings :: $11"),
            rate("asset-1", 2, 2, "evening $11.00"),
            rate("asset-1", 3, 3, "Flat Rate $5"),
        ]
    }

    fn input(kind: TaskKind) -> ProcessBatchInput {
        ProcessBatchInput::new("batch-1", kind)
    }

    // ==================== Rate transcription ====================

    #[tokio::test]
    async fn test_rates_batch_persists_then_settles() {
        let mut judgments = agreeing_rates();
        judgments.push(rate("asset-2", 1, 4, "Flat Rate $5"));
        judgments.push(rate("asset-2", 2, 5, "Flat Rate $5"));
        let (use_case, marketplace, store) =
            use_case(MockMarketplace::new(judgments), MockStore::default());

        let report = use_case.execute(input(TaskKind::RateTranscription)).await.unwrap();

        assert_eq!(report.judgments, 5);
        assert_eq!(report.work_units, 2);
        assert_eq!(report.consensus, 1);
        assert_eq!(report.deferred, 1);
        assert_eq!(report.accepted, 3);
        assert_eq!(report.effectiveness(), Some(1.0));

        let decisions = store.decisions.lock().unwrap().clone();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].work_unit_id, "asset-1");

        let settled = marketplace.settled();
        assert_eq!(settled.len(), 3);
        assert!(settled.iter().all(|(_, accepted, feedback)| {
            *accepted && feedback == FeedbackReason::TranscriptionApproved.default_message()
        }));
    }

    #[tokio::test]
    async fn test_watermark_advances_to_newest_judgment() {
        let mut judgments = agreeing_rates();
        judgments.push(rate("asset-2", 1, 9, "Flat Rate $5"));
        let (use_case, _, store) = use_case(MockMarketplace::new(judgments), MockStore::default());

        let report = use_case.execute(input(TaskKind::RateTranscription)).await.unwrap();

        assert_eq!(report.watermark, Some(at(9)));
        assert_eq!(
            store.watermark_of(TaskKind::RateTranscription, "batch-1"),
            Some(at(9))
        );
    }

    #[tokio::test]
    async fn test_units_at_or_before_watermark_are_skipped() {
        let store = MockStore::default().with_watermark(TaskKind::RateTranscription, "batch-1", at(3));
        let (use_case, marketplace, store) = use_case(MockMarketplace::new(agreeing_rates()), store);

        let report = use_case.execute(input(TaskKind::RateTranscription)).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.work_units, 0);
        assert!(store.decisions.lock().unwrap().is_empty());
        assert!(marketplace.settled().is_empty());
        assert_eq!(report.watermark, Some(at(3)));
    }

    #[tokio::test]
    async fn test_unit_with_newer_judgment_is_decided_from_all_judgments() {
        let store = MockStore::default().with_watermark(TaskKind::RateTranscription, "batch-1", at(2));
        let (use_case, marketplace, _) = use_case(MockMarketplace::new(agreeing_rates()), store);

        let report = use_case.execute(input(TaskKind::RateTranscription)).await.unwrap();

        assert_eq!(report.consensus, 1);
        assert_eq!(marketplace.settled().len(), 3);
    }

    #[tokio::test]
    async fn test_watermark_of_another_batch_does_not_skip() {
        let store = MockStore::default().with_watermark(TaskKind::RateTranscription, "batch-1", at(9));
        let (use_case, marketplace, store) = use_case(MockMarketplace::new(agreeing_rates()), store);

        let report = use_case
            .execute(ProcessBatchInput::new("batch-2", TaskKind::RateTranscription))
            .await
            .unwrap();

        assert_eq!(report.skipped, 0);
        assert_eq!(report.consensus, 1);
        assert_eq!(marketplace.settled().len(), 3);
        assert_eq!(
            store.watermark_of(TaskKind::RateTranscription, "batch-2"),
            Some(at(3))
        );
        assert_eq!(
            store.watermark_of(TaskKind::RateTranscription, "batch-1"),
            Some(at(9))
        );
    }

    #[tokio::test]
    async fn test_already_settled_assignment_is_not_an_error() {
        let marketplace = MockMarketplace::new(agreeing_rates()).with_terminal("asset-1-A1");
        let (use_case, marketplace, _) = use_case(marketplace, MockStore::default());

        let report = use_case.execute(input(TaskKind::RateTranscription)).await.unwrap();

        assert_eq!(report.already_settled, 1);
        assert_eq!(report.accepted, 2);
        assert_eq!(marketplace.settled().len(), 2);
    }

    #[tokio::test]
    async fn test_transient_failure_aborts_without_moving_watermark() {
        let marketplace = MockMarketplace::new(agreeing_rates())
            .failing(MarketplaceError::Transient("503".to_string()));
        let (use_case, _, store) = use_case(marketplace, MockStore::default());

        let result = use_case.execute(input(TaskKind::RateTranscription)).await;

        assert!(matches!(
            result,
            Err(ProcessBatchError::Marketplace(MarketplaceError::Transient(_)))
        ));
        // Decision was persisted before settling.
        assert_eq!(store.decisions.lock().unwrap().len(), 1);
        assert!(store.watermarks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rates_no_consensus_flags_manual_review() {
        let judgments = vec![
            rate("asset-1", 1, 1, "Flat Rate $5"),
            rate("asset-1", 2, 2, "Flat Rate $6"),
            rate("asset-1", 3, 3, "Flat Rate $7"),
        ];
        let (use_case, marketplace, store) =
            use_case(MockMarketplace::new(judgments), MockStore::default());

        let report = use_case.execute(input(TaskKind::RateTranscription)).await.unwrap();

        assert_eq!(report.no_consensus, 1);
        assert_eq!(report.manual_review, 1);
        assert_eq!(report.effectiveness(), Some(0.0));
        assert_eq!(
            store.reviews.lock().unwrap().as_slice(),
            [("asset-1".to_string(), ReviewReason::NoConsensus)]
        );
        assert!(marketplace.settled().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_override_is_sent() {
        let marketplace = Arc::new(MockMarketplace::new(agreeing_rates()));
        let config = ProcessingConfig::default().with_feedback(
            FeedbackCatalog::new().with_override(FeedbackReason::TranscriptionApproved, "Thanks!"),
        );
        let use_case =
            ProcessBatchUseCase::new(marketplace.clone(), Arc::new(MockStore::default()), config);

        use_case.execute(input(TaskKind::RateTranscription)).await.unwrap();

        assert!(marketplace.settled().iter().all(|(_, _, f)| f == "Thanks!"));
    }

    #[tokio::test]
    async fn test_audit_events_are_logged() {
        let audit = Arc::new(RecordingAuditLogger::default());
        let (use_case, _, _) = use_case(MockMarketplace::new(agreeing_rates()), MockStore::default());
        let use_case = use_case.with_audit_logger(audit.clone());

        use_case.execute(input(TaskKind::RateTranscription)).await.unwrap();

        let events = audit.events.lock().unwrap().clone();
        assert_eq!(
            events,
            ["decision", "settlement", "settlement", "settlement", "batch_complete"]
        );
    }

    // ==================== Categorization ====================

    fn category(n: usize, labels: &[&str]) -> ratecard_domain::Judgment {
        judgment(
            "asset-1",
            n,
            n as i64,
            JudgmentAnswer::Category {
                labels: labels.iter().map(|s| s.to_string()).collect(),
                does_not_match: false,
            },
        )
    }

    #[tokio::test]
    async fn test_categories_are_associated() {
        let judgments = vec![
            category(1, &["Garage"]),
            category(2, &["Garage"]),
            category(3, &["Surface Lot"]),
        ];
        let (use_case, _, store) = use_case(MockMarketplace::new(judgments), MockStore::default());

        let report = use_case.execute(input(TaskKind::Categorization)).await.unwrap();

        assert_eq!(report.consensus, 1);
        let categories = store.categories.lock().unwrap();
        let labels: Vec<_> = categories["asset-1"].iter().cloned().collect();
        assert_eq!(labels, ["Garage"]);
    }

    #[tokio::test]
    async fn test_other_task_kinds_are_ignored() {
        let (use_case, marketplace, _) =
            use_case(MockMarketplace::new(agreeing_rates()), MockStore::default());

        let report = use_case.execute(input(TaskKind::Categorization)).await.unwrap();

        assert_eq!(report.judgments, 3);
        assert_eq!(report.work_units, 0);
        assert!(marketplace.settled().is_empty());
    }

    // ==================== Photo change ====================

    fn photo(n: usize, same_sign: Answer) -> ratecard_domain::Judgment {
        judgment(
            "new",
            n,
            n as i64,
            JudgmentAnswer::PhotoChange {
                new_asset_id: "new".to_string(),
                old_asset_id: "old".to_string(),
                answers: PhotoChangeAnswers::new(same_sign, Answer::Blank, Answer::Blank, Answer::Blank),
            },
        )
    }

    #[tokio::test]
    async fn test_photo_change_needing_update_is_flagged() {
        let judgments = vec![photo(1, Answer::No), photo(2, Answer::No), photo(3, Answer::No)];
        let (use_case, marketplace, store) =
            use_case(MockMarketplace::new(judgments), MockStore::default());

        let report = use_case.execute(input(TaskKind::PhotoChange)).await.unwrap();

        assert_eq!(report.consensus, 1);
        assert_eq!(report.manual_review, 1);
        let decisions = store.decisions.lock().unwrap();
        assert_eq!(decisions[0].work_unit_id, "new/old");
        assert!(matches!(decisions[0].payload, DecisionPayload::PhotoChange { .. }));
        assert_eq!(
            store.reviews.lock().unwrap()[0].1,
            ReviewReason::NeedsManualUpdate
        );
        assert_eq!(marketplace.settled().len(), 3);
    }
}
