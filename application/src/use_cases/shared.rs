//! Shared helpers for the batch use cases.
//!
//! Grouping judgments into work units and executing a [`DecisionPlan`]:
//! persist first, then settle with the marketplace.

use crate::ports::audit_log::{AuditEvent, AuditLogger};
use crate::ports::decision_store::{DecisionStore, StoreError};
use crate::ports::marketplace::{MarketplaceError, MarketplaceGateway};
use crate::use_cases::process_batch::ProcessBatchError;
use ratecard_domain::{
    CorrelationKey, DecisionPayload, DecisionPlan, FeedbackCatalog, Judgment, Settlement, TaskKind,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Judgments of one work unit, in first-seen order
pub(crate) struct JudgmentGroup {
    pub key: CorrelationKey,
    pub judgments: Vec<Judgment>,
}

/// Group judgments of `kind` by correlation key.
///
/// Groups keep the order in which their key was first seen; judgments
/// keep their order within a group. Other task kinds are dropped.
pub(crate) fn group_by_key(judgments: Vec<Judgment>, kind: TaskKind) -> Vec<JudgmentGroup> {
    let mut index: HashMap<CorrelationKey, usize> = HashMap::new();
    let mut groups: Vec<JudgmentGroup> = Vec::new();

    for judgment in judgments {
        if judgment.task_kind() != kind {
            warn!(
                "Skipping {} judgment {} in a {} batch",
                judgment.task_kind(),
                judgment.assignment_id,
                kind
            );
            continue;
        }
        let key = judgment.correlation_key();
        match index.get(&key) {
            Some(&i) => groups[i].judgments.push(judgment),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(JudgmentGroup {
                    key,
                    judgments: vec![judgment],
                });
            }
        }
    }

    groups
}

/// Tally of marketplace calls made for one plan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SettleCounts {
    pub accepted: usize,
    pub rejected: usize,
    pub already_settled: usize,
}

/// Persist what the plan decided.
pub(crate) async fn persist_plan<S: DecisionStore + ?Sized>(
    store: &S,
    plan: &DecisionPlan,
) -> Result<(), StoreError> {
    let Some(decision) = plan.decision() else {
        return Ok(());
    };

    store.upsert_decision(decision).await?;

    if let Some(reason) = decision.payload.review_reason() {
        store.flag_manual_review(&decision.work_unit_id, reason).await?;
    }

    if let DecisionPayload::Categories { labels } = &decision.payload {
        let inserted = store
            .associate_categories(&decision.work_unit_id, labels)
            .await?;
        debug!(
            "Associated {} new categories with {}",
            inserted, decision.work_unit_id
        );
    }

    Ok(())
}

/// Send one settlement. An assignment that is already settled is not an
/// error; it returns `Ok(false)`.
pub(crate) async fn settle<M: MarketplaceGateway + ?Sized>(
    marketplace: &M,
    settlement: &Settlement,
    feedback: &FeedbackCatalog,
) -> Result<bool, MarketplaceError> {
    let message = feedback.message(settlement.reason());
    let result = match settlement {
        Settlement::Accept { assignment_id, .. } => marketplace.accept(assignment_id, message).await,
        Settlement::Reject { assignment_id, .. } => marketplace.reject(assignment_id, message).await,
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_already_terminal() => {
            debug!("{} already settled, skipping", settlement.assignment_id());
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Persist the plan, then send every settlement.
pub(crate) async fn apply_plan<M, S>(
    marketplace: &M,
    store: &S,
    feedback: &FeedbackCatalog,
    audit: &dyn AuditLogger,
    plan: &DecisionPlan,
) -> Result<SettleCounts, ProcessBatchError>
where
    M: MarketplaceGateway + ?Sized,
    S: DecisionStore + ?Sized,
{
    persist_plan(store, plan).await?;
    audit.log(AuditEvent::new("decision", json!(plan)));

    let mut counts = SettleCounts::default();
    for settlement in &plan.settlements {
        let sent = settle(marketplace, settlement, feedback).await?;
        if !sent {
            counts.already_settled += 1;
        } else if settlement.is_accept() {
            counts.accepted += 1;
        } else {
            counts.rejected += 1;
        }
        audit.log(AuditEvent::new(
            "settlement",
            json!({
                "work_unit_id": plan.work_unit_id,
                "settlement": settlement,
                "feedback": feedback.message(settlement.reason()),
                "sent": sent,
            }),
        ));
    }

    Ok(counts)
}
