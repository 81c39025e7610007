//! In-memory port implementations for use case tests

use crate::ports::audit_log::{AuditEvent, AuditLogger};
use crate::ports::decision_store::{DecisionStore, StoreError};
use crate::ports::marketplace::{MarketplaceError, MarketplaceGateway};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ratecard_domain::{Decision, Judgment, JudgmentAnswer, ReviewReason, TaskKind};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

pub(crate) fn at(minute: i64) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
        + Duration::minutes(minute)
}

pub(crate) fn judgment(unit: &str, n: usize, minute: i64, answer: JudgmentAnswer) -> Judgment {
    Judgment {
        work_unit_id: unit.to_string(),
        assignment_id: format!("{unit}-A{n}"),
        worker_id: format!("W{n}"),
        submitted_at: at(minute),
        answer,
    }
}

pub(crate) fn rate(unit: &str, n: usize, minute: i64, text: &str) -> Judgment {
    judgment(
        unit,
        n,
        minute,
        JudgmentAnswer::Rate {
            text: text.to_string(),
            no_rates_present: false,
        },
    )
}

// ==================== Marketplace ====================

/// Serves a fixed batch and records every settlement
pub(crate) struct MockMarketplace {
    judgments: Vec<Judgment>,
    terminal: HashSet<String>,
    failure: Option<MarketplaceError>,
    /// (assignment_id, accepted, feedback)
    pub settled: Mutex<Vec<(String, bool, String)>>,
}

impl MockMarketplace {
    pub fn new(judgments: Vec<Judgment>) -> Self {
        Self {
            judgments,
            terminal: HashSet::new(),
            failure: None,
            settled: Mutex::new(Vec::new()),
        }
    }

    /// Pretend an assignment was settled by an earlier run
    pub fn with_terminal(mut self, assignment_id: &str) -> Self {
        self.terminal.insert(assignment_id.to_string());
        self
    }

    /// Fail every accept/reject with `error`
    pub fn failing(mut self, error: MarketplaceError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn settled(&self) -> Vec<(String, bool, String)> {
        self.settled.lock().unwrap().clone()
    }

    fn record(&self, assignment_id: &str, accepted: bool, feedback: &str) -> Result<(), MarketplaceError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let mut settled = self.settled.lock().unwrap();
        if self.terminal.contains(assignment_id) || settled.iter().any(|(id, _, _)| id == assignment_id) {
            return Err(MarketplaceError::AlreadyTerminal(assignment_id.to_string()));
        }
        settled.push((assignment_id.to_string(), accepted, feedback.to_string()));
        Ok(())
    }
}

#[async_trait]
impl MarketplaceGateway for MockMarketplace {
    async fn list_judgments(&self, _batch_id: &str) -> Result<Vec<Judgment>, MarketplaceError> {
        Ok(self.judgments.clone())
    }

    async fn accept(&self, assignment_id: &str, feedback: &str) -> Result<(), MarketplaceError> {
        self.record(assignment_id, true, feedback)
    }

    async fn reject(&self, assignment_id: &str, feedback: &str) -> Result<(), MarketplaceError> {
        self.record(assignment_id, false, feedback)
    }
}

// ==================== Decision store ====================

#[derive(Default)]
pub(crate) struct MockStore {
    pub decisions: Mutex<Vec<Decision>>,
    pub reviews: Mutex<Vec<(String, ReviewReason)>>,
    pub categories: Mutex<HashMap<String, BTreeSet<String>>>,
    /// (asset_id, category, show_quality)
    pub show_quality: Mutex<Vec<(String, String, bool)>>,
    /// Keyed by (kind, batch_id)
    pub watermarks: Mutex<HashMap<(TaskKind, String), DateTime<Utc>>>,
}

impl MockStore {
    pub fn with_watermark(self, kind: TaskKind, batch_id: &str, at: DateTime<Utc>) -> Self {
        self.watermarks
            .lock()
            .unwrap()
            .insert((kind, batch_id.to_string()), at);
        self
    }

    pub fn watermark_of(&self, kind: TaskKind, batch_id: &str) -> Option<DateTime<Utc>> {
        self.watermarks
            .lock()
            .unwrap()
            .get(&(kind, batch_id.to_string()))
            .copied()
    }
}

#[async_trait]
impl DecisionStore for MockStore {
    async fn upsert_decision(&self, decision: &Decision) -> Result<(), StoreError> {
        let mut decisions = self.decisions.lock().unwrap();
        decisions.retain(|d| d.work_unit_id != decision.work_unit_id);
        decisions.push(decision.clone());
        Ok(())
    }

    async fn flag_manual_review(&self, work_unit_id: &str, reason: ReviewReason) -> Result<(), StoreError> {
        self.reviews
            .lock()
            .unwrap()
            .push((work_unit_id.to_string(), reason));
        Ok(())
    }

    async fn associate_categories(&self, asset_id: &str, labels: &BTreeSet<String>) -> Result<usize, StoreError> {
        let mut categories = self.categories.lock().unwrap();
        let existing = categories.entry(asset_id.to_string()).or_default();
        let before = existing.len();
        existing.extend(labels.iter().cloned());
        Ok(existing.len() - before)
    }

    async fn set_show_quality(&self, asset_id: &str, category: &str, show_quality: bool) -> Result<(), StoreError> {
        self.show_quality.lock().unwrap().push((
            asset_id.to_string(),
            category.to_string(),
            show_quality,
        ));
        Ok(())
    }

    async fn watermark(&self, kind: TaskKind, batch_id: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.watermark_of(kind, batch_id))
    }

    async fn set_watermark(&self, kind: TaskKind, batch_id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.watermarks
            .lock()
            .unwrap()
            .insert((kind, batch_id.to_string()), at);
        Ok(())
    }
}

// ==================== Audit log ====================

#[derive(Default)]
pub(crate) struct RecordingAuditLogger {
    pub events: Mutex<Vec<&'static str>>,
}

impl AuditLogger for RecordingAuditLogger {
    fn log(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}
