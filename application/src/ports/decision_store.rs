//! Decision store port
//!
//! The only persisted state of the pipeline: decisions, manual-review
//! flags, category associations, show-quality flags and per-batch
//! watermarks. Every write is an idempotent upsert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ratecard_domain::{Decision, ReviewReason, TaskKind};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors returned by decision store adapters
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Insert or replace the decision for its work unit
    async fn upsert_decision(&self, decision: &Decision) -> Result<(), StoreError>;

    /// Record that a work unit needs a human
    async fn flag_manual_review(
        &self,
        work_unit_id: &str,
        reason: ReviewReason,
    ) -> Result<(), StoreError>;

    /// Associate labels with an asset.
    ///
    /// All-or-nothing per asset; labels already associated are skipped.
    /// Returns the number of new associations.
    async fn associate_categories(
        &self,
        asset_id: &str,
        labels: &BTreeSet<String>,
    ) -> Result<usize, StoreError>;

    /// Set or clear the show-quality flag of an asset within a category
    async fn set_show_quality(
        &self,
        asset_id: &str,
        category: &str,
        show_quality: bool,
    ) -> Result<(), StoreError>;

    /// Newest judgment timestamp already processed for one batch of a task kind
    async fn watermark(
        &self,
        kind: TaskKind,
        batch_id: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    async fn set_watermark(
        &self,
        kind: TaskKind,
        batch_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
