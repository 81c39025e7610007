//! JSON-file decision store
//!
//! One document holds everything the pipeline persists. The document is
//! loaded once, mutated on a copy and written back atomically; the
//! in-memory state only changes after the write succeeded.

use super::atomic::{read_json, write_json_atomic};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ratecard_application::ports::decision_store::{DecisionStore, StoreError};
use ratecard_domain::{Decision, ReviewReason, TaskKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// On-disk layout of the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDocument {
    /// Decision per work unit
    pub decisions: BTreeMap<String, Decision>,
    /// Work units waiting for a human
    pub manual_reviews: BTreeMap<String, ReviewReason>,
    /// Labels per asset
    pub categories: BTreeMap<String, BTreeSet<String>>,
    /// Show-quality flag per asset and category
    pub show_quality: BTreeMap<String, BTreeMap<String, bool>>,
    /// Newest processed judgment per task kind, then per batch
    pub watermarks: BTreeMap<String, BTreeMap<String, DateTime<Utc>>>,
}

pub struct JsonDecisionStore {
    path: PathBuf,
    document: Mutex<StoreDocument>,
}

impl JsonDecisionStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = read_json::<StoreDocument>(&path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => {
                    StoreError::Corrupt(format!("{}: {}", path.display(), e))
                }
                _ => StoreError::Io(e),
            })?
            .unwrap_or_default();

        info!(
            "Opened decision store {} ({} decisions)",
            path.display(),
            document.decisions.len()
        );

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current document
    pub async fn snapshot(&self) -> StoreDocument {
        self.document.lock().await.clone()
    }

    /// Apply `change` to a copy of the document and persist it.
    ///
    /// `change` returns `false` when there is nothing to write.
    async fn update<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StoreDocument) -> bool,
    {
        let mut document = self.document.lock().await;
        let mut next = document.clone();
        if !change(&mut next) {
            return Ok(());
        }
        write_json_atomic(&self.path, &next).await?;
        *document = next;
        Ok(())
    }
}

#[async_trait]
impl DecisionStore for JsonDecisionStore {
    async fn upsert_decision(&self, decision: &Decision) -> Result<(), StoreError> {
        self.update(|doc| {
            let previous = doc
                .decisions
                .insert(decision.work_unit_id.clone(), decision.clone());
            previous.as_ref() != Some(decision)
        })
        .await
    }

    async fn flag_manual_review(
        &self,
        work_unit_id: &str,
        reason: ReviewReason,
    ) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.manual_reviews.insert(work_unit_id.to_string(), reason) != Some(reason)
        })
        .await
    }

    async fn associate_categories(
        &self,
        asset_id: &str,
        labels: &BTreeSet<String>,
    ) -> Result<usize, StoreError> {
        let mut inserted = 0;
        self.update(|doc| {
            let existing = doc.categories.entry(asset_id.to_string()).or_default();
            for label in labels {
                if existing.insert(label.clone()) {
                    inserted += 1;
                }
            }
            inserted > 0
        })
        .await?;

        debug!(
            "{}: {} new, {} duplicate label(s)",
            asset_id,
            inserted,
            labels.len() - inserted
        );
        Ok(inserted)
    }

    async fn set_show_quality(
        &self,
        asset_id: &str,
        category: &str,
        show_quality: bool,
    ) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.show_quality
                .entry(asset_id.to_string())
                .or_default()
                .insert(category.to_string(), show_quality)
                != Some(show_quality)
        })
        .await
    }

    async fn watermark(
        &self,
        kind: TaskKind,
        batch_id: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .document
            .lock()
            .await
            .watermarks
            .get(kind.as_str())
            .and_then(|batches| batches.get(batch_id))
            .copied())
    }

    async fn set_watermark(
        &self,
        kind: TaskKind,
        batch_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.watermarks
                .entry(kind.as_str().to_string())
                .or_default()
                .insert(batch_id.to_string(), at)
                != Some(at)
        })
        .await
    }
}
