//! Mark Show Quality use case
//!
//! Picks a representative photo per lot and category, marks it and clears
//! the flag on the other photos of that category.

use crate::ports::audit_log::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::decision_store::{DecisionStore, StoreError};
use ratecard_domain::{CategorizedAsset, ShowQualitySelection, select_show_quality};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Summary of one show-quality run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShowQualityReport {
    pub selections: Vec<ShowQualitySelection>,
    pub marked: usize,
    pub unmarked: usize,
}

pub struct MarkShowQualityUseCase<S: DecisionStore + 'static> {
    store: Arc<S>,
    audit: Arc<dyn AuditLogger>,
}

impl<S: DecisionStore + 'static> MarkShowQualityUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub async fn execute(&self, assets: &[CategorizedAsset]) -> Result<ShowQualityReport, StoreError> {
        let selections = select_show_quality(assets);
        info!(
            "Selecting show-quality photos for {} lot categories",
            selections.len()
        );

        let mut report = ShowQualityReport::default();
        for selection in &selections {
            self.store
                .set_show_quality(&selection.chosen, &selection.category, true)
                .await?;
            report.marked += 1;

            for asset_id in &selection.unmarked {
                self.store
                    .set_show_quality(asset_id, &selection.category, false)
                    .await?;
                report.unmarked += 1;
            }

            debug!(
                "{} / {}: {} (cleared {})",
                selection.lot_id,
                selection.category,
                selection.chosen,
                selection.unmarked.len()
            );
            self.audit.log(AuditEvent::new("show_quality", json!(selection)));
        }

        report.selections = selections;
        Ok(report)
    }
}
