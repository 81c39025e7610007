//! Progress notification port
//!
//! Defines the interface for reporting progress while a batch is processed.

use crate::use_cases::process_batch::BatchReport;
use ratecard_domain::{DecisionPlan, TaskKind};

/// Callback for progress updates during batch processing
///
/// Implementations live in the presentation layer.
pub trait ProgressNotifier: Send + Sync {
    /// Called once the batch is fetched and grouped
    fn on_batch_start(&self, kind: TaskKind, total_groups: usize);

    /// Called after a group's plan has been persisted and settled
    fn on_group_complete(&self, plan: &DecisionPlan);

    /// Called when every group is done
    fn on_batch_complete(&self, _report: &BatchReport) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_batch_start(&self, _kind: TaskKind, _total_groups: usize) {}
    fn on_group_complete(&self, _plan: &DecisionPlan) {}
}
