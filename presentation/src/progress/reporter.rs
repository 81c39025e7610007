//! Progress reporting for batch processing

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ratecard_application::{BatchReport, ProgressNotifier};
use ratecard_domain::{DecisionPlan, TaskKind};
use std::sync::Mutex;

/// Reports progress with an indicatif bar, one tick per work unit
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn plan_message(plan: &DecisionPlan) -> String {
        match plan.decision() {
            Some(decision) if decision.needs_review() => {
                format!("{} {}", "?".yellow(), plan.work_unit_id)
            }
            Some(_) => format!("{} {}", "v".green(), plan.work_unit_id),
            None => format!("{} {}", "-".dimmed(), plan.work_unit_id),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_batch_start(&self, kind: TaskKind, total_groups: usize) {
        let pb = ProgressBar::new(total_groups as u64);
        pb.set_style(Self::bar_style());
        pb.set_prefix(kind.to_string());
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_group_complete(&self, plan: &DecisionPlan) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(Self::plan_message(plan));
            pb.inc(1);
        }
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(format!(
                "{} ({} decided, {} deferred)",
                "done".green(),
                report.work_units - report.deferred,
                report.deferred
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_batch_start(&self, kind: TaskKind, total_groups: usize) {
        println!("{} {} ({} work units)", "->".cyan(), kind.to_string().bold(), total_groups);
    }

    fn on_group_complete(&self, plan: &DecisionPlan) {
        println!("  {}", ProgressReporter::plan_message(plan));
    }

    fn on_batch_complete(&self, _report: &BatchReport) {
        println!();
    }
}
