//! Console output formatter for parse results and batch reports

use colored::Colorize;
use ratecard_application::{BatchReport, ShowQualityReport};
use ratecard_domain::{DecisionPayload, LineOutcome, ParseResult, PlanStatus, TaskKind};
use serde::Serialize;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a parsed transcription, one line per input line
    pub fn format_parse(result: &ParseResult) -> String {
        let mut output = String::new();

        let status = if result.is_empty() {
            "EMPTY".yellow().bold()
        } else if result.is_rejected() {
            "REJECTED".red().bold()
        } else {
            "ACCEPTED".green().bold()
        };
        output.push_str(&format!("{} {}\n\n", "Transcription:".cyan().bold(), status));

        for line in &result.lines {
            let rendered = match &line.outcome {
                LineOutcome::Rate(canonical) => {
                    format!("  {} {} -> {}", "v".green(), line.raw, canonical.bold())
                }
                LineOutcome::Note => format!("  {} {} {}", "*".cyan(), line.raw, "(note)".dimmed()),
                LineOutcome::Rejected => {
                    format!("  {} {} {}", "x".red(), line.raw, "(unparseable)".red())
                }
            };
            output.push_str(&rendered);
            output.push('\n');
        }

        if !result.notes.is_empty() {
            output.push_str(&format!("\n{}\n", "Notes:".cyan().bold()));
            for note in &result.notes {
                output.push_str(&format!("  * {}\n", note));
            }
        }

        output
    }

    /// Format a batch report with per-unit outcomes
    pub fn format_batch(report: &BatchReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!(
            "{} batch {}",
            Self::kind_name(report.kind),
            report.batch_id
        )));
        output.push('\n');

        output.push_str(&format!(
            "{} {}   {} {} ({} unchanged since last run)\n",
            "Judgments:".cyan().bold(),
            report.judgments,
            "Work units:".cyan().bold(),
            report.work_units,
            report.skipped
        ));

        output.push_str(&Self::section_header("Outcomes"));
        output.push_str(&format!("  {:<16}{}\n", "Consensus", report.consensus.to_string().green()));
        output.push_str(&format!(
            "  {:<16}{}\n",
            "No consensus",
            report.no_consensus.to_string().yellow()
        ));
        if report.kind == TaskKind::RateTranscription {
            output.push_str(&format!(
                "  {:<16}{}\n",
                "Too difficult",
                report.too_difficult.to_string().yellow()
            ));
        }
        output.push_str(&format!("  {:<16}{}\n", "Deferred", report.deferred));
        output.push_str(&format!("  {:<16}{}\n", "Manual review", report.manual_review));
        let effectiveness = report
            .effectiveness()
            .map(|e| format!("{:.1}%", e * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        output.push_str(&format!("  {:<16}{}\n", "Effectiveness", effectiveness.bold()));

        output.push_str(&Self::section_header("Assignments"));
        output.push_str(&format!("  {:<16}{}\n", "Accepted", report.accepted.to_string().green()));
        output.push_str(&format!("  {:<16}{}\n", "Rejected", report.rejected.to_string().red()));
        if report.already_settled > 0 {
            output.push_str(&format!(
                "  {:<16}{}\n",
                "Already settled",
                report.already_settled.to_string().dimmed()
            ));
        }

        if !report.plans.is_empty() {
            output.push_str(&Self::section_header("Work units"));
            for plan in &report.plans {
                let status = match &plan.status {
                    PlanStatus::Decided { decision } if decision.needs_review() => {
                        decision.outcome.to_string().yellow().bold()
                    }
                    PlanStatus::Decided { decision } => decision.outcome.to_string().green().bold(),
                    PlanStatus::Deferred { received, required } => {
                        format!("DEFERRED {received}/{required}").dimmed()
                    }
                };
                let reason = plan
                    .decision()
                    .and_then(|d| d.payload.review_reason())
                    .map(|r| format!(" ({r})"))
                    .unwrap_or_default();
                output.push_str(&format!("  {:<28} {}{}\n", plan.work_unit_id, status, reason));

                if let Some(DecisionPayload::PhotoChange { consensus, .. }) =
                    plan.decision().map(|d| &d.payload)
                {
                    let tallies: Vec<String> = consensus
                        .tallies
                        .iter()
                        .map(|t| format!("{} {}", t.question.field_name(), t.result.vote_summary()))
                        .collect();
                    output.push_str(&format!("    {}\n", tallies.join("  ").dimmed()));
                }
            }
        }

        if let Some(watermark) = report.watermark {
            output.push_str(&format!(
                "\n{} {}\n",
                "Watermark:".dimmed(),
                watermark.to_rfc3339()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format show-quality selections
    pub fn format_show_quality(report: &ShowQualityReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Show-quality photos"));
        output.push('\n');

        for selection in &report.selections {
            output.push_str(&format!(
                "  {} / {}: {}",
                selection.lot_id,
                selection.category,
                selection.chosen.green().bold()
            ));
            if !selection.unmarked.is_empty() {
                output.push_str(&format!(
                    " {}",
                    format!("(cleared {})", selection.unmarked.join(", ")).dimmed()
                ));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "\n{} marked, {} cleared\n",
            report.marked, report.unmarked
        ));
        output.push_str(&Self::footer());
        output
    }

    /// Turn off ANSI colors for every later call
    pub fn disable_color() {
        colored::control::set_override(false);
    }

    /// Format any report as JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn kind_name(kind: TaskKind) -> &'static str {
        match kind {
            TaskKind::RateTranscription => "Rate transcription",
            TaskKind::Categorization => "Categorization",
            TaskKind::PhotoChange => "Photo change",
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
