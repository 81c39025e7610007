//! Decision engine
//!
//! Turns one group of judgments into a [`DecisionPlan`]. Pure: no I/O, no
//! clock. The application layer persists the decision and then sends the
//! settlements.

use super::entities::{Decision, DecisionPayload, DecisionPlan, Outcome, ReviewReason, Settlement};
use super::feedback::FeedbackReason;
use super::photo_change::classify;
use crate::judgment::{CorrelationKey, Judgment, JudgmentAnswer, PhotoChangeAnswers, TaskKind};
use crate::quorum::{
    ConsensusResult, ConsensusThresholds, boolean_majority, majority_count, set_equality,
    uncategorizable_override,
};
use crate::ratecard::{ParseResult, ParseSession};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    thresholds: ConsensusThresholds,
}

impl DecisionEngine {
    pub fn new(thresholds: ConsensusThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ConsensusThresholds {
        &self.thresholds
    }

    /// Decide one correlation group. Judgments of other task kinds are ignored.
    pub fn decide(&self, kind: TaskKind, key: &CorrelationKey, judgments: &[Judgment]) -> DecisionPlan {
        let work_unit_id = key.to_string();
        match kind {
            TaskKind::RateTranscription => self.decide_rates(&work_unit_id, judgments),
            TaskKind::Categorization => self.decide_categories(&work_unit_id, judgments),
            TaskKind::PhotoChange => self.decide_photo_change(&work_unit_id, judgments),
        }
    }

    /// Rate transcription: parse every submission, then set-equality over
    /// the parsed rate sets.
    ///
    /// Failed parses are rejected and never vote. Enough of them mark the
    /// unit as too difficult; enough "no rates present" flags settle it
    /// without a transcription. Submissions holding only notes parse but
    /// carry no rate set, so they do not vote either.
    pub fn decide_rates(&self, work_unit_id: &str, judgments: &[Judgment]) -> DecisionPlan {
        let t = &self.thresholds;
        let mut session = ParseSession::new();
        let mut settlements = Vec::new();
        let mut total = 0;
        let mut failures = 0;
        let mut no_rates: Vec<&str> = Vec::new();
        let mut candidates: Vec<ParseResult> = Vec::new();

        for judgment in judgments {
            let JudgmentAnswer::Rate {
                text,
                no_rates_present,
            } = &judgment.answer
            else {
                continue;
            };
            total += 1;

            if *no_rates_present {
                no_rates.push(&judgment.assignment_id);
                continue;
            }

            let parsed = session.parse_submission(judgment.assignment_id.as_str(), text);
            if parsed.is_empty() {
                failures += 1;
                settlements.push(Settlement::reject(
                    &judgment.assignment_id,
                    FeedbackReason::BlankTranscription,
                ));
            } else if parsed.is_rejected() {
                failures += 1;
                settlements.push(Settlement::reject(
                    &judgment.assignment_id,
                    FeedbackReason::ParseFailed,
                ));
            } else {
                candidates.push(parsed);
            }
        }

        if failures >= t.too_difficult_failures {
            return DecisionPlan::decided(
                Decision::manual_review(work_unit_id, ReviewReason::TooDifficult),
                settlements,
            );
        }

        if total < t.min_responses {
            return DecisionPlan::deferred(work_unit_id, total, t.min_responses, settlements);
        }

        let accept_candidates = |settlements: &mut Vec<Settlement>| {
            settlements.extend(candidates.iter().map(|parsed| {
                Settlement::accept(&parsed.source, FeedbackReason::TranscriptionApproved)
            }));
        };

        if no_rates.len() >= t.no_rates_quorum {
            settlements.extend(
                no_rates
                    .iter()
                    .map(|id| Settlement::accept(*id, FeedbackReason::NoRatesApproved)),
            );
            accept_candidates(&mut settlements);
            return DecisionPlan::decided(
                Decision::new(work_unit_id, Outcome::Accept, DecisionPayload::NoRates),
                settlements,
            );
        }

        let voters: Vec<(&ParseResult, BTreeSet<String>)> = candidates
            .iter()
            .map(|parsed| (parsed, parsed.parsed_rates()))
            .filter(|(_, rates)| !rates.is_empty())
            .collect();
        let sets: Vec<BTreeSet<String>> = voters.iter().map(|(_, rates)| rates.clone()).collect();
        match set_equality(&sets, t.pair_quorum) {
            ConsensusResult::Reached(agreement) => {
                let winner = voters[agreement.first()].0;
                let payload = DecisionPayload::TranscribedRates {
                    rates: winner.rates_str(),
                    notes: winner.notes_str(),
                    source_assignment: winner.source.clone(),
                };
                accept_candidates(&mut settlements);
                DecisionPlan::decided(
                    Decision::new(work_unit_id, Outcome::Accept, payload),
                    settlements,
                )
            }
            // Enough responses arrived; too few usable rate sets is disagreement.
            ConsensusResult::NoConsensus | ConsensusResult::NotEnoughResponses { .. } => {
                DecisionPlan::decided(
                    Decision::manual_review(work_unit_id, ReviewReason::NoConsensus),
                    settlements,
                )
            }
        }
    }

    /// Categorization: majority count over label sets, with the
    /// uncategorizable override as fallback.
    pub fn decide_categories(&self, work_unit_id: &str, judgments: &[Judgment]) -> DecisionPlan {
        let t = &self.thresholds;
        let answers: Vec<(&str, &BTreeSet<String>, bool)> = judgments
            .iter()
            .filter_map(|j| match &j.answer {
                JudgmentAnswer::Category {
                    labels,
                    does_not_match,
                } => Some((j.assignment_id.as_str(), labels, *does_not_match)),
                _ => None,
            })
            .collect();

        let total = answers.len();
        if total < t.min_responses {
            return DecisionPlan::deferred(work_unit_id, total, t.min_responses, Vec::new());
        }

        // Blank answers are rejected even when the others agree.
        let settle_answered = |reason: FeedbackReason| -> Vec<Settlement> {
            answers
                .iter()
                .map(|(id, labels, does_not_match)| {
                    if labels.is_empty() && !does_not_match {
                        Settlement::reject(*id, FeedbackReason::DidNotSelectAnyOptions)
                    } else {
                        Settlement::accept(*id, reason)
                    }
                })
                .collect()
        };

        let label_sets: Vec<BTreeSet<String>> =
            answers.iter().map(|(_, labels, _)| (*labels).clone()).collect();
        if let ConsensusResult::Reached(labels) = majority_count(&label_sets, t.label_min_votes) {
            return DecisionPlan::decided(
                Decision::new(work_unit_id, Outcome::Accept, DecisionPayload::Categories { labels }),
                settle_answered(FeedbackReason::CategoriesApproved),
            );
        }

        let flags = answers.iter().filter(|(_, _, flag)| *flag).count();
        if uncategorizable_override(flags, total) {
            return DecisionPlan::decided(
                Decision::new(work_unit_id, Outcome::Accept, DecisionPayload::Uncategorizable),
                settle_answered(FeedbackReason::CategoriesApproved),
            );
        }

        let rejections = answers
            .iter()
            .map(|(id, _, _)| Settlement::reject(*id, FeedbackReason::CategoryNoConsensus))
            .collect();
        DecisionPlan::decided(
            Decision::new(
                work_unit_id,
                Outcome::Reject,
                DecisionPayload::ManualReview {
                    reason: ReviewReason::NoConsensus,
                },
            ),
            rejections,
        )
    }

    /// Photo change: screen out invalid answer patterns, then per-question
    /// boolean majority over the valid ones.
    pub fn decide_photo_change(&self, work_unit_id: &str, judgments: &[Judgment]) -> DecisionPlan {
        let t = &self.thresholds;
        let mut settlements = Vec::new();
        let mut valid: Vec<(&Judgment, &PhotoChangeAnswers)> = Vec::new();
        let mut pair: Option<(&str, &str)> = None;

        for judgment in judgments {
            let JudgmentAnswer::PhotoChange {
                new_asset_id,
                old_asset_id,
                answers,
            } = &judgment.answer
            else {
                continue;
            };
            pair.get_or_insert((new_asset_id.as_str(), old_asset_id.as_str()));

            match answers.validate() {
                Ok(()) => valid.push((judgment, answers)),
                Err(pattern) => {
                    settlements.push(Settlement::reject(&judgment.assignment_id, pattern.into()))
                }
            }
        }

        if valid.len() < t.min_valid_photo_change {
            return DecisionPlan::deferred(
                work_unit_id,
                valid.len(),
                t.min_valid_photo_change,
                settlements,
            );
        }

        let ballots: Vec<(&str, &PhotoChangeAnswers)> = valid
            .iter()
            .map(|(judgment, answers)| (judgment.worker_id.as_str(), *answers))
            .collect();

        match (boolean_majority(&ballots, t.boolean_rule), pair) {
            (ConsensusResult::Reached(consensus), Some((new_asset_id, old_asset_id))) => {
                let class = classify(&consensus);
                settlements.extend(valid.iter().map(|(judgment, _)| {
                    Settlement::accept(&judgment.assignment_id, FeedbackReason::PhotoChangeApproved)
                }));
                let payload = DecisionPayload::PhotoChange {
                    new_asset_id: new_asset_id.to_string(),
                    old_asset_id: old_asset_id.to_string(),
                    class,
                    consensus,
                };
                DecisionPlan::decided(
                    Decision::new(work_unit_id, class.outcome(), payload),
                    settlements,
                )
            }
            (ConsensusResult::NoConsensus, _) => DecisionPlan::decided(
                Decision::manual_review(work_unit_id, ReviewReason::NoConsensus),
                settlements,
            ),
            _ => DecisionPlan::deferred(
                work_unit_id,
                valid.len(),
                t.min_valid_photo_change,
                settlements,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::entities::{PhotoChangeClass, PlanStatus};
    use crate::judgment::Answer::{self, Blank, No, Yes};
    use chrono::{DateTime, Utc};

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn judgment(n: usize, answer: JudgmentAnswer) -> Judgment {
        Judgment {
            work_unit_id: "asset-1".to_string(),
            assignment_id: format!("A{n}"),
            worker_id: format!("W{n}"),
            submitted_at: at(),
            answer,
        }
    }

    fn rate(n: usize, text: &str) -> Judgment {
        judgment(
            n,
            JudgmentAnswer::Rate {
                text: text.to_string(),
                no_rates_present: false,
            },
        )
    }

    fn no_rates(n: usize) -> Judgment {
        judgment(
            n,
            JudgmentAnswer::Rate {
                text: String::new(),
                no_rates_present: true,
            },
        )
    }

    fn category(n: usize, labels: &[&str], does_not_match: bool) -> Judgment {
        judgment(
            n,
            JudgmentAnswer::Category {
                labels: labels.iter().map(|s| s.to_string()).collect(),
                does_not_match,
            },
        )
    }

    fn photo(n: usize, s: Answer, new: Answer, old: Answer, p: Answer) -> Judgment {
        judgment(
            n,
            JudgmentAnswer::PhotoChange {
                new_asset_id: "new".to_string(),
                old_asset_id: "old".to_string(),
                answers: PhotoChangeAnswers::new(s, new, old, p),
            },
        )
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::default()
    }

    fn decision(plan: &DecisionPlan) -> &Decision {
        plan.decision().expect("plan should be decided")
    }

    // ==================== Rate transcription ====================

    #[test]
    fn test_rates_consensus_on_first_pair() {
        let judgments = vec![
            rate(1, "Evenings :: $11"),
            rate(2, "evening $11.00\r\nfree on sundays"),
            rate(3, "Flat Rate $5"),
        ];
        let plan = engine().decide_rates("asset-1", &judgments);

        let decision = decision(&plan);
        assert_eq!(decision.outcome, Outcome::Accept);
        assert_eq!(
            decision.payload,
            DecisionPayload::TranscribedRates {
                rates: "Evening: $11.00".to_string(),
                notes: String::new(),
                source_assignment: "A1".to_string(),
            }
        );
        let accepted: Vec<_> = plan.accepted().map(|s| s.assignment_id()).collect();
        assert_eq!(accepted, ["A1", "A2", "A3"]);
        assert!(plan.accepted().all(|s| s.reason() == FeedbackReason::TranscriptionApproved));
    }

    #[test]
    fn test_rates_parse_failure_is_rejected_and_never_votes() {
        let judgments = vec![
            rate(1, "0-1 Hour :: $5\r\nzzz"),
            rate(2, "0-1 Hour :: $5"),
            rate(3, "1st hr $5"),
        ];
        let plan = engine().decide_rates("asset-1", &judgments);

        assert_eq!(decision(&plan).outcome, Outcome::Accept);
        assert_eq!(
            plan.settlements[0],
            Settlement::reject("A1", FeedbackReason::ParseFailed)
        );
        match &decision(&plan).payload {
            DecisionPayload::TranscribedRates {
                source_assignment, ..
            } => assert_eq!(source_assignment, "A2"),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_rates_no_consensus_goes_to_manual_review() {
        let judgments = vec![rate(1, "1 hr $1"), rate(2, "1 hr $2"), rate(3, "1 hr $3")];
        let plan = engine().decide_rates("asset-1", &judgments);

        assert_eq!(
            decision(&plan).payload,
            DecisionPayload::ManualReview {
                reason: ReviewReason::NoConsensus
            }
        );
        assert!(plan.settlements.is_empty());
    }

    #[test]
    fn test_rates_not_enough_responses() {
        let judgments = vec![rate(1, "1 hr $1"), rate(2, "1 hr $1")];
        let plan = engine().decide_rates("asset-1", &judgments);

        assert_eq!(
            plan.status,
            PlanStatus::Deferred {
                received: 2,
                required: 3
            }
        );
    }

    #[test]
    fn test_rates_too_difficult() {
        let judgments = vec![rate(1, "zzz"), rate(2, "???")];
        let plan = engine().decide_rates("asset-1", &judgments);

        assert_eq!(
            decision(&plan).payload,
            DecisionPayload::ManualReview {
                reason: ReviewReason::TooDifficult
            }
        );
        assert_eq!(plan.rejected().count(), 2);
    }

    #[test]
    fn test_rates_blank_submission_rejected() {
        let judgments = vec![rate(1, "  "), rate(2, "1 hr $1"), rate(3, "1 hr $1")];
        let plan = engine().decide_rates("asset-1", &judgments);

        assert_eq!(
            plan.settlements[0],
            Settlement::reject("A1", FeedbackReason::BlankTranscription)
        );
        assert_eq!(decision(&plan).outcome, Outcome::Accept);
    }

    #[test]
    fn test_rates_no_rates_quorum() {
        let judgments = vec![no_rates(1), rate(2, "1 hr $1"), no_rates(3)];
        let plan = engine().decide_rates("asset-1", &judgments);

        assert_eq!(decision(&plan).payload, DecisionPayload::NoRates);
        assert_eq!(plan.accepted().count(), 3);
    }

    #[test]
    fn test_rates_single_candidate_goes_to_manual_review() {
        let judgments = vec![no_rates(1), rate(2, "zzz"), rate(3, "1 hr $1")];
        let plan = engine().decide_rates("asset-1", &judgments);

        assert!(!plan.is_deferred());
        assert_eq!(
            decision(&plan).payload,
            DecisionPayload::ManualReview {
                reason: ReviewReason::NoConsensus
            }
        );
        assert_eq!(
            plan.settlements,
            vec![Settlement::reject("A2", FeedbackReason::ParseFailed)]
        );
    }

    #[test]
    fn test_rates_notes_only_submissions_do_not_vote() {
        let judgments = vec![
            rate(1, "Free parking"),
            rate(2, "free parking"),
            rate(3, "1 hr $1"),
        ];
        let plan = engine().decide_rates("asset-1", &judgments);

        assert_eq!(
            decision(&plan).payload,
            DecisionPayload::ManualReview {
                reason: ReviewReason::NoConsensus
            }
        );
        assert!(plan.settlements.is_empty());
    }

    #[test]
    fn test_rates_notes_only_submission_accepted_with_consensus() {
        let judgments = vec![
            rate(1, "No overnight parking"),
            rate(2, "1 hr $1"),
            rate(3, "1 hour $1.00"),
        ];
        let plan = engine().decide_rates("asset-1", &judgments);

        match &decision(&plan).payload {
            DecisionPayload::TranscribedRates {
                rates,
                source_assignment,
                ..
            } => {
                assert_eq!(rates, "1 Hour: $1.00");
                assert_eq!(source_assignment, "A2");
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(plan.accepted().count(), 3);
    }

    // ==================== Categorization ====================

    #[test]
    fn test_categories_majority() {
        let judgments = vec![
            category(1, &["rates", "hours"], false),
            category(2, &["rates"], false),
            category(3, &["entrance"], false),
        ];
        let plan = engine().decide_categories("asset-1", &judgments);

        assert_eq!(
            decision(&plan).payload,
            DecisionPayload::Categories {
                labels: BTreeSet::from(["rates".to_string()])
            }
        );
        assert_eq!(plan.accepted().count(), 3);
    }

    #[test]
    fn test_categories_blank_answer_rejected() {
        let judgments = vec![
            category(1, &["rates"], false),
            category(2, &["rates"], false),
            category(3, &[], false),
        ];
        let plan = engine().decide_categories("asset-1", &judgments);

        assert_eq!(decision(&plan).outcome, Outcome::Accept);
        assert_eq!(
            plan.settlements[2],
            Settlement::reject("A3", FeedbackReason::DidNotSelectAnyOptions)
        );
    }

    #[test]
    fn test_categories_uncategorizable_override() {
        let judgments = vec![
            category(1, &[], true),
            category(2, &[], true),
            category(3, &["rates"], false),
        ];
        let plan = engine().decide_categories("asset-1", &judgments);

        assert_eq!(decision(&plan).payload, DecisionPayload::Uncategorizable);
        assert_eq!(plan.accepted().count(), 3);
    }

    #[test]
    fn test_categories_no_consensus_rejects_all() {
        let judgments = vec![
            category(1, &["rates"], false),
            category(2, &["hours"], false),
            category(3, &["entrance"], true),
        ];
        let plan = engine().decide_categories("asset-1", &judgments);

        assert_eq!(decision(&plan).outcome, Outcome::Reject);
        assert_eq!(
            decision(&plan).payload.review_reason(),
            Some(ReviewReason::NoConsensus)
        );
        assert_eq!(plan.rejected().count(), 3);
        assert!(
            plan.rejected()
                .all(|s| s.reason() == FeedbackReason::CategoryNoConsensus)
        );
    }

    #[test]
    fn test_categories_not_enough() {
        let judgments = vec![category(1, &["rates"], false), category(2, &["rates"], false)];
        assert!(engine().decide_categories("asset-1", &judgments).is_deferred());
    }

    // ==================== Photo change ====================

    #[test]
    fn test_photo_change_auto_apply() {
        let judgments = vec![
            photo(1, Yes, No, No, Yes),
            photo(2, Yes, No, No, Yes),
            photo(3, No, Blank, Blank, Blank),
        ];
        let plan = engine().decide_photo_change("new/old", &judgments);

        let decision = decision(&plan);
        assert_eq!(decision.outcome, Outcome::AutoApply);
        match &decision.payload {
            DecisionPayload::PhotoChange {
                new_asset_id,
                old_asset_id,
                class,
                ..
            } => {
                assert_eq!(new_asset_id, "new");
                assert_eq!(old_asset_id, "old");
                assert_eq!(*class, PhotoChangeClass::AutoApply);
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(plan.accepted().count(), 3);
    }

    #[test]
    fn test_photo_change_needs_pricing() {
        let judgments = vec![
            photo(1, Yes, No, No, No),
            photo(2, Yes, No, No, No),
            photo(3, Yes, No, No, Yes),
        ];
        let plan = engine().decide_photo_change("new/old", &judgments);
        assert_eq!(decision(&plan).outcome, Outcome::NeedsPricing);
    }

    #[test]
    fn test_photo_change_manual_update() {
        let judgments = vec![
            photo(1, No, Blank, Blank, Blank),
            photo(2, No, Blank, Blank, Blank),
            photo(3, Yes, No, No, Yes),
        ];
        let plan = engine().decide_photo_change("new/old", &judgments);

        let decision = decision(&plan);
        assert_eq!(decision.outcome, Outcome::ManualReview);
        assert!(decision.needs_review());
    }

    #[test]
    fn test_photo_change_invalid_judgment_excluded_and_rejected() {
        let judgments = vec![
            photo(1, Blank, Blank, Blank, Blank),
            photo(2, Yes, No, No, Yes),
            photo(3, Yes, No, No, Yes),
            photo(4, Yes, No, No, Yes),
        ];
        let plan = engine().decide_photo_change("new/old", &judgments);

        assert_eq!(decision(&plan).outcome, Outcome::AutoApply);
        assert_eq!(
            plan.settlements[0],
            Settlement::reject("A1", FeedbackReason::PhotoChangeAllBlank)
        );
        match &decision(&plan).payload {
            DecisionPayload::PhotoChange { consensus, .. } => {
                assert_eq!(consensus.tallies[0].result.total_votes, 3);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_photo_change_too_few_valid() {
        let judgments = vec![
            photo(1, Blank, Blank, Blank, Blank),
            photo(2, Yes, No, No, Yes),
            photo(3, Yes, No, No, Yes),
        ];
        let plan = engine().decide_photo_change("new/old", &judgments);

        assert_eq!(
            plan.status,
            PlanStatus::Deferred {
                received: 2,
                required: 3
            }
        );
        assert_eq!(plan.rejected().count(), 1);
    }

    #[test]
    fn test_decide_dispatches_on_kind() {
        let judgments = vec![rate(1, "1 hr $1"), rate(2, "1 hr $1"), rate(3, "1 hr $1")];
        let key = CorrelationKey::Asset("asset-1".to_string());
        let plan = engine().decide(TaskKind::RateTranscription, &key, &judgments);
        assert_eq!(plan.work_unit_id, "asset-1");
        assert_eq!(decision(&plan).outcome, Outcome::Accept);

        // Wrong kind: nothing to vote on.
        let plan = engine().decide(TaskKind::Categorization, &key, &judgments);
        assert!(plan.is_deferred());
    }
}
