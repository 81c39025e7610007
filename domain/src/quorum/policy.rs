//! Consensus policies
//!
//! | Policy | Agreement test | Value |
//! |---|---|---|
//! | [`set_equality`] | `quorum` judgments with identical sets | first agreeing set in input order |
//! | [`majority_count`] | per-label occurrence count | labels with count >= `min_votes` |
//! | [`boolean_majority`] | per-question [`QuorumRule`] | tuple of per-question booleans |
//! | [`uncategorizable_override`] | `flags + 1 >= total` | empty category set |

use super::consensus::ConsensusResult;
use super::rule::QuorumRule;
use super::vote::{Vote, VoteResult};
use crate::judgment::{PhotoChangeAnswers, PhotoChangeQuestion};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The set a group of judgments agreed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAgreement<T: Ord> {
    pub value: BTreeSet<T>,
    /// Indices of every candidate equal to `value`, ascending
    pub members: Vec<usize>,
}

impl<T: Ord> SetAgreement<T> {
    /// Index of the candidate whose value is reported
    pub fn first(&self) -> usize {
        self.members[0]
    }
}

/// Set-equality consensus.
///
/// Scans candidates in input order; the first candidate with at least
/// `quorum - 1` identical later candidates wins. For `quorum = 2` this is the
/// first matching pair `(i, j)` in lexicographic order.
///
/// ```
/// use std::collections::BTreeSet;
/// use ratecard_domain::quorum::set_equality;
///
/// let sets = vec![
///     BTreeSet::from(["Evening: $11.00"]),
///     BTreeSet::from(["Evening: $11.00"]),
///     BTreeSet::from(["Flat Rate: $5.00"]),
/// ];
/// let agreement = set_equality(&sets, 2).into_value().unwrap();
/// assert_eq!(agreement.value, BTreeSet::from(["Evening: $11.00"]));
/// assert_eq!(agreement.members, vec![0, 1]);
/// ```
pub fn set_equality<T: Ord + Clone>(
    candidates: &[BTreeSet<T>],
    quorum: usize,
) -> ConsensusResult<SetAgreement<T>> {
    let quorum = quorum.max(1);
    if candidates.len() < quorum {
        return ConsensusResult::NotEnoughResponses {
            received: candidates.len(),
            required: quorum,
        };
    }

    for (i, candidate) in candidates.iter().enumerate() {
        let members: Vec<usize> = candidates
            .iter()
            .enumerate()
            .skip(i)
            .filter(|(_, other)| *other == candidate)
            .map(|(j, _)| j)
            .collect();

        if members.len() >= quorum {
            return ConsensusResult::Reached(SetAgreement {
                value: candidate.clone(),
                members,
            });
        }
    }

    ConsensusResult::NoConsensus
}

/// Majority-count consensus over label sets.
///
/// Each label is counted once per judgment. Labels counted at least
/// `min_votes` times form the consensus; an empty result is `NoConsensus`.
pub fn majority_count(label_sets: &[BTreeSet<String>], min_votes: usize) -> ConsensusResult<BTreeSet<String>> {
    let min_votes = min_votes.max(1);
    if label_sets.len() < min_votes {
        return ConsensusResult::NotEnoughResponses {
            received: label_sets.len(),
            required: min_votes,
        };
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in label_sets.iter().flatten() {
        *counts.entry(label.as_str()).or_default() += 1;
    }

    let rule = QuorumRule::AtLeast(min_votes);
    let agreed: BTreeSet<String> = counts
        .into_iter()
        .filter(|(_, count)| rule.is_satisfied(*count, label_sets.len()))
        .map(|(label, _)| label.to_string())
        .collect();

    if agreed.is_empty() {
        ConsensusResult::NoConsensus
    } else {
        ConsensusResult::Reached(agreed)
    }
}

/// Whether enough workers flagged the photo as matching no category.
///
/// Fires when all judgments but at most one say "does not match".
pub fn uncategorizable_override(flags: usize, total: usize) -> bool {
    total >= 2 && flags + 1 >= total
}

/// Tally of one photo-change question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTally {
    pub question: PhotoChangeQuestion,
    pub result: VoteResult,
}

/// Per-question majority booleans for one asset pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoChangeConsensus {
    /// One tally per question, in schema order
    pub tallies: Vec<QuestionTally>,
}

impl PhotoChangeConsensus {
    pub fn answer(&self, question: PhotoChangeQuestion) -> bool {
        self.tallies
            .iter()
            .find(|t| t.question == question)
            .is_some_and(|t| t.result.passed)
    }

    pub fn same_sign(&self) -> bool {
        self.answer(PhotoChangeQuestion::SameSign)
    }

    pub fn new_has_extra_rates(&self) -> bool {
        self.answer(PhotoChangeQuestion::NewHasExtraRates)
    }

    pub fn old_has_extra_rates(&self) -> bool {
        self.answer(PhotoChangeQuestion::OldHasExtraRates)
    }

    pub fn same_prices(&self) -> bool {
        self.answer(PhotoChangeQuestion::SamePrices)
    }
}

/// Per-question boolean majority over already-screened ballots.
///
/// `ballots` pairs each worker id with its answers. Blank answers count as
/// not-yes.
pub fn boolean_majority(
    ballots: &[(&str, &PhotoChangeAnswers)],
    rule: QuorumRule,
) -> ConsensusResult<PhotoChangeConsensus> {
    if ballots.is_empty() {
        return ConsensusResult::NotEnoughResponses {
            received: 0,
            required: 1,
        };
    }

    let tallies = PhotoChangeQuestion::ALL
        .iter()
        .map(|&question| {
            let votes = ballots
                .iter()
                .map(|(voter, answers)| Vote::from_answer(*voter, answers.get(question)))
                .collect();
            QuestionTally {
                question,
                result: VoteResult::from_votes_with_rule(votes, &rule),
            }
        })
        .collect();

    ConsensusResult::Reached(PhotoChangeConsensus { tallies })
}
